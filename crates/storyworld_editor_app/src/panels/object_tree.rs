// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object tree panel - one editable row per world object.

use crate::settings::TreePanelSettings;
use std::path::{Path, PathBuf};
use storyworld_editor_node::ui::INDENT_WIDTH;
use storyworld_editor_node::{show_node, ContainerHandle, Mark, ObjectId, WorldObject};
use storyworld_editor_tree::{
    DocumentError, ObjectTree, TreeController, TreeDocument, TreeOutcome, DOCUMENT_EXTENSION,
};

/// Document used when the settings name none
pub fn untitled_document() -> PathBuf {
    PathBuf::from(format!("untitled.{DOCUMENT_EXTENSION}"))
}

/// The panel showing the object tree
pub struct ObjectTreePanel {
    /// Tree controller owning objects and node controls
    pub controller: TreeController,
    /// Document backing the tree, if any
    pub document: Option<PathBuf>,
    /// Row that last received focus
    focused: Option<ObjectId>,
    /// Unsaved edits
    dirty: bool,
    /// Outcome of the last tree edit
    status: Option<String>,
}

impl ObjectTreePanel {
    /// Create a panel for an existing controller
    pub fn new(controller: TreeController, document: Option<PathBuf>) -> Self {
        Self {
            controller,
            document,
            focused: None,
            dirty: false,
            status: None,
        }
    }

    /// Open `path` if it exists, otherwise start with an empty tree bound to it
    pub fn open(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::new(TreeController::new(ObjectTree::new()), None);
        };

        let controller = match TreeDocument::load(path).and_then(TreeController::from_document) {
            Ok(controller) => controller,
            Err(DocumentError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("New world, {:?} will be created on save", path);
                TreeController::new(ObjectTree::new())
            }
            Err(e) => {
                tracing::warn!("Starting with an empty world, could not open {:?}: {}", path, e);
                TreeController::new(ObjectTree::new())
            }
        };
        Self::new(controller, Some(path.to_path_buf()))
    }

    /// Whether there are unsaved edits
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Render the panel
    pub fn ui(&mut self, ui: &mut egui::Ui, settings: &TreePanelSettings) {
        self.toolbar(ui, settings);

        if settings.show_status {
            if let Some(status) = &self.status {
                ui.weak(status);
            }
        }

        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            let rows = self.controller.rows();
            if rows.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No objects in this world");
                });
                return;
            }

            let mut drag_stopped = Vec::new();
            for (id, depth) in rows {
                let list_dragging = self.list_container(id).marks.contains(Mark::Dragging);
                let Some(node) = self.controller.node_mut(id) else {
                    continue;
                };
                let row = ui.scope(|ui| show_node(ui, node, depth));
                if list_dragging {
                    let rect = row.response.rect;
                    let x = (rect.left() + depth as f32 * INDENT_WIDTH - 4.0).max(rect.left());
                    ui.painter().vline(x, rect.y_range(), ui.visuals().selection.stroke);
                }

                let response = row.inner;
                if response.changed {
                    self.dirty = true;
                }
                if response.focused {
                    self.focused = Some(id);
                }
                if response.drag_stopped {
                    drag_stopped.push(id);
                }
            }

            for id in drag_stopped {
                if let Some(node) = self.controller.node_mut(id) {
                    node.drag_end();
                }
            }
        });

        self.apply_events();
    }

    /// The container holding the row of `id`: its parent's child list, or the root list
    fn list_container(&self, id: ObjectId) -> &ContainerHandle {
        self.controller
            .tree()
            .parent_of(id)
            .and_then(|parent| self.controller.child_container(parent))
            .unwrap_or_else(|| self.controller.root_container())
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, settings: &TreePanelSettings) {
        ui.horizontal(|ui| {
            if ui.button("+ Object").on_hover_text("Add a top-level object").clicked() {
                self.add_object(None, settings);
            }

            let focused = self.focused.filter(|id| self.controller.tree().contains(*id));
            if ui
                .add_enabled(focused.is_some(), egui::Button::new("+ Child"))
                .on_hover_text("Add a child to the focused object")
                .clicked()
            {
                self.add_object(focused, settings);
            }

            ui.separator();

            let has_document = self.document.is_some();
            if ui.add_enabled(has_document, egui::Button::new("Save")).clicked() {
                self.save();
            }
            if ui.add_enabled(has_document, egui::Button::new("Reload")).clicked() {
                self.reload();
            }
        });
    }

    fn add_object(&mut self, parent: Option<ObjectId>, settings: &TreePanelSettings) {
        let object = WorldObject::new(settings.new_object_name.clone(), settings.new_object_kind);
        match self.controller.add_object(parent, object) {
            Ok(id) => {
                self.focused = Some(id);
                self.dirty = true;
            }
            Err(e) => self.status = Some(format!("Could not add object: {e}")),
        }
    }

    /// Apply queued node notifications to the tree
    pub fn apply_events(&mut self) {
        for outcome in self.controller.process_events() {
            self.status = Some(match &outcome {
                TreeOutcome::Deleted { removed, .. } => {
                    self.dirty = true;
                    format!("Deleted {removed} object(s)")
                }
                TreeOutcome::MovedAsSibling { .. } => {
                    self.dirty = true;
                    "Moved object".to_string()
                }
                TreeOutcome::MovedAsChild { .. } => {
                    self.dirty = true;
                    "Moved object into new parent".to_string()
                }
                TreeOutcome::Rejected { error, .. } => format!("Move refused: {error}"),
            });
        }
    }

    /// Save the tree to its document
    pub fn save(&mut self) {
        let Some(path) = &self.document else {
            return;
        };
        match self.controller.to_document().save(path) {
            Ok(()) => {
                self.dirty = false;
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Failed to save world: {}", e);
                self.status = Some(format!("Save failed: {e}"));
            }
        }
    }

    /// Discard edits and reload the document
    pub fn reload(&mut self) {
        let Some(path) = self.document.clone() else {
            return;
        };
        match TreeDocument::load(&path).and_then(TreeController::from_document) {
            Ok(controller) => {
                self.controller = controller;
                self.focused = None;
                self.dirty = false;
                self.status = Some(format!("Reloaded {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Failed to reload world: {}", e);
                self.status = Some(format!("Reload failed: {e}"));
            }
        }
    }
}

impl Default for ObjectTreePanel {
    fn default() -> Self {
        Self::open(None)
    }
}
