// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tree controller: owns the object tree and one node control per object,
//! and turns node notifications into tree mutations.
//!
//! Nodes only report what the user did. Their `delete`, `drop` and
//! `dropAsChild` notifications land in a shared inbox, and
//! [`TreeController::process_events`] applies them after the input pass,
//! rejecting moves that would put an object inside itself.

use crate::document::{self, TreeDocument};
use crate::tree::{ObjectTree, TreeError};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use storyworld_editor_node::{
    Container, ContainerHandle, DragSession, NodeControl, NodeEvent, NodeEventKind, ObjectId, ObjectRef,
    TemplateError, TemplateRegistry, WorldObject, OBJECT_NODE_TEMPLATE,
};

type Inbox = Rc<RefCell<VecDeque<(ObjectId, NodeEvent)>>>;

/// What processing one notification did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOutcome {
    /// An object and its subtree were removed
    Deleted {
        /// The deleted object
        id: ObjectId,
        /// Number of objects removed, including descendants
        removed: usize,
    },
    /// An object now follows `target` under the same parent
    MovedAsSibling {
        /// The moved object
        id: ObjectId,
        /// The node it was dropped on
        target: ObjectId,
    },
    /// An object is now the last child of `parent`
    MovedAsChild {
        /// The moved object
        id: ObjectId,
        /// The new parent
        parent: ObjectId,
    },
    /// The notification was not applied
    Rejected {
        /// The notification that was refused
        event: NodeEventKind,
        /// Why
        error: TreeError,
    },
}

/// Owns the object tree and its node controls
pub struct TreeController {
    tree: ObjectTree,
    session: Rc<DragSession>,
    templates: TemplateRegistry,
    template: String,
    root: ContainerHandle,
    containers: HashMap<ObjectId, ContainerHandle>,
    nodes: IndexMap<ObjectId, NodeControl>,
    inbox: Inbox,
}

impl TreeController {
    /// Create a controller for `tree` using the built-in object template
    pub fn new(tree: ObjectTree) -> Self {
        Self::build(tree, TemplateRegistry::with_defaults(), OBJECT_NODE_TEMPLATE.to_string())
    }

    /// Create a controller rendering nodes with a named template from `templates`
    pub fn with_templates(
        tree: ObjectTree,
        templates: TemplateRegistry,
        template: &str,
    ) -> Result<Self, TemplateError> {
        if let Err(e) = templates.get(template) {
            let known: Vec<&str> = templates.names().collect();
            tracing::warn!("{e}; registered templates: {}", known.join(", "));
            return Err(e);
        }
        Ok(Self::build(tree, templates, template.to_string()))
    }

    fn build(tree: ObjectTree, templates: TemplateRegistry, template: String) -> Self {
        let mut controller = Self {
            tree,
            session: DragSession::shared(),
            templates,
            template,
            root: Container::new("root"),
            containers: HashMap::new(),
            nodes: IndexMap::new(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
        };
        for (id, _) in controller.tree.depth_first() {
            controller.create_node(id);
        }
        controller
    }

    /// Create a controller from a loaded document
    pub fn from_document(document: TreeDocument) -> document::Result<Self> {
        Ok(Self::new(document.into_tree()?))
    }

    /// Snapshot the tree as a document
    pub fn to_document(&self) -> TreeDocument {
        TreeDocument::from_tree(&self.tree)
    }

    /// The object tree
    pub fn tree(&self) -> &ObjectTree {
        &self.tree
    }

    /// The drag session shared by every node
    pub fn session(&self) -> &Rc<DragSession> {
        &self.session
    }

    /// The container holding top-level rows
    pub fn root_container(&self) -> &ContainerHandle {
        &self.root
    }

    /// The container a child list is mounted in, if it was ever created
    pub fn child_container(&self, parent: ObjectId) -> Option<&ContainerHandle> {
        self.containers.get(&parent)
    }

    /// Node control for an object
    pub fn node(&self, id: ObjectId) -> Option<&NodeControl> {
        self.nodes.get(&id)
    }

    /// Mutable node control for an object
    pub fn node_mut(&mut self, id: ObjectId) -> Option<&mut NodeControl> {
        self.nodes.get_mut(&id)
    }

    /// Rows in display order with their depth
    pub fn rows(&self) -> Vec<(ObjectId, usize)> {
        self.tree.depth_first()
    }

    /// Add an object at the end of `parent`'s children, or as a root
    pub fn add_object(&mut self, parent: Option<ObjectId>, object: WorldObject) -> Result<ObjectId, TreeError> {
        let object = ObjectRef::new(object);
        let id = match parent {
            Some(parent) => self.tree.insert_child(parent, object)?,
            None => self.tree.insert_root(object)?,
        };
        self.create_node(id);
        tracing::info!("Added object {} under {:?}", id, parent);
        Ok(id)
    }

    fn container_for(&mut self, parent: Option<ObjectId>) -> ContainerHandle {
        match parent {
            Some(parent) => self
                .containers
                .entry(parent)
                .or_insert_with(|| Container::new(format!("children of {parent}")))
                .clone(),
            None => self.root.clone(),
        }
    }

    fn create_node(&mut self, id: ObjectId) {
        let Some(object) = self.tree.get(id).cloned() else {
            return;
        };
        let mount = self.container_for(self.tree.parent_of(id));
        let Ok(template) = self.templates.get(&self.template) else {
            tracing::error!("Template {:?} disappeared from the registry", self.template);
            return;
        };
        let mut node = NodeControl::new(mount, template, self.session.clone());
        node.set_value(object);

        for &kind in NodeEventKind::all() {
            let inbox = self.inbox.clone();
            node.on(kind, move |event| inbox.borrow_mut().push_back((id, event.clone())));
        }
        self.nodes.insert(id, node);
    }

    /// Number of notifications waiting to be processed
    pub fn pending_events(&self) -> usize {
        self.inbox.borrow().len()
    }

    /// Apply every queued node notification in arrival order
    pub fn process_events(&mut self) -> Vec<TreeOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let Some((id, event)) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            let kind = event.kind();
            let outcome = match event {
                NodeEvent::Delete => self.delete(id),
                NodeEvent::Drop(dragged) => self.move_as_sibling(&dragged, id),
                NodeEvent::DropAsChild(dragged) => self.move_as_child(&dragged, id),
            }
            .unwrap_or_else(|error| {
                tracing::warn!("Rejected {} on {}: {}", kind, id, error);
                TreeOutcome::Rejected { event: kind, error }
            });
            outcomes.push(outcome);
        }
        outcomes
    }

    fn delete(&mut self, id: ObjectId) -> Result<TreeOutcome, TreeError> {
        let removed = self.tree.remove(id)?;
        for object in &removed {
            let removed_id = object.id();
            self.nodes.shift_remove(&removed_id);
            self.containers.remove(&removed_id);
        }
        tracing::info!("Deleted {} ({} object(s))", id, removed.len());
        Ok(TreeOutcome::Deleted {
            id,
            removed: removed.len(),
        })
    }

    fn resolve(&self, dragged: &ObjectRef) -> Result<ObjectId, TreeError> {
        let id = dragged.id();
        match self.tree.get(id) {
            Some(object) if object.ptr_eq(dragged) => Ok(id),
            _ => Err(TreeError::NotFound(id)),
        }
    }

    fn move_as_sibling(&mut self, dragged: &ObjectRef, target: ObjectId) -> Result<TreeOutcome, TreeError> {
        let id = self.resolve(dragged)?;
        self.tree.move_as_sibling(id, target)?;
        self.remount(id);
        Ok(TreeOutcome::MovedAsSibling { id, target })
    }

    fn move_as_child(&mut self, dragged: &ObjectRef, parent: ObjectId) -> Result<TreeOutcome, TreeError> {
        let id = self.resolve(dragged)?;
        self.tree.move_as_child(id, parent)?;
        self.remount(id);
        Ok(TreeOutcome::MovedAsChild { id, parent })
    }

    fn remount(&mut self, id: ObjectId) {
        let container = self.container_for(self.tree.parent_of(id));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.mount(container);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyworld_editor_node::{DragStart, Mark, ObjectKind, PressTarget, RegionKind};

    /// tavern { barkeep, cellar { barrel } }, road
    fn sample() -> (TreeController, [ObjectId; 5]) {
        let mut controller = TreeController::new(ObjectTree::new());
        let tavern = controller
            .add_object(None, WorldObject::new("Tavern", ObjectKind::Scenery))
            .unwrap();
        let barkeep = controller
            .add_object(Some(tavern), WorldObject::new("Barkeep", ObjectKind::Actor))
            .unwrap();
        let cellar = controller
            .add_object(Some(tavern), WorldObject::new("Cellar", ObjectKind::Scenery))
            .unwrap();
        let barrel = controller
            .add_object(Some(cellar), WorldObject::new("Barrel", ObjectKind::Item))
            .unwrap();
        let road = controller
            .add_object(None, WorldObject::new("Road", ObjectKind::Scenery))
            .unwrap();
        (controller, [tavern, barkeep, cellar, barrel, road])
    }

    fn drag(controller: &mut TreeController, from: ObjectId, onto: ObjectId, region: RegionKind) {
        let source = controller.node_mut(from).unwrap();
        source.press(PressTarget::Body);
        assert_eq!(source.drag_start(), Ok(DragStart::Started));

        let target = controller.node_mut(onto).unwrap();
        target.drag_enter(region);
        target.drop_into(region);

        controller.node_mut(from).unwrap().drag_end();
    }

    #[test]
    fn test_every_object_gets_a_bound_node() {
        let (controller, ids) = sample();
        for id in ids {
            let node = controller.node(id).unwrap();
            assert_eq!(node.value().map(ObjectRef::id), Some(id));
        }
    }

    #[test]
    fn test_drop_as_child_reparents() {
        let (mut controller, [_tavern, _barkeep, cellar, _barrel, road]) = sample();
        drag(&mut controller, road, cellar, RegionKind::Child);

        assert_eq!(controller.pending_events(), 1);
        assert_eq!(
            controller.process_events(),
            vec![TreeOutcome::MovedAsChild { id: road, parent: cellar }]
        );
        assert_eq!(controller.tree().parent_of(road), Some(cellar));

        let container = controller.child_container(cellar).unwrap().clone();
        assert!(Rc::ptr_eq(controller.node(road).unwrap().parent(), &container));
        assert!(container.marks.is_empty());
    }

    #[test]
    fn test_drop_as_sibling_reorders() {
        let (mut controller, [tavern, barkeep, cellar, barrel, road]) = sample();
        drag(&mut controller, barrel, barkeep, RegionKind::Sibling);
        controller.process_events();

        assert_eq!(controller.tree().children_of(tavern), &[barkeep, barrel, cellar]);
        assert!(controller.tree().children_of(cellar).is_empty());
        assert_eq!(controller.tree().roots(), &[tavern, road]);
    }

    #[test]
    fn test_drop_into_own_subtree_is_rejected() {
        let (mut controller, [tavern, _barkeep, _cellar, barrel, _road]) = sample();
        let before = controller.rows();

        drag(&mut controller, tavern, barrel, RegionKind::Child);
        drag(&mut controller, tavern, tavern, RegionKind::Sibling);
        let outcomes = controller.process_events();

        assert_eq!(
            outcomes,
            vec![
                TreeOutcome::Rejected {
                    event: NodeEventKind::DropAsChild,
                    error: TreeError::IntoDescendant { dragged: tavern, target: barrel },
                },
                TreeOutcome::Rejected {
                    event: NodeEventKind::Drop,
                    error: TreeError::SelfMove(tavern),
                },
            ]
        );
        assert_eq!(controller.rows(), before);
    }

    #[test]
    fn test_delete_removes_subtree_and_nodes() {
        let (mut controller, [tavern, barkeep, cellar, barrel, road]) = sample();
        controller.node_mut(cellar).unwrap().activate_delete();
        controller.node_mut(barrel).unwrap().activate_delete();

        let outcomes = controller.process_events();
        assert_eq!(outcomes[0], TreeOutcome::Deleted { id: cellar, removed: 2 });
        assert_eq!(
            outcomes[1],
            TreeOutcome::Rejected {
                event: NodeEventKind::Delete,
                error: TreeError::NotFound(barrel),
            }
        );
        assert!(controller.node(barrel).is_none());
        assert_eq!(controller.rows(), vec![(tavern, 0), (barkeep, 1), (road, 0)]);
    }

    #[test]
    fn test_drag_marks_source_container_only_while_dragging() {
        let (mut controller, [tavern, barkeep, _cellar, _barrel, _road]) = sample();
        let children = controller.child_container(tavern).unwrap().clone();

        let node = controller.node_mut(barkeep).unwrap();
        node.press(PressTarget::Body);
        node.drag_start().unwrap();
        assert!(children.marks.contains(Mark::Dragging));
        assert!(controller.root_container().marks.is_empty());

        controller.node_mut(barkeep).unwrap().drag_end();
        assert!(children.marks.is_empty());
    }

    #[test]
    fn test_document_round_trip_keeps_nodes() {
        let (controller, [tavern, barkeep, cellar, barrel, road]) = sample();
        let reloaded = TreeController::from_document(controller.to_document()).unwrap();

        assert_eq!(
            reloaded.rows(),
            vec![(tavern, 0), (barkeep, 1), (cellar, 1), (barrel, 2), (road, 0)]
        );
        let name = reloaded.node(barkeep).unwrap().name_field().value().to_string();
        assert_eq!(name, "Barkeep");
    }

    #[test]
    fn test_unknown_template_rejected() {
        let result = TreeController::with_templates(ObjectTree::new(), TemplateRegistry::new(), "fancyRow");
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}
