// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui rendering of a node row.
//!
//! The view translates egui responses into [`NodeControl`] handler calls:
//! - Pointer down on a text field or on the grip records the press origin
//! - Grip drag start begins the drag
//! - Hovering a drop strip while a drag is in flight enters/leaves it
//! - Releasing over a drop strip drops into it
//!
//! Drag-end is reported back instead of applied, so rows rendered later in
//! the same frame still see the payload when they handle the release.

use crate::control::NodeControl;
use crate::drag::{DropEffect, Mark, PressTarget, RegionKind};
use crate::events::NodeEvent;
use crate::object::{ObjectKind, ObjectRef};
use egui::{Color32, Rect, Sense, Vec2};

/// Horizontal offset per tree depth
pub const INDENT_WIDTH: f32 = 18.0;
const NAME_WIDTH: f32 = 140.0;
const DESCRIPTION_WIDTH: f32 = 220.0;
const DROP_STRIP_HEIGHT: f32 = 6.0;
const CHILD_STRIP_INSET: f32 = 24.0;
const GRIP: &str = "⠿";

/// What happened to a node row this frame
#[derive(Debug, Default)]
pub struct NodeResponse {
    /// A field or kind was edited
    pub changed: bool,
    /// The row was clicked or a field gained focus
    pub focused: bool,
    /// The drag started on this row ended; call [`NodeControl::drag_end`]
    /// once every row has been shown
    pub drag_stopped: bool,
    /// Event emitted by a drop into one of the row's regions
    pub dropped: Option<NodeEvent>,
}

/// Show one node row indented by `depth`
pub fn show_node(ui: &mut egui::Ui, node: &mut NodeControl, depth: usize) -> NodeResponse {
    let mut response = NodeResponse::default();
    let Some(object_id) = node.value().map(ObjectRef::id) else {
        ui.weak("(unbound)");
        return response;
    };

    ui.push_id(object_id, |ui| {
        ui.horizontal(|ui| {
            ui.add_space(depth as f32 * INDENT_WIDTH);
            row_contents(ui, node, &mut response);
        });

        let indent = depth as f32 * INDENT_WIDTH;
        if let Some(event) = drop_strip(ui, node, RegionKind::Sibling, indent) {
            response.dropped = Some(event);
        }
        if let Some(event) = drop_strip(ui, node, RegionKind::Child, indent + CHILD_STRIP_INSET) {
            response.dropped = Some(event);
        }
    });

    response
}

fn row_contents(ui: &mut egui::Ui, node: &mut NodeControl, response: &mut NodeResponse) {
    let dragged = node.marks().contains(Mark::Dragged);

    let grip = ui.add(egui::Label::new(GRIP).sense(Sense::click_and_drag()));
    if grip.is_pointer_button_down_on() {
        node.press(PressTarget::Body);
    }
    if grip.drag_started() {
        match node.drag_start() {
            Ok(outcome) => tracing::debug!("Grip drag: {:?}", outcome),
            Err(e) => tracing::warn!("Cannot drag row: {e}"),
        }
    }
    if grip.dragged() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    }
    if grip.drag_stopped() {
        response.drag_stopped = true;
    }
    if grip.clicked() {
        response.focused = true;
    }

    let mut name = node.name_field().value().to_string();
    let name_edit = ui.add_enabled(
        !dragged,
        egui::TextEdit::singleline(&mut name)
            .hint_text("Name")
            .desired_width(NAME_WIDTH),
    );
    if name_edit.is_pointer_button_down_on() {
        node.press(PressTarget::TextField);
    }
    if name_edit.changed() {
        log_unbound(node.input_name(name));
        response.changed = true;
    }

    let mut description = node.description_field().value().to_string();
    let description_edit = ui.add_enabled(
        !dragged,
        egui::TextEdit::singleline(&mut description)
            .hint_text("Description")
            .desired_width(DESCRIPTION_WIDTH),
    );
    if description_edit.is_pointer_button_down_on() {
        node.press(PressTarget::TextField);
    }
    if description_edit.changed() {
        log_unbound(node.input_description(description));
        response.changed = true;
    }
    if name_edit.gained_focus() || description_edit.gained_focus() {
        response.focused = true;
    }

    let mut activated: Option<ObjectKind> = None;
    for selector in node.kind_selection().selectors() {
        if ui.selectable_label(selector.selected(), selector.kind.name()).clicked() {
            activated = Some(selector.kind);
        }
    }
    if let Some(kind) = activated {
        log_unbound(node.activate_kind(kind));
        response.changed = true;
    }

    if ui.small_button("x").on_hover_text("Delete").clicked() {
        node.activate_delete();
    }
}

fn drop_strip(ui: &mut egui::Ui, node: &mut NodeControl, region: RegionKind, inset: f32) -> Option<NodeEvent> {
    let width = (ui.available_width() - inset).max(0.0);
    let (strip, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), DROP_STRIP_HEIGHT), Sense::hover());
    let rect = Rect::from_min_size(strip.min + Vec2::new(inset, 0.0), Vec2::new(width, DROP_STRIP_HEIGHT));

    let active = node.fragment().region(region).is_active();
    if !node.drag_in_flight() || node.marks().contains(Mark::Dragged) {
        if active {
            node.drag_leave(region);
        }
        return None;
    }

    let inside = ui.rect_contains_pointer(rect);
    match (inside, active) {
        (true, false) => node.drag_enter(region),
        (false, true) => node.drag_leave(region),
        _ => {}
    }
    if !inside {
        return None;
    }

    let cursor = match node.drag_over(region) {
        DropEffect::Move => egui::CursorIcon::Move,
    };
    ui.ctx().set_cursor_icon(cursor);
    let color = match region {
        RegionKind::Sibling => ui.visuals().selection.bg_fill,
        RegionKind::Child => Color32::from_rgb(120, 180, 120),
    };
    ui.painter().rect_filled(rect, 2.0, color);

    if ui.input(|i| i.pointer.any_released()) {
        return node.drop_into(region);
    }
    None
}

fn log_unbound(result: crate::control::Result<()>) {
    if let Err(e) = result {
        tracing::warn!("Ignoring edit: {e}");
    }
}
