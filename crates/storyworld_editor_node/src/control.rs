// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editable, draggable row for one world object.
//!
//! A [`NodeControl`] is rendered from a template into a container, bound to
//! an [`ObjectRef`], and then driven by input handlers: field edits, kind
//! and delete activations, and the drag gesture. It reports `delete`, `drop`
//! and `dropAsChild` through its event bus and never touches the tree.

use crate::drag::{ContainerHandle, DragSession, DragStart, DropEffect, Mark, Marks, PressTarget, RegionKind};
use crate::events::{EventBus, NodeEvent, NodeEventKind, ParseEventError};
use crate::field::{KindSelection, TextField};
use crate::object::{ObjectKind, ObjectRef};
use crate::template::{NodeFragment, NodeTemplate};
use std::rc::Rc;
use thiserror::Error;

/// Node control errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    /// The operation needs a bound object
    #[error("Node has no bound object")]
    Unbound,
}

/// Result type for node operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// One object row in the tree editor
pub struct NodeControl {
    object: Option<ObjectRef>,
    fragment: NodeFragment,
    parent: ContainerHandle,
    marks: Rc<Marks>,
    session: Rc<DragSession>,
    events: EventBus,
}

impl NodeControl {
    /// Render `template` into `mount`. The node stays unbound until
    /// [`NodeControl::set_value`] is called.
    pub fn new(mount: ContainerHandle, template: &dyn NodeTemplate, session: Rc<DragSession>) -> Self {
        Self {
            object: None,
            fragment: template.render(),
            parent: mount,
            marks: Rc::new(Marks::default()),
            session,
            events: EventBus::new(),
        }
    }

    /// Bind an object, replacing any previous binding and refreshing every field
    pub fn set_value(&mut self, object: ObjectRef) {
        tracing::debug!("Binding node to {:?}", object);
        self.fragment.name.set_value(object.name());
        self.fragment.description.set_value(object.description());
        let kind = object.kind();
        self.object = Some(object);
        self.apply_kind(kind);
    }

    /// The bound object
    pub fn value(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    /// Move the node into another container
    pub fn mount(&mut self, container: ContainerHandle) {
        self.parent = container;
    }

    /// The container the node is mounted in
    pub fn parent(&self) -> &ContainerHandle {
        &self.parent
    }

    /// The node's own visual marks
    pub fn marks(&self) -> &Marks {
        &self.marks
    }

    /// Rendered sub-controls
    pub fn fragment(&self) -> &NodeFragment {
        &self.fragment
    }

    /// Name field
    pub fn name_field(&self) -> &TextField {
        &self.fragment.name
    }

    /// Mutable name field, for attaching extra input listeners
    pub fn name_field_mut(&mut self) -> &mut TextField {
        &mut self.fragment.name
    }

    /// Description field
    pub fn description_field(&self) -> &TextField {
        &self.fragment.description
    }

    /// Mutable description field, for attaching extra input listeners
    pub fn description_field_mut(&mut self) -> &mut TextField {
        &mut self.fragment.description
    }

    /// Kind selectors
    pub fn kind_selection(&self) -> &KindSelection {
        &self.fragment.kinds
    }

    /// Subscribe to a notification. Returns the node for chaining.
    pub fn on(&mut self, kind: NodeEventKind, callback: impl FnMut(&NodeEvent) + 'static) -> &mut Self {
        self.events.subscribe(kind, callback);
        self
    }

    /// Subscribe to a notification by name (`delete`, `drop`, `dropAsChild`)
    pub fn on_named(
        &mut self,
        name: &str,
        callback: impl FnMut(&NodeEvent) + 'static,
    ) -> std::result::Result<&mut Self, ParseEventError> {
        let kind = name.parse()?;
        Ok(self.on(kind, callback))
    }

    /// User edited the name field
    pub fn input_name(&mut self, text: impl Into<String>) -> Result<()> {
        let object = self.object.as_ref().ok_or(NodeError::Unbound)?;
        self.fragment.name.input(text);
        object.set_name(self.fragment.name.value());
        Ok(())
    }

    /// User edited the description field
    pub fn input_description(&mut self, text: impl Into<String>) -> Result<()> {
        let object = self.object.as_ref().ok_or(NodeError::Unbound)?;
        self.fragment.description.input(text);
        object.set_description(self.fragment.description.value());
        Ok(())
    }

    /// User activated a kind selector
    pub fn activate_kind(&mut self, kind: ObjectKind) -> Result<()> {
        if self.object.is_none() {
            return Err(NodeError::Unbound);
        }
        self.fragment.kinds.selector_mut(kind).activate();
        self.apply_kind(kind);
        Ok(())
    }

    fn apply_kind(&mut self, kind: ObjectKind) {
        self.fragment.kinds.select(kind);
        if let Some(object) = &self.object {
            object.set_kind(kind);
        }
    }

    /// User activated the delete affordance. Only notifies.
    pub fn activate_delete(&mut self) {
        self.fragment.delete.activate();
        self.events.emit(&NodeEvent::Delete);
    }

    /// Pointer went down somewhere inside the node
    pub fn press(&self, target: PressTarget) {
        self.session.press(target);
    }

    /// Whether any node of this session is being dragged
    pub fn drag_in_flight(&self) -> bool {
        self.session.is_dragging()
    }

    /// The drag gesture started on this node
    pub fn drag_start(&mut self) -> Result<DragStart> {
        let object = self.object.clone().ok_or(NodeError::Unbound)?;
        let outcome = self.session.begin(object, self.parent.clone(), self.marks.clone());
        if outcome == DragStart::Started {
            tracing::debug!("Drag started from container {:?}", self.parent.label);
        }
        Ok(outcome)
    }

    /// A drag gesture ended on this node, dropped or not.
    ///
    /// Only the node the drag started on ends the session. Any other node
    /// just forgets the press origin.
    pub fn drag_end(&mut self) {
        if !self.marks.contains(Mark::Dragged) {
            self.session.clear_press();
            return;
        }
        match self.session.end() {
            Some(payload) => tracing::debug!("Drag of {:?} ended", payload.object),
            None => {
                self.marks.remove(Mark::Dragged);
                self.parent.marks.remove(Mark::Dragging);
            }
        }
    }

    /// A drag hovers one of the node's regions
    pub fn drag_over(&self, region: RegionKind) -> DropEffect {
        self.fragment.region(region).drag_over()
    }

    /// A drag entered one of the node's regions
    pub fn drag_enter(&self, region: RegionKind) {
        self.fragment.region(region).drag_enter();
    }

    /// A drag left one of the node's regions
    pub fn drag_leave(&self, region: RegionKind) {
        self.fragment.region(region).drag_leave();
    }

    /// The dragged object was released over one of the node's regions.
    ///
    /// Emits `drop` or `dropAsChild` with the object recorded at drag-start
    /// and returns the event. Returns `None` when no drag is in flight.
    pub fn drop_into(&mut self, region: RegionKind) -> Option<NodeEvent> {
        self.fragment.region(region).drag_leave();

        let Some(dragged) = self.session.dragged_object() else {
            tracing::warn!("Drop on {:?} region with no drag in flight", region);
            return None;
        };

        let event = match region {
            RegionKind::Sibling => NodeEvent::Drop(dragged),
            RegionKind::Child => NodeEvent::DropAsChild(dragged),
        };
        self.events.emit(&event);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::Container;
    use crate::object::WorldObject;
    use crate::template::ObjectNodeTemplate;
    use std::cell::RefCell;

    fn object(name: &str, kind: ObjectKind) -> ObjectRef {
        ObjectRef::new(WorldObject::new(name, kind))
    }

    fn node(container: &ContainerHandle, session: &Rc<DragSession>) -> NodeControl {
        NodeControl::new(container.clone(), &ObjectNodeTemplate, session.clone())
    }

    fn record(node: &mut NodeControl) -> Rc<RefCell<Vec<NodeEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for &kind in NodeEventKind::all() {
            let log = seen.clone();
            node.on(kind, move |e| log.borrow_mut().push(e.clone()));
        }
        seen
    }

    fn highlighted(node: &NodeControl) -> Vec<ObjectKind> {
        node.kind_selection()
            .selectors()
            .filter(|s| s.selected())
            .map(|s| s.kind)
            .collect()
    }

    #[test]
    fn test_torch_scenario() {
        let session = DragSession::shared();
        let root = Container::new("root");
        let mut node = node(&root, &session);
        let seen = record(&mut node);

        let torch = object("Torch", ObjectKind::Item);
        node.set_value(torch.clone());
        assert_eq!(highlighted(&node), vec![ObjectKind::Item]);

        node.activate_kind(ObjectKind::Actor).unwrap();
        assert_eq!(torch.kind(), ObjectKind::Actor);
        assert_eq!(highlighted(&node), vec![ObjectKind::Actor]);

        node.input_name("Lit Torch").unwrap();
        assert_eq!(torch.name(), "Lit Torch");

        node.activate_delete();
        assert_eq!(*seen.borrow(), vec![NodeEvent::Delete]);
    }

    #[test]
    fn test_new_node_is_unbound() {
        let session = DragSession::shared();
        let mut node = node(&Container::new("root"), &session);

        assert!(node.value().is_none());
        assert_eq!(node.input_name("x"), Err(NodeError::Unbound));
        assert_eq!(node.input_description("x"), Err(NodeError::Unbound));
        assert_eq!(node.activate_kind(ObjectKind::Actor), Err(NodeError::Unbound));
        assert_eq!(node.drag_start(), Err(NodeError::Unbound));
    }

    #[test]
    fn test_rebinding_overwrites_every_field() {
        let session = DragSession::shared();
        let mut node = node(&Container::new("root"), &session);

        for &before in ObjectKind::all() {
            for &after in ObjectKind::all() {
                let first = ObjectRef::new(WorldObject::new("First", before).with_description("old"));
                let second = object("Second", after);

                node.set_value(first);
                node.set_value(second.clone());

                assert_eq!(node.name_field().value(), "Second");
                assert_eq!(node.description_field().value(), "");
                assert_eq!(highlighted(&node), vec![after]);
                assert!(node.value().is_some_and(|o| o == &second));
            }
        }
    }

    #[test]
    fn test_kind_transitions_keep_one_highlight() {
        let session = DragSession::shared();
        let mut node = node(&Container::new("root"), &session);

        for &from in ObjectKind::all() {
            for &to in ObjectKind::all() {
                let target = object("Thing", from);
                node.set_value(target.clone());
                node.activate_kind(to).unwrap();
                assert_eq!(target.kind(), to);
                assert_eq!(highlighted(&node), vec![to]);
            }
        }
    }

    #[test]
    fn test_field_input_syncs_exact_text() {
        let session = DragSession::shared();
        let mut node = node(&Container::new("root"), &session);
        let coin = object("Coin", ObjectKind::Item);
        node.set_value(coin.clone());

        for text in ["", "G", "Gold coin", "", "  spaced  "] {
            node.input_name(text).unwrap();
            assert_eq!(coin.name(), text);
            node.input_description(text).unwrap();
            assert_eq!(coin.description(), text);
        }
    }

    #[test]
    fn test_field_listeners_still_fire() {
        let session = DragSession::shared();
        let mut node = node(&Container::new("root"), &session);
        node.set_value(object("Coin", ObjectKind::Item));

        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        node.name_field_mut().on_input(move |_| *counter.borrow_mut() += 1);

        node.input_name("a").unwrap();
        node.input_name("ab").unwrap();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_drag_from_text_field_is_suppressed() {
        let session = DragSession::shared();
        let root = Container::new("root");
        let mut node = node(&root, &session);
        node.set_value(object("Rope", ObjectKind::Item));

        for _field in ["name", "description"] {
            node.press(PressTarget::TextField);
            assert_eq!(node.drag_start(), Ok(DragStart::Suppressed));
            assert!(!session.is_dragging());
            assert!(node.marks().is_empty());
            assert!(root.marks.is_empty());
        }
    }

    #[test]
    fn test_drag_marks_node_and_parent_until_end() {
        let session = DragSession::shared();
        let root = Container::new("root");
        let children = Container::new("children");
        let mut parent = node(&root, &session);
        let mut child = node(&children, &session);
        parent.set_value(object("Chest", ObjectKind::Scenery));
        child.set_value(object("Coin", ObjectKind::Item));

        child.press(PressTarget::Body);
        assert_eq!(child.drag_start(), Ok(DragStart::Started));
        assert!(child.marks().contains(Mark::Dragged));
        assert!(children.marks.contains(Mark::Dragging));
        assert!(parent.marks().is_empty());
        assert!(root.marks.is_empty());

        // cancelled: no drop
        child.drag_end();
        assert!(child.marks().is_empty());
        assert!(children.marks.is_empty());
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_drag_end_on_other_node_keeps_drag_alive() {
        let session = DragSession::shared();
        let root = Container::new("root");
        let mut source = node(&root, &session);
        let mut bystander = node(&root, &session);
        let mut target = node(&root, &session);
        let lantern = object("Lantern", ObjectKind::Item);
        source.set_value(lantern.clone());
        bystander.set_value(object("Bench", ObjectKind::Scenery));
        target.set_value(object("Hook", ObjectKind::Scenery));

        source.press(PressTarget::Body);
        source.drag_start().unwrap();
        bystander.drag_end();

        assert!(session.is_dragging());
        assert!(source.marks().contains(Mark::Dragged));
        assert!(root.marks.contains(Mark::Dragging));
        assert!(bystander.marks().is_empty());
        assert_eq!(target.drop_into(RegionKind::Child), Some(NodeEvent::DropAsChild(lantern)));

        source.drag_end();
        assert!(!session.is_dragging());
        assert!(source.marks().is_empty());
        assert!(root.marks.is_empty());
    }

    #[test]
    fn test_drop_on_sibling_region_carries_dragged_object() {
        let session = DragSession::shared();
        let root = Container::new("root");
        let mut source = node(&root, &session);
        let mut target = node(&root, &session);
        let rope = object("Rope", ObjectKind::Item);
        source.set_value(rope.clone());
        target.set_value(object("Well", ObjectKind::Scenery));
        let seen = record(&mut target);

        source.press(PressTarget::Body);
        source.drag_start().unwrap();
        source.input_name("Frayed rope").unwrap();

        assert_eq!(target.drag_over(RegionKind::Sibling), DropEffect::Move);
        target.drag_enter(RegionKind::Sibling);
        assert!(target.fragment().sibling_region.is_active());
        let event = target.drop_into(RegionKind::Sibling);
        source.drag_end();

        assert_eq!(event, Some(NodeEvent::Drop(rope.clone())));
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].payload().is_some_and(|o| o.ptr_eq(&rope)));
        assert!(!target.fragment().sibling_region.is_active());
        assert!(root.marks.is_empty());
    }

    #[test]
    fn test_drop_on_child_region_emits_drop_as_child() {
        let session = DragSession::shared();
        let root = Container::new("root");
        let mut source = node(&root, &session);
        let mut target = node(&root, &session);
        let rope = object("Rope", ObjectKind::Item);
        source.set_value(rope.clone());
        target.set_value(object("Well", ObjectKind::Scenery));
        let seen = record(&mut target);

        source.press(PressTarget::Body);
        source.drag_start().unwrap();
        target.drag_enter(RegionKind::Child);
        target.drag_leave(RegionKind::Child);
        target.drag_enter(RegionKind::Child);
        target.drop_into(RegionKind::Child);
        source.drag_end();

        assert_eq!(*seen.borrow(), vec![NodeEvent::DropAsChild(rope)]);
    }

    #[test]
    fn test_drop_without_drag_emits_nothing() {
        let session = DragSession::shared();
        let mut target = node(&Container::new("root"), &session);
        target.set_value(object("Well", ObjectKind::Scenery));
        let seen = record(&mut target);

        assert_eq!(target.drop_into(RegionKind::Sibling), None);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_payload_is_cleared_after_drag_end() {
        let session = DragSession::shared();
        let root = Container::new("root");
        let mut source = node(&root, &session);
        let mut target = node(&root, &session);
        source.set_value(object("Rope", ObjectKind::Item));
        target.set_value(object("Well", ObjectKind::Scenery));

        source.press(PressTarget::Body);
        source.drag_start().unwrap();
        source.drag_end();

        assert_eq!(target.drop_into(RegionKind::Child), None);
    }

    #[test]
    fn test_sessions_are_independent() {
        let first = DragSession::shared();
        let second = DragSession::shared();
        let root = Container::new("root");
        let mut a = node(&root, &first);
        let mut b = node(&root, &second);
        a.set_value(object("A", ObjectKind::Actor));
        b.set_value(object("B", ObjectKind::Actor));

        a.press(PressTarget::Body);
        a.drag_start().unwrap();
        assert!(first.is_dragging());
        assert!(!second.is_dragging());
        assert_eq!(b.drop_into(RegionKind::Sibling), None);
    }

    #[test]
    fn test_named_subscription() {
        let session = DragSession::shared();
        let mut node = node(&Container::new("root"), &session);
        let count = Rc::new(RefCell::new(0));

        let counter = count.clone();
        assert!(node.on_named("delete", move |_| *counter.borrow_mut() += 1).is_ok());
        assert!(node.on_named("remove", |_| {}).is_err());

        node.activate_delete();
        assert_eq!(*count.borrow(), 1);
    }
}
