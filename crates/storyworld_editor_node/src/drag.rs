// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drag and drop coordination between node controls.
//!
//! Only one drag gesture can be in flight, so every node of an editor shares
//! one [`DragSession`] by reference. The node that starts a drag records the
//! dragged object and its parent container there; drop targets read the
//! payload back from the session instead of from the gesture itself.

use crate::object::ObjectRef;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use uuid::Uuid;

/// Visual state marks applied to nodes, containers and drop regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// The node is the one being dragged
    Dragged,
    /// The container holds the node being dragged
    Dragging,
    /// A drag is hovering over this drop region
    Over,
}

impl Mark {
    fn bit(self) -> u8 {
        match self {
            Mark::Dragged => 1 << 0,
            Mark::Dragging => 1 << 1,
            Mark::Over => 1 << 2,
        }
    }
}

/// Set of visual marks, writable through a shared reference
#[derive(Debug, Default)]
pub struct Marks {
    bits: Cell<u8>,
}

impl Marks {
    /// Add a mark
    pub fn add(&self, mark: Mark) {
        self.bits.set(self.bits.get() | mark.bit());
    }

    /// Remove a mark
    pub fn remove(&self, mark: Mark) {
        self.bits.set(self.bits.get() & !mark.bit());
    }

    /// Check for a mark
    pub fn contains(&self, mark: Mark) -> bool {
        self.bits.get() & mark.bit() != 0
    }

    /// Whether no mark is set
    pub fn is_empty(&self) -> bool {
        self.bits.get() == 0
    }
}

/// Unique identifier for a row container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub Uuid);

impl ContainerId {
    /// Create a new random container ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

/// The list that node rows are mounted into
#[derive(Debug)]
pub struct Container {
    /// Container identifier
    pub id: ContainerId,
    /// Debug label
    pub label: String,
    /// Visual marks
    pub marks: Marks,
}

/// Shared handle to a container
pub type ContainerHandle = Rc<Container>;

impl Container {
    /// Create a new container handle
    pub fn new(label: impl Into<String>) -> ContainerHandle {
        Rc::new(Self {
            id: ContainerId::new(),
            label: label.into(),
            marks: Marks::default(),
        })
    }
}

/// Where a pointer press landed inside a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// Inside an editable text field
    TextField,
    /// Anywhere else on the row
    Body,
}

/// Result of a drag-start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStart {
    /// The drag is in progress
    Started,
    /// The press began in a text field; the gesture stays a text selection
    Suppressed,
}

/// Drop effect a region reports while a drag hovers it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    /// The dragged node will be moved
    Move,
}

/// The two drop regions of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// Drop to become a sibling of the node
    Sibling,
    /// Drop to become a child of the node
    Child,
}

/// Drop-sensitive region of a node
#[derive(Debug)]
pub struct DropRegion {
    /// Which region this is
    pub kind: RegionKind,
    /// Visual marks
    pub marks: Marks,
}

impl DropRegion {
    /// Create an inactive region
    pub fn new(kind: RegionKind) -> Self {
        Self {
            kind,
            marks: Marks::default(),
        }
    }

    /// A drag hovers the region; always accepted as a move
    pub fn drag_over(&self) -> DropEffect {
        DropEffect::Move
    }

    /// A drag entered the region
    pub fn drag_enter(&self) {
        self.marks.add(Mark::Over);
    }

    /// A drag left the region
    pub fn drag_leave(&self) {
        self.marks.remove(Mark::Over);
    }

    /// Whether a drag is hovering the region
    pub fn is_active(&self) -> bool {
        self.marks.contains(Mark::Over)
    }
}

/// What the session remembers about the drag in flight
#[derive(Debug, Clone)]
pub struct DragPayload {
    /// The object being dragged
    pub object: ObjectRef,
    /// The container the dragged node was mounted in at drag-start
    pub source: ContainerHandle,
    /// Marks of the node the drag started on
    pub node_marks: Rc<Marks>,
}

impl DragPayload {
    fn apply(&self) {
        self.node_marks.add(Mark::Dragged);
        self.source.marks.add(Mark::Dragging);
    }

    fn release(&self) {
        self.node_marks.remove(Mark::Dragged);
        self.source.marks.remove(Mark::Dragging);
    }
}

/// The drag in flight, shared by every node of one editor
#[derive(Debug, Default)]
pub struct DragSession {
    pressed: Cell<Option<PressTarget>>,
    active: RefCell<Option<DragPayload>>,
}

impl DragSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle session ready to be shared between nodes
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Record where the pointer went down
    pub fn press(&self, target: PressTarget) {
        self.pressed.set(Some(target));
    }

    /// Where the last press landed
    pub fn pressed(&self) -> Option<PressTarget> {
        self.pressed.get()
    }

    /// Forget where the pointer went down
    pub fn clear_press(&self) {
        self.pressed.set(None);
    }

    /// Try to start a drag of `object` out of `source`.
    ///
    /// On success the dragging node is marked `Dragged` through `node_marks`
    /// and `source` is marked `Dragging`. A payload left over from a drag
    /// that never ended has its marks released first.
    pub fn begin(&self, object: ObjectRef, source: ContainerHandle, node_marks: Rc<Marks>) -> DragStart {
        if self.pressed.get() == Some(PressTarget::TextField) {
            return DragStart::Suppressed;
        }

        let mut active = self.active.borrow_mut();
        if let Some(stale) = active.take() {
            tracing::warn!("Drag of {:?} started while {:?} was still recorded", object, stale.object);
            stale.release();
        }
        let payload = DragPayload { object, source, node_marks };
        payload.apply();
        *active = Some(payload);
        DragStart::Started
    }

    /// End the drag, releasing its marks and returning what was recorded.
    /// Always leaves the session idle.
    pub fn end(&self) -> Option<DragPayload> {
        self.pressed.set(None);
        let payload = self.active.borrow_mut().take();
        if let Some(payload) = &payload {
            payload.release();
        }
        payload
    }

    /// Whether a drag is in flight
    pub fn is_dragging(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// The object being dragged
    pub fn dragged_object(&self) -> Option<ObjectRef> {
        self.active.borrow().as_ref().map(|p| p.object.clone())
    }

    /// The container the dragged node came from
    pub fn source_container(&self) -> Option<ContainerHandle> {
        self.active.borrow().as_ref().map(|p| p.source.clone())
    }
}
