// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object node control for the Storyworld Editor.
//!
//! One node is the editable row for a world object (actor, item or scenery):
//! - Name and description fields synced into the bound object
//! - Mutually exclusive kind selectors
//! - A delete affordance
//! - Drag and drop with sibling and child drop regions
//!
//! ## Architecture
//!
//! A node is built from a named template, bound to a shared [`ObjectRef`] and
//! driven through its input handlers. All nodes of an editor share one
//! [`DragSession`], which carries the dragged object from the drag source to
//! the drop target. Nodes report `delete`, `drop` and `dropAsChild` on an
//! event bus; the tree that owns them decides what those mean.

pub mod object;
pub mod events;
pub mod field;
pub mod drag;
pub mod template;
pub mod control;
pub mod ui;

pub use object::{ObjectId, ObjectKind, ObjectRef, WorldObject};
pub use events::{EventBus, NodeEvent, NodeEventKind, ParseEventError};
pub use field::{Button, KindSelection, KindSelector, TextField};
pub use drag::{Container, ContainerHandle, DragSession, DragStart, DropEffect, DropRegion, Mark, PressTarget, RegionKind};
pub use template::{NodeFragment, NodeTemplate, ObjectNodeTemplate, TemplateError, TemplateRegistry, OBJECT_NODE_TEMPLATE};
pub use control::{NodeControl, NodeError};
pub use ui::{show_node, NodeResponse};
