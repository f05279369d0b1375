// SPDX-License-Identifier: MIT OR Apache-2.0
//! World object model shared between the tree and its node controls.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Unique identifier for a world object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a world object represents in the story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Something that acts: a character or creature
    Actor,
    /// Something that can be carried
    Item,
    /// Fixed parts of the world
    #[default]
    Scenery,
}

impl ObjectKind {
    /// All kinds in selector order
    pub fn all() -> &'static [ObjectKind] {
        &[ObjectKind::Actor, ObjectKind::Item, ObjectKind::Scenery]
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Actor => "Actor",
            ObjectKind::Item => "Item",
            ObjectKind::Scenery => "Scenery",
        }
    }
}

/// Plain data of a world object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Stable identifier
    pub id: ObjectId,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Object kind
    #[serde(default)]
    pub kind: ObjectKind,
}

impl WorldObject {
    /// Create a new object with the given name and kind
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            description: String::new(),
            kind,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Default for WorldObject {
    fn default() -> Self {
        Self::new("Object", ObjectKind::default())
    }
}

/// Shared handle to a world object.
///
/// The tree owns the objects; node controls hold clones of the handle while
/// they are bound and write user edits through it. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<WorldObject>>);

impl ObjectRef {
    /// Wrap an object in a new shared handle
    pub fn new(object: WorldObject) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Object identifier
    pub fn id(&self) -> ObjectId {
        self.0.borrow().id
    }

    /// Current name
    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Replace the name
    pub fn set_name(&self, name: impl Into<String>) {
        self.0.borrow_mut().name = name.into();
    }

    /// Current description
    pub fn description(&self) -> String {
        self.0.borrow().description.clone()
    }

    /// Replace the description
    pub fn set_description(&self, description: impl Into<String>) {
        self.0.borrow_mut().description = description.into();
    }

    /// Current kind
    pub fn kind(&self) -> ObjectKind {
        self.0.borrow().kind
    }

    /// Replace the kind
    pub fn set_kind(&self, kind: ObjectKind) {
        self.0.borrow_mut().kind = kind;
    }

    /// Copy of the current object data
    pub fn snapshot(&self) -> WorldObject {
        self.0.borrow().clone()
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<WorldObject> for ObjectRef {
    fn from(object: WorldObject) -> Self {
        Self::new(object)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let object = self.0.borrow();
        f.debug_struct("ObjectRef")
            .field("id", &object.id)
            .field("name", &object.name)
            .field("kind", &object.kind)
            .finish()
    }
}
