// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered object hierarchy.

use indexmap::IndexMap;
use storyworld_editor_node::{ObjectId, ObjectRef};
use thiserror::Error;

/// Tree mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Object not in the tree
    #[error("Object not found: {0}")]
    NotFound(ObjectId),

    /// An object with this ID is already in the tree
    #[error("Object already in tree: {0}")]
    AlreadyPresent(ObjectId),

    /// Object dropped onto itself
    #[error("Cannot move object {0} relative to itself")]
    SelfMove(ObjectId),

    /// Object dropped into its own subtree
    #[error("Cannot move object {dragged} into its own descendant {target}")]
    IntoDescendant {
        /// The object being moved
        dragged: ObjectId,
        /// The drop target inside the dragged subtree
        target: ObjectId,
    },
}

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// One object and its place in the hierarchy
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// The object
    pub object: ObjectRef,
    /// Parent object, `None` for roots
    pub parent: Option<ObjectId>,
    /// Children in display order
    pub children: Vec<ObjectId>,
}

/// Ordered forest of world objects
#[derive(Debug, Clone, Default)]
pub struct ObjectTree {
    entries: IndexMap<ObjectId, TreeEntry>,
    roots: Vec<ObjectId>,
}

impl ObjectTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root object
    pub fn insert_root(&mut self, object: ObjectRef) -> Result<ObjectId> {
        let id = self.insert_entry(object, None)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Append a child under `parent`
    pub fn insert_child(&mut self, parent: ObjectId, object: ObjectRef) -> Result<ObjectId> {
        if !self.entries.contains_key(&parent) {
            return Err(TreeError::NotFound(parent));
        }
        let id = self.insert_entry(object, Some(parent))?;
        if let Some(entry) = self.entries.get_mut(&parent) {
            entry.children.push(id);
        }
        Ok(id)
    }

    fn insert_entry(&mut self, object: ObjectRef, parent: Option<ObjectId>) -> Result<ObjectId> {
        let id = object.id();
        if self.entries.contains_key(&id) {
            return Err(TreeError::AlreadyPresent(id));
        }
        self.entries.insert(
            id,
            TreeEntry {
                object,
                parent,
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Remove an object and its whole subtree, returning the removed objects
    /// parent-first
    pub fn remove(&mut self, id: ObjectId) -> Result<Vec<ObjectRef>> {
        if !self.entries.contains_key(&id) {
            return Err(TreeError::NotFound(id));
        }
        self.detach(id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(entry) = self.entries.shift_remove(&next) {
                stack.extend(entry.children.iter().rev());
                removed.push(entry.object);
            }
        }
        Ok(removed)
    }

    /// Get an object by ID
    pub fn get(&self, id: ObjectId) -> Option<&ObjectRef> {
        self.entries.get(&id).map(|e| &e.object)
    }

    /// Check whether an object is in the tree
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Parent of an object
    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.entries.get(&id).and_then(|e| e.parent)
    }

    /// Children of an object in order
    pub fn children_of(&self, id: ObjectId) -> &[ObjectId] {
        self.entries.get(&id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Root objects in order
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Move `dragged` directly after `target`, under the same parent
    pub fn move_as_sibling(&mut self, dragged: ObjectId, target: ObjectId) -> Result<()> {
        self.validate_move(dragged, target)?;
        let parent = self.parent_of(target);

        self.detach(dragged);
        let siblings = self.siblings_mut(parent);
        let index = siblings
            .iter()
            .position(|id| *id == target)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(index, dragged);
        self.set_parent(dragged, parent);

        tracing::info!("Moved {} after {}", dragged, target);
        Ok(())
    }

    /// Move `dragged` to the end of `target`'s children
    pub fn move_as_child(&mut self, dragged: ObjectId, target: ObjectId) -> Result<()> {
        self.validate_move(dragged, target)?;

        self.detach(dragged);
        self.siblings_mut(Some(target)).push(dragged);
        self.set_parent(dragged, Some(target));

        tracing::info!("Moved {} under {}", dragged, target);
        Ok(())
    }

    fn validate_move(&self, dragged: ObjectId, target: ObjectId) -> Result<()> {
        for id in [dragged, target] {
            if !self.contains(id) {
                return Err(TreeError::NotFound(id));
            }
        }
        if dragged == target {
            return Err(TreeError::SelfMove(dragged));
        }
        if self.is_ancestor(dragged, target) {
            return Err(TreeError::IntoDescendant { dragged, target });
        }
        Ok(())
    }

    fn detach(&mut self, id: ObjectId) {
        let parent = self.parent_of(id);
        self.siblings_mut(parent).retain(|child| *child != id);
    }

    fn set_parent(&mut self, id: ObjectId, parent: Option<ObjectId>) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.parent = parent;
        }
    }

    fn siblings_mut(&mut self, parent: Option<ObjectId>) -> &mut Vec<ObjectId> {
        match parent.and_then(|p| self.entries.get_mut(&p)) {
            Some(entry) => &mut entry.children,
            None => &mut self.roots,
        }
    }

    /// All objects in display order with their depth
    pub fn depth_first(&self) -> Vec<(ObjectId, usize)> {
        let mut order = Vec::with_capacity(self.entries.len());
        let mut stack: Vec<(ObjectId, usize)> = self.roots.iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            order.push((id, depth));
            stack.extend(self.children_of(id).iter().rev().map(|child| (*child, depth + 1)));
        }
        order
    }
}
