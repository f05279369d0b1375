// SPDX-License-Identifier: MIT OR Apache-2.0
//! RON persistence for object trees.

use crate::tree::{ObjectTree, TreeError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storyworld_editor_node::{ObjectId, ObjectRef, WorldObject};
use thiserror::Error;

/// Current document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// File extension for tree documents
pub const DOCUMENT_EXTENSION: &str = "world.ron";

/// Document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed document
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Document written by a newer editor
    #[error("Document version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// The same object appears twice
    #[error("Duplicate object in document: {0}")]
    DuplicateObject(ObjectId),

    /// The document does not describe a valid tree
    #[error("Invalid tree: {0}")]
    Tree(#[from] TreeError),
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// One object with its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Object data
    pub object: WorldObject,
    /// Children in order
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

/// Serialized form of an [`ObjectTree`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    /// Format version
    pub version: u32,
    /// Root objects in order
    pub roots: Vec<DocumentNode>,
}

impl TreeDocument {
    /// Snapshot a tree
    pub fn from_tree(tree: &ObjectTree) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            roots: tree.roots().iter().filter_map(|id| Self::node(tree, *id)).collect(),
        }
    }

    fn node(tree: &ObjectTree, id: ObjectId) -> Option<DocumentNode> {
        let object = tree.get(id)?.snapshot();
        let children = tree
            .children_of(id)
            .iter()
            .filter_map(|child| Self::node(tree, *child))
            .collect();
        Some(DocumentNode { object, children })
    }

    /// Build a live tree from the document
    pub fn into_tree(self) -> Result<ObjectTree> {
        let mut tree = ObjectTree::new();
        let mut pending: Vec<(Option<ObjectId>, DocumentNode)> =
            self.roots.into_iter().rev().map(|node| (None, node)).collect();

        while let Some((parent, node)) = pending.pop() {
            let object = ObjectRef::new(node.object);
            let inserted = match parent {
                Some(parent) => tree.insert_child(parent, object),
                None => tree.insert_root(object),
            };
            let id = inserted.map_err(|e| match e {
                TreeError::AlreadyPresent(id) => DocumentError::DuplicateObject(id),
                other => DocumentError::Tree(other),
            })?;
            pending.extend(node.children.into_iter().rev().map(|child| (Some(id), child)));
        }
        Ok(tree)
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Parse a RON string
    pub fn from_ron(content: &str) -> Result<Self> {
        let document: TreeDocument = ron::from_str(content)?;
        if document.version > DOCUMENT_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.version,
                supported: DOCUMENT_FORMAT_VERSION,
            });
        }
        Ok(document)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document = Self::from_ron(&content)?;
        tracing::info!("Loaded world document {:?}", path);
        Ok(document)
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved world document {:?}", path);
        Ok(())
    }
}

impl Default for TreeDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            roots: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyworld_editor_node::ObjectKind;

    fn sample_tree() -> ObjectTree {
        let mut tree = ObjectTree::new();
        let hall = tree
            .insert_root(ObjectRef::new(WorldObject::new("Hall", ObjectKind::Scenery)))
            .unwrap();
        tree.insert_child(
            hall,
            ObjectRef::new(WorldObject::new("Guard", ObjectKind::Actor).with_description("Sleeps a lot")),
        )
        .unwrap();
        tree.insert_root(ObjectRef::new(WorldObject::new("Key", ObjectKind::Item)))
            .unwrap();
        tree
    }

    #[test]
    fn test_document_preserves_structure() {
        let tree = sample_tree();
        let ron = TreeDocument::from_tree(&tree).to_ron().unwrap();
        let loaded = TreeDocument::from_ron(&ron).unwrap().into_tree().unwrap();

        let names: Vec<(String, usize)> = loaded
            .depth_first()
            .into_iter()
            .map(|(id, depth)| (loaded.get(id).unwrap().name(), depth))
            .collect();
        assert_eq!(
            names,
            vec![("Hall".to_string(), 0), ("Guard".to_string(), 1), ("Key".to_string(), 0)]
        );
        assert_eq!(loaded.depth_first(), tree.depth_first());
    }

    #[test]
    fn test_newer_version_rejected() {
        let document = TreeDocument {
            version: DOCUMENT_FORMAT_VERSION + 1,
            roots: Vec::new(),
        };
        let ron = document.to_ron().unwrap();
        assert!(matches!(
            TreeDocument::from_ron(&ron),
            Err(DocumentError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_duplicate_object_rejected() {
        let object = WorldObject::new("Twin", ObjectKind::Actor);
        let document = TreeDocument {
            version: DOCUMENT_FORMAT_VERSION,
            roots: vec![
                DocumentNode { object: object.clone(), children: Vec::new() },
                DocumentNode { object, children: Vec::new() },
            ],
        };
        assert!(matches!(document.into_tree(), Err(DocumentError::DuplicateObject(_))));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(TreeDocument::from_ron("not a world"), Err(DocumentError::Parse(_))));
    }
}
