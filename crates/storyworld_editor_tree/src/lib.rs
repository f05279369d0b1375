// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object tree for the Storyworld Editor.
//!
//! This crate owns the world hierarchy behind the node controls:
//! - Ordered roots and children per object
//! - Sibling and child moves with ancestry validation
//! - Subtree deletion
//! - RON documents for saving and loading
//!
//! ## Architecture
//!
//! [`TreeController`] keeps one node control per object, all sharing one
//! drag session. Node notifications are queued and applied by
//! [`TreeController::process_events`]; the nodes themselves never mutate the
//! tree.

pub mod tree;
pub mod document;
pub mod controller;

pub use tree::{ObjectTree, TreeEntry, TreeError};
pub use document::{DocumentError, DocumentNode, TreeDocument, DOCUMENT_EXTENSION, DOCUMENT_FORMAT_VERSION};
pub use controller::{TreeController, TreeOutcome};
