// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor panel implementations.

mod object_tree;

pub use object_tree::{untitled_document, ObjectTreePanel};
