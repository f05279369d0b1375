// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named notifications emitted by a node control.
//!
//! A node never calls back into the tree directly. It publishes `delete`,
//! `drop` and `dropAsChild` on an [`EventBus`] and whoever owns the node
//! subscribes to the names it cares about.

use crate::object::ObjectRef;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// A list of callbacks notified with a borrowed value
pub struct Listeners<T: ?Sized> {
    callbacks: Vec<Box<dyn FnMut(&T)>>,
}

impl<T: ?Sized> Listeners<T> {
    /// Create an empty listener list
    pub fn new() -> Self {
        Self { callbacks: Vec::new() }
    }

    /// Register a callback
    pub fn add(&mut self, callback: impl FnMut(&T) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Call every callback in registration order, returning how many ran
    pub fn notify(&mut self, value: &T) -> usize {
        for callback in &mut self.callbacks {
            callback(value);
        }
        self.callbacks.len()
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.callbacks.len()).finish()
    }
}

/// Names of the notifications a node emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEventKind {
    /// The delete affordance was activated
    Delete,
    /// An object was dropped on the sibling region
    Drop,
    /// An object was dropped on the child region
    DropAsChild,
}

impl NodeEventKind {
    /// All event kinds
    pub fn all() -> &'static [NodeEventKind] {
        &[NodeEventKind::Delete, NodeEventKind::Drop, NodeEventKind::DropAsChild]
    }

    /// Event name as used by subscribers
    pub fn name(&self) -> &'static str {
        match self {
            NodeEventKind::Delete => "delete",
            NodeEventKind::Drop => "drop",
            NodeEventKind::DropAsChild => "dropAsChild",
        }
    }
}

impl fmt::Display for NodeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NodeEventKind {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseEventError(s.to_string()))
    }
}

/// Error when subscribing to an event name a node never emits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node event: {0:?}")]
pub struct ParseEventError(pub String);

/// A notification with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// Delete requested, no payload
    Delete,
    /// The dragged object should become a sibling of the receiving node
    Drop(ObjectRef),
    /// The dragged object should become a child of the receiving node
    DropAsChild(ObjectRef),
}

impl NodeEvent {
    /// The event's name
    pub fn kind(&self) -> NodeEventKind {
        match self {
            NodeEvent::Delete => NodeEventKind::Delete,
            NodeEvent::Drop(_) => NodeEventKind::Drop,
            NodeEvent::DropAsChild(_) => NodeEventKind::DropAsChild,
        }
    }

    /// The dragged object carried by drop events
    pub fn payload(&self) -> Option<&ObjectRef> {
        match self {
            NodeEvent::Delete => None,
            NodeEvent::Drop(object) | NodeEvent::DropAsChild(object) => Some(object),
        }
    }
}

/// Named event to listener list mapping
#[derive(Debug, Default)]
pub struct EventBus {
    listeners: IndexMap<NodeEventKind, Listeners<NodeEvent>>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event name
    pub fn subscribe(&mut self, kind: NodeEventKind, callback: impl FnMut(&NodeEvent) + 'static) {
        self.listeners.entry(kind).or_default().add(callback);
    }

    /// Deliver an event to its subscribers, returning how many were notified
    pub fn emit(&mut self, event: &NodeEvent) -> usize {
        let kind = event.kind();
        let delivered = self
            .listeners
            .get_mut(&kind)
            .map_or(0, |listeners| listeners.notify(event));
        tracing::trace!("Emitted {} to {} listener(s)", kind, delivered);
        delivered
    }

    /// Number of subscribers for an event name
    pub fn listener_count(&self, kind: NodeEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Listeners::len)
    }
}
