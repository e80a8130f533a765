//! Outbound bridge between scripts and the host
//!
//! Nodes hand messages to the bridge fire-and-forget; the host decides what
//! a message means (actor calls, UI, audio...). Inbound traffic goes through
//! [`Director::trigger_input`](crate::Director::trigger_input) and
//! [`Director::trigger_event`](crate::Director::trigger_event).

use crate::{GraphId, NodeId, Property, PropertySet, Tick};
use serde::{Deserialize, Serialize};

/// A message emitted by a node for the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message name, interpreted by the host
    pub name: String,
    /// Message parameters
    pub params: PropertySet,
    /// Graph of the emitting node
    pub source_graph: GraphId,
    /// The emitting node
    pub source_node: NodeId,
    /// The tick the message was emitted in
    pub tick: Tick,
}

impl OutboundMessage {
    /// Create a message without parameters
    pub fn new(name: impl Into<String>, source_graph: GraphId, source_node: NodeId, tick: Tick) -> Self {
        Self {
            name: name.into(),
            params: PropertySet::new(),
            source_graph,
            source_node,
            tick,
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Property>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Receiver of outbound messages
pub trait Bridge {
    /// Deliver a message; no result is observed by the script
    fn send_message(&mut self, message: OutboundMessage);
}

/// Bridge that drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBridge;

impl Bridge for NullBridge {
    fn send_message(&mut self, _message: OutboundMessage) {}
}

/// Bridge that keeps every message, in emission order
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    messages: Vec<OutboundMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[OutboundMessage] {
        &self.messages
    }

    /// Names of all messages, in emission order
    pub fn names(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.name.as_str()).collect()
    }

    /// Remove and return all messages
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Bridge for MessageLog {
    fn send_message(&mut self, message: OutboundMessage) {
        self.messages.push(message);
    }
}
