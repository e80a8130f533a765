//! Control-flow and data-flow links
//!
//! Links never own what they connect to. Every connection is stored as a
//! reference (`NodeId` + link index) that resolves through the
//! [`Script`](crate::Script) arena, and connections are always recorded on
//! both sides. Only the script arena mutates connections, so the pairing
//! invariant can't be broken from outside this crate.

use crate::{NodeId, Property, PropertyType};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an output link: owning node plus output index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    pub node: NodeId,
    pub index: usize,
}

impl OutputRef {
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.out[{}]", self.node, self.index)
    }
}

/// Reference to an input link: owning node plus input index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRef {
    pub node: NodeId,
    pub index: usize,
}

impl InputRef {
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.in[{}]", self.node, self.index)
    }
}

/// Reference to a value link: owning node plus value link index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueLinkRef {
    pub node: NodeId,
    pub index: usize,
}

impl ValueLinkRef {
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

/// An input (control flow) link
#[derive(Debug, Clone)]
pub struct InputLink {
    name: String,
    connected: IndexSet<OutputRef>,
}

impl InputLink {
    /// Create an unconnected input
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected: IndexSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outputs connected to this input, in connection order
    pub fn connected_outputs(&self) -> impl Iterator<Item = &OutputRef> {
        self.connected.iter()
    }

    pub fn is_connected_to(&self, output: &OutputRef) -> bool {
        self.connected.contains(output)
    }

    pub fn connection_count(&self) -> usize {
        self.connected.len()
    }

    pub(crate) fn attach(&mut self, output: OutputRef) -> bool {
        self.connected.insert(output)
    }

    pub(crate) fn detach(&mut self, output: &OutputRef) -> bool {
        self.connected.shift_remove(output)
    }

    pub(crate) fn take_connections(&mut self) -> Vec<OutputRef> {
        self.connected.drain(..).collect()
    }
}

/// An output (control flow) link
///
/// Activation is counted: every [`activate`](OutputLink::activate) adds one
/// pulse and every successful [`test`](OutputLink::test) consumes one.
#[derive(Debug, Clone)]
pub struct OutputLink {
    name: String,
    connected: Vec<InputRef>,
    active_count: u32,
}

impl OutputLink {
    /// Create an unconnected, inactive output
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected: Vec::new(),
            active_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inputs connected to this output, in connection order
    pub fn connected_inputs(&self) -> &[InputRef] {
        &self.connected
    }

    pub fn is_connected_to(&self, input: &InputRef) -> bool {
        self.connected.contains(input)
    }

    /// Add one activation pulse
    pub fn activate(&mut self) {
        self.active_count = self.active_count.saturating_add(1);
    }

    /// Consume one activation pulse, returning whether there was one
    ///
    /// This is the only way the active count decreases.
    pub fn test(&mut self) -> bool {
        if self.active_count > 0 {
            self.active_count -= 1;
            true
        } else {
            false
        }
    }

    /// Number of pulses waiting to be consumed
    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    pub(crate) fn set_active_count(&mut self, count: u32) {
        self.active_count = count;
    }

    pub(crate) fn attach(&mut self, input: InputRef) -> bool {
        if self.connected.contains(&input) {
            return false;
        }
        self.connected.push(input);
        true
    }

    pub(crate) fn detach(&mut self, input: &InputRef) -> bool {
        let before = self.connected.len();
        self.connected.retain(|i| i != input);
        self.connected.len() != before
    }

    pub(crate) fn take_connections(&mut self) -> Vec<InputRef> {
        std::mem::take(&mut self.connected)
    }
}

/// A data-flow link bridging a node property to shared value nodes
///
/// When unconnected, reads and writes go to the link's own default
/// property. Once bound to one or more value nodes, they go to the value
/// nodes' property cells instead.
#[derive(Debug, Clone)]
pub struct ValueLink {
    name: String,
    is_output: bool,
    allow_multiple: bool,
    type_checked: bool,
    default: Property,
    connected: Vec<NodeId>,
}

impl ValueLink {
    /// An input-mode link (reads its source), single connection, type checked
    pub fn input(name: impl Into<String>, default: impl Into<Property>) -> Self {
        Self {
            name: name.into(),
            is_output: false,
            allow_multiple: false,
            type_checked: true,
            default: default.into(),
            connected: Vec::new(),
        }
    }

    /// An output-mode link (writes its targets), multiple connections, type checked
    pub fn output(name: impl Into<String>, default: impl Into<Property>) -> Self {
        Self {
            name: name.into(),
            is_output: true,
            allow_multiple: true,
            type_checked: true,
            default: default.into(),
            connected: Vec::new(),
        }
    }

    /// Set whether more than one value node may be bound
    pub fn allow_multiple(mut self, allow: bool) -> Self {
        self.allow_multiple = allow;
        self
    }

    /// Set whether bound value nodes must match the default's type
    pub fn type_checked(mut self, checked: bool) -> Self {
        self.type_checked = checked;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_output(&self) -> bool {
        self.is_output
    }

    pub fn allows_multiple(&self) -> bool {
        self.allow_multiple
    }

    pub fn is_type_checked(&self) -> bool {
        self.type_checked
    }

    /// The literal default used while the link is unconnected
    pub fn default_property(&self) -> &Property {
        &self.default
    }

    pub(crate) fn default_property_mut(&mut self) -> &mut Property {
        &mut self.default
    }

    pub fn property_type(&self) -> PropertyType {
        self.default.property_type()
    }

    /// Value nodes bound to this link, in binding order
    pub fn connected_value_nodes(&self) -> &[NodeId] {
        &self.connected
    }

    pub fn is_connected(&self) -> bool {
        !self.connected.is_empty()
    }

    pub fn is_connected_to(&self, value_node: NodeId) -> bool {
        self.connected.contains(&value_node)
    }

    /// Number of addressable value slots: the connection count, or one
    /// for the default when unconnected
    pub fn slot_count(&self) -> usize {
        self.connected.len().max(1)
    }

    pub(crate) fn attach(&mut self, value_node: NodeId) {
        self.connected.push(value_node);
    }

    pub(crate) fn detach(&mut self, value_node: NodeId) -> bool {
        let before = self.connected.len();
        self.connected.retain(|id| *id != value_node);
        self.connected.len() != before
    }

    pub(crate) fn take_connections(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.connected)
    }
}
