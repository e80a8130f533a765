//! Nodes: graph vertices holding links, properties and one behavior

use crate::context::UpdateContext;
use crate::error::{Error, NodeResult, Result};
use crate::link::{InputLink, OutputLink, ValueLink};
use crate::{GraphId, NodeId, NodeTypeId, Property, PropertySet, PropertyType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the single property a value node stores
pub const VALUE_PROPERTY: &str = "Value";

/// Capability class of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Has inputs and outputs and does work when an input fires
    Action,
    /// Outputs only; fired by the host or by name
    Event,
    /// A shared data cell; never scheduled
    Value,
}

/// The single behavior contract every node implements
///
/// `update` is called once per drained activation. `input` is the index of
/// the input that fired (`None` for events started without an input) and
/// `first_update` is true only for the activation that begins a new
/// invocation. Returning `Ok(true)` asks to be called again next tick with
/// the same input and `first_update == false`.
pub trait NodeBehavior {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        input: Option<usize>,
        first_update: bool,
    ) -> NodeResult<bool>;
}

/// Behavior built from a closure, see [`from_fn`]
pub struct FromFn<F>(F);

/// Wrap a closure as a node behavior
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&mut UpdateContext<'_>, Option<usize>, bool) -> NodeResult<bool>,
{
    FromFn(f)
}

impl<F> NodeBehavior for FromFn<F>
where
    F: FnMut(&mut UpdateContext<'_>, Option<usize>, bool) -> NodeResult<bool>,
{
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        input: Option<usize>,
        first_update: bool,
    ) -> NodeResult<bool> {
        (self.0)(ctx, input, first_update)
    }
}

/// Behavior that fires every output once and finishes
///
/// The default for event nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FireOutputs;

impl NodeBehavior for FireOutputs {
    fn update(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        _input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        for index in 0..ctx.output_count() {
            ctx.activate_output_index(index);
        }
        Ok(false)
    }
}

/// Behavior that does nothing; used by value nodes
#[derive(Debug, Default, Clone, Copy)]
pub struct Inert;

impl NodeBehavior for Inert {
    fn update(
        &mut self,
        _ctx: &mut UpdateContext<'_>,
        _input: Option<usize>,
        _first_update: bool,
    ) -> NodeResult<bool> {
        Ok(false)
    }
}

/// A graph vertex
pub struct Node {
    id: NodeId,
    graph: GraphId,
    type_id: NodeTypeId,
    kind: NodeKind,
    /// Declared cell type of a value node
    value_type: Option<PropertyType>,
    inputs: Vec<InputLink>,
    outputs: Vec<OutputLink>,
    value_links: Vec<ValueLink>,
    properties: PropertySet,
    behavior: Option<Box<dyn NodeBehavior>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("graph", &self.graph)
            .field("type_id", &self.type_id)
            .field("kind", &self.kind)
            .field("value_type", &self.value_type)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("value_links", &self.value_links)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The graph this node belongs to
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn node_type(&self) -> &NodeTypeId {
        &self.type_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_value_node(&self) -> bool {
        self.kind == NodeKind::Value
    }

    /// The type a value node was declared with
    ///
    /// Fixed at construction; the cell never holds another type.
    pub fn value_type(&self) -> Option<&PropertyType> {
        self.value_type.as_ref()
    }

    pub fn inputs(&self) -> &[InputLink] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputLink] {
        &self.outputs
    }

    pub fn value_links(&self) -> &[ValueLink] {
        &self.value_links
    }

    pub fn input(&self, index: usize) -> Option<&InputLink> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&OutputLink> {
        self.outputs.get(index)
    }

    pub fn value_link(&self, index: usize) -> Option<&ValueLink> {
        self.value_links.get(index)
    }

    /// Find an input index by name
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|l| l.name() == name)
    }

    /// Find an output index by name
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|l| l.name() == name)
    }

    /// Find a value link index by name
    pub fn value_link_index(&self, name: &str) -> Option<usize> {
        self.value_links.iter().position(|l| l.name() == name)
    }

    /// The node's own (non-linked) properties
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// Get a property, preferring a value link default of the same name
    ///
    /// This does not follow value link connections; use
    /// [`Script::property`](crate::Script::property) for the resolved value.
    pub fn local_property(&self, name: &str) -> Option<&Property> {
        match self.value_links.iter().find(|l| l.name() == name) {
            Some(link) => Some(link.default_property()),
            None => self.properties.get(name),
        }
    }

    /// Set the node's own property or a value link default of the same name
    ///
    /// Writing the cell of a value node goes through [`Node::set_value`];
    /// a value of the wrong type is refused and `false` returned.
    pub fn set_local_property(&mut self, name: impl Into<String>, value: impl Into<Property>) -> bool {
        let name = name.into();
        if self.is_value_node() && name == VALUE_PROPERTY {
            return self.set_value(value.into());
        }
        match self.value_links.iter_mut().find(|l| l.name() == name) {
            Some(link) => *link.default_property_mut() = value.into(),
            None => {
                self.properties.insert(name, value.into());
            }
        }
        true
    }

    /// The cell of a value node
    pub fn value(&self) -> Option<&Property> {
        match self.kind {
            NodeKind::Value => self.properties.get(VALUE_PROPERTY),
            _ => None,
        }
    }

    /// Store a new cell value, converted to the declared type
    ///
    /// Returns `false` (leaving the cell unchanged) for nodes that are not
    /// value nodes and for values that cannot be converted.
    pub fn set_value(&mut self, value: Property) -> bool {
        let Some(declared) = &self.value_type else {
            return false;
        };
        match value.coerce_to(declared) {
            Some(value) => {
                self.properties.insert(VALUE_PROPERTY.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Add one pulse to an output (used by the host to drive a node by hand)
    pub fn activate_output(&mut self, index: usize) -> bool {
        match self.outputs.get_mut(index) {
            Some(output) => {
                output.activate();
                true
            }
            None => false,
        }
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> Option<&mut InputLink> {
        self.inputs.get_mut(index)
    }

    pub(crate) fn output_mut(&mut self, index: usize) -> Option<&mut OutputLink> {
        self.outputs.get_mut(index)
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut [OutputLink] {
        &mut self.outputs
    }

    pub(crate) fn value_link_mut(&mut self, index: usize) -> Option<&mut ValueLink> {
        self.value_links.get_mut(index)
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut [InputLink] {
        &mut self.inputs
    }

    pub(crate) fn value_links_mut(&mut self) -> &mut [ValueLink] {
        &mut self.value_links
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn NodeBehavior>> {
        self.behavior.take()
    }

    pub(crate) fn restore_behavior(&mut self, behavior: Box<dyn NodeBehavior>) {
        self.behavior = Some(behavior);
    }
}

/// Description of a node before it is placed in a graph
///
/// Produced by registry factories and consumed by
/// [`Script::add_node`](crate::Script::add_node).
pub struct NodeBuilder {
    type_id: NodeTypeId,
    kind: NodeKind,
    value_type: Option<PropertyType>,
    inputs: Vec<InputLink>,
    outputs: Vec<OutputLink>,
    value_links: Vec<ValueLink>,
    properties: PropertySet,
    behavior: Box<dyn NodeBehavior>,
}

impl NodeBuilder {
    /// An action node with the given behavior
    pub fn action(type_id: NodeTypeId, behavior: impl NodeBehavior + 'static) -> Self {
        Self::with_kind(type_id, NodeKind::Action, Box::new(behavior))
    }

    /// An event node with the given behavior
    pub fn event(type_id: NodeTypeId, behavior: impl NodeBehavior + 'static) -> Self {
        Self::with_kind(type_id, NodeKind::Event, Box::new(behavior))
    }

    /// A value node holding `initial` as its shared cell
    ///
    /// The cell's type is declared by `initial` and fixed from then on.
    pub fn value(type_id: NodeTypeId, initial: impl Into<Property>) -> Self {
        let initial = initial.into();
        let mut builder = Self::with_kind(type_id, NodeKind::Value, Box::new(Inert));
        builder.value_type = Some(initial.property_type());
        builder.properties.insert(VALUE_PROPERTY.to_string(), initial);
        builder
    }

    fn with_kind(type_id: NodeTypeId, kind: NodeKind, behavior: Box<dyn NodeBehavior>) -> Self {
        Self {
            type_id,
            kind,
            value_type: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            value_links: Vec::new(),
            properties: PropertySet::new(),
            behavior,
        }
    }

    /// Append an input link
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(InputLink::new(name));
        self
    }

    /// Append an output link
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(OutputLink::new(name));
        self
    }

    /// Append a value link
    pub fn value_link(mut self, link: ValueLink) -> Self {
        self.value_links.push(link);
        self
    }

    /// Set a plain property
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Property>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Apply authored property values
    ///
    /// A name matching a value link replaces that link's default; any other
    /// name sets a plain property. The cell of a value node only accepts
    /// values convertible to its declared type.
    pub fn with_overrides(mut self, overrides: &PropertySet) -> Result<Self> {
        for (name, value) in overrides {
            if let (Some(declared), VALUE_PROPERTY) = (&self.value_type, name.as_str()) {
                let cell = value.clone().coerce_to(declared).ok_or_else(|| Error::TypeMismatch {
                    expected: declared.clone(),
                    got: value.property_type(),
                })?;
                self.properties.insert(name.clone(), cell);
                continue;
            }
            match self.value_links.iter_mut().find(|l| l.name() == name) {
                Some(link) => *link.default_property_mut() = value.clone(),
                None => {
                    self.properties.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(self)
    }

    pub fn node_type(&self) -> &NodeTypeId {
        &self.type_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub(crate) fn build(self, id: NodeId, graph: GraphId) -> Node {
        Node {
            id,
            graph,
            type_id: self.type_id,
            kind: self.kind,
            value_type: self.value_type,
            inputs: self.inputs,
            outputs: self.outputs,
            value_links: self.value_links,
            properties: self.properties,
            behavior: Some(self.behavior),
        }
    }
}
