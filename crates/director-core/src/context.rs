//! The view a node behavior gets of the engine during one update
//!
//! An `UpdateContext` borrows the script for the duration of a single
//! `NodeBehavior::update` call. Everything a behavior does to the outside
//! world goes through it: firing outputs, reading and writing properties
//! through value links, pushing work onto the drain stack, raising remote
//! events and sending messages to the host.

use crate::bridge::{Bridge, OutboundMessage};
use crate::director::PendingActivation;
use crate::error::{NodeError, NodeResult};
use crate::event::{find_remote_events, EventScope};
use crate::link::ValueLinkRef;
use crate::time::{Clock, Tick};
use crate::{ActorId, GraphId, Node, NodeId, Property, Script};
use std::collections::VecDeque;

/// Work a behavior scheduled besides its output pulses
#[derive(Debug, Default)]
pub(crate) struct Effects {
    /// Stack frames in push order
    pub pushed: Vec<VecDeque<PendingActivation>>,
    /// Remote event nodes to start next wave
    pub remote: Vec<NodeId>,
}

/// Engine access for one node update
pub struct UpdateContext<'a> {
    script: &'a mut Script,
    activation: PendingActivation,
    graph: GraphId,
    clock: &'a Clock,
    bridge: &'a mut dyn Bridge,
    default_scope: EventScope,
    effects: Effects,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(
        script: &'a mut Script,
        activation: PendingActivation,
        graph: GraphId,
        clock: &'a Clock,
        bridge: &'a mut dyn Bridge,
        default_scope: EventScope,
    ) -> Self {
        Self {
            script,
            activation,
            graph,
            clock,
            bridge,
            default_scope,
            effects: Effects::default(),
        }
    }

    pub(crate) fn into_effects(self) -> Effects {
        self.effects
    }

    // ========================================================================
    // Identity and time
    // ========================================================================

    /// The node being updated
    pub fn node_id(&self) -> NodeId {
        self.activation.node
    }

    /// The graph of the node being updated
    pub fn graph_id(&self) -> GraphId {
        self.graph
    }

    /// The input that fired, if any
    pub fn input(&self) -> Option<usize> {
        self.activation.input
    }

    /// Name of the input that fired
    pub fn input_name(&self) -> Option<&str> {
        let index = self.activation.input?;
        self.node().and_then(|n| n.input(index)).map(|l| l.name())
    }

    pub fn is_first_update(&self) -> bool {
        self.activation.first_update
    }

    pub fn tick(&self) -> Tick {
        self.clock.tick()
    }

    /// Simulated seconds of this tick (0 while paused)
    pub fn sim_delta(&self) -> f64 {
        self.clock.sim_delta()
    }

    /// Wall-clock seconds of this tick
    pub fn real_delta(&self) -> f64 {
        self.clock.real_delta()
    }

    /// Read-only access to the whole script
    pub fn script(&self) -> &Script {
        &*self.script
    }

    fn node(&self) -> Option<&Node> {
        self.script.node(self.activation.node)
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    pub fn input_count(&self) -> usize {
        self.node().map_or(0, |n| n.inputs().len())
    }

    pub fn output_count(&self) -> usize {
        self.node().map_or(0, |n| n.outputs().len())
    }

    /// Add one pulse to the named output
    pub fn activate_output(&mut self, name: &str) -> NodeResult<()> {
        let index = self.output_index(name)?;
        self.activate_output_index(index);
        Ok(())
    }

    /// Add one pulse to an output by index
    pub fn activate_output_index(&mut self, index: usize) -> bool {
        let node = self.activation.node;
        self.script
            .node_mut(node)
            .is_some_and(|n| n.activate_output(index))
    }

    /// Pending pulses on the named output
    pub fn output_active_count(&self, name: &str) -> u32 {
        self.node()
            .and_then(|n| n.output_index(name).and_then(|i| n.output(i)))
            .map_or(0, |o| o.active_count())
    }

    fn output_index(&self, name: &str) -> NodeResult<usize> {
        self.node()
            .and_then(|n| n.output_index(name))
            .ok_or_else(|| NodeError::UnknownLink(name.to_string()))
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Resolve a property through its value link, or the node's own property
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.script.property(self.activation.node, name)
    }

    /// Write a property through every bound value node (or the default)
    pub fn set_property(&mut self, name: &str, value: impl Into<Property>) -> bool {
        self.script.set_property(self.activation.node, name, value)
    }

    fn typed<'p, T>(
        &'p self,
        name: &str,
        expected: &'static str,
        read: impl FnOnce(&'p Property) -> Option<T>,
    ) -> NodeResult<T> {
        let property = self
            .property(name)
            .ok_or_else(|| NodeError::MissingProperty(name.to_string()))?;
        read(property).ok_or_else(|| NodeError::PropertyType {
            name: name.to_string(),
            expected,
            got: property.type_name(),
        })
    }

    pub fn get_bool(&self, name: &str) -> NodeResult<bool> {
        self.typed(name, "bool", Property::as_bool)
    }

    pub fn get_int(&self, name: &str) -> NodeResult<i64> {
        self.typed(name, "int", Property::as_int)
    }

    /// Read a float; integers widen
    pub fn get_float(&self, name: &str) -> NodeResult<f64> {
        self.typed(name, "float", Property::as_float)
    }

    pub fn get_string(&self, name: &str) -> NodeResult<String> {
        self.typed(name, "string", |p| p.as_str().map(str::to_string))
    }

    /// Read an actor reference; an unset actor reads as `None`
    pub fn get_actor(&self, name: &str) -> NodeResult<Option<ActorId>> {
        self.typed(name, "actor", |p| match p {
            Property::Actor(actor) => Some(*actor),
            _ => None,
        })
    }

    fn value_link(&self, name: &str) -> Option<ValueLinkRef> {
        let node = self.activation.node;
        self.node()
            .and_then(|n| n.value_link_index(name))
            .map(|index| ValueLinkRef::new(node, index))
    }

    /// Number of value slots behind the named value link (at least 1)
    pub fn value_slot_count(&self, name: &str) -> usize {
        self.value_link(name)
            .map_or(0, |link| self.script.value_slot_count(link))
    }

    /// Read one slot of the named value link
    pub fn link_value(&self, name: &str, index: usize) -> Option<&Property> {
        let link = self.value_link(name)?;
        self.script.link_value(link, index)
    }

    /// Write one slot of the named value link
    pub fn set_link_value(&mut self, name: &str, index: usize, value: impl Into<Property>) -> bool {
        match self.value_link(name) {
            Some(link) => self.script.set_link_value(link, index, value.into()),
            None => false,
        }
    }

    // ========================================================================
    // Stack pushes
    // ========================================================================

    /// Run `node` depth-first before anything queued after this update
    ///
    /// Each push becomes its own frame; frames run in push order.
    pub fn push_stack(&mut self, node: NodeId, input: Option<usize>) {
        let mut frame = VecDeque::with_capacity(1);
        frame.push_back(PendingActivation::new(node, input));
        self.effects.pushed.push(frame);
    }

    /// Run everything connected to the named output depth-first
    ///
    /// This bypasses the output's pulse count. An unconnected output pushes
    /// nothing.
    pub fn push_output(&mut self, name: &str) -> NodeResult<()> {
        let index = self.output_index(name)?;
        let frame: VecDeque<PendingActivation> = self
            .node()
            .and_then(|n| n.output(index))
            .map(|o| {
                o.connected_inputs()
                    .iter()
                    .map(|i| PendingActivation::new(i.node, Some(i.index)))
                    .collect()
            })
            .unwrap_or_default();
        if !frame.is_empty() {
            self.effects.pushed.push(frame);
        }
        Ok(())
    }

    /// Call this node again, after the frames pushed so far have drained
    pub fn push_continuation(&mut self) {
        let mut frame = VecDeque::with_capacity(1);
        frame.push_back(self.activation.resumed());
        self.effects.pushed.push(frame);
    }

    // ========================================================================
    // Events and messages
    // ========================================================================

    /// Fire every remote event named `name`; they start next wave
    ///
    /// `scope` defaults to the director's configured scope. Local scope
    /// searches this node's graph and its nested graphs. Returns the number
    /// of events found.
    pub fn trigger_remote_event(&mut self, name: &str, scope: Option<EventScope>) -> usize {
        let scope = scope.unwrap_or(self.default_scope);
        let events = find_remote_events(&*self.script, name, scope, self.graph);
        let count = events.len();
        self.effects.remote.extend(events);
        count
    }

    /// A message stamped with this node as source and the current tick
    pub fn message(&self, name: impl Into<String>) -> OutboundMessage {
        OutboundMessage::new(name, self.graph, self.activation.node, self.clock.tick())
    }

    /// Hand a message to the host bridge
    pub fn send_message(&mut self, message: OutboundMessage) {
        self.bridge.send_message(message);
    }
}
