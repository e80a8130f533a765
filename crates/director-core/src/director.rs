//! The cooperative scheduler
//!
//! A [`Director`] owns a [`Script`] and steps it once per host frame. Each
//! `update` drains one wave of pending activations in FIFO order:
//!
//! 1. The wave is seeded with activations carried over from the previous
//!    tick followed by everything the host injected since.
//! 2. Each activation calls its node's behavior once.
//! 3. Outputs pulsed during the call become activations of the *next*
//!    wave, one per connected input, in output then connection order.
//! 4. A node that pushed onto the stack is handled depth-first instead:
//!    every push is a frame drained before anything else, and the node's
//!    own pulses run right after its pushed frames, still this tick.
//! 5. A node returning `true` (latent) is called again next tick with the
//!    same input and `first_update == false`.
//! 6. Remote events a node triggers start in the next wave, after the
//!    activations of its own outputs.
//!
//! A failing node never aborts the tick. Its activation is dropped, the
//! pulses it fired are withdrawn and the scheduler moves on.

use crate::bridge::{Bridge, NullBridge};
use crate::config::DirectorConfig;
use crate::context::UpdateContext;
use crate::error::{Error, NodeError, Result};
use crate::event::{find_remote_events, EventScope, EVENT_CATEGORY, START_EVENT_NAME};
use crate::link::OutputLink;
use crate::node::{Node, NodeKind};
use crate::observer::{DirectorObserver, InvocationRecord, InvocationTrace};
use crate::time::{Clock, Tick};
use crate::{GraphId, NodeId, NodeTypeId, Script};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, debug_span, error, trace, warn};

/// A scheduled node invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingActivation {
    pub node: NodeId,
    /// Input that fired (`None` for events started without an input)
    pub input: Option<usize>,
    pub first_update: bool,
}

impl PendingActivation {
    /// A fresh invocation
    pub fn new(node: NodeId, input: Option<usize>) -> Self {
        Self {
            node,
            input,
            first_update: true,
        }
    }

    /// The same invocation, resumed
    pub fn resumed(self) -> Self {
        Self {
            first_update: false,
            ..self
        }
    }
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorState {
    /// Waiting for the next update
    Idle,
    /// Inside an update
    Stepping,
    /// Internal bookkeeping broke; every further update fails
    Faulted,
}

/// Summary of one update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    /// Behaviors called
    pub invoked: usize,
    /// Calls that failed
    pub failed: usize,
    /// Activations dropped because their node or input no longer exists
    pub discarded: usize,
    /// Latent nodes requeued for the next tick
    pub latent: usize,
    /// Activations waiting for the next tick
    pub carried: usize,
    /// Deepest stack frame reached
    pub max_depth: usize,
}

struct Completed {
    latent: bool,
    fired: Vec<PendingActivation>,
    pushed: Vec<VecDeque<PendingActivation>>,
    /// Remote events started by the call
    remote: Vec<PendingActivation>,
}

/// Executes a script one tick at a time
pub struct Director<B: Bridge = NullBridge> {
    script: Script,
    config: DirectorConfig,
    clock: Clock,
    state: DirectorState,
    fault: Option<String>,
    /// Carried over from the previous tick
    next_wave: VecDeque<PendingActivation>,
    /// Injected by the host since the previous tick
    injected: VecDeque<PendingActivation>,
    bridge: B,
    observers: Vec<Box<dyn DirectorObserver>>,
    trace: Option<InvocationTrace>,
}

impl Director<NullBridge> {
    /// Create a director whose outbound messages go nowhere
    pub fn new(script: Script) -> Self {
        Self::with_bridge(script, NullBridge)
    }
}

impl<B: Bridge> Director<B> {
    /// Create a director delivering outbound messages to `bridge`
    pub fn with_bridge(script: Script, bridge: B) -> Self {
        Self {
            script,
            config: DirectorConfig::default(),
            clock: Clock::new(),
            state: DirectorState::Idle,
            fault: None,
            next_wave: VecDeque::new(),
            injected: VecDeque::new(),
            bridge,
            observers: Vec::new(),
            trace: None,
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: DirectorConfig) -> Self {
        self.trace = config
            .record_trace
            .then(|| InvocationTrace::new(config.trace_capacity));
        self.config = config;
        self
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Edit the script between ticks
    ///
    /// Pending activations of nodes removed here are discarded when drained.
    pub fn script_mut(&mut self) -> &mut Script {
        &mut self.script
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn tick(&self) -> Tick {
        self.clock.tick()
    }

    pub fn state(&self) -> DirectorState {
        self.state
    }

    /// Why the director faulted, if it did
    pub fn fault_reason(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// The invocation trace, when enabled in the config
    pub fn trace(&self) -> Option<&InvocationTrace> {
        self.trace.as_ref()
    }

    pub fn add_observer(&mut self, observer: Box<dyn DirectorObserver>) {
        self.observers.push(observer);
    }

    /// Activations waiting for the next update
    pub fn pending(&self) -> usize {
        self.next_wave.len() + self.injected.len()
    }

    // ========================================================================
    // Host input
    // ========================================================================

    /// Schedule an activation for the next update
    pub fn enqueue(&mut self, activation: PendingActivation) -> Result<()> {
        if !self.script.contains_node(activation.node) {
            return Err(Error::NodeNotFound(activation.node));
        }
        self.injected.push_back(activation);
        Ok(())
    }

    /// Fire a named input of a node from outside the script
    pub fn trigger_input(&mut self, graph: GraphId, node: NodeId, input: &str) -> Result<()> {
        if !self.script.contains_graph(graph) {
            return Err(Error::GraphNotFound(graph));
        }
        let target = self
            .script
            .node(node)
            .filter(|n| n.graph() == graph)
            .ok_or(Error::NodeNotFound(node))?;
        let index = target.input_index(input).ok_or_else(|| Error::LinkNotFound {
            node,
            link: input.to_string(),
        })?;
        self.injected
            .push_back(PendingActivation::new(node, Some(index)));
        Ok(())
    }

    /// Fire every remote event named `name`, searched from the root graph
    ///
    /// Returns the number of events scheduled.
    pub fn trigger_event(&mut self, name: &str, scope: EventScope) -> usize {
        let events = find_remote_events(&self.script, name, scope, self.script.root());
        debug!(event = name, count = events.len(), "event triggered by host");
        let count = events.len();
        self.injected
            .extend(events.into_iter().map(|id| PendingActivation::new(id, None)));
        count
    }

    /// Fire every start event of the script
    pub fn start(&mut self) -> usize {
        let count =
            self.trigger_events_of_type(&NodeTypeId::new(START_EVENT_NAME, EVENT_CATEGORY));
        debug!(count, "script started");
        count
    }

    /// Fire every event node of a type
    pub fn trigger_events_of_type(&mut self, type_id: &NodeTypeId) -> usize {
        let events: Vec<NodeId> = self
            .script
            .nodes_of_type(type_id)
            .filter(|n| n.kind() == NodeKind::Event)
            .map(Node::id)
            .collect();
        let count = events.len();
        self.injected
            .extend(events.into_iter().map(|id| PendingActivation::new(id, None)));
        count
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance one tick and drain its wave
    ///
    /// Fails only when the director is faulted.
    pub fn update(&mut self, sim_delta: f64, real_delta: f64) -> Result<TickReport> {
        if let Some(reason) = &self.fault {
            return Err(Error::Faulted(reason.clone()));
        }

        self.clock.advance(sim_delta, real_delta);
        let tick = self.clock.tick();
        let _span = debug_span!("director_tick", tick).entered();
        self.state = DirectorState::Stepping;
        for observer in &mut self.observers {
            observer.on_tick_begin(tick);
        }

        let mut wave = std::mem::take(&mut self.next_wave);
        wave.append(&mut self.injected);

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };
        let mut stack: Vec<VecDeque<PendingActivation>> = Vec::new();

        loop {
            let depth = stack.len();
            let entry = match stack.last_mut() {
                Some(frame) => match frame.pop_front() {
                    Some(entry) => entry,
                    None => {
                        stack.pop();
                        continue;
                    }
                },
                None => match wave.pop_front() {
                    Some(entry) => entry,
                    None => break,
                },
            };
            report.max_depth = report.max_depth.max(depth);

            let Some(done) = self.invoke(entry, depth, &mut report)? else {
                continue;
            };

            if done.latent {
                self.next_wave.push_back(entry.resumed());
                report.latent += 1;
            }

            if done.pushed.is_empty() {
                match stack.last_mut() {
                    Some(frame) => frame.extend(done.fired),
                    None => self.next_wave.extend(done.fired),
                }
            } else {
                // An exhausted frame goes before new ones so loops stay shallow
                if depth > 0 && stack.last().is_some_and(VecDeque::is_empty) {
                    stack.pop();
                }
                let mut frames = done.pushed;
                if !done.fired.is_empty() {
                    frames.push(VecDeque::from(done.fired));
                }
                stack.extend(frames.into_iter().rev());
            }
            self.next_wave.extend(done.remote);
        }

        report.carried = self.next_wave.len();
        self.state = DirectorState::Idle;
        for observer in &mut self.observers {
            observer.on_tick_end(&report);
        }
        debug!(
            invoked = report.invoked,
            failed = report.failed,
            carried = report.carried,
            "tick drained"
        );
        Ok(report)
    }

    /// Call one node; `None` when nothing ran to completion
    fn invoke(
        &mut self,
        entry: PendingActivation,
        depth: usize,
        report: &mut TickReport,
    ) -> Result<Option<Completed>> {
        let Some(node) = self.script.node_mut(entry.node) else {
            debug!(node = %entry.node, "discarding activation of a removed node");
            report.discarded += 1;
            return Ok(None);
        };
        if node.is_value_node() || entry.input.is_some_and(|i| node.input(i).is_none()) {
            debug!(node = %entry.node, input = ?entry.input, "discarding stale activation");
            report.discarded += 1;
            return Ok(None);
        }

        let graph = node.graph();
        let Some(mut behavior) = node.take_behavior() else {
            return Err(self.fault(format!("{} has no behavior", entry.node)));
        };
        let before: Vec<u32> = node.outputs().iter().map(OutputLink::active_count).collect();

        let record = InvocationRecord {
            tick: self.clock.tick(),
            order: report.invoked as u64,
            graph,
            node: entry.node,
            input: entry.input,
            first_update: entry.first_update,
            depth,
        };
        report.invoked += 1;
        if let Some(trace) = &mut self.trace {
            trace.record(record.clone());
        }
        for observer in &mut self.observers {
            observer.on_invocation(&record);
        }
        trace!(node = %entry.node, input = ?entry.input, first = entry.first_update, depth, "update");

        let mut ctx = UpdateContext::new(
            &mut self.script,
            entry,
            graph,
            &self.clock,
            &mut self.bridge,
            self.config.remote_event_scope,
        );
        let result = if self.config.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| {
                behavior.update(&mut ctx, entry.input, entry.first_update)
            }))
            .unwrap_or_else(|payload| Err(NodeError::Panicked(panic_message(payload))))
        } else {
            behavior.update(&mut ctx, entry.input, entry.first_update)
        };
        let effects = ctx.into_effects();

        let Some(node) = self.script.node_mut(entry.node) else {
            return Err(self.fault(format!("{} vanished during its update", entry.node)));
        };
        node.restore_behavior(behavior);

        match result {
            Ok(latent) => {
                let fired = take_fired(node);
                Ok(Some(Completed {
                    latent,
                    fired,
                    pushed: effects.pushed,
                    remote: effects
                        .remote
                        .into_iter()
                        .map(|id| PendingActivation::new(id, None))
                        .collect(),
                }))
            }
            Err(err) => {
                for (output, count) in node.outputs_mut().iter_mut().zip(before) {
                    output.set_active_count(count);
                }
                warn!(
                    node = %entry.node,
                    node_type = %node.node_type(),
                    graph = %graph,
                    error = %err,
                    "node update failed"
                );
                report.failed += 1;
                for observer in &mut self.observers {
                    observer.on_node_failed(&record, &err);
                }
                Ok(None)
            }
        }
    }

    fn fault(&mut self, reason: String) -> Error {
        error!(reason = %reason, "director faulted");
        self.state = DirectorState::Faulted;
        self.fault = Some(reason.clone());
        Error::Faulted(reason)
    }
}

impl<B: Bridge + std::fmt::Debug> std::fmt::Debug for Director<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("tick", &self.clock.tick())
            .field("state", &self.state)
            .field("pending", &self.pending())
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}

/// Drain every pulse of every output into activations
fn take_fired(node: &mut Node) -> Vec<PendingActivation> {
    let mut fired = Vec::new();
    for output in node.outputs_mut() {
        while output.test() {
            fired.extend(
                output
                    .connected_inputs()
                    .iter()
                    .map(|input| PendingActivation::new(input.node, Some(input.index))),
            );
        }
    }
    fired
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
