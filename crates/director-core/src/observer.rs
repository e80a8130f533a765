//! Observer hooks and the invocation trace
//!
//! Every node invocation the director performs can be observed. The trace
//! records them as `(tick, order, node, input)` tuples so two runs of the
//! same script can be compared for identical scheduling.

use crate::director::TickReport;
use crate::error::NodeError;
use crate::{GraphId, NodeId, Tick};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One node invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Tick the invocation happened in
    pub tick: Tick,
    /// Position within the tick (0-based)
    pub order: u64,
    /// Graph of the invoked node
    pub graph: GraphId,
    /// The invoked node
    pub node: NodeId,
    /// Input that fired, if any
    pub input: Option<usize>,
    /// Whether this began a new invocation
    pub first_update: bool,
    /// Drain depth: 0 for the tick's wave, >0 inside pushed stack frames
    pub depth: usize,
}

/// Hooks called by the director while stepping
///
/// All methods default to doing nothing.
pub trait DirectorObserver {
    fn on_tick_begin(&mut self, _tick: Tick) {}

    fn on_invocation(&mut self, _record: &InvocationRecord) {}

    fn on_node_failed(&mut self, _record: &InvocationRecord, _error: &NodeError) {}

    fn on_tick_end(&mut self, _report: &TickReport) {}
}

/// Ordered record of invocations
#[derive(Debug, Clone, Default)]
pub struct InvocationTrace {
    records: VecDeque<InvocationRecord>,
    /// Maximum records kept (0 = unlimited)
    capacity: usize,
}

impl InvocationTrace {
    /// Create a trace keeping at most `capacity` records (0 = unlimited)
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
        }
    }

    pub fn record(&mut self, record: InvocationRecord) {
        if self.capacity > 0 && self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &InvocationRecord> {
        self.records.iter()
    }

    /// Records of a single tick
    pub fn tick(&self, tick: Tick) -> impl Iterator<Item = &InvocationRecord> {
        self.records.iter().filter(move |r| r.tick == tick)
    }

    /// The invoked nodes in order
    pub fn nodes(&self) -> Vec<NodeId> {
        self.records.iter().map(|r| r.node).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
