//! Director configuration
//!
//! Controls how node failures are contained, whether invocations are
//! traced, and the default reach of remote events.

use crate::error::{Error, Result};
use crate::event::EventScope;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Director`](crate::Director)
///
/// # Example
///
/// ```
/// use director_core::{DirectorConfig, EventScope};
///
/// let config = DirectorConfig::default();
/// assert!(config.catch_panics);
/// assert!(!config.record_trace);
///
/// let config = DirectorConfig::from_ron("(record_trace: true, remote_event_scope: Global)").unwrap();
/// assert!(config.record_trace);
/// assert_eq!(config.remote_event_scope, EventScope::Global);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Convert a panic inside a node update into a node failure
    ///
    /// When false, a panicking node unwinds through `Director::update`.
    pub catch_panics: bool,

    /// Record every invocation into the director's trace
    pub record_trace: bool,

    /// Maximum number of trace records kept (0 = unlimited)
    ///
    /// Older records are dropped first.
    pub trace_capacity: usize,

    /// Scope used when a remote event is fired without an explicit scope
    pub remote_event_scope: EventScope,
}

impl DirectorConfig {
    /// Parse a configuration from RON; missing fields take their defaults
    pub fn from_ron(content: &str) -> Result<Self> {
        ron::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Serialize this configuration to RON
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Enable invocation tracing
    pub fn with_trace(mut self, capacity: usize) -> Self {
        self.record_trace = true;
        self.trace_capacity = capacity;
        self
    }
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            record_trace: false,
            trace_capacity: 0,
            remote_event_scope: EventScope::Local,
        }
    }
}
