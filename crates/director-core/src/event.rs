//! Remote events: event nodes found and fired by name

use crate::{GraphId, NodeId, Property, Script};
use serde::{Deserialize, Serialize};

/// Type name of remote event nodes
pub const REMOTE_EVENT_NAME: &str = "Remote Event";
/// Type name of the event fired once by `Director::start`
pub const START_EVENT_NAME: &str = "Start";
/// Category of the engine's built-in event types
pub const EVENT_CATEGORY: &str = "Core";
/// Property holding the name a remote event answers to
pub const EVENT_NAME_PROPERTY: &str = "EventName";

/// Where a remote event lookup searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventScope {
    /// The originating graph and its nested graphs
    #[default]
    Local,
    /// Every graph of the script
    Global,
}

/// Find the remote event nodes answering to `name`, in registration order
pub fn find_remote_events(
    script: &Script,
    name: &str,
    scope: EventScope,
    origin: GraphId,
) -> Vec<NodeId> {
    let local_to = match scope {
        EventScope::Local => Some(origin),
        EventScope::Global => None,
    };
    script.find_nodes_by_type_and_property(
        REMOTE_EVENT_NAME,
        EVENT_CATEGORY,
        EVENT_NAME_PROPERTY,
        &Property::from(name),
        local_to,
    )
}
