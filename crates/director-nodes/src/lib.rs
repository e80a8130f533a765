//! Director Nodes - The standard node library
//!
//! Concrete [`NodeBehavior`](director_core::NodeBehavior) implementations
//! and their factories:
//! - Flow control: Toggle, For Loop, Switch, Delay, Branch
//! - Events: Start, Remote Event, Call Remote Event, subgraph Input/Output
//! - Messages: Send Message (outbound bridge call)
//! - Value cells: Boolean, Integer, Float, String, Actor
//!
//! Register everything with [`register_standard_nodes`]:
//!
//! ```
//! use director_core::NodeRegistry;
//!
//! let mut registry = NodeRegistry::new();
//! director_nodes::register_standard_nodes(&mut registry).unwrap();
//! assert!(registry.contains(&director_nodes::core_type(director_nodes::TOGGLE)));
//! ```

mod events;
mod flow;
mod messages;
mod values;

pub use events::{CallRemoteEvent, PassThrough};
pub use flow::{Branch, Delay, ForLoop, Switch, Toggle};
pub use messages::SendMessage;

use director_core::{NodeRegistry, NodeTypeId, Result};

/// Category of flow and event nodes
pub const CORE: &str = "Core";
/// Category of outbound message nodes
pub const MESSAGES: &str = "Messages";
/// Category of value cells
pub const VALUE: &str = "Value";

pub const TOGGLE: &str = "Toggle";
pub const FOR_LOOP: &str = "For Loop";
pub const SWITCH: &str = "Switch";
pub const DELAY: &str = "Delay";
pub const BRANCH: &str = "Branch";
pub const START: &str = director_core::event::START_EVENT_NAME;
pub const REMOTE_EVENT: &str = director_core::event::REMOTE_EVENT_NAME;
pub const CALL_REMOTE_EVENT: &str = "Call Remote Event";
pub const INPUT: &str = "Input";
pub const OUTPUT: &str = "Output";
pub const SEND_MESSAGE: &str = "Send Message";

pub const BOOLEAN: &str = "Boolean";
pub const INTEGER: &str = "Integer";
pub const FLOAT: &str = "Float";
pub const STRING: &str = "String";
pub const ACTOR: &str = "Actor";

/// Type id of a node in the `Core` category
pub fn core_type(name: &str) -> NodeTypeId {
    NodeTypeId::new(name, CORE)
}

/// Type id of a value cell
pub fn value_type(name: &str) -> NodeTypeId {
    NodeTypeId::new(name, VALUE)
}

/// Register every standard node type
pub fn register_standard_nodes(registry: &mut NodeRegistry) -> Result<()> {
    flow::register(registry)?;
    events::register(registry)?;
    messages::register(registry)?;
    values::register(registry)?;
    tracing::debug!(types = registry.len(), "standard nodes registered");
    Ok(())
}
