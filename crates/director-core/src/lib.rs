//! Director Core - Graph model and tick interpreter for visual scripts
//!
//! This crate provides the data model and the scheduler of the director
//! engine:
//! - Scripts as arenas of graphs and nodes (`Script`, `Graph`, `Node`)
//! - Control links with pulse counting and value links bound to value nodes
//! - Dynamic node properties (`Property`, `PropertySet`)
//! - A node type registry with factories
//! - The cooperative, deterministic `Director` that steps a script per tick
//!
//! ## Execution Model
//!
//! Node behaviors implement [`NodeBehavior`]. Each `Director::update`
//! drains one wave of activations; outputs fired during a tick run in the
//! next one unless the node pushes work onto the stack, which runs
//! depth-first within the same tick. Nodes may stay latent across ticks.
//!
//! Outbound traffic goes through a [`Bridge`]; inbound traffic is injected
//! with `Director::trigger_input` and `Director::trigger_event`.

mod bridge;
pub mod config;
mod context;
pub mod director;
mod error;
pub mod event;
mod graph;
mod identity;
pub mod link;
pub mod node;
pub mod observer;
mod property;
mod registry;
mod script;
pub mod time;

pub use bridge::{Bridge, MessageLog, NullBridge, OutboundMessage};
pub use config::DirectorConfig;
pub use context::UpdateContext;
pub use director::{Director, DirectorState, PendingActivation, TickReport};
pub use error::{Error, NodeError, NodeResult, Result};
pub use event::EventScope;
pub use graph::Graph;
pub use identity::{ActorId, GraphId, NodeId, NodeTypeId};
pub use link::{InputLink, InputRef, OutputLink, OutputRef, ValueLink, ValueLinkRef};
pub use node::{from_fn, FireOutputs, Inert, Node, NodeBehavior, NodeBuilder, NodeKind};
pub use observer::{DirectorObserver, InvocationRecord, InvocationTrace};
pub use property::{EnumValue, Property, PropertySet, PropertyType};
pub use registry::{NodeFactory, NodeRegistry};
pub use script::Script;
pub use time::{Clock, Tick};
