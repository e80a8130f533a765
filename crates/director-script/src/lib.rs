//! Director Script - RON loader and schema definitions
//!
//! Loads director scripts from RON files:
//! - Graph trees with nested sub graphs
//! - Node instances of registered types with authored properties
//! - Control links and value link bindings, addressed by node key
//!
//! Scripts can be exported back to RON with [`to_ron`].

mod error;
mod export;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use export::{export, to_ron};
pub use loader::{LoadedScript, Loader};
pub use schema::{GraphDef, LinkDef, NodeDef, ScriptDef, ValueBindingDef};
