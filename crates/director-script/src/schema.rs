//! Schema definitions for RON scripts
//!
//! A script file is one tree of graphs. Nodes are named by keys that are
//! unique across the whole file, so links and value bindings may cross
//! graph boundaries.
//!
//! ```ron
//! (
//!     root: (
//!         name: "Lights",
//!         nodes: [
//!             (key: "start", name: "Start", category: "Core"),
//!             (key: "toggle", name: "Toggle", category: "Core"),
//!             (key: "lit", name: "Boolean", category: "Value",
//!              properties: {"Value": Bool(false)}),
//!         ],
//!         links: [(from: "start", output: "Out", to: "toggle", input: "Toggle")],
//!         values: [(node: "toggle", link: "Value", value: "lit")],
//!     ),
//! )
//! ```

use director_core::PropertySet;
use serde::{Deserialize, Serialize};

/// A whole script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDef {
    pub root: GraphDef,
}

/// One graph and its nested graphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDef {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    /// Control links
    #[serde(default)]
    pub links: Vec<LinkDef>,
    /// Value link bindings
    #[serde(default)]
    pub values: Vec<ValueBindingDef>,
    #[serde(default)]
    pub sub_graphs: Vec<GraphDef>,
}

impl GraphDef {
    /// Create an empty graph definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            links: Vec::new(),
            values: Vec::new(),
            sub_graphs: Vec::new(),
        }
    }
}

/// A node instance of a registered type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Script-wide unique key
    pub key: String,
    /// Type name
    pub name: String,
    /// Type category
    pub category: String,
    /// Authored property values; names of value links set their defaults
    #[serde(default)]
    pub properties: PropertySet,
}

/// A control link from an output to an input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDef {
    pub from: String,
    pub output: String,
    pub to: String,
    pub input: String,
}

/// A value link bound to a value node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueBindingDef {
    /// Key of the node owning the value link
    pub node: String,
    /// Value link name
    pub link: String,
    /// Key of the value node
    pub value: String,
}
