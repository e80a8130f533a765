//! Node type registry
//!
//! Maps stable node type ids (name + category) to factories. The registry
//! is an ordinary value owned by the host and handed to whatever builds
//! scripts; nothing is registered globally.

use crate::error::{Error, Result};
use crate::node::NodeBuilder;
use crate::{GraphId, NodeId, NodeTypeId, PropertySet, Script};
use indexmap::IndexMap;

/// Factory producing a node description from authored properties
///
/// The authored properties are applied on top of the result by the
/// registry; factories only need to read the ones that shape the node
/// (such as a link count).
pub type NodeFactory = Box<dyn Fn(&PropertySet) -> NodeBuilder>;

/// Registry of node types
#[derive(Default)]
pub struct NodeRegistry {
    factories: IndexMap<NodeTypeId, NodeFactory>,
}

impl NodeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `type_id`
    pub fn register<F>(&mut self, type_id: NodeTypeId, factory: F) -> Result<()>
    where
        F: Fn(&PropertySet) -> NodeBuilder + 'static,
    {
        if self.factories.contains_key(&type_id) {
            return Err(Error::DuplicateNodeType(type_id));
        }
        self.factories.insert(type_id, Box::new(factory));
        Ok(())
    }

    pub fn contains(&self, type_id: &NodeTypeId) -> bool {
        self.factories.contains_key(type_id)
    }

    /// Registered types, in registration order
    pub fn types(&self) -> impl Iterator<Item = &NodeTypeId> {
        self.factories.keys()
    }

    /// Registered types of one category, in registration order
    pub fn types_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a NodeTypeId> + 'a {
        self.factories.keys().filter(move |t| t.category == category)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Build a node description with the authored properties applied
    ///
    /// Fails when an authored value does not fit a value node's type.
    pub fn create(&self, type_id: &NodeTypeId, properties: &PropertySet) -> Result<NodeBuilder> {
        let factory = self
            .factories
            .get(type_id)
            .ok_or_else(|| Error::UnknownNodeType(type_id.clone()))?;
        factory(properties).with_overrides(properties)
    }

    /// Create a node of a registered type directly in a script graph
    pub fn instantiate(
        &self,
        script: &mut Script,
        graph: GraphId,
        type_id: &NodeTypeId,
        properties: &PropertySet,
    ) -> Result<NodeId> {
        let builder = self.create(type_id, properties)?;
        script.add_node(graph, builder)
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
