//! Graphs: ordered node collections that nest into sub graphs

use crate::{GraphId, NodeId};

/// A graph inside a [`Script`](crate::Script)
///
/// The graph records membership and nesting only. Nodes themselves live in
/// the script arena and are listed here in registration order.
#[derive(Debug, Clone)]
pub struct Graph {
    id: GraphId,
    name: String,
    parent: Option<GraphId>,
    sub_graphs: Vec<GraphId>,
    nodes: Vec<NodeId>,
}

impl Graph {
    pub(crate) fn new(id: GraphId, name: impl Into<String>, parent: Option<GraphId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
            sub_graphs: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The enclosing graph, `None` for the root
    pub fn parent(&self) -> Option<GraphId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Direct sub graphs, in creation order
    pub fn sub_graphs(&self) -> &[GraphId] {
        &self.sub_graphs
    }

    /// Member nodes, in registration order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push_node(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) {
        self.nodes.retain(|id| *id != node);
    }

    pub(crate) fn push_sub_graph(&mut self, graph: GraphId) {
        self.sub_graphs.push(graph);
    }

    pub(crate) fn remove_sub_graph(&mut self, graph: GraphId) {
        self.sub_graphs.retain(|id| *id != graph);
    }
}
