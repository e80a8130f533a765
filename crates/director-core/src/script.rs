//! The script arena: every graph and node, addressed by stable ids
//!
//! All cross references (link to link, link to value node, node to graph)
//! are ids that resolve through this arena. Removing a node or graph
//! disconnects everything that pointed at it, and anything that still holds
//! an old id afterwards simply fails to resolve.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::link::{InputRef, OutputRef, ValueLinkRef};
use crate::node::{Node, NodeBuilder};
use crate::{GraphId, NodeId, NodeTypeId, Property};
use indexmap::IndexMap;
use tracing::debug;

/// A tree of graphs and the nodes they contain
#[derive(Debug)]
pub struct Script {
    root: GraphId,
    graphs: IndexMap<GraphId, Graph>,
    nodes: IndexMap<NodeId, Node>,
    /// Index: node type -> node IDs, in registration order
    by_type: IndexMap<NodeTypeId, Vec<NodeId>>,
    next_graph: u32,
    next_node: u64,
}

impl Script {
    /// Create a script with an empty root graph
    pub fn new() -> Self {
        Self::with_root_name("root")
    }

    /// Create a script whose root graph has the given name
    pub fn with_root_name(name: impl Into<String>) -> Self {
        let root = GraphId::new(0);
        let mut graphs = IndexMap::new();
        graphs.insert(root, Graph::new(root, name, None));
        Self {
            root,
            graphs,
            nodes: IndexMap::new(),
            by_type: IndexMap::new(),
            next_graph: 1,
            next_node: 0,
        }
    }

    /// The root graph ID
    pub fn root(&self) -> GraphId {
        self.root
    }

    // ========================================================================
    // Graphs
    // ========================================================================

    pub fn graph(&self, id: GraphId) -> Option<&Graph> {
        self.graphs.get(&id)
    }

    pub fn graph_mut(&mut self, id: GraphId) -> Option<&mut Graph> {
        self.graphs.get_mut(&id)
    }

    /// All graphs, in creation order
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.graphs.values()
    }

    pub fn contains_graph(&self, id: GraphId) -> bool {
        self.graphs.contains_key(&id)
    }

    /// Create a sub graph under `parent`
    pub fn add_graph(&mut self, parent: GraphId, name: impl Into<String>) -> Result<GraphId> {
        let parent_graph = self
            .graphs
            .get_mut(&parent)
            .ok_or(Error::GraphNotFound(parent))?;
        let id = GraphId::new(self.next_graph);
        self.next_graph += 1;
        parent_graph.push_sub_graph(id);
        self.graphs.insert(id, Graph::new(id, name, Some(parent)));
        Ok(id)
    }

    /// Remove a sub graph, its nested graphs and all their nodes
    pub fn remove_graph(&mut self, id: GraphId) -> Result<()> {
        if id == self.root {
            return Err(Error::CannotRemoveRoot);
        }
        let parent = self
            .graphs
            .get(&id)
            .ok_or(Error::GraphNotFound(id))?
            .parent();

        // Children before parents so every node is disconnected while its
        // neighbours still exist
        let mut doomed = self.graph_and_descendants(id);
        doomed.reverse();
        for graph_id in doomed {
            let members = self
                .graphs
                .get(&graph_id)
                .map(|g| g.nodes().to_vec())
                .unwrap_or_default();
            for node in members {
                self.remove_node(node)?;
            }
            self.graphs.shift_remove(&graph_id);
        }

        if let Some(parent) = parent.and_then(|p| self.graphs.get_mut(&p)) {
            parent.remove_sub_graph(id);
        }
        Ok(())
    }

    /// A graph followed by all of its nested graphs, depth first
    pub fn graph_and_descendants(&self, id: GraphId) -> Vec<GraphId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(graph_id) = stack.pop() {
            let Some(graph) = self.graphs.get(&graph_id) else {
                continue;
            };
            result.push(graph_id);
            // Reverse so the first sub graph is visited first
            for sub in graph.sub_graphs().iter().rev() {
                stack.push(*sub);
            }
        }
        result
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Create a node in `graph` from a builder
    pub fn add_node(&mut self, graph: GraphId, builder: NodeBuilder) -> Result<NodeId> {
        let owner = self
            .graphs
            .get_mut(&graph)
            .ok_or(Error::GraphNotFound(graph))?;
        let id = NodeId::new(self.next_node);
        self.next_node += 1;
        owner.push_node(id);

        let node = builder.build(id, graph);
        self.by_type
            .entry(node.node_type().clone())
            .or_default()
            .push(id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Disconnect every link of a node, then remove it
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let mut node = self.nodes.shift_remove(&id).ok_or(Error::NodeNotFound(id))?;

        for (index, input) in node.inputs_mut().iter_mut().enumerate() {
            let this = InputRef::new(id, index);
            for output in input.take_connections() {
                if let Some(link) = self
                    .nodes
                    .get_mut(&output.node)
                    .and_then(|n| n.output_mut(output.index))
                {
                    link.detach(&this);
                }
            }
        }

        for (index, output) in node.outputs_mut().iter_mut().enumerate() {
            let this = OutputRef::new(id, index);
            for input in output.take_connections() {
                if let Some(link) = self
                    .nodes
                    .get_mut(&input.node)
                    .and_then(|n| n.input_mut(input.index))
                {
                    link.detach(&this);
                }
            }
        }

        for link in node.value_links_mut() {
            link.take_connections();
        }

        if node.is_value_node() {
            for other in self.nodes.values_mut() {
                for link in other.value_links_mut() {
                    link.detach(id);
                }
            }
        }

        if let Some(graph) = self.graphs.get_mut(&node.graph()) {
            graph.remove_node(id);
        }
        if let Some(ids) = self.by_type.get_mut(node.node_type()) {
            ids.retain(|n| *n != id);
        }
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes, in registration order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All nodes of a type, in registration order
    pub fn nodes_of_type(&self, type_id: &NodeTypeId) -> impl Iterator<Item = &Node> {
        self.by_type
            .get(type_id)
            .into_iter()
            .flat_map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Control flow links
    // ========================================================================

    /// Connect an output to an input
    ///
    /// Returns false if either side does not exist or the pair is already
    /// connected. Both sides are updated together.
    pub fn connect(&mut self, output: OutputRef, input: InputRef) -> bool {
        let output_ok = self
            .node(output.node)
            .and_then(|n| n.output(output.index))
            .is_some_and(|o| !o.is_connected_to(&input));
        let input_ok = self
            .node(input.node)
            .and_then(|n| n.input(input.index))
            .is_some_and(|i| !i.is_connected_to(&output));
        if !output_ok || !input_ok {
            debug!(%output, %input, "connection rejected");
            return false;
        }

        if let Some(link) = self
            .nodes
            .get_mut(&output.node)
            .and_then(|n| n.output_mut(output.index))
        {
            link.attach(input);
        }
        if let Some(link) = self
            .nodes
            .get_mut(&input.node)
            .and_then(|n| n.input_mut(input.index))
        {
            link.attach(output);
        }
        true
    }

    /// Connect links by name
    pub fn connect_by_name(
        &mut self,
        from: NodeId,
        output: &str,
        to: NodeId,
        input: &str,
    ) -> Result<bool> {
        let out_index = self.output_index(from, output)?;
        let in_index = self.input_index(to, input)?;
        Ok(self.connect(OutputRef::new(from, out_index), InputRef::new(to, in_index)))
    }

    /// Remove one output/input pairing
    pub fn disconnect(&mut self, output: OutputRef, input: InputRef) -> bool {
        let detached_output = self
            .nodes
            .get_mut(&output.node)
            .and_then(|n| n.output_mut(output.index))
            .is_some_and(|link| link.detach(&input));
        let detached_input = self
            .nodes
            .get_mut(&input.node)
            .and_then(|n| n.input_mut(input.index))
            .is_some_and(|link| link.detach(&output));
        detached_output || detached_input
    }

    /// Remove every connection of an output, returning how many were removed
    pub fn disconnect_output(&mut self, output: OutputRef) -> usize {
        let inputs = match self
            .nodes
            .get_mut(&output.node)
            .and_then(|n| n.output_mut(output.index))
        {
            Some(link) => link.take_connections(),
            None => return 0,
        };
        for input in &inputs {
            if let Some(link) = self
                .nodes
                .get_mut(&input.node)
                .and_then(|n| n.input_mut(input.index))
            {
                link.detach(&output);
            }
        }
        inputs.len()
    }

    /// Remove every connection of an input, returning how many were removed
    pub fn disconnect_input(&mut self, input: InputRef) -> usize {
        let outputs = match self
            .nodes
            .get_mut(&input.node)
            .and_then(|n| n.input_mut(input.index))
        {
            Some(link) => link.take_connections(),
            None => return 0,
        };
        for output in &outputs {
            if let Some(link) = self
                .nodes
                .get_mut(&output.node)
                .and_then(|n| n.output_mut(output.index))
            {
                link.detach(&input);
            }
        }
        outputs.len()
    }

    pub fn input_index(&self, node: NodeId, name: &str) -> Result<usize> {
        self.node(node)
            .ok_or(Error::NodeNotFound(node))?
            .input_index(name)
            .ok_or_else(|| Error::LinkNotFound {
                node,
                link: name.to_string(),
            })
    }

    pub fn output_index(&self, node: NodeId, name: &str) -> Result<usize> {
        self.node(node)
            .ok_or(Error::NodeNotFound(node))?
            .output_index(name)
            .ok_or_else(|| Error::LinkNotFound {
                node,
                link: name.to_string(),
            })
    }

    pub fn value_link_index(&self, node: NodeId, name: &str) -> Result<usize> {
        self.node(node)
            .ok_or(Error::NodeNotFound(node))?
            .value_link_index(name)
            .ok_or_else(|| Error::LinkNotFound {
                node,
                link: name.to_string(),
            })
    }

    // ========================================================================
    // Value links
    // ========================================================================

    /// Bind a value link to a value node
    ///
    /// Refused (with no change) when the pair is already bound, when the
    /// link is single and already bound, or when the link is type checked
    /// and the value node's type differs from the link default's type.
    pub fn connect_value(&mut self, link: ValueLinkRef, value_node: NodeId) -> Result<()> {
        let value_type = self
            .node(value_node)
            .ok_or(Error::NodeNotFound(value_node))?
            .value_type()
            .cloned()
            .ok_or(Error::NotAValueNode(value_node))?;

        let owner = self.node(link.node).ok_or(Error::NodeNotFound(link.node))?;
        let value_link = owner
            .value_link(link.index)
            .ok_or_else(|| Error::LinkNotFound {
                node: link.node,
                link: format!("value[{}]", link.index),
            })?;

        if value_link.is_connected_to(value_node) {
            debug!(node = %link.node, link = value_link.name(), %value_node, "value node already bound");
            return Err(Error::ConnectionRejected {
                reason: format!("{} is already bound to {}", value_node, value_link.name()),
            });
        }
        let live = value_link
            .connected_value_nodes()
            .iter()
            .filter(|id| self.contains_node(**id))
            .count();
        if !value_link.allows_multiple() && live > 0 {
            debug!(node = %link.node, link = value_link.name(), "value link is single and already bound");
            return Err(Error::MultiplicityExceeded {
                node: link.node,
                link: value_link.name().to_string(),
            });
        }
        if value_link.is_type_checked() && value_link.property_type() != value_type {
            debug!(node = %link.node, link = value_link.name(), "value link type mismatch");
            return Err(Error::TypeMismatch {
                expected: value_link.property_type(),
                got: value_type,
            });
        }

        if let Some(value_link) = self
            .nodes
            .get_mut(&link.node)
            .and_then(|n| n.value_link_mut(link.index))
        {
            value_link.attach(value_node);
        }
        Ok(())
    }

    /// Bind a value link by name
    pub fn connect_value_by_name(&mut self, node: NodeId, link: &str, value_node: NodeId) -> Result<()> {
        let index = self.value_link_index(node, link)?;
        self.connect_value(ValueLinkRef::new(node, index), value_node)
    }

    /// Unbind one value node, or every value node when `value_node` is `None`
    ///
    /// Returns the number of bindings removed.
    pub fn disconnect_value(&mut self, link: ValueLinkRef, value_node: Option<NodeId>) -> usize {
        let Some(value_link) = self
            .nodes
            .get_mut(&link.node)
            .and_then(|n| n.value_link_mut(link.index))
        else {
            return 0;
        };
        match value_node {
            Some(id) => usize::from(value_link.detach(id)),
            None => value_link.take_connections().len(),
        }
    }

    /// Live value nodes bound to a link (dangling ids are skipped)
    fn live_bindings(&self, link: ValueLinkRef) -> Vec<NodeId> {
        self.node(link.node)
            .and_then(|n| n.value_link(link.index))
            .map(|l| {
                l.connected_value_nodes()
                    .iter()
                    .copied()
                    .filter(|id| self.node(*id).is_some_and(Node::is_value_node))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of addressable value slots of a link
    pub fn value_slot_count(&self, link: ValueLinkRef) -> usize {
        self.live_bindings(link).len().max(1)
    }

    /// Read slot `index` of a value link
    ///
    /// Unbound links read their default (slot 0 only); bound links read the
    /// bound value node's cell.
    pub fn link_value(&self, link: ValueLinkRef, index: usize) -> Option<&Property> {
        let bindings = self.live_bindings(link);
        if bindings.is_empty() {
            if index != 0 {
                return None;
            }
            return self
                .node(link.node)
                .and_then(|n| n.value_link(link.index))
                .map(|l| l.default_property());
        }
        bindings
            .get(index)
            .and_then(|id| self.node(*id))
            .and_then(Node::value)
    }

    /// Write slot `index` of a value link
    ///
    /// A bound value node keeps its declared type: integers widen into float
    /// cells, any other mismatch is refused.
    pub fn set_link_value(&mut self, link: ValueLinkRef, index: usize, value: Property) -> bool {
        let bindings = self.live_bindings(link);
        if bindings.is_empty() {
            if index != 0 {
                return false;
            }
            return match self
                .nodes
                .get_mut(&link.node)
                .and_then(|n| n.value_link_mut(link.index))
            {
                Some(l) => {
                    *l.default_property_mut() = value;
                    true
                }
                None => false,
            };
        }
        let Some(cell) = bindings.get(index).and_then(|id| self.nodes.get_mut(id)) else {
            return false;
        };
        let id = cell.id();
        let got = value.property_type();
        if cell.set_value(value) {
            return true;
        }
        debug!(node = %link.node, value_node = %id, %got, "value of the wrong type refused");
        false
    }

    /// Resolve a named property of a node through its value links
    ///
    /// A value link with this name yields its first slot; otherwise the
    /// node's own property is returned.
    pub fn property(&self, node: NodeId, name: &str) -> Option<&Property> {
        let owner = self.node(node)?;
        match owner.value_link_index(name) {
            Some(index) => self.link_value(ValueLinkRef::new(node, index), 0),
            None => owner.properties().get(name),
        }
    }

    /// Write a named property of a node through its value links
    ///
    /// A linked property writes every bound value node (or the default when
    /// unbound); otherwise the node's own property is set.
    pub fn set_property(&mut self, node: NodeId, name: &str, value: impl Into<Property>) -> bool {
        let value = value.into();
        let Some(owner) = self.node(node) else {
            return false;
        };
        match owner.value_link_index(name) {
            Some(index) => {
                let link = ValueLinkRef::new(node, index);
                let slots = self.live_bindings(link).len().max(1);
                let mut written = false;
                for slot in 0..slots {
                    written |= self.set_link_value(link, slot, value.clone());
                }
                written
            }
            None => match self.nodes.get_mut(&node) {
                Some(owner) => owner.set_local_property(name, value),
                None => false,
            },
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Find nodes of a type whose named property equals `value`
    ///
    /// With `local_to` set, only that graph and its nested graphs are
    /// searched; otherwise every graph in the script. Results are in node
    /// registration order.
    pub fn find_nodes_by_type_and_property(
        &self,
        type_name: &str,
        category: &str,
        property: &str,
        value: &Property,
        local_to: Option<GraphId>,
    ) -> Vec<NodeId> {
        let scope = local_to.map(|graph| self.graph_and_descendants(graph));
        let type_id = NodeTypeId::new(type_name, category);
        self.nodes_of_type(&type_id)
            .filter(|node| match &scope {
                Some(graphs) => graphs.contains(&node.graph()),
                None => true,
            })
            .filter(|node| self.property(node.id(), property) == Some(value))
            .map(Node::id)
            .collect()
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ValueLink;
    use crate::node::Inert;

    fn action(name: &str) -> NodeBuilder {
        NodeBuilder::action(NodeTypeId::new(name, "Test"), Inert)
            .input("In")
            .output("Out")
    }

    fn int_value(value: i64) -> NodeBuilder {
        NodeBuilder::value(NodeTypeId::new("Integer", "Value"), value)
    }

    fn assert_symmetric(script: &Script, output: OutputRef, input: InputRef, expected: bool) {
        let from_output = script
            .node(output.node)
            .and_then(|n| n.output(output.index))
            .is_some_and(|o| o.is_connected_to(&input));
        let from_input = script
            .node(input.node)
            .and_then(|n| n.input(input.index))
            .is_some_and(|i| i.is_connected_to(&output));
        assert_eq!(from_output, expected, "output side of {} -> {}", output, input);
        assert_eq!(from_input, expected, "input side of {} -> {}", output, input);
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut script = Script::new();
        let root = script.root();
        let a = script.add_node(root, action("A")).unwrap();
        let b = script.add_node(root, action("B")).unwrap();
        let out = OutputRef::new(a, 0);
        let inp = InputRef::new(b, 0);

        assert!(script.connect(out, inp));
        assert_symmetric(&script, out, inp, true);
        assert!(!script.connect(out, inp), "duplicate connect must be refused");

        assert!(script.disconnect(out, inp));
        assert_symmetric(&script, out, inp, false);
        assert!(!script.disconnect(out, inp));
    }

    #[test]
    fn test_disconnect_all_in_any_order() {
        let mut script = Script::new();
        let root = script.root();
        let a = script.add_node(root, action("A")).unwrap();
        let b = script.add_node(root, action("B")).unwrap();
        let c = script.add_node(root, action("C")).unwrap();
        let out = OutputRef::new(a, 0);

        assert!(script.connect(out, InputRef::new(b, 0)));
        assert!(script.connect(out, InputRef::new(c, 0)));
        assert!(script.connect(OutputRef::new(b, 0), InputRef::new(c, 0)));

        assert_eq!(script.disconnect_input(InputRef::new(c, 0)), 2);
        assert_symmetric(&script, out, InputRef::new(c, 0), false);
        assert_symmetric(&script, OutputRef::new(b, 0), InputRef::new(c, 0), false);
        assert_symmetric(&script, out, InputRef::new(b, 0), true);

        assert_eq!(script.disconnect_output(out), 1);
        assert_symmetric(&script, out, InputRef::new(b, 0), false);
    }

    #[test]
    fn test_connect_missing_link_is_refused() {
        let mut script = Script::new();
        let root = script.root();
        let a = script.add_node(root, action("A")).unwrap();
        let b = script.add_node(root, action("B")).unwrap();

        assert!(!script.connect(OutputRef::new(a, 3), InputRef::new(b, 0)));
        assert!(!script.connect(OutputRef::new(a, 0), InputRef::new(NodeId(99), 0)));
        assert!(script.node(a).unwrap().output(0).unwrap().connected_inputs().is_empty());
        assert!(matches!(
            script.connect_by_name(a, "Nope", b, "In"),
            Err(Error::LinkNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_node_disconnects_neighbours() {
        let mut script = Script::new();
        let root = script.root();
        let a = script.add_node(root, action("A")).unwrap();
        let b = script.add_node(root, action("B")).unwrap();
        assert!(script.connect(OutputRef::new(a, 0), InputRef::new(b, 0)));
        assert!(script.connect(OutputRef::new(b, 0), InputRef::new(a, 0)));

        script.remove_node(b).unwrap();
        let a_node = script.node(a).unwrap();
        assert!(a_node.output(0).unwrap().connected_inputs().is_empty());
        assert_eq!(a_node.input(0).unwrap().connection_count(), 0);
        assert!(!script.graph(root).unwrap().contains(b));
    }

    #[test]
    fn test_single_value_link_keeps_first_binding() {
        let mut script = Script::new();
        let root = script.root();
        let user = script
            .add_node(root, action("User").value_link(ValueLink::input("Count", 0i64)))
            .unwrap();
        let first = script.add_node(root, int_value(1)).unwrap();
        let second = script.add_node(root, int_value(2)).unwrap();
        let link = ValueLinkRef::new(user, 0);

        script.connect_value(link, first).unwrap();
        let err = script.connect_value(link, second).unwrap_err();
        assert!(matches!(err, Error::MultiplicityExceeded { .. }));
        assert!(err.is_connection_rejected());

        let bound = script.node(user).unwrap().value_link(0).unwrap();
        assert_eq!(bound.connected_value_nodes(), &[first]);
        assert_eq!(script.link_value(link, 0), Some(&Property::Int(1)));
    }

    #[test]
    fn test_type_checked_binding_refused_without_change() {
        let mut script = Script::new();
        let root = script.root();
        let user = script
            .add_node(root, action("User").value_link(ValueLink::input("Flag", false)))
            .unwrap();
        let number = script.add_node(root, int_value(3)).unwrap();
        let link = ValueLinkRef::new(user, 0);

        let err = script.connect_value(link, number).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: crate::PropertyType::Bool,
                got: crate::PropertyType::Int,
            }
        );
        assert!(!script.node(user).unwrap().value_link(0).unwrap().is_connected());
        assert_eq!(script.property(user, "Flag"), Some(&Property::Bool(false)));
    }

    #[test]
    fn test_unchecked_multi_link_reads_and_writes_every_slot() {
        let mut script = Script::new();
        let root = script.root();
        let writer = script
            .add_node(
                root,
                action("Writer").value_link(ValueLink::output("Result", 0i64).type_checked(false)),
            )
            .unwrap();
        let a = script.add_node(root, int_value(0)).unwrap();
        let b = script
            .add_node(root, NodeBuilder::value(NodeTypeId::new("Float", "Value"), 0.0))
            .unwrap();
        let link = ValueLinkRef::new(writer, 0);
        script.connect_value(link, a).unwrap();
        script.connect_value(link, b).unwrap();
        assert_eq!(script.value_slot_count(link), 2);

        assert!(script.set_property(writer, "Result", 9i64));
        assert_eq!(script.node(a).unwrap().value(), Some(&Property::Int(9)));
        assert_eq!(script.node(b).unwrap().value(), Some(&Property::Float(9.0)));

        assert!(script.set_link_value(link, 1, Property::Float(0.5)));
        assert_eq!(script.link_value(link, 1), Some(&Property::Float(0.5)));
        assert_eq!(script.link_value(link, 2), None);
    }

    #[test]
    fn test_value_node_type_survives_unchecked_writes() {
        let mut script = Script::new();
        let root = script.root();
        let writer = script
            .add_node(
                root,
                action("Writer").value_link(ValueLink::output("Out", false).type_checked(false)),
            )
            .unwrap();
        let reader = script
            .add_node(root, action("Reader").value_link(ValueLink::input("X", 0.0)))
            .unwrap();
        let cell = script
            .add_node(root, NodeBuilder::value(NodeTypeId::new("Float", "Value"), 1.5))
            .unwrap();
        let link = ValueLinkRef::new(writer, 0);
        script.connect_value(link, cell).unwrap();

        assert!(!script.set_link_value(link, 0, Property::Bool(true)));
        assert!(!script.set_property(cell, "Value", "text"));
        assert_eq!(script.node(cell).unwrap().value(), Some(&Property::Float(1.5)));

        assert!(script.set_link_value(link, 0, Property::Int(9)));
        assert_eq!(script.node(cell).unwrap().value(), Some(&Property::Float(9.0)));
        script.connect_value_by_name(reader, "X", cell).unwrap();
        assert_eq!(script.property(reader, "X"), Some(&Property::Float(9.0)));

        let counter = script
            .add_node(root, action("Counter").value_link(ValueLink::input("N", 0i64)))
            .unwrap();
        assert!(matches!(
            script.connect_value_by_name(counter, "N", cell),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_removed_value_node_falls_back_to_default() {
        let mut script = Script::new();
        let root = script.root();
        let user = script
            .add_node(root, action("User").value_link(ValueLink::input("Count", 4i64)))
            .unwrap();
        let cell = script.add_node(root, int_value(10)).unwrap();
        script.connect_value_by_name(user, "Count", cell).unwrap();
        assert_eq!(script.property(user, "Count"), Some(&Property::Int(10)));

        script.remove_node(cell).unwrap();
        assert_eq!(script.property(user, "Count"), Some(&Property::Int(4)));
        assert!(!script.node(user).unwrap().value_link(0).unwrap().is_connected());
    }

    #[test]
    fn test_sub_graph_removal_and_scoped_search() {
        let mut script = Script::new();
        let root = script.root();
        let sub = script.add_graph(root, "sub").unwrap();
        let nested = script.add_graph(sub, "nested").unwrap();

        let named = |name: &str| {
            NodeBuilder::event(NodeTypeId::new("Remote Event", "Core"), Inert)
                .output("Out")
                .property("EventName", name)
        };
        let in_root = script.add_node(root, named("go")).unwrap();
        let in_nested = script.add_node(nested, named("go")).unwrap();
        let _other = script.add_node(sub, named("stop")).unwrap();

        let go = Property::from("go");
        assert_eq!(
            script.find_nodes_by_type_and_property("Remote Event", "Core", "EventName", &go, None),
            vec![in_root, in_nested]
        );
        assert_eq!(
            script.find_nodes_by_type_and_property("Remote Event", "Core", "EventName", &go, Some(sub)),
            vec![in_nested]
        );

        assert!(
            !script.connect(OutputRef::new(in_nested, 0), InputRef::new(in_root, 0)),
            "event nodes have no inputs"
        );
        script.remove_graph(sub).unwrap();
        assert!(!script.contains_graph(nested));
        assert!(!script.contains_node(in_nested));
        assert!(script.graph(root).unwrap().sub_graphs().is_empty());
        assert!(matches!(script.remove_graph(root), Err(Error::CannotRemoveRoot)));
    }
}
