//! RON script loader

use crate::error::{Error, Result};
use crate::schema::{GraphDef, LinkDef, ScriptDef, ValueBindingDef};
use director_core::{GraphId, NodeId, NodeRegistry, NodeTypeId, Script};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A script built from its definition
#[derive(Debug)]
pub struct LoadedScript {
    pub script: Script,
    /// Node ids by authored key, in load order
    pub keys: IndexMap<String, NodeId>,
}

impl LoadedScript {
    /// Look up a node by its authored key
    pub fn node(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }
}

/// Builds scripts from RON through a node registry
pub struct Loader<'r> {
    registry: &'r NodeRegistry,
}

impl<'r> Loader<'r> {
    /// Create a loader instantiating nodes from `registry`
    pub fn new(registry: &'r NodeRegistry) -> Self {
        Self { registry }
    }

    /// Load a script from a RON file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadedScript> {
        let content = fs::read_to_string(path.as_ref())?;
        self.load_str(&content)
    }

    /// Load a script from a RON string
    pub fn load_str(&self, content: &str) -> Result<LoadedScript> {
        let def: ScriptDef = ron::from_str(content)?;
        self.build(&def)
    }

    /// Build a script from its definition
    ///
    /// Every node of every graph is created before any link is wired, so
    /// links may point into graphs defined later in the file.
    pub fn build(&self, def: &ScriptDef) -> Result<LoadedScript> {
        let mut script = Script::with_root_name(def.root.name.as_str());
        let mut keys = IndexMap::new();
        let mut placed = Vec::new();
        let root = script.root();
        self.place(&mut script, root, &def.root, &mut keys, &mut placed)?;

        for graph in &placed {
            for link in &graph.links {
                wire(&mut script, &keys, link)?;
            }
            for binding in &graph.values {
                bind(&mut script, &keys, binding)?;
            }
        }

        debug!(
            graphs = placed.len(),
            nodes = keys.len(),
            "script loaded"
        );
        Ok(LoadedScript { script, keys })
    }

    fn place<'d>(
        &self,
        script: &mut Script,
        graph: GraphId,
        def: &'d GraphDef,
        keys: &mut IndexMap<String, NodeId>,
        placed: &mut Vec<&'d GraphDef>,
    ) -> Result<()> {
        for node in &def.nodes {
            if keys.contains_key(&node.key) {
                return Err(Error::DuplicateNodeKey(node.key.clone()));
            }
            let type_id = NodeTypeId::new(node.name.as_str(), node.category.as_str());
            let id = self
                .registry
                .instantiate(script, graph, &type_id, &node.properties)?;
            keys.insert(node.key.clone(), id);
        }
        placed.push(def);

        for sub in &def.sub_graphs {
            let id = script.add_graph(graph, sub.name.as_str())?;
            self.place(script, id, sub, keys, placed)?;
        }
        Ok(())
    }
}

fn key(keys: &IndexMap<String, NodeId>, key: &str) -> Result<NodeId> {
    keys.get(key)
        .copied()
        .ok_or_else(|| Error::UnknownNodeKey(key.to_string()))
}

fn unknown_link(node: &str, link: &str) -> Error {
    Error::UnknownLink {
        node: node.to_string(),
        link: link.to_string(),
    }
}

fn wire(script: &mut Script, keys: &IndexMap<String, NodeId>, link: &LinkDef) -> Result<()> {
    let from = key(keys, &link.from)?;
    let to = key(keys, &link.to)?;
    script
        .output_index(from, &link.output)
        .map_err(|_| unknown_link(&link.from, &link.output))?;
    script
        .input_index(to, &link.input)
        .map_err(|_| unknown_link(&link.to, &link.input))?;

    if !script.connect_by_name(from, &link.output, to, &link.input)? {
        debug!(
            from = %link.from,
            output = %link.output,
            to = %link.to,
            input = %link.input,
            "duplicate link ignored"
        );
    }
    Ok(())
}

fn bind(script: &mut Script, keys: &IndexMap<String, NodeId>, binding: &ValueBindingDef) -> Result<()> {
    let node = key(keys, &binding.node)?;
    let value = key(keys, &binding.value)?;
    script
        .value_link_index(node, &binding.link)
        .map_err(|_| unknown_link(&binding.node, &binding.link))?;
    script.connect_value_by_name(node, &binding.link, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use director_core::{Director, Property};

    fn registry() -> NodeRegistry {
        let mut registry = NodeRegistry::new();
        director_nodes::register_standard_nodes(&mut registry).unwrap();
        registry
    }

    const LIGHTS: &str = r#"
(
    root: (
        name: "Lights",
        nodes: [
            (key: "start", name: "Start", category: "Core"),
            (key: "toggle", name: "Toggle", category: "Core"),
            (key: "lit", name: "Boolean", category: "Value", properties: {"Value": Bool(false)}),
        ],
        links: [(from: "start", output: "Out", to: "toggle", input: "Toggle")],
        values: [(node: "toggle", link: "Value", value: "lit")],
        sub_graphs: [
            (
                name: "Counter",
                nodes: [
                    (key: "loop", name: "For Loop", category: "Core",
                     properties: {"Start": Int(1), "End": Int(3)}),
                    (key: "index", name: "Integer", category: "Value"),
                ],
                values: [(node: "loop", link: "CurrentIndex", value: "index")],
            ),
        ],
    ),
)
"#;

    #[test]
    fn test_load_and_run() {
        let registry = registry();
        let loaded = Loader::new(&registry).load_str(LIGHTS).unwrap();
        assert_eq!(loaded.keys.len(), 5);
        assert_eq!(loaded.script.graphs().count(), 2);
        assert_eq!(
            loaded.script.graph(loaded.script.root()).unwrap().name(),
            "Lights"
        );

        let lit = loaded.node("lit").unwrap();
        let mut director = Director::new(loaded.script);
        director.start();
        director.update(0.1, 0.1).unwrap();
        director.update(0.1, 0.1).unwrap();

        assert_eq!(
            director.script().node(lit).unwrap().value(),
            Some(&Property::Bool(true))
        );
    }

    #[test]
    fn test_subgraph_nodes_and_overrides() {
        let registry = registry();
        let loaded = Loader::new(&registry).load_str(LIGHTS).unwrap();
        let root = loaded.script.root();
        let looping = loaded.node("loop").unwrap();
        let index = loaded.node("index").unwrap();
        let loop_graph = loaded.script.node(looping).unwrap().graph();

        assert_ne!(loop_graph, root);
        assert_eq!(loaded.script.property(looping, "End"), Some(&Property::Int(3)));

        let mut director = Director::new(loaded.script);
        assert!(director.trigger_input(root, looping, "Start").is_err());
        director.trigger_input(loop_graph, looping, "Start").unwrap();
        director.update(0.1, 0.1).unwrap();

        assert_eq!(
            director.script().node(index).unwrap().value(),
            Some(&Property::Int(3))
        );
    }

    #[test]
    fn test_cross_graph_link() {
        let source = r#"
(
    root: (
        name: "Main",
        nodes: [(key: "start", name: "Start", category: "Core")],
        links: [(from: "start", output: "Out", to: "entry", input: "In")],
        sub_graphs: [
            (name: "Inner", nodes: [(key: "entry", name: "Input", category: "Core")]),
        ],
    ),
)
"#;
        let registry = registry();
        let loaded = Loader::new(&registry).load_str(source).unwrap();
        let start = loaded.node("start").unwrap();
        let entry = loaded.node("entry").unwrap();
        let output = loaded.script.node(start).unwrap().output(0).unwrap();
        assert_eq!(output.connected_inputs().len(), 1);
        assert_eq!(output.connected_inputs()[0].node, entry);
    }

    #[test]
    fn test_duplicate_key() {
        let source = r#"
(root: (name: "Main", nodes: [
    (key: "a", name: "Start", category: "Core"),
    (key: "a", name: "Toggle", category: "Core"),
]))
"#;
        let registry = registry();
        let err = Loader::new(&registry).load_str(source).unwrap_err();
        assert!(matches!(err, Error::DuplicateNodeKey(ref key) if key == "a"));
    }

    #[test]
    fn test_unknown_references() {
        let registry = registry();
        let loader = Loader::new(&registry);

        let missing_node = r#"
(root: (name: "Main",
    nodes: [(key: "a", name: "Start", category: "Core")],
    links: [(from: "a", output: "Out", to: "b", input: "In")],
))
"#;
        assert!(matches!(
            loader.load_str(missing_node),
            Err(Error::UnknownNodeKey(ref key)) if key == "b"
        ));

        let missing_link = r#"
(root: (name: "Main",
    nodes: [
        (key: "a", name: "Start", category: "Core"),
        (key: "b", name: "Toggle", category: "Core"),
    ],
    links: [(from: "a", output: "Out", to: "b", input: "Flip")],
))
"#;
        assert!(matches!(
            loader.load_str(missing_link),
            Err(Error::UnknownLink { ref link, .. }) if link == "Flip"
        ));

        let missing_type = r#"(root: (name: "Main", nodes: [(key: "a", name: "Teleport", category: "Core")]))"#;
        assert!(matches!(
            loader.load_str(missing_type),
            Err(Error::Core(director_core::Error::UnknownNodeType(_)))
        ));
    }

    #[test]
    fn test_rejected_binding_aborts_load() {
        let source = r#"
(root: (name: "Main",
    nodes: [
        (key: "toggle", name: "Toggle", category: "Core"),
        (key: "count", name: "Integer", category: "Value"),
    ],
    values: [(node: "toggle", link: "Value", value: "count")],
))
"#;
        let registry = registry();
        let err = Loader::new(&registry).load_str(source).unwrap_err();
        assert!(matches!(
            err,
            Error::Core(director_core::Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_authored_cell_must_fit_value_type() {
        let registry = registry();
        let loader = Loader::new(&registry);

        let wrong = r#"(root: (name: "Main", nodes: [
    (key: "lit", name: "Boolean", category: "Value", properties: {"Value": Int(3)}),
]))"#;
        assert!(matches!(
            loader.load_str(wrong),
            Err(Error::Core(director_core::Error::TypeMismatch { .. }))
        ));

        let widened = r#"(root: (name: "Main", nodes: [
    (key: "speed", name: "Float", category: "Value", properties: {"Value": Int(3)}),
]))"#;
        let loaded = loader.load_str(widened).unwrap();
        let speed = loaded.node("speed").unwrap();
        assert_eq!(
            loaded.script.node(speed).unwrap().value(),
            Some(&Property::Float(3.0))
        );
    }

    #[test]
    fn test_parse_error() {
        let registry = registry();
        let err = Loader::new(&registry).load_str("(root: (").unwrap_err();
        assert!(matches!(err, Error::Ron(_)));
    }
}
