//! Script export back to definitions

use crate::error::Result;
use crate::schema::{GraphDef, LinkDef, NodeDef, ScriptDef, ValueBindingDef};
use director_core::{GraphId, NodeId, Script};
use indexmap::{IndexMap, IndexSet};

/// Describe a script as a definition
///
/// `keys` names nodes; nodes without a key are named after their id
/// (`node:N`, suffixed when an authored key already uses that name). Value
/// link defaults are written as properties so a reload
/// through the same registry rebuilds the same script.
pub fn export(script: &Script, keys: &IndexMap<String, NodeId>) -> ScriptDef {
    let mut names: IndexMap<NodeId, String> = keys.iter().map(|(k, id)| (*id, k.clone())).collect();
    let mut used: IndexSet<String> = names.values().cloned().collect();
    for node in script.nodes() {
        if names.contains_key(&node.id()) {
            continue;
        }
        let base = node.id().to_string();
        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        used.insert(name.clone());
        names.insert(node.id(), name);
    }
    ScriptDef {
        root: export_graph(script, script.root(), &names),
    }
}

/// Export a script straight to RON
pub fn to_ron(script: &Script, keys: &IndexMap<String, NodeId>) -> Result<String> {
    let def = export(script, keys);
    Ok(ron::ser::to_string_pretty(
        &def,
        ron::ser::PrettyConfig::default(),
    )?)
}

fn export_graph(script: &Script, id: GraphId, names: &IndexMap<NodeId, String>) -> GraphDef {
    let Some(graph) = script.graph(id) else {
        return GraphDef::new("");
    };
    let mut def = GraphDef::new(graph.name());
    let name_of = |id: NodeId| names.get(&id).cloned().unwrap_or_else(|| id.to_string());

    for node in graph.nodes().iter().filter_map(|id| script.node(*id)) {
        let mut properties = node.properties().clone();
        for link in node.value_links() {
            properties.insert(link.name().to_string(), link.default_property().clone());
        }
        def.nodes.push(NodeDef {
            key: name_of(node.id()),
            name: node.node_type().name.clone(),
            category: node.node_type().category.clone(),
            properties,
        });

        for output in node.outputs() {
            for input in output.connected_inputs() {
                let Some(target) = script.node(input.node) else {
                    continue;
                };
                let Some(input_link) = target.input(input.index) else {
                    continue;
                };
                def.links.push(LinkDef {
                    from: name_of(node.id()),
                    output: output.name().to_string(),
                    to: name_of(input.node),
                    input: input_link.name().to_string(),
                });
            }
        }

        for link in node.value_links() {
            for value in link.connected_value_nodes() {
                if !script.contains_node(*value) {
                    continue;
                }
                def.values.push(ValueBindingDef {
                    node: name_of(node.id()),
                    link: link.name().to_string(),
                    value: name_of(*value),
                });
            }
        }
    }

    for sub in graph.sub_graphs() {
        def.sub_graphs.push(export_graph(script, *sub, names));
    }
    def
}
