//! Relationship graph over registered components.
//!
//! [`RelationshipGraph`] is a directed `petgraph` graph with one node per
//! registered component and one edge per relationship triple whose target is
//! registered. It converts to a `dot_structures` graph and prints as Graphviz
//! DOT text for an external layout tool.

use std::collections::HashMap;

use dot_structures::{
    Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::{debug, trace};
use petgraph::graph::{DiGraph, NodeIndex};

use doop_parser::Component;

use crate::{
    config::GraphConfig,
    registry::{Registry, RelationshipTriple},
};

/// Directed graph of components connected by their relationships.
#[derive(Debug)]
pub struct RelationshipGraph<'a> {
    graph: DiGraph<&'a Component, &'a RelationshipTriple>,
    node_id_map: HashMap<&'a str, NodeIndex>,
}

impl<'a> RelationshipGraph<'a> {
    /// Build the graph from a registry.
    ///
    /// Nodes follow registration order. Triples pointing at unregistered
    /// components are left out; they are reported by validation instead.
    pub fn from_registry(registry: &'a Registry) -> Self {
        let mut graph = DiGraph::new();
        let mut node_id_map = HashMap::new();

        for component in registry.components() {
            let idx = graph.add_node(component);
            node_id_map.insert(component.name.as_str(), idx);
        }

        for triple in registry.relationships() {
            let (Some(&source), Some(&target)) = (
                node_id_map.get(triple.source.as_str()),
                node_id_map.get(triple.target.as_str()),
            ) else {
                trace!(target_name = triple.target.as_str(); "Skipping unresolved relationship");
                continue;
            };
            graph.add_edge(source, target, triple);
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count();
            "Built relationship graph"
        );
        Self { graph, node_id_map }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Names of the components `name` points at, in edge insertion order.
    pub fn targets_of(&self, name: &str) -> Vec<&'a str> {
        let Some(&idx) = self.node_id_map.get(name) else {
            return Vec::new();
        };

        let mut targets: Vec<_> = self
            .graph
            .edges(idx)
            .map(|edge| {
                let triple: &'a RelationshipTriple = *edge.weight();
                triple.target.as_str()
            })
            .collect();
        // petgraph yields outgoing edges newest first.
        targets.reverse();
        targets
    }

    /// Build the Graphviz graph for this model.
    ///
    /// Nodes are sorted by their `order` attribute, then by registration.
    /// With `cluster_groups` set, components sharing a `group` are placed
    /// in one `cluster_N` subgraph.
    pub fn to_graph(&self, config: &GraphConfig) -> Graph {
        let mut stmts = vec![
            Stmt::Attribute(Attribute(plain("rankdir"), escaped(&config.rank_dir))),
            Stmt::GAttribute(GraphAttributes::Node(vec![
                Attribute(plain("shape"), plain("box")),
                Attribute(plain("style"), escaped("rounded,filled")),
                Attribute(plain("fillcolor"), escaped("#ffffff")),
            ])),
        ];

        let mut nodes: Vec<_> = self.graph.node_indices().collect();
        nodes.sort_by(|a, b| {
            let order = |idx: &NodeIndex| self.graph[*idx].visualization.order_value();
            order(a)
                .unwrap_or(f64::INFINITY)
                .total_cmp(&order(b).unwrap_or(f64::INFINITY))
                .then(a.cmp(b))
        });

        let mut groups: Vec<(&str, Vec<Stmt>)> = Vec::new();
        let mut ungrouped = Vec::new();
        for idx in nodes {
            let node = Stmt::Node(self.node(idx));
            match self.graph[idx].visualization.group.as_deref() {
                Some(group) if config.cluster_groups => {
                    match groups.iter_mut().find(|(name, _)| *name == group) {
                        Some((_, members)) => members.push(node),
                        None => groups.push((group, vec![node])),
                    }
                }
                _ => ungrouped.push(node),
            }
        }

        for (i, (group, members)) in groups.into_iter().enumerate() {
            let mut cluster = vec![Stmt::Attribute(Attribute(plain("label"), escaped(group)))];
            cluster.extend(members);
            stmts.push(Stmt::Subgraph(Subgraph {
                id: plain(&format!("cluster_{i}")),
                stmts: cluster,
            }));
        }
        stmts.extend(ungrouped);

        for edge in self.graph.edge_indices() {
            let Some((source, target)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            stmts.push(Stmt::Edge(Edge {
                ty: EdgeTy::Pair(
                    Vertex::N(node_id(&self.graph[source].name)),
                    Vertex::N(node_id(&self.graph[target].name)),
                ),
                attributes: vec![Attribute(plain("label"), escaped(&self.graph[edge].rel_type))],
            }));
        }

        Graph::DiGraph {
            id: plain("architecture"),
            strict: false,
            stmts,
        }
    }

    /// Render the graph as Graphviz DOT text.
    pub fn to_dot(&self, config: &GraphConfig) -> String {
        let dot = self.to_graph(config).print(&mut PrinterContext::default());
        trace!(bytes = dot.len(); "Printed DOT graph");
        dot
    }

    fn node(&self, idx: NodeIndex) -> Node {
        let component = self.graph[idx];
        let vis = &component.visualization;

        let label = match vis.icon.as_deref() {
            Some(icon) => format!("{}\n[{icon}]", component.name),
            None => component.name.clone(),
        };

        let mut attributes = vec![Attribute(plain("label"), escaped(&label))];
        if let Some(color) = vis.color.as_deref() {
            attributes.push(Attribute(plain("fillcolor"), escaped(color)));
        }
        if let Some(description) = component.description.as_deref() {
            attributes.push(Attribute(plain("tooltip"), escaped(description)));
        }

        Node {
            id: node_id(&component.name),
            attributes,
        }
    }
}

fn plain(text: &str) -> Id {
    Id::Plain(text.to_string())
}

fn node_id(name: &str) -> NodeId {
    NodeId(escaped(name), None)
}

/// A double-quoted DOT identifier; newlines become `\n` line breaks.
fn escaped(text: &str) -> Id {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    Id::Escaped(quoted)
}

#[cfg(test)]
mod tests {
    use doop_parser::{Relationship, Visualization};

    use super::*;

    fn component(name: &str, targets: &[&str], visualization: Visualization) -> Component {
        let mut component = Component::new(name);
        if !targets.is_empty() {
            component
                .relationships
                .push(Relationship::new("uses", targets.iter().copied()));
        }
        component.visualization = visualization;
        component
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        let components = [
            component(
                "Api",
                &["Store", "Missing"],
                Visualization {
                    color: Some("#3498db".into()),
                    icon: Some("server".into()),
                    group: Some("edge".into()),
                    order: Some("2".into()),
                },
            ),
            component("Store", &[], Visualization::default()),
            component(
                "Cdn",
                &["Api"],
                Visualization {
                    group: Some("edge".into()),
                    order: Some("1".into()),
                    ..Visualization::default()
                },
            ),
        ];
        for c in components {
            registry.register_component(c).expect("unique names");
        }
        registry
    }

    #[test]
    fn test_nodes_and_resolved_edges() {
        let registry = registry();
        let graph = RelationshipGraph::from_registry(&registry);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.targets_of("Api"), ["Store"]);
        assert_eq!(graph.targets_of("Cdn"), ["Api"]);
        assert!(graph.targets_of("Nope").is_empty());
    }

    #[test]
    fn test_dot_output() {
        let registry = registry();
        let graph = RelationshipGraph::from_registry(&registry);
        let dot = graph.to_dot(&GraphConfig::default());

        assert!(dot.contains("digraph architecture"));
        assert!(dot.contains("rankdir=\"LR\""));
        assert!(dot.contains("subgraph cluster_0"));
        assert!(dot.contains("label=\"edge\""));
        assert!(dot.contains("label=\"Api\\n[server]\""));
        assert!(dot.contains("fillcolor=\"#3498db\""));
        assert!(dot.contains("\"Api\" -> \"Store\""));
        assert!(dot.contains("\"Cdn\" -> \"Api\""));
        assert!(dot.contains("label=\"uses\""));
        assert!(!dot.contains("Missing"));

        // Ordered by `order`: Cdn (1) before Api (2).
        let cdn = dot.find("label=\"Cdn\"").expect("Cdn node");
        let api = dot.find("label=\"Api").expect("Api node");
        assert!(cdn < api);
    }

    #[test]
    fn test_graph_structure() {
        let registry = registry();
        let graph = RelationshipGraph::from_registry(&registry);

        let Graph::DiGraph { id, strict, stmts } = graph.to_graph(&GraphConfig::default()) else {
            panic!("expected a directed graph");
        };
        assert_eq!(id, Id::Plain("architecture".to_string()));
        assert!(!strict);

        let clusters: Vec<_> = stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Subgraph(subgraph) => Some(subgraph),
                _ => None,
            })
            .collect();
        assert_eq!(clusters.len(), 1);
        // Label plus Cdn and Api.
        assert_eq!(clusters[0].stmts.len(), 3);

        let edges = stmts.iter().filter(|stmt| matches!(stmt, Stmt::Edge(_))).count();
        assert_eq!(edges, 2);
    }

    #[test]
    fn test_dot_without_clusters() {
        let registry = registry();
        let graph = RelationshipGraph::from_registry(&registry);
        let config = GraphConfig {
            cluster_groups: false,
            ..GraphConfig::default()
        };

        let dot = graph.to_dot(&config);
        assert!(!dot.contains("subgraph"));
    }

    #[test]
    fn test_identifier_escapes() {
        assert_eq!(
            escaped("say \"hi\"\n"),
            Id::Escaped("\"say \\\"hi\\\"\\n\"".to_string())
        );
        assert_eq!(plain("box"), Id::Plain("box".to_string()));
    }
}
