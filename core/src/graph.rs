use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;

use crate::model::Model;

/// One node's externally visible attributes in a `GraphView`.
#[derive(Debug, Clone)]
pub struct NodeAttrs {
    pub id: String,
    pub size: u64,
    pub external: bool,
}

/// A read-only projection of a closed `Model` (spec. §4.6). Construction
/// reads the model's node collection once; subsequent Model mutation is
/// out of contract.
pub struct GraphView {
    graph: DiGraph<NodeAttrs, ()>,
}

impl GraphView {
    /// Builds a view from a model. The model should already be closed via
    /// `remove_external_connections` or `create_external_nodes`.
    pub fn from_model(model: &Model) -> GraphView {
        let mut graph = DiGraph::new();
        let nodes = model.nodes();

        let indices: std::collections::HashMap<String, _> = nodes
            .iter()
            .map(|node| {
                let idx = graph.add_node(NodeAttrs {
                    id: node.id.clone(),
                    size: node.size,
                    external: node.external,
                });
                (node.id.clone(), idx)
            })
            .collect();

        for node in &nodes {
            let Some(&src) = indices.get(&node.id) else {
                continue;
            };
            for connection in &node.connections {
                if let Some(&dst) = indices.get(connection) {
                    graph.add_edge(src, dst, ());
                }
            }
        }

        GraphView { graph }
    }

    /// Every node's id, size, and external flag.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeAttrs> {
        self.graph.node_weights()
    }

    /// Every (src_id, dst_id) edge.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(|edge| {
            let src = &self.graph[edge.source()].id;
            let dst = &self.graph[edge.target()].id;
            (src.as_str(), dst.as_str())
        })
    }

    /// Access to the underlying graph, for consumers that want to hand it
    /// straight to a petgraph-aware serializer (e.g. DOT export).
    pub fn inner(&self) -> &DiGraph<NodeAttrs, ()> {
        &self.graph
    }
}
