use petgraph::dot::{Config, Dot};

use classgraph_core::GraphView;

/// Renders a `GraphView` as Graphviz DOT, attaching `size`/`external` as
/// node attributes.
pub(crate) fn render(view: &GraphView) -> String {
    let graph = view.inner();
    let dot = Dot::with_attr_getters(
        graph,
        &[Config::EdgeNoLabel],
        &|_, _| String::new(),
        &|_, (_, node)| format!("label=\"{}\" size={} external={}", node.id, node.size, node.external),
    );

    format!("{dot:?}")
}
