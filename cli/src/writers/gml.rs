use std::collections::HashMap;
use std::fmt::Write as _;

use classgraph_core::GraphView;

/// Hand-rolled GML writer (spec's non-core graph serialization): no crate
/// in the stack emits this format, so the minimal
/// `graph [ directed 1 node [...] edge [...] ]` grammar is written directly.
pub(crate) fn render(view: &GraphView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "graph [");
    let _ = writeln!(out, "  directed 1");

    let mut ids: HashMap<&str, usize> = HashMap::new();
    for (index, node) in view.nodes().enumerate() {
        ids.insert(node.id.as_str(), index);
        let _ = writeln!(out, "  node [");
        let _ = writeln!(out, "    id {index}");
        let _ = writeln!(out, "    label \"{}\"", escape(&node.id));
        let _ = writeln!(out, "    size {}", node.size);
        let _ = writeln!(out, "    external {}", node.external as u8);
        let _ = writeln!(out, "  ]");
    }

    for (src, dst) in view.edges() {
        let (Some(&source), Some(&target)) = (ids.get(src), ids.get(dst)) else {
            continue;
        };
        let _ = writeln!(out, "  edge [");
        let _ = writeln!(out, "    source {source}");
        let _ = writeln!(out, "    target {target}");
        let _ = writeln!(out, "  ]");
    }

    let _ = writeln!(out, "]");
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
