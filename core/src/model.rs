use std::collections::HashSet;
use std::sync::Mutex;

use crate::errors::ModelError;
use crate::node::Node;

/// Returns a transformed node to keep it in the model, or `None` to drop it.
pub trait NodeFilter: Send + Sync {
    fn filter_node(&mut self, node: Node) -> Option<Node>;
}

/// Drops nodes (and prunes connections) whose id fails a predicate.
pub struct IdPredicateFilter<F> {
    predicate: F,
    dropped: usize,
}

impl<F> IdPredicateFilter<F>
where
    F: FnMut(&str) -> bool,
{
    pub fn new(predicate: F) -> Self {
        IdPredicateFilter {
            predicate,
            dropped: 0,
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<F> NodeFilter for IdPredicateFilter<F>
where
    F: FnMut(&str) -> bool + Send + Sync,
{
    fn filter_node(&mut self, mut node: Node) -> Option<Node> {
        if !(self.predicate)(&node.id) {
            self.dropped += 1;
            return None;
        }
        node.connections.retain(|id| (self.predicate)(id));
        Some(node)
    }
}

/// Rewrites node and connection ids through a mapping function.
pub struct IdMapper<F> {
    mapper: F,
    mapped: usize,
}

impl<F> IdMapper<F>
where
    F: FnMut(&str) -> String,
{
    pub fn new(mapper: F) -> Self {
        IdMapper { mapper, mapped: 0 }
    }

    pub fn mapped(&self) -> usize {
        self.mapped
    }
}

impl<F> NodeFilter for IdMapper<F>
where
    F: FnMut(&str) -> String + Send + Sync,
{
    fn filter_node(&mut self, mut node: Node) -> Option<Node> {
        node.id = (self.mapper)(&node.id);
        node.connections = node.connections.iter().map(|id| (self.mapper)(id)).collect();
        self.mapped += 1;
        Some(node)
    }
}

struct ModelState {
    open: bool,
    nodes: Vec<Node>,
}

/// A thread-safe graph under construction (spec. §4.4). All mutating
/// operations are serialized by a single mutex guarding both the node
/// collection and the `open` flag.
pub struct Model {
    state: Mutex<ModelState>,
    node_filters: Mutex<Vec<Box<dyn NodeFilter>>>,
}

impl Model {
    pub fn new() -> Model {
        Model {
            state: Mutex::new(ModelState {
                open: true,
                nodes: Vec::new(),
            }),
            node_filters: Mutex::new(Vec::new()),
        }
    }

    /// Appends a filter to the chain. Must happen before the first `merge`;
    /// the chain is read-only once a scan begins.
    pub fn add_filter(&self, filter: Box<dyn NodeFilter>) {
        self.node_filters
            .lock()
            .expect("model mutex poisoned")
            .push(filter);
    }

    /// Runs `node` through the filter chain in order, then merges it into
    /// the model: same-id nodes have their size summed and connections
    /// unioned; otherwise the node is appended.
    pub fn merge(&self, mut node: Node) -> Result<(), ModelError> {
        let mut filters = self.node_filters.lock().expect("model mutex poisoned");
        for filter in filters.iter_mut() {
            match filter.filter_node(node) {
                Some(n) => node = n,
                None => {
                    log::debug!("node rejected by filter chain: {}", node.id);
                    return Ok(());
                }
            }
        }
        drop(filters);

        let mut state = self.state.lock().expect("model mutex poisoned");
        if !state.open {
            return Err(ModelError::Closed);
        }

        match state.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => {
                existing.size += node.size;
                existing.connections.extend(node.connections);
            }
            None => state.nodes.push(node),
        }

        Ok(())
    }

    /// Closes the model; drops every connection whose id names no node in
    /// the model. Returns the number of dropped edges.
    pub fn remove_external_connections(&self) -> usize {
        let mut state = self.state.lock().expect("model mutex poisoned");

        let internal_ids: HashSet<String> = state.nodes.iter().map(|n| n.id.clone()).collect();
        let mut removed = 0usize;
        for node in state.nodes.iter_mut() {
            let before = node.connections.len();
            node.connections.retain(|id| internal_ids.contains(id));
            removed += before - node.connections.len();
        }

        state.open = false;
        removed
    }

    /// Closes the model; creates an external node for every connection id
    /// that names no existing node. Returns the number of nodes created.
    pub fn create_external_nodes(&self) -> usize {
        let mut state = self.state.lock().expect("model mutex poisoned");

        let internal_ids: HashSet<String> = state.nodes.iter().map(|n| n.id.clone()).collect();
        let mut external_ids: HashSet<String> = HashSet::new();
        for node in state.nodes.iter() {
            for conn in &node.connections {
                if !internal_ids.contains(conn) {
                    external_ids.insert(conn.clone());
                }
            }
        }

        let created = external_ids.len();
        for id in external_ids {
            state.nodes.push(Node::new(id, HashSet::new(), 0, true));
        }

        state.open = false;
        created
    }

    /// Snapshot of the current nodes. Only meaningful to call once the
    /// model is closed (after one of the two closing operations above).
    pub fn nodes(&self) -> Vec<Node> {
        let state = self.state.lock().expect("model mutex poisoned");
        state.nodes.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().expect("model mutex poisoned").open
    }
}

impl Default for Model {
    fn default() -> Model {
        Model::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, connections: &[&str]) -> Node {
        Node::new(
            id,
            connections.iter().map(|s| s.to_string()).collect(),
            1,
            false,
        )
    }

    fn ids(model: &Model) -> Vec<String> {
        let mut ids: Vec<String> = model.nodes().into_iter().map(|n| n.id).collect();
        ids.sort();
        ids
    }

    /// S5: repeated merges of the same id sum size and union connections.
    #[test]
    fn merge_unions_connections_and_sums_size() {
        let model = Model::new();
        model.merge(node("n0", &["n1"])).unwrap();
        model.merge(node("n1", &[])).unwrap();
        model.merge(node("n2", &[])).unwrap();
        model.merge(node("n0", &["n2"])).unwrap();

        assert_eq!(ids(&model), vec!["n0", "n1", "n2"]);

        let nodes = model.nodes();
        let n0 = nodes.iter().find(|n| n.id == "n0").unwrap();
        assert_eq!(n0.size, 2);
        let connections: HashSet<&str> = n0.connections.iter().map(|s| s.as_str()).collect();
        assert_eq!(connections, HashSet::from(["n1", "n2"]));
    }

    /// Invariant 4: merge order does not affect the final aggregated state.
    #[test]
    fn merge_is_commutative_over_node_order() {
        let inputs = [node("n0", &["n1"]), node("n1", &[]), node("n0", &["n2"]), node("n2", &[])];

        let forward = Model::new();
        for n in inputs.clone() {
            forward.merge(n).unwrap();
        }

        let mut reversed_inputs = inputs;
        reversed_inputs.reverse();
        let backward = Model::new();
        for n in reversed_inputs {
            backward.merge(n).unwrap();
        }

        let summarize = |m: &Model| -> std::collections::BTreeMap<String, (u64, Vec<String>)> {
            m.nodes()
                .into_iter()
                .map(|n| {
                    let mut conns: Vec<String> = n.connections.into_iter().collect();
                    conns.sort();
                    (n.id, (n.size, conns))
                })
                .collect()
        };

        assert_eq!(summarize(&forward), summarize(&backward));
    }

    /// S6: filter chain order changes the outcome. `IdPredicateFilter` drops
    /// the "n1" node and strips "n1" out of any surviving connections
    /// *before* `IdMapper` ever sees it — run the mapper first instead and
    /// "n1" would survive (renamed) in both places.
    #[test]
    fn filter_chain_order_matters() {
        let expand = |id: &str| id.replace('n', "NODE");

        let model = Model::new();
        model.add_filter(Box::new(IdPredicateFilter::new(|id: &str| id != "n1")));
        model.add_filter(Box::new(IdMapper::new(expand)));

        model.merge(node("n0", &["n1"])).unwrap();
        model.merge(node("n1", &[])).unwrap();
        model.merge(node("n2", &[])).unwrap();
        model.merge(node("n0", &["n2"])).unwrap();

        assert_eq!(ids(&model), vec!["NODE0".to_string(), "NODE2".to_string()]);

        let nodes = model.nodes();
        let node0 = nodes.iter().find(|n| n.id == "NODE0").unwrap();
        assert_eq!(
            node0.connections,
            HashSet::from(["NODE2".to_string()])
        );
    }

    /// S7 / invariant 6: once closed, merges fail and the op is not
    /// idempotent.
    #[test]
    fn close_once_then_merge_fails() {
        let model = Model::new();
        model.merge(node("n0", &["external-a", "external-b"])).unwrap();
        model.merge(node("n1", &["external-a"])).unwrap();

        let dropped = model.remove_external_connections();
        assert_eq!(dropped, 3);
        assert!(!model.is_open());

        let err = model.merge(node("n2", &[])).unwrap_err();
        assert!(matches!(err, ModelError::Closed));
    }

    #[test]
    fn create_external_nodes_materializes_referenced_but_undefined_ids() {
        let model = Model::new();
        model.merge(node("n0", &["n1", "ghost"])).unwrap();
        model.merge(node("n1", &[])).unwrap();

        let created = model.create_external_nodes();
        assert_eq!(created, 1);

        let nodes = model.nodes();
        let ghost = nodes.iter().find(|n| n.id == "ghost").unwrap();
        assert!(ghost.external);
        assert_eq!(ghost.size, 0);
        assert!(ghost.connections.is_empty());
    }
}
