use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::decoder::DecodedClass;

/// Which of a `DecodedClass`'s size figures a `NodeFactory` attaches to
/// the nodes it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeProperty {
    Total,
    Code,
}

impl Default for SizeProperty {
    fn default() -> Self {
        SizeProperty::Total
    }
}

/// A graph node. Identity (`Eq`/`Hash`) is by `id` alone, matching the
/// Model's "same id" merge rule.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub connections: HashSet<String>,
    pub size: u64,
    pub external: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, connections: HashSet<String>, size: u64, external: bool) -> Node {
        Node {
            id: id.into(),
            connections,
            size,
            external,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Builds a `Node` from a `DecodedClass`, at either package or class
/// granularity (spec. §4.3).
pub trait NodeFactory {
    fn get_node(&self, decoded: &DecodedClass) -> Node;
}

fn size_of(decoded: &DecodedClass, size_property: SizeProperty) -> u64 {
    match size_property {
        SizeProperty::Total => decoded.total_size,
        SizeProperty::Code => decoded.code_size,
    }
}

/// Produces one node per class, keyed by fully qualified class name.
pub struct ClassNodeFactory {
    pub size_property: SizeProperty,
}

impl ClassNodeFactory {
    pub fn new(size_property: SizeProperty) -> Self {
        ClassNodeFactory { size_property }
    }
}

impl Default for ClassNodeFactory {
    fn default() -> Self {
        ClassNodeFactory::new(SizeProperty::default())
    }
}

impl NodeFactory for ClassNodeFactory {
    fn get_node(&self, decoded: &DecodedClass) -> Node {
        Node::new(
            decoded.name.clone(),
            decoded.class_dependencies().into_iter().collect(),
            size_of(decoded, self.size_property),
            false,
        )
    }
}

/// Produces one node per package, keyed by the class's package name.
pub struct PackageNodeFactory {
    pub size_property: SizeProperty,
}

impl PackageNodeFactory {
    pub fn new(size_property: SizeProperty) -> Self {
        PackageNodeFactory { size_property }
    }
}

impl Default for PackageNodeFactory {
    fn default() -> Self {
        PackageNodeFactory::new(SizeProperty::default())
    }
}

impl NodeFactory for PackageNodeFactory {
    fn get_node(&self, decoded: &DecodedClass) -> Node {
        Node::new(
            decoded.package.clone(),
            decoded.package_dependencies().into_iter().collect(),
            size_of(decoded, self.size_property),
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::test_support::minimal_class;

    #[test]
    fn class_node_factory_keys_by_class_name() {
        let decoded = minimal_class("com.example.Foo", "com.example.Bar");
        let node = ClassNodeFactory::default().get_node(&decoded);

        assert_eq!(node.id, "com.example.Foo");
        assert!(node.connections.contains("com.example.Bar"));
        assert!(!node.external);
        assert_eq!(node.size, decoded.total_size);
    }

    #[test]
    fn package_node_factory_keys_by_package_name() {
        let decoded = minimal_class("com.example.Foo", "com.example.Bar");
        let node = PackageNodeFactory::default().get_node(&decoded);

        assert_eq!(node.id, "com.example");
        assert!(node.connections.contains("com.example"));
    }

    #[test]
    fn size_property_selects_code_size_when_requested() {
        let decoded = minimal_class("com.example.Foo", "com.example.Bar");
        let node = ClassNodeFactory::new(SizeProperty::Code).get_node(&decoded);

        assert_eq!(node.size, decoded.code_size);
    }

    #[test]
    fn node_identity_ignores_connections_and_size() {
        let a = Node::new("same-id", HashSet::from(["x".to_string()]), 10, false);
        let b = Node::new("same-id", HashSet::new(), 99, true);
        assert_eq!(a, b);
    }
}
