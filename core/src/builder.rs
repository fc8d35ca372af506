use std::path::Path;

use crate::decoder;
use crate::errors::ScanError;
use crate::model::Model;
use crate::node::NodeFactory;
use crate::scanner::Scanner;

/// Stateless glue between the Scanner, Decoder, NodeFactory, and Model
/// (spec. §4.5). Owns the Model and the NodeFactory; callers configure the
/// model's filter chain before the first `append`.
pub struct Builder {
    model: Model,
    factory: Box<dyn NodeFactory>,
}

impl Builder {
    pub fn new(factory: impl NodeFactory + 'static) -> Builder {
        Builder {
            model: Model::new(),
            factory: Box::new(factory),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Scans `root`, decoding every discovered class file and merging its
    /// node into the model. Decode failures are logged and skipped; they
    /// never abort the scan.
    pub fn append(&self, root: &Path) -> Result<usize, ScanError> {
        let mut processed = 0usize;
        let mut scanner = Scanner::new(|path| {
            if let Err(err) = self.on_class_file(path) {
                log::warn!("skipping class file {}: {}", path.display(), err);
            } else {
                processed += 1;
            }
        })?;

        scanner.scan(root)?;
        Ok(processed)
    }

    fn on_class_file(&self, path: &Path) -> Result<(), ScanError> {
        let bytes = std::fs::read(path)?;
        let decoded = match decoder::decode(&bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::warn!("failed to decode {}: {}", path.display(), err);
                return Ok(());
            }
        };

        let node = self.factory.get_node(&decoded);
        self.model.merge(node)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::test_support::minimal_class_bytes;
    use crate::node::{ClassNodeFactory, SizeProperty};

    #[test]
    fn append_decodes_and_merges_every_class_under_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("Foo.class"),
            minimal_class_bytes("com.example.Foo", "com.example.Bar"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Bar.class"),
            minimal_class_bytes("com.example.Bar", "com.example.Foo"),
        )
        .unwrap();

        let builder = Builder::new(ClassNodeFactory::new(SizeProperty::Total));
        let processed = builder.append(dir.path()).expect("append should succeed");

        assert_eq!(processed, 2);

        let nodes = builder.model().nodes();
        let mut ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["com.example.Bar", "com.example.Foo"]);
    }

    #[test]
    fn append_skips_an_undecodable_file_and_keeps_going() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Bad.class"), b"not a class file at all").unwrap();
        std::fs::write(
            dir.path().join("Good.class"),
            minimal_class_bytes("com.example.Good", "java.lang.Object"),
        )
        .unwrap();

        let builder = Builder::new(ClassNodeFactory::default());
        let processed = builder.append(dir.path()).expect("append should succeed");

        assert_eq!(processed, 1);
        let nodes = builder.model().nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "com.example.Good");
    }
}
