//! Name to definition bindings for one scene.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::error::{CellError, Result};
use crate::scene::Node;
use crate::tokenizer::Position;

/// Definitions registered while decoding a scene, keyed by name.
///
/// A name is bound at most once. Binding the same node again is a no-op;
/// binding a different node is a naming collision.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: HashMap<String, Arc<Node>>,
}

impl DefinitionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `node`.
    pub fn register(&mut self, name: &str, node: &Arc<Node>, position: Position) -> Result<()> {
        match self.definitions.get(name) {
            Some(existing) if Arc::ptr_eq(existing, node) => Ok(()),
            Some(_) => Err(CellError::NamingCollision {
                position,
                name: name.to_string(),
            }),
            None => {
                tracing::debug!(name, cell_type = ?node.cell_type, "registered definition");
                self.definitions.insert(name.to_string(), Arc::clone(node));
                Ok(())
            }
        }
    }

    /// Definition bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Arc<Node>> {
        self.definitions.get(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no name is bound.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Serialize for DefinitionRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.names()
                .into_iter()
                .filter_map(|name| self.definitions.get(name).map(|node| (name, node))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::header::NodeHeader;
    use crate::registry::CellType;
    use crate::scene::Shape;

    fn file_reference(path: &str) -> Arc<Node> {
        Arc::new(Node {
            cell_type: CellType::FileReference,
            position: Position::default(),
            header: NodeHeader::default(),
            shape: Shape::FileReference {
                path: path.to_string(),
            },
        })
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = DefinitionRegistry::new();
        assert!(registry.is_empty());

        let part = file_reference("a.cell");
        registry.register("partA", &part, Position::default()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(registry.get("partA").unwrap(), &part));
        assert!(Arc::ptr_eq(registry.get("partA").unwrap(), registry.get("partA").unwrap()));
        assert!(registry.get("partB").is_none());
    }

    #[test]
    fn test_rebinding_same_node_is_noop() {
        let mut registry = DefinitionRegistry::new();
        let part = file_reference("a.cell");
        registry.register("partA", &part, Position::default()).unwrap();
        registry.register("partA", &part, Position::default()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_collision() {
        let mut registry = DefinitionRegistry::new();
        registry
            .register("dup", &file_reference("a.cell"), Position::default())
            .unwrap();
        let at = Position { line: 4, col: 1 };
        let err = registry
            .register("dup", &file_reference("a.cell"), at)
            .unwrap_err();
        assert!(matches!(err, CellError::NamingCollision { ref name, position } if name == "dup" && position == at));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = DefinitionRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(name, &file_reference(name), Position::default())
                .unwrap();
        }
        assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);

        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["alpha"]["shape"]["path"], "alpha");
    }
}
