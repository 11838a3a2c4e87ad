//! Syntax tree model.
//!
//! Trees are produced by an external parser (or by hand through [`build`])
//! and are never mutated by the rules: every rewrite is expressed as a list
//! of path-addressed edits applied by [`crate::fix`] to a copy.

pub mod build;
mod node;
mod path;
pub mod printer;

pub use node::{Modifier, Node, NodeKind, Span};
pub use path::NodePath;

use serde::{Deserialize, Serialize};

/// One compilation unit: a primary type plus whatever else the file declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Unit name, usually the file stem.
    pub name: String,
    /// Root node of kind [`NodeKind::Unit`].
    pub root: Node,
}

impl SourceUnit {
    /// Creates a unit without a package declaration.
    #[must_use]
    pub fn new(name: &str, types: Vec<Node>) -> Self {
        Self {
            name: name.to_owned(),
            root: Node::new(NodeKind::Unit { package: None }, types),
        }
    }

    /// Index of the primary declaration among the root's children: the first
    /// public class, otherwise the first class.
    #[must_use]
    pub fn primary_type_index(&self) -> Option<usize> {
        let is_class = |n: &&Node| matches!(n.kind, NodeKind::Class { .. });
        self.root
            .children
            .iter()
            .position(|n| is_class(&n) && n.has_modifier(Modifier::Public))
            .or_else(|| self.root.children.iter().position(|n| is_class(&n)))
    }

    /// Path of the primary declaration.
    #[must_use]
    pub fn primary_type_path(&self) -> Option<NodePath> {
        self.primary_type_index()
            .map(|i| NodePath::root().child(i))
    }

    /// Resolves a path from the unit root.
    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&Node> {
        self.root.get(path)
    }
}
