use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Structural address of a node: the child indices leading to it from the
/// unit root. The empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(SmallVec<[u32; 8]>);

impl NodePath {
    /// The root path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from child indices.
    #[must_use]
    pub fn from_indices(indices: &[u32]) -> Self {
        Self(SmallVec::from_slice(indices))
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push(index);
        next
    }

    /// Path of the parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(SmallVec::from_slice(init)))
    }

    /// Index of this node within its parent.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().map(|&i| i as usize)
    }

    /// Number of edges from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Child indices from the root.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    /// Whether `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Whether `self` equals `other` or is one of its ancestors.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.0.push(u32::try_from(index).unwrap_or(u32::MAX));
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}
