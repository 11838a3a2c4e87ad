//! Path-addressed tree rewriter.
//!
//! # Usage
//!
//! ```
//! use recast::fix::{EditOp, RewriteEdit, TreeRewriter};
//! use recast::tree::build::*;
//! use recast::tree::NodePath;
//!
//! let unit = unit("T", vec![class("T", &[], vec![
//!     field("x", "String", &[], Some(string("a"))),
//! ])]);
//! let mut rewriter = TreeRewriter::new(&unit);
//! rewriter.add_edit(RewriteEdit::new(
//!     NodePath::from_indices(&[0, 0, 0]),
//!     EditOp::Replace(name("A")),
//!     "example",
//! ));
//! let applied = rewriter.apply();
//! assert!(applied.conflicts.is_empty());
//! assert_eq!(applied.unit.root.children[0].children[0].children[0], name("A"));
//! ```

use crate::tree::{Node, NodePath, SourceUnit};
use std::cmp::{Ordering, Reverse};
use std::fmt;

/// What an edit does to its target node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Replace the whole subtree.
    Replace(Node),
    /// Change the name carried by the node, keeping its children.
    Rename(String),
    /// Replace the node by its child at the given index.
    Hoist(usize),
    /// Insert a new child.
    InsertChild {
        /// Position among the node's children in the original tree.
        index: usize,
        /// The node to insert.
        node: Node,
    },
}

impl EditOp {
    /// Whether applying this op throws away the subtree at `child` (a path
    /// strictly below the edit target, expressed as the child index taken
    /// from the target).
    fn discards_child(&self, child: usize) -> bool {
        match self {
            Self::Replace(_) => true,
            Self::Hoist(kept) => *kept != child,
            Self::Rename(_) | Self::InsertChild { .. } => false,
        }
    }

    /// Two ops at the same path may coexist only if neither rebuilds the node.
    fn compatible_at_same_path(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::InsertChild { .. }, Self::InsertChild { .. })
                | (Self::Rename(_), Self::InsertChild { .. })
                | (Self::InsertChild { .. }, Self::Rename(_))
        )
    }
}

/// A single proposed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEdit {
    /// Node the edit applies to, addressed in the original tree.
    pub target: NodePath,
    /// The change.
    pub op: EditOp,
    /// Id of the rule that produced the edit.
    pub rule: &'static str,
    /// Index of the change (within the rule's plan) the edit belongs to.
    /// Edits of one change are applied together or not at all.
    pub group: usize,
    /// Optional description for diagnostics.
    pub description: Option<String>,
}

impl RewriteEdit {
    /// Create a new edit
    #[must_use]
    pub fn new(target: NodePath, op: EditOp, rule: &'static str) -> Self {
        Self {
            target,
            op,
            rule,
            group: 0,
            description: None,
        }
    }

    /// Builder-style method to set the change the edit belongs to.
    #[must_use]
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    /// Builder-style method to attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this edit overlaps with `other`, which sorts before it
    /// (is at least as deep).
    fn overlaps(&self, other: &Self) -> bool {
        if self.target == other.target {
            return !self.op.compatible_at_same_path(&other.op);
        }
        if self.target.is_ancestor_of(&other.target) {
            let child = other.target.indices()[self.target.depth()] as usize;
            return self.op.discards_child(child);
        }
        false
    }
}

/// Why an edit was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// The edit would discard or rebuild a node another kept edit touches.
    Overlap {
        /// Target of the kept edit.
        kept: NodePath,
        /// Rule of the kept edit.
        kept_rule: &'static str,
    },
    /// The target path does not exist in the tree.
    MissingTarget,
    /// The op does not fit the target node.
    InvalidOp,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { kept, kept_rule } => {
                write!(f, "overlaps edit at {kept} from {kept_rule}")
            }
            Self::MissingTarget => write!(f, "target node does not exist"),
            Self::InvalidOp => write!(f, "edit does not fit the target node"),
        }
    }
}

/// An edit that was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The dropped edit.
    pub edit: RewriteEdit,
    /// Why it was dropped.
    pub reason: ConflictReason,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} edit at {} dropped: {}",
            self.edit.rule, self.edit.target, self.reason
        )
    }
}

/// Result of applying a plan.
#[derive(Debug, Clone)]
pub struct Applied {
    /// The rewritten copy (equal to the input when nothing applied).
    pub unit: SourceUnit,
    /// Edits that were applied, in application order.
    pub applied: Vec<RewriteEdit>,
    /// Edits that were dropped.
    pub conflicts: Vec<Conflict>,
}

impl Applied {
    /// Whether the unit changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Collects edits for one unit and applies them to a copy of it.
///
/// Edits are sorted by depth, deepest first (stable, so ties keep emission
/// order). Each edit is checked against the edits already kept; an
/// overlapping edit is dropped. Applying deepest-first keeps every path
/// computed against the original tree valid: a change only ever moves nodes
/// below or beside the ones already rewritten.
#[derive(Debug, Clone)]
pub struct TreeRewriter<'a> {
    unit: &'a SourceUnit,
    edits: Vec<RewriteEdit>,
}

impl<'a> TreeRewriter<'a> {
    /// Create a new rewriter for the given unit
    #[must_use]
    pub fn new(unit: &'a SourceUnit) -> Self {
        Self {
            unit,
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list
    pub fn add_edit(&mut self, edit: RewriteEdit) {
        self.edits.push(edit);
    }

    /// Add multiple edits
    pub fn add_edits(&mut self, edits: impl IntoIterator<Item = RewriteEdit>) {
        self.edits.extend(edits);
    }

    /// Get the number of pending edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Splits the pending edits into kept and dropped ones, without applying
    /// anything.
    #[must_use]
    pub fn validate(&self) -> (Vec<RewriteEdit>, Vec<Conflict>) {
        let mut sorted: Vec<(usize, &RewriteEdit)> = self.edits.iter().enumerate().collect();
        sorted.sort_by_key(|(_, e)| Reverse(e.target.depth()));

        let mut kept: Vec<(usize, RewriteEdit)> = Vec::with_capacity(sorted.len());
        let mut conflicts = Vec::new();
        for (order, edit) in sorted {
            let clash = kept
                .iter()
                .find(|(_, k)| edit.overlaps(k))
                .map(|(_, k)| ConflictReason::Overlap {
                    kept: k.target.clone(),
                    kept_rule: k.rule,
                });
            match clash {
                Some(reason) => conflicts.push(Conflict {
                    edit: edit.clone(),
                    reason,
                }),
                None => kept.push((order, edit.clone())),
            }
        }

        // At one node, other edits run first in emission order. Inserts follow
        // from the highest index down, and among equal indices from the last
        // emitted to the first, so the original indices stay valid and
        // emission order survives in the output.
        kept.sort_by(|(oa, a), (ob, b)| {
            Reverse(a.target.depth())
                .cmp(&Reverse(b.target.depth()))
                .then_with(|| a.target.cmp(&b.target))
                .then_with(|| match (&a.op, &b.op) {
                    (EditOp::InsertChild { index: ia, .. }, EditOp::InsertChild { index: ib, .. }) => {
                        ib.cmp(ia).then_with(|| ob.cmp(oa))
                    }
                    (EditOp::InsertChild { .. }, _) => Ordering::Greater,
                    (_, EditOp::InsertChild { .. }) => Ordering::Less,
                    _ => oa.cmp(ob),
                })
        });
        (kept.into_iter().map(|(_, e)| e).collect(), conflicts)
    }

    /// Apply all valid edits to a copy of the unit.
    #[must_use]
    pub fn apply(self) -> Applied {
        let (kept, mut conflicts) = self.validate();
        let mut unit = self.unit.clone();
        let mut applied = Vec::with_capacity(kept.len());
        for edit in kept {
            match apply_one(&mut unit.root, &edit) {
                Ok(()) => applied.push(edit),
                Err(reason) => {
                    tracing::trace!(target = %edit.target, %reason, "edit not applicable");
                    conflicts.push(Conflict { edit, reason });
                }
            }
        }
        Applied {
            unit,
            applied,
            conflicts,
        }
    }
}

/// Applies `edits` to a copy of `unit`.
#[must_use]
pub fn apply(unit: &SourceUnit, edits: Vec<RewriteEdit>) -> Applied {
    let mut rewriter = TreeRewriter::new(unit);
    rewriter.add_edits(edits);
    rewriter.apply()
}

fn apply_one(root: &mut Node, edit: &RewriteEdit) -> Result<(), ConflictReason> {
    let node = root
        .get_mut(&edit.target)
        .ok_or(ConflictReason::MissingTarget)?;
    match &edit.op {
        EditOp::Replace(replacement) => {
            *node = replacement.clone();
        }
        EditOp::Rename(name) => {
            if !node.set_name(name) {
                return Err(ConflictReason::InvalidOp);
            }
        }
        EditOp::Hoist(index) => {
            if *index >= node.children.len() {
                return Err(ConflictReason::InvalidOp);
            }
            let child = node.children.swap_remove(*index);
            *node = child;
        }
        EditOp::InsertChild { index, node: child } => {
            if *index > node.children.len() {
                return Err(ConflictReason::InvalidOp);
            }
            node.children.insert(*index, child.clone());
        }
    }
    Ok(())
}
