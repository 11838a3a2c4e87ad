//! Shared rewrite plan builder.
//!
//! Every rule expresses its changes as path-addressed [`RewriteEdit`]s. The
//! [`TreeRewriter`] merges them, drops overlapping ones and applies the rest
//! deepest-first to a copy of the tree, so paths computed against the
//! original tree stay valid while the plan is applied.

mod rewriter;

pub use rewriter::{apply, Applied, Conflict, ConflictReason, EditOp, RewriteEdit, TreeRewriter};
