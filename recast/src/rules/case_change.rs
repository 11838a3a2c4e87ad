//! `x.toUpperCase().equals(y)` and friends become `x.equalsIgnoreCase(y)`.
//!
//! `equalsIgnoreCase` folds one character at a time, while `toUpperCase` and
//! `toLowerCase` follow the default locale and may change length (`"ß"`
//! uppercases to `"SS"`). The two only agree for every `x` when the other
//! operand is an ASCII literal without letters, so that is the only form
//! rewritten. Comparisons against cased literals, or with both sides
//! normalized, are left as written.

use super::{Diagnostic, DiagnosticKind, Location, Rule, RulePlan};
use crate::config::RecastConfig;
use crate::fix::{EditOp, RewriteEdit};
use crate::scope::ScopeTree;
use crate::tree::printer::render_expr;
use crate::tree::{Node, NodeKind, NodePath, SourceUnit};

const RULE: Rule = Rule::RedundantCaseNormalization;

/// `x.toUpperCase()` / `x.toLowerCase()` with no arguments.
fn is_normalization(node: &Node) -> bool {
    matches!(
        &node.kind,
        NodeKind::Call { name, has_receiver: true }
            if node.children.len() == 1
                && matches!(name.as_str(), "toUpperCase" | "toLowerCase")
    )
}

/// A string literal no case mapping can touch.
fn is_caseless_literal(node: &Node) -> bool {
    node.string_value()
        .is_some_and(|value| value.is_ascii() && !value.bytes().any(|b| b.is_ascii_alphabetic()))
}

/// The normalization calls to unwrap (as child indices of the `equals`
/// call) when the comparison can ignore case instead.
fn removable(call: &Node) -> Option<Vec<usize>> {
    let NodeKind::Call {
        name,
        has_receiver: true,
    } = &call.kind
    else {
        return None;
    };
    let [receiver, argument] = call.children.as_slice() else {
        return None;
    };
    if name.as_str() != "equals" {
        return None;
    }
    if is_normalization(receiver) && is_caseless_literal(argument) {
        Some(vec![0])
    } else if is_normalization(argument) && is_caseless_literal(receiver) {
        Some(vec![1])
    } else {
        None
    }
}

/// Plans case-comparison simplification for one unit.
#[must_use]
pub fn plan(unit: &SourceUnit, _scopes: &ScopeTree, _config: &RecastConfig) -> RulePlan {
    let mut plan = RulePlan::default();
    unit.root.walk(&mut |path: &NodePath, node, _| {
        let Some(unwrapped) = removable(node) else {
            return;
        };
        let change = plan.diagnostics.len();
        let before = render_expr(node);
        plan.edits.push(
            RewriteEdit::new(
                path.clone(),
                EditOp::Rename("equalsIgnoreCase".to_owned()),
                RULE.id(),
            )
            .with_group(change)
            .with_description(before.clone()),
        );
        for index in unwrapped {
            plan.edits
                .push(RewriteEdit::new(path.child(index), EditOp::Hoist(0), RULE.id()).with_group(change));
        }
        tracing::debug!(%path, expr = %before, "case comparison simplified");
        plan.diagnostics.push(Diagnostic::new(
            RULE,
            DiagnosticKind::CaseComparisonSimplified,
            Location::of(unit, path),
            format!("{before} compares case-insensitively"),
        ));
    });
    plan
}
