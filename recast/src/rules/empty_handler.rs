//! Empty exception handler recovery.
//!
//! A `catch` whose block has no statements gets a call of the configured
//! recovery method on its parameter, `e.printStackTrace()` by default.

use super::{Diagnostic, DiagnosticKind, Location, Rule, RulePlan};
use crate::config::RecastConfig;
use crate::fix::{EditOp, RewriteEdit};
use crate::scope::ScopeTree;
use crate::tree::build::{expr_stmt, method_call, name};
use crate::tree::{NodeKind, SourceUnit};

const RULE: Rule = Rule::EmptyHandlerRecovery;

/// Adds `<param>.<recovery_method>();` to every empty `catch` block.
#[must_use]
pub fn plan(unit: &SourceUnit, _scopes: &ScopeTree, config: &RecastConfig) -> RulePlan {
    let mut plan = RulePlan::default();
    let method = config.recovery_method();

    unit.root.walk(&mut |path, node, _| {
        let NodeKind::Catch { param, .. } = &node.kind else {
            return;
        };
        let Some(block) = node.children.first() else {
            return;
        };
        if !matches!(block.kind, NodeKind::Block) || !block.children.is_empty() {
            return;
        }
        let change = plan.diagnostics.len();
        let statement = expr_stmt(method_call(name(param), method, vec![]));
        plan.edits.push(
            RewriteEdit::new(
                path.child(0),
                EditOp::InsertChild {
                    index: 0,
                    node: statement,
                },
                RULE.id(),
            )
            .with_group(change)
            .with_description(format!("{param}.{method}()")),
        );
        tracing::debug!(%path, "recovery inserted into empty catch");
        plan.diagnostics.push(Diagnostic::new(
            RULE,
            DiagnosticKind::RecoveryInserted,
            Location::of(unit, path),
            format!("empty catch block now calls {param}.{method}()"),
        ));
    });
    plan
}
