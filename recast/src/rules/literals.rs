//! Duplicate string literal consolidation.
//!
//! Every string literal of the primary type that occurs at least
//! `min_duplicates` times is replaced by a reference to a
//! `private static final String` constant declared at the top of that type.
//! An existing private constant with the same value is reused instead.

use super::{Diagnostic, DiagnosticKind, Location, Rule, RulePlan, SkipReason};
use crate::config::RecastConfig;
use crate::fix::{EditOp, RewriteEdit};
use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::tree::build;
use crate::tree::{Modifier, Node, NodeKind, NodePath, SourceUnit};
use rustc_hash::FxHashMap;

const RULE: Rule = Rule::LiteralConsolidation;

/// A string literal in an eligible position.
#[derive(Debug, Clone)]
pub struct LiteralOccurrence {
    /// Path of the literal node.
    pub path: NodePath,
    /// Innermost scope around the literal.
    pub enclosing_scope: ScopeId,
}

/// All eligible occurrences of one value.
#[derive(Debug, Clone)]
pub struct LiteralGroup {
    /// Exact literal value.
    pub value: String,
    /// Occurrences in order of first appearance.
    pub occurrences: Vec<LiteralOccurrence>,
}

/// Collects eligible literal occurrences under `primary` and groups them by
/// value, in order of first appearance.
#[must_use]
pub fn collect_groups(
    unit: &SourceUnit,
    primary: &NodePath,
    scopes: &ScopeTree,
    config: &RecastConfig,
) -> Vec<LiteralGroup> {
    let Some(primary_node) = unit.get(primary) else {
        return Vec::new();
    };
    let mut groups: Vec<LiteralGroup> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    primary_node.walk(&mut |relative, node, parent| {
        let NodeKind::StringLit { value } = &node.kind else {
            return;
        };
        if !is_eligible(relative, parent, config) {
            return;
        }
        let path = NodePath::from_indices(
            &[primary.indices(), relative.indices()].concat(),
        );
        let occurrence = LiteralOccurrence {
            enclosing_scope: scopes.innermost_scope(&path),
            path,
        };
        match index.get(value.as_str()) {
            Some(&i) => groups[i].occurrences.push(occurrence),
            None => {
                index.insert(value.as_str(), groups.len());
                groups.push(LiteralGroup {
                    value: value.clone(),
                    occurrences: vec![occurrence],
                });
            }
        }
    });
    groups
}

/// Format patterns and existing constant definitions are left alone.
fn is_eligible(path: &NodePath, parent: Option<&Node>, config: &RecastConfig) -> bool {
    let Some(parent) = parent else {
        return true;
    };
    let position = path.last().unwrap_or(0);
    match &parent.kind {
        NodeKind::Call { name, .. } => {
            let (first_arg, args) = parent.call_args();
            !(position == first_arg && !args.is_empty() && config.is_format_call(name))
        }
        NodeKind::Field { .. } => {
            !(parent.has_modifier(Modifier::Static) && parent.has_modifier(Modifier::Final))
        }
        _ => true,
    }
}

/// Derives a constant name from a literal value: `_` at lower-to-upper case
/// boundaries and between runs of other characters, uppercased. Returns an
/// empty string when the value has no ASCII letters or digits.
#[must_use]
pub fn constant_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut separator = false;
    let mut prev_lower = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if !out.is_empty() && (separator || (prev_lower && c.is_ascii_uppercase())) {
                out.push('_');
            }
            out.push(c.to_ascii_uppercase());
            separator = false;
            prev_lower = c.is_ascii_lowercase();
        } else {
            separator = true;
            prev_lower = false;
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// An existing `private static final` field of the primary type holding
/// exactly `value`, with its member index.
fn existing_constant<'u>(primary: &'u Node, value: &str) -> Option<(usize, &'u str)> {
    primary.children.iter().enumerate().find_map(|(index, member)| {
        let is_constant = matches!(member.kind, NodeKind::Field { .. })
            && member.has_modifier(Modifier::Private)
            && member.has_modifier(Modifier::Static)
            && member.has_modifier(Modifier::Final);
        let init = member.children.first()?;
        (is_constant && init.string_value() == Some(value))
            .then(|| member.name().map(|name| (index, name)))?
    })
}

/// Whether `occurrence` sits in the initializer of a static field of the
/// primary type declared before member `declared_at`. A simple-name
/// reference there is an illegal forward reference.
fn is_forward_reference(
    primary_node: &Node,
    primary: &NodePath,
    occurrence: &NodePath,
    declared_at: usize,
) -> bool {
    let Some(member) = occurrence
        .indices()
        .get(primary.indices().len())
        .map(|&i| i as usize)
    else {
        return false;
    };
    member < declared_at
        && primary_node.children.get(member).is_some_and(|m| {
            matches!(m.kind, NodeKind::Field { .. }) && m.has_modifier(Modifier::Static)
        })
}

/// Whether a declaration between `from` and the type scope `to` (exclusive)
/// would capture a reference to `name` written at `from`.
fn is_shadowed_between(scopes: &ScopeTree, from: ScopeId, to: ScopeId, name: &str) -> bool {
    let mut current = Some(from);
    while let Some(id) = current {
        if id == to {
            return false;
        }
        let scope = scopes.scope(id);
        if scope.declares(name) {
            return true;
        }
        if scope.kind == ScopeKind::Type
            && scopes
                .type_ancestors(id)
                .into_iter()
                .any(|a| scopes.scope(a).declares(name))
        {
            return true;
        }
        current = scope.parent;
    }
    true
}

enum Resolution {
    Reuse(String),
    Declare(String),
    Collision(String),
    ForwardReference(String),
}

/// Plans literal consolidation for one unit.
#[must_use]
pub fn plan(unit: &SourceUnit, scopes: &ScopeTree, config: &RecastConfig) -> RulePlan {
    let mut plan = RulePlan::default();
    let Some(primary) = unit.primary_type_path() else {
        return plan;
    };
    let (Some(primary_node), Some(primary_scope)) = (unit.get(&primary), scopes.scope_of(&primary))
    else {
        return plan;
    };

    let groups: Vec<LiteralGroup> = collect_groups(unit, &primary, scopes, config)
        .into_iter()
        .filter(|g| g.occurrences.len() >= config.min_duplicates())
        .collect();

    let mut resolutions: Vec<Resolution> = groups
        .iter()
        .enumerate()
        .map(|(n, group)| {
            if let Some((declared_at, existing)) = existing_constant(primary_node, &group.value) {
                let shadowed = group.occurrences.iter().any(|o| {
                    scopes.has_opaque_type_between(o.enclosing_scope, primary_scope)
                        || is_shadowed_between(scopes, o.enclosing_scope, primary_scope, existing)
                });
                let forward = group
                    .occurrences
                    .iter()
                    .any(|o| is_forward_reference(primary_node, &primary, &o.path, declared_at));
                return if shadowed {
                    Resolution::Collision(existing.to_owned())
                } else if forward {
                    Resolution::ForwardReference(existing.to_owned())
                } else {
                    Resolution::Reuse(existing.to_owned())
                };
            }
            let mut candidate = constant_name(&group.value);
            if candidate.is_empty() {
                candidate = format!("LITERAL_{}", n + 1);
            }
            let free = scopes.is_name_free(primary_scope, &candidate)
                && scopes.is_name_free_below(primary_scope, &candidate)
                && !group
                    .occurrences
                    .iter()
                    .any(|o| scopes.has_opaque_type_between(o.enclosing_scope, primary_scope));
            if free {
                Resolution::Declare(candidate)
            } else {
                Resolution::Collision(candidate)
            }
        })
        .collect();

    // Two values mapping to one name: neither wins.
    let mut declared: FxHashMap<String, usize> = FxHashMap::default();
    for resolution in &resolutions {
        if let Resolution::Declare(name) = resolution {
            *declared.entry(name.clone()).or_default() += 1;
        }
    }
    for resolution in &mut resolutions {
        if let Resolution::Declare(name) = resolution {
            if declared.get(name.as_str()).copied().unwrap_or(0) > 1 {
                *resolution = Resolution::Collision(std::mem::take(name));
            }
        }
    }

    for (group, resolution) in groups.iter().zip(resolutions) {
        let change = plan.diagnostics.len();
        let first = &group.occurrences[0].path;
        let location = Location::of(unit, first);
        let count = group.occurrences.len();
        let name = match resolution {
            Resolution::Collision(name) => {
                tracing::trace!(value = %group.value, %name, "literal group deferred");
                plan.diagnostics.push(Diagnostic::skipped(
                    RULE,
                    SkipReason::NameCollision,
                    location,
                    format!(
                        "{count} occurrences of {:?} not extracted: {name} is already in use",
                        group.value
                    ),
                ));
                continue;
            }
            Resolution::ForwardReference(name) => {
                tracing::trace!(value = %group.value, %name, "literal group deferred");
                plan.diagnostics.push(Diagnostic::skipped(
                    RULE,
                    SkipReason::AmbiguousVisibility,
                    location,
                    format!(
                        "{count} occurrences of {:?} not extracted: {name} is declared after a static initializer using it",
                        group.value
                    ),
                ));
                continue;
            }
            Resolution::Reuse(name) => {
                plan.diagnostics.push(Diagnostic::new(
                    RULE,
                    DiagnosticKind::LiteralExtracted,
                    location,
                    format!(
                        "{count} occurrences of {:?} replaced by existing constant {name}",
                        group.value
                    ),
                ));
                name
            }
            Resolution::Declare(name) => {
                let declaration = build::field(
                    &name,
                    "String",
                    &[Modifier::Private, Modifier::Static, Modifier::Final],
                    Some(build::string(&group.value)),
                );
                plan.edits.push(
                    RewriteEdit::new(
                        primary.clone(),
                        EditOp::InsertChild {
                            index: 0,
                            node: declaration,
                        },
                        RULE.id(),
                    )
                    .with_group(change)
                    .with_description(format!("declare {name}")),
                );
                plan.diagnostics.push(Diagnostic::new(
                    RULE,
                    DiagnosticKind::LiteralExtracted,
                    location,
                    format!(
                        "{count} occurrences of {:?} extracted into {name}",
                        group.value
                    ),
                ));
                name
            }
        };
        tracing::debug!(value = %group.value, %name, count, "literal group extracted");
        for occurrence in &group.occurrences {
            let mut reference = build::name(&name);
            reference.span = unit.get(&occurrence.path).and_then(|n| n.span);
            plan.edits.push(
                RewriteEdit::new(
                    occurrence.path.clone(),
                    EditOp::Replace(reference),
                    RULE.id(),
                )
                .with_group(change),
            );
        }
    }
    plan
}
