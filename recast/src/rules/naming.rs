//! snake_case to camelCase for non-public methods and fields.

use super::{Diagnostic, DiagnosticKind, Location, Rule, RulePlan, SkipReason};
use crate::config::RecastConfig;
use crate::constants::get_snake_case_re;
use crate::fix::{EditOp, RewriteEdit};
use crate::scope::{ScopeId, ScopeKind, ScopeTree, Symbol, SymbolKind, Visibility};
use crate::tree::SourceUnit;

const RULE: Rule = Rule::IdentifierNormalization;

/// `bar_bar` -> `barBar`, `load_v2_data` -> `loadV2Data`.
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('_').filter(|s| !s.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(&segment.to_ascii_lowercase());
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Scopes that would see both names if both were declared: lexically nested
/// scopes, and the scopes of types related by inheritance inside the unit.
fn scopes_interfere(scopes: &ScopeTree, a: ScopeId, b: ScopeId) -> bool {
    if scopes.are_related(a, b) {
        return true;
    }
    let is_type = |id: ScopeId| scopes.scope(id).kind == ScopeKind::Type;
    is_type(a) && is_type(b) && {
        scopes.type_ancestors(a).contains(&b) || scopes.type_ancestors(b).contains(&a)
    }
}

/// Why a symbol may not be renamed, if it may not.
fn check(
    scopes: &ScopeTree,
    symbol: &Symbol,
    new_name: &str,
    claimed: &[(ScopeId, String)],
) -> Option<(SkipReason, &'static str)> {
    if symbol.ambiguous {
        return Some((
            SkipReason::AmbiguousVisibility,
            "may override an inherited member",
        ));
    }
    if scopes.is_duplicated(symbol.id) {
        return Some((
            SkipReason::AmbiguousVisibility,
            "is declared more than once in its scope",
        ));
    }
    if !scopes.unresolved(&symbol.name).is_empty() {
        return Some((
            SkipReason::AmbiguousVisibility,
            "has uses that could not be bound",
        ));
    }
    let scope = symbol.declaring_scope;
    // A private method may not reuse the signature of an inherited one.
    if symbol.kind == SymbolKind::Method && scopes.is_opaque(scope) {
        return Some((
            SkipReason::NameCollision,
            "belongs to a type with an external supertype",
        ));
    }
    if !scopes.is_name_free(scope, new_name) || !scopes.is_name_free_below(scope, new_name) {
        return Some((SkipReason::NameCollision, "new name is already in use"));
    }
    if claimed
        .iter()
        .any(|(other, name)| name == new_name && scopes_interfere(scopes, *other, scope))
    {
        return Some((
            SkipReason::NameCollision,
            "new name was already taken by another rename",
        ));
    }
    None
}

/// Plans identifier normalization for one unit.
#[must_use]
pub fn plan(unit: &SourceUnit, scopes: &ScopeTree, _config: &RecastConfig) -> RulePlan {
    let mut plan = RulePlan::default();
    let snake_case = get_snake_case_re();
    let mut claimed: Vec<(ScopeId, String)> = Vec::new();

    for symbol in scopes.symbols() {
        if !matches!(symbol.kind, SymbolKind::Method | SymbolKind::Field)
            || !snake_case.is_match(&symbol.name)
        {
            continue;
        }
        if symbol.visibility == Visibility::Public && !symbol.ambiguous {
            tracing::trace!(name = %symbol.name, "public member left as is");
            continue;
        }
        let new_name = to_camel_case(&symbol.name);
        let location = Location::of(unit, &symbol.declaration);

        if let Some((reason, why)) = check(scopes, symbol, &new_name, &claimed) {
            tracing::trace!(name = %symbol.name, %new_name, %reason, "rename skipped");
            plan.diagnostics.push(Diagnostic::skipped(
                RULE,
                reason,
                location,
                format!("{} not renamed to {new_name}: {why}", symbol.name),
            ));
            continue;
        }

        let change = plan.diagnostics.len();
        let references = scopes.references(symbol.id);
        tracing::debug!(
            name = %symbol.name,
            %new_name,
            references = references.len(),
            "member renamed"
        );
        plan.edits.push(
            RewriteEdit::new(
                symbol.declaration.clone(),
                EditOp::Rename(new_name.clone()),
                RULE.id(),
            )
            .with_group(change)
            .with_description(format!("rename {} to {new_name}", symbol.name)),
        );
        plan.edits.extend(references.iter().map(|path| {
            RewriteEdit::new(path.clone(), EditOp::Rename(new_name.clone()), RULE.id())
                .with_group(change)
        }));
        let noun = if references.len() == 1 {
            "reference"
        } else {
            "references"
        };
        plan.diagnostics.push(Diagnostic::new(
            RULE,
            DiagnosticKind::IdentifierRenamed,
            location,
            format!(
                "{} renamed to {new_name} ({} {noun})",
                symbol.name,
                references.len()
            ),
        ));
        claimed.push((symbol.declaring_scope, new_name));
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fix::apply;
    use crate::scope::resolve;
    use crate::tree::build::*;
    use crate::tree::{Modifier, NodePath};

    fn run(unit: &SourceUnit) -> RulePlan {
        plan(unit, &resolve(unit), &RecastConfig::default())
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("bar_bar"), "barBar");
        assert_eq!(to_camel_case("load_v2_data"), "loadV2Data");
        assert_eq!(to_camel_case("a_b_c"), "aBC");
        assert_eq!(to_camel_case("x_1"), "x1");
    }

    #[test]
    fn test_private_method_and_call_site_renamed() {
        let unit = unit(
            "TestClass",
            vec![class(
                "TestClass",
                &[Modifier::Public],
                vec![
                    method(
                        "foo_foo",
                        "String",
                        &[Modifier::Public],
                        vec![],
                        vec![ret(Some(call("bar_bar", vec![])))],
                    ),
                    method(
                        "bar_bar",
                        "String",
                        &[Modifier::Private],
                        vec![],
                        vec![ret(Some(string("bar_bar")))],
                    ),
                ],
            )],
        );
        let plan = run(&unit);
        assert_eq!(plan.edits.len(), 2);
        assert_eq!(plan.diagnostics.len(), 1);
        assert_eq!(plan.diagnostics[0].kind, DiagnosticKind::IdentifierRenamed);

        let applied = apply(&unit, plan.edits);
        let class = &applied.unit.root.children[0];
        assert_eq!(class.children[0].name(), Some("foo_foo"));
        assert_eq!(class.children[1].name(), Some("barBar"));
        let call = applied
            .unit
            .get(&NodePath::from_indices(&[0, 0, 0, 0, 0]))
            .unwrap();
        assert_eq!(call.name(), Some("barBar"));
        // The string literal with the same text is not a reference.
        let text = applied
            .unit
            .get(&NodePath::from_indices(&[0, 1, 0, 0, 0]))
            .unwrap();
        assert_eq!(text.string_value(), Some("bar_bar"));
    }

    #[test]
    fn test_collision_with_existing_member() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("max_size", "int", &[Modifier::Private], None),
                    field("maxSize", "int", &[Modifier::Private], None),
                ],
            )],
        );
        let plan = run(&unit);
        assert!(plan.edits.is_empty());
        assert_eq!(plan.diagnostics[0].reason, Some(SkipReason::NameCollision));
    }

    #[test]
    fn test_two_renames_claiming_one_name() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("a_b", "int", &[Modifier::Private], None),
                    method("a__b", "void", &[Modifier::Private], vec![], vec![]),
                    method("a_b_", "void", &[Modifier::Private], vec![], vec![]),
                ],
            )],
        );
        // Only `a_b` matches the pattern; the others are not plain snake case.
        let plan = run(&unit);
        assert_eq!(plan.diagnostics.len(), 1);

        let unit = unit_with_nested_claim();
        let plan = run(&unit);
        let skipped: Vec<_> = plan.diagnostics.iter().filter(|d| d.is_skip()).collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].reason, Some(SkipReason::NameCollision));
    }

    fn unit_with_nested_claim() -> SourceUnit {
        unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("item_count", "int", &[Modifier::Private], None),
                    class(
                        "Inner",
                        &[Modifier::Private],
                        vec![method("item_count", "int", &[Modifier::Private], vec![], vec![])],
                    ),
                ],
            )],
        )
    }

    #[test]
    fn test_unresolved_use_makes_visibility_ambiguous() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("row_count", "int", &[Modifier::Private], None),
                    method(
                        "m",
                        "int",
                        &[],
                        vec![param("other", "T")],
                        vec![ret(Some(field_access(name("other"), "row_count")))],
                    ),
                ],
            )],
        );
        let plan = run(&unit);
        assert!(plan.edits.is_empty());
        assert_eq!(
            plan.diagnostics[0].reason,
            Some(SkipReason::AmbiguousVisibility)
        );
    }

    #[test]
    fn test_public_members_are_never_renamed() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[Modifier::Public],
                vec![
                    method("do_work", "void", &[Modifier::Public], vec![], vec![]),
                    method("do_more", "void", &[], vec![], vec![]),
                    field("some_state", "int", &[Modifier::Protected], None),
                ],
            )],
        );
        let plan = run(&unit);
        assert!(plan.edits.is_empty());
        assert!(plan.diagnostics.is_empty());
    }

    #[test]
    fn test_override_candidate_in_private_type_is_skipped() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![subclass(
                    "Job",
                    &[Modifier::Private],
                    "Base",
                    vec![method("run_job", "void", &[], vec![], vec![])],
                )],
            )],
        );
        let plan = run(&unit);
        assert!(plan.edits.is_empty());
        assert_eq!(
            plan.diagnostics[0].reason,
            Some(SkipReason::AmbiguousVisibility)
        );
    }

    #[test]
    fn test_this_qualified_field_renamed() {
        let unit = unit(
            "T",
            vec![class(
                "T",
                &[],
                vec![
                    field("row_count", "int", &[Modifier::Private], None),
                    method(
                        "reset",
                        "void",
                        &[],
                        vec![],
                        vec![expr_stmt(assign(
                            field_access(this(), "row_count"),
                            lit("0"),
                        ))],
                    ),
                ],
            )],
        );
        let plan = run(&unit);
        assert_eq!(plan.edits.len(), 2);
        let applied = apply(&unit, plan.edits);
        let target = applied
            .unit
            .get(&NodePath::from_indices(&[0, 1, 0, 0, 0, 0]))
            .unwrap();
        assert_eq!(target.name(), Some("rowCount"));
    }
}
