//! End-to-end rewrites of small units through the engine.
#![allow(clippy::unwrap_used)]

use recast::engine::Engine;
use recast::rules::{DiagnosticKind, Rule, SkipReason};
use recast::tree::build::*;
use recast::tree::printer::render_unit;
use recast::tree::{Modifier, NodeKind, SourceUnit};

fn literal_unit(stmts: Vec<recast::tree::Node>) -> SourceUnit {
    unit(
        "TestClass",
        vec![class(
            "TestClass",
            &[Modifier::Public],
            vec![method("test", "void", &[Modifier::Public], vec![], stmts)],
        )],
    )
}

fn field_names(unit: &SourceUnit) -> Vec<String> {
    unit.root.children[0]
        .children
        .iter()
        .filter(|m| matches!(m.kind, NodeKind::Field { .. }))
        .filter_map(|m| m.name().map(str::to_owned))
        .collect()
}

#[test]
fn test_duplicate_literals_become_constants() {
    let unit = literal_unit(vec![
        local("a", "String", Some(string("foo"))),
        local("b", "String", Some(string("foo"))),
        local("c", "String", Some(string("fooBar"))),
        local("d", "String", Some(string("fooBar"))),
    ]);
    let outcome = Engine::default()
        .with_rules(&[Rule::LiteralConsolidation])
        .process(&unit);

    assert_eq!(outcome.diagnostics.len(), 2);
    assert!(outcome
        .diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::LiteralExtracted));

    let rewritten = outcome.unit.unwrap();
    assert_eq!(field_names(&rewritten), vec!["FOO", "FOO_BAR"]);
    let text = render_unit(&rewritten);
    assert!(text.contains("private static final String FOO = \"foo\";"));
    assert!(text.contains("private static final String FOO_BAR = \"fooBar\";"));
    assert!(text.contains("String a = FOO;"));
    assert!(text.contains("String b = FOO;"));
    assert!(text.contains("String c = FOO_BAR;"));
    assert!(text.contains("String d = FOO_BAR;"));
}

#[test]
fn test_private_method_and_its_call_site_are_renamed() {
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
    let outcome = Engine::default().process(&unit);
    let rewritten = outcome.unit.unwrap();
    let text = render_unit(&rewritten);
    assert!(text.contains("public String foo_foo() {"));
    assert!(text.contains("return barBar();"));
    assert!(text.contains("private String barBar() {"));
    assert!(text.contains("return \"bar_bar\";"));
}

#[test]
fn test_existing_field_blocks_extraction() {
    let unit = unit(
        "TestClass",
        vec![class(
            "TestClass",
            &[Modifier::Public],
            vec![
                field("FOO", "int", &[Modifier::Private], Some(lit("1"))),
                method(
                    "test",
                    "void",
                    &[Modifier::Public],
                    vec![],
                    vec![
                        local("a", "String", Some(string("foo"))),
                        local("b", "String", Some(string("foo"))),
                    ],
                ),
            ],
        )],
    );
    let outcome = Engine::default().process(&unit);
    assert!(outcome.unit.is_none());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].reason,
        Some(SkipReason::NameCollision)
    );
}

#[test]
fn test_single_literal_is_left_alone() {
    let unit = literal_unit(vec![
        local("a", "String", Some(string("foo"))),
        local("b", "String", Some(string("bar"))),
    ]);
    let outcome = Engine::default().process(&unit);
    assert!(outcome.unit.is_none());
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn test_literal_extraction_and_case_simplification_combine() {
    let comparison = || {
        method_call(
            method_call(name("code"), "toUpperCase", vec![]),
            "equals",
            vec![string("404")],
        )
    };
    let unit = literal_unit(vec![
        local("a", "boolean", Some(comparison())),
        local("b", "boolean", Some(comparison())),
    ]);
    let outcome = Engine::default().process(&unit);
    let kinds: Vec<_> = outcome.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::LiteralExtracted,
            DiagnosticKind::CaseComparisonSimplified,
            DiagnosticKind::CaseComparisonSimplified,
        ]
    );

    let rewritten = outcome.unit.unwrap();
    assert_eq!(field_names(&rewritten), vec!["_404"]);
    let text = render_unit(&rewritten);
    assert!(text.contains("boolean a = code.equalsIgnoreCase(_404);"));
    assert!(text.contains("boolean b = code.equalsIgnoreCase(_404);"));
}

#[test]
fn test_case_comparison_against_cased_literal_is_kept() {
    let unit = unit(
        "Street",
        vec![class(
            "Street",
            &[Modifier::Public],
            vec![
                method(
                    "m",
                    "boolean",
                    &[Modifier::Public],
                    vec![param("x", "String")],
                    vec![ret(Some(method_call(
                        method_call(name("x"), "toUpperCase", vec![]),
                        "equals",
                        vec![string("SS")],
                    )))],
                ),
                method(
                    "same",
                    "boolean",
                    &[Modifier::Public],
                    vec![param("a", "String"), param("b", "String")],
                    vec![ret(Some(method_call(
                        method_call(name("a"), "toUpperCase", vec![]),
                        "equals",
                        vec![method_call(name("b"), "toUpperCase", vec![])],
                    )))],
                ),
            ],
        )],
    );
    let outcome = Engine::default().process(&unit);
    assert!(outcome.unit.is_none());
    assert!(outcome.diagnostics.is_empty());
    let text = render_unit(&unit);
    assert!(text.contains("return x.toUpperCase().equals(\"SS\");"));
    assert!(text.contains("return a.toUpperCase().equals(b.toUpperCase());"));
}

#[test]
fn test_constant_declared_after_static_initializer_is_not_reused() {
    let unit = unit(
        "Greeter",
        vec![class(
            "Greeter",
            &[Modifier::Public],
            vec![
                field(
                    "greeting",
                    "String",
                    &[Modifier::Private, Modifier::Static],
                    Some(string("hello")),
                ),
                field(
                    "GREETING",
                    "String",
                    &[Modifier::Private, Modifier::Static, Modifier::Final],
                    Some(string("hello")),
                ),
                method(
                    "greet",
                    "void",
                    &[Modifier::Public],
                    vec![],
                    vec![expr_stmt(call("say", vec![string("hello")]))],
                ),
            ],
        )],
    );
    let outcome = Engine::default().process(&unit);
    assert!(outcome.unit.is_none());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].reason,
        Some(SkipReason::AmbiguousVisibility)
    );
}

#[test]
fn test_empty_catch_and_case_comparison() {
    let unit = unit(
        "Handler",
        vec![class(
            "Handler",
            &[Modifier::Public],
            vec![method(
                "check",
                "boolean",
                &[Modifier::Public],
                vec![param("input", "String")],
                vec![
                    try_stmt(
                        vec![expr_stmt(call("load", vec![name("input")]))],
                        vec![
                            catch("e", "IOException", vec![]),
                            catch("ex", "RuntimeException", vec![throw(name("ex"))]),
                        ],
                    ),
                    ret(Some(method_call(
                        method_call(name("input"), "toUpperCase", vec![]),
                        "equals",
                        vec![string("--")],
                    ))),
                ],
            )],
        )],
    );
    let outcome = Engine::default().process(&unit);
    let text = render_unit(&outcome.unit.unwrap());
    assert!(text.contains("e.printStackTrace();"));
    assert!(!text.contains("ex.printStackTrace();"));
    assert!(text.contains("return input.equalsIgnoreCase(\"--\");"));
}
