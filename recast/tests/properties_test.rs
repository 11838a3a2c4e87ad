//! Properties every run must keep, checked over a small corpus of units.
#![allow(clippy::unwrap_used)]

use recast::config::RecastConfig;
use recast::engine::Engine;
use recast::rules::{DiagnosticKind, SkipReason};
use recast::scope::{self, SymbolKind, Visibility};
use recast::tree::build::*;
use recast::tree::{Modifier, SourceUnit};

fn corpus() -> Vec<SourceUnit> {
    vec![
        unit(
            "Service",
            vec![class(
                "Service",
                &[Modifier::Public],
                vec![
                    field("retry_count", "int", &[Modifier::Private], Some(lit("3"))),
                    field("max_wait", "int", &[Modifier::Public], Some(lit("10"))),
                    method(
                        "run_once",
                        "void",
                        &[Modifier::Public],
                        vec![param("job_name", "String")],
                        vec![
                            expr_stmt(call("log_start", vec![string("starting job")])),
                            expr_stmt(method_call(
                                name("logger"),
                                "info",
                                vec![string("job {}"), name("job_name")],
                            )),
                            expr_stmt(method_call(
                                name("logger"),
                                "info",
                                vec![string("job {}"), string("starting job")],
                            )),
                            try_stmt(
                                vec![expr_stmt(call("execute", vec![name("job_name")]))],
                                vec![catch("e", "Exception", vec![])],
                            ),
                        ],
                    ),
                    method(
                        "log_start",
                        "void",
                        &[Modifier::Private],
                        vec![param("message", "String")],
                        vec![expr_stmt(assign(
                            field_access(this(), "retry_count"),
                            binary("+", name("retry_count"), lit("1")),
                        ))],
                    ),
                ],
            )],
        ),
        unit(
            "Shapes",
            vec![class(
                "Shapes",
                &[Modifier::Public],
                vec![
                    method(
                        "area_of",
                        "double",
                        &[Modifier::Protected],
                        vec![param("kind", "String")],
                        vec![if_stmt(
                            method_call(
                                method_call(name("kind"), "toLowerCase", vec![]),
                                "equals",
                                vec![string("circle")],
                            ),
                            ret(Some(lit("3.14"))),
                            Some(ret(Some(lit("1.0")))),
                        )],
                    ),
                    class(
                        "Helper",
                        &[Modifier::Private],
                        vec![method("compute_all", "void", &[], vec![], vec![])],
                    ),
                    subclass(
                        "Circle",
                        &[Modifier::Private],
                        "Shape",
                        vec![method("draw_now", "void", &[], vec![], vec![])],
                    ),
                ],
            )],
        ),
        unit(
            "Clash",
            vec![class(
                "Clash",
                &[],
                vec![
                    field("itemCount", "int", &[Modifier::Private], None),
                    field("item_count", "int", &[Modifier::Private], None),
                    method(
                        "items",
                        "void",
                        &[Modifier::Private],
                        vec![],
                        vec![
                            local("a", "String", Some(string("x"))),
                            local("b", "String", Some(string("x"))),
                        ],
                    ),
                    method(
                        "X",
                        "void",
                        &[Modifier::Private],
                        vec![],
                        vec![],
                    ),
                ],
            )],
        ),
    ]
}

fn public_names(unit: &SourceUnit) -> Vec<String> {
    let scopes = scope::resolve(unit);
    let mut names: Vec<String> = scopes
        .symbols()
        .iter()
        .filter(|s| s.visibility == Visibility::Public)
        .filter(|s| matches!(s.kind, SymbolKind::Method | SymbolKind::Field))
        .map(|s| s.name.to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_second_run_makes_no_edits() {
    let engine = Engine::default();
    for unit in corpus() {
        let first = engine.process(&unit);
        let current = first.unit.unwrap_or(unit);
        let second = engine.process(&current);
        assert!(second.unit.is_none(), "{} changed twice", current.name);
        assert!(
            second.diagnostics.iter().all(|d| d.is_skip()),
            "{} still has work: {:?}",
            current.name,
            second.diagnostics
        );
    }
}

#[test]
fn test_no_new_duplicate_declarations() {
    let engine = Engine::default();
    for unit in corpus() {
        let before = scope::resolve(&unit).anomalies().len();
        if let Some(rewritten) = engine.process(&unit).unit {
            let after = scope::resolve(&rewritten).anomalies().len();
            assert!(after <= before, "{} gained anomalies", unit.name);
        }
    }
}

#[test]
fn test_public_names_are_preserved() {
    let engine = Engine::default();
    for unit in corpus() {
        let before = public_names(&unit);
        if let Some(rewritten) = engine.process(&unit).unit {
            assert_eq!(public_names(&rewritten), before, "{}", unit.name);
        }
    }
}

#[test]
fn test_service_rewrite() {
    let unit = &corpus()[0];
    let outcome = Engine::default().process(unit);
    let rewritten = outcome.unit.unwrap();
    let text = recast::tree::printer::render_unit(&rewritten);

    // The format pattern stays inline; the plain message is extracted.
    assert!(text.contains("private static final String STARTING_JOB = \"starting job\";"));
    assert!(text.contains("logger.info(\"job {}\", STARTING_JOB);"));
    assert!(text.contains("logStart(STARTING_JOB);"));
    assert!(text.contains("private int retryCount = 3;"));
    assert!(text.contains("this.retryCount = retryCount + 1;"));
    assert!(text.contains("public int max_wait = 10;"));
    assert!(text.contains("public void run_once(String job_name)"));
    assert!(text.contains("e.printStackTrace();"));
}

#[test]
fn test_nested_and_external_types() {
    let unit = &corpus()[1];
    let outcome = Engine::default().process(unit);
    let renamed: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::IdentifierRenamed)
        .map(|d| d.message.clone())
        .collect();
    assert_eq!(renamed.len(), 1);
    assert!(renamed[0].starts_with("compute_all renamed to computeAll"));

    // `draw_now` may override a method of the external `Shape`.
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.reason == Some(SkipReason::AmbiguousVisibility)
            && d.message.starts_with("draw_now")));

    let text = recast::tree::printer::render_unit(&outcome.unit.unwrap());
    assert!(text.contains("protected double area_of(String kind)"));
    // A cased literal: toLowerCase() and equalsIgnoreCase() can disagree.
    assert!(text.contains("kind.toLowerCase().equals(\"circle\")"));
}

#[test]
fn test_collisions_are_reported_not_applied() {
    let unit = &corpus()[2];
    let outcome = Engine::default().process(unit);
    assert!(outcome.unit.is_none());
    let reasons: Vec<_> = outcome.diagnostics.iter().map(|d| d.reason).collect();
    assert_eq!(
        reasons,
        vec![Some(SkipReason::NameCollision), Some(SkipReason::NameCollision)]
    );
}

#[test]
fn test_min_duplicates_from_config() {
    let unit = unit(
        "T",
        vec![class(
            "T",
            &[],
            vec![method(
                "m",
                "void",
                &[],
                vec![],
                vec![
                    local("a", "String", Some(string("v"))),
                    local("b", "String", Some(string("v"))),
                ],
            )],
        )],
    );
    let config = RecastConfig {
        min_duplicates: Some(3),
        ..RecastConfig::default()
    };
    assert!(Engine::new(config).process(&unit).unit.is_none());
    assert!(Engine::default().process(&unit).unit.is_some());
}
