//! Core library for recast.
//!
//! recast applies a fixed set of safety-checked rewrite rules to syntax trees
//! of a Java-like language: duplicate string literals become constants,
//! non-public snake_case members become camelCase, empty exception handlers
//! get a recovery call, and redundant case normalization before `equals`
//! becomes `equalsIgnoreCase`. Every rename is checked against a scope
//! resolution of the whole unit; a change that cannot be proven safe is
//! reported and skipped instead of applied.
//!
//! ```
//! use recast::engine::Engine;
//! use recast::tree::build::*;
//!
//! let unit = unit("T", vec![class("T", &[], vec![
//!     method("m", "void", &[], vec![], vec![
//!         try_stmt(vec![], vec![catch("e", "Exception", vec![])]),
//!     ]),
//! ])]);
//! let outcome = Engine::default().process(&unit);
//! assert!(outcome.changed());
//! ```

// Pedantic lints that fire on tree-walking code
#![allow(
    clippy::type_complexity,
    clippy::similar_names,
    clippy::format_push_string,
    clippy::map_unwrap_or,
    clippy::items_after_statements,
    clippy::unnecessary_map_or
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing the syntax tree model, builders and printer.
pub mod tree;

/// Module containing scope and symbol resolution.
pub mod scope;

/// Module containing the path-addressed tree rewriter.
pub mod fix;

/// Module containing the rewrite rules.
pub mod rules;

/// Module running rules over units.
pub mod engine;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants and regex patterns.
pub mod constants;

/// Module defining the library error type.
pub mod error;

/// Module for reading and writing unit files.
pub mod io;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module defining the shared entry point of the binaries.
pub mod entry_point;

/// Module for rich CLI output formatting with colored text and progress bars.
pub mod output;
