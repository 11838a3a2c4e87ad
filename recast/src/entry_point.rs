//! Shared entry point for the binaries.

use crate::cli::{Cli, Commands};
use crate::config::{Config, RecastConfig};
use crate::engine::{Engine, UnitOutcome};
use crate::output::{self, Summary};
use crate::rules::Rule;
use crate::tree::printer::render_unit;
use crate::tree::SourceUnit;
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing once, when `RUST_LOG` is set or `verbose` is requested.
/// Logs go to stderr.
fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if verbose {
            EnvFilter::new("recast=debug")
        } else {
            return;
        };
        // Another subscriber may already be installed by the host program.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .try_init();
    });
}

#[derive(Serialize)]
struct UnitReport<'a> {
    file: &'a Path,
    changed: bool,
    #[serde(flatten)]
    outcome: &'a UnitOutcome,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    units: Vec<UnitReport<'a>>,
    summary: Summary,
}

/// Runs recast with the given arguments.
///
/// # Errors
///
/// Returns an error if writing the report fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Runs recast with the given arguments, writing output to the specified writer.
///
/// Exit codes: 0 on success, 1 on usage, configuration or I/O errors.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["recast".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    init_tracing(cli_var.output.verbose);

    if let Some(Commands::Rules { json }) = cli_var.command {
        if json {
            let metadata: Vec<_> = Rule::ALL.iter().map(|r| r.metadata()).collect();
            writeln!(writer, "{}", serde_json::to_string_pretty(&metadata)?)?;
        } else {
            output::print_rules(writer)?;
        }
        return Ok(0);
    }

    for path in &cli_var.paths {
        if !path.exists() {
            eprintln!(
                "Error: The file or directory '{}' does not exist.",
                path.display()
            );
            return Ok(1);
        }
    }

    let config_path = cli_var
        .paths
        .first()
        .map_or(Path::new("."), PathBuf::as_path);
    let config = match Config::load_from_path(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(1);
        }
    };
    if let Some(file) = &config.config_file_path {
        tracing::debug!(file = %file.display(), "configuration loaded");
    }
    let recast_config = match apply_rule_options(config.recast, &cli_var.rule_options) {
        Ok(c) => c,
        Err(unknown) => {
            eprintln!("Error: unknown rule '{unknown}'. Run `recast rules` to list rules.");
            return Ok(1);
        }
    };

    let mut exclude_folders = recast_config.exclude_folders();
    exclude_folders.extend(cli_var.exclude_folders.iter().cloned());

    let mut files: Vec<PathBuf> = cli_var
        .paths
        .iter()
        .flat_map(|p| crate::io::collect_unit_files(p, &exclude_folders))
        .collect();
    files.sort();
    files.dedup();
    tracing::debug!(files = files.len(), "unit files collected");

    let mut units: Vec<SourceUnit> = Vec::with_capacity(files.len());
    for file in &files {
        match crate::io::load_unit(file) {
            Ok(unit) => units.push(unit),
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(1);
            }
        }
    }

    let show_progress = !cli_var.output.json && !cli_var.output.quiet;
    let mut engine = Engine::new(recast_config);
    let progress = show_progress.then(|| Arc::new(output::create_progress_bar(units.len() as u64)));
    if let Some(pb) = &progress {
        engine = engine.with_progress_bar(Arc::clone(pb));
    }
    let outcomes = engine.process_all(&units);
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for (file, outcome) in files.iter().zip(&outcomes) {
        let Some(unit) = &outcome.unit else {
            continue;
        };
        if cli_var.output.print {
            writeln!(writer, "// {}", file.display())?;
            write!(writer, "{}", render_unit(unit))?;
        } else if !cli_var.dry_run {
            if let Err(e) = crate::io::save_unit(file, unit) {
                eprintln!("Error: {e}");
                return Ok(1);
            }
            tracing::debug!(file = %file.display(), "unit written");
        }
    }

    let summary = Summary::of(&outcomes);
    if cli_var.output.json {
        let report = JsonReport {
            units: files
                .iter()
                .zip(&outcomes)
                .map(|(file, outcome)| UnitReport {
                    file,
                    changed: outcome.changed(),
                    outcome,
                })
                .collect(),
            summary,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else if cli_var.output.quiet {
        output::print_summary_pills(writer, &summary)?;
    } else {
        output::print_report(writer, &outcomes)?;
        if cli_var.dry_run && summary.changed > 0 {
            writeln!(writer, "Dry run: {} unit(s) not written.", summary.changed)?;
        }
    }
    Ok(0)
}

/// Folds `--rules` and `--ignore` into the file configuration. Returns the
/// first unknown rule on failure.
fn apply_rule_options(
    mut config: RecastConfig,
    options: &crate::cli::RuleOptions,
) -> std::result::Result<RecastConfig, String> {
    let resolve = |names: &[String]| -> std::result::Result<Vec<String>, String> {
        names
            .iter()
            .map(|n| {
                Rule::from_id(n)
                    .map(|r| r.id().to_owned())
                    .ok_or_else(|| n.clone())
            })
            .collect()
    };
    if !options.rules.is_empty() {
        config.rules = Some(resolve(&options.rules)?);
    }
    if !options.ignore.is_empty() {
        config
            .ignore
            .get_or_insert_with(Vec::new)
            .extend(resolve(&options.ignore)?);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RuleOptions;
    use crate::tree::build::*;
    use std::fs;
    use tempfile::tempdir;

    fn run(args: &[&str]) -> (i32, String) {
        let mut buffer = Vec::new();
        let code =
            run_with_args_to(args.iter().map(|s| (*s).to_owned()).collect(), &mut buffer).unwrap();
        (code, String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn test_rule_options_resolve_names() {
        let options = RuleOptions {
            rules: vec!["empty-catch".to_owned()],
            ignore: vec!["rc-p001".to_owned()],
        };
        let config = apply_rule_options(RecastConfig::default(), &options).unwrap();
        assert_eq!(config.rules, Some(vec!["RC-E001".to_owned()]));
        assert_eq!(config.ignore, Some(vec!["RC-P001".to_owned()]));

        let options = RuleOptions {
            rules: vec!["nope".to_owned()],
            ignore: vec![],
        };
        assert_eq!(
            apply_rule_options(RecastConfig::default(), &options).unwrap_err(),
            "nope"
        );
    }

    #[test]
    fn test_help_exits_zero() {
        let (code, out) = run(&["--help"]);
        assert_eq!(code, 0);
        assert!(out.contains("--dry-run"));
    }

    #[test]
    fn test_missing_path_exits_one() {
        let (code, _) = run(&["/definitely/not/here"]);
        assert_eq!(code, 1);
    }

    #[test]
    fn test_dry_run_json_leaves_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("Sample.json");
        let unit = unit(
            "Sample",
            vec![class(
                "Sample",
                &[],
                vec![method(
                    "m",
                    "void",
                    &[],
                    vec![],
                    vec![try_stmt(vec![], vec![catch("e", "Exception", vec![])])],
                )],
            )],
        );
        crate::io::save_unit(&path, &unit)?;
        let before = fs::read_to_string(&path)?;

        let (code, out) = run(&["--dry-run", "--json", path.to_str().unwrap_or_default()]);
        assert_eq!(code, 0);
        let report: serde_json::Value = serde_json::from_str(&out)?;
        assert_eq!(report["summary"]["applied"], 1);
        assert_eq!(report["units"][0]["changed"], true);
        assert_eq!(report["units"][0]["diagnostics"][0]["rule_id"], "RC-E001");
        assert_eq!(fs::read_to_string(&path)?, before);
        Ok(())
    }
}
