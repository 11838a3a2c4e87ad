use crate::engine::UnitOutcome;
use crate::rules::{Diagnostic, Rule};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

/// Create a progress bar with unit count.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_progress_bar(total_units: u64) -> ProgressBar {
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_units), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("rewriting...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "╔════════════════════════════════════════╗".cyan())?;
    writeln!(writer, "{}", "║  Recast Results                        ║".cyan().bold())?;
    writeln!(writer, "{}", "╚════════════════════════════════════════╝".cyan())?;
    writeln!(writer)?;
    Ok(())
}

/// Totals over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Units processed.
    pub units: usize,
    /// Units rewritten.
    pub changed: usize,
    /// Changes made.
    pub applied: usize,
    /// Changes found but not made.
    pub skipped: usize,
    /// Pre-existing anomalies.
    pub anomalies: usize,
}

impl Summary {
    /// Totals over `outcomes`.
    #[must_use]
    pub fn of(outcomes: &[UnitOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |acc, o| Self {
            units: acc.units + 1,
            changed: acc.changed + usize::from(o.changed()),
            applied: acc.applied + o.applied_count(),
            skipped: acc.skipped + o.skipped_count(),
            anomalies: acc.anomalies + o.anomalies.len(),
        })
    }
}

/// Print summary with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(writer: &mut impl Write, summary: &Summary) -> std::io::Result<()> {
    fn pill(label: &str, count: usize, color: colored::Color) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().dimmed())
        } else {
            format!("{}: {}", label, count.to_string().color(color).bold())
        }
    }

    writeln!(
        writer,
        "{}  {}  {}  {}  {}",
        pill("Units", summary.units, colored::Color::White),
        pill("Changed", summary.changed, colored::Color::Green),
        pill("Applied", summary.applied, colored::Color::Green),
        pill("Skipped", summary.skipped, colored::Color::Yellow),
        pill("Anomalies", summary.anomalies, colored::Color::Red),
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Helper to create a styled table
fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

fn status_cell(diagnostic: &Diagnostic) -> Cell {
    match diagnostic.reason {
        Some(reason) => Cell::new(format!("skipped ({reason})")).fg(Color::Yellow),
        None => Cell::new("applied").fg(Color::Green),
    }
}

/// Print the diagnostics of one unit.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_diagnostics(writer: &mut impl Write, outcome: &UnitOutcome) -> std::io::Result<()> {
    if outcome.diagnostics.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", outcome.name.bold().underline())?;
    let mut table = create_table(vec!["Rule ID", "Change", "Location", "Status"]);
    for d in &outcome.diagnostics {
        table.add_row(vec![
            Cell::new(d.rule_id).add_attribute(Attribute::Dim),
            Cell::new(&d.message).add_attribute(Attribute::Bold),
            Cell::new(d.location.to_string()),
            status_cell(d),
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the full report: header, one table per unit with diagnostics,
/// then the summary.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_report(writer: &mut impl Write, outcomes: &[UnitOutcome]) -> std::io::Result<()> {
    print_header(writer)?;
    for outcome in outcomes {
        print_diagnostics(writer, outcome)?;
        for anomaly in &outcome.anomalies {
            writeln!(
                writer,
                "{} {}: {}",
                "anomaly".red(),
                outcome.name,
                anomaly_text(anomaly)
            )?;
        }
    }
    writeln!(writer)?;
    print_summary_pills(writer, &Summary::of(outcomes))
}

fn anomaly_text(anomaly: &crate::scope::Anomaly) -> String {
    match anomaly {
        crate::scope::Anomaly::DuplicateDeclaration { name, path, .. } => {
            format!("{name} declared more than once (at {path})")
        }
    }
}

/// Print the available rules.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_rules(writer: &mut impl Write) -> std::io::Result<()> {
    let mut table = create_table(vec!["Rule ID", "Name", "Category"]);
    for rule in Rule::ALL {
        let meta = rule.metadata();
        table.add_row(vec![
            Cell::new(meta.id).add_attribute(Attribute::Bold),
            Cell::new(meta.name),
            Cell::new(meta.category).add_attribute(Attribute::Dim),
        ]);
    }
    writeln!(writer, "{table}")
}
