//! Runs the selected rules over units.
//!
//! For one unit: resolve scopes once, plan every rule (in parallel, each a
//! read-only pass), merge the edits in rule order, settle conflicts, then
//! apply. A change whose edits cannot all be applied is withdrawn as a whole
//! and reported as an `EditConflict` skip.

use crate::config::RecastConfig;
use crate::fix::{self, Conflict, RewriteEdit, TreeRewriter};
use crate::rules::{Diagnostic, Location, Rule, RulePlan, SkipReason};
use crate::scope::{self, Anomaly};
use crate::tree::SourceUnit;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::Arc;

/// Result of processing one unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    /// Name of the processed unit.
    pub name: String,
    /// The rewritten unit, `None` when nothing changed.
    #[serde(skip)]
    pub unit: Option<SourceUnit>,
    /// One entry per accepted, declined or withdrawn change.
    pub diagnostics: Vec<Diagnostic>,
    /// Pre-existing anomalies found in the input.
    pub anomalies: Vec<Anomaly>,
}

impl UnitOutcome {
    /// Whether the unit was rewritten.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.unit.is_some()
    }

    /// Number of changes made.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_skip()).count()
    }

    /// Number of changes found but not made.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_skip()).count()
    }
}

/// The rewrite engine.
/// Rules and options for every unit processed are stored here.
#[derive(Clone)]
pub struct Engine {
    /// Rules to run, in merge order.
    pub rules: Vec<Rule>,
    /// Rule options.
    pub config: RecastConfig,
    /// Progress bar ticked once per unit by `process_all`.
    pub progress_bar: Option<Arc<indicatif::ProgressBar>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
            config: RecastConfig::default(),
            progress_bar: None,
        }
    }
}

impl Engine {
    /// Creates an engine running the rules `config` enables.
    #[must_use]
    pub fn new(config: RecastConfig) -> Self {
        Self {
            rules: Rule::enabled(&config),
            config,
            progress_bar: None,
        }
    }

    /// Builder-style method to select rules explicitly.
    #[must_use]
    pub fn with_rules(mut self, rules: &[Rule]) -> Self {
        self.rules = Rule::ALL
            .into_iter()
            .filter(|r| rules.contains(r))
            .collect();
        self
    }

    /// Builder-style method to set config. Rule selection is left unchanged.
    #[must_use]
    pub fn with_config(mut self, config: RecastConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder-style method to set a progress bar.
    #[must_use]
    pub fn with_progress_bar(mut self, progress_bar: Arc<indicatif::ProgressBar>) -> Self {
        self.progress_bar = Some(progress_bar);
        self
    }

    /// Processes one unit. The input is never modified.
    #[must_use]
    pub fn process(&self, unit: &SourceUnit) -> UnitOutcome {
        let scopes = scope::resolve(unit);

        let plans: Vec<RulePlan> = self
            .rules
            .par_iter()
            .map(|rule| rule.plan(unit, &scopes, &self.config))
            .collect();

        let mut edits: Vec<RewriteEdit> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        // Offset of each rule's diagnostics in the merged list.
        let mut offsets: Vec<(&'static str, usize)> = Vec::with_capacity(plans.len());
        for (rule, plan) in self.rules.iter().zip(plans) {
            offsets.push((rule.id(), diagnostics.len()));
            edits.extend(plan.edits);
            diagnostics.extend(plan.diagnostics);
        }
        let diagnostic_index = |edit: &RewriteEdit| {
            offsets
                .iter()
                .find(|(id, _)| *id == edit.rule)
                .map(|(_, offset)| offset + edit.group)
        };

        for conflict in settle(unit, &mut edits) {
            if let Some(i) = diagnostic_index(&conflict.edit) {
                withdraw(&mut diagnostics[i], &conflict.reason.to_string());
            }
        }

        let applied = fix::apply(unit, edits);
        for conflict in &applied.conflicts {
            let reason = conflict.reason.to_string();
            match diagnostic_index(&conflict.edit) {
                Some(i) => withdraw(&mut diagnostics[i], &reason),
                None => diagnostics.push(Diagnostic {
                    rule_id: conflict.edit.rule,
                    rule: Rule::from_id(conflict.edit.rule).map_or(conflict.edit.rule, Rule::name),
                    kind: crate::rules::DiagnosticKind::Skipped,
                    reason: Some(SkipReason::EditConflict),
                    location: Location::of(unit, &conflict.edit.target),
                    message: conflict.to_string(),
                }),
            }
        }

        tracing::debug!(
            unit = %unit.name,
            applied = applied.applied.len(),
            conflicts = applied.conflicts.len(),
            "unit processed"
        );
        UnitOutcome {
            name: unit.name.clone(),
            unit: (applied.changed() && applied.unit != *unit).then_some(applied.unit),
            diagnostics,
            anomalies: scopes.anomalies().to_vec(),
        }
    }

    /// Processes units in parallel. Outcomes keep the input order.
    #[must_use]
    pub fn process_all(&self, units: &[SourceUnit]) -> Vec<UnitOutcome> {
        units
            .par_iter()
            .map(|unit| {
                let outcome = self.process(unit);
                if let Some(pb) = &self.progress_bar {
                    pb.inc(1);
                }
                outcome
            })
            .collect()
    }
}

/// Removes every change that has an overlapping edit, repeating until the
/// rest validates cleanly. Returns the first conflict of each removed change.
fn settle(unit: &SourceUnit, edits: &mut Vec<RewriteEdit>) -> Vec<Conflict> {
    let mut removed = Vec::new();
    loop {
        let mut rewriter = TreeRewriter::new(unit);
        rewriter.add_edits(edits.iter().cloned());
        let (_, conflicts) = rewriter.validate();
        if conflicts.is_empty() {
            return removed;
        }
        let mut withdrawn: FxHashSet<(&'static str, usize)> = FxHashSet::default();
        for conflict in conflicts {
            if withdrawn.insert((conflict.edit.rule, conflict.edit.group)) {
                tracing::trace!(%conflict, "change withdrawn");
                removed.push(conflict);
            }
        }
        edits.retain(|e| !withdrawn.contains(&(e.rule, e.group)));
    }
}

fn withdraw(diagnostic: &mut Diagnostic, reason: &str) {
    if diagnostic.is_skip() {
        return;
    }
    diagnostic.kind = crate::rules::DiagnosticKind::Skipped;
    diagnostic.reason = Some(SkipReason::EditConflict);
    diagnostic.message = format!("withdrawn ({reason}): {}", diagnostic.message);
}
