use crate::config::RecastConfig;
use crate::fix::RewriteEdit;
use crate::scope::ScopeTree;
use crate::tree::{NodePath, SourceUnit, Span};
use serde::Serialize;
use std::fmt;

/// Module containing rule ID constants.
pub mod ids;

/// Redundant case normalization before `equals`.
pub mod case_change;
/// Recovery statement for empty exception handlers.
pub mod empty_handler;
/// Duplicate string literal consolidation.
pub mod literals;
/// snake_case to camelCase for non-public members.
pub mod naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// The closed set of rewrite rules.
pub enum Rule {
    /// Duplicate string literals become a private constant.
    LiteralConsolidation,
    /// Non-public snake_case members become camelCase.
    IdentifierNormalization,
    /// Empty `catch` blocks get a recovery statement.
    EmptyHandlerRecovery,
    /// `x.toUpperCase().equals(..)` becomes `x.equalsIgnoreCase(..)`.
    RedundantCaseNormalization,
}

#[derive(Debug, Clone, Copy, Serialize)]
/// Metadata associated with a rule.
pub struct RuleMetadata {
    /// Unique code/ID of the rule.
    pub id: &'static str,
    /// Descriptive name of the rule.
    pub name: &'static str,
    /// Category of the rule.
    pub category: &'static str,
}

impl Rule {
    /// Every rule, in the order their edits are merged.
    pub const ALL: [Rule; 4] = [
        Rule::LiteralConsolidation,
        Rule::IdentifierNormalization,
        Rule::EmptyHandlerRecovery,
        Rule::RedundantCaseNormalization,
    ];

    /// Returns the full metadata for the rule.
    #[must_use]
    pub const fn metadata(self) -> RuleMetadata {
        match self {
            Self::LiteralConsolidation => RuleMetadata {
                id: ids::RULE_ID_DUPLICATE_LITERALS,
                name: "duplicate-literals",
                category: "Strings",
            },
            Self::IdentifierNormalization => RuleMetadata {
                id: ids::RULE_ID_SNAKE_CASE,
                name: "snake-case-members",
                category: "Naming",
            },
            Self::EmptyHandlerRecovery => RuleMetadata {
                id: ids::RULE_ID_EMPTY_CATCH,
                name: "empty-catch",
                category: "Error Handling",
            },
            Self::RedundantCaseNormalization => RuleMetadata {
                id: ids::RULE_ID_CASE_CHANGE,
                name: "case-change-equals",
                category: "Performance",
            },
        }
    }

    /// Returns the unique code/ID of the rule.
    #[must_use]
    pub const fn id(self) -> &'static str {
        self.metadata().id
    }

    /// Returns the descriptive name of the rule.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.metadata().name
    }

    /// Looks a rule up by id or name.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.id().eq_ignore_ascii_case(id) || r.name() == id)
    }

    /// Rules enabled by `config`, in merge order.
    #[must_use]
    pub fn enabled(config: &RecastConfig) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|r| config.is_rule_enabled(r.id()))
            .collect()
    }

    /// Plans this rule's edits for one unit. Read-only over its inputs.
    #[must_use]
    pub fn plan(self, unit: &SourceUnit, scopes: &ScopeTree, config: &RecastConfig) -> RulePlan {
        match self {
            Self::LiteralConsolidation => literals::plan(unit, scopes, config),
            Self::IdentifierNormalization => naming::plan(unit, scopes, config),
            Self::EmptyHandlerRecovery => empty_handler::plan(unit, scopes, config),
            Self::RedundantCaseNormalization => case_change::plan(unit, scopes, config),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.name())
    }
}

#[derive(Debug, Clone, Default)]
/// Edits and diagnostics proposed by one rule for one unit.
pub struct RulePlan {
    /// Proposed edits, in emission order.
    pub edits: Vec<RewriteEdit>,
    /// One diagnostic per accepted or declined change.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// What a diagnostic reports.
pub enum DiagnosticKind {
    /// A literal group became (or now uses) a named constant.
    LiteralExtracted,
    /// A declaration and its references were renamed.
    IdentifierRenamed,
    /// A recovery statement was added to an empty handler.
    RecoveryInserted,
    /// A case-normalized comparison became `equalsIgnoreCase`.
    CaseComparisonSimplified,
    /// A change was found but not made.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Why a change was not made.
pub enum SkipReason {
    /// The new name is already visible, or would be shadowed.
    NameCollision,
    /// Visibility or binding of the symbol could not be proven.
    AmbiguousVisibility,
    /// The edit overlapped another edit of the same pass.
    EditConflict,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NameCollision => "name collision",
            Self::AmbiguousVisibility => "ambiguous visibility",
            Self::EditConflict => "edit conflict",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Where in the unit a diagnostic applies.
pub struct Location {
    /// Path of the node.
    pub path: NodePath,
    /// Source position of the node, when the tree carries one.
    pub span: Option<Span>,
}

impl Location {
    /// Location of the node at `path` in `unit`.
    #[must_use]
    pub fn of(unit: &SourceUnit, path: &NodePath) -> Self {
        Self {
            path: path.clone(),
            span: unit.get(path).and_then(|n| n.span),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{}:{}", span.line, span.column),
            None => write!(f, "{}", self.path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single accepted, declined or dropped change.
pub struct Diagnostic {
    /// ID of the rule that produced the diagnostic.
    pub rule_id: &'static str,
    /// Name of that rule.
    pub rule: &'static str,
    /// What happened.
    pub kind: DiagnosticKind,
    /// Why, for `Skipped`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    /// Where.
    pub location: Location,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// A diagnostic for an accepted change.
    #[must_use]
    pub fn new(rule: Rule, kind: DiagnosticKind, location: Location, message: String) -> Self {
        Self {
            rule_id: rule.id(),
            rule: rule.name(),
            kind,
            reason: None,
            location,
            message,
        }
    }

    /// A diagnostic for a change that was not made.
    #[must_use]
    pub fn skipped(rule: Rule, reason: SkipReason, location: Location, message: String) -> Self {
        Self {
            rule_id: rule.id(),
            rule: rule.name(),
            kind: DiagnosticKind::Skipped,
            reason: Some(reason),
            location,
            message,
        }
    }

    /// Whether this reports a change that was not made.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.kind == DiagnosticKind::Skipped
    }
}
