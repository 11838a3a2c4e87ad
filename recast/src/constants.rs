use regex::Regex;
use std::sync::OnceLock;

/// Name of the per-project configuration file.
pub const CONFIG_FILENAME: &str = ".recast.toml";

/// Extension of serialized unit files.
pub const UNIT_EXTENSION: &str = "json";

/// Methods every class inherits implicitly. A new name equal to one of them
/// would shadow or overload it.
pub const IMPLICIT_OBJECT_MEMBERS: &[&str] = &[
    "equals",
    "hashCode",
    "toString",
    "getClass",
    "notify",
    "notifyAll",
    "wait",
    "clone",
    "finalize",
];

/// Calls whose first argument is a log message or format pattern.
pub const DEFAULT_FORMAT_CALLS: &[&str] = &[
    "trace", "debug", "info", "warn", "error", "fatal", "format", "printf",
];

/// Minimum number of occurrences before a literal is extracted.
pub const DEFAULT_MIN_DUPLICATES: usize = 2;

/// Method called on the caught exception by the empty-handler rule.
pub const DEFAULT_RECOVERY_METHOD: &str = "printStackTrace";

/// Folders skipped when walking for unit files.
pub const DEFAULT_EXCLUDE_FOLDERS: &[&str] = &["target", ".git", "node_modules", "build"];

/// Regex for identifiers in lower snake case with at least one underscore.
///
/// # Panics
///
/// Panics if the regex pattern is invalid.
pub fn get_snake_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)+$").expect("Invalid snake case regex pattern")
    })
}
