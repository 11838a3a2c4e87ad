//! Centralized Rule IDs for recast.

/// Strings: duplicate literals consolidated into a constant
pub const RULE_ID_DUPLICATE_LITERALS: &str = "RC-S001";

/// Naming: non-public snake_case methods and fields renamed to camelCase
pub const RULE_ID_SNAKE_CASE: &str = "RC-N001";

/// Error handling: empty `catch` block
pub const RULE_ID_EMPTY_CATCH: &str = "RC-E001";

/// Performance: case normalization before `equals`
pub const RULE_ID_CASE_CHANGE: &str = "RC-P001";
