//! Diagnostic code compact identifiers
//!
//! These codes identify the problems the search compiler reports through its
//! diagnostics sink. They follow the pattern: `diag:category/ProblemName`
//!
//! The service layer can map them onto its own error catalogue when it needs
//! to tell an empty result apart from a search that could not be evaluated.
//!
//! # Example
//!
//! ```text
//! component=PropertyConditionCompiler method=compile_condition
//! code=diag:search/UnknownProperty category=search details="property `name` unknown for scope {Process}"
//! ```

/// Diagnostic namespace prefix
pub const DIAG_PREFIX: &str = "diag:";

// =============================================================================
// Condition Problems (search)
// =============================================================================

/// No qualified variation of the property exists under the current type scope
pub const UNKNOWN_PROPERTY: &str = "diag:search/UnknownProperty";

/// Comparison operator is not one the compiler understands
pub const UNKNOWN_OPERATOR: &str = "diag:search/UnknownOperator";

/// Match criteria of a condition group is not one of ALL, ANY, NONE
pub const UNKNOWN_MATCH_CRITERIA: &str = "diag:search/UnknownMatchCriteria";

/// Value cannot be used with the requested operator
pub const INVALID_VALUE: &str = "diag:search/InvalidValue";

/// Pattern operator requested with a value that is not a string
pub const NON_STRING_PATTERN: &str = "diag:search/NonStringPattern";

/// Pattern string could not be parsed as a regular expression
pub const INVALID_PATTERN: &str = "diag:search/InvalidPattern";

/// Operator has no text-matching form
pub const UNSUPPORTED_TEXT_OPERATOR: &str = "diag:search/UnsupportedTextOperator";

// =============================================================================
// Query Assembly Problems (assembly)
// =============================================================================

/// Sequencing property has no qualified variation under the current type scope
pub const UNKNOWN_SORT_PROPERTY: &str = "diag:assembly/UnknownSortProperty";

/// Property-based sequencing requested without a property name
pub const MISSING_SORT_PROPERTY: &str = "diag:assembly/MissingSortProperty";

/// Type name is unknown to the type system
pub const UNKNOWN_TYPE: &str = "diag:assembly/UnknownType";

/// Classification name is unknown to the type system
pub const UNKNOWN_CLASSIFICATION: &str = "diag:assembly/UnknownClassification";

// =============================================================================
// Helper Functions
// =============================================================================

/// Check if a string is a diagnostic code
pub fn is_diagnostic_code(s: &str) -> bool {
    s.starts_with(DIAG_PREFIX)
}

/// Get the category from a code (e.g., "search" from "diag:search/UnknownProperty")
pub fn diagnostic_category(code: &str) -> Option<&str> {
    code.strip_prefix(DIAG_PREFIX)?.split('/').next()
}

/// Get the problem name from a code (e.g., "UnknownProperty" from "diag:search/UnknownProperty")
pub fn diagnostic_name(code: &str) -> Option<&str> {
    code.strip_prefix(DIAG_PREFIX)?.split('/').nth(1)
}
