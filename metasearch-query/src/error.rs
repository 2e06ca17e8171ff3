//! Error types for the search compiler
//!
//! The condition compilers never surface these to their callers: problems met
//! while compiling a search are reported through the diagnostics sink instead.
//! The fallible helpers (decoding options and requests, building a type
//! catalog) return them directly.

use thiserror::Error;

/// Search compiler errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// Pattern string is not a valid regular expression
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] Box<regex_syntax::Error>),

    /// JSON decoding of options or requests failed
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A type definition names a supertype that was never defined
    #[error("Type `{type_name}` declares unknown supertype `{supertype}`")]
    UnknownSupertype { type_name: String, supertype: String },

    /// The same type name was defined twice
    #[error("Duplicate type definition: {0}")]
    DuplicateType(String),

    /// A type definition's supertype is of a different category
    #[error("Type `{type_name}` cannot extend `{supertype}` of a different category")]
    CategoryMismatch { type_name: String, supertype: String },
}

impl From<regex_syntax::Error> for SearchError {
    fn from(err: regex_syntax::Error) -> Self {
        SearchError::InvalidPattern(Box::new(err))
    }
}

/// Result type for search compiler operations
pub type Result<T> = std::result::Result<T, SearchError>;
