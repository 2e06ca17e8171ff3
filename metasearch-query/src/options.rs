//! Compiler options
//!
//! `CompilerOptions` controls which evaluation strategies the condition
//! compilers may choose. Options can be built in code or decoded from a JSON
//! document with camelCase keys; absent keys keep their defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Default variation count at which fallback OR-expansion is reported
pub const DEFAULT_VARIATION_WARNING_THRESHOLD: usize = 8;

/// Options for search compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Whether a secondary text index is configured in the store
    pub text_index: bool,
    /// Hand patterns that are not a plain literal/prefix/suffix/contains form
    /// to the text index as index-native regular expressions
    pub raw_patterns_as_index_queries: bool,
    /// Property variation count at which fallback OR-expansion logs a warning
    pub variation_warning_threshold: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            text_index: false,
            raw_patterns_as_index_queries: false,
            variation_warning_threshold: DEFAULT_VARIATION_WARNING_THRESHOLD,
        }
    }
}

impl CompilerOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enable the secondary text index
    pub fn with_text_index(mut self) -> Self {
        self.text_index = true;
        self
    }

    /// Treat free-form patterns as index-native expressions
    pub fn with_raw_patterns_as_index_queries(mut self) -> Self {
        self.raw_patterns_as_index_queries = true;
        self
    }

    /// Set the fallback expansion warning threshold
    pub fn with_variation_warning_threshold(mut self, threshold: usize) -> Self {
        self.variation_warning_threshold = threshold;
        self
    }
}
