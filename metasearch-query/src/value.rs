//! Typed values carried by search conditions
//!
//! `SearchValue` is what a caller compares a property against. `PrimitiveKind`
//! is the declared kind of a property, used by the type system to discard
//! property variations a sample value could never match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of a property condition
///
/// Decoded from request documents as `{"type": "string", "value": "Inventory"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SearchValue {
    /// No value (null checks carry this)
    #[default]
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    /// Point in time
    Date(DateTime<Utc>),
    /// Enumerated value; compared by ordinal
    #[serde(rename_all = "camelCase")]
    Enum { ordinal: i64, symbolic_name: String },
    /// Collection of values (set membership)
    Set(Vec<SearchValue>),
}

impl SearchValue {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        SearchValue::String(s.into())
    }

    /// Check if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, SearchValue::Null)
    }

    /// Get the string if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SearchValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is a collection
    pub fn is_set(&self) -> bool {
        matches!(self, SearchValue::Set(_))
    }

    /// Elements of a collection; a scalar is a singleton and null is empty
    pub fn elements(&self) -> Vec<&SearchValue> {
        match self {
            SearchValue::Set(items) => items.iter().collect(),
            SearchValue::Null => Vec::new(),
            other => vec![other],
        }
    }
}

/// Declared primitive kind of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    Bool,
    /// Any integral kind (byte, short, int, long, biginteger)
    Long,
    /// Any floating kind (float, double, bigdecimal)
    Double,
    String,
    Date,
    Enum,
    /// Maps, arrays and structs; only null checks apply
    Collection,
}

impl PrimitiveKind {
    /// Check if a property of this kind could ever compare against `value`
    ///
    /// Null matches every kind. For sets, the first element stands in for the
    /// whole collection.
    pub fn accepts(self, value: &SearchValue) -> bool {
        match value {
            SearchValue::Null => true,
            SearchValue::Set(items) => items.first().map_or(true, |v| self.accepts(v)),
            SearchValue::Bool(_) => self == PrimitiveKind::Bool,
            SearchValue::Long(_) => matches!(
                self,
                PrimitiveKind::Long | PrimitiveKind::Double | PrimitiveKind::Date
            ),
            SearchValue::Double(_) => matches!(self, PrimitiveKind::Long | PrimitiveKind::Double),
            SearchValue::String(_) => self == PrimitiveKind::String,
            SearchValue::Date(_) => self == PrimitiveKind::Date,
            SearchValue::Enum { .. } => self == PrimitiveKind::Enum,
        }
    }
}
