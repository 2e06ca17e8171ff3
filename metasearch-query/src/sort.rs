//! Result ordering
//!
//! `SequencingOrder` is what a search request asks for; `SortSpec` is what
//! ends up in the compiled query's `order-by`.

use crate::var_registry::VarId;
use metasearch_vocab::attr;
use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Keyword used by the store's datalog dialect
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => ":asc",
            SortDirection::Descending => ":desc",
        }
    }
}

/// Sort specification for a single variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Variable to sort by
    pub var: VarId,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create an ascending sort specification
    pub fn asc(var: VarId) -> Self {
        Self {
            var,
            direction: SortDirection::Ascending,
        }
    }

    /// Create a descending sort specification
    pub fn desc(var: VarId) -> Self {
        Self {
            var,
            direction: SortDirection::Descending,
        }
    }
}

/// Requested ordering of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequencingOrder {
    /// Store order; no explicit sort
    #[default]
    Any,
    /// By document identity
    Guid,
    CreationDateRecent,
    CreationDateOldest,
    LastUpdateRecent,
    LastUpdateOldest,
    /// By a named property, ascending
    PropertyAscending,
    /// By a named property, descending
    PropertyDescending,
}

impl SequencingOrder {
    /// Header timestamp attribute and direction for the date orderings
    pub fn header_sort(self) -> Option<(&'static str, SortDirection)> {
        match self {
            SequencingOrder::CreationDateRecent => Some((attr::CREATE_TIME, SortDirection::Descending)),
            SequencingOrder::CreationDateOldest => Some((attr::CREATE_TIME, SortDirection::Ascending)),
            SequencingOrder::LastUpdateRecent => Some((attr::UPDATE_TIME, SortDirection::Descending)),
            SequencingOrder::LastUpdateOldest => Some((attr::UPDATE_TIME, SortDirection::Ascending)),
            _ => None,
        }
    }

    /// Direction for the property orderings
    pub fn property_direction(self) -> Option<SortDirection> {
        match self {
            SequencingOrder::PropertyAscending => Some(SortDirection::Ascending),
            SequencingOrder::PropertyDescending => Some(SortDirection::Descending),
            _ => None,
        }
    }
}
