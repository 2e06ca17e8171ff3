//! Search request model
//!
//! A search names properties without qualifying them by type and combines
//! comparisons into nested ALL/ANY/NONE groups. Requests decode from JSON:
//!
//! ```json
//! {"group": {"matchCriteria": "ANY", "conditions": [
//!   {"condition": {"property": "name", "operator": "EQ",
//!                  "value": {"type": "string", "value": "Inventory"}}},
//!   {"condition": {"property": "owner", "operator": "NOT_NULL"}}
//! ]}}
//! ```

use crate::error::Result;
use crate::value::SearchValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison applied by a property condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    IsNull,
    NotNull,
    MatchesPattern,
    InSet,
    /// Operator string not understood by this version
    #[serde(other)]
    Unrecognized,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComparisonOperator::Eq => "EQ",
            ComparisonOperator::Neq => "NEQ",
            ComparisonOperator::Gt => "GT",
            ComparisonOperator::Gte => "GTE",
            ComparisonOperator::Lt => "LT",
            ComparisonOperator::Lte => "LTE",
            ComparisonOperator::IsNull => "IS_NULL",
            ComparisonOperator::NotNull => "NOT_NULL",
            ComparisonOperator::MatchesPattern => "MATCHES_PATTERN",
            ComparisonOperator::InSet => "IN_SET",
            ComparisonOperator::Unrecognized => "UNRECOGNIZED",
        };
        f.write_str(s)
    }
}

/// Boolean combinator of a condition group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchCriteria {
    /// Every condition must hold
    #[default]
    All,
    /// At least one condition must hold
    Any,
    /// No condition may hold
    None,
    /// Criteria string not understood by this version
    #[serde(other)]
    Unrecognized,
}

/// Comparison of one unqualified property against a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCondition {
    pub property: String,
    pub operator: ComparisonOperator,
    #[serde(default)]
    pub value: SearchValue,
}

impl PropertyCondition {
    /// Create a new condition
    pub fn new(property: impl Into<String>, operator: ComparisonOperator, value: SearchValue) -> Self {
        Self {
            property: property.into(),
            operator,
            value,
        }
    }
}

/// Ordered group of conditions under one combinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroup {
    #[serde(default)]
    pub match_criteria: MatchCriteria,
    #[serde(default)]
    pub conditions: Vec<SearchExpression>,
}

/// A property condition or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchExpression {
    Condition(PropertyCondition),
    Group(SearchGroup),
}

impl SearchExpression {
    /// Decode a search expression from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Single condition
    pub fn condition(property: impl Into<String>, operator: ComparisonOperator, value: SearchValue) -> Self {
        SearchExpression::Condition(PropertyCondition::new(property, operator, value))
    }

    /// Group with an explicit combinator
    pub fn group(match_criteria: MatchCriteria, conditions: Vec<SearchExpression>) -> Self {
        SearchExpression::Group(SearchGroup {
            match_criteria,
            conditions,
        })
    }

    /// ALL group
    pub fn all(conditions: Vec<SearchExpression>) -> Self {
        Self::group(MatchCriteria::All, conditions)
    }

    /// ANY group
    pub fn any(conditions: Vec<SearchExpression>) -> Self {
        Self::group(MatchCriteria::Any, conditions)
    }

    /// NONE group
    pub fn none(conditions: Vec<SearchExpression>) -> Self {
        Self::group(MatchCriteria::None, conditions)
    }
}

/// Condition on one named classification, optionally on its properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCondition {
    pub name: String,
    #[serde(default)]
    pub properties: Option<SearchExpression>,
}

/// Classification sub-searches combined under one combinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchClassifications {
    #[serde(default)]
    pub conditions: Vec<ClassificationCondition>,
    #[serde(default)]
    pub match_criteria: MatchCriteria,
}

/// Lifecycle status of a stored instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Unknown,
    Draft,
    Prepared,
    Proposed,
    Approved,
    Rejected,
    ApprovedConcept,
    UnderDevelopment,
    DevelopmentComplete,
    ApprovedForDeployment,
    Standby,
    Active,
    Failed,
    Disabled,
    Complete,
    Deprecated,
    Other,
    Deleted,
}

impl InstanceStatus {
    const ALL: [InstanceStatus; 18] = [
        InstanceStatus::Unknown,
        InstanceStatus::Draft,
        InstanceStatus::Prepared,
        InstanceStatus::Proposed,
        InstanceStatus::Approved,
        InstanceStatus::Rejected,
        InstanceStatus::ApprovedConcept,
        InstanceStatus::UnderDevelopment,
        InstanceStatus::DevelopmentComplete,
        InstanceStatus::ApprovedForDeployment,
        InstanceStatus::Standby,
        InstanceStatus::Active,
        InstanceStatus::Failed,
        InstanceStatus::Disabled,
        InstanceStatus::Complete,
        InstanceStatus::Deprecated,
        InstanceStatus::Other,
        InstanceStatus::Deleted,
    ];

    /// Stored ordinal
    pub fn ordinal(self) -> i64 {
        match self {
            InstanceStatus::Unknown => 0,
            InstanceStatus::Draft => 1,
            InstanceStatus::Prepared => 2,
            InstanceStatus::Proposed => 3,
            InstanceStatus::Approved => 4,
            InstanceStatus::Rejected => 5,
            InstanceStatus::ApprovedConcept => 6,
            InstanceStatus::UnderDevelopment => 7,
            InstanceStatus::DevelopmentComplete => 8,
            InstanceStatus::ApprovedForDeployment => 9,
            InstanceStatus::Standby => 10,
            InstanceStatus::Active => 15,
            InstanceStatus::Failed => 16,
            InstanceStatus::Disabled => 17,
            InstanceStatus::Complete => 18,
            InstanceStatus::Deprecated => 19,
            InstanceStatus::Other => 50,
            InstanceStatus::Deleted => 99,
        }
    }

    /// Every status, in ordinal order
    pub fn all() -> &'static [InstanceStatus] {
        &Self::ALL
    }

    /// Every status except DELETED
    pub fn non_deleted() -> Vec<InstanceStatus> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| *s != InstanceStatus::Deleted)
            .collect()
    }
}
