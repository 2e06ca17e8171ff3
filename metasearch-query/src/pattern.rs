//! Pattern types for the compiled query
//!
//! A triple pattern matches one attribute value of one stored document:
//! `[?e :entityProperties/Asset.name "Inventory"]`.

use crate::value::SearchValue;
use crate::var_registry::VarId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Constant value in a pattern or predicate
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Long(i64),
    Double(f64),
    String(Arc<str>),
    Date(DateTime<Utc>),
}

impl Literal {
    /// Create a string literal
    pub fn string(s: impl AsRef<str>) -> Self {
        Literal::String(Arc::from(s.as_ref()))
    }

    /// Convert a scalar search value
    ///
    /// Enumerations compare by ordinal. Returns None for null and for sets,
    /// which have no single-literal form.
    pub fn from_search_value(value: &SearchValue) -> Option<Self> {
        match value {
            SearchValue::Bool(b) => Some(Literal::Bool(*b)),
            SearchValue::Long(l) => Some(Literal::Long(*l)),
            SearchValue::Double(d) => Some(Literal::Double(*d)),
            SearchValue::String(s) => Some(Literal::string(s)),
            SearchValue::Date(d) => Some(Literal::Date(*d)),
            SearchValue::Enum { ordinal, .. } => Some(Literal::Long(*ordinal)),
            SearchValue::Null | SearchValue::Set(_) => None,
        }
    }

    /// Get the string if this is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A term in a triple pattern
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// Variable binding
    Var(VarId),
    /// Reference to a stored document by id
    Ref(Arc<str>),
    /// Constant value
    Value(Literal),
}

impl Term {
    /// Check if this term is a variable
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Get the variable if this is a Var term
    pub fn as_var(&self) -> Option<VarId> {
        match self {
            Term::Var(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value if this is a Value term
    pub fn as_value(&self) -> Option<&Literal> {
        match self {
            Term::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A triple pattern: document, attribute keyword, value
#[derive(Clone, Debug, PartialEq)]
pub struct TriplePattern {
    /// Document term
    pub s: Term,
    /// Attribute keyword (always bound)
    pub attr: Arc<str>,
    /// Value term
    pub o: Term,
}

impl TriplePattern {
    /// Create a new triple pattern
    pub fn new(s: Term, attr: impl Into<Arc<str>>, o: Term) -> Self {
        Self {
            s,
            attr: attr.into(),
            o,
        }
    }

    /// Pattern binding an attribute's value to a variable
    pub fn bind(row: VarId, attr: impl Into<Arc<str>>, var: VarId) -> Self {
        Self::new(Term::Var(row), attr, Term::Var(var))
    }

    /// Pattern requiring an attribute to hold a constant
    pub fn value(row: VarId, attr: impl Into<Arc<str>>, value: Literal) -> Self {
        Self::new(Term::Var(row), attr, Term::Value(value))
    }

    /// Get the variables in this pattern (in order: s, o)
    pub fn variables(&self) -> Vec<VarId> {
        [&self.s, &self.o].into_iter().filter_map(Term::as_var).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_from_search_value() {
        assert_eq!(
            Literal::from_search_value(&SearchValue::string("x")),
            Some(Literal::string("x"))
        );
        assert_eq!(
            Literal::from_search_value(&SearchValue::Enum {
                ordinal: 99,
                symbolic_name: "DELETED".into()
            }),
            Some(Literal::Long(99))
        );
        assert_eq!(Literal::from_search_value(&SearchValue::Null), None);
        assert_eq!(Literal::from_search_value(&SearchValue::Set(vec![])), None);
    }

    #[test]
    fn test_triple_pattern_variables() {
        let pattern = TriplePattern::bind(VarId(0), "createTime", VarId(1));
        assert_eq!(pattern.variables(), vec![VarId(0), VarId(1)]);

        let pattern = TriplePattern::value(VarId(0), "currentStatus", Literal::Long(15));
        assert_eq!(pattern.variables(), vec![VarId(0)]);
        assert!(pattern.o.as_value().is_some());
    }
}
