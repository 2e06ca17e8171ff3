//! Clause IR for compiled searches
//!
//! This module provides the closed set of clause shapes the compiler emits.
//! The store's datalog dialect evaluates the top-level clause list as an
//! implicit conjunction.
//!
//! # Design
//!
//! - `Clause` is the only composition unit: patterns and predicates are leaves,
//!   `Negation`, `Disjunction` and `Conjunction` group other clauses
//! - Grouping is never re-associated once built; every rule that combines
//!   clauses is a total match over `Clause`
//! - A constant `false` predicate (`Clause::never`) stands for "matches nothing"

use crate::pattern::{Literal, Term, TriplePattern};
use crate::var_registry::VarId;
use std::sync::Arc;

// ============================================================================
// Clause
// ============================================================================

/// A compiled clause
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Data pattern: triple, text-index call, or rule invocation
    Pattern(Pattern),

    /// Predicate call evaluated against the bindings so far
    Predicate(Expression),

    /// Scoped negation (`not-join`): rows are kept when the body has no
    /// solution for their values of the join variables
    Negation { join: Vec<VarId>, body: Vec<Clause> },

    /// Scoped disjunction (`or-join`): any branch may match; only the join
    /// variables are visible outside
    Disjunction {
        join: Vec<VarId>,
        branches: Vec<Clause>,
    },

    /// Explicit conjunction (`and`), used for multi-clause disjunction branches
    Conjunction(Vec<Clause>),
}

impl Clause {
    /// Triple pattern clause
    pub fn triple(pattern: TriplePattern) -> Self {
        Clause::Pattern(Pattern::Triple(pattern))
    }

    /// Predicate clause
    pub fn predicate(expr: Expression) -> Self {
        Clause::Predicate(expr)
    }

    /// Clause guaranteed to match nothing
    pub fn never() -> Self {
        Clause::Predicate(Expression::Const(Literal::Bool(false)))
    }

    /// Check if this is the always-false clause
    pub fn is_never(&self) -> bool {
        matches!(self, Clause::Predicate(Expression::Const(Literal::Bool(false))))
    }

    /// Collapse a clause set into one clause
    ///
    /// A single clause is returned as-is; anything longer is AND-wrapped.
    pub fn group(mut clauses: Vec<Clause>) -> Self {
        if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            Clause::Conjunction(clauses)
        }
    }

    /// Scoped negation over the join variables
    pub fn not_join(join: Vec<VarId>, body: Vec<Clause>) -> Self {
        Clause::Negation { join, body }
    }

    /// Scoped disjunction over the join variables
    pub fn or_join(join: Vec<VarId>, branches: Vec<Clause>) -> Self {
        Clause::Disjunction { join, branches }
    }

    /// Get the triple pattern if this is one
    pub fn as_triple(&self) -> Option<&TriplePattern> {
        match self {
            Clause::Pattern(Pattern::Triple(tp)) => Some(tp),
            _ => None,
        }
    }

    /// Get the text-index call if this is one
    pub fn as_text_search(&self) -> Option<&TextSearchPattern> {
        match self {
            Clause::Pattern(Pattern::TextSearch(ts)) => Some(ts),
            _ => None,
        }
    }

    /// Visit this clause and every clause nested inside it (pre-order)
    pub fn walk<'c>(&'c self, visit: &mut impl FnMut(&'c Clause)) {
        visit(self);
        match self {
            Clause::Pattern(_) | Clause::Predicate(_) => {}
            Clause::Negation { body: inner, .. }
            | Clause::Disjunction {
                branches: inner, ..
            }
            | Clause::Conjunction(inner) => {
                for clause in inner {
                    clause.walk(visit);
                }
            }
        }
    }

    /// Get all variables referenced by this clause
    pub fn variables(&self) -> Vec<VarId> {
        match self {
            Clause::Pattern(p) => p.variables(),
            Clause::Predicate(expr) => expr.variables(),
            Clause::Negation { join, body } => {
                let mut vars = join.clone();
                vars.extend(body.iter().flat_map(|c| c.variables()));
                vars
            }
            Clause::Disjunction { join, branches } => {
                let mut vars = join.clone();
                vars.extend(branches.iter().flat_map(|c| c.variables()));
                vars
            }
            Clause::Conjunction(inner) => inner.iter().flat_map(|c| c.variables()).collect(),
        }
    }
}

// ============================================================================
// Data patterns
// ============================================================================

/// Data pattern leaf
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Attribute value lookup
    Triple(TriplePattern),
    /// Call into the secondary text index
    TextSearch(TextSearchPattern),
    /// Invocation of a derivation rule
    Rule(RuleCall),
}

impl Pattern {
    /// Get all variables referenced by this pattern
    pub fn variables(&self) -> Vec<VarId> {
        match self {
            Pattern::Triple(tp) => tp.variables(),
            Pattern::TextSearch(ts) => ts.variables(),
            Pattern::Rule(call) => call.args.iter().filter_map(Term::as_var).collect(),
        }
    }
}

/// What attributes a text-index call searches
#[derive(Debug, Clone, PartialEq)]
pub enum TextScope {
    /// One known attribute
    Attribute(Arc<str>),
    /// Every indexed attribute; the compiler filters the matched attribute
    /// keyword afterwards
    AnyAttribute,
}

/// Text-index call
///
/// Binds `(row, matched value, matched attribute)` for every indexed value
/// matching `query`. The query is in the index's native syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchPattern {
    /// Index-native query string
    pub query: String,
    /// Whether the index should match case-sensitively
    pub case_sensitive: bool,
    /// Searched attributes
    pub scope: TextScope,
    /// Variable bound to the matching document
    pub row_var: VarId,
    /// Variable bound to the matched value
    pub value_var: VarId,
    /// Variable bound to the matched attribute keyword (unscoped calls)
    pub attr_var: Option<VarId>,
}

impl TextSearchPattern {
    /// Get all variables bound by this call
    pub fn variables(&self) -> Vec<VarId> {
        let mut vars = vec![self.row_var, self.value_var];
        if let Some(a) = self.attr_var {
            vars.push(a);
        }
        vars
    }
}

/// Invocation of a named derivation rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCall {
    pub name: Arc<str>,
    pub args: Vec<Term>,
}

/// Derivation rule shipped alongside the query
///
/// Multiple rules with the same name and arity are alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: Arc<str>,
    pub params: Vec<VarId>,
    pub body: Vec<Clause>,
}

impl Rule {
    /// Create a new rule
    pub fn new(name: impl Into<Arc<str>>, params: Vec<VarId>, body: Vec<Clause>) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }

    /// Clause invoking this rule with the given arguments
    pub fn call(&self, args: Vec<Term>) -> Clause {
        Clause::Pattern(Pattern::Rule(RuleCall {
            name: self.name.clone(),
            args,
        }))
    }
}

// ============================================================================
// Predicate expressions
// ============================================================================

/// Predicate expression AST
///
/// All operations are function calls for uniform rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Variable reference
    Var(VarId),
    /// Constant value
    Const(Literal),
    /// Constant set (set membership)
    Set(Vec<Literal>),
    /// Function call
    Call { func: Function, args: Vec<Expression> },
}

impl Expression {
    /// Create a comparison of a variable against a constant
    pub fn compare(func: Function, var: VarId, value: Literal) -> Self {
        Expression::Call {
            func,
            args: vec![Expression::Var(var), Expression::Const(value)],
        }
    }

    /// Create an equality comparison
    pub fn eq(var: VarId, value: Literal) -> Self {
        Self::compare(Function::Eq, var, value)
    }

    /// Create a not-equal comparison
    pub fn ne(var: VarId, value: Literal) -> Self {
        Self::compare(Function::Ne, var, value)
    }

    /// Create a set-membership test (`(contains? #{...} ?v)`)
    pub fn in_set(var: VarId, values: Vec<Literal>) -> Self {
        Expression::Call {
            func: Function::In,
            args: vec![Expression::Set(values), Expression::Var(var)],
        }
    }

    /// Create a string prefix test
    pub fn starts_with(value: Expression, prefix: &str) -> Self {
        Expression::Call {
            func: Function::StrStarts,
            args: vec![value, Expression::Const(Literal::string(prefix))],
        }
    }

    /// Create a string suffix test
    pub fn ends_with(value: Expression, suffix: &str) -> Self {
        Expression::Call {
            func: Function::StrEnds,
            args: vec![value, Expression::Const(Literal::string(suffix))],
        }
    }

    /// Create a substring test
    pub fn contains(value: Expression, needle: &str) -> Self {
        Expression::Call {
            func: Function::Contains,
            args: vec![value, Expression::Const(Literal::string(needle))],
        }
    }

    /// Create a full-match regular expression test (`(re-matches #"..." ?v)`)
    pub fn regex(var: VarId, pattern: &str) -> Self {
        Expression::Call {
            func: Function::Regex,
            args: vec![Expression::Const(Literal::string(pattern)), Expression::Var(var)],
        }
    }

    /// String form of a value (`(str ?a)`)
    pub fn str(var: VarId) -> Self {
        Self::call(Function::Str, vec![Expression::Var(var)])
    }

    /// Namespace part of a keyword (`(namespace ?a)`)
    pub fn keyword_namespace(var: VarId) -> Self {
        Self::call(Function::Namespace, vec![Expression::Var(var)])
    }

    /// Function call over arbitrary arguments
    pub fn call(func: Function, args: Vec<Expression>) -> Self {
        Expression::Call { func, args }
    }

    /// Get all variables referenced by this expression
    pub fn variables(&self) -> Vec<VarId> {
        match self {
            Expression::Var(v) => vec![*v],
            Expression::Const(_) | Expression::Set(_) => vec![],
            Expression::Call { args, .. } => args.iter().flat_map(|a| a.variables()).collect(),
        }
    }

    /// Get the called function, if this is a call
    pub fn func(&self) -> Option<&Function> {
        match self {
            Expression::Call { func, .. } => Some(func),
            _ => None,
        }
    }
}

/// Built-in predicate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Equality (=)
    Eq,
    /// Not equal (not=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Set membership
    In,
    /// String prefix
    StrStarts,
    /// String suffix
    StrEnds,
    /// Substring
    Contains,
    /// Full-match regular expression
    Regex,
    /// String conversion
    Str,
    /// Namespace of a keyword
    Namespace,
}

impl Function {
    /// Symbol used by the store's datalog dialect
    pub fn symbol(self) -> &'static str {
        match self {
            Function::Eq => "=",
            Function::Ne => "not=",
            Function::Lt => "<",
            Function::Le => "<=",
            Function::Gt => ">",
            Function::Ge => ">=",
            Function::In => "contains?",
            Function::StrStarts => "clojure.string/starts-with?",
            Function::StrEnds => "clojure.string/ends-with?",
            Function::Contains => "clojure.string/includes?",
            Function::Regex => "re-matches",
            Function::Str => "str",
            Function::Namespace => "namespace",
        }
    }
}
