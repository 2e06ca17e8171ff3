//! Reference evaluator for compiled clauses.
//!
//! Runs a `QuerySpec`'s `where_` clauses against an in-memory set of
//! documents with plain datalog semantics, so tests can compare the rows a
//! compiled search matches instead of its clause shapes alone. The text-index
//! call is simulated with the same query syntax the compiler emits.

use metasearch_query::ir::{Clause, Expression, Function, Pattern, TextScope, TextSearchPattern};
use metasearch_query::pattern::{Literal, Term, TriplePattern};
use metasearch_query::{QuerySpec, VarId};
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// A value held by a document attribute or bound to a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Reference to a document by id
    Doc(String),
    /// Constant
    Lit(Literal),
    /// Attribute keyword (bound by unscoped text-index calls)
    Attr(String),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::Lit(Literal::string(s))
    }

    fn text(&self) -> Option<String> {
        match self {
            Value::Doc(id) => Some(id.clone()),
            Value::Attr(a) => Some(a.clone()),
            Value::Lit(Literal::String(s)) => Some(s.to_string()),
            Value::Lit(Literal::Long(l)) => Some(l.to_string()),
            Value::Lit(Literal::Double(d)) => Some(d.to_string()),
            Value::Lit(Literal::Bool(b)) => Some(b.to_string()),
            Value::Lit(Literal::Date(d)) => Some(d.to_rfc3339()),
        }
    }
}

/// One stored document: multi-valued attributes in insertion order.
#[derive(Debug, Clone)]
pub struct Doc {
    pub id: String,
    pub attrs: Vec<(String, Value)>,
}

impl Doc {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            attrs: Vec::new(),
        }
    }

    pub fn with(mut self, attr: &str, value: Value) -> Self {
        self.attrs.push((attr.to_string(), value));
        self
    }
}

type Binding = BTreeMap<VarId, Value>;

/// In-memory document store.
#[derive(Debug, Clone, Default)]
pub struct Store {
    docs: Vec<Doc>,
}

impl Store {
    pub fn new(docs: Vec<Doc>) -> Self {
        Self { docs }
    }

    pub fn ids(&self) -> BTreeSet<String> {
        self.docs.iter().map(|d| d.id.clone()).collect()
    }

    /// Ids of documents for which the query's clauses are satisfiable with
    /// the row variable (`find[0]`) bound to that document.
    pub fn rows(&self, spec: &QuerySpec) -> BTreeSet<String> {
        self.matching(&spec.where_, spec.find[0])
    }

    pub fn matching(&self, clauses: &[Clause], row: VarId) -> BTreeSet<String> {
        let seeds = self
            .docs
            .iter()
            .map(|d| Binding::from([(row, Value::Doc(d.id.clone()))]))
            .collect();
        self.eval_all(clauses, seeds)
            .into_iter()
            .filter_map(|b| match b.get(&row) {
                Some(Value::Doc(id)) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    fn eval_all(&self, clauses: &[Clause], input: Vec<Binding>) -> Vec<Binding> {
        clauses
            .iter()
            .fold(input, |acc, clause| self.eval(clause, acc))
    }

    fn eval(&self, clause: &Clause, input: Vec<Binding>) -> Vec<Binding> {
        match clause {
            Clause::Pattern(Pattern::Triple(tp)) => input
                .iter()
                .flat_map(|b| self.match_triple(tp, b))
                .collect(),
            Clause::Pattern(Pattern::TextSearch(ts)) => input
                .iter()
                .flat_map(|b| self.match_text(ts, b))
                .collect(),
            Clause::Pattern(Pattern::Rule(call)) => {
                panic!("rule `{}` is not supported by the test evaluator", call.name)
            }
            Clause::Predicate(expr) => input
                .into_iter()
                .filter(|b| eval_expr(expr, b) == Some(Value::Lit(Literal::Bool(true))))
                .collect(),
            Clause::Negation { join, body } => input
                .into_iter()
                .filter(|b| self.eval_all(body, vec![project(b, join)]).is_empty())
                .collect(),
            Clause::Disjunction { join, branches } => {
                let mut out = Vec::new();
                for b in input {
                    let seed = project(&b, join);
                    for branch in branches {
                        for r in self.eval(branch, vec![seed.clone()]) {
                            let mut merged = b.clone();
                            for j in join {
                                if let Some(v) = r.get(j) {
                                    merged.insert(*j, v.clone());
                                }
                            }
                            if !out.contains(&merged) {
                                out.push(merged);
                            }
                        }
                    }
                }
                out
            }
            Clause::Conjunction(inner) => self.eval_all(inner, input),
        }
    }

    fn candidates<'s>(&'s self, term: &Term, b: &Binding) -> Vec<&'s Doc> {
        let wanted = match term {
            Term::Var(v) => match b.get(v) {
                Some(Value::Doc(id)) => Some(id.clone()),
                Some(_) => return Vec::new(),
                None => None,
            },
            Term::Ref(id) => Some(id.to_string()),
            Term::Value(_) => return Vec::new(),
        };
        self.docs
            .iter()
            .filter(|d| wanted.as_ref().map_or(true, |id| &d.id == id))
            .collect()
    }

    fn match_triple(&self, tp: &TriplePattern, b: &Binding) -> Vec<Binding> {
        let mut out = Vec::new();
        for doc in self.candidates(&tp.s, b) {
            for (attr, value) in &doc.attrs {
                if attr.as_str() != &*tp.attr {
                    continue;
                }
                let Some(bound) = bind_term(&tp.s, Value::Doc(doc.id.clone()), b.clone()) else {
                    continue;
                };
                if let Some(bound) = bind_term(&tp.o, value.clone(), bound) {
                    out.push(bound);
                }
            }
        }
        out
    }

    fn match_text(&self, ts: &TextSearchPattern, b: &Binding) -> Vec<Binding> {
        let mut out = Vec::new();
        for doc in self.candidates(&Term::Var(ts.row_var), b) {
            for (attr, value) in &doc.attrs {
                if let TextScope::Attribute(scoped) = &ts.scope {
                    if attr.as_str() != &**scoped {
                        continue;
                    }
                }
                let Value::Lit(Literal::String(s)) = value else {
                    continue;
                };
                if !index_matches(&ts.query, ts.case_sensitive, s) {
                    continue;
                }
                let mut bound = Some(b.clone());
                bound = bound.and_then(|x| bind_var(ts.row_var, Value::Doc(doc.id.clone()), x));
                bound = bound.and_then(|x| bind_var(ts.value_var, value.clone(), x));
                if let Some(a) = ts.attr_var {
                    bound = bound.and_then(|x| bind_var(a, Value::Attr(attr.clone()), x));
                }
                out.extend(bound);
            }
        }
        out
    }
}

fn project(b: &Binding, join: &[VarId]) -> Binding {
    join.iter()
        .filter_map(|v| b.get(v).map(|val| (*v, val.clone())))
        .collect()
}

fn bind_var(var: VarId, value: Value, mut b: Binding) -> Option<Binding> {
    match b.get(&var) {
        Some(existing) if *existing != value => None,
        Some(_) => Some(b),
        None => {
            b.insert(var, value);
            Some(b)
        }
    }
}

fn bind_term(term: &Term, value: Value, b: Binding) -> Option<Binding> {
    match term {
        Term::Var(v) => bind_var(*v, value, b),
        Term::Ref(id) => (value == Value::Doc(id.to_string())).then_some(b),
        Term::Value(lit) => (value == Value::Lit(lit.clone())).then_some(b),
    }
}

// ============================================================================
// Simulated text index
// ============================================================================

fn unescape(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn index_matches(query: &str, case_sensitive: bool, value: &str) -> bool {
    let fold = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let value = fold(value);

    if query.len() >= 2 && query.starts_with('/') && query.ends_with('/') {
        let body = query[1..query.len() - 1].replace("\\/", "/");
        let flags = if case_sensitive { "" } else { "(?i)" };
        return Regex::new(&format!("^{flags}(?:{body})$"))
            .map(|re| re.is_match(&value))
            .unwrap_or(false);
    }
    if query.len() >= 2 && query.starts_with('"') && query.ends_with('"') {
        return fold(&unescape(&query[1..query.len() - 1])) == value;
    }

    let leading = query.starts_with('*');
    let trailing = query.ends_with('*') && !query.ends_with("\\*");
    let start = usize::from(leading);
    let end = query.len() - usize::from(trailing);
    let core = fold(&unescape(&query[start..end.max(start)]));
    match (leading, trailing) {
        (true, true) => value.contains(&core),
        (false, true) => value.starts_with(&core),
        (true, false) => value.ends_with(&core),
        (false, false) => value == core,
    }
}

// ============================================================================
// Predicates
// ============================================================================

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Lit(Literal::Long(x)), Value::Lit(Literal::Long(y))) => Some(x.cmp(y)),
        (Value::Lit(Literal::Long(x)), Value::Lit(Literal::Double(y))) => (*x as f64).partial_cmp(y),
        (Value::Lit(Literal::Double(x)), Value::Lit(Literal::Long(y))) => x.partial_cmp(&(*y as f64)),
        (Value::Lit(Literal::Double(x)), Value::Lit(Literal::Double(y))) => x.partial_cmp(y),
        (Value::Lit(Literal::Date(x)), Value::Lit(Literal::Date(y))) => Some(x.cmp(y)),
        (Value::Lit(Literal::String(x)), Value::Lit(Literal::String(y))) => Some(x.cmp(y)),
        _ => None,
    }
}

fn truth(b: bool) -> Option<Value> {
    Some(Value::Lit(Literal::Bool(b)))
}

fn eval_expr(expr: &Expression, b: &Binding) -> Option<Value> {
    match expr {
        Expression::Var(v) => b.get(v).cloned(),
        Expression::Const(lit) => Some(Value::Lit(lit.clone())),
        Expression::Set(_) => None,
        Expression::Call { func, args } => {
            if *func == Function::In {
                let (Expression::Set(items), Some(value)) = (&args[0], eval_expr(&args[1], b)) else {
                    return None;
                };
                return truth(items.iter().any(|i| Value::Lit(i.clone()) == value));
            }
            let values: Vec<Value> = args
                .iter()
                .map(|a| eval_expr(a, b))
                .collect::<Option<_>>()?;
            match func {
                Function::Eq => truth(values[0] == values[1]),
                Function::Ne => truth(values[0] != values[1]),
                Function::Lt => truth(compare(&values[0], &values[1])? == Ordering::Less),
                Function::Le => truth(compare(&values[0], &values[1])? != Ordering::Greater),
                Function::Gt => truth(compare(&values[0], &values[1])? == Ordering::Greater),
                Function::Ge => truth(compare(&values[0], &values[1])? != Ordering::Less),
                Function::StrStarts => truth(values[0].text()?.starts_with(&values[1].text()?)),
                Function::StrEnds => truth(values[0].text()?.ends_with(&values[1].text()?)),
                Function::Contains => truth(values[0].text()?.contains(&values[1].text()?)),
                Function::Regex => {
                    let re = Regex::new(&format!("^(?:{})$", values[0].text()?)).ok()?;
                    truth(re.is_match(&values[1].text()?))
                }
                Function::Str => Some(Value::string(&values[0].text()?)),
                Function::Namespace => match &values[0] {
                    Value::Attr(a) => a.split_once('/').map(|(ns, _)| Value::string(ns)),
                    _ => None,
                },
                Function::In => None,
            }
        }
    }
}
