//! Text condition compiler
//!
//! Decides how a string comparison is evaluated. Patterns are regular
//! expressions (with `\Q...\E` literal quoting); their shape decides the path:
//!
//! | shape | example | no index | text index |
//! |---|---|---|---|
//! | exact | `Inventory` | `[?e attr "Inventory"]` | same (single attribute) |
//! | prefix | `Inv.*` | `starts-with?` | `Inv*` |
//! | suffix | `.*tory` | `ends-with?` | `*tory` |
//! | contains | `.*vent.*` | `includes?` | `*vent*` |
//! | other | `(?i)inv.*`, `^(a\|b)$` | `re-matches` | `/.../` when raw patterns are enabled |
//!
//! A plain `.` never matches a line break, so the wildcard shapes above only
//! accept single-line values; `(?s)` lifts that restriction.
//!
//! The index is only ever a pre-filter: every index call is followed by
//! predicates re-checking the matched value against the requested shape.

use crate::context::CompileContext;
use crate::error::Result;
use crate::ir::{Clause, Expression, Function, Pattern, TextScope, TextSearchPattern};
use crate::pattern::{Literal, TriplePattern};
use crate::search::ComparisonOperator;
use crate::type_system::Namespace;
use crate::value::SearchValue;
use crate::var_registry::VarId;
use metasearch_vocab::diagnostics;
use regex_syntax::hir::{Dot, Hir, HirKind};
use regex_syntax::Parser;
use std::sync::Arc;

const COMPONENT: &str = "TextConditionCompiler";

/// Flag prefix marking a caseless pattern
const CASELESS_FLAG: &str = "(?i)";

// ============================================================================
// Shape classification
// ============================================================================

/// Shape of a string pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextShape {
    /// Matches exactly this string
    Exact(String),
    /// Starts with this string
    Prefix(String),
    /// Ends with this string
    Suffix(String),
    /// Contains this string
    Contains(String),
    /// Wildcard shape whose `.*` stops at line breaks: the value holds no `\n`
    SingleLine(Box<TextShape>),
    /// Any other regular expression (quoting already expanded)
    Pattern(String),
}

impl TextShape {
    /// Classify a pattern string
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn classify(pattern: &str) -> Result<TextShape> {
        let normalized = expand_quoted(pattern);
        let hir = Parser::new().parse(&normalized)?;
        Ok(literal_shape(&hir).unwrap_or(TextShape::Pattern(normalized)))
    }

    /// Index-native query for this shape, if the index can pre-filter it
    ///
    /// General patterns only qualify when `raw_patterns` is set.
    pub fn index_query(&self, raw_patterns: bool) -> Option<IndexQuery> {
        let (query, case_sensitive) = match self {
            TextShape::Exact(s) => (format!("\"{}\"", escape_index_phrase(s)), true),
            TextShape::Prefix(s) => (format!("{}*", escape_index_term(s)), true),
            TextShape::Suffix(s) => (format!("*{}", escape_index_term(s)), true),
            TextShape::Contains(s) => (format!("*{}*", escape_index_term(s)), true),
            TextShape::SingleLine(inner) => return inner.index_query(raw_patterns),
            TextShape::Pattern(p) if raw_patterns => match p.strip_prefix(CASELESS_FLAG) {
                Some(body) => (index_regex(body), false),
                None => (index_regex(p), true),
            },
            TextShape::Pattern(_) => return None,
        };
        Some(IndexQuery {
            query,
            case_sensitive,
        })
    }

    /// Clauses checking a bound string against this shape
    pub fn verifier(&self, value: VarId) -> Vec<Clause> {
        let expr = match self {
            TextShape::Exact(s) => Expression::eq(value, Literal::string(s)),
            TextShape::Prefix(s) => Expression::starts_with(Expression::Var(value), s),
            TextShape::Suffix(s) => Expression::ends_with(Expression::Var(value), s),
            TextShape::Contains(s) => Expression::contains(Expression::Var(value), s),
            TextShape::Pattern(p) => Expression::regex(value, p),
            TextShape::SingleLine(inner) => {
                let mut clauses = inner.verifier(value);
                clauses.push(Clause::not_join(
                    vec![value],
                    vec![Clause::predicate(Expression::contains(Expression::Var(value), "\n"))],
                ));
                return clauses;
            }
        };
        vec![Clause::predicate(expr)]
    }
}

/// Query handed to the text index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub query: String,
    pub case_sensitive: bool,
}

/// Rewrite `\Q...\E` quoted sections as escaped literals
///
/// An unterminated `\Q` quotes to the end of the pattern.
pub fn expand_quoted(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut quoted = String::new();
    let mut in_quote = false;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quote {
            if c == '\\' && chars.peek() == Some(&'E') {
                chars.next();
                out.push_str(&regex_syntax::escape(&quoted));
                quoted.clear();
                in_quote = false;
            } else {
                quoted.push(c);
            }
        } else if c == '\\' {
            match chars.next() {
                Some('Q') => in_quote = true,
                Some(next) => {
                    out.push(c);
                    out.push(next);
                }
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    if in_quote {
        out.push_str(&regex_syntax::escape(&quoted));
    }
    out
}

fn literal_shape(hir: &Hir) -> Option<TextShape> {
    match hir.kind() {
        HirKind::Empty => Some(TextShape::Exact(String::new())),
        HirKind::Literal(_) => literal_text(hir).map(TextShape::Exact),
        HirKind::Concat(parts) => match parts.as_slice() {
            [lit, any] if wildcard(any).is_some() => wildcard_shape(TextShape::Prefix, lit, &[any]),
            [any, lit] if wildcard(any).is_some() => wildcard_shape(TextShape::Suffix, lit, &[any]),
            [a, lit, b] if wildcard(a).is_some() && wildcard(b).is_some() => {
                wildcard_shape(TextShape::Contains, lit, &[a, b])
            }
            _ => None,
        },
        _ => None,
    }
}

/// Shape for `literal` framed by `wildcards`
///
/// Wildcards must agree on the `s` flag. Without it the whole value is a
/// single line, which a literal holding `\n` can never satisfy.
fn wildcard_shape(shape: fn(String) -> TextShape, lit: &Hir, wildcards: &[&Hir]) -> Option<TextShape> {
    let text = literal_text(lit)?;
    let dot_all: Vec<bool> = wildcards.iter().filter_map(|w| wildcard(w)).collect();
    if dot_all.iter().all(|d| *d) {
        Some(shape(text))
    } else if dot_all.iter().any(|d| *d) || text.contains('\n') {
        None
    } else {
        Some(TextShape::SingleLine(Box::new(shape(text))))
    }
}

fn literal_text(hir: &Hir) -> Option<String> {
    match hir.kind() {
        HirKind::Literal(lit) => std::str::from_utf8(&lit.0).ok().map(str::to_string),
        _ => None,
    }
}

/// `.*`: Some(true) when the `s` flag lets it cross line breaks
fn wildcard(hir: &Hir) -> Option<bool> {
    let HirKind::Repetition(rep) = hir.kind() else {
        return None;
    };
    if rep.min != 0 || rep.max.is_some() {
        return None;
    }
    if *rep.sub == Hir::dot(Dot::AnyChar) {
        Some(true)
    } else if *rep.sub == Hir::dot(Dot::AnyCharExceptLF) {
        Some(false)
    } else {
        None
    }
}

// ============================================================================
// Index query syntax
// ============================================================================

/// Escape a literal for use inside an index term or wildcard query
pub fn escape_index_term(s: &str) -> String {
    const SPECIAL: &[char] = &[
        '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|',
        '&', '/', ' ',
    ];
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a literal for use inside a quoted index phrase
pub fn escape_index_phrase(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn index_regex(pattern: &str) -> String {
    format!("/{}/", pattern.replace('/', "\\/"))
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile a string comparison against one known attribute
///
/// Handles EQ, NEQ and MATCHES_PATTERN; any other operator is reported and
/// produces no clause.
pub fn compile_text(
    ctx: &mut CompileContext<'_>,
    attribute: &str,
    operator: ComparisonOperator,
    value: &SearchValue,
) -> Option<Vec<Clause>> {
    let row = ctx.row;
    match operator {
        ComparisonOperator::Eq | ComparisonOperator::Neq => {
            let Some(s) = value.as_str() else {
                ctx.problem(
                    COMPONENT,
                    "compile_text",
                    diagnostics::INVALID_VALUE,
                    format!("{operator} on `{attribute}` needs a string value"),
                );
                return None;
            };
            if operator == ComparisonOperator::Eq {
                tracing::trace!(attribute, "text path: literal equality");
                Some(vec![Clause::triple(TriplePattern::value(
                    row,
                    attribute,
                    Literal::string(s),
                ))])
            } else {
                let v = ctx.fresh("v");
                Some(vec![
                    Clause::triple(TriplePattern::bind(row, attribute, v)),
                    Clause::predicate(Expression::ne(v, Literal::string(s))),
                ])
            }
        }
        ComparisonOperator::MatchesPattern => compile_pattern(ctx, attribute, value),
        other => {
            ctx.problem(
                COMPONENT,
                "compile_text",
                diagnostics::UNSUPPORTED_TEXT_OPERATOR,
                format!("{other} has no text form (`{attribute}`)"),
            );
            None
        }
    }
}

/// Compile MATCHES_PATTERN against one known attribute
pub fn compile_pattern(
    ctx: &mut CompileContext<'_>,
    attribute: &str,
    value: &SearchValue,
) -> Option<Vec<Clause>> {
    let shape = classify_value(ctx, "compile_pattern", attribute, value)?;
    let row = ctx.row;

    if let TextShape::Exact(s) = &shape {
        tracing::trace!(attribute, "text path: exact literal");
        return Some(vec![Clause::triple(TriplePattern::value(
            row,
            attribute,
            Literal::string(s),
        ))]);
    }

    if ctx.options.text_index {
        if let Some(query) = shape.index_query(ctx.options.raw_patterns_as_index_queries) {
            tracing::trace!(attribute, query = %query.query, "text path: index, single attribute");
            let v = ctx.fresh("v");
            return Some(vec![
                Clause::Pattern(Pattern::TextSearch(TextSearchPattern {
                    query: query.query,
                    case_sensitive: query.case_sensitive,
                    scope: TextScope::Attribute(Arc::from(attribute)),
                    row_var: row,
                    value_var: v,
                    attr_var: None,
                })),
            ]
            .into_iter()
            .chain(shape.verifier(v))
            .collect());
        }
    }

    tracing::trace!(attribute, shape = ?shape, "text path: string predicate");
    let v = ctx.fresh("v");
    let mut clauses = vec![Clause::triple(TriplePattern::bind(row, attribute, v))];
    clauses.extend(shape.verifier(v));
    Some(clauses)
}

/// Shape an index lookup would search for, if the condition can use one
///
/// Only EQ and MATCHES_PATTERN on string values qualify.
pub fn index_shape(operator: ComparisonOperator, value: &SearchValue) -> Option<TextShape> {
    let s = value.as_str()?;
    match operator {
        ComparisonOperator::Eq => Some(TextShape::Exact(s.to_string())),
        ComparisonOperator::MatchesPattern => TextShape::classify(s).ok(),
        _ => None,
    }
}

/// Index path across every variation of a property
///
/// One unscoped index call binds `(row, value, attribute)`; predicates keep
/// only attributes of `namespace` ending in `.<property>` and re-check the
/// value. Returns None if the shape cannot be expressed as an index query.
pub fn compile_variations(
    ctx: &mut CompileContext<'_>,
    namespace: &Namespace,
    property: &str,
    shape: &TextShape,
) -> Option<Vec<Clause>> {
    let query = shape.index_query(ctx.options.raw_patterns_as_index_queries)?;
    tracing::debug!(property, query = %query.query, "text path: index across variations");

    let row = ctx.row;
    let v = ctx.fresh("v");
    let a = ctx.fresh("a");
    let mut clauses = vec![
        Clause::Pattern(Pattern::TextSearch(TextSearchPattern {
            query: query.query,
            case_sensitive: query.case_sensitive,
            scope: TextScope::AnyAttribute,
            row_var: row,
            value_var: v,
            attr_var: Some(a),
        })),
        Clause::predicate(Expression::call(
            Function::Eq,
            vec![
                Expression::keyword_namespace(a),
                Expression::Const(Literal::string(namespace.prefix())),
            ],
        )),
        Clause::predicate(Expression::ends_with(
            Expression::str(a),
            &format!(".{property}"),
        )),
    ];
    clauses.extend(shape.verifier(v));
    Some(clauses)
}

fn classify_value(
    ctx: &CompileContext<'_>,
    method: &'static str,
    attribute: &str,
    value: &SearchValue,
) -> Option<TextShape> {
    let Some(pattern) = value.as_str() else {
        ctx.problem(
            COMPONENT,
            method,
            diagnostics::NON_STRING_PATTERN,
            format!("pattern for `{attribute}` is not a string: {value:?}"),
        );
        return None;
    };
    match TextShape::classify(pattern) {
        Ok(shape) => Some(shape),
        Err(err) => {
            ctx.problem(
                COMPONENT,
                method,
                diagnostics::INVALID_PATTERN,
                format!("`{pattern}` for `{attribute}`: {err}"),
            );
            None
        }
    }
}
