//! EDN rendering of compiled queries
//!
//! Produces the query as the store's datalog dialect spells it, for logging
//! and inspection:
//!
//! ```text
//! {:find [?e]
//!  :where [[?e :currentStatus ?status]
//!          [(not= ?status 99)]
//!          (or-join [?e]
//!            [?e :entityProperties/Asset.name "Inventory"]
//!            [?e :entityProperties/GlossaryTerm.name "Inventory"])]}
//! ```

use crate::assembly::QuerySpec;
use crate::ir::{Clause, Expression, Function, Pattern, Rule, TextScope, TextSearchPattern};
use crate::pattern::{Literal, Term, TriplePattern};
use crate::var_registry::{VarId, VarRegistry};
use chrono::SecondsFormat;
use std::fmt::Write;

/// Render a whole query
pub fn render_query(spec: &QuerySpec) -> String {
    let vars = &spec.vars;
    let mut out = String::new();

    out.push_str("{:find ");
    out.push_str(&render_vars(vars, &spec.find));

    out.push_str("\n :where [");
    for (i, clause) in spec.where_.iter().enumerate() {
        if i > 0 {
            out.push_str("\n         ");
        }
        out.push_str(&render_clause(vars, clause));
    }
    out.push(']');

    if !spec.rules.is_empty() {
        out.push_str("\n :rules [");
        for (i, rule) in spec.rules.iter().enumerate() {
            if i > 0 {
                out.push_str("\n         ");
            }
            out.push_str(&render_rule(vars, rule));
        }
        out.push(']');
    }

    if !spec.order_by.is_empty() {
        let keys: Vec<String> = spec
            .order_by
            .iter()
            .map(|s| format!("[{} {}]", vars.name(s.var), s.direction.keyword()))
            .collect();
        let _ = write!(out, "\n :order-by [{}]", keys.join(" "));
    }
    if let Some(offset) = spec.offset {
        let _ = write!(out, "\n :offset {offset}");
    }
    if let Some(limit) = spec.limit {
        let _ = write!(out, "\n :limit {limit}");
    }
    out.push('}');
    out
}

/// Render one clause
pub fn render_clause(vars: &VarRegistry, clause: &Clause) -> String {
    match clause {
        Clause::Pattern(Pattern::Triple(tp)) => render_triple(vars, tp),
        Clause::Pattern(Pattern::TextSearch(ts)) => render_text_search(vars, ts),
        Clause::Pattern(Pattern::Rule(call)) => {
            let args: Vec<String> = call.args.iter().map(|t| render_term(vars, t)).collect();
            if args.is_empty() {
                format!("({})", call.name)
            } else {
                format!("({} {})", call.name, args.join(" "))
            }
        }
        Clause::Predicate(expr) => format!("[{}]", render_expr(vars, expr)),
        Clause::Negation { join, body } => {
            format!("(not-join {} {})", render_vars(vars, join), render_list(vars, body))
        }
        Clause::Disjunction { join, branches } => {
            format!("(or-join {} {})", render_vars(vars, join), render_list(vars, branches))
        }
        Clause::Conjunction(inner) => format!("(and {})", render_list(vars, inner)),
    }
}

fn render_list(vars: &VarRegistry, clauses: &[Clause]) -> String {
    clauses
        .iter()
        .map(|c| render_clause(vars, c))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_rule(vars: &VarRegistry, rule: &Rule) -> String {
    let params: Vec<&str> = rule.params.iter().map(|v| vars.name(*v)).collect();
    format!("[({} {}) {}]", rule.name, params.join(" "), render_list(vars, &rule.body))
}

fn render_vars(vars: &VarRegistry, ids: &[VarId]) -> String {
    let names: Vec<&str> = ids.iter().map(|v| vars.name(*v)).collect();
    format!("[{}]", names.join(" "))
}

fn render_triple(vars: &VarRegistry, tp: &TriplePattern) -> String {
    format!(
        "[{} :{} {}]",
        render_term(vars, &tp.s),
        tp.attr,
        render_term(vars, &tp.o)
    )
}

fn render_text_search(vars: &VarRegistry, ts: &TextSearchPattern) -> String {
    let opts = if ts.case_sensitive {
        String::new()
    } else {
        " {:case-sensitive? false}".to_string()
    };
    match &ts.scope {
        TextScope::Attribute(attr) => format!(
            "[(text-search :{} {}{}) [[{} {}]]]",
            attr,
            render_string(&ts.query),
            opts,
            vars.name(ts.row_var),
            vars.name(ts.value_var)
        ),
        TextScope::AnyAttribute => {
            let attr = ts.attr_var.map_or("_", |a| vars.name(a));
            format!(
                "[(wildcard-text-search {}{}) [[{} {} {}]]]",
                render_string(&ts.query),
                opts,
                vars.name(ts.row_var),
                vars.name(ts.value_var),
                attr
            )
        }
    }
}

fn render_term(vars: &VarRegistry, term: &Term) -> String {
    match term {
        Term::Var(v) => vars.name(*v).to_string(),
        Term::Ref(id) => render_string(id),
        Term::Value(lit) => render_literal(lit),
    }
}

fn render_expr(vars: &VarRegistry, expr: &Expression) -> String {
    match expr {
        Expression::Var(v) => vars.name(*v).to_string(),
        Expression::Const(lit) => render_literal(lit),
        Expression::Set(items) => {
            let items: Vec<String> = items.iter().map(render_literal).collect();
            format!("#{{{}}}", items.join(" "))
        }
        Expression::Call {
            func: Function::Regex,
            args,
        } => {
            // first argument is the pattern, rendered as a regex literal
            let mut parts = vec![Function::Regex.symbol().to_string()];
            for (i, arg) in args.iter().enumerate() {
                match (i, arg) {
                    (0, Expression::Const(Literal::String(p))) => {
                        parts.push(format!("#\"{}\"", p.replace('"', "\\\"")))
                    }
                    _ => parts.push(render_expr(vars, arg)),
                }
            }
            format!("({})", parts.join(" "))
        }
        Expression::Call { func, args } => {
            let mut parts = vec![func.symbol().to_string()];
            parts.extend(args.iter().map(|a| render_expr(vars, a)));
            format!("({})", parts.join(" "))
        }
    }
}

fn render_literal(lit: &Literal) -> String {
    match lit {
        Literal::Bool(b) => b.to_string(),
        Literal::Long(l) => l.to_string(),
        Literal::Double(d) => format!("{d:?}"),
        Literal::String(s) => render_string(s),
        Literal::Date(d) => format!(
            "#inst {}",
            render_string(&d.to_rfc3339_opts(SecondsFormat::Millis, true))
        ),
    }
}

fn render_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
