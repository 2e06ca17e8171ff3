//! Property condition compiler
//!
//! Turns a `SearchExpression` into clauses constraining the row variable.
//!
//! # Leaf conditions
//!
//! Header properties compile against their single attribute. Any other name
//! is resolved through the type system into qualified references `Q`:
//!
//! - `|Q| = 0`: nothing can match; always-false clause and a diagnostic
//! - `|Q| = 1`: clauses against that one attribute
//! - `|Q| > 1`: one text-index call across all variations when the condition
//!   can use the index, otherwise one clause set per reference OR-ed together
//!
//! # Groups
//!
//! ALL flattens into the enclosing clause list (explicit AND only when nested
//! in ANY), ANY becomes an `or-join` over the row variable, NONE a `not-join`.

use crate::context::CompileContext;
use crate::ir::{Clause, Expression, Function};
use crate::pattern::{Literal, TriplePattern};
use crate::search::{ComparisonOperator, MatchCriteria, PropertyCondition, SearchExpression, SearchGroup};
use crate::text;
use crate::type_system::{Namespace, TypeScope};
use crate::value::SearchValue;
use metasearch_vocab::diagnostics;

const COMPONENT: &str = "PropertyConditionCompiler";

/// Compiles search expressions into clauses over `ctx.row`
pub struct ConditionCompiler<'c, 'a> {
    ctx: &'c mut CompileContext<'a>,
}

impl<'c, 'a> ConditionCompiler<'c, 'a> {
    /// Create a compiler over the given context
    pub fn new(ctx: &'c mut CompileContext<'a>) -> Self {
        Self { ctx }
    }

    /// Compile an expression
    ///
    /// Returns None when the expression contributes no clause: an empty or
    /// unrecognized group, or a condition that could not be evaluated.
    pub fn compile(
        &mut self,
        expression: &SearchExpression,
        namespace: &Namespace,
        scope: &TypeScope,
    ) -> Option<Vec<Clause>> {
        let span = tracing::debug_span!("compile_conditions", namespace = %namespace, scope_types = scope.len());
        let _guard = span.enter();
        self.compile_nested(expression, namespace, scope, None)
    }

    fn compile_nested(
        &mut self,
        expression: &SearchExpression,
        namespace: &Namespace,
        scope: &TypeScope,
        parent: Option<MatchCriteria>,
    ) -> Option<Vec<Clause>> {
        match expression {
            SearchExpression::Condition(condition) => self.compile_condition(condition, namespace, scope),
            SearchExpression::Group(group) => self.compile_group(group, namespace, scope, parent),
        }
    }

    fn compile_group(
        &mut self,
        group: &SearchGroup,
        namespace: &Namespace,
        scope: &TypeScope,
        parent: Option<MatchCriteria>,
    ) -> Option<Vec<Clause>> {
        let children: Vec<Vec<Clause>> = group
            .conditions
            .iter()
            .filter_map(|child| self.compile_nested(child, namespace, scope, Some(group.match_criteria)))
            .filter(|clauses| !clauses.is_empty())
            .collect();
        self.combine(group.match_criteria, children, parent)
    }

    /// Combine compiled child clause sets under a match criteria
    ///
    /// `parent` is the criteria of the enclosing group, if any.
    pub fn combine(
        &mut self,
        criteria: MatchCriteria,
        mut children: Vec<Vec<Clause>>,
        parent: Option<MatchCriteria>,
    ) -> Option<Vec<Clause>> {
        if children.is_empty() && criteria != MatchCriteria::Unrecognized {
            return None;
        }
        let row = self.ctx.row;
        match criteria {
            MatchCriteria::All => {
                let flattened: Vec<Clause> = children.into_iter().flatten().collect();
                if parent == Some(MatchCriteria::Any) && flattened.len() > 1 {
                    Some(vec![Clause::Conjunction(flattened)])
                } else {
                    Some(flattened)
                }
            }
            MatchCriteria::Any => {
                if children.len() == 1 {
                    children.pop()
                } else {
                    Some(vec![Clause::or_join(
                        vec![row],
                        children.into_iter().map(Clause::group).collect(),
                    )])
                }
            }
            MatchCriteria::None => {
                let body = if children.len() == 1 {
                    children.pop().unwrap_or_default()
                } else {
                    vec![Clause::or_join(
                        vec![row],
                        children.into_iter().map(Clause::group).collect(),
                    )]
                };
                Some(vec![Clause::not_join(vec![row], body)])
            }
            MatchCriteria::Unrecognized => {
                self.ctx.problem(
                    COMPONENT,
                    "combine",
                    diagnostics::UNKNOWN_MATCH_CRITERIA,
                    format!("group of {} condition(s) skipped", children.len()),
                );
                None
            }
        }
    }

    fn compile_condition(
        &mut self,
        condition: &PropertyCondition,
        namespace: &Namespace,
        scope: &TypeScope,
    ) -> Option<Vec<Clause>> {
        let name = condition.property.as_str();
        let value = &condition.value;
        // EQ / NEQ against null are null checks
        let operator = match condition.operator {
            ComparisonOperator::Eq if value.is_null() => ComparisonOperator::IsNull,
            ComparisonOperator::Neq if value.is_null() => ComparisonOperator::NotNull,
            other => other,
        };
        if operator == ComparisonOperator::MatchesPattern && value.as_str().is_none() {
            self.ctx.problem(
                COMPONENT,
                "compile_condition",
                diagnostics::NON_STRING_PATTERN,
                format!("pattern for `{name}` is not a string: {value:?}"),
            );
            return None;
        }
        if self.ctx.types.is_builtin_header_property(name) {
            tracing::trace!(property = name, "header property");
            return self.compile_single(name, operator, value);
        }

        let restricted;
        let scope = match namespace
            .classification_name()
            .and_then(|c| self.ctx.types.classification_type(c))
        {
            Some(declaring) => {
                restricted = scope.restrict_to(&declaring);
                &restricted
            }
            None => scope,
        };

        let refs = self
            .ctx
            .types
            .resolve_property_references(name, namespace, scope, Some(value));
        let attributes: Vec<String> = refs
            .iter()
            .map(|r| self.ctx.types.property_ref(*r).attribute.to_string())
            .collect();

        match attributes.as_slice() {
            [] => {
                self.ctx.problem(
                    COMPONENT,
                    "compile_condition",
                    diagnostics::UNKNOWN_PROPERTY,
                    format!("property `{name}` has no variation in {namespace} for {scope:?}"),
                );
                Some(vec![Clause::never()])
            }
            [attribute] => self.compile_single(attribute, operator, value),
            _ => self.compile_variations(name, operator, value, namespace, &attributes),
        }
    }

    fn compile_variations(
        &mut self,
        name: &str,
        operator: ComparisonOperator,
        value: &SearchValue,
        namespace: &Namespace,
        attributes: &[String],
    ) -> Option<Vec<Clause>> {
        let row = self.ctx.row;

        if operator == ComparisonOperator::IsNull {
            let v = self.ctx.fresh("v");
            let present = attributes
                .iter()
                .map(|attr| Clause::triple(TriplePattern::bind(row, attr.as_str(), v)))
                .collect();
            return Some(vec![Clause::not_join(
                vec![row],
                vec![Clause::or_join(vec![row], present)],
            )]);
        }

        if self.ctx.options.text_index {
            if let Some(shape) = text::index_shape(operator, value) {
                if let Some(clauses) = text::compile_variations(self.ctx, namespace, name, &shape) {
                    return Some(clauses);
                }
            }
        }

        let count = attributes.len();
        if count >= self.ctx.options.variation_warning_threshold {
            tracing::warn!(
                property = name,
                variations = count,
                "expanding condition over every property variation"
            );
        } else {
            tracing::debug!(property = name, variations = count, "fallback OR-expansion");
        }

        let mut sets = Vec::with_capacity(count);
        for attribute in attributes {
            // Failures depend on the value, not the attribute: stop at the first.
            sets.push(self.compile_single(attribute, operator, value)?);
        }
        if sets.len() == 1 {
            return sets.pop();
        }
        Some(vec![Clause::or_join(
            vec![row],
            sets.into_iter().map(Clause::group).collect(),
        )])
    }

    /// Clauses for one condition against one known attribute
    fn compile_single(
        &mut self,
        attribute: &str,
        operator: ComparisonOperator,
        value: &SearchValue,
    ) -> Option<Vec<Clause>> {
        let row = self.ctx.row;
        match operator {
            ComparisonOperator::MatchesPattern => text::compile_text(self.ctx, attribute, operator, value),
            ComparisonOperator::Eq | ComparisonOperator::Neq if value.as_str().is_some() => {
                text::compile_text(self.ctx, attribute, operator, value)
            }
            ComparisonOperator::Eq => {
                let lit = self.scalar(attribute, operator, value)?;
                Some(vec![Clause::triple(TriplePattern::value(row, attribute, lit))])
            }
            ComparisonOperator::Neq
            | ComparisonOperator::Gt
            | ComparisonOperator::Gte
            | ComparisonOperator::Lt
            | ComparisonOperator::Lte => {
                let lit = self.scalar(attribute, operator, value)?;
                let func = match operator {
                    ComparisonOperator::Neq => Function::Ne,
                    ComparisonOperator::Gt => Function::Gt,
                    ComparisonOperator::Gte => Function::Ge,
                    ComparisonOperator::Lt => Function::Lt,
                    _ => Function::Le,
                };
                let v = self.ctx.fresh("v");
                Some(vec![
                    Clause::triple(TriplePattern::bind(row, attribute, v)),
                    Clause::predicate(Expression::compare(func, v, lit)),
                ])
            }
            ComparisonOperator::NotNull => {
                let v = self.ctx.fresh("v");
                Some(vec![Clause::triple(TriplePattern::bind(row, attribute, v))])
            }
            ComparisonOperator::IsNull => {
                let v = self.ctx.fresh("v");
                Some(vec![Clause::not_join(
                    vec![row],
                    vec![Clause::triple(TriplePattern::bind(row, attribute, v))],
                )])
            }
            ComparisonOperator::InSet => {
                let mut literals = Vec::new();
                for element in value.elements() {
                    literals.push(self.scalar(attribute, operator, element)?);
                }
                match literals.len() {
                    0 => Some(vec![Clause::never()]),
                    1 => {
                        let lit = literals.pop()?;
                        Some(vec![Clause::triple(TriplePattern::value(row, attribute, lit))])
                    }
                    _ => {
                        let v = self.ctx.fresh("v");
                        Some(vec![
                            Clause::triple(TriplePattern::bind(row, attribute, v)),
                            Clause::predicate(Expression::in_set(v, literals)),
                        ])
                    }
                }
            }
            ComparisonOperator::Unrecognized => {
                self.ctx.problem(
                    COMPONENT,
                    "compile_single",
                    diagnostics::UNKNOWN_OPERATOR,
                    format!("condition on `{attribute}` skipped"),
                );
                None
            }
        }
    }

    fn scalar(&self, attribute: &str, operator: ComparisonOperator, value: &SearchValue) -> Option<Literal> {
        let lit = Literal::from_search_value(value);
        if lit.is_none() {
            self.ctx.problem(
                COMPONENT,
                "compile_single",
                diagnostics::INVALID_VALUE,
                format!("{operator} on `{attribute}` cannot use {value:?}"),
            );
        }
        lit
    }
}
