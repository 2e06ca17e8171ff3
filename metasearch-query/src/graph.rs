//! Graph query builder
//!
//! Relationship searches bind a second variable, `?r`, to the relationship
//! document. Its `entityProxies` attribute lists both endpoint entities; the
//! builder joins it to the entity row variable and can narrow it to one
//! known entity. Everything else comes from the wrapped `QueryAssembly`.

use crate::assembly::{membership_clauses, status_clauses, subtype_clauses, QueryAssembly, QuerySpec};
use crate::condition::ConditionCompiler;
use crate::diagnostics::DiagnosticSink;
use crate::ir::Clause;
use crate::options::CompilerOptions;
use crate::pattern::{Literal, Term, TriplePattern};
use crate::search::{InstanceStatus, SearchExpression};
use crate::type_system::{Namespace, TypeScope, TypeSystem};
use crate::var_registry::VarId;
use metasearch_vocab::{attr, diagnostics};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Name of the relationship variable
pub const RELATIONSHIP_VAR: &str = "?r";

/// Query assembly for relationship traversal
pub struct GraphQueryBuilder<'a> {
    assembly: QueryAssembly<'a>,
    relationship: VarId,
}

impl<'a> GraphQueryBuilder<'a> {
    /// Create a builder projecting the relationship and entity variables
    pub fn new(types: &'a dyn TypeSystem, options: &'a CompilerOptions) -> Self {
        let mut assembly = QueryAssembly::new(types, options);
        let relationship = assembly.var(RELATIONSHIP_VAR);
        assembly.add_find(relationship);
        Self {
            assembly,
            relationship,
        }
    }

    /// Report problems to `sink` instead of the tracing sink
    pub fn with_diagnostics(self, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            assembly: self.assembly.with_diagnostics(sink),
            relationship: self.relationship,
        }
    }

    /// Variable bound to the relationship document
    pub fn relationship_var(&self) -> VarId {
        self.relationship
    }

    /// Join the relationship's endpoints to the entity row
    ///
    /// With `entity`, only relationships attached to that entity qualify.
    pub fn add_endpoint_clause(&mut self, entity: Option<&str>) {
        let rel = self.relationship;
        let row = self.assembly.row_var();
        self.assembly.add_clause(Clause::triple(TriplePattern::new(
            Term::Var(rel),
            attr::ENTITY_PROXIES,
            Term::Var(row),
        )));
        if let Some(guid) = entity {
            self.assembly.add_clause(Clause::triple(TriplePattern::new(
                Term::Var(rel),
                attr::ENTITY_PROXIES,
                Term::Ref(Arc::from(guid)),
            )));
        }
    }

    /// Restrict relationships to any of the given type GUIDs
    pub fn add_relationship_type_filter(&mut self, guids: &[Arc<str>]) {
        let rel = self.relationship;
        let clauses = subtype_clauses(self.assembly.vars_mut(), rel, guids);
        self.assembly.add_clauses(clauses);
    }

    /// Restrict relationships to a named type and its subtypes
    pub fn add_relationship_type_filter_by_name(&mut self, type_name: &str) {
        let guids = self.assembly.types().subtype_guids(type_name);
        if guids.is_empty() {
            self.assembly.problem(
                "add_relationship_type_filter_by_name",
                diagnostics::UNKNOWN_TYPE,
                format!("relationship type `{type_name}`"),
            );
            self.assembly.add_clause(Clause::never());
            return;
        }
        self.add_relationship_type_filter(&guids);
    }

    /// Restrict relationships by lifecycle status (DELETED excluded by default)
    pub fn add_relationship_status_filter(&mut self, statuses: Option<&[InstanceStatus]>) {
        let rel = self.relationship;
        let clauses = status_clauses(self.assembly.vars_mut(), rel, statuses);
        self.assembly.add_clauses(clauses);
    }

    /// Compile conditions on relationship properties
    pub fn add_relationship_conditions(&mut self, expression: &SearchExpression, scope: &TypeScope) {
        let rel = self.relationship;
        let compiled = {
            let mut ctx = self.assembly.context_for(rel);
            ConditionCompiler::new(&mut ctx).compile(expression, &Namespace::Relationship, scope)
        };
        if let Some(clauses) = compiled {
            self.assembly.add_clauses(clauses);
        }
    }

    /// Restrict entities to those carrying any of the named classifications
    pub fn add_classification_filter(&mut self, names: &[&str]) {
        let row = self.assembly.row_var();
        let clauses = match names {
            [] => return,
            [name] => vec![Clause::triple(TriplePattern::value(
                row,
                attr::CLASSIFICATIONS,
                Literal::string(name),
            ))],
            _ => membership_clauses(
                self.assembly.vars_mut(),
                "classification",
                row,
                attr::CLASSIFICATIONS,
                names.iter().map(Literal::string).collect(),
            ),
        };
        self.assembly.add_clauses(clauses);
    }

    /// Finish the query
    pub fn compile(self) -> QuerySpec {
        self.assembly.compile()
    }
}

impl<'a> Deref for GraphQueryBuilder<'a> {
    type Target = QueryAssembly<'a>;

    fn deref(&self) -> &Self::Target {
        &self.assembly
    }
}

impl<'a> DerefMut for GraphQueryBuilder<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.assembly
    }
}
