//! Query assembly
//!
//! `QueryAssembly` accumulates everything a compiled search needs: the
//! projection, the conjoined clause list, derivation rules, sort keys and
//! paging. Callers add filters and conditions in any order and finish with
//! `compile()`, which hands back the immutable `QuerySpec`.
//!
//! ```
//! use metasearch_query::{
//!     ComparisonOperator, CompilerOptions, Namespace, QueryAssembly, SearchExpression,
//!     SearchValue, SequencingOrder, TypeCatalog, TypeDef, TypeScope, PrimitiveKind,
//! };
//!
//! let catalog = TypeCatalog::new([
//!     TypeDef::entity("Asset", "g-asset").attribute("name", PrimitiveKind::String),
//! ])
//! .unwrap();
//! let options = CompilerOptions::default();
//!
//! let mut query = QueryAssembly::new(&catalog, &options);
//! query.add_type_filter_by_name("Asset");
//! query.add_status_filter(None);
//! query.add_conditions(
//!     &SearchExpression::condition("name", ComparisonOperator::Eq, SearchValue::string("Inventory")),
//!     &Namespace::Entity,
//!     &TypeScope::of(["Asset"]),
//! );
//! query.add_sequencing(SequencingOrder::CreationDateRecent, None, &Namespace::Entity, &TypeScope::unrestricted());
//! let spec = query.compile();
//! assert_eq!(spec.find.len(), 2);
//! ```

use crate::condition::ConditionCompiler;
use crate::context::CompileContext;
use crate::diagnostics::{DiagnosticSink, DEFAULT_SINK};
use crate::explain;
use crate::ir::{Clause, Expression, Rule};
use crate::options::CompilerOptions;
use crate::pattern::{Literal, TriplePattern};
use crate::search::{InstanceStatus, SearchClassifications, SearchExpression};
use crate::sort::{SequencingOrder, SortDirection, SortSpec};
use crate::type_system::{Namespace, TypeScope, TypeSystem};
use crate::var_registry::{VarId, VarRegistry};
use metasearch_vocab::{attr, diagnostics};
use std::sync::Arc;

const COMPONENT: &str = "QueryAssembly";

/// Name of the row variable
pub const ROW_VAR: &str = "?e";

// ============================================================================
// QuerySpec
// ============================================================================

/// A compiled search, ready to hand to the store
///
/// Built once by `QueryAssembly::compile` and consumed once by the executor.
#[derive(Debug)]
pub struct QuerySpec {
    /// Projected variables
    pub find: Vec<VarId>,
    /// Implicitly conjoined clauses
    pub where_: Vec<Clause>,
    /// Derivation rules referenced by the clauses
    pub rules: Vec<Rule>,
    /// Sort keys, most significant first
    pub order_by: Vec<SortSpec>,
    /// Rows to skip
    pub offset: Option<usize>,
    /// Maximum rows to return
    pub limit: Option<usize>,
    /// Variable names
    pub vars: VarRegistry,
}

impl QuerySpec {
    /// Render the query in the store's EDN syntax
    pub fn explain(&self) -> String {
        explain::render_query(self)
    }

    /// Check if any clause can never match
    pub fn has_never_clause(&self) -> bool {
        let mut found = false;
        for clause in &self.where_ {
            clause.walk(&mut |c| found |= c.is_never());
        }
        found
    }
}

// ============================================================================
// QueryAssembly
// ============================================================================

/// Builder for one compiled search
pub struct QueryAssembly<'a> {
    types: &'a dyn TypeSystem,
    options: &'a CompilerOptions,
    sink: &'a dyn DiagnosticSink,
    vars: VarRegistry,
    row: VarId,
    find: Vec<VarId>,
    clauses: Vec<Clause>,
    rules: Vec<Rule>,
    order_by: Vec<SortSpec>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl<'a> QueryAssembly<'a> {
    /// Create an assembly projecting the row variable
    pub fn new(types: &'a dyn TypeSystem, options: &'a CompilerOptions) -> Self {
        let mut vars = VarRegistry::new();
        let row = vars.get_or_insert(ROW_VAR);
        Self {
            types,
            options,
            sink: &DEFAULT_SINK,
            vars,
            row,
            find: vec![row],
            clauses: Vec::new(),
            rules: Vec::new(),
            order_by: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    /// Report problems to `sink` instead of the tracing sink
    pub fn with_diagnostics(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    /// Row variable every condition constrains
    pub fn row_var(&self) -> VarId {
        self.row
    }

    /// Clauses accumulated so far
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Type system the assembly resolves names against
    pub fn types(&self) -> &'a dyn TypeSystem {
        self.types
    }

    pub(crate) fn vars_mut(&mut self) -> &mut VarRegistry {
        &mut self.vars
    }

    /// Register a named variable
    pub fn var(&mut self, name: &str) -> VarId {
        self.vars.get_or_insert(name)
    }

    /// Context for compiling clauses over `row`
    pub(crate) fn context_for(&mut self, row: VarId) -> CompileContext<'_> {
        CompileContext::new(self.types, self.options, self.sink, &mut self.vars, row)
    }

    pub(crate) fn problem(&self, method: &'static str, code: &'static str, details: String) {
        self.sink.log_problem(crate::diagnostics::Problem {
            component: COMPONENT,
            method,
            code,
            details,
        });
    }

    // ------------------------------------------------------------------------
    // Raw mutators
    // ------------------------------------------------------------------------

    /// Append a clause
    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Append several clauses
    pub fn add_clauses(&mut self, clauses: impl IntoIterator<Item = Clause>) {
        self.clauses.extend(clauses);
    }

    /// Ship a derivation rule with the query
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Project an extra variable
    pub fn add_find(&mut self, var: VarId) {
        if !self.find.contains(&var) {
            self.find.push(var);
        }
    }

    /// Skip `offset` rows and return at most `limit`
    pub fn add_paging(&mut self, offset: Option<usize>, limit: Option<usize>) {
        self.offset = offset.filter(|o| *o > 0);
        self.limit = limit;
    }

    // ------------------------------------------------------------------------
    // Type, status and collection filters
    // ------------------------------------------------------------------------

    /// Restrict rows to instances of a type (or any of its subtypes)
    ///
    /// `type.guids` holds the GUID of the instance's type and every supertype.
    pub fn add_type_filter(&mut self, type_guid: &str) {
        let row = self.row;
        self.clauses.push(type_guid_clause(row, type_guid));
    }

    /// Restrict rows to instances whose types include one of `guids`
    ///
    /// An empty set adds no filter.
    pub fn add_subtype_filter(&mut self, guids: &[Arc<str>]) {
        let row = self.row;
        let clauses = subtype_clauses(&mut self.vars, row, guids);
        self.clauses.extend(clauses);
    }

    /// Restrict rows to a named type and its subtypes
    ///
    /// An unknown type name matches nothing.
    pub fn add_type_filter_by_name(&mut self, type_name: &str) {
        let guids = self.types.subtype_guids(type_name);
        if guids.is_empty() {
            self.problem(
                "add_type_filter_by_name",
                diagnostics::UNKNOWN_TYPE,
                format!("type `{type_name}`"),
            );
            self.clauses.push(Clause::never());
            return;
        }
        self.add_subtype_filter(&guids);
    }

    /// Restrict rows by lifecycle status
    ///
    /// No list (or an empty one) excludes DELETED instances.
    pub fn add_status_filter(&mut self, statuses: Option<&[InstanceStatus]>) {
        let row = self.row;
        let clauses = status_clauses(&mut self.vars, row, statuses);
        self.clauses.extend(clauses);
    }

    /// Restrict rows to one home metadata collection
    pub fn add_metadata_collection_filter(&mut self, collection_id: &str) {
        self.clauses.push(Clause::triple(TriplePattern::value(
            self.row,
            attr::METADATA_COLLECTION_ID,
            Literal::string(collection_id),
        )));
    }

    // ------------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------------

    /// Compile a search expression and append its clauses
    pub fn add_conditions(&mut self, expression: &SearchExpression, namespace: &Namespace, scope: &TypeScope) {
        let row = self.row;
        let mut ctx = self.context_for(row);
        if let Some(clauses) = ConditionCompiler::new(&mut ctx).compile(expression, namespace, scope) {
            self.clauses.extend(clauses);
        }
    }

    /// Compile classification sub-searches and append their combination
    ///
    /// Each classification contributes its presence on the row plus, when
    /// given, its property conditions in that classification's namespace.
    pub fn add_classification_conditions(&mut self, classifications: &SearchClassifications, scope: &TypeScope) {
        let _span = tracing::debug_span!(
            "add_classification_conditions",
            count = classifications.conditions.len()
        )
        .entered();

        let types = self.types;
        for condition in classifications
            .conditions
            .iter()
            .filter(|c| types.classification_type(&c.name).is_none())
        {
            self.problem(
                "add_classification_conditions",
                diagnostics::UNKNOWN_CLASSIFICATION,
                format!("classification `{}`", condition.name),
            );
        }

        let row = self.row;
        let mut ctx = self.context_for(row);
        let mut compiler = ConditionCompiler::new(&mut ctx);
        let mut children = Vec::with_capacity(classifications.conditions.len());
        for condition in &classifications.conditions {
            // properties of an unknown classification resolve to nothing
            let mut set = vec![Clause::triple(TriplePattern::value(
                row,
                attr::CLASSIFICATIONS,
                Literal::string(&condition.name),
            ))];
            if let Some(properties) = condition.properties.as_ref() {
                let namespace = Namespace::classification(&condition.name);
                if let Some(clauses) = compiler.compile(properties, &namespace, scope) {
                    set.extend(clauses);
                }
            }
            children.push(set);
        }
        if let Some(clauses) = compiler.combine(classifications.match_criteria, children, None) {
            self.clauses.extend(clauses);
        }
    }

    // ------------------------------------------------------------------------
    // Sequencing
    // ------------------------------------------------------------------------

    /// Add a sort key
    ///
    /// `property` names the sort property for the property orderings. Sorting
    /// on a property drops rows that do not carry it.
    pub fn add_sequencing(
        &mut self,
        order: SequencingOrder,
        property: Option<&str>,
        namespace: &Namespace,
        scope: &TypeScope,
    ) {
        let row = self.row;
        if order == SequencingOrder::Any {
            return;
        }
        if order == SequencingOrder::Guid {
            self.order_by.push(SortSpec::asc(row));
            return;
        }
        if let Some((attribute, direction)) = order.header_sort() {
            self.sort_on_attribute(attribute, direction);
            return;
        }

        let Some(direction) = order.property_direction() else {
            return;
        };
        let Some(name) = property else {
            self.problem(
                "add_sequencing",
                diagnostics::MISSING_SORT_PROPERTY,
                format!("{order:?} without a property name"),
            );
            return;
        };
        if self.types.is_builtin_header_property(name) {
            self.sort_on_attribute(name, direction);
            return;
        }

        let refs = self.types.resolve_property_references(name, namespace, scope, None);
        let attributes: Vec<Arc<str>> = refs
            .iter()
            .map(|r| self.types.property_ref(*r).attribute.clone())
            .collect();
        match attributes.as_slice() {
            [] => self.problem(
                "add_sequencing",
                diagnostics::UNKNOWN_SORT_PROPERTY,
                format!("property `{name}` has no variation in {namespace} for {scope:?}"),
            ),
            [attribute] => self.sort_on_attribute(attribute, direction),
            _ => {
                let sort = self.vars.fresh("sort");
                let branches = attributes
                    .iter()
                    .map(|a| Clause::triple(TriplePattern::bind(row, a.clone(), sort)))
                    .collect();
                self.clauses.push(Clause::or_join(vec![row, sort], branches));
                self.push_sort(sort, direction);
            }
        }
    }

    fn sort_on_attribute(&mut self, attribute: &str, direction: SortDirection) {
        let sort = self.vars.fresh("sort");
        self.clauses
            .push(Clause::triple(TriplePattern::bind(self.row, attribute, sort)));
        self.push_sort(sort, direction);
    }

    fn push_sort(&mut self, var: VarId, direction: SortDirection) {
        self.add_find(var);
        self.order_by.push(SortSpec { var, direction });
    }

    /// Finish the query
    pub fn compile(self) -> QuerySpec {
        tracing::debug!(
            clauses = self.clauses.len(),
            rules = self.rules.len(),
            sort_keys = self.order_by.len(),
            "query assembled"
        );
        QuerySpec {
            find: self.find,
            where_: self.clauses,
            rules: self.rules,
            order_by: self.order_by,
            offset: self.offset,
            limit: self.limit,
            vars: self.vars,
        }
    }
}

// ============================================================================
// Filter clause builders
// ============================================================================

pub(crate) fn type_guid_clause(row: VarId, guid: &str) -> Clause {
    Clause::triple(TriplePattern::value(row, attr::TYPE_GUIDS, Literal::string(guid)))
}

pub(crate) fn subtype_clauses(vars: &mut VarRegistry, row: VarId, guids: &[Arc<str>]) -> Vec<Clause> {
    match guids {
        [] => Vec::new(),
        [guid] => vec![type_guid_clause(row, guid)],
        _ => membership_clauses(
            vars,
            "types",
            row,
            attr::TYPE_GUIDS,
            guids.iter().map(|g| Literal::string(g)).collect(),
        ),
    }
}

pub(crate) fn status_clauses(
    vars: &mut VarRegistry,
    row: VarId,
    statuses: Option<&[InstanceStatus]>,
) -> Vec<Clause> {
    match statuses.unwrap_or_default() {
        [] => {
            let status = vars.fresh("status");
            vec![
                Clause::triple(TriplePattern::bind(row, attr::CURRENT_STATUS, status)),
                Clause::predicate(Expression::ne(
                    status,
                    Literal::Long(InstanceStatus::Deleted.ordinal()),
                )),
            ]
        }
        [status] => vec![Clause::triple(TriplePattern::value(
            row,
            attr::CURRENT_STATUS,
            Literal::Long(status.ordinal()),
        ))],
        many => membership_clauses(
            vars,
            "status",
            row,
            attr::CURRENT_STATUS,
            many.iter().map(|s| Literal::Long(s.ordinal())).collect(),
        ),
    }
}

/// `[row attribute ?var] [(contains? #{...} ?var)]`
pub(crate) fn membership_clauses(
    vars: &mut VarRegistry,
    base: &str,
    row: VarId,
    attribute: &str,
    values: Vec<Literal>,
) -> Vec<Clause> {
    let var = vars.fresh(base);
    vec![
        Clause::triple(TriplePattern::bind(row, attribute, var)),
        Clause::predicate(Expression::in_set(var, values)),
    ]
}
