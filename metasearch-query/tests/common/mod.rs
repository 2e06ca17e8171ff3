//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod eval;
pub mod fixtures;
pub mod tracing_capture;

use metasearch_query::{
    CollectingSink, CompilerOptions, Namespace, QueryAssembly, QuerySpec, SearchExpression,
    TypeCatalog, TypeScope,
};

/// Compile `expr` as the only content of an entity query
pub fn entity_query(
    catalog: &TypeCatalog,
    options: &CompilerOptions,
    sink: &CollectingSink,
    expr: &SearchExpression,
    scope: &TypeScope,
) -> QuerySpec {
    let mut query = QueryAssembly::new(catalog, options).with_diagnostics(sink);
    query.add_conditions(expr, &Namespace::Entity, scope);
    query.compile()
}
