//! # Metadata search compiler
//!
//! Compiles backend-neutral metadata searches (property comparisons, nested
//! ALL/ANY/NONE groups, classification filters, sequencing) into the datalog
//! dialect of a graph-oriented document store.
//!
//! Property names in a search are unqualified. The store keeps one attribute
//! per declaring type (`entityProperties/Asset.name`,
//! `entityProperties/GlossaryTerm.name`), so every condition is resolved
//! against a `TypeSystem` under the search's `TypeScope` first. A property
//! with no variation in scope matches nothing; one with several is either
//! searched in one text-index call or expanded into an `or-join`.
//!
//! Entry points are `QueryAssembly` (entity searches) and
//! `GraphQueryBuilder` (relationship traversal). Both finish with
//! `compile()`, producing a `QuerySpec`.

pub mod assembly;
pub mod catalog;
pub mod condition;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod explain;
pub mod graph;
pub mod ir;
pub mod options;
pub mod pattern;
pub mod property_ref;
pub mod search;
pub mod sort;
pub mod text;
pub mod type_system;
pub mod value;
pub mod var_registry;

// ── Query building ───────────────────────────────────────────────────────────
pub use assembly::{QueryAssembly, QuerySpec};
pub use condition::ConditionCompiler;
pub use context::CompileContext;
pub use graph::GraphQueryBuilder;
pub use options::CompilerOptions;

// ── Request model ────────────────────────────────────────────────────────────
pub use search::{
    ClassificationCondition, ComparisonOperator, InstanceStatus, MatchCriteria,
    PropertyCondition, SearchClassifications, SearchExpression, SearchGroup,
};
pub use sort::{SequencingOrder, SortDirection, SortSpec};
pub use value::{PrimitiveKind, SearchValue};

// ── Type system ──────────────────────────────────────────────────────────────
pub use catalog::{AttributeDef, TypeCatalog, TypeCategory, TypeDef};
pub use property_ref::{PropertyRefArena, PropertyRefEntry, QualifiedPropertyRef};
pub use type_system::{Namespace, TypeScope, TypeSystem};

// ── Compiled query IR ────────────────────────────────────────────────────────
pub use ir::{Clause, Expression, Function, Pattern, Rule, TextScope, TextSearchPattern};
pub use pattern::{Literal, Term, TriplePattern};
pub use text::TextShape;
pub use var_registry::{VarId, VarRegistry};

// ── Errors and diagnostics ───────────────────────────────────────────────────
pub use diagnostics::{CollectingSink, DiagnosticSink, Problem, TracingSink};
pub use error::{Result, SearchError};
