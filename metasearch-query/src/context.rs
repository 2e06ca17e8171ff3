//! Compilation context
//!
//! The `CompileContext` carries what the condition compilers need while
//! turning one search into clauses: the type system, the options, the
//! diagnostics sink, the query's variable registry and the row variable the
//! clauses constrain.

use crate::diagnostics::{DiagnosticSink, Problem};
use crate::options::CompilerOptions;
use crate::type_system::TypeSystem;
use crate::var_registry::{VarId, VarRegistry};

/// Borrowed state shared by the condition compilers
pub struct CompileContext<'a> {
    /// Type system resolving property names
    pub types: &'a dyn TypeSystem,
    /// Strategy options
    pub options: &'a CompilerOptions,
    /// Receiver of compilation problems
    pub sink: &'a dyn DiagnosticSink,
    /// Variable registry of the query being built
    pub vars: &'a mut VarRegistry,
    /// Variable bound to the record each clause constrains
    pub row: VarId,
}

impl<'a> CompileContext<'a> {
    /// Create a new context
    pub fn new(
        types: &'a dyn TypeSystem,
        options: &'a CompilerOptions,
        sink: &'a dyn DiagnosticSink,
        vars: &'a mut VarRegistry,
        row: VarId,
    ) -> Self {
        Self {
            types,
            options,
            sink,
            vars,
            row,
        }
    }

    /// Allocate a variable unused anywhere else in the query
    pub fn fresh(&mut self, base: &str) -> VarId {
        self.vars.fresh(base)
    }

    /// Report a problem to the sink
    pub fn problem(
        &self,
        component: &'static str,
        method: &'static str,
        code: &'static str,
        details: impl Into<String>,
    ) {
        self.sink.log_problem(Problem {
            component,
            method,
            code,
            details: details.into(),
        });
    }

    /// Reborrow this context with a different row variable
    pub fn with_row(&mut self, row: VarId) -> CompileContext<'_> {
        CompileContext {
            types: self.types,
            options: self.options,
            sink: self.sink,
            vars: &mut *self.vars,
            row,
        }
    }
}
