//! Empty source - the base case for algebra rewriting
//!
//! Always at end-of-stream: used where the planner knows statically that a
//! subtree is unsatisfiable (e.g. a basic graph pattern that can never
//! match). Carries only a pass-through handle to the query context.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::row::Row;
use crate::rowsource::RowSourceOps;
use crate::var_registry::VarId;

/// Source that yields no rows and no variables
pub struct EmptySource {
    ctx: ExecutionContext,
}

impl EmptySource {
    /// Create an empty source holding the given query context
    pub fn new(ctx: &ExecutionContext) -> Self {
        EmptySource { ctx: ctx.clone() }
    }

    /// The query context passed at construction
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }
}

impl RowSourceOps for EmptySource {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn ensure_variables(&mut self) -> Result<Vec<VarId>> {
        Ok(Vec::new())
    }

    fn read_row(&mut self) -> Result<Option<Row>> {
        Ok(None)
    }

    fn read_all_rows(&mut self) -> Result<Option<Vec<Row>>> {
        Ok(Some(Vec::new()))
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}
