//! Assignment (BIND) source - binds one variable to an evaluated expression
//!
//! Exposed as a one-row (or fewer) stream: the first read evaluates the
//! expression against the ambient binding environment. Evaluation failure
//! is not a hard error - per SPARQL's permissive BIND semantics the source
//! simply produces no row. On success the variable's slot in the binding
//! environment is updated as a side effect (naive-evaluation compatibility)
//! and a single width-1 row carrying the result is returned.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::expression::{evaluate, EvalScope, Expression};
use crate::row::Row;
use crate::rowsource::RowSourceOps;
use crate::var_registry::VarId;
use tracing::debug;

/// Single-variable assignment source
pub struct BindSource {
    ctx: ExecutionContext,
    var: VarId,
    expr: Expression,
    produced: bool,
}

impl BindSource {
    /// Create an assignment of `expr` to `var`
    pub fn new(ctx: &ExecutionContext, var: VarId, expr: Expression) -> Self {
        BindSource {
            ctx: ctx.clone(),
            var,
            expr,
            produced: false,
        }
    }

    /// The variable this source binds
    pub fn variable(&self) -> VarId {
        self.var
    }
}

impl RowSourceOps for BindSource {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn ensure_variables(&mut self) -> Result<Vec<VarId>> {
        Ok(vec![self.var])
    }

    fn read_row(&mut self) -> Result<Option<Row>> {
        if self.produced {
            return Ok(None);
        }
        self.produced = true;

        let evaluated = {
            let registry = self.ctx.registry();
            let bindings = self.ctx.bindings();
            evaluate(
                &self.expr,
                &EvalScope {
                    bindings: &bindings,
                    registry: &registry,
                },
            )
        };

        match evaluated {
            Err(error) => {
                // Failed evaluation contributes no binding: clean end-of-stream
                debug!(%error, "bind expression failed, producing no row");
                Ok(None)
            }
            Ok(value) => {
                self.ctx.bindings_mut().set(self.var, value.clone());
                let mut row = Row::new(1);
                row.set(0, Some(value));
                Ok(Some(row))
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.produced = false;
        Ok(())
    }
}
