//! MINUS source - SPARQL 1.1 set difference
//!
//! Yields left-side rows not compatible with any right-side row. The right
//! side is fully materialized on the first read: compatibility must be
//! checked against the complete right-side set for every left row, so this
//! is deliberately not a streaming semi-join. Compatibility uses the
//! MINUS-specific predicate in [`crate::compat`], not the generic join
//! check, so rows with disjoint variable domains always survive.

use crate::compat::minus_compatible;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::row::Row;
use crate::rowsource::{Requirements, RowSource, RowSourceOps};
use crate::var_registry::VarId;
use tracing::{debug, trace};

/// Set-difference source over a left and right rowsource
pub struct MinusSource {
    ctx: ExecutionContext,
    lhs: RowSource,
    rhs: RowSource,
    rhs_cache: Vec<Row>,
    rhs_read: bool,
}

impl MinusSource {
    /// Take ownership of both children
    pub fn new(ctx: &ExecutionContext, lhs: RowSource, rhs: RowSource) -> Self {
        MinusSource {
            ctx: ctx.clone(),
            lhs,
            rhs,
            rhs_cache: Vec::new(),
            rhs_read: false,
        }
    }
}

impl RowSourceOps for MinusSource {
    fn name(&self) -> &'static str {
        "minus"
    }

    fn init(&mut self) -> Result<()> {
        // A full pipeline reset must reach both children, even though the
        // cached right side makes its reset irrelevant mid-pass
        self.lhs.set_requirements(Requirements::reset());
        self.rhs.set_requirements(Requirements::reset());
        Ok(())
    }

    fn ensure_variables(&mut self) -> Result<Vec<VarId>> {
        self.lhs.ensure_variables()?;
        self.rhs.ensure_variables()?;
        Ok(self.lhs.schema()?.to_vec())
    }

    fn read_row(&mut self) -> Result<Option<Row>> {
        if !self.rhs_read {
            self.rhs_cache = self.rhs.read_all_rows()?;
            self.rhs_read = true;
            debug!(rows = self.rhs_cache.len(), "materialized right side");
        }

        let lhs_schema = self.lhs.schema_shared()?;
        let rhs_schema = self.rhs.schema_shared()?;
        let config = self.ctx.compare();

        loop {
            let Some(row) = self.lhs.read_row()? else {
                return Ok(None);
            };
            let removed = self
                .rhs_cache
                .iter()
                .any(|rhs_row| minus_compatible(&row, &lhs_schema, rhs_row, &rhs_schema, &config));
            if removed {
                trace!(offset = row.offset(), "left row cancelled");
                continue;
            }
            // The surviving row gets its own identity; the wrapper stamps
            // this source's output offset
            return Ok(Some(row.deep_copy()));
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.rhs_cache.clear();
        self.rhs_read = false;
        self.lhs.reset()?;
        self.rhs.reset()?;
        Ok(())
    }

    fn set_requirements(&mut self, requirements: Requirements) {
        // Only the left side streams after the first read; the cached
        // right side is rebuilt from scratch on reset anyway
        self.lhs.set_requirements(requirements);
    }

    fn inner(&self, offset: usize) -> Option<&RowSource> {
        match offset {
            0 => Some(&self.lhs),
            1 => Some(&self.rhs),
            _ => None,
        }
    }
}
