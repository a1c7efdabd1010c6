//! DISTINCT source - removes duplicate rows, preserving first occurrence
//!
//! Wraps one inner rowsource and a rowsort map keyed by row content under
//! the context's comparison flags. Each inner row is first rewritten to its
//! canonical current binding (variable-reference slots resolve through the
//! binding environment), then probed against the map; only first
//! occurrences are emitted. Distinctness is a per-pass property: reset
//! rebuilds the map from scratch.

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::literal::Literal;
use crate::row::Row;
use crate::rowsort::RowSortMap;
use crate::rowsource::{Requirements, RowSource, RowSourceOps};
use crate::var_registry::VarId;
use tracing::trace;

/// Deduplicating source over one inner rowsource
pub struct DistinctSource {
    ctx: ExecutionContext,
    child: RowSource,
    seen: RowSortMap,
}

impl DistinctSource {
    /// Wrap `child`, deduplicating under the context's comparison flags
    pub fn new(ctx: &ExecutionContext, child: RowSource) -> Self {
        DistinctSource {
            ctx: ctx.clone(),
            child,
            seen: RowSortMap::new(ctx.compare()),
        }
    }

    /// Rewrite each slot to the canonical current binding: concrete
    /// literals pass through, variable references resolve through the
    /// binding environment (an unbound reference becomes an unbound slot)
    fn canonical_slots(&self, row: &Row) -> Vec<Option<Literal>> {
        let bindings = self.ctx.bindings();
        (0..row.size())
            .map(|i| match row.get(i) {
                Some(Literal::Variable(id)) => bindings.get(*id).cloned(),
                Some(other) => Some(other.clone()),
                None => None,
            })
            .collect()
    }
}

impl RowSourceOps for DistinctSource {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn ensure_variables(&mut self) -> Result<Vec<VarId>> {
        self.child.ensure_variables()?;
        Ok(self.child.schema()?.to_vec())
    }

    fn read_row(&mut self) -> Result<Option<Row>> {
        loop {
            let Some(row) = self.child.read_row()? else {
                return Ok(None);
            };
            let slots = self.canonical_slots(&row);
            if self.seen.insert(slots.clone()) {
                return Ok(Some(Row::from_literals(slots)));
            }
            trace!(offset = row.offset(), "duplicate row dropped");
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.child.reset()?;
        self.seen.clear();
        Ok(())
    }

    fn set_requirements(&mut self, requirements: Requirements) {
        // Consumers that hold our rows across reads need the inner source
        // to keep its rows stable too
        self.child.set_requirements(requirements);
    }

    fn inner(&self, offset: usize) -> Option<&RowSource> {
        (offset == 0).then_some(&self.child)
    }
}
