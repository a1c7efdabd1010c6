//! The rowsource abstraction: a pull-based iterator over solution rows
//!
//! Concrete operators implement `RowSourceOps`; the owning `RowSource`
//! wrapper enforces the contracts that must hold uniformly regardless of
//! operator: sticky end-of-stream, per-source row counting and offset
//! stamping, and schema caching after the first `ensure_variables` pass.
//! Optional operator entry points (`init`, `read_all_rows`, `reset`,
//! `set_requirements`, `inner`) are defaulted trait methods, replacing the
//! NULL-entry dispatch table of handler-struct designs.

use crate::error::{QueryError, Result};
use crate::row::Row;
use crate::var_registry::VarId;
use std::sync::Arc;
use tracing::trace;

/// Capability requests propagated down an operator tree
///
/// `require_reset`: the consumer will call `reset` and every source on the
/// path must support it. `preserve_rows`: the consumer holds onto returned
/// rows across reads, so sources must not rewrite rows they have handed out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Requirements {
    pub require_reset: bool,
    pub preserve_rows: bool,
}

impl Requirements {
    /// Requirements asking only for reset support
    pub fn reset() -> Self {
        Requirements {
            require_reset: true,
            preserve_rows: false,
        }
    }

    /// Union of two requirement sets
    pub fn merge(self, other: Requirements) -> Self {
        Requirements {
            require_reset: self.require_reset || other.require_reset,
            preserve_rows: self.preserve_rows || other.preserve_rows,
        }
    }
}

/// Operator-side behavior of a rowsource
///
/// `ensure_variables` and `read_row` are the two required entry points;
/// everything else has a default. Implementations must recursively resolve
/// their children's variables inside `ensure_variables` before reading
/// child schemas. The wrapper guarantees `read_row` is never called again
/// after it returns `Ok(None)`.
pub trait RowSourceOps {
    /// Operator name for diagnostics and error messages
    fn name(&self) -> &'static str;

    /// One-time setup after construction (allocate caches, forward
    /// requirements to children)
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Compute the output variable list; called exactly once by the wrapper
    fn ensure_variables(&mut self) -> Result<Vec<VarId>>;

    /// Pull the next row, or `None` at end-of-stream
    fn read_row(&mut self) -> Result<Option<Row>>;

    /// Eager bulk read override; `Ok(None)` means "no specialized
    /// implementation, use the generic read_row loop"
    fn read_all_rows(&mut self) -> Result<Option<Vec<Row>>> {
        Ok(None)
    }

    /// Rewind to re-produce rows from the start
    fn reset(&mut self) -> Result<()> {
        Err(QueryError::ResetUnsupported(self.name()))
    }

    /// Propagate capability requests to inner rowsources
    fn set_requirements(&mut self, _requirements: Requirements) {}

    /// Child rowsource at `offset` (0 = first/primary), for plan traversal
    fn inner(&self, _offset: usize) -> Option<&RowSource> {
        None
    }
}

/// Owning handle around a concrete operator
///
/// Wrapper-level invariants:
/// - once `read_row` returns `None`, every later call returns `None`
///   without re-invoking the operator (sticky end-of-stream);
/// - each produced row is stamped with `offset == rows_count()` before the
///   count increments, so offsets are 0-based and monotonic per source and
///   restart at 0 after `reset`;
/// - the variable list is computed once and cached; querying the schema
///   before `ensure_variables` is an error.
pub struct RowSource {
    ops: Box<dyn RowSourceOps>,
    schema: Option<Arc<[VarId]>>,
    rows_produced: usize,
    ended: bool,
}

impl RowSource {
    /// Wrap an operator, running its one-time `init`
    pub fn new(ops: impl RowSourceOps + 'static) -> Result<Self> {
        let mut ops = Box::new(ops);
        ops.init()?;
        Ok(RowSource {
            ops,
            schema: None,
            rows_produced: 0,
            ended: false,
        })
    }

    /// Operator name for diagnostics
    pub fn name(&self) -> &'static str {
        self.ops.name()
    }

    /// Resolve and cache the output variable list; idempotent
    pub fn ensure_variables(&mut self) -> Result<()> {
        if self.schema.is_none() {
            let vars = self.ops.ensure_variables()?;
            self.schema = Some(Arc::from(vars.into_boxed_slice()));
        }
        Ok(())
    }

    /// Output variable list; errors until `ensure_variables` has run
    pub fn schema(&self) -> Result<&[VarId]> {
        self.schema.as_deref().ok_or(QueryError::SchemaNotResolved)
    }

    /// Shared handle to the output variable list (cheap clone for callers
    /// that need the schema while also reading rows)
    pub fn schema_shared(&self) -> Result<Arc<[VarId]>> {
        self.schema
            .clone()
            .ok_or(QueryError::SchemaNotResolved)
    }

    /// Number of output variables (row width)
    pub fn size(&self) -> Result<usize> {
        Ok(self.schema()?.len())
    }

    /// Pull the next row
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        if self.ended {
            return Ok(None);
        }
        self.ensure_variables()?;
        match self.ops.read_row()? {
            Some(mut row) => {
                row.set_offset(self.rows_produced);
                self.rows_produced += 1;
                Ok(Some(row))
            }
            None => {
                trace!(source = self.ops.name(), rows = self.rows_produced, "end of stream");
                self.ended = true;
                Ok(None)
            }
        }
    }

    /// Read all remaining rows eagerly
    ///
    /// Uses the operator's bulk override when it has one (a sequence-backed
    /// source returns its rows without consuming its cursor); otherwise
    /// loops `read_row`, so counting and offset stamping still apply.
    pub fn read_all_rows(&mut self) -> Result<Vec<Row>> {
        if self.ended {
            return Ok(Vec::new());
        }
        self.ensure_variables()?;
        if let Some(rows) = self.ops.read_all_rows()? {
            return Ok(rows);
        }
        let mut rows = Vec::new();
        while let Some(row) = self.read_row()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rewind the source; clears the sticky end flag and restarts the
    /// output offset sequence at 0
    pub fn reset(&mut self) -> Result<()> {
        self.ops.reset()?;
        self.ended = false;
        self.rows_produced = 0;
        Ok(())
    }

    /// Propagate capability requests down the tree
    pub fn set_requirements(&mut self, requirements: Requirements) {
        self.ops.set_requirements(requirements);
    }

    /// Child rowsource at `offset`, if any
    pub fn inner(&self, offset: usize) -> Option<&RowSource> {
        self.ops.inner(offset)
    }

    /// Rows produced so far (since construction or the last reset)
    pub fn rows_count(&self) -> usize {
        self.rows_produced
    }

    /// Whether end-of-stream has been signaled
    pub fn has_ended(&self) -> bool {
        self.ended
    }
}
