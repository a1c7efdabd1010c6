//! Row-sequence source - a leaf producer over materialized rows
//!
//! Wraps a pre-built, finite sequence of rows plus its variable list:
//! VALUES clauses, test fixtures, and materialized intermediate results
//! all enter the pipeline through this source. Construction registers the
//! variables in the shared registry and validates every row against the
//! declared width.

use crate::context::ExecutionContext;
use crate::error::{QueryError, Result};
use crate::row::Row;
use crate::rowsource::RowSourceOps;
use crate::var_registry::{VarId, VarKind};

/// Leaf source over an in-memory row sequence
pub struct ValuesSource {
    vars: Vec<VarId>,
    rows: Vec<Row>,
    /// `None` is the exhausted sentinel
    cursor: Option<usize>,
}

impl ValuesSource {
    /// Create a values source, taking ownership of the rows
    ///
    /// The named variables are interned into the context's registry. At
    /// least one variable is required, and every row must have exactly one
    /// slot per variable.
    pub fn new(ctx: &ExecutionContext, names: &[&str], rows: Vec<Row>) -> Result<Self> {
        if names.is_empty() {
            return Err(QueryError::NoVariables);
        }
        for row in &rows {
            if row.size() != names.len() {
                return Err(QueryError::RowWidthMismatch {
                    expected: names.len(),
                    actual: row.size(),
                });
            }
        }

        let vars = {
            let mut registry = ctx.registry_mut();
            names
                .iter()
                .map(|name| registry.get_or_insert(name, VarKind::Normal))
                .collect()
        };

        Ok(ValuesSource {
            vars,
            rows,
            cursor: Some(0),
        })
    }

    /// Number of rows in the backing sequence
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the backing sequence is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl RowSourceOps for ValuesSource {
    fn name(&self) -> &'static str {
        "values"
    }

    fn ensure_variables(&mut self) -> Result<Vec<VarId>> {
        Ok(self.vars.clone())
    }

    fn read_row(&mut self) -> Result<Option<Row>> {
        match self.cursor {
            Some(i) if i < self.rows.len() => {
                self.cursor = Some(i + 1);
                // Counted copy; the backing sequence keeps its own handle
                Ok(Some(self.rows[i].clone()))
            }
            _ => {
                self.cursor = None;
                Ok(None)
            }
        }
    }

    fn read_all_rows(&mut self) -> Result<Option<Vec<Row>>> {
        // Bulk read hands out copies without consuming the cursor
        Ok(Some(self.rows.clone()))
    }

    fn reset(&mut self) -> Result<()> {
        self.cursor = Some(0);
        Ok(())
    }
}
