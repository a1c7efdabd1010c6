//! Grouping/aggregation wrapper source
//!
//! Wraps an inner rowsource whose rows are already grouped upstream,
//! together with the group-by expressions, the aggregate operation tag and
//! its parameter literals. This wrapper's contract is schema propagation
//! (its output variables are the inner source's) and offset bookkeeping
//! (every row it forwards is re-stamped with its own output sequence);
//! computing the aggregate itself is delegated to the function layer.

use crate::error::Result;
use crate::expression::Expression;
use crate::literal::Literal;
use crate::row::Row;
use crate::rowsource::{Requirements, RowSource, RowSourceOps};
use crate::var_registry::VarId;
use std::sync::Arc;

/// Aggregate operation tag
#[derive(Clone, Debug, PartialEq)]
pub enum AggregateOp {
    /// COUNT - count bound values of a variable
    Count,
    /// COUNT(*) - count all rows in a group
    CountAll,
    /// SUM - numeric sum
    Sum,
    /// AVG - numeric average
    Avg,
    /// MIN - minimum by literal ordering
    Min,
    /// MAX - maximum by literal ordering
    Max,
    /// SAMPLE - an arbitrary value from the group
    Sample,
    /// GROUP_CONCAT - string concatenation with separator
    GroupConcat { separator: String },
    /// Extension aggregate identified by function URI
    Custom(Arc<str>),
}

/// Aggregation wrapper over a pre-grouped inner source
pub struct GroupSource {
    child: RowSource,
    group_exprs: Vec<Expression>,
    op: AggregateOp,
    params: Vec<Literal>,
}

impl GroupSource {
    /// Take ownership of the inner source and parameter list; the group
    /// expressions are deep-copied so the caller's list stays
    /// independently usable
    pub fn new(
        child: RowSource,
        group_exprs: &[Expression],
        op: AggregateOp,
        params: Vec<Literal>,
    ) -> Self {
        GroupSource {
            child,
            group_exprs: group_exprs.to_vec(),
            op,
            params,
        }
    }

    /// The aggregate operation tag
    pub fn op(&self) -> &AggregateOp {
        &self.op
    }

    /// Group-by expressions (this source's own copy)
    pub fn group_expressions(&self) -> &[Expression] {
        &self.group_exprs
    }

    /// Aggregate parameters
    pub fn params(&self) -> &[Literal] {
        &self.params
    }
}

impl RowSourceOps for GroupSource {
    fn name(&self) -> &'static str {
        "group"
    }

    fn ensure_variables(&mut self) -> Result<Vec<VarId>> {
        self.child.ensure_variables()?;
        Ok(self.child.schema()?.to_vec())
    }

    fn read_row(&mut self) -> Result<Option<Row>> {
        // Rows pass through; the wrapper stamps this source's own offsets
        self.child.read_row()
    }

    fn reset(&mut self) -> Result<()> {
        self.child.reset()
    }

    fn set_requirements(&mut self, requirements: Requirements) {
        self.child.set_requirements(requirements);
    }

    fn inner(&self, offset: usize) -> Option<&RowSource> {
        (offset == 0).then_some(&self.child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::values::ValuesSource;

    fn int_row(values: &[i64]) -> Row {
        Row::from_literals(values.iter().map(|&v| Some(Literal::integer(v))).collect())
    }

    fn values(ctx: &ExecutionContext, names: &[&str], rows: Vec<Row>) -> RowSource {
        RowSource::new(ValuesSource::new(ctx, names, rows).unwrap()).unwrap()
    }

    #[test]
    fn schema_copies_inner() {
        let ctx = ExecutionContext::new();
        let mut child = values(&ctx, &["g", "v"], vec![int_row(&[1, 10])]);
        child.ensure_variables().unwrap();
        let child_schema = child.schema().unwrap().to_vec();

        let mut source =
            RowSource::new(GroupSource::new(child, &[], AggregateOp::CountAll, Vec::new()))
                .unwrap();
        source.ensure_variables().unwrap();
        assert_eq!(source.schema().unwrap(), child_schema.as_slice());
    }

    #[test]
    fn rows_pass_through_with_restamped_offsets() {
        let ctx = ExecutionContext::new();
        let child = values(
            &ctx,
            &["g"],
            vec![int_row(&[1]), int_row(&[1]), int_row(&[2])],
        );
        let mut source =
            RowSource::new(GroupSource::new(child, &[], AggregateOp::Count, Vec::new())).unwrap();

        for expected in 0..3 {
            let row = source.read_row().unwrap().unwrap();
            assert_eq!(row.offset(), expected);
        }
        assert!(source.read_row().unwrap().is_none());
        assert_eq!(source.rows_count(), 3);
    }

    #[test]
    fn expression_list_is_deep_copied() {
        let ctx = ExecutionContext::new();
        let v = ctx
            .registry_mut()
            .get_or_insert("g", crate::var_registry::VarKind::Normal);
        let child = values(&ctx, &["g"], vec![int_row(&[1])]);

        let mut callers_exprs = vec![Expression::Variable(v)];
        let group = GroupSource::new(child, &callers_exprs, AggregateOp::Sum, Vec::new());

        // Mutating the caller's list does not touch the source's copy
        callers_exprs.clear();
        assert_eq!(group.group_expressions(), &[Expression::Variable(v)]);
        assert_eq!(group.op(), &AggregateOp::Sum);
        assert!(group.params().is_empty());
    }

    #[test]
    fn group_concat_carries_separator() {
        let op = AggregateOp::GroupConcat {
            separator: ", ".to_string(),
        };
        assert_eq!(
            op,
            AggregateOp::GroupConcat {
                separator: ", ".to_string()
            }
        );
    }

    #[test]
    fn reset_propagates_to_inner() {
        let ctx = ExecutionContext::new();
        let child = values(&ctx, &["g"], vec![int_row(&[1]), int_row(&[2])]);
        let mut source =
            RowSource::new(GroupSource::new(child, &[], AggregateOp::Min, Vec::new())).unwrap();

        assert_eq!(source.read_all_rows().unwrap().len(), 2);
        source.reset().unwrap();
        assert_eq!(source.read_all_rows().unwrap().len(), 2);
    }
}
