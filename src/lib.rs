//! Pull-based rowsource execution core for SPARQL solution streams
//!
//! The query planner (out of scope here) builds a tree of rowsources and
//! wires each operator's inner source(s) as children. Execution pulls rows
//! from the root by repeatedly calling [`RowSource::read_row`]; each
//! operator pulls from its children, transforms or filters, and returns a
//! [`Row`] or signals end-of-stream. Variable sets are resolved bottom-up
//! via [`RowSource::ensure_variables`] before any row is read.
//!
//! The engine is single-threaded and synchronous: no operator blocks
//! except by returning to its caller between reads, and early termination
//! is simply ceasing to call `read_row` and dropping the tree.
//!
//! Operators provided:
//! - [`values::ValuesSource`] - leaf over a materialized row sequence
//! - [`empty::EmptySource`] - statically unsatisfiable subtree
//! - [`bind::BindSource`] - assignment of an evaluated expression
//! - [`distinct::DistinctSource`] - first-occurrence deduplication
//! - [`minus::MinusSource`] - SPARQL 1.1 set difference
//! - [`group_aggregate::GroupSource`] - aggregation/grouping wrapper

pub mod bind;
pub mod compat;
pub mod context;
pub mod distinct;
pub mod empty;
pub mod error;
pub mod expression;
pub mod group_aggregate;
pub mod literal;
pub mod minus;
pub mod row;
pub mod rowsort;
pub mod rowsource;
pub mod values;
pub mod var_registry;

pub use context::ExecutionContext;
pub use error::{ExpressionError, QueryError, Result};
pub use literal::{CompareConfig, Literal, NumericKind};
pub use row::Row;
pub use rowsource::{Requirements, RowSource, RowSourceOps};
pub use var_registry::{BindingContext, VarId, VarKind, VarRegistry};
