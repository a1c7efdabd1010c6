//! Error types for rowsource execution

use thiserror::Error;

/// Rowsource construction and execution errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// A row-sequence source was constructed with an empty variable list
    #[error("row sequence source requires at least one variable")]
    NoVariables,

    /// A materialized row does not match the declared variable count
    #[error("row width mismatch: expected {expected} slots, got {actual}")]
    RowWidthMismatch { expected: usize, actual: usize },

    /// Schema queried before `ensure_variables` resolved it
    #[error("schema not resolved - call ensure_variables() before schema()")]
    SchemaNotResolved,

    /// `reset` called on a source that cannot rewind
    #[error("rowsource '{0}' does not support reset")]
    ResetUnsupported(&'static str),

    /// Variable not found in the registry
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// Expression evaluation error (propagated where SPARQL semantics
    /// require a hard failure; BIND swallows these instead)
    #[error("expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// Internal error (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors raised while evaluating an expression against the current bindings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// Operand kinds do not fit the operator
    #[error("type error: {0}")]
    TypeError(String),

    /// The expression referenced a variable with no current value
    #[error("unbound variable: ?{0}")]
    UnboundVariable(String),

    /// Integer or decimal division by zero
    #[error("division by zero")]
    DivisionByZero,
}

/// Result type for rowsource operations
pub type Result<T> = std::result::Result<T, QueryError>;
