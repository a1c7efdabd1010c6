//! Minimal expression tree for BIND and group-by expressions
//!
//! The full SPARQL expression grammar lives in the query layer; this core
//! only needs enough of an IR to evaluate an assignment against the current
//! binding environment. Evaluation errors are reported to the caller, which
//! decides whether they are fatal (grouping) or end the stream (BIND).

use crate::error::ExpressionError;
use crate::literal::{self, Literal, NumericKind};
use crate::var_registry::{BindingContext, VarId, VarRegistry};
use bigdecimal::Zero;
use std::sync::Arc;

/// Expression tree node
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// Constant literal
    Literal(Literal),
    /// Current value of a variable
    Variable(VarId),
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    /// String concatenation
    Concat(Box<Expression>, Box<Expression>),
}

/// Borrowed view of the evaluation environment
pub struct EvalScope<'a> {
    pub bindings: &'a BindingContext,
    pub registry: &'a VarRegistry,
}

/// Evaluate an expression against the current bindings
pub fn evaluate(expr: &Expression, scope: &EvalScope<'_>) -> Result<Literal, ExpressionError> {
    match expr {
        Expression::Literal(Literal::Variable(id)) | Expression::Variable(id) => {
            lookup(scope, *id)
        }
        Expression::Literal(lit) => Ok(lit.clone()),
        Expression::Add(a, b) => arithmetic(a, b, scope, ArithOp::Add),
        Expression::Subtract(a, b) => arithmetic(a, b, scope, ArithOp::Subtract),
        Expression::Multiply(a, b) => arithmetic(a, b, scope, ArithOp::Multiply),
        Expression::Divide(a, b) => arithmetic(a, b, scope, ArithOp::Divide),
        Expression::Concat(a, b) => {
            let left = evaluate(a, scope)?;
            let right = evaluate(b, scope)?;
            match (&left, &right) {
                (Literal::String { value: lv, .. }, Literal::String { value: rv, .. }) => {
                    Ok(Literal::String {
                        value: Arc::from(format!("{lv}{rv}").as_str()),
                        language: None,
                        datatype: None,
                    })
                }
                _ => Err(ExpressionError::TypeError(format!(
                    "CONCAT requires string operands, got {left} and {right}"
                ))),
            }
        }
    }
}

fn lookup(scope: &EvalScope<'_>, id: VarId) -> Result<Literal, ExpressionError> {
    scope
        .bindings
        .get(id)
        .cloned()
        .ok_or_else(|| ExpressionError::UnboundVariable(scope.registry.name(id).to_string()))
}

#[derive(Clone, Copy)]
enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Numeric arithmetic in the promoted kind of the two operands
fn arithmetic(
    a: &Expression,
    b: &Expression,
    scope: &EvalScope<'_>,
    op: ArithOp,
) -> Result<Literal, ExpressionError> {
    let left = evaluate(a, scope)?;
    let right = evaluate(b, scope)?;

    let (ka, kb) = match (left.numeric_kind(), right.numeric_kind()) {
        (Some(ka), Some(kb)) => (ka, kb),
        _ => {
            return Err(ExpressionError::TypeError(format!(
                "arithmetic requires numeric operands, got {left} and {right}"
            )))
        }
    };

    match NumericKind::promote(ka, kb) {
        NumericKind::Boolean | NumericKind::Integer => {
            let (x, y) = match (literal::as_i64(&left), literal::as_i64(&right)) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    return Err(ExpressionError::TypeError(
                        "integer conversion failed".to_string(),
                    ))
                }
            };
            let result = match op {
                ArithOp::Add => x.checked_add(y),
                ArithOp::Subtract => x.checked_sub(y),
                ArithOp::Multiply => x.checked_mul(y),
                ArithOp::Divide => {
                    if y == 0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    x.checked_div(y)
                }
            };
            result
                .map(Literal::Integer)
                .ok_or_else(|| ExpressionError::TypeError("integer overflow".to_string()))
        }
        NumericKind::Float => {
            let (x, y) = float_operands(&left, &right)?;
            #[allow(clippy::cast_possible_truncation)]
            Ok(Literal::Float(apply_f64(x, y, op) as f32))
        }
        NumericKind::Double => {
            let (x, y) = float_operands(&left, &right)?;
            Ok(Literal::Double(apply_f64(x, y, op)))
        }
        NumericKind::Decimal => {
            let x = literal::as_decimal(&left).ok_or_else(|| {
                ExpressionError::TypeError(format!("{left} has no decimal representation"))
            })?;
            let y = literal::as_decimal(&right).ok_or_else(|| {
                ExpressionError::TypeError(format!("{right} has no decimal representation"))
            })?;
            let result = match op {
                ArithOp::Add => x + y,
                ArithOp::Subtract => x - y,
                ArithOp::Multiply => x * y,
                ArithOp::Divide => {
                    if y.is_zero() {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    x / y
                }
            };
            Ok(Literal::Decimal(Box::new(result)))
        }
    }
}

fn float_operands(left: &Literal, right: &Literal) -> Result<(f64, f64), ExpressionError> {
    match (literal::as_f64(left), literal::as_f64(right)) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(ExpressionError::TypeError(
            "float conversion failed".to_string(),
        )),
    }
}

fn apply_f64(x: f64, y: f64, op: ArithOp) -> f64 {
    match op {
        ArithOp::Add => x + y,
        ArithOp::Subtract => x - y,
        ArithOp::Multiply => x * y,
        ArithOp::Divide => x / y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var_registry::VarKind;

    fn scoped<T>(f: impl FnOnce(&mut VarRegistry, &mut BindingContext) -> T) -> T {
        let mut reg = VarRegistry::new();
        let mut env = BindingContext::new();
        f(&mut reg, &mut env)
    }

    #[test]
    fn constant_evaluates_to_itself() {
        scoped(|reg, env| {
            let scope = EvalScope {
                bindings: env,
                registry: reg,
            };
            let expr = Expression::Literal(Literal::integer(42));
            assert_eq!(evaluate(&expr, &scope), Ok(Literal::integer(42)));
        });
    }

    #[test]
    fn variable_reads_binding_environment() {
        scoped(|reg, env| {
            let v = reg.get_or_insert("v", VarKind::Normal);
            env.set(v, Literal::string("hello"));
            let scope = EvalScope {
                bindings: env,
                registry: reg,
            };
            assert_eq!(
                evaluate(&Expression::Variable(v), &scope),
                Ok(Literal::string("hello"))
            );
        });
    }

    #[test]
    fn unbound_variable_is_an_error() {
        scoped(|reg, env| {
            let v = reg.get_or_insert("missing", VarKind::Normal);
            let scope = EvalScope {
                bindings: env,
                registry: reg,
            };
            assert_eq!(
                evaluate(&Expression::Variable(v), &scope),
                Err(ExpressionError::UnboundVariable("missing".to_string()))
            );
        });
    }

    #[test]
    fn addition_promotes_to_double() {
        scoped(|reg, env| {
            let scope = EvalScope {
                bindings: env,
                registry: reg,
            };
            let expr = Expression::Add(
                Box::new(Expression::Literal(Literal::integer(1))),
                Box::new(Expression::Literal(Literal::double(0.5))),
            );
            assert_eq!(evaluate(&expr, &scope), Ok(Literal::double(1.5)));
        });
    }

    #[test]
    fn integer_division_by_zero() {
        scoped(|reg, env| {
            let scope = EvalScope {
                bindings: env,
                registry: reg,
            };
            let expr = Expression::Divide(
                Box::new(Expression::Literal(Literal::integer(1))),
                Box::new(Expression::Literal(Literal::integer(0))),
            );
            assert_eq!(evaluate(&expr, &scope), Err(ExpressionError::DivisionByZero));
        });
    }

    #[test]
    fn adding_a_string_is_a_type_error() {
        scoped(|reg, env| {
            let scope = EvalScope {
                bindings: env,
                registry: reg,
            };
            let expr = Expression::Add(
                Box::new(Expression::Literal(Literal::integer(1))),
                Box::new(Expression::Literal(Literal::string("no"))),
            );
            assert!(matches!(
                evaluate(&expr, &scope),
                Err(ExpressionError::TypeError(_))
            ));
        });
    }

    #[test]
    fn concat_joins_strings() {
        scoped(|reg, env| {
            let scope = EvalScope {
                bindings: env,
                registry: reg,
            };
            let expr = Expression::Concat(
                Box::new(Expression::Literal(Literal::string("foo"))),
                Box::new(Expression::Literal(Literal::string("bar"))),
            );
            assert_eq!(evaluate(&expr, &scope), Ok(Literal::string("foobar")));
        });
    }
}
