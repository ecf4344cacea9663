//! Tree evaluation
//!
//! Evaluation is a single recursive walk. Children are evaluated left before
//! right, and the first failure is returned unchanged. A calculation rule's
//! failure, or a non-finite outcome, is reported at the span of the node that
//! applied the rule rather than at the operand that caused it.

use crate::calc::ast::{Expr, Span};
use crate::calc::errors::{CalcError, RuntimeError, RuntimeErrorKind};
use crate::calc::operators::Calculation;
use crate::calc::parser::Parser;
use crate::calc::registry::Registry;
use crate::calc::variables::LineScope;

/// Compute the value of a finished tree
pub fn evaluate(expr: &Expr<'_>) -> Result<f64, RuntimeError> {
    match expr {
        Expr::Literal { value, span } => located(Ok(*value), *span),
        Expr::Unary { op, operand, span } => {
            let value = evaluate(operand)?;
            located((op.calculate)(value), *span)
        }
        Expr::Binary {
            op,
            left,
            right,
            span,
        } => {
            let lhs = evaluate(left)?;
            let rhs = evaluate(right)?;
            located((op.calculate)(lhs, rhs), *span)
        }
    }
}

fn located(calculation: Calculation, span: Span) -> Result<f64, RuntimeError> {
    match calculation {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(RuntimeError::new(RuntimeErrorKind::ResultTooLarge, span)),
        Err(kind) => Err(RuntimeError::new(kind, span)),
    }
}

/// Parse and evaluate one line. This is the only place syntax and runtime
/// failures meet.
pub fn evaluate_line(
    registry: &Registry,
    scope: &LineScope<'_>,
    line: &str,
) -> Result<f64, CalcError> {
    let expr = Parser::new(registry, scope).parse(line)?;
    Ok(evaluate(&expr)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::registry::standard_registry;

    fn eval(line: &str) -> Result<f64, CalcError> {
        evaluate_line(standard_registry(), &LineScope::constants_only(), line)
    }

    fn runtime(line: &str) -> (RuntimeErrorKind, usize, usize) {
        match eval(line) {
            Err(CalcError::Runtime(e)) => (e.kind, e.span.start, e.span.end),
            other => panic!("{:?} gave {:?}", line, other),
        }
    }

    #[test]
    fn test_values() {
        assert_eq!(eval("2+3*4"), Ok(14.0));
        assert_eq!(eval("(2+3)*4"), Ok(20.0));
        assert_eq!(eval("2^3^2"), Ok(512.0));
        assert_eq!(eval("10-4-3"), Ok(3.0));
        assert_eq!(eval("7 mod 4"), Ok(3.0));
        assert_eq!(eval("50%"), Ok(0.5));
        assert_eq!(eval("abs -3"), Ok(3.0));
        assert_eq!(eval("sqrt 16 + 1"), Ok(5.0));
        assert_eq!(eval("cos 0"), Ok(1.0));
    }

    #[test]
    fn test_errors_use_enclosing_node_span() {
        use RuntimeErrorKind::*;

        assert_eq!(runtime("5/0"), (DividedByZero, 0, 3));
        assert_eq!(runtime("1+5/0"), (DividedByZero, 2, 5));
        assert_eq!(runtime("(1/0)+2"), (DividedByZero, 1, 4));
        assert_eq!(runtime("2.5!"), (NotAnInteger, 0, 4));
        assert_eq!(runtime("171!"), (ResultTooLarge, 0, 4));
        assert_eq!(runtime("10^400"), (ResultTooLarge, 0, 6));
        assert_eq!(runtime("sqrt(-1)"), (ResultTooLarge, 0, 7));
        assert_eq!(runtime("ln 0"), (ResultTooLarge, 0, 4));
        assert_eq!(runtime("(-8)^(1/3)"), (ResultTooLarge, 1, 9));
    }

    #[test]
    fn test_negative_factorial_is_empty_product() {
        assert_eq!(eval("(-3)!"), Ok(1.0));
    }

    #[test]
    fn test_left_fails_before_right() {
        let err = eval("1/0 + 2.5!").unwrap_err();
        assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::DividedByZero));
    }

    #[test]
    fn test_syntax_errors_pass_through() {
        let err = eval("2)").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.message(), "Extra Closing Bracket");
    }
}
