//! Expression tree for a single calculator line
//!
//! The parser produces an [`Expr`] per line; the evaluator walks it once and
//! drops it. Children are owned by their parent through `Box`, so the tree has
//! no sharing and no cycles.
//!
//! Operator nodes borrow their definition from the [`Registry`] that the line
//! was parsed against, which is why the tree carries the `'r` lifetime.
//!
//! [`Registry`]: crate::calc::registry::Registry

use crate::calc::operators::{BinaryOperator, Side, UnaryOperator};
use std::fmt;

/// Half-open `[start, end)` range of character offsets into the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span covering the single character at `index`.
    pub fn at(index: usize) -> Self {
        Self {
            start: index,
            end: index + 1,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Shift the span right by `offset` characters.
    pub fn offset(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A finished expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'r> {
    /// A number, constant or variable already resolved to its value
    Literal { value: f64, span: Span },

    /// Prefix or postfix operator applied to one operand
    Unary {
        op: &'r UnaryOperator,
        operand: Box<Expr<'r>>,
        span: Span,
    },

    /// Binary operator applied to two operands
    Binary {
        op: &'r BinaryOperator,
        left: Box<Expr<'r>>,
        right: Box<Expr<'r>>,
        span: Span,
    },
}

impl<'r> Expr<'r> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. } | Expr::Unary { span, .. } | Expr::Binary { span, .. } => {
                *span
            }
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Literal { .. } => 1,
            Expr::Unary { operand, .. } => 1 + operand.node_count(),
            Expr::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }
}

/// Fully parenthesised rendering, e.g. `(2 + (3 * 4))` or `(-(5!))`.
impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value, .. } => write!(f, "{}", value),
            Expr::Unary { op, operand, .. } => match op.side {
                Side::Prefix if op.is_instant() => write!(f, "({}{})", op.symbol, operand),
                Side::Prefix => write!(f, "{}({})", op.symbol, operand),
                Side::Postfix if op.is_instant() => write!(f, "({}{})", operand, op.symbol),
                Side::Postfix => write!(f, "({} {})", operand, op.symbol),
            },
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op.symbol, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_helpers() {
        let a = Span::new(2, 4);
        let b = Span::at(7);
        assert_eq!(a.to(b), Span::new(2, 8));
        assert_eq!(a.offset(5), Span::new(7, 9));
        assert_eq!(a.to_string(), "2..4");
    }
}
