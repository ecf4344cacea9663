//! Error types for parsing and evaluating a line
//!
//! Two classes of failure exist:
//! - [`SyntaxError`]: raised while the parser scans the line. Parsing stops at
//!   the first one; there is no recovery within a line.
//! - [`RuntimeError`]: produced by an operator's calculation rule while the
//!   tree is evaluated, located at the node being evaluated.
//!
//! [`CalcError`] joins both at the single parse/evaluate boundary so that the
//! host only ever sees one error type with a message and a span.

use crate::calc::ast::Span;
use thiserror::Error;

/// Kinds of failure detected while scanning a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("Extra Closing Bracket")]
    TooManyClosingBrackets,

    #[error("Extra Decimal Point")]
    TooManyDecimalPoints,

    #[error("Invalid Number")]
    InvalidNumber,

    #[error("Empty Operation")]
    EmptyOperation,

    #[error("Invalid Operation")]
    InvalidOperation,

    #[error("Unknown Word")]
    UnknownWord,

    #[error("Missing a Binary Operator")]
    MissingBinaryOperator,
}

/// Kinds of failure an operator's calculation rule can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    #[error("Divided By Zero")]
    DividedByZero,

    #[error("Not An Integer")]
    NotAnInteger,

    #[error("Result Too Large")]
    ResultTooLarge,
}

/// A located syntax error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at {span}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Error covering the single character at `index`.
    pub fn at(kind: SyntaxErrorKind, index: usize) -> Self {
        Self::new(kind, Span::at(index))
    }
}

/// A located runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at {span}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Anything that can go wrong computing one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CalcError {
    pub fn span(&self) -> Span {
        match self {
            CalcError::Syntax(e) => e.span,
            CalcError::Runtime(e) => e.span,
        }
    }

    /// Short human-readable message without the location, e.g. `Divided By Zero`.
    pub fn message(&self) -> String {
        match self {
            CalcError::Syntax(e) => e.kind.to_string(),
            CalcError::Runtime(e) => e.kind.to_string(),
        }
    }

    pub fn start(&self) -> usize {
        self.span().start
    }

    pub fn end(&self) -> usize {
        self.span().end
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, CalcError::Syntax(_))
    }

    pub fn syntax_kind(&self) -> Option<SyntaxErrorKind> {
        match self {
            CalcError::Syntax(e) => Some(e.kind),
            CalcError::Runtime(_) => None,
        }
    }

    pub fn runtime_kind(&self) -> Option<RuntimeErrorKind> {
        match self {
            CalcError::Syntax(_) => None,
            CalcError::Runtime(e) => Some(e.kind),
        }
    }
}

/// Reasons an operator table can be rejected at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no binary operator registered for the {role} connector")]
    MissingConnector { role: &'static str },

    #[error("more than one binary operator registered for the {role} connector")]
    DuplicateConnector { role: &'static str },

    #[error("operator symbol '{symbol}' is registered twice")]
    DuplicateSymbol { symbol: String },

    #[error("operator symbol '{symbol}' is not a valid symbol or word")]
    InvalidSymbol { symbol: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_spans() {
        let err: CalcError = SyntaxError::at(SyntaxErrorKind::TooManyClosingBrackets, 1).into();
        assert_eq!(err.message(), "Extra Closing Bracket");
        assert_eq!((err.start(), err.end()), (1, 2));
        assert!(err.is_syntax());

        let err: CalcError = RuntimeError::new(RuntimeErrorKind::DividedByZero, Span::new(0, 3)).into();
        assert_eq!(err.to_string(), "Divided By Zero at 0..3");
        assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::DividedByZero));
        assert_eq!(err.syntax_kind(), None);
    }
}
