//! Explicit-stack expression parser
//!
//! A line is scanned once, left to right. Two stacks drive tree construction:
//!
//! - **pending**: operators still waiting for operands. Each entry records the
//!   bracket depth (`layer`) it was pushed at and its effective precedence
//!   (`order`).
//! - **completed**: finished sub-trees.
//!
//! When a binary or postfix operator arrives, pending entries are reduced while
//! they sit deeper than the current layer, or at the same layer with an order
//! that must bind first. Each reduction pops its operands off the completed
//! stack and pushes the new node back. Closing brackets only lower the layer;
//! the operators opened inside are reduced by whatever arrives next, or by the
//! end of the line.
//!
//! # Implicit Operators
//!
//! Two values side by side are joined by a synthesized operator:
//! - `2(3)`, `2pi`, `(1)(2)`: multiplication
//! - `5 -2`, `5-2`: addition, since `-` is the negation prefix
//! - `2 sqrt 9`: multiplication (the connector chosen by the registry)
//!
//! Two *numbers* side by side are never joined (`3 4` fails).
//!
//! # Spans
//!
//! All offsets are `char` indices into the line, not byte offsets.
//!
//! # Depth
//!
//! Trees are limited to [`MAX_DEPTH`] levels. Evaluating, printing and
//! dropping a tree all recurse, so a line such as a hundred thousand stacked
//! `-` fails with `Invalid Operation` instead of exhausting the stack.

use crate::calc::ast::{Expr, Span};
use crate::calc::errors::{SyntaxError, SyntaxErrorKind};
use crate::calc::operators::{BinaryOperator, UnaryOperator, BRACKET_ORDER};
use crate::calc::registry::Registry;
use crate::calc::variables::LineScope;

/// Deepest tree a line may produce
pub const MAX_DEPTH: usize = 500;

/// Parses single lines against a registry and the variables visible to them
#[derive(Debug, Clone, Copy)]
pub struct Parser<'r, 'p> {
    registry: &'r Registry,
    scope: &'p LineScope<'p>,
}

impl<'r, 'p> Parser<'r, 'p> {
    pub fn new(registry: &'r Registry, scope: &'p LineScope<'p>) -> Self {
        Self { registry, scope }
    }

    /// Parse one line into an expression tree.
    ///
    /// The line is expected to have its trailing whitespace trimmed already;
    /// leading whitespace is ignored.
    pub fn parse(&self, line: &str) -> Result<Expr<'r>, SyntaxError> {
        let state = ParseState::new(self.registry, self.scope, line);
        let expr = state.run()?;
        tracing::trace!(line, nodes = expr.node_count(), tree = %expr, "parsed line");
        Ok(expr)
    }
}

/// What the scanner saw last, which decides how the next token attaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    /// Nothing yet on this line
    Start,
    /// An opening bracket
    Open,
    /// A binary operator awaiting its right operand
    Binary,
    /// A prefix operator awaiting its operand
    Prefix,
    /// A finished value: number, constant, variable, postfix result or `)`
    Value,
}

/// Token currently being accumulated
#[derive(Debug, Clone, Copy)]
enum Token {
    Number { start: usize, dot: Option<usize> },
    Word { start: usize },
}

#[derive(Debug, Clone, Copy)]
enum PendingOp<'r> {
    Binary(&'r BinaryOperator),
    Prefix(&'r UnaryOperator),
}

/// An operator on the pending stack
#[derive(Debug, Clone, Copy)]
struct Pending<'r> {
    op: PendingOp<'r>,
    layer: usize,
    order: u8,
    /// Where the operator was written; zero-width for synthesized connectors
    span: Span,
}

/// A finished sub-tree with its height
struct Completed<'r> {
    expr: Expr<'r>,
    depth: usize,
}

/// Stacks and scanner state local to one `parse` call
struct ParseState<'r, 'p> {
    registry: &'r Registry,
    scope: &'p LineScope<'p>,
    chars: Vec<char>,
    pending: Vec<Pending<'r>>,
    completed: Vec<Completed<'r>>,
    layer: usize,
    last: Last,
    last_operator: Span,
    token: Option<Token>,
}

impl<'r, 'p> ParseState<'r, 'p> {
    fn new(registry: &'r Registry, scope: &'p LineScope<'p>, line: &str) -> Self {
        Self {
            registry,
            scope,
            chars: line.chars().collect(),
            pending: Vec::new(),
            completed: Vec::new(),
            layer: 0,
            last: Last::Start,
            last_operator: Span::default(),
            token: None,
        }
    }

    fn run(mut self) -> Result<Expr<'r>, SyntaxError> {
        for i in 0..self.chars.len() {
            self.step(i, self.chars[i])?;
        }
        self.finish()
    }

    fn step(&mut self, i: usize, c: char) -> Result<(), SyntaxError> {
        if c.is_whitespace() {
            return self.finish_token(i);
        }
        if c.is_ascii_digit() || c == '.' {
            return self.number_char(i, c);
        }

        match c {
            ',' if matches!(self.token, Some(Token::Number { .. })) => Ok(()),
            '(' => self.open_bracket(i),
            ')' => self.close_bracket(i),
            _ => {
                let registry = self.registry;
                if let Some(op) = registry.binary_by_char(c) {
                    self.finish_token(i)?;
                    return self.binary(op, Span::at(i));
                }
                if let Some(op) = registry.unary_by_char(c) {
                    self.finish_token(i)?;
                    return self.unary(op, Span::at(i));
                }
                self.word_char(i)
            }
        }
    }

    fn finish(mut self) -> Result<Expr<'r>, SyntaxError> {
        let len = self.chars.len();
        self.finish_token(len)?;

        let end = Span::new(len.saturating_sub(1), len);
        match self.last {
            Last::Value => {}
            Last::Binary | Last::Prefix => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::InvalidOperation,
                    self.last_operator,
                ))
            }
            Last::Start | Last::Open => {
                return Err(SyntaxError::new(SyntaxErrorKind::InvalidOperation, end))
            }
        }

        while let Some(entry) = self.pending.pop() {
            self.complete(entry)?;
        }

        match (self.completed.pop(), self.completed.is_empty()) {
            (Some(done), true) => Ok(done.expr),
            _ => Err(SyntaxError::new(SyntaxErrorKind::InvalidOperation, end)),
        }
    }

    // ===== Tokens =====

    fn number_char(&mut self, i: usize, c: char) -> Result<(), SyntaxError> {
        if matches!(self.token, Some(Token::Word { .. })) {
            self.finish_token(i)?;
        }
        if self.token.is_none() {
            self.token = Some(Token::Number {
                start: i,
                dot: None,
            });
        }

        if c == '.' {
            if let Some(Token::Number { dot, .. }) = &mut self.token {
                if dot.is_some() {
                    return Err(SyntaxError::at(SyntaxErrorKind::TooManyDecimalPoints, i));
                }
                *dot = Some(i);
            }
        }
        Ok(())
    }

    fn word_char(&mut self, i: usize) -> Result<(), SyntaxError> {
        if matches!(self.token, Some(Token::Number { .. })) {
            self.finish_token(i)?;
        }
        if self.token.is_none() {
            self.token = Some(Token::Word { start: i });
        }
        Ok(())
    }

    /// Complete the token in progress, which ends just before `end`
    fn finish_token(&mut self, end: usize) -> Result<(), SyntaxError> {
        match self.token.take() {
            None => Ok(()),
            Some(Token::Number { start, .. }) => self.number(Span::new(start, end)),
            Some(Token::Word { start }) => self.word(Span::new(start, end)),
        }
    }

    fn number(&mut self, span: Span) -> Result<(), SyntaxError> {
        let literal = &self.chars[span.start..span.end];
        if !literal.last().is_some_and(|c| c.is_ascii_digit()) {
            return Err(SyntaxError::new(SyntaxErrorKind::InvalidNumber, span));
        }

        let digits: String = literal.iter().filter(|c| **c != ',').collect();
        let value = digits
            .parse::<f64>()
            .map_err(|_| SyntaxError::new(SyntaxErrorKind::InvalidNumber, span))?;

        if self.last == Last::Value {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MissingBinaryOperator,
                span,
            ));
        }
        self.push_value(value, span);
        Ok(())
    }

    fn word(&mut self, span: Span) -> Result<(), SyntaxError> {
        let word: String = self.chars[span.start..span.end].iter().collect();
        let registry = self.registry;

        if let Some(op) = registry.unary_by_name(&word) {
            return self.unary(op, span);
        }
        if let Some(op) = registry.binary_by_name(&word) {
            return self.binary(op, span);
        }

        let value = self
            .scope
            .constant(&word)
            .or_else(|| self.scope.variable(&word))
            .ok_or(SyntaxError::new(SyntaxErrorKind::UnknownWord, span))?;

        if self.last == Last::Value {
            self.connect(registry.mul_connector(), span.start)?;
        }
        self.push_value(value, span);
        Ok(())
    }

    fn push_value(&mut self, value: f64, span: Span) {
        self.completed.push(Completed {
            expr: Expr::Literal { value, span },
            depth: 1,
        });
        self.last = Last::Value;
    }

    /// Push an operator node whose deepest child is `child_depth` high
    fn push_node(&mut self, expr: Expr<'r>, child_depth: usize) -> Result<(), SyntaxError> {
        let depth = child_depth + 1;
        if depth > MAX_DEPTH {
            return Err(SyntaxError::new(
                SyntaxErrorKind::InvalidOperation,
                expr.span(),
            ));
        }
        self.completed.push(Completed { expr, depth });
        Ok(())
    }

    // ===== Brackets =====

    fn open_bracket(&mut self, i: usize) -> Result<(), SyntaxError> {
        self.finish_token(i)?;

        if self.last == Last::Value {
            self.connect(self.registry.mul_connector(), i)?;
        }

        // `sin(x)^2` applies sin to the whole group before `^` sees it.
        if self.last == Last::Prefix {
            if let Some(top) = self.pending.last_mut() {
                if let PendingOp::Prefix(op) = top.op {
                    if !op.is_instant() {
                        top.order = BRACKET_ORDER;
                    }
                }
            }
        }

        self.layer += 1;
        self.last = Last::Open;
        Ok(())
    }

    fn close_bracket(&mut self, i: usize) -> Result<(), SyntaxError> {
        if self.layer == 0 {
            return Err(SyntaxError::at(SyntaxErrorKind::TooManyClosingBrackets, i));
        }
        self.finish_token(i)?;

        match self.last {
            Last::Value => {}
            Last::Open => return Err(SyntaxError::at(SyntaxErrorKind::EmptyOperation, i)),
            Last::Start | Last::Binary | Last::Prefix => {
                return Err(SyntaxError::at(SyntaxErrorKind::InvalidOperation, i))
            }
        }

        self.layer -= 1;
        Ok(())
    }

    // ===== Operators =====

    fn binary(&mut self, op: &'r BinaryOperator, span: Span) -> Result<(), SyntaxError> {
        match self.last {
            Last::Value => {}
            Last::Start | Last::Open => {
                return Err(SyntaxError::new(SyntaxErrorKind::EmptyOperation, span))
            }
            Last::Binary | Last::Prefix => {
                return Err(SyntaxError::new(SyntaxErrorKind::InvalidOperation, span))
            }
        }

        self.reduce(|order| op.yields_to(order))?;
        self.pending.push(Pending {
            op: PendingOp::Binary(op),
            layer: self.layer,
            order: op.order,
            span,
        });
        self.last = Last::Binary;
        self.last_operator = span;
        Ok(())
    }

    /// Insert an operator that was not written, just before `at`
    fn connect(&mut self, op: &'r BinaryOperator, at: usize) -> Result<(), SyntaxError> {
        self.binary(op, Span::new(at, at))
    }

    fn unary(&mut self, op: &'r UnaryOperator, span: Span) -> Result<(), SyntaxError> {
        if op.is_prefix() {
            self.prefix(op, span)
        } else {
            self.postfix(op, span)
        }
    }

    fn prefix(&mut self, op: &'r UnaryOperator, span: Span) -> Result<(), SyntaxError> {
        if self.last == Last::Value {
            self.connect(self.registry.connector_for(op), span.start)?;
        }

        self.pending.push(Pending {
            op: PendingOp::Prefix(op),
            layer: self.layer,
            order: op.order,
            span,
        });
        self.last = Last::Prefix;
        self.last_operator = span;
        Ok(())
    }

    fn postfix(&mut self, op: &'r UnaryOperator, span: Span) -> Result<(), SyntaxError> {
        if self.last != Last::Value {
            return Err(SyntaxError::new(SyntaxErrorKind::InvalidOperation, span));
        }

        self.reduce(|order| op.yields_to(order))?;

        let Completed { expr: operand, depth } = self
            .completed
            .pop()
            .ok_or(SyntaxError::new(SyntaxErrorKind::InvalidOperation, span))?;
        if operand.span().end > span.start {
            return Err(SyntaxError::new(SyntaxErrorKind::InvalidOperation, span));
        }

        let node_span = Span::new(operand.span().start, span.end);
        self.push_node(
            Expr::Unary {
                op,
                operand: Box::new(operand),
                span: node_span,
            },
            depth,
        )
    }

    /// Pop and complete pending entries that must bind before an arriving
    /// operator at the current layer.
    fn reduce(&mut self, yields: impl Fn(u8) -> bool) -> Result<(), SyntaxError> {
        let layer = self.layer;
        while self
            .pending
            .last()
            .is_some_and(|top| top.layer > layer || (top.layer == layer && yields(top.order)))
        {
            if let Some(entry) = self.pending.pop() {
                self.complete(entry)?;
            }
        }
        Ok(())
    }

    /// Attach a pending operator to its operands from the completed stack
    fn complete(&mut self, entry: Pending<'r>) -> Result<(), SyntaxError> {
        let missing = SyntaxError::new(SyntaxErrorKind::InvalidOperation, entry.span);

        match entry.op {
            PendingOp::Binary(op) => {
                let right = self.completed.pop().ok_or(missing)?;
                let left = self.completed.pop().ok_or(missing)?;
                if left.expr.span().end > right.expr.span().start {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::InvalidOperation,
                        right.expr.span(),
                    ));
                }

                let span = left.expr.span().to(right.expr.span());
                let depth = left.depth.max(right.depth);
                self.push_node(
                    Expr::Binary {
                        op,
                        left: Box::new(left.expr),
                        right: Box::new(right.expr),
                        span,
                    },
                    depth,
                )
            }
            PendingOp::Prefix(op) => {
                let Completed {
                    expr: operand,
                    depth,
                } = self.completed.pop().ok_or(missing)?;
                if entry.span.start > operand.span().start {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::InvalidOperation,
                        operand.span(),
                    ));
                }

                let span = Span::new(entry.span.start, operand.span().end);
                self.push_node(
                    Expr::Unary {
                        op,
                        operand: Box::new(operand),
                        span,
                    },
                    depth,
                )
            }
        }
    }
}
