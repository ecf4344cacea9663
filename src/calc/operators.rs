//! Operator definitions and their calculation rules
//!
//! An operator is plain data: a symbol (one character for *instant* operators,
//! a word for *named* ones), a precedence `order` (higher binds tighter), how it
//! attaches to its operands, and a calculation rule. Calculation rules report
//! failures as ordinary return values ([`Calculation`]); the evaluator attaches
//! the span of the node being evaluated. Rules outside their domain simply
//! return NaN or an infinity (`sqrt -1`, `ln 0`), which the evaluator reports
//! as `Result Too Large`.
//!
//! # Reference Set
//!
//! | symbol | kind | order |
//! |---|---|---|
//! | `+` | binary, addition connector | 0 |
//! | `*` `/` `mod` | binary, `*` is the multiplication connector | 1 |
//! | `^` | binary, right-to-left | 3 |
//! | `-` | prefix negation | 2 |
//! | `sin` `cos` `sqrt` `ln` ... | named prefix functions | 2 |
//! | `%` `degree` | postfix | 1 |
//! | `!` | postfix factorial | 4 |
//!
//! Subtraction has no binary operator of its own: `a - b` reads as
//! `a + (-b)` through the addition connector.

use crate::calc::errors::RuntimeErrorKind;
use std::f64::consts::PI;
use std::fmt;

/// Result of applying a calculation rule
pub type Calculation = Result<f64, RuntimeErrorKind>;

/// Order given to a named prefix operator written directly before `(`,
/// so that `sin(x)^2` reads as `(sin x)^2`.
pub const BRACKET_ORDER: u8 = 5;

/// Largest operand whose factorial still fits in an `f64`
const FACTORIAL_LIMIT: f64 = 171.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
}

/// Which side of its operand a unary operator is written on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Prefix,
    Postfix,
}

/// Roles the parser relies on when it synthesizes an implicit operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryRole {
    Addition,
    Multiplication,
    Plain,
}

/// A binary operator definition
#[derive(Debug, Clone, Copy)]
pub struct BinaryOperator {
    pub symbol: &'static str,
    pub order: u8,
    pub associativity: Associativity,
    pub role: BinaryRole,
    pub calculate: fn(f64, f64) -> Calculation,
}

impl BinaryOperator {
    pub const fn new(symbol: &'static str, order: u8, calculate: fn(f64, f64) -> Calculation) -> Self {
        Self {
            symbol,
            order,
            associativity: Associativity::LeftToRight,
            role: BinaryRole::Plain,
            calculate,
        }
    }

    pub const fn right_to_left(self) -> Self {
        Self {
            associativity: Associativity::RightToLeft,
            ..self
        }
    }

    pub const fn with_role(self, role: BinaryRole) -> Self {
        Self { role, ..self }
    }

    /// Instant operators are a single character and need no word buffering.
    pub fn is_instant(&self) -> bool {
        is_single_char(self.symbol)
    }

    /// Whether an already pending operator of `order` must be reduced before
    /// this one is pushed at the same nesting depth.
    pub fn yields_to(&self, order: u8) -> bool {
        match self.associativity {
            Associativity::LeftToRight => order >= self.order,
            Associativity::RightToLeft => order > self.order,
        }
    }
}

// Operators are identified by what they look like and how they bind; the
// calculation rule is not part of identity.
impl PartialEq for BinaryOperator {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.order == other.order
            && self.associativity == other.associativity
            && self.role == other.role
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// A unary operator definition
#[derive(Debug, Clone, Copy)]
pub struct UnaryOperator {
    pub symbol: &'static str,
    pub order: u8,
    pub side: Side,
    /// Set only for the negation operator, which is joined to a preceding
    /// value with addition instead of multiplication.
    pub negation: bool,
    pub calculate: fn(f64) -> Calculation,
}

impl UnaryOperator {
    pub const fn prefix(symbol: &'static str, order: u8, calculate: fn(f64) -> Calculation) -> Self {
        Self {
            symbol,
            order,
            side: Side::Prefix,
            negation: false,
            calculate,
        }
    }

    pub const fn postfix(symbol: &'static str, order: u8, calculate: fn(f64) -> Calculation) -> Self {
        Self {
            symbol,
            order,
            side: Side::Postfix,
            negation: false,
            calculate,
        }
    }

    pub const fn as_negation(self) -> Self {
        Self {
            negation: true,
            ..self
        }
    }

    pub fn is_instant(&self) -> bool {
        is_single_char(self.symbol)
    }

    pub fn is_prefix(&self) -> bool {
        self.side == Side::Prefix
    }

    /// Same rule as [`BinaryOperator::yields_to`] for a left-to-right operator.
    pub fn yields_to(&self, order: u8) -> bool {
        order >= self.order
    }
}

impl PartialEq for UnaryOperator {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.order == other.order
            && self.side == other.side
            && self.negation == other.negation
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

fn is_single_char(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    chars.next().is_some() && chars.next().is_none()
}

// ===== Binary rules =====

fn add(a: f64, b: f64) -> Calculation {
    Ok(a + b)
}

fn multiply(a: f64, b: f64) -> Calculation {
    Ok(a * b)
}

fn divide(a: f64, b: f64) -> Calculation {
    if b == 0.0 {
        return Err(RuntimeErrorKind::DividedByZero);
    }
    Ok(a / b)
}

fn modulo(a: f64, b: f64) -> Calculation {
    if b == 0.0 {
        return Err(RuntimeErrorKind::DividedByZero);
    }
    Ok(a % b)
}

fn power(a: f64, b: f64) -> Calculation {
    Ok(a.powf(b))
}

// ===== Unary rules =====

fn negate(a: f64) -> Calculation {
    Ok(-a)
}

fn factorial(a: f64) -> Calculation {
    if a.floor() != a {
        return Err(RuntimeErrorKind::NotAnInteger);
    }
    if a >= FACTORIAL_LIMIT {
        return Err(RuntimeErrorKind::ResultTooLarge);
    }

    let mut result = 1.0;
    let mut i = 2.0;
    while i <= a {
        result *= i;
        i += 1.0;
    }
    Ok(result)
}

fn percent(a: f64) -> Calculation {
    Ok(a * 0.01)
}

fn degree_to_radian(a: f64) -> Calculation {
    Ok(a * (PI / 180.0))
}

fn sin(a: f64) -> Calculation {
    Ok(a.sin())
}

fn cos(a: f64) -> Calculation {
    Ok(a.cos())
}

fn tan(a: f64) -> Calculation {
    Ok(a.tan())
}

fn asin(a: f64) -> Calculation {
    Ok(a.asin())
}

fn acos(a: f64) -> Calculation {
    Ok(a.acos())
}

fn atan(a: f64) -> Calculation {
    Ok(a.atan())
}

fn sinh(a: f64) -> Calculation {
    Ok(a.sinh())
}

fn cosh(a: f64) -> Calculation {
    Ok(a.cosh())
}

fn tanh(a: f64) -> Calculation {
    Ok(a.tanh())
}

fn sqrt(a: f64) -> Calculation {
    Ok(a.sqrt())
}

fn cbrt(a: f64) -> Calculation {
    Ok(a.cbrt())
}

fn ln(a: f64) -> Calculation {
    Ok(a.ln())
}

fn log10(a: f64) -> Calculation {
    Ok(a.log10())
}

fn abs(a: f64) -> Calculation {
    Ok(a.abs())
}

pub const ADDITION: BinaryOperator = BinaryOperator::new("+", 0, add).with_role(BinaryRole::Addition);
pub const MULTIPLICATION: BinaryOperator =
    BinaryOperator::new("*", 1, multiply).with_role(BinaryRole::Multiplication);
pub const DIVISION: BinaryOperator = BinaryOperator::new("/", 1, divide);
pub const MODULO: BinaryOperator = BinaryOperator::new("mod", 1, modulo);
pub const POWER: BinaryOperator = BinaryOperator::new("^", 3, power).right_to_left();

pub const NEGATION: UnaryOperator = UnaryOperator::prefix("-", 2, negate).as_negation();
pub const FACTORIAL: UnaryOperator = UnaryOperator::postfix("!", 4, factorial);
pub const PERCENT: UnaryOperator = UnaryOperator::postfix("%", 1, percent);
pub const DEGREE: UnaryOperator = UnaryOperator::postfix("degree", 1, degree_to_radian);

/// Binary operators registered by [`Registry::standard`](crate::calc::registry::Registry::standard)
pub const STANDARD_BINARY: &[BinaryOperator] = &[ADDITION, MULTIPLICATION, DIVISION, MODULO, POWER];

/// Unary operators registered by [`Registry::standard`](crate::calc::registry::Registry::standard)
pub const STANDARD_UNARY: &[UnaryOperator] = &[
    NEGATION,
    FACTORIAL,
    PERCENT,
    DEGREE,
    UnaryOperator::prefix("sin", 2, sin),
    UnaryOperator::prefix("cos", 2, cos),
    UnaryOperator::prefix("tan", 2, tan),
    UnaryOperator::prefix("asin", 2, asin),
    UnaryOperator::prefix("acos", 2, acos),
    UnaryOperator::prefix("atan", 2, atan),
    UnaryOperator::prefix("sinh", 2, sinh),
    UnaryOperator::prefix("cosh", 2, cosh),
    UnaryOperator::prefix("tanh", 2, tanh),
    UnaryOperator::prefix("sqrt", 2, sqrt),
    UnaryOperator::prefix("cbrt", 2, cbrt),
    UnaryOperator::prefix("ln", 2, ln),
    UnaryOperator::prefix("log", 2, log10),
    UnaryOperator::prefix("abs", 2, abs),
];

/// Words reserved for the document syntax
pub const STANDARD_KEYWORDS: &[&str] = &["dim", "Dim"];
