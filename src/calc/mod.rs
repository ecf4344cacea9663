//! Single-line expression calculator
//!
//! This module turns one line of text into a number or a located error:
//!
//! ```text
//! line ──> Parser ──> Expr ──> evaluate ──> f64
//!            │                    │
//!            │ SyntaxError        │ RuntimeError
//!            └────────> CalcError <┘
//! ```
//!
//! - [`registry`]: the operator table, built once at startup
//! - [`variables`]: constants and per-line variable bindings
//! - [`parser`]: explicit-stack precedence parser
//! - [`ast`]: the expression tree and source spans
//! - [`eval`]: tree evaluation
//! - [`engine`]: the [`Calculator`] facade used by hosts
//!
//! Everything here is synchronous and owns no global mutable state; the
//! standard registry is immutable after its first use and can be shared
//! across threads.

pub mod ast;
pub mod engine;
pub mod errors;
pub mod eval;
pub mod operators;
pub mod parser;
pub mod registry;
pub mod variables;

pub use ast::{Expr, Span};
pub use engine::Calculator;
pub use errors::{CalcError, RegistryError, RuntimeError, RuntimeErrorKind, SyntaxError, SyntaxErrorKind};
pub use eval::{evaluate, evaluate_line};
pub use operators::{Associativity, BinaryOperator, BinaryRole, Side, UnaryOperator};
pub use parser::Parser;
pub use registry::{standard_registry, Registry, RegistryBuilder};
pub use variables::{lookup_constant, LineScope, VariableStore};
