//! # Introduction
//!
//! textcalc is a line-by-line text calculator. Every line of a document is
//! parsed and evaluated on its own, and its result is shown beside it as the
//! document is edited in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Evaluation pipeline
//!
//! ```text
//! Document → Sheet pass → Line → Parser → Expr → Evaluator → Result column
//! ```
//!
//! 1. [`calc`]: the single-line calculator. An operator registry, per-line
//!    variable bindings, an explicit-stack precedence parser and a tree
//!    evaluator.
//! 2. [`sheet`]: runs the calculator over a whole document in line order,
//!    handles comments and `dim name: expr` declarations, caches unchanged
//!    lines, and formats results.
//! 3. [`ui`]: ratatui-based editor; not part of the stable library API.
//!
//! ## Supported syntax
//!
//! Operators: `+ - * / mod ^ ! % degree`, implicit multiplication (`2(3+4)`,
//! `2pi`). Functions: `sin cos tan asin acos atan sinh cosh tanh sqrt cbrt ln
//! log abs`. Constants: `pi e tau`. Comments start with `//`.

pub mod calc;
pub mod sheet;
pub mod ui;
