//! Line-oriented document evaluation
//!
//! A sheet is a list of lines, each computed independently:
//!
//! | line | outcome |
//! |---|---|
//! | blank | nothing |
//! | `// note` | comment, nothing computed |
//! | `dim x: 2 * 3` | declares `x = 6` for the lines below |
//! | `x + 1` | `= 7` |
//!
//! # Incremental Passes
//!
//! [`Sheet::evaluate`] remembers the text of every line from the previous
//! pass and skips lines that did not change. Once a line that declares, or
//! used to declare, a variable is re-evaluated, every later line is
//! re-evaluated too, since its variables may now resolve differently.
//!
//! Lines are always processed in increasing order so that each line sees the
//! bindings committed above it during the same pass.

pub mod declaration;
pub mod format;

pub use declaration::{is_declaration, parse_declaration, Declaration, DeclarationError};
pub use format::format_value;

use crate::calc::{CalcError, Calculator, Registry};

/// Prefix that turns a line into a comment
pub const COMMENT_PREFIX: &str = "//";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Declaration,
    Expression,
}

pub fn classify(line: &str) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if line.trim_start().starts_with(COMMENT_PREFIX) {
        LineKind::Comment
    } else if is_declaration(line) {
        LineKind::Declaration
    } else {
        LineKind::Expression
    }
}

/// What one line of the sheet computed
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Blank,
    Comment,
    Value(f64),
    Declared { name: String, value: f64 },
    /// `start..end` are character offsets into the whole line
    Error {
        message: String,
        start: usize,
        end: usize,
    },
}

impl LineOutcome {
    fn from_error(error: &CalcError, offset: usize) -> Self {
        let span = error.span().offset(offset);
        LineOutcome::Error {
            message: error.message(),
            start: span.start,
            end: span.end,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            LineOutcome::Value(value) | LineOutcome::Declared { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LineOutcome::Error { .. })
    }

    /// Text for the result column: `= 14`, an error message, or nothing
    pub fn display(&self) -> Option<String> {
        match self {
            LineOutcome::Blank | LineOutcome::Comment => None,
            LineOutcome::Value(value) | LineOutcome::Declared { value, .. } => {
                Some(format!("= {}", format_value(*value)))
            }
            LineOutcome::Error { message, .. } => Some(message.clone()),
        }
    }
}

/// Counters from one [`Sheet::evaluate`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub evaluated: usize,
    pub skipped: usize,
}

/// Cached per-line results and the variables the lines declare
#[derive(Debug, Clone)]
pub struct Sheet<'r> {
    calculator: Calculator<'r>,
    previous: Vec<String>,
    outcomes: Vec<LineOutcome>,
}

impl Sheet<'static> {
    pub fn new() -> Self {
        Self::with_calculator(Calculator::new())
    }
}

impl Default for Sheet<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Sheet<'r> {
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self::with_calculator(Calculator::with_registry(registry))
    }

    fn with_calculator(calculator: Calculator<'r>) -> Self {
        Self {
            calculator,
            previous: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn outcomes(&self) -> &[LineOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, line: usize) -> Option<&LineOutcome> {
        self.outcomes.get(line)
    }

    pub fn calculator(&self) -> &Calculator<'r> {
        &self.calculator
    }

    /// Forget every cached line and binding
    pub fn reset(&mut self) {
        self.previous.clear();
        self.outcomes.clear();
        self.calculator.truncate(0);
    }

    /// Run one pass over `lines`, re-evaluating only what may have changed.
    #[tracing::instrument(skip_all, fields(lines = lines.len()))]
    pub fn evaluate<S: AsRef<str>>(&mut self, lines: &[S]) -> PassStats {
        let mut stats = PassStats::default();
        let mut refresh = false;

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let unchanged = self.previous.get(index).is_some_and(|prev| prev == line);
            if unchanged && !refresh {
                stats.skipped += 1;
                continue;
            }

            self.calculator.set_line_context(index);
            let had_binding = self.calculator.store().binding_at(index).is_some();
            self.calculator.clear_binding();

            let kind = classify(line);
            let outcome = self.compute(line, kind);
            if had_binding || kind == LineKind::Declaration {
                refresh = true;
            }

            tracing::trace!(index, ?outcome, "line evaluated");
            self.store(index, line, outcome);
            stats.evaluated += 1;
        }

        self.previous.truncate(lines.len());
        self.outcomes.truncate(lines.len());
        self.calculator.truncate(lines.len());

        tracing::debug!(
            evaluated = stats.evaluated,
            skipped = stats.skipped,
            "sheet pass finished"
        );
        stats
    }

    /// `<line number>: <result>` for every line that shows a result
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (index, outcome) in self.outcomes.iter().enumerate() {
            if let Some(text) = outcome.display() {
                out.push_str(&format!("{}: {}\n", index + 1, text));
            }
        }
        out
    }

    fn store(&mut self, index: usize, line: &str, outcome: LineOutcome) {
        if index < self.previous.len() {
            self.previous[index] = line.to_string();
            self.outcomes[index] = outcome;
        } else {
            self.previous.push(line.to_string());
            self.outcomes.push(outcome);
        }
    }

    fn compute(&mut self, line: &str, kind: LineKind) -> LineOutcome {
        match kind {
            LineKind::Blank => LineOutcome::Blank,
            LineKind::Comment => LineOutcome::Comment,
            LineKind::Expression => match self.calculator.evaluate(line) {
                Ok(value) => LineOutcome::Value(value),
                Err(e) => LineOutcome::from_error(&e, 0),
            },
            LineKind::Declaration => self.declare(line),
        }
    }

    fn declare(&mut self, line: &str) -> LineOutcome {
        let calculator = &self.calculator;
        let declaration = match parse_declaration(line, |name| {
            calculator.is_reserved_identifier(name)
        }) {
            Ok(declaration) => declaration,
            Err(e) => {
                let span = e.span();
                return LineOutcome::Error {
                    message: e.to_string(),
                    start: span.start,
                    end: span.end,
                };
            }
        };

        match self.calculator.evaluate(declaration.expression) {
            Ok(value) => {
                self.calculator.bind_variable(declaration.name, value);
                LineOutcome::Declared {
                    name: declaration.name.to_string(),
                    value,
                }
            }
            Err(e) => LineOutcome::from_error(&e, declaration.expression_offset),
        }
    }
}
