//! Host-facing calculator
//!
//! [`Calculator`] pairs a registry with a [`VariableStore`] and a current line
//! index. A host evaluating a document calls, for each line in increasing
//! order:
//!
//! 1. [`Calculator::set_line_context`]
//! 2. [`Calculator::clear_binding`] if the line may have declared something
//!    before
//! 3. [`Calculator::evaluate`]
//! 4. [`Calculator::bind_variable`] after a successful declaration

use crate::calc::errors::CalcError;
use crate::calc::eval::evaluate_line;
use crate::calc::registry::{standard_registry, Registry};
use crate::calc::variables::VariableStore;

#[derive(Debug, Clone)]
pub struct Calculator<'r> {
    registry: &'r Registry,
    store: VariableStore,
    line: usize,
}

impl Calculator<'static> {
    /// Calculator over the reference operator set
    pub fn new() -> Self {
        Self::with_registry(standard_registry())
    }
}

impl Default for Calculator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Calculator<'r> {
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self {
            registry,
            store: VariableStore::new(),
            line: 0,
        }
    }

    pub fn set_line_context(&mut self, line: usize) {
        self.line = line;
    }

    /// Bind `name` at the current line; visible from the next line on.
    /// An empty name clears the line's binding.
    pub fn bind_variable(&mut self, name: &str, value: f64) {
        self.store.bind(self.line, name, value);
    }

    pub fn clear_binding(&mut self) {
        self.store.clear(self.line);
    }

    /// Forget every binding at or after line `len`
    pub fn truncate(&mut self, len: usize) {
        self.store.truncate(len);
    }

    /// Evaluate `line` in the scope of the current line index.
    pub fn evaluate(&self, line: &str) -> Result<f64, CalcError> {
        let scope = self.store.scope(self.line);
        evaluate_line(self.registry, &scope, line.trim_end())
    }

    pub fn is_reserved_identifier(&self, name: &str) -> bool {
        self.registry.is_reserved_identifier(name)
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }
}
