//! Constants and per-line variable bindings
//!
//! Each document line owns at most one binding slot. A line sees a variable
//! only if an *earlier* line bound it: lookups start at `line - 1` and walk
//! backward to line 0, returning the first match. Forward references and a
//! line's own binding are invisible to it.
//!
//! The store never tracks a "current line" itself. Callers pass the line
//! explicitly, or borrow a [`LineScope`] for the line being parsed.

use rustc_hash::FxHashMap;
use std::f64::consts::{E, PI, TAU};
use std::sync::LazyLock;

static CONSTANTS: LazyLock<FxHashMap<&'static str, f64>> =
    LazyLock::new(|| [("pi", PI), ("e", E), ("tau", TAU)].into_iter().collect());

/// Value of a built-in constant (`pi`, `e`, `tau`)
pub fn lookup_constant(name: &str) -> Option<f64> {
    CONSTANTS.get(name).copied()
}

/// A variable committed by one line
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value: f64,
}

/// Line-indexed variable bindings
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    slots: Vec<Option<Binding>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `name = value` for `line`, replacing whatever that line bound
    /// before. Earlier lines are untouched. An empty name clears the slot.
    pub fn bind(&mut self, line: usize, name: &str, value: f64) {
        if name.is_empty() {
            self.clear(line);
            return;
        }
        if self.slots.len() <= line {
            self.slots.resize(line + 1, None);
        }
        self.slots[line] = Some(Binding {
            name: name.to_string(),
            value,
        });
    }

    /// Remove the binding owned by `line`, if any
    pub fn clear(&mut self, line: usize) {
        if let Some(slot) = self.slots.get_mut(line) {
            *slot = None;
        }
    }

    /// Drop every slot at or after `len`
    pub fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    pub fn binding_at(&self, line: usize) -> Option<&Binding> {
        self.slots.get(line).and_then(Option::as_ref)
    }

    /// Latest value of `name` bound strictly before `line`
    pub fn lookup_variable(&self, line: usize, name: &str) -> Option<f64> {
        let visible = line.min(self.slots.len());
        self.slots[..visible]
            .iter()
            .rev()
            .flatten()
            .find(|binding| binding.name == name)
            .map(|binding| binding.value)
    }

    /// Read-only view used while parsing `line`
    pub fn scope(&self, line: usize) -> LineScope<'_> {
        LineScope {
            store: Some(self),
            line,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// The names a single line may resolve: constants plus the variables bound
/// by earlier lines
#[derive(Debug, Clone, Copy)]
pub struct LineScope<'s> {
    store: Option<&'s VariableStore>,
    line: usize,
}

impl LineScope<'static> {
    /// A scope with constants only
    pub fn constants_only() -> Self {
        LineScope {
            store: None,
            line: 0,
        }
    }
}

impl<'s> LineScope<'s> {
    pub fn constant(&self, name: &str) -> Option<f64> {
        lookup_constant(name)
    }

    pub fn variable(&self, name: &str) -> Option<f64> {
        self.store
            .and_then(|store| store.lookup_variable(self.line, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(lookup_constant("pi"), Some(PI));
        assert_eq!(lookup_constant("tau"), Some(TAU));
        assert_eq!(lookup_constant("e"), Some(E));
        assert_eq!(lookup_constant("PI"), None);
    }

    #[test]
    fn test_lookup_is_strictly_backward() {
        let mut store = VariableStore::new();
        store.bind(0, "x", 5.0);

        assert_eq!(store.lookup_variable(0, "x"), None);
        assert_eq!(store.lookup_variable(1, "x"), Some(5.0));
        assert_eq!(store.lookup_variable(10, "x"), Some(5.0));
        assert_eq!(store.lookup_variable(1, "y"), None);
    }

    #[test]
    fn test_rebinding_shadows_only_later_lines() {
        let mut store = VariableStore::new();
        store.bind(0, "x", 1.0);
        store.bind(3, "x", 2.0);

        assert_eq!(store.lookup_variable(2, "x"), Some(1.0));
        assert_eq!(store.lookup_variable(3, "x"), Some(1.0));
        assert_eq!(store.lookup_variable(4, "x"), Some(2.0));

        store.bind(3, "x", 7.0);
        assert_eq!(store.lookup_variable(4, "x"), Some(7.0));
        assert_eq!(store.lookup_variable(1, "x"), Some(1.0));
    }

    #[test]
    fn test_clear_and_truncate() {
        let mut store = VariableStore::new();
        store.bind(1, "a", 1.0);
        store.bind(2, "b", 2.0);
        assert!(store.binding_at(0).is_none());

        store.bind(1, "", 0.0);
        assert_eq!(store.lookup_variable(5, "a"), None);

        store.truncate(2);
        assert_eq!(store.lookup_variable(5, "b"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_scope() {
        let mut store = VariableStore::new();
        store.bind(0, "rate", 0.5);
        let scope = store.scope(1);
        assert_eq!(scope.variable("rate"), Some(0.5));
        assert_eq!(scope.constant("pi"), Some(PI));
        assert_eq!(LineScope::constants_only().variable("rate"), None);
    }
}
