//! Operator registry
//!
//! The registry is the fixed table the parser consults while scanning a line.
//! It is assembled once through [`RegistryBuilder`] and read-only afterwards,
//! so a shared reference can be used from any number of threads.
//!
//! Operators are partitioned at registration time:
//! - **instant** (one character): looked up by `char` with a linear scan over
//!   a short list, recognised by the parser without buffering
//! - **named** (a word): looked up by exact word match once the parser has
//!   finished reading the word
//!
//! Building fails unless exactly one addition and one multiplication operator
//! exist, because the parser synthesizes them for implicit operations
//! (`2(3)`, `5 -2`).

use crate::calc::errors::RegistryError;
use crate::calc::operators::{
    BinaryOperator, BinaryRole, UnaryOperator, STANDARD_BINARY, STANDARD_KEYWORDS, STANDARD_UNARY,
};
use crate::calc::variables;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

static STANDARD: LazyLock<Registry> = LazyLock::new(|| match Registry::standard() {
    Ok(registry) => registry,
    Err(e) => panic!("standard operator table is invalid: {}", e),
});

/// The process-wide registry holding the reference operator set.
///
/// Built on first use; every later call returns the same instance.
pub fn standard_registry() -> &'static Registry {
    &STANDARD
}

/// Characters that can never be (part of) an operator symbol
fn is_reserved_char(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_digit() || matches!(c, '(' | ')' | '.' | ',')
}

/// Collects operator definitions before they are frozen into a [`Registry`]
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    binary: Vec<BinaryOperator>,
    unary: Vec<UnaryOperator>,
    keywords: Vec<&'static str>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_binary(mut self, op: BinaryOperator) -> Self {
        self.binary.push(op);
        self
    }

    pub fn register_unary(mut self, op: UnaryOperator) -> Self {
        self.unary.push(op);
        self
    }

    /// Reserve a word that is neither an operator nor a constant.
    pub fn keyword(mut self, word: &'static str) -> Self {
        self.keywords.push(word);
        self
    }

    /// Validate the collected definitions and partition them.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let instant_chars: Vec<char> = self
            .binary
            .iter()
            .map(|op| op.symbol)
            .chain(self.unary.iter().map(|op| op.symbol))
            .filter_map(single_char)
            .collect();

        for symbol in self
            .binary
            .iter()
            .map(|op| op.symbol)
            .chain(self.unary.iter().map(|op| op.symbol))
        {
            validate_symbol(symbol, &instant_chars)?;
        }

        let mut instant_binary = Vec::new();
        let mut named_binary = FxHashMap::default();
        let mut addition = None;
        let mut multiplication = None;

        for op in self.binary {
            match op.role {
                BinaryRole::Addition if addition.is_some() => {
                    return Err(RegistryError::DuplicateConnector { role: "addition" })
                }
                BinaryRole::Addition => addition = Some(op),
                BinaryRole::Multiplication if multiplication.is_some() => {
                    return Err(RegistryError::DuplicateConnector {
                        role: "multiplication",
                    })
                }
                BinaryRole::Multiplication => multiplication = Some(op),
                BinaryRole::Plain => {}
            }

            if op.is_instant() {
                if instant_binary.iter().any(|o: &BinaryOperator| o.symbol == op.symbol) {
                    return Err(duplicate(op.symbol));
                }
                instant_binary.push(op);
            } else if named_binary.insert(op.symbol, op).is_some() {
                return Err(duplicate(op.symbol));
            }
        }

        let mut instant_unary = Vec::new();
        let mut named_unary = FxHashMap::default();

        for op in self.unary {
            if op.is_instant() {
                if instant_unary.iter().any(|o: &UnaryOperator| o.symbol == op.symbol) {
                    return Err(duplicate(op.symbol));
                }
                instant_unary.push(op);
            } else if named_unary.insert(op.symbol, op).is_some() {
                return Err(duplicate(op.symbol));
            }
        }

        let addition = addition.ok_or(RegistryError::MissingConnector { role: "addition" })?;
        let multiplication =
            multiplication.ok_or(RegistryError::MissingConnector { role: "multiplication" })?;

        tracing::debug!(
            instant_binary = instant_binary.len(),
            named_binary = named_binary.len(),
            instant_unary = instant_unary.len(),
            named_unary = named_unary.len(),
            "operator registry built"
        );

        Ok(Registry {
            instant_binary,
            named_binary,
            instant_unary,
            named_unary,
            keywords: self.keywords,
            addition,
            multiplication,
        })
    }
}

fn single_char(symbol: &str) -> Option<char> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn validate_symbol(symbol: &'static str, instant_chars: &[char]) -> Result<(), RegistryError> {
    let invalid = || RegistryError::InvalidSymbol {
        symbol: symbol.to_string(),
    };

    if symbol.is_empty() || symbol.chars().any(is_reserved_char) {
        return Err(invalid());
    }
    // A word containing an instant character would be split by the parser.
    if single_char(symbol).is_none() && symbol.chars().any(|c| instant_chars.contains(&c)) {
        return Err(invalid());
    }
    Ok(())
}

fn duplicate(symbol: &str) -> RegistryError {
    RegistryError::DuplicateSymbol {
        symbol: symbol.to_string(),
    }
}

/// Frozen operator table
#[derive(Debug, Clone)]
pub struct Registry {
    instant_binary: Vec<BinaryOperator>,
    named_binary: FxHashMap<&'static str, BinaryOperator>,
    instant_unary: Vec<UnaryOperator>,
    named_unary: FxHashMap<&'static str, UnaryOperator>,
    keywords: Vec<&'static str>,
    addition: BinaryOperator,
    multiplication: BinaryOperator,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A builder preloaded with the reference operator set and keywords,
    /// ready to be extended.
    pub fn standard_builder() -> RegistryBuilder {
        let mut builder = RegistryBuilder::new();
        for op in STANDARD_BINARY {
            builder = builder.register_binary(*op);
        }
        for op in STANDARD_UNARY {
            builder = builder.register_unary(*op);
        }
        for word in STANDARD_KEYWORDS {
            builder = builder.keyword(*word);
        }
        builder
    }

    /// Registry with the reference operator set
    pub fn standard() -> Result<Self, RegistryError> {
        Self::standard_builder().build()
    }

    pub fn binary_by_char(&self, c: char) -> Option<&BinaryOperator> {
        self.instant_binary
            .iter()
            .find(|op| op.symbol.chars().next() == Some(c))
    }

    pub fn unary_by_char(&self, c: char) -> Option<&UnaryOperator> {
        self.instant_unary
            .iter()
            .find(|op| op.symbol.chars().next() == Some(c))
    }

    pub fn binary_by_name(&self, word: &str) -> Option<&BinaryOperator> {
        self.named_binary.get(word)
    }

    pub fn unary_by_name(&self, word: &str) -> Option<&UnaryOperator> {
        self.named_unary.get(word)
    }

    /// True if `word` collides with a named operator, a keyword or a constant.
    /// Variable declarations with such names are refused.
    pub fn is_reserved_identifier(&self, word: &str) -> bool {
        self.named_binary.contains_key(word)
            || self.named_unary.contains_key(word)
            || self.keywords.iter().any(|k| *k == word)
            || variables::lookup_constant(word).is_some()
    }

    /// The operator inserted between two adjacent values, as in `2(3)` or `2pi`
    pub fn mul_connector(&self) -> &BinaryOperator {
        &self.multiplication
    }

    /// The operator inserted between a value and a following prefix operator.
    ///
    /// Negation joins with addition so that `5 -2` is `5 + (-2)`; every other
    /// prefix operator joins with multiplication (`2 sqrt 9` is `2 * sqrt 9`).
    pub fn connector_for(&self, op: &UnaryOperator) -> &BinaryOperator {
        if op.negation {
            &self.addition
        } else {
            &self.multiplication
        }
    }
}
