//! Variable declaration lines
//!
//! ```text
//! dim price: 12.5 * 4
//! ^^^ ^^^^^  ^^^^^^^^
//!  |    |       expression, evaluated in the line's scope
//!  |    name: ASCII letters and '_' only, not reserved
//!  keyword, `dim` or `Dim`, followed by a space
//! ```

use crate::calc::ast::Span;
use thiserror::Error;

/// Line prefixes that start a declaration
pub const DECLARATION_PREFIXES: [&str; 2] = ["dim ", "Dim "];

/// Characters in the keyword itself, without the trailing space
pub const KEYWORD_LEN: usize = 3;

/// Problems with the part of a declaration before the expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("Invalid Identifier")]
    InvalidIdentifier { span: Span },

    #[error("Missing ':'")]
    MissingColon { span: Span },

    #[error("Identifier Reserved")]
    Reserved { span: Span },
}

impl DeclarationError {
    pub fn span(&self) -> Span {
        match self {
            DeclarationError::InvalidIdentifier { span }
            | DeclarationError::MissingColon { span }
            | DeclarationError::Reserved { span } => *span,
        }
    }
}

/// A declaration split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub name_span: Span,
    pub expression: &'a str,
    /// Character offset of `expression` within the whole line
    pub expression_offset: usize,
}

pub fn is_declaration(line: &str) -> bool {
    DECLARATION_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Split a declaration line. `is_reserved` rejects names that would shadow an
/// operator, keyword or constant.
pub fn parse_declaration(
    line: &str,
    is_reserved: impl Fn(&str) -> bool,
) -> Result<Declaration<'_>, DeclarationError> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let byte_at = |index: usize| chars.get(index).map_or(line.len(), |(byte, _)| *byte);

    let mut name_start = KEYWORD_LEN + 1;
    while chars.get(name_start).is_some_and(|(_, c)| *c == ' ') {
        name_start += 1;
    }

    let Some(colon) = chars
        .iter()
        .skip(name_start)
        .position(|(_, c)| *c == ':')
        .map(|offset| name_start + offset)
    else {
        return Err(DeclarationError::MissingColon {
            span: Span::new(name_start.min(chars.len()), chars.len()),
        });
    };

    let name = line[byte_at(name_start)..byte_at(colon)].trim_end_matches(' ');
    let name_span = Span::new(name_start, name_start + name.chars().count());
    let through_colon = Span::new(name_start, colon + 1);

    if name.is_empty() || !name.chars().all(is_identifier_char) {
        return Err(DeclarationError::InvalidIdentifier {
            span: through_colon,
        });
    }
    if is_reserved(name) {
        return Err(DeclarationError::Reserved {
            span: through_colon,
        });
    }

    Ok(Declaration {
        name,
        name_span,
        expression: &line[byte_at(colon + 1)..],
        expression_offset: colon + 1,
    })
}
