//! Best-effort parsing of list-valued corpus fields.
//!
//! Recipe exports store ingredient and step lists either as a list literal
//! (`['flour', "baker's sugar"]`) or as plain delimited text. A literal that
//! fails to parse never fails the load: the raw text is split on the field's
//! delimiter instead.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldParseError {
    #[error("Not a list literal")]
    NotAList,

    #[error("Unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("Trailing content after closing bracket")]
    TrailingContent,
}

/// How a list field was split when no list literal was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Split on commas (ingredient lists)
    Comma,
    /// Split on line breaks (instruction steps)
    Line,
}

/// Outcome of [`parse_list_field`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldParse {
    /// The field was a well-formed list literal
    Literal(Vec<String>),
    /// The field was split on its delimiter
    Fallback(Vec<String>),
}

impl FieldParse {
    #[must_use]
    pub fn items(&self) -> &[String] {
        match self {
            Self::Literal(items) | Self::Fallback(items) => items,
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Literal(items) | Self::Fallback(items) => items,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Parse a list-valued field, falling back to delimiter splitting.
///
/// Empty items are dropped in both cases.
#[must_use]
pub fn parse_list_field(text: &str, delimiter: Delimiter) -> FieldParse {
    match parse_list_literal(text) {
        Ok(items) => FieldParse::Literal(clean(items)),
        Err(e) => {
            if text.trim_start().starts_with('[') {
                tracing::debug!("Malformed list literal ({e}), splitting on delimiter");
            }
            FieldParse::Fallback(split_delimited(text, delimiter))
        }
    }
}

/// Parse a list literal of single- or double-quoted strings.
///
/// Supports backslash escapes inside strings and an optional trailing comma.
///
/// # Errors
///
/// Returns `FieldParseError::NotAList` if the text is not bracketed, or a
/// positional error when the literal is malformed.
pub fn parse_list_literal(text: &str) -> Result<Vec<String>, FieldParseError> {
    let trimmed = text.trim();
    if !trimmed.starts_with('[') {
        return Err(FieldParseError::NotAList);
    }

    let mut items = Vec::new();
    let mut chars = trimmed.char_indices().skip(1);
    let mut expect_item = true;

    loop {
        let Some((offset, ch)) = chars.next() else {
            return Err(FieldParseError::NotAList);
        };

        match ch {
            c if c.is_whitespace() => {}
            ']' => break,
            ',' if !expect_item => expect_item = true,
            '\'' | '"' if expect_item => {
                let quote = ch;
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some((_, escaped)) = chars.next() {
                                value.push(match escaped {
                                    'n' => '\n',
                                    't' => '\t',
                                    other => other,
                                });
                            }
                        }
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => value.push(c),
                    }
                }
                if !closed {
                    return Err(FieldParseError::UnterminatedString(offset));
                }
                items.push(value);
                expect_item = false;
            }
            other => {
                return Err(FieldParseError::UnexpectedCharacter { ch: other, offset });
            }
        }
    }

    if chars.any(|(_, c)| !c.is_whitespace()) {
        return Err(FieldParseError::TrailingContent);
    }

    Ok(items)
}

/// Separators between quoted items of a list literal
const ITEM_BOUNDARIES: [&str; 4] = ["', '", "\", \"", "','", "\",\""];

fn split_delimited(text: &str, delimiter: Delimiter) -> Vec<String> {
    let bracketed = text.trim_start().starts_with('[');
    let stripped = text.trim().trim_start_matches('[').trim_end_matches(']');
    let pieces: Vec<&str> = match delimiter {
        Delimiter::Comma => stripped.split(',').collect(),
        // a broken literal still separates its items with quote-comma-quote
        Delimiter::Line if bracketed => stripped.lines().flat_map(split_quoted_items).collect(),
        Delimiter::Line => stripped.lines().collect(),
    };
    clean(
        pieces
            .into_iter()
            .map(|p| p.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .collect(),
    )
}

fn split_quoted_items(line: &str) -> Vec<&str> {
    ITEM_BOUNDARIES.iter().fold(vec![line], |pieces, boundary| {
        pieces
            .into_iter()
            .flat_map(|piece| piece.split(*boundary))
            .collect()
    })
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
