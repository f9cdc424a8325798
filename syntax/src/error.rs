//! Parse errors reported to callers.
//!
//! Internally the parser works with [`Failure`] values carrying byte
//! offsets; at the boundary those become a [`ParseError`] with a
//! line/column [`Location`].

use std::fmt;
use std::ops::Range;

use thiserror::Error;

use crate::parser::state::Failure;

/// A position in the source. `line` and `column` are 1-based, the column
/// counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line_start = before.rfind('\n').map_or(0, |newline| newline + 1);
        Location {
            offset,
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input does not match the grammar
    #[error("Syntax error: {location}: expected {}, found {found}", .expected.join(" or "))]
    Structural {
        location: Location,
        expected: Vec<String>,
        found: String,
    },

    /// A reserved word where an identifier was required
    #[error("Syntax error: {location}: expected identifier but reserved word '{word}' found")]
    Lexical { word: String, location: Location },

    #[error("Syntax error: {location}: nesting deeper than {limit} levels")]
    TooDeep { limit: usize, location: Location },
}

impl ParseError {
    pub(crate) fn from_failure(failure: Failure, source: &str) -> Self {
        let location = Location::from_offset(source, failure.offset());
        match failure {
            Failure::Mismatch(mismatch) => ParseError::Structural {
                location,
                expected: mismatch.expected.iter().map(|label| label.to_string()).collect(),
                found: mismatch.found,
            },
            Failure::Reserved { word, .. } => ParseError::Lexical {
                word: word.to_string(),
                location,
            },
            Failure::TooDeep { limit, .. } => ParseError::TooDeep { limit, location },
        }
    }

    pub fn location(&self) -> Location {
        match self {
            ParseError::Structural { location, .. } => *location,
            ParseError::Lexical { location, .. } => *location,
            ParseError::TooDeep { location, .. } => *location,
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, ParseError::Structural { .. })
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, ParseError::Lexical { .. })
    }

    /// Short description without the location, for diagnostic labels
    pub fn label(&self) -> String {
        match self {
            ParseError::Structural { expected, found, .. } => {
                format!("expected {}, found {}", expected.join(" or "), found)
            }
            ParseError::Lexical { word, .. } => format!("'{}' is reserved", word),
            ParseError::TooDeep { limit, .. } => format!("more than {} nested groups", limit),
        }
    }

    /// Byte range to underline: the offending token's first character, or
    /// the last character of the source for failures at end of input.
    pub fn span(&self, source: &str) -> Range<usize> {
        let offset = self.location().offset;
        match source.get(offset..).and_then(|rest| rest.chars().next()) {
            Some(c) => offset..offset + c.len_utf8(),
            None => match source.char_indices().next_back() {
                Some((last, c)) => last..last + c.len_utf8(),
                None => 0..0,
            },
        }
    }
}
