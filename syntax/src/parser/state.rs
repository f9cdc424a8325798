/// Parser state: the input cursor and the tagged reply every parser returns
use super::lexer::{Lexeme, Token};

/// Immutable position in a lexed input.
///
/// A cursor is `Copy`; advancing produces a new cursor and leaves the old one
/// valid, so alternation can always restart from where it was invoked.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    lexemes: &'a [Lexeme],
    index: usize,
    eof: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Cursor<'a> {
    /// `eof` is the byte offset reported for failures at the end of input.
    pub fn new(lexemes: &'a [Lexeme], eof: usize, max_depth: usize) -> Self {
        Self {
            lexemes,
            index: 0,
            eof,
            depth: 0,
            max_depth,
        }
    }

    pub fn peek(&self) -> Option<&'a Lexeme> {
        self.lexemes.get(self.index)
    }

    pub fn advance(self) -> Self {
        Self {
            index: (self.index + 1).min(self.lexemes.len()),
            ..self
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.lexemes.len()
    }

    /// Byte offset of the next lexeme, or of the end of input.
    pub fn offset(&self) -> usize {
        self.peek().map_or(self.eof, |lexeme| lexeme.span.start)
    }

    /// Description of the next lexeme for "found ..." messages.
    pub fn found(&self) -> String {
        match self.peek() {
            Some(Lexeme {
                token: Some(token), ..
            }) => token.describe(),
            Some(Lexeme { token: None, .. }) => "unrecognized input".to_string(),
            None => "end of input".to_string(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn with_depth(self, depth: usize) -> Self {
        Self { depth, ..self }
    }

    pub(crate) fn next_token(&self) -> Option<&'a Token> {
        self.peek().and_then(|lexeme| lexeme.token.as_ref())
    }
}

/// Structural mismatch: the grammar did not match at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub offset: usize,
    pub expected: Vec<&'static str>,
    pub found: String,
}

impl Mismatch {
    pub fn at(cursor: Cursor<'_>, expected: &'static str) -> Self {
        Self {
            offset: cursor.offset(),
            expected: vec![expected],
            found: cursor.found(),
        }
    }

    /// Combine two failures of sibling alternatives; the one that got
    /// further wins, equal offsets pool their expectations.
    pub fn merge(mut self, other: Mismatch) -> Mismatch {
        if other.offset > self.offset {
            return other;
        }
        if other.offset == self.offset {
            for label in other.expected {
                if !self.expected.contains(&label) {
                    self.expected.push(label);
                }
            }
        }
        self
    }
}

/// Why a parser failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Ordinary grammar mismatch; alternation may try something else.
    Mismatch(Mismatch),
    /// A reserved word sat where an identifier was required.
    Reserved { offset: usize, word: &'static str },
    /// Parentheses or brackets nested deeper than the configured limit.
    TooDeep { offset: usize, limit: usize },
}

impl Failure {
    pub fn offset(&self) -> usize {
        match self {
            Failure::Mismatch(mismatch) => mismatch.offset,
            Failure::Reserved { offset, .. } => *offset,
            Failure::TooDeep { offset, .. } => *offset,
        }
    }

    /// Hard failures abort the parse regardless of commitment.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Failure::Mismatch(_))
    }
}

/// A failed parse and whether input had been consumed before it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    pub error: Failure,
    pub committed: bool,
}

impl Halt {
    pub fn mismatch(cursor: Cursor<'_>, expected: &'static str) -> Self {
        Self {
            error: Failure::Mismatch(Mismatch::at(cursor, expected)),
            committed: false,
        }
    }

    /// Alternation may only move on from failures that are neither
    /// committed nor fatal.
    pub fn is_recoverable(&self) -> bool {
        !self.committed && !self.error.is_fatal()
    }
}

/// Result of running a parser on a cursor.
#[derive(Debug)]
pub enum Reply<'a, T> {
    Matched(T, Cursor<'a>),
    Failed(Halt),
}

impl<'a, T> Reply<'a, T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<'a, U> {
        match self {
            Reply::Matched(value, rest) => Reply::Matched(f(value), rest),
            Reply::Failed(halt) => Reply::Failed(halt),
        }
    }
}

/// Anything that can parse a `T` from a cursor.
pub trait Parser<'a, T> {
    fn parse(&self, input: Cursor<'a>) -> Reply<'a, T>;
}

// Grammar rules are plain functions; closures work too
impl<'a, T, F> Parser<'a, T> for F
where
    F: Fn(Cursor<'a>) -> Reply<'a, T>,
{
    fn parse(&self, input: Cursor<'a>) -> Reply<'a, T> {
        self(input)
    }
}
