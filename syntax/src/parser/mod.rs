/// Parser for horn source code
///
/// Uses logos for lexing and the combinators in [`combinators`] for parsing.
use std::fmt;

use log::{debug, trace};

use crate::ast::*;
use crate::error::ParseError;

pub mod combinators;
pub mod grammar;
pub mod lexer;
pub mod state;

use combinators::strict;
use state::{Cursor, Parser, Reply};

/// Grammar rule to start parsing from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Entry {
    #[default]
    Program,
    Atom,
    TypeSeq,
    TypeDef,
    Module,
    Relation,
    List,
}

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting. Parentheses, brackets, each `,`/`;` link
    /// and each list element after the first add a level.
    pub max_depth: usize,
}

impl ParseOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 256;
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Result of parsing from some [`Entry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syntax {
    Program(Program),
    Atom(Atom),
    TypeSeq(TypeSeq),
    TypeDef(TypeDef),
    Module(Module),
    Relation(Relation),
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Syntax::Program(program) => write!(f, "{}", program),
            Syntax::Atom(atom) => write!(f, "{}", atom),
            Syntax::TypeSeq(seq) => write!(f, "{}", seq),
            Syntax::TypeDef(typedef) => write!(f, "{}", typedef),
            Syntax::Module(module) => write!(f, "{}", module),
            Syntax::Relation(relation) => write!(f, "{}", relation),
        }
    }
}

/// Parse a whole horn program
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    run(source, &ParseOptions::default(), grammar::program)
}

/// Parse `source` as a single `entry` construct
pub fn parse_entry(entry: Entry, source: &str) -> Result<Syntax, ParseError> {
    parse_with(entry, source, &ParseOptions::default())
}

pub fn parse_with(
    entry: Entry,
    source: &str,
    options: &ParseOptions,
) -> Result<Syntax, ParseError> {
    debug!("parsing {:?} from {} bytes", entry, source.len());
    match entry {
        Entry::Program => run(source, options, grammar::program).map(Syntax::Program),
        Entry::Atom => run(source, options, grammar::atom).map(Syntax::Atom),
        Entry::TypeSeq => run(source, options, grammar::type_seq).map(Syntax::TypeSeq),
        Entry::TypeDef => run(source, options, grammar::type_def).map(Syntax::TypeDef),
        Entry::Module => run(source, options, grammar::module_decl).map(Syntax::Module),
        Entry::Relation => run(source, options, grammar::relation).map(Syntax::Relation),
        Entry::List => run(source, options, grammar::list).map(Syntax::Atom),
    }
}

/// Lex `source` and run `rule` over all of it
fn run<T, F>(source: &str, options: &ParseOptions, rule: F) -> Result<T, ParseError>
where
    F: for<'a> Fn(Cursor<'a>) -> Reply<'a, T>,
{
    let lexemes = lexer::tokenize(source);
    trace!("lexed {} tokens", lexemes.len());

    let input = Cursor::new(&lexemes, source.len(), options.max_depth);
    let result = match strict(rule).parse(input) {
        Reply::Matched(value, _) => Ok(value),
        Reply::Failed(halt) => {
            debug!("parse failed (committed: {}): {:?}", halt.committed, halt.error);
            Err(ParseError::from_failure(halt.error, source))
        }
    };
    result
}
