/// Backtracking parser combinators
///
/// Alternation commits as soon as a branch consumes a token: `or(a, b)` only
/// tries `b` when `a` failed without moving the cursor. Reserved-word and
/// nesting-limit failures are fatal and pass through every combinator.
///
/// The grammar is left-factored, so it never needs [`attempt`].
use super::lexer::Token;
use super::state::{Cursor, Failure, Halt, Mismatch, Parser, Reply};

// === Sequencing ===

/// Cursor threaded through the steps of a [`sequence`].
pub struct Sequence<'a> {
    start: Cursor<'a>,
    cursor: Cursor<'a>,
}

impl<'a> Sequence<'a> {
    /// Run the next step. A failure after earlier steps consumed input is
    /// committed.
    pub fn run<T>(&mut self, parser: impl Parser<'a, T>) -> Result<T, Halt> {
        self.step(&parser)
    }

    pub fn step<T>(&mut self, parser: &impl Parser<'a, T>) -> Result<T, Halt> {
        match parser.parse(self.cursor) {
            Reply::Matched(value, rest) => {
                self.cursor = rest;
                Ok(value)
            }
            Reply::Failed(mut halt) => {
                halt.committed |= self.consumed();
                Err(halt)
            }
        }
    }

    pub fn consumed(&self) -> bool {
        self.cursor.index() > self.start.index()
    }
}

/// Run `body` as one parser; each `s.run(p)?` is a step that either yields
/// a value or aborts the whole sequence with no partial result.
pub fn sequence<'a, T>(
    input: Cursor<'a>,
    body: impl FnOnce(&mut Sequence<'a>) -> Result<T, Halt>,
) -> Reply<'a, T> {
    let mut seq = Sequence {
        start: input,
        cursor: input,
    };
    match body(&mut seq) {
        Ok(value) => Reply::Matched(value, seq.cursor),
        Err(halt) => Reply::Failed(halt),
    }
}

/// Parse `prefix`, discard it, then parse `parser`.
pub fn preceded<'a, P, T>(
    prefix: impl Parser<'a, P>,
    parser: impl Parser<'a, T>,
) -> impl Parser<'a, T> {
    move |input: Cursor<'a>| {
        sequence(input, |s| {
            s.step(&prefix)?;
            s.step(&parser)
        })
    }
}

/// Transform the result of a parser.
pub fn map<'a, T, U>(parser: impl Parser<'a, T>, f: impl Fn(T) -> U) -> impl Parser<'a, U> {
    move |input: Cursor<'a>| parser.parse(input).map(&f)
}

// === Alternation ===

/// Ordered choice: `right` is tried from the same cursor only if `left`
/// failed without consuming input.
pub fn or<'a, T>(left: impl Parser<'a, T>, right: impl Parser<'a, T>) -> impl Parser<'a, T> {
    move |input: Cursor<'a>| match left.parse(input) {
        Reply::Failed(first) if first.is_recoverable() => match right.parse(input) {
            Reply::Failed(second) if second.is_recoverable() => Reply::Failed(merge(first, second)),
            reply => reply,
        },
        reply => reply,
    }
}

fn merge(first: Halt, second: Halt) -> Halt {
    let error = match (first.error, second.error) {
        (Failure::Mismatch(a), Failure::Mismatch(b)) => Failure::Mismatch(a.merge(b)),
        (_, error) => error,
    };
    Halt {
        error,
        committed: false,
    }
}

/// Unbounded lookahead: a committed mismatch inside `parser` becomes an
/// uncommitted one, so an enclosing `or` may still try its next branch.
/// The mismatch keeps the offset where `parser` actually failed.
pub fn attempt<'a, T>(parser: impl Parser<'a, T>) -> impl Parser<'a, T> {
    move |input: Cursor<'a>| match parser.parse(input) {
        Reply::Failed(Halt {
            error: Failure::Mismatch(mismatch),
            committed: true,
        }) => Reply::Failed(Halt {
            error: Failure::Mismatch(mismatch),
            committed: false,
        }),
        reply => reply,
    }
}

/// Zero or one.
pub fn optional<'a, T>(parser: impl Parser<'a, T>) -> impl Parser<'a, Option<T>> {
    move |input: Cursor<'a>| match parser.parse(input) {
        Reply::Matched(value, rest) => Reply::Matched(Some(value), rest),
        Reply::Failed(halt) if halt.is_recoverable() => Reply::Matched(None, input),
        Reply::Failed(halt) => Reply::Failed(halt),
    }
}

// === Repetition ===

/// Zero or more occurrences
pub fn many<'a, T>(parser: impl Parser<'a, T>) -> impl Parser<'a, Vec<T>> {
    move |input: Cursor<'a>| repeat(&parser, input, Vec::new())
}

/// One or more occurrences
pub fn many1<'a, T>(parser: impl Parser<'a, T>) -> impl Parser<'a, Vec<T>> {
    move |input: Cursor<'a>| match parser.parse(input) {
        Reply::Matched(first, rest) if rest.index() == input.index() => {
            Reply::Matched(vec![first], rest)
        }
        Reply::Matched(first, rest) => repeat(&parser, rest, vec![first]),
        Reply::Failed(halt) => Reply::Failed(halt),
    }
}

fn repeat<'a, T>(
    parser: &impl Parser<'a, T>,
    mut cursor: Cursor<'a>,
    mut items: Vec<T>,
) -> Reply<'a, Vec<T>> {
    loop {
        match parser.parse(cursor) {
            Reply::Matched(item, rest) => {
                items.push(item);
                // An empty match would repeat forever
                if rest.index() == cursor.index() {
                    return Reply::Matched(items, rest);
                }
                cursor = rest;
            }
            Reply::Failed(halt) if halt.is_recoverable() => return Reply::Matched(items, cursor),
            Reply::Failed(halt) => return Reply::Failed(halt),
        }
    }
}

/// How the elements of a separated run relate to each other.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Siblings in one flat list
    Flat,
    /// Each element nests inside the one before it
    Chain,
}

/// `parser (separator parser)*`, split into the first element and the rest.
/// A separator must be followed by another element. For [`Shape::Chain`] the
/// element after the k-th separator is parsed k levels deeper than the first.
fn separated<'a, T, S>(
    parser: &impl Parser<'a, T>,
    separator: &impl Parser<'a, S>,
    shape: Shape,
    input: Cursor<'a>,
) -> Reply<'a, (T, Vec<T>)> {
    sequence(input, |s| {
        let first = s.step(parser)?;
        let base = s.cursor.depth();
        let mut others = Vec::new();
        loop {
            let after_separator = match separator.parse(s.cursor) {
                Reply::Matched(_, rest) => rest,
                Reply::Failed(halt) if halt.is_recoverable() => return Ok((first, others)),
                Reply::Failed(mut halt) => {
                    halt.committed |= s.consumed();
                    return Err(halt);
                }
            };
            let depth = match shape {
                Shape::Flat => base,
                Shape::Chain => base + others.len() + 1,
            };
            if depth > input.max_depth() {
                return Err(Halt {
                    error: Failure::TooDeep {
                        offset: after_separator.offset(),
                        limit: input.max_depth(),
                    },
                    committed: true,
                });
            }
            match parser.parse(after_separator.with_depth(depth)) {
                Reply::Matched(item, rest) => {
                    others.push(item);
                    s.cursor = rest.with_depth(base);
                }
                Reply::Failed(mut halt) => {
                    // the separator itself was consumed
                    halt.committed = true;
                    return Err(halt);
                }
            }
        }
    })
}

/// One or more `parser`s separated by `separator`. A separator must be
/// followed by another element.
pub fn sep_by1<'a, T, S>(
    parser: impl Parser<'a, T>,
    separator: impl Parser<'a, S>,
) -> impl Parser<'a, Vec<T>> {
    move |input: Cursor<'a>| {
        separated(&parser, &separator, Shape::Flat, input).map(|(first, others)| {
            let mut items = vec![first];
            items.extend(others);
            items
        })
    }
}

/// Zero or more `parser`s separated by `separator`.
pub fn sep_by<'a, T, S>(
    parser: impl Parser<'a, T>,
    separator: impl Parser<'a, S>,
) -> impl Parser<'a, Vec<T>> {
    map(optional(sep_by1(parser, separator)), Option::unwrap_or_default)
}

/// Like [`sep_by1`] for elements that end up right-nested: every element
/// after a separator counts one nesting level deeper than the one before.
pub fn chain1<'a, T, S>(
    parser: impl Parser<'a, T>,
    separator: impl Parser<'a, S>,
) -> impl Parser<'a, Vec<T>> {
    move |input: Cursor<'a>| {
        separated(&parser, &separator, Shape::Chain, input).map(|(first, others)| {
            let mut items = vec![first];
            items.extend(others);
            items
        })
    }
}

/// [`chain1`] folded to the right with `join`: `a , b , c` gives
/// `join(a, join(b, c))`.
pub fn chain_right1<'a, T, S>(
    parser: impl Parser<'a, T>,
    separator: impl Parser<'a, S>,
    join: impl Fn(T, T) -> T,
) -> impl Parser<'a, T> {
    move |input: Cursor<'a>| {
        separated(&parser, &separator, Shape::Chain, input).map(|(first, mut others)| {
            let Some(mut folded) = others.pop() else {
                return first;
            };
            while let Some(item) = others.pop() {
                folded = join(item, folded);
            }
            join(first, folded)
        })
    }
}

// === Resource guard ===

/// Run `parser` one nesting level deeper, failing fatally past the limit.
/// Used right after an opening delimiter has been consumed.
pub fn nested<'a, T>(parser: impl Parser<'a, T>) -> impl Parser<'a, T> {
    move |input: Cursor<'a>| {
        let depth = input.depth() + 1;
        if depth > input.max_depth() {
            return Reply::Failed(Halt {
                error: Failure::TooDeep {
                    offset: input.offset(),
                    limit: input.max_depth(),
                },
                committed: false,
            });
        }
        match parser.parse(input.with_depth(depth)) {
            Reply::Matched(value, rest) => Reply::Matched(value, rest.with_depth(input.depth())),
            Reply::Failed(halt) => Reply::Failed(halt),
        }
    }
}

// === Driver ===

/// Require `parser` to consume the whole input.
pub fn strict<'a, T>(parser: impl Parser<'a, T>) -> impl Parser<'a, T> {
    move |input: Cursor<'a>| match parser.parse(input) {
        Reply::Matched(value, rest) if rest.is_at_end() => Reply::Matched(value, rest),
        Reply::Matched(_, rest) => Reply::Failed(Halt {
            error: Failure::Mismatch(Mismatch::at(rest, "end of input")),
            committed: rest.index() > input.index(),
        }),
        Reply::Failed(halt) => Reply::Failed(halt),
    }
}

// === Primitive Parsers ===

/// Match one fixed token
fn expect<'a>(input: Cursor<'a>, expected: &Token, label: &'static str) -> Reply<'a, ()> {
    match input.next_token() {
        Some(token) if token == expected => Reply::Matched((), input.advance()),
        _ => Reply::Failed(Halt::mismatch(input, label)),
    }
}

pub fn keyword_module<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::Module, "'module'")
}

pub fn keyword_type<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::Type, "'type'")
}

pub fn lparen<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::LParen, "'('")
}

pub fn rparen<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::RParen, "')'")
}

pub fn lbracket<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::LBracket, "'['")
}

pub fn rbracket<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::RBracket, "']'")
}

pub fn dot<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::Dot, "'.'")
}

pub fn comma<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::Comma, "','")
}

pub fn semicolon<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::Semicolon, "';'")
}

pub fn pipe<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::Pipe, "'|'")
}

pub fn colon_dash<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::ColonDash, "':-'")
}

pub fn arrow<'a>(input: Cursor<'a>) -> Reply<'a, ()> {
    expect(input, &Token::Arrow, "'->'")
}

/// Lowercase identifier. A reserved word here is a fatal error, not a
/// mismatch.
pub fn identifier<'a>(input: Cursor<'a>) -> Reply<'a, String> {
    match input.next_token() {
        Some(Token::Ident(name)) => Reply::Matched(name.clone(), input.advance()),
        Some(token) => match token.reserved_word() {
            Some(word) => Reply::Failed(Halt {
                error: Failure::Reserved {
                    offset: input.offset(),
                    word,
                },
                committed: false,
            }),
            None => Reply::Failed(Halt::mismatch(input, "identifier")),
        },
        None => Reply::Failed(Halt::mismatch(input, "identifier")),
    }
}

/// Uppercase variable
pub fn variable<'a>(input: Cursor<'a>) -> Reply<'a, String> {
    match input.next_token() {
        Some(Token::Var(name)) => Reply::Matched(name.clone(), input.advance()),
        _ => Reply::Failed(Halt::mismatch(input, "variable")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{tokenize, Lexeme};

    fn lexed(source: &str) -> Vec<Lexeme> {
        tokenize(source)
    }

    fn run<T>(
        source: &str,
        parser: impl for<'a> Fn(Cursor<'a>) -> Reply<'a, T>,
    ) -> Result<(T, usize), Halt> {
        run_limited(source, 16, parser)
    }

    fn run_limited<T>(
        source: &str,
        max_depth: usize,
        parser: impl for<'a> Fn(Cursor<'a>) -> Reply<'a, T>,
    ) -> Result<(T, usize), Halt> {
        let lexemes = lexed(source);
        match parser(Cursor::new(&lexemes, source.len(), max_depth)) {
            Reply::Matched(value, rest) => Ok((value, rest.index())),
            Reply::Failed(halt) => Err(halt),
        }
    }

    /// identifier followed by a dot, committing on the identifier
    fn ident_dot<'a>(input: Cursor<'a>) -> Reply<'a, String> {
        sequence(input, |s| {
            let name = s.run(identifier)?;
            s.run(dot)?;
            Ok(name)
        })
    }

    #[test]
    fn test_sequence_threads_cursor() {
        let (name, index) = run("abc.", ident_dot).unwrap();
        assert_eq!(name, "abc");
        assert_eq!(index, 2);
    }

    #[test]
    fn test_sequence_commits_after_consuming() {
        let halt = run("abc ,", ident_dot).unwrap_err();
        assert!(halt.committed);
        assert_eq!(halt.error.offset(), 4);
    }

    #[test]
    fn test_sequence_failing_first_step_is_uncommitted() {
        let halt = run("X.", ident_dot).unwrap_err();
        assert!(!halt.committed);
    }

    #[test]
    fn test_or_tries_right_on_uncommitted_failure() {
        let (value, _) = run("X", |input| or(identifier, variable).parse(input)).unwrap();
        assert_eq!(value, "X");
    }

    #[test]
    fn test_or_does_not_backtrack_after_commit() {
        let halt = run("a b", |input| {
            or(ident_dot, map(identifier, |name| name + "!")).parse(input)
        })
        .unwrap_err();
        assert!(halt.committed);
    }

    #[test]
    fn test_attempt_restores_backtracking() {
        let (value, index) = run("a b", |input| {
            or(attempt(ident_dot), map(identifier, |name| name + "!")).parse(input)
        })
        .unwrap();
        assert_eq!(value, "a!");
        assert_eq!(index, 1);
    }

    #[test]
    fn test_attempt_keeps_failure_offset() {
        let halt = run("a b", |input| attempt(ident_dot).parse(input)).unwrap_err();
        assert!(!halt.committed);
        assert_eq!(halt.error.offset(), 2);
    }

    #[test]
    fn test_or_merges_expectations() {
        let halt = run(".", |input| or(identifier, variable).parse(input)).unwrap_err();
        match halt.error {
            Failure::Mismatch(mismatch) => {
                assert_eq!(mismatch.expected, vec!["identifier", "variable"]);
                assert_eq!(mismatch.found, "'.'");
            }
            other => panic!("Expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_reserved_word_is_not_backtracked() {
        let halt = run("type", |input| {
            or(identifier, map(keyword_type, |_| String::new())).parse(input)
        })
        .unwrap_err();
        assert_eq!(halt.error, Failure::Reserved { offset: 0, word: "type" });
    }

    #[test]
    fn test_many_collects_until_mismatch() {
        let (items, index) = run("a b c .", |input| many(identifier).parse(input)).unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(index, 3);
    }

    #[test]
    fn test_many_accepts_zero() {
        let (items, index) = run(".", |input| many(identifier).parse(input)).unwrap();
        assert!(items.is_empty());
        assert_eq!(index, 0);
    }

    #[test]
    fn test_many_propagates_committed_failure() {
        let halt = run("a. b", |input| many(ident_dot).parse(input)).unwrap_err();
        assert!(halt.committed);
    }

    #[test]
    fn test_many1_requires_one() {
        assert!(run(".", |input| many1(identifier).parse(input)).is_err());
        let (items, _) = run("a b", |input| many1(identifier).parse(input)).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_sep_by1() {
        let (items, index) =
            run("a, b, c", |input| sep_by1(identifier, comma).parse(input)).unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(index, 5);
    }

    #[test]
    fn test_sep_by1_rejects_trailing_separator() {
        let halt = run("a, b,", |input| sep_by1(identifier, comma).parse(input)).unwrap_err();
        assert!(halt.committed);
        assert_eq!(halt.error.offset(), 5);
    }

    #[test]
    fn test_sep_by1_ignores_nesting_limit() {
        let (items, _) =
            run_limited("a, b, c, d", 1, |input| sep_by1(identifier, comma).parse(input)).unwrap();
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn test_chain1_counts_each_link_as_a_level() {
        let (items, index) =
            run_limited("a, b, c", 2, |input| chain1(identifier, comma).parse(input)).unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(index, 5);

        let halt = run_limited("a, b, c, d", 2, |input| chain1(identifier, comma).parse(input))
            .unwrap_err();
        assert_eq!(halt.error, Failure::TooDeep { offset: 9, limit: 2 });
        assert!(halt.committed);
    }

    #[test]
    fn test_chain1_restores_depth() {
        let lexemes = lexed("a, b, c");
        let input = Cursor::new(&lexemes, 7, 4);
        match chain1(identifier, comma).parse(input) {
            Reply::Matched(_, rest) => assert_eq!(rest.depth(), 0),
            Reply::Failed(halt) => panic!("unexpected failure {:?}", halt),
        };
    }

    #[test]
    fn test_chain_right1_folds_to_the_right() {
        let join = |left: String, right: String| format!("({} {})", left, right);
        let (value, _) =
            run("a; b; c", |input| chain_right1(identifier, semicolon, join).parse(input)).unwrap();
        assert_eq!(value, "(a (b c))");

        let (single, _) =
            run("a", |input| chain_right1(identifier, semicolon, join).parse(input)).unwrap();
        assert_eq!(single, "a");
    }

    #[test]
    fn test_chain_right1_long_chain_fails_without_recursing() {
        let source = vec!["a"; 100_000].join(",");
        let halt = run_limited(&source, 256, |input| {
            chain_right1(identifier, comma, |left, right| left + &right).parse(input)
        })
        .unwrap_err();
        assert!(matches!(halt.error, Failure::TooDeep { limit: 256, .. }));
    }

    #[test]
    fn test_sep_by_accepts_empty() {
        let (items, index) = run("]", |input| sep_by(identifier, comma).parse(input)).unwrap();
        assert!(items.is_empty());
        assert_eq!(index, 0);
    }

    #[test]
    fn test_optional() {
        let (value, index) = run("X", |input| optional(identifier).parse(input)).unwrap();
        assert_eq!(value, None);
        assert_eq!(index, 0);
    }

    #[test]
    fn test_preceded_keeps_right() {
        let (value, _) = run(", X", |input| preceded(comma, variable).parse(input)).unwrap();
        assert_eq!(value, "X");
    }

    #[test]
    fn test_strict_rejects_leftovers() {
        let halt = run("a b", |input| strict(identifier).parse(input)).unwrap_err();
        match halt.error {
            Failure::Mismatch(mismatch) => {
                assert_eq!(mismatch.offset, 2);
                assert_eq!(mismatch.expected, vec!["end of input"]);
            }
            other => panic!("Expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_enforces_limit() {
        let lexemes = lexed("a");
        let input = Cursor::new(&lexemes, 1, 1);
        match nested(identifier).parse(input) {
            Reply::Matched(_, rest) => assert_eq!(rest.depth(), 0),
            Reply::Failed(halt) => panic!("unexpected failure {:?}", halt),
        }
        match nested(nested(identifier)).parse(input) {
            Reply::Failed(halt) => assert_eq!(halt.error, Failure::TooDeep { offset: 0, limit: 1 }),
            Reply::Matched(..) => panic!("Expected depth failure"),
        };
    }

    #[test]
    fn test_invalid_text_is_a_mismatch() {
        let halt = run("!", identifier).unwrap_err();
        match halt.error {
            Failure::Mismatch(mismatch) => assert_eq!(mismatch.found, "unrecognized input"),
            other => panic!("Expected mismatch, got {:?}", other),
        }
    }
}
