/// Lexer for horn using logos
///
/// Converts source text into tokens. Layout between tokens is skipped, so
/// every token behaves as a lexeme that swallows the whitespace after it.
use logos::Logos;

use crate::ast::Span;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Keywords
    #[token("module")]
    Module,

    #[token("type")]
    Type,

    // Identifiers
    #[regex(r"[a-z_][a-zA-Z_0-9]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[A-Z][a-zA-Z_0-9]*", |lex| lex.slice().to_string())]
    Var(String),

    // Operators
    #[token(":-")]
    ColonDash,

    #[token("->")]
    Arrow,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("|")]
    Pipe,

    // Delimiters
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(".")]
    Dot,
}

impl Token {
    /// The spelling of a keyword token, if this is one.
    pub fn reserved_word(&self) -> Option<&'static str> {
        match self {
            Token::Module => Some("module"),
            Token::Type => Some("type"),
            _ => None,
        }
    }

    /// Human-readable description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Module => "'module'".to_string(),
            Token::Type => "'type'".to_string(),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Var(name) => format!("variable '{}'", name),
            Token::ColonDash => "':-'".to_string(),
            Token::Arrow => "'->'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Dot => "'.'".to_string(),
        }
    }
}

/// One lexed unit of the source.
///
/// `token` is `None` for text that no token matches; the parser fails on it
/// only once it gets that far, so errors earlier in the source win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Option<Token>,
    pub span: Span,
}

/// Split a whole source into lexemes.
pub fn tokenize(source: &str) -> Vec<Lexeme> {
    Token::lexer(source)
        .spanned()
        .map(|(result, range)| Lexeme {
            token: result.ok(),
            span: Span {
                start: range.start,
                end: range.end,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_keywords() {
        let mut lex = Token::lexer("module type");
        assert_eq!(lex.next(), Some(Ok(Token::Module)));
        assert_eq!(lex.next(), Some(Ok(Token::Type)));
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let mut lex = Token::lexer("modulename types type_");
        assert_eq!(lex.next(), Some(Ok(Token::Ident("modulename".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Ident("types".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Ident("type_".to_string()))));
    }

    #[test]
    fn test_lex_identifiers() {
        let mut lex = Token::lexer("name_123 _x Alice X9");
        assert_eq!(lex.next(), Some(Ok(Token::Ident("name_123".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Ident("_x".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Var("Alice".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Var("X9".to_string()))));
    }

    #[test]
    fn test_lex_punctuation() {
        let mut lex = Token::lexer(":- -> , ; | ( ) [ ] .");
        assert_eq!(lex.next(), Some(Ok(Token::ColonDash)));
        assert_eq!(lex.next(), Some(Ok(Token::Arrow)));
        assert_eq!(lex.next(), Some(Ok(Token::Comma)));
        assert_eq!(lex.next(), Some(Ok(Token::Semicolon)));
        assert_eq!(lex.next(), Some(Ok(Token::Pipe)));
        assert_eq!(lex.next(), Some(Ok(Token::LParen)));
        assert_eq!(lex.next(), Some(Ok(Token::RParen)));
        assert_eq!(lex.next(), Some(Ok(Token::LBracket)));
        assert_eq!(lex.next(), Some(Ok(Token::RBracket)));
        assert_eq!(lex.next(), Some(Ok(Token::Dot)));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_skip_layout() {
        let mut lex = Token::lexer("\t\n  a \r\n\n\tb\t");
        assert_eq!(lex.next(), Some(Ok(Token::Ident("a".to_string()))));
        assert_eq!(lex.next(), Some(Ok(Token::Ident("b".to_string()))));
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn test_tokenize_keeps_invalid_text() {
        let lexemes = tokenize("name!");
        assert_eq!(lexemes.len(), 2);
        assert_eq!(lexemes[0].token, Some(Token::Ident("name".to_string())));
        assert_eq!(lexemes[1].token, None);
        assert_eq!(lexemes[1].span, Span { start: 4, end: 5 });
    }
}
