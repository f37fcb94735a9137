//! Lexer for CQL-style DDL using logos.

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;

/// Token types for DDL statements.
///
/// Statement keywords are case-insensitive. Type constructors such as `list`
/// or `vector` are lexed as identifiers and recognised by the parser, so they
/// remain usable as column names.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"--[^\n]*")]
pub enum Token {
    // Statement keywords
    #[token("create", ignore(ascii_case))]
    Create,
    #[token("alter", ignore(ascii_case))]
    Alter,
    #[token("table", ignore(ascii_case))]
    Table,
    #[token("type", ignore(ascii_case))]
    Type,
    #[token("add", ignore(ascii_case))]
    Add,
    #[token("use", ignore(ascii_case))]
    Use,

    // Column and clause keywords
    #[token("primary", ignore(ascii_case))]
    Primary,
    #[token("key", ignore(ascii_case))]
    Key,
    #[token("static", ignore(ascii_case))]
    Static,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("not", ignore(ascii_case))]
    Not,
    #[token("exists", ignore(ascii_case))]
    Exists,

    // Unquoted identifiers are case-insensitive and normalised to lower case.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_ascii_lowercase())]
    Ident(String),

    // Quoted identifiers keep their case; `""` escapes a quote.
    #[regex(r#""([^"]|"")+""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].replace("\"\"", "\"")
    })]
    QuotedIdent(String),

    // Kept as text so the parser can report out-of-range values precisely.
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Int(String),

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
}

impl Token {
    /// Human-readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::QuotedIdent(name) => format!("identifier \"{}\"", name),
            Token::Int(value) => format!("integer {}", value),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Semicolon => "';'".to_string(),
            keyword => format!("keyword {}", format!("{:?}", keyword).to_ascii_uppercase()),
        }
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens with one token of lookahead.
///
/// Lexing stops at the first unrecognised character; the error is kept and
/// handed to the parser through [`Lexer::take_error`].
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<SpannedToken>>,
    error: Option<ParseError>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
            error: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&SpannedToken> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        self.peeked.as_ref().and_then(|o| o.as_ref())
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Option<SpannedToken> {
        if let Some(peeked) = self.peeked.take() {
            peeked
        } else {
            self.next_inner()
        }
    }

    /// Take the lexing error that ended the token stream, if any.
    pub fn take_error(&mut self) -> Option<ParseError> {
        self.error.take()
    }

    fn next_inner(&mut self) -> Option<SpannedToken> {
        if self.error.is_some() {
            return None;
        }
        match self.inner.next() {
            Some(Ok(token)) => Some(SpannedToken {
                token,
                span: self.inner.span().into(),
            }),
            Some(Err(())) => {
                self.error = Some(ParseError::new(
                    format!("unexpected character sequence '{}'", self.inner.slice()),
                    self.inner.span().into(),
                ));
                None
            }
            None => None,
        }
    }

    /// Get the source string.
    pub fn source(&self) -> &'source str {
        self.inner.source()
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a source string into a vector of spanned tokens.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source).into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            tokens("CREATE TABLE ks.t (k int PRIMARY KEY)"),
            vec![
                Token::Create,
                Token::Table,
                Token::Ident("ks".to_string()),
                Token::Dot,
                Token::Ident("t".to_string()),
                Token::LParen,
                Token::Ident("k".to_string()),
                Token::Ident("int".to_string()),
                Token::Primary,
                Token::Key,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            tokens("alter Type If nOt EXISTS"),
            vec![Token::Alter, Token::Type, Token::If, Token::Not, Token::Exists]
        );
    }

    #[test]
    fn test_nested_type_closers_are_separate_tokens() {
        let toks = tokens("map<frozen<set<vector<int, 5>>>, int>");
        assert_eq!(toks.iter().filter(|t| **t == Token::Gt).count(), 4);
        assert_eq!(toks.iter().filter(|t| **t == Token::Lt).count(), 4);
        assert!(toks.contains(&Token::Int("5".to_string())));
    }

    #[test]
    fn test_identifiers_are_lowercased_unless_quoted() {
        assert_eq!(
            tokens(r#"MyCol "MyCol" "say ""hi""""#),
            vec![
                Token::Ident("mycol".to_string()),
                Token::QuotedIdent("MyCol".to_string()),
                Token::QuotedIdent("say \"hi\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_and_semicolons() {
        assert_eq!(
            tokens("USE ks; -- switch keyspace\n"),
            vec![Token::Use, Token::Ident("ks".to_string()), Token::Semicolon]
        );
    }

    #[test]
    fn test_invalid_character_stops_lexing() {
        let mut lexer = Lexer::new("CREATE TABLE t $");
        let collected: Vec<_> = lexer.by_ref().collect();
        assert_eq!(collected.len(), 3);
        let err = lexer.take_error().expect("lexing error");
        assert_eq!(err.span, Span::new(15, 16));
    }

    #[test]
    fn test_lexer_peek() {
        let mut lexer = Lexer::new("ks.t");

        assert_eq!(
            lexer.peek().map(|t| &t.token),
            Some(&Token::Ident("ks".to_string()))
        );
        assert_eq!(
            lexer.peek().map(|t| &t.token),
            Some(&Token::Ident("ks".to_string()))
        );
        assert_eq!(
            lexer.next_token().map(|t| t.token),
            Some(Token::Ident("ks".to_string()))
        );
        assert_eq!(lexer.next_token().map(|t| t.token), Some(Token::Dot));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::Primary.describe(), "keyword PRIMARY");
        assert_eq!(Token::Gt.describe(), "'>'");
        assert_eq!(Token::Int("12".into()).describe(), "integer 12");
    }
}
