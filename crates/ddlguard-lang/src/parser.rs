//! Recursive descent parser for DDL statements.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Names that introduce a parameterised type and must be followed by `<`.
const TYPE_CONSTRUCTORS: &[&str] = &["list", "set", "map", "tuple", "frozen", "vector"];

/// Deepest nesting of parameterised types a declaration may use.
pub const MAX_TYPE_DEPTH: usize = 128;

/// Parser for CQL-style DDL.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
    /// Type constructors currently open.
    depth: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
            depth: 0,
        }
    }

    /// Parse exactly one statement, with an optional trailing `;`.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let stmt = self.parse_statement_body()?;
        self.consume_if(&Token::Semicolon);

        if let Some(tok) = self.lexer.next_token() {
            return Err(ParseError::new(
                format!("unexpected {} after end of statement", tok.token.describe()),
                tok.span,
            )
            .with_hint("separate multiple statements with ';' and parse them as a script"));
        }
        self.check_lexer()?;

        Ok(stmt)
    }

    /// Parse a `;`-separated sequence of statements.
    pub fn parse_script(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();

        loop {
            while self.consume_if(&Token::Semicolon).is_some() {}
            if self.lexer.peek().is_none() {
                break;
            }

            statements.push(self.parse_statement_body()?);

            if self.consume_if(&Token::Semicolon).is_none() {
                if let Some(tok) = self.lexer.next_token() {
                    return Err(ParseError::new(
                        format!("expected ';' between statements, found {}", tok.token.describe()),
                        tok.span,
                    ));
                }
            }
        }

        self.check_lexer()?;
        Ok(statements)
    }

    fn parse_statement_body(&mut self) -> Result<Statement, ParseError> {
        let first = self.next_token()?;

        match first.token {
            Token::Create => {
                let what = self.next_token()?;
                match what.token {
                    Token::Table => self.parse_create_table(first.span),
                    Token::Type => self.parse_create_type(first.span),
                    other => Err(ParseError::new(
                        format!("expected TABLE or TYPE after CREATE, found {}", other.describe()),
                        what.span,
                    )),
                }
            }
            Token::Alter => {
                let what = self.next_token()?;
                match what.token {
                    Token::Table => self.parse_alter_table(first.span),
                    Token::Type => self.parse_alter_type(first.span),
                    other => Err(ParseError::new(
                        format!("expected TABLE or TYPE after ALTER, found {}", other.describe()),
                        what.span,
                    )),
                }
            }
            Token::Use => {
                let keyspace = self.expect_ident()?;
                let span = first.span.merge(keyspace.span);
                Ok(Statement::Use(UseKeyspace { keyspace, span }))
            }
            other => Err(ParseError::new(
                format!("expected CREATE, ALTER or USE, found {}", other.describe()),
                first.span,
            )),
        }
    }

    /// Parse the rest of `CREATE TABLE`.
    fn parse_create_table(&mut self, start: Span) -> Result<Statement, ParseError> {
        let if_not_exists = self.parse_if_not_exists()?;
        let name = self.parse_qualified_name()?;
        self.expect_token(Token::LParen)?;

        let mut columns = Vec::new();
        let mut key_clauses = Vec::new();

        let close = loop {
            if let Some(primary) = self.consume_if(&Token::Primary) {
                self.expect_token(Token::Key)?;
                key_clauses.push(self.parse_primary_key_clause(primary.span)?);
            } else {
                columns.push(self.parse_column_decl(true)?);
            }

            let sep = self.next_token()?;
            match sep.token {
                Token::Comma => continue,
                Token::RParen => break sep,
                other => {
                    return Err(ParseError::new(
                        format!("expected ',' or ')' in column list, found {}", other.describe()),
                        sep.span,
                    ))
                }
            }
        };

        let mut keys: Vec<PrimaryKey> = columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| PrimaryKey {
                partition_key: vec![c.name.clone()],
                clustering: Vec::new(),
                span: c.span,
            })
            .collect();
        keys.extend(key_clauses);

        let primary_key = match keys.len() {
            1 => keys.remove(0),
            0 => {
                return Err(ParseError::new(
                    format!("no PRIMARY KEY specified for table {} (exactly one required)", name),
                    name.span(),
                ))
            }
            _ => {
                return Err(ParseError::new(
                    "multiple PRIMARY KEYs specified (exactly one required)",
                    keys[1].span,
                ))
            }
        };

        Ok(Statement::CreateTable(CreateTable {
            name,
            if_not_exists,
            columns,
            primary_key,
            span: start.merge(close.span),
        }))
    }

    /// Parse `(pk, clustering...)` after `PRIMARY KEY`.
    fn parse_primary_key_clause(&mut self, start: Span) -> Result<PrimaryKey, ParseError> {
        self.expect_token(Token::LParen)?;

        let partition_key = if self.consume_if(&Token::LParen).is_some() {
            let mut names = vec![self.expect_ident()?];
            while self.consume_if(&Token::Comma).is_some() {
                names.push(self.expect_ident()?);
            }
            self.expect_token(Token::RParen)?;
            names
        } else {
            vec![self.expect_ident()?]
        };

        let mut clustering = Vec::new();
        while self.consume_if(&Token::Comma).is_some() {
            clustering.push(self.expect_ident()?);
        }

        let close = self.expect_token(Token::RParen)?;

        Ok(PrimaryKey {
            partition_key,
            clustering,
            span: start.merge(close.span),
        })
    }

    /// Parse `name type [static] [PRIMARY KEY]`.
    fn parse_column_decl(&mut self, allow_primary_key: bool) -> Result<ColumnDecl, ParseError> {
        let name = self.expect_ident()?;
        let ty = self.parse_type()?;
        let mut end = ty.span;

        let is_static = match self.consume_if(&Token::Static) {
            Some(tok) => {
                end = tok.span;
                true
            }
            None => false,
        };

        let primary_key = if let Some(primary) = self.consume_if(&Token::Primary) {
            if !allow_primary_key {
                return Err(ParseError::new(
                    "PRIMARY KEY cannot be declared when adding columns",
                    primary.span,
                ));
            }
            end = self.expect_token(Token::Key)?.span;
            true
        } else {
            false
        };

        Ok(ColumnDecl {
            span: name.span.merge(end),
            name,
            ty,
            is_static,
            primary_key,
        })
    }

    /// Parse the rest of `CREATE TYPE`.
    fn parse_create_type(&mut self, start: Span) -> Result<Statement, ParseError> {
        let if_not_exists = self.parse_if_not_exists()?;
        let name = self.parse_qualified_name()?;
        self.expect_token(Token::LParen)?;

        let mut fields = vec![self.parse_field_decl()?];
        while self.consume_if(&Token::Comma).is_some() {
            fields.push(self.parse_field_decl()?);
        }
        let close = self.expect_token(Token::RParen)?;

        Ok(Statement::CreateType(CreateType {
            name,
            if_not_exists,
            fields,
            span: start.merge(close.span),
        }))
    }

    fn parse_field_decl(&mut self) -> Result<FieldDecl, ParseError> {
        let name = self.expect_ident()?;
        let ty = self.parse_type()?;
        Ok(FieldDecl {
            span: name.span.merge(ty.span),
            name,
            ty,
        })
    }

    /// Parse the rest of `ALTER TABLE name ADD ...`.
    fn parse_alter_table(&mut self, start: Span) -> Result<Statement, ParseError> {
        let table = self.parse_qualified_name()?;
        self.expect_token(Token::Add)?;

        let (columns, end) = if self.consume_if(&Token::LParen).is_some() {
            let mut columns = vec![self.parse_column_decl(false)?];
            while self.consume_if(&Token::Comma).is_some() {
                columns.push(self.parse_column_decl(false)?);
            }
            let close = self.expect_token(Token::RParen)?;
            (columns, close.span)
        } else {
            let column = self.parse_column_decl(false)?;
            let end = column.span;
            (vec![column], end)
        };

        Ok(Statement::AlterTableAdd(AlterTableAdd {
            table,
            columns,
            span: start.merge(end),
        }))
    }

    /// Parse the rest of `ALTER TYPE name ADD field type`.
    fn parse_alter_type(&mut self, start: Span) -> Result<Statement, ParseError> {
        let type_name = self.parse_qualified_name()?;
        self.expect_token(Token::Add)?;
        let field = self.parse_field_decl()?;

        Ok(Statement::AlterTypeAdd(AlterTypeAdd {
            span: start.merge(field.span),
            type_name,
            field,
        }))
    }

    /// Parse a type expression.
    fn parse_type(&mut self) -> Result<TypeSpec, ParseError> {
        let tok = self.next_token()?;

        let name = match tok.token {
            Token::Ident(name) => name,
            Token::QuotedIdent(name) => {
                let first = Spanned::new(name, tok.span);
                let qualified = self.finish_qualified_name(first)?;
                let span = qualified.span();
                return Ok(TypeSpec::new(TypeSpecKind::Named(qualified), span));
            }
            other => {
                return Err(ParseError::new(
                    format!("expected a type, found {}", other.describe()),
                    tok.span,
                ))
            }
        };

        if !self.peek_is(&Token::Lt) {
            if TYPE_CONSTRUCTORS.contains(&name.as_str()) {
                return Err(ParseError::new(
                    format!("expected '<' after {}", name),
                    tok.span,
                )
                .with_hint(format!("{} needs type parameters, e.g. {}<int>", name, name)));
            }
            let qualified = self.finish_qualified_name(Spanned::new(name, tok.span))?;
            let span = qualified.span();
            return Ok(TypeSpec::new(TypeSpecKind::Named(qualified), span));
        }

        self.expect_token(Token::Lt)?;

        if self.depth == MAX_TYPE_DEPTH {
            return Err(ParseError::new(
                format!("type nesting exceeds {} levels", MAX_TYPE_DEPTH),
                tok.span,
            )
            .with_hint(format!(
                "types may nest at most {} levels of list, set, map, tuple, frozen and vector",
                MAX_TYPE_DEPTH
            )));
        }

        self.depth += 1;
        let kind = self.parse_type_arguments(&name, tok.span);
        self.depth -= 1;
        let kind = kind?;

        let close = self.expect_token(Token::Gt)?;
        Ok(TypeSpec::new(kind, tok.span.merge(close.span)))
    }

    /// Parse the parameters of `name<...>` up to, not including, the `>`.
    fn parse_type_arguments(&mut self, name: &str, span: Span) -> Result<TypeSpecKind, ParseError> {
        let kind = match name {
            "list" => TypeSpecKind::List(Box::new(self.parse_type()?)),
            "set" => TypeSpecKind::Set(Box::new(self.parse_type()?)),
            "frozen" => TypeSpecKind::Frozen(Box::new(self.parse_type()?)),
            "map" => {
                let key = self.parse_type()?;
                self.expect_token(Token::Comma)?;
                let value = self.parse_type()?;
                TypeSpecKind::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            "tuple" => {
                let mut components = vec![self.parse_type()?];
                while self.consume_if(&Token::Comma).is_some() {
                    components.push(self.parse_type()?);
                }
                TypeSpecKind::Tuple(components)
            }
            "vector" => {
                let element = self.parse_type()?;
                self.expect_token(Token::Comma).map_err(|e| {
                    e.with_hint("vector types take an element type and a dimension count")
                })?;
                let dimensions = self.expect_dimensions()?;
                TypeSpecKind::Vector {
                    element: Box::new(element),
                    dimensions,
                }
            }
            other => {
                return Err(ParseError::new(
                    format!("type {} does not take type parameters", other),
                    span,
                ))
            }
        };
        Ok(kind)
    }

    fn expect_dimensions(&mut self) -> Result<Spanned<u32>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Int(text) => text.parse::<u32>().map(|n| Spanned::new(n, tok.span)).map_err(|_| {
                ParseError::new(format!("vector dimension {} is out of range", text), tok.span)
                    .with_hint(format!("the largest supported dimension count is {}", u32::MAX))
            }),
            other => Err(ParseError::new(
                format!("expected vector dimension count, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    fn parse_if_not_exists(&mut self) -> Result<bool, ParseError> {
        if self.consume_if(&Token::If).is_none() {
            return Ok(false);
        }
        self.expect_token(Token::Not)?;
        self.expect_token(Token::Exists)?;
        Ok(true)
    }

    fn parse_qualified_name(&mut self) -> Result<QualifiedName, ParseError> {
        let first = self.expect_ident()?;
        self.finish_qualified_name(first)
    }

    fn finish_qualified_name(&mut self, first: Spanned<String>) -> Result<QualifiedName, ParseError> {
        if self.consume_if(&Token::Dot).is_some() {
            let name = self.expect_ident()?;
            Ok(QualifiedName {
                keyspace: Some(first),
                name,
            })
        } else {
            Ok(QualifiedName {
                keyspace: None,
                name: first,
            })
        }
    }

    /// Expect and consume an identifier (quoted or not).
    fn expect_ident(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) | Token::QuotedIdent(name) => Ok(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected identifier, found {}", other.describe()),
                tok.span,
            )),
        }
    }

    /// Expect and consume a specific token.
    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if std::mem::discriminant(&tok.token) == std::mem::discriminant(&expected) {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {}, found {}", expected.describe(), tok.token.describe()),
                tok.span,
            ))
        }
    }

    fn peek_is(&mut self, expected: &Token) -> bool {
        self.lexer.peek().is_some_and(|t| t.token == *expected)
    }

    fn consume_if(&mut self, expected: &Token) -> Option<SpannedToken> {
        if self.peek_is(expected) {
            self.lexer.next_token()
        } else {
            None
        }
    }

    /// Get the next token or error at end of input.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        match self.lexer.next_token() {
            Some(tok) => Ok(tok),
            None => Err(self
                .lexer
                .take_error()
                .unwrap_or_else(|| ParseError::new("unexpected end of input", Span::eof(self.source)))),
        }
    }

    fn check_lexer(&mut self) -> Result<(), ParseError> {
        match self.lexer.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Parse a single statement.
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    Parser::new(source).parse_statement()
}

/// Parse a `;`-separated script into statements.
pub fn parse_script(source: &str) -> Result<Vec<Statement>, ParseError> {
    Parser::new(source).parse_script()
}
