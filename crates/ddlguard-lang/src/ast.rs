//! Abstract syntax tree for DDL statements.

use crate::span::{Span, Spanned};
use std::fmt;

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `CREATE TABLE`.
    CreateTable(CreateTable),
    /// `CREATE TYPE`.
    CreateType(CreateType),
    /// `ALTER TABLE ... ADD`.
    AlterTableAdd(AlterTableAdd),
    /// `ALTER TYPE ... ADD`.
    AlterTypeAdd(AlterTypeAdd),
    /// `USE keyspace`.
    Use(UseKeyspace),
}

impl Statement {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::CreateTable(s) => s.span,
            Statement::CreateType(s) => s.span,
            Statement::AlterTableAdd(s) => s.span,
            Statement::AlterTypeAdd(s) => s.span,
            Statement::Use(s) => s.span,
        }
    }

    /// Short statement kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::CreateType(_) => "CREATE TYPE",
            Statement::AlterTableAdd(_) => "ALTER TABLE",
            Statement::AlterTypeAdd(_) => "ALTER TYPE",
            Statement::Use(_) => "USE",
        }
    }
}

/// A possibly keyspace-qualified name such as `ks.users`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub keyspace: Option<Spanned<String>>,
    pub name: Spanned<String>,
}

impl QualifiedName {
    /// Span covering the keyspace (if any) and the name.
    pub fn span(&self) -> Span {
        match &self.keyspace {
            Some(ks) => ks.span.merge(self.name.span),
            None => self.name.span,
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keyspace {
            Some(ks) => write!(f, "{}.{}", ks.value, self.name.value),
            None => write!(f, "{}", self.name.value),
        }
    }
}

/// A declared type, as written in the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub kind: TypeSpecKind,
    pub span: Span,
}

/// The shape of a declared type.
///
/// Native type names and user type names are both `Named`; telling them
/// apart needs the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpecKind {
    Named(QualifiedName),
    List(Box<TypeSpec>),
    Set(Box<TypeSpec>),
    Map {
        key: Box<TypeSpec>,
        value: Box<TypeSpec>,
    },
    Tuple(Vec<TypeSpec>),
    Frozen(Box<TypeSpec>),
    Vector {
        element: Box<TypeSpec>,
        dimensions: Spanned<u32>,
    },
}

impl TypeSpec {
    pub fn new(kind: TypeSpecKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeSpecKind::Named(name) => write!(f, "{}", name),
            TypeSpecKind::List(inner) => write!(f, "list<{}>", inner),
            TypeSpecKind::Set(inner) => write!(f, "set<{}>", inner),
            TypeSpecKind::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            TypeSpecKind::Tuple(components) => {
                write!(f, "tuple<")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", component)?;
                }
                write!(f, ">")
            }
            TypeSpecKind::Frozen(inner) => write!(f, "frozen<{}>", inner),
            TypeSpecKind::Vector {
                element,
                dimensions,
            } => write!(f, "vector<{}, {}>", element, dimensions.value),
        }
    }
}

/// A column declaration inside `CREATE TABLE` or `ALTER TABLE ... ADD`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub name: Spanned<String>,
    pub ty: TypeSpec,
    pub is_static: bool,
    /// Declared with an inline `PRIMARY KEY`.
    pub primary_key: bool,
    pub span: Span,
}

/// A `PRIMARY KEY (...)` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKey {
    pub partition_key: Vec<Spanned<String>>,
    pub clustering: Vec<Spanned<String>>,
    pub span: Span,
}

/// `CREATE TABLE [IF NOT EXISTS] name (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: QualifiedName,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDecl>,
    /// The effective primary key, from the clause or the inline marker.
    pub primary_key: PrimaryKey,
    pub span: Span,
}

/// A field declaration of a user-defined type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Spanned<String>,
    pub ty: TypeSpec,
    pub span: Span,
}

/// `CREATE TYPE [IF NOT EXISTS] name (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateType {
    pub name: QualifiedName,
    pub if_not_exists: bool,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// `ALTER TABLE name ADD ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableAdd {
    pub table: QualifiedName,
    pub columns: Vec<ColumnDecl>,
    pub span: Span,
}

/// `ALTER TYPE name ADD field type`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTypeAdd {
    pub type_name: QualifiedName,
    pub field: FieldDecl,
    pub span: Span,
}

/// `USE keyspace`.
#[derive(Debug, Clone, PartialEq)]
pub struct UseKeyspace {
    pub keyspace: Spanned<String>,
    pub span: Span,
}
