//! Core error types.

use thiserror::Error;

/// A type expression that cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// A user-defined type contains itself, directly or through other types.
    #[error("type {name} cannot reference itself, directly or through other types")]
    CircularReference {
        /// Qualified name of the offending type.
        name: String,
    },

    /// A vector declared with zero dimensions.
    #[error("vectors may only have positive dimensions; given {dimensions}")]
    InvalidDimensions {
        /// The declared dimension count.
        dimensions: u32,
    },
}

/// Schema catalog errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Malformed type expression.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// A type name that is neither native nor a known user type.
    #[error("unknown type {keyspace}.{name}")]
    UnknownType {
        /// Keyspace the name was looked up in.
        keyspace: String,
        /// The type name.
        name: String,
    },

    /// A statement referring to a user type from another keyspace.
    #[error("statement on keyspace {keyspace} cannot refer to a user type in keyspace {other}; user types can only be used in the keyspace they are defined in")]
    CrossKeyspaceType {
        /// Keyspace of the statement.
        keyspace: String,
        /// Keyspace named by the type reference.
        other: String,
    },

    /// `CREATE TABLE` for an existing table.
    #[error("table {keyspace}.{name} already exists")]
    TableAlreadyExists { keyspace: String, name: String },

    /// `CREATE TYPE` for an existing type.
    #[error("a user type with the name {keyspace}.{name} already exists")]
    TypeAlreadyExists { keyspace: String, name: String },

    /// `CREATE TYPE` using the name of a native type.
    #[error("{name} is a reserved type name")]
    ReservedTypeName { name: String },

    /// The table does not exist.
    #[error("table {keyspace}.{name} doesn't exist")]
    TableNotFound { keyspace: String, name: String },

    /// The user type does not exist.
    #[error("user type {keyspace}.{name} doesn't exist")]
    TypeNotFound { keyspace: String, name: String },

    /// A column declared twice, or added when it already exists.
    #[error("column {column} already exists in table {table}")]
    DuplicateColumn { table: String, column: String },

    /// A field declared twice, or added when it already exists.
    #[error("field {field} already exists in type {type_name}")]
    DuplicateField { type_name: String, field: String },

    /// A primary key naming a column that is not declared.
    #[error("unknown definition {column} referenced in PRIMARY KEY of {table}")]
    UnknownKeyColumn { table: String, column: String },

    /// A column listed twice in the primary key.
    #[error("duplicate definition for {column} in PRIMARY KEY")]
    DuplicateKeyColumn { column: String },

    /// An unqualified name with no current keyspace.
    #[error("no keyspace has been specified; USE a keyspace, or explicitly specify keyspace.{name}")]
    NoKeyspace { name: String },

    /// A static column that is also part of the primary key.
    #[error("static column {column} cannot be part of the PRIMARY KEY")]
    StaticInPrimaryKey { column: String },

    /// A static column on a table without clustering columns.
    #[error("static columns are only allowed if table {table} has at least one clustering column")]
    StaticWithoutClustering { table: String },

    /// A non-frozen collection or user type inside a collection.
    #[error("non-frozen collections and user types are not allowed inside collections: {ty}")]
    NonFrozenNested {
        /// Rendering of the offending collection type.
        ty: String,
    },

    /// `frozen<>` applied to a type that has nothing to freeze.
    #[error("frozen<> is only allowed on collections, tuples, vectors, and user-defined types: {ty}")]
    InvalidFrozen { ty: String },

    /// A type nested deeper than the resolver allows, user types expanded.
    #[error("type nesting exceeds {limit} levels once user types are expanded")]
    TypeTooDeep { limit: usize },

    /// The types of one statement expand to too many nodes.
    #[error("types in this statement expand to more than {limit} nodes once user types are expanded")]
    TypeTooLarge { limit: usize },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
