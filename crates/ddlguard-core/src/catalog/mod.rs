//! Schema catalog.
//!
//! Holds tables and user-defined types per keyspace. Column and field types
//! are stored as declared and resolved into [`TypeExpression`]s on demand, so
//! a column of a user type always sees the type's current fields.
//!
//! [`TypeExpression`]: crate::types::TypeExpression

mod catalog;
mod change;
mod resolve;
mod table;
mod user_type;

pub use catalog::{Catalog, CheckedChange, KeyspaceSchema};
pub use change::SchemaChange;
pub use resolve::{MAX_RESOLVED_DEPTH, MAX_RESOLVED_NODES};
pub use table::{ColumnDef, ColumnKind, TableDef};
pub use user_type::{FieldDef, UserTypeDef};
