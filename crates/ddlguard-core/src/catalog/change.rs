//! Schema changes described by DDL statements.

use std::collections::{HashMap, HashSet};

use ddlguard_lang::{ColumnDecl, CreateTable, CreateType, QualifiedName, Statement};

use super::table::{ColumnDef, ColumnKind, TableDef};
use super::user_type::{FieldDef, UserTypeDef};
use crate::error::{CatalogError, CatalogResult};

/// A change to the schema, with names resolved to a keyspace.
///
/// Building a change checks what the statement alone can tell: primary key
/// shape, duplicate names, static column placement. Checks against existing
/// schema happen in [`Catalog::check`](super::Catalog::check).
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaChange {
    CreateTable {
        table: TableDef,
        if_not_exists: bool,
    },
    CreateType {
        user_type: UserTypeDef,
        if_not_exists: bool,
    },
    AddColumns {
        keyspace: String,
        table: String,
        columns: Vec<ColumnDef>,
    },
    AddField {
        keyspace: String,
        type_name: String,
        field: FieldDef,
    },
}

impl SchemaChange {
    /// The change `statement` makes. `USE` changes no schema and yields `None`.
    ///
    /// Unqualified names are looked up in `current_keyspace`.
    pub fn from_statement(
        statement: &Statement,
        current_keyspace: Option<&str>,
    ) -> CatalogResult<Option<Self>> {
        let change = match statement {
            Statement::CreateTable(create) => {
                let keyspace = keyspace_for(&create.name, current_keyspace)?;
                SchemaChange::CreateTable {
                    table: table_def(create, keyspace)?,
                    if_not_exists: create.if_not_exists,
                }
            }
            Statement::CreateType(create) => {
                let keyspace = keyspace_for(&create.name, current_keyspace)?;
                SchemaChange::CreateType {
                    user_type: user_type_def(create, keyspace)?,
                    if_not_exists: create.if_not_exists,
                }
            }
            Statement::AlterTableAdd(alter) => {
                let keyspace = keyspace_for(&alter.table, current_keyspace)?;
                let table = alter.table.name.value.clone();
                let mut seen = HashSet::new();
                let columns = alter
                    .columns
                    .iter()
                    .map(|decl| {
                        if !seen.insert(decl.name.value.as_str()) {
                            return Err(CatalogError::DuplicateColumn {
                                table: table.clone(),
                                column: decl.name.value.clone(),
                            });
                        }
                        let kind = if decl.is_static {
                            ColumnKind::Static
                        } else {
                            ColumnKind::Regular
                        };
                        Ok(column_def(decl, kind))
                    })
                    .collect::<CatalogResult<Vec<_>>>()?;

                SchemaChange::AddColumns {
                    keyspace,
                    table,
                    columns,
                }
            }
            Statement::AlterTypeAdd(alter) => SchemaChange::AddField {
                keyspace: keyspace_for(&alter.type_name, current_keyspace)?,
                type_name: alter.type_name.name.value.clone(),
                field: FieldDef::new(alter.field.name.value.clone(), alter.field.ty.clone()),
            },
            Statement::Use(_) => return Ok(None),
        };
        Ok(Some(change))
    }

    pub fn keyspace(&self) -> &str {
        match self {
            SchemaChange::CreateTable { table, .. } => &table.keyspace,
            SchemaChange::CreateType { user_type, .. } => &user_type.keyspace,
            SchemaChange::AddColumns { keyspace, .. } | SchemaChange::AddField { keyspace, .. } => {
                keyspace
            }
        }
    }

    /// Name of the table or type being changed.
    pub fn target(&self) -> &str {
        match self {
            SchemaChange::CreateTable { table, .. } => &table.name,
            SchemaChange::CreateType { user_type, .. } => &user_type.name,
            SchemaChange::AddColumns { table, .. } => table,
            SchemaChange::AddField { type_name, .. } => type_name,
        }
    }
}

fn keyspace_for(name: &QualifiedName, current: Option<&str>) -> CatalogResult<String> {
    match (&name.keyspace, current) {
        (Some(keyspace), _) => Ok(keyspace.value.clone()),
        (None, Some(current)) => Ok(current.to_string()),
        (None, None) => Err(CatalogError::NoKeyspace {
            name: name.name.value.clone(),
        }),
    }
}

fn column_def(decl: &ColumnDecl, kind: ColumnKind) -> ColumnDef {
    ColumnDef::new(decl.name.value.clone(), decl.ty.clone(), kind)
}

fn table_def(create: &CreateTable, keyspace: String) -> CatalogResult<TableDef> {
    let name = create.name.name.value.clone();
    let key = &create.primary_key;

    let mut key_kinds: HashMap<&str, ColumnKind> = HashMap::new();
    let key_columns = key
        .partition_key
        .iter()
        .enumerate()
        .map(|(i, column)| (column, ColumnKind::PartitionKey(i)))
        .chain(
            key.clustering
                .iter()
                .enumerate()
                .map(|(i, column)| (column, ColumnKind::Clustering(i))),
        );
    for (column, kind) in key_columns {
        if key_kinds.insert(column.value.as_str(), kind).is_some() {
            return Err(CatalogError::DuplicateKeyColumn {
                column: column.value.clone(),
            });
        }
        if !create.columns.iter().any(|c| c.name.value == column.value) {
            return Err(CatalogError::UnknownKeyColumn {
                table: name,
                column: column.value.clone(),
            });
        }
    }

    let mut table = TableDef::new(keyspace, name.clone());
    for decl in &create.columns {
        if table.get_column(&decl.name.value).is_some() {
            return Err(CatalogError::DuplicateColumn {
                table: name,
                column: decl.name.value.clone(),
            });
        }

        let kind = match (key_kinds.get(decl.name.value.as_str()), decl.is_static) {
            (Some(_), true) => {
                return Err(CatalogError::StaticInPrimaryKey {
                    column: decl.name.value.clone(),
                })
            }
            (Some(kind), false) => *kind,
            (None, true) => ColumnKind::Static,
            (None, false) => ColumnKind::Regular,
        };
        table = table.with_column(column_def(decl, kind));
    }

    let has_static = table.columns.iter().any(|c| c.kind == ColumnKind::Static);
    if has_static && !table.has_clustering() {
        return Err(CatalogError::StaticWithoutClustering { table: name });
    }

    Ok(table)
}

fn user_type_def(create: &CreateType, keyspace: String) -> CatalogResult<UserTypeDef> {
    let name = create.name.name.value.clone();
    let mut user_type = UserTypeDef::new(keyspace, name.clone());
    for decl in &create.fields {
        if user_type.get_field(&decl.name.value).is_some() {
            return Err(CatalogError::DuplicateField {
                type_name: name,
                field: decl.name.value.clone(),
            });
        }
        user_type = user_type.with_field(FieldDef::new(decl.name.value.clone(), decl.ty.clone()));
    }
    Ok(user_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(source: &str) -> CatalogResult<Option<SchemaChange>> {
        let statement = ddlguard_lang::parse(source).unwrap();
        SchemaChange::from_statement(&statement, Some("ks"))
    }

    fn table(source: &str) -> TableDef {
        match change(source).unwrap() {
            Some(SchemaChange::CreateTable { table, .. }) => table,
            other => panic!("expected CREATE TABLE, got {:?}", other),
        }
    }

    #[test]
    fn test_column_kinds() {
        let t = table("CREATE TABLE t (k int, c int, v vector<int, 3> static, PRIMARY KEY(k, c))");
        assert_eq!(t.keyspace, "ks");
        assert_eq!(t.get_column("k").map(|c| c.kind), Some(ColumnKind::PartitionKey(0)));
        assert_eq!(t.get_column("c").map(|c| c.kind), Some(ColumnKind::Clustering(0)));
        assert_eq!(t.get_column("v").map(|c| c.kind), Some(ColumnKind::Static));

        let t = table("CREATE TABLE t (v vector<int, 3>, c int, PRIMARY KEY((v, c)))");
        assert_eq!(t.get_column("c").map(|c| c.kind), Some(ColumnKind::PartitionKey(1)));
        assert!(!t.has_clustering());

        let t = table("CREATE TABLE other.t (k int PRIMARY KEY, v int)");
        assert_eq!(t.keyspace, "other");
        assert_eq!(t.get_column("v").map(|c| c.kind), Some(ColumnKind::Regular));
    }

    #[test]
    fn test_primary_key_errors() {
        assert!(matches!(
            change("CREATE TABLE t (k int, PRIMARY KEY(x))"),
            Err(CatalogError::UnknownKeyColumn { .. })
        ));
        assert!(matches!(
            change("CREATE TABLE t (k int, PRIMARY KEY(k, k))"),
            Err(CatalogError::DuplicateKeyColumn { .. })
        ));
        assert!(matches!(
            change("CREATE TABLE t (k int, c int static, PRIMARY KEY(k, c))"),
            Err(CatalogError::StaticInPrimaryKey { .. })
        ));
        assert!(matches!(
            change("CREATE TABLE t (k int PRIMARY KEY, s int static)"),
            Err(CatalogError::StaticWithoutClustering { .. })
        ));
    }

    #[test]
    fn test_duplicate_names() {
        assert!(matches!(
            change("CREATE TABLE t (k int PRIMARY KEY, k text)"),
            Err(CatalogError::DuplicateColumn { .. })
        ));
        assert!(matches!(
            change("CREATE TYPE p (x int, x int)"),
            Err(CatalogError::DuplicateField { .. })
        ));
        assert!(matches!(
            change("ALTER TABLE t ADD (a int, a int)"),
            Err(CatalogError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_alter_changes() {
        assert_eq!(
            change("ALTER TABLE t ADD v int static").unwrap().map(|c| match c {
                SchemaChange::AddColumns { columns, .. } => columns[0].kind,
                _ => ColumnKind::Regular,
            }),
            Some(ColumnKind::Static)
        );

        let alter = change("ALTER TYPE ks2.p ADD v vector<int, 2>").unwrap().unwrap();
        assert_eq!(alter.keyspace(), "ks2");
        assert_eq!(alter.target(), "p");
    }

    #[test]
    fn test_use_is_not_a_change() {
        assert_eq!(change("USE ks").unwrap(), None);
    }

    #[test]
    fn test_unqualified_without_keyspace() {
        let statement = ddlguard_lang::parse("CREATE TYPE p (x int)").unwrap();
        assert_eq!(
            SchemaChange::from_statement(&statement, None),
            Err(CatalogError::NoKeyspace {
                name: "p".to_string()
            })
        );
    }
}
