//! In-memory schema catalog.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::change::SchemaChange;
use super::resolve::Resolver;
use super::table::{ColumnDef, ColumnKind, TableDef};
use super::user_type::{FieldDef, UserTypeDef};
use crate::error::{CatalogError, CatalogResult};
use crate::guardrails::ElementLabel;
use crate::types::{ScalarType, TypeExpression, UserType};

/// Tables and user types of one keyspace.
#[derive(Debug, Clone, Default)]
pub struct KeyspaceSchema {
    tables: HashMap<String, TableDef>,
    types: HashMap<String, UserTypeDef>,
}

impl KeyspaceSchema {
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn user_type(&self, name: &str) -> Option<&UserTypeDef> {
        self.types.get(name)
    }

    /// Table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// User type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// What applying a [`SchemaChange`] would do.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckedChange {
    /// `IF NOT EXISTS` on an existing table or type.
    NoOp,
    /// The change is valid. Carries every declared element the change
    /// introduces, with its resolved type.
    Apply(Vec<(ElementLabel, TypeExpression)>),
}

impl CheckedChange {
    pub fn elements(&self) -> &[(ElementLabel, TypeExpression)] {
        match self {
            CheckedChange::NoOp => &[],
            CheckedChange::Apply(elements) => elements,
        }
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self, CheckedChange::NoOp)
    }
}

/// The schema catalog.
///
/// Keyspaces are created implicitly by the first table or type placed in
/// them.
#[derive(Debug, Default)]
pub struct Catalog {
    keyspaces: RwLock<HashMap<String, KeyspaceSchema>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `change` against the current schema without applying it.
    pub fn check(&self, change: &SchemaChange) -> CatalogResult<CheckedChange> {
        let keyspaces = self.keyspaces.read();
        check_change(&keyspaces, change)
    }

    /// Apply `change`.
    ///
    /// The change is checked again under the write lock. Returns `false` if it
    /// was a no-op.
    pub fn apply(&self, change: SchemaChange) -> CatalogResult<bool> {
        let mut keyspaces = self.keyspaces.write();
        if check_change(&keyspaces, &change)?.is_no_op() {
            debug!(
                keyspace = change.keyspace(),
                target = change.target(),
                "schema change skipped, target exists"
            );
            return Ok(false);
        }

        let keyspace = change.keyspace().to_string();
        let target = change.target().to_string();
        match change {
            SchemaChange::CreateTable { table, .. } => {
                let schema = keyspaces.entry(table.keyspace.clone()).or_default();
                schema.tables.insert(table.name.clone(), table);
            }
            SchemaChange::CreateType { user_type, .. } => {
                let schema = keyspaces.entry(user_type.keyspace.clone()).or_default();
                schema.types.insert(user_type.name.clone(), user_type);
            }
            SchemaChange::AddColumns {
                keyspace,
                table,
                columns,
            } => {
                let def = keyspaces
                    .get_mut(&keyspace)
                    .and_then(|schema| schema.tables.get_mut(&table))
                    .ok_or(CatalogError::TableNotFound {
                        keyspace,
                        name: table,
                    })?;
                def.columns.extend(columns);
            }
            SchemaChange::AddField {
                keyspace,
                type_name,
                field,
            } => {
                let def = keyspaces
                    .get_mut(&keyspace)
                    .and_then(|schema| schema.types.get_mut(&type_name))
                    .ok_or(CatalogError::TypeNotFound {
                        keyspace,
                        name: type_name,
                    })?;
                def.fields.push(field);
            }
        }

        debug!(keyspace = %keyspace, target = %target, "schema change applied");
        Ok(true)
    }

    /// Create a table. See [`Catalog::apply`].
    pub fn create_table(&self, table: TableDef, if_not_exists: bool) -> CatalogResult<bool> {
        self.apply(SchemaChange::CreateTable {
            table,
            if_not_exists,
        })
    }

    /// Create a user type. See [`Catalog::apply`].
    pub fn create_type(&self, user_type: UserTypeDef, if_not_exists: bool) -> CatalogResult<bool> {
        self.apply(SchemaChange::CreateType {
            user_type,
            if_not_exists,
        })
    }

    pub fn add_columns(
        &self,
        keyspace: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<ColumnDef>,
    ) -> CatalogResult<bool> {
        self.apply(SchemaChange::AddColumns {
            keyspace: keyspace.into(),
            table: table.into(),
            columns,
        })
    }

    pub fn add_field(
        &self,
        keyspace: impl Into<String>,
        type_name: impl Into<String>,
        field: FieldDef,
    ) -> CatalogResult<bool> {
        self.apply(SchemaChange::AddField {
            keyspace: keyspace.into(),
            type_name: type_name.into(),
            field,
        })
    }

    /// The current, fully expanded form of a user type.
    pub fn resolve_user_type(&self, keyspace: &str, name: &str) -> CatalogResult<UserType> {
        let keyspaces = self.keyspaces.read();
        Resolver::new(keyspace, keyspaces.get(keyspace)).resolve_user_type(name)
    }

    /// The resolved type of a table column.
    pub fn column_type(
        &self,
        keyspace: &str,
        table: &str,
        column: &str,
    ) -> CatalogResult<Option<TypeExpression>> {
        let keyspaces = self.keyspaces.read();
        let schema = keyspaces.get(keyspace);
        let def = schema
            .and_then(|s| s.table(table))
            .ok_or_else(|| CatalogError::TableNotFound {
                keyspace: keyspace.to_string(),
                name: table.to_string(),
            })?;

        def.get_column(column)
            .map(|c| Resolver::new(keyspace, schema).resolve(&c.ty))
            .transpose()
    }

    pub fn table(&self, keyspace: &str, name: &str) -> Option<TableDef> {
        self.keyspaces
            .read()
            .get(keyspace)
            .and_then(|schema| schema.table(name))
            .cloned()
    }

    pub fn user_type(&self, keyspace: &str, name: &str) -> Option<UserTypeDef> {
        self.keyspaces
            .read()
            .get(keyspace)
            .and_then(|schema| schema.user_type(name))
            .cloned()
    }

    /// Snapshot of a keyspace.
    pub fn keyspace(&self, name: &str) -> Option<KeyspaceSchema> {
        self.keyspaces.read().get(name).cloned()
    }

    /// Keyspace names, sorted.
    pub fn keyspace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keyspaces.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

fn check_change(
    keyspaces: &HashMap<String, KeyspaceSchema>,
    change: &SchemaChange,
) -> CatalogResult<CheckedChange> {
    let keyspace = change.keyspace();
    let schema = keyspaces.get(keyspace);

    match change {
        SchemaChange::CreateTable {
            table,
            if_not_exists,
        } => {
            if schema.and_then(|s| s.table(&table.name)).is_some() {
                if *if_not_exists {
                    return Ok(CheckedChange::NoOp);
                }
                return Err(CatalogError::TableAlreadyExists {
                    keyspace: keyspace.to_string(),
                    name: table.name.clone(),
                });
            }

            let mut resolver = Resolver::new(keyspace, schema);
            let elements = table
                .columns
                .iter()
                .map(|column| {
                    resolver
                        .resolve(&column.ty)
                        .map(|ty| (ElementLabel::column(column.name.clone()), ty))
                })
                .collect::<CatalogResult<Vec<_>>>()?;
            Ok(CheckedChange::Apply(elements))
        }

        SchemaChange::CreateType {
            user_type,
            if_not_exists,
        } => {
            if ScalarType::from_name(&user_type.name).is_some() {
                return Err(CatalogError::ReservedTypeName {
                    name: user_type.name.clone(),
                });
            }
            if schema.and_then(|s| s.user_type(&user_type.name)).is_some() {
                if *if_not_exists {
                    return Ok(CheckedChange::NoOp);
                }
                return Err(CatalogError::TypeAlreadyExists {
                    keyspace: keyspace.to_string(),
                    name: user_type.name.clone(),
                });
            }

            let resolved = Resolver::new(keyspace, schema)
                .with_pending(user_type)
                .resolve_user_type(&user_type.name)?;
            let elements = resolved
                .fields
                .into_iter()
                .map(|(name, ty)| (ElementLabel::field(name), ty))
                .collect();
            Ok(CheckedChange::Apply(elements))
        }

        SchemaChange::AddColumns { table, columns, .. } => {
            let def = schema
                .and_then(|s| s.table(table))
                .ok_or_else(|| CatalogError::TableNotFound {
                    keyspace: keyspace.to_string(),
                    name: table.clone(),
                })?;

            let mut resolver = Resolver::new(keyspace, schema);
            let mut elements = Vec::with_capacity(columns.len());
            for column in columns {
                if def.get_column(&column.name).is_some() {
                    return Err(CatalogError::DuplicateColumn {
                        table: table.clone(),
                        column: column.name.clone(),
                    });
                }
                if column.kind == ColumnKind::Static && !def.has_clustering() {
                    return Err(CatalogError::StaticWithoutClustering {
                        table: table.clone(),
                    });
                }
                let ty = resolver.resolve(&column.ty)?;
                elements.push((ElementLabel::column(column.name.clone()), ty));
            }
            Ok(CheckedChange::Apply(elements))
        }

        SchemaChange::AddField {
            type_name, field, ..
        } => {
            let def = schema
                .and_then(|s| s.user_type(type_name))
                .ok_or_else(|| CatalogError::TypeNotFound {
                    keyspace: keyspace.to_string(),
                    name: type_name.clone(),
                })?;
            if def.get_field(&field.name).is_some() {
                return Err(CatalogError::DuplicateField {
                    type_name: type_name.clone(),
                    field: field.name.clone(),
                });
            }

            // Resolve the altered type as a whole so a field that makes the
            // type contain itself is caught.
            let candidate = def.clone().with_field(field.clone());
            let mut resolved = Resolver::new(keyspace, schema)
                .with_pending(&candidate)
                .resolve_user_type(type_name)?;
            let elements = resolved
                .fields
                .pop()
                .map(|(name, ty)| vec![(ElementLabel::field(name), ty)])
                .unwrap_or_default();
            Ok(CheckedChange::Apply(elements))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MAX_RESOLVED_DEPTH, MAX_RESOLVED_NODES};
    use crate::error::StructuralError;

    fn run(catalog: &Catalog, source: &str) -> CatalogResult<bool> {
        let statement = ddlguard_lang::parse(source).unwrap();
        let change = SchemaChange::from_statement(&statement, Some("ks"))?.unwrap();
        catalog.apply(change)
    }

    fn check(catalog: &Catalog, source: &str) -> CatalogResult<CheckedChange> {
        let statement = ddlguard_lang::parse(source).unwrap();
        let change = SchemaChange::from_statement(&statement, Some("ks"))?.unwrap();
        catalog.check(&change)
    }

    fn labels(checked: &CheckedChange) -> Vec<String> {
        checked
            .elements()
            .iter()
            .map(|(label, ty)| format!("{}: {}", label, ty))
            .collect()
    }

    #[test]
    fn test_create_table_elements() {
        let catalog = Catalog::new();
        let checked = check(&catalog, "CREATE TABLE t (k int PRIMARY KEY, v list<vector<int, 3>>)").unwrap();
        assert_eq!(labels(&checked), vec!["Column k: int", "Column v: list<vector<int, 3>>"]);

        // Checking does not create anything.
        assert!(catalog.table("ks", "t").is_none());
        assert!(catalog.keyspace_names().is_empty());
    }

    #[test]
    fn test_create_table_twice() {
        let catalog = Catalog::new();
        assert!(run(&catalog, "CREATE TABLE t (k int PRIMARY KEY)").unwrap());
        assert_eq!(catalog.keyspace_names(), vec!["ks".to_string()]);

        assert!(matches!(
            run(&catalog, "CREATE TABLE t (k int PRIMARY KEY)"),
            Err(CatalogError::TableAlreadyExists { .. })
        ));
        assert!(!run(&catalog, "CREATE TABLE IF NOT EXISTS t (k int PRIMARY KEY, v int)").unwrap());
        assert_eq!(check(&catalog, "CREATE TABLE IF NOT EXISTS t (k int PRIMARY KEY)").unwrap(), CheckedChange::NoOp);
        assert!(catalog.table("ks", "t").unwrap().get_column("v").is_none());
    }

    #[test]
    fn test_create_type_elements_and_reserved_names() {
        let catalog = Catalog::new();
        let checked = check(&catalog, "CREATE TYPE p (c int, v vector<int, 3>)").unwrap();
        assert_eq!(labels(&checked), vec!["Field c: int", "Field v: vector<int, 3>"]);

        assert!(matches!(
            run(&catalog, "CREATE TYPE \"int\" (c int)"),
            Err(CatalogError::ReservedTypeName { .. })
        ));
    }

    #[test]
    fn test_create_type_self_reference() {
        let catalog = Catalog::new();
        assert_eq!(
            run(&catalog, "CREATE TYPE p (c int, next frozen<p>)"),
            Err(CatalogError::Structural(StructuralError::CircularReference {
                name: "ks.p".to_string()
            }))
        );
        assert!(catalog.user_type("ks", "p").is_none());
    }

    #[test]
    fn test_table_using_user_type() {
        let catalog = Catalog::new();
        run(&catalog, "CREATE TYPE p (c int, v vector<int, 3>)").unwrap();
        let checked = check(&catalog, "CREATE TABLE t (k int PRIMARY KEY, a p, b list<frozen<p>>)").unwrap();
        assert_eq!(labels(&checked), vec!["Column k: int", "Column a: ks.p", "Column b: list<frozen<ks.p>>"]);

        assert!(matches!(
            check(&catalog, "CREATE TABLE t (k int PRIMARY KEY, b list<p>)"),
            Err(CatalogError::NonFrozenNested { .. })
        ));
        assert!(matches!(
            check(&catalog, "CREATE TABLE t (k int PRIMARY KEY, b q)"),
            Err(CatalogError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_alter_table_add() {
        let catalog = Catalog::new();
        assert!(matches!(
            run(&catalog, "ALTER TABLE t ADD v int"),
            Err(CatalogError::TableNotFound { .. })
        ));

        run(&catalog, "CREATE TABLE t (k int PRIMARY KEY)").unwrap();
        let checked = check(&catalog, "ALTER TABLE t ADD (a int, v vector<int, 2>)").unwrap();
        assert_eq!(labels(&checked), vec!["Column a: int", "Column v: vector<int, 2>"]);

        assert!(matches!(
            run(&catalog, "ALTER TABLE t ADD k text"),
            Err(CatalogError::DuplicateColumn { .. })
        ));
        assert!(matches!(
            run(&catalog, "ALTER TABLE t ADD s int static"),
            Err(CatalogError::StaticWithoutClustering { .. })
        ));

        assert!(run(&catalog, "ALTER TABLE t ADD v vector<int, 2>").unwrap());
        assert_eq!(
            catalog.column_type("ks", "t", "v").unwrap().map(|ty| ty.to_string()),
            Some("vector<int, 2>".to_string())
        );
        assert_eq!(catalog.column_type("ks", "t", "missing").unwrap(), None);
    }

    #[test]
    fn test_alter_type_add() {
        let catalog = Catalog::new();
        run(&catalog, "CREATE TYPE p (c int)").unwrap();
        run(&catalog, "CREATE TABLE t (k int PRIMARY KEY, a frozen<p>)").unwrap();

        let checked = check(&catalog, "ALTER TYPE p ADD v map<vector<int, 4>, int>").unwrap();
        assert_eq!(labels(&checked), vec!["Field v: map<vector<int, 4>, int>"]);

        run(&catalog, "ALTER TYPE p ADD v vector<int, 4>").unwrap();
        let udt = catalog.resolve_user_type("ks", "p").unwrap();
        assert_eq!(udt.fields.len(), 2);

        // Columns of the type see the new field.
        let column = catalog.column_type("ks", "t", "a").unwrap().unwrap();
        assert!(column.contains_user_type("ks", "p"));
        match column {
            TypeExpression::Frozen(inner) => match *inner {
                TypeExpression::UserDefined(udt) => assert!(udt.field("v").is_some()),
                other => panic!("unexpected {}", other),
            },
            other => panic!("unexpected {}", other),
        }

        assert!(matches!(
            run(&catalog, "ALTER TYPE p ADD v int"),
            Err(CatalogError::DuplicateField { .. })
        ));
        assert!(matches!(
            run(&catalog, "ALTER TYPE q ADD v int"),
            Err(CatalogError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn test_alter_type_indirect_cycle() {
        let catalog = Catalog::new();
        run(&catalog, "CREATE TYPE a (x int)").unwrap();
        run(&catalog, "CREATE TYPE b (inner frozen<a>)").unwrap();

        let err = run(&catalog, "ALTER TYPE a ADD back frozen<b>").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Structural(StructuralError::CircularReference { .. })
        ));
        assert!(catalog.user_type("ks", "a").unwrap().get_field("back").is_none());
    }

    #[test]
    fn test_keyspace_snapshot() {
        let catalog = Catalog::new();
        run(&catalog, "CREATE TABLE t2 (k int PRIMARY KEY)").unwrap();
        run(&catalog, "CREATE TABLE t1 (k int PRIMARY KEY)").unwrap();
        run(&catalog, "CREATE TYPE p (c int)").unwrap();

        let schema = catalog.keyspace("ks").unwrap();
        assert_eq!(schema.table_names(), vec!["t1", "t2"]);
        assert_eq!(schema.type_names(), vec!["p"]);
        assert!(catalog.keyspace("other").is_none());
    }

    /// Creates `link_1`, `link_2`, ... from `fields` until one is refused.
    fn build_chain(catalog: &Catalog, fields: &str) -> (usize, CatalogError) {
        run(catalog, "CREATE TYPE link_0 (v vector<int, 3>)").unwrap();
        for n in 1..=1_000 {
            let statement = format!(
                "CREATE TYPE link_{} ({})",
                n,
                fields.replace("{prev}", &format!("link_{}", n - 1))
            );
            if let Err(err) = run(catalog, &statement) {
                return (n - 1, err);
            }
        }
        panic!("chain was never refused");
    }

    #[test]
    fn test_shared_user_types_are_bounded() {
        let catalog = Catalog::new();
        let (created, err) = build_chain(&catalog, "a frozen<{prev}>, b frozen<{prev}>");
        assert_eq!(err, CatalogError::TypeTooLarge { limit: MAX_RESOLVED_NODES });
        assert!(created >= 8, "only {} links", created);
        assert!(catalog.user_type("ks", &format!("link_{}", created + 1)).is_none());

        // Every use of a shared type is still expanded in full.
        let link = catalog.resolve_user_type("ks", "link_5").unwrap();
        let vectors: usize = link
            .fields
            .iter()
            .map(|(_, ty)| crate::guardrails::VectorDimensionWalker::find(ty).count())
            .sum();
        assert_eq!(vectors, 32);
    }

    #[test]
    fn test_long_user_type_chain_is_bounded() {
        let catalog = Catalog::new();
        let (created, err) = build_chain(&catalog, "a frozen<{prev}>");
        assert_eq!(err, CatalogError::TypeTooDeep { limit: MAX_RESOLVED_DEPTH });
        assert!(created > 100 && created < MAX_RESOLVED_DEPTH, "{} links", created);

        let deepest = format!("link_{}", created);
        assert!(catalog.resolve_user_type("ks", &deepest).is_ok());
        let column = format!("CREATE TABLE t (k int PRIMARY KEY, v frozen<{}>)", deepest);
        assert!(matches!(run(&catalog, &column), Err(CatalogError::TypeTooDeep { .. })));
    }
}
