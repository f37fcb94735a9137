//! Table definitions.

use ddlguard_lang::TypeSpec;

/// Role of a column in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Partition key component, by position.
    PartitionKey(usize),
    /// Clustering column, by position.
    Clustering(usize),
    Static,
    Regular,
}

impl ColumnKind {
    pub fn is_primary_key(&self) -> bool {
        matches!(self, ColumnKind::PartitionKey(_) | ColumnKind::Clustering(_))
    }
}

/// A column as declared. The type is resolved on use, so changes to user
/// types are picked up.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: TypeSpec,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: TypeSpec, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
        }
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub keyspace: String,
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Partition key columns in key order.
    pub fn partition_key(&self) -> Vec<&ColumnDef> {
        self.key_columns(|kind| match kind {
            ColumnKind::PartitionKey(i) => Some(i),
            _ => None,
        })
    }

    /// Clustering columns in key order.
    pub fn clustering(&self) -> Vec<&ColumnDef> {
        self.key_columns(|kind| match kind {
            ColumnKind::Clustering(i) => Some(i),
            _ => None,
        })
    }

    pub fn has_clustering(&self) -> bool {
        self.columns
            .iter()
            .any(|c| matches!(c.kind, ColumnKind::Clustering(_)))
    }

    /// `keyspace.name`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.name)
    }

    fn key_columns(&self, position: impl Fn(ColumnKind) -> Option<usize>) -> Vec<&ColumnDef> {
        let mut columns: Vec<(usize, &ColumnDef)> = self
            .columns
            .iter()
            .filter_map(|c| position(c.kind).map(|i| (i, c)))
            .collect();
        columns.sort_by_key(|(i, _)| *i);
        columns.into_iter().map(|(_, c)| c).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlguard_lang::{Span, Spanned, TypeSpecKind, QualifiedName};

    fn int() -> TypeSpec {
        TypeSpec::new(
            TypeSpecKind::Named(QualifiedName {
                keyspace: None,
                name: Spanned::new("int".to_string(), Span::default()),
            }),
            Span::default(),
        )
    }

    #[test]
    fn test_key_columns_in_key_order() {
        let table = TableDef::new("ks", "t")
            .with_column(ColumnDef::new("c2", int(), ColumnKind::Clustering(1)))
            .with_column(ColumnDef::new("k", int(), ColumnKind::PartitionKey(0)))
            .with_column(ColumnDef::new("c1", int(), ColumnKind::Clustering(0)))
            .with_column(ColumnDef::new("s", int(), ColumnKind::Static))
            .with_column(ColumnDef::new("v", int(), ColumnKind::Regular));

        let pk: Vec<_> = table.partition_key().iter().map(|c| c.name.as_str()).collect();
        let ck: Vec<_> = table.clustering().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(pk, vec!["k"]);
        assert_eq!(ck, vec!["c1", "c2"]);
        assert!(table.has_clustering());
        assert_eq!(table.get_column("s").map(|c| c.kind), Some(ColumnKind::Static));
        assert_eq!(table.qualified_name(), "ks.t");
    }

    #[test]
    fn test_primary_key_kinds() {
        assert!(ColumnKind::PartitionKey(0).is_primary_key());
        assert!(ColumnKind::Clustering(3).is_primary_key());
        assert!(!ColumnKind::Static.is_primary_key());
        assert!(!ColumnKind::Regular.is_primary_key());
    }
}
