//! User-defined type definitions.

use ddlguard_lang::TypeSpec;

/// A field as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeSpec,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeSpec) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A user-defined type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTypeDef {
    pub keyspace: String,
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
}

impl UserTypeDef {
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.name)
    }
}
