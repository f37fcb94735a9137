//! Declared type model.
//!
//! A [`TypeExpression`] is the resolved form of a column or field type: native
//! names are mapped to [`ScalarType`] and user type references are inlined as
//! [`UserType`] nodes, so the tree is self-contained and owns every child.

use crate::error::StructuralError;
use std::fmt;

/// Native scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Ascii,
    BigInt,
    Blob,
    Boolean,
    Counter,
    Date,
    Decimal,
    Double,
    Duration,
    Float,
    Inet,
    Int,
    SmallInt,
    Text,
    Time,
    Timestamp,
    TimeUuid,
    TinyInt,
    Uuid,
    VarInt,
}

impl ScalarType {
    /// Look up a native type by its (lower-case) name. `varchar` is an alias
    /// of `text`.
    pub fn from_name(name: &str) -> Option<Self> {
        let scalar = match name {
            "ascii" => ScalarType::Ascii,
            "bigint" => ScalarType::BigInt,
            "blob" => ScalarType::Blob,
            "boolean" => ScalarType::Boolean,
            "counter" => ScalarType::Counter,
            "date" => ScalarType::Date,
            "decimal" => ScalarType::Decimal,
            "double" => ScalarType::Double,
            "duration" => ScalarType::Duration,
            "float" => ScalarType::Float,
            "inet" => ScalarType::Inet,
            "int" => ScalarType::Int,
            "smallint" => ScalarType::SmallInt,
            "text" | "varchar" => ScalarType::Text,
            "time" => ScalarType::Time,
            "timestamp" => ScalarType::Timestamp,
            "timeuuid" => ScalarType::TimeUuid,
            "tinyint" => ScalarType::TinyInt,
            "uuid" => ScalarType::Uuid,
            "varint" => ScalarType::VarInt,
            _ => return None,
        };
        Some(scalar)
    }

    /// The CQL name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Ascii => "ascii",
            ScalarType::BigInt => "bigint",
            ScalarType::Blob => "blob",
            ScalarType::Boolean => "boolean",
            ScalarType::Counter => "counter",
            ScalarType::Date => "date",
            ScalarType::Decimal => "decimal",
            ScalarType::Double => "double",
            ScalarType::Duration => "duration",
            ScalarType::Float => "float",
            ScalarType::Inet => "inet",
            ScalarType::Int => "int",
            ScalarType::SmallInt => "smallint",
            ScalarType::Text => "text",
            ScalarType::Time => "time",
            ScalarType::Timestamp => "timestamp",
            ScalarType::TimeUuid => "timeuuid",
            ScalarType::TinyInt => "tinyint",
            ScalarType::Uuid => "uuid",
            ScalarType::VarInt => "varint",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user-defined type with its fields resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserType {
    pub keyspace: String,
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<(String, TypeExpression)>,
}

impl UserType {
    /// Checked constructor.
    ///
    /// Fails if any field contains, at any depth, a user type with the same
    /// qualified name.
    pub fn new(
        keyspace: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<(String, TypeExpression)>,
    ) -> Result<Self, StructuralError> {
        let udt = UserType {
            keyspace: keyspace.into(),
            name: name.into(),
            fields,
        };

        let self_reference = udt
            .fields
            .iter()
            .any(|(_, ty)| ty.contains_user_type(&udt.keyspace, &udt.name));
        if self_reference {
            return Err(StructuralError::CircularReference {
                name: udt.qualified_name(),
            });
        }
        Ok(udt)
    }

    pub fn field(&self, name: &str) -> Option<&TypeExpression> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }

    /// `keyspace.name`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.keyspace, self.name)
    }

    fn is(&self, keyspace: &str, name: &str) -> bool {
        self.keyspace == keyspace && self.name == name
    }
}

/// A declared type.
///
/// Construct vectors and user types through [`TypeExpression::vector`] and
/// [`TypeExpression::user_defined`], which enforce the structural invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpression {
    Scalar(ScalarType),
    Vector {
        element: Box<TypeExpression>,
        dimensions: u32,
    },
    List(Box<TypeExpression>),
    Set(Box<TypeExpression>),
    Map {
        key: Box<TypeExpression>,
        value: Box<TypeExpression>,
    },
    Tuple(Vec<TypeExpression>),
    Frozen(Box<TypeExpression>),
    UserDefined(UserType),
}

impl TypeExpression {
    pub fn scalar(scalar: ScalarType) -> Self {
        TypeExpression::Scalar(scalar)
    }

    /// A vector type. Zero dimensions is rejected.
    pub fn vector(element: TypeExpression, dimensions: u32) -> Result<Self, StructuralError> {
        if dimensions == 0 {
            return Err(StructuralError::InvalidDimensions { dimensions });
        }
        Ok(TypeExpression::Vector {
            element: Box::new(element),
            dimensions,
        })
    }

    pub fn list(element: TypeExpression) -> Self {
        TypeExpression::List(Box::new(element))
    }

    pub fn set(element: TypeExpression) -> Self {
        TypeExpression::Set(Box::new(element))
    }

    pub fn map(key: TypeExpression, value: TypeExpression) -> Self {
        TypeExpression::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn tuple(components: Vec<TypeExpression>) -> Self {
        TypeExpression::Tuple(components)
    }

    pub fn frozen(inner: TypeExpression) -> Self {
        TypeExpression::Frozen(Box::new(inner))
    }

    /// A user-defined type. See [`UserType::new`].
    pub fn user_defined(
        keyspace: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<(String, TypeExpression)>,
    ) -> Result<Self, StructuralError> {
        UserType::new(keyspace, name, fields).map(TypeExpression::UserDefined)
    }

    /// Direct children in declaration order.
    pub fn children(&self) -> Vec<&TypeExpression> {
        match self {
            TypeExpression::Scalar(_) => Vec::new(),
            TypeExpression::Vector { element, .. } => vec![element.as_ref()],
            TypeExpression::List(inner) | TypeExpression::Set(inner) => vec![inner.as_ref()],
            TypeExpression::Map { key, value } => vec![key.as_ref(), value.as_ref()],
            TypeExpression::Tuple(components) => components.iter().collect(),
            TypeExpression::Frozen(inner) => vec![inner.as_ref()],
            TypeExpression::UserDefined(udt) => udt.fields.iter().map(|(_, ty)| ty).collect(),
        }
    }

    /// List, set, or map.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            TypeExpression::List(_) | TypeExpression::Set(_) | TypeExpression::Map { .. }
        )
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, TypeExpression::Frozen(_))
    }

    /// Wrap in `frozen<>` unless already frozen.
    pub fn freeze(self) -> Self {
        if self.is_frozen() {
            self
        } else {
            TypeExpression::frozen(self)
        }
    }

    /// A collection or user type that is stored cell by cell, i.e. not frozen.
    pub fn is_multi_cell(&self) -> bool {
        self.is_collection() || matches!(self, TypeExpression::UserDefined(_))
    }

    /// Whether a user type named `keyspace.name` appears anywhere in this tree.
    pub fn contains_user_type(&self, keyspace: &str, name: &str) -> bool {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let TypeExpression::UserDefined(udt) = node {
                if udt.is(keyspace, name) {
                    return true;
                }
            }
            stack.extend(node.children());
        }
        false
    }
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpression::Scalar(scalar) => write!(f, "{}", scalar),
            TypeExpression::Vector {
                element,
                dimensions,
            } => write!(f, "vector<{}, {}>", element, dimensions),
            TypeExpression::List(inner) => write!(f, "list<{}>", inner),
            TypeExpression::Set(inner) => write!(f, "set<{}>", inner),
            TypeExpression::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            TypeExpression::Tuple(components) => {
                write!(f, "tuple<")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", component)?;
                }
                write!(f, ">")
            }
            TypeExpression::Frozen(inner) => write!(f, "frozen<{}>", inner),
            TypeExpression::UserDefined(udt) => write!(f, "{}", udt.qualified_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> TypeExpression {
        TypeExpression::scalar(ScalarType::Int)
    }

    #[test]
    fn test_scalar_names() {
        assert_eq!(ScalarType::from_name("int"), Some(ScalarType::Int));
        assert_eq!(ScalarType::from_name("varchar"), Some(ScalarType::Text));
        assert_eq!(ScalarType::from_name("point"), None);
        assert_eq!(ScalarType::TimeUuid.to_string(), "timeuuid");
    }

    #[test]
    fn test_display_nested() {
        let vector = TypeExpression::vector(int(), 5).unwrap();
        let ty = TypeExpression::map(TypeExpression::frozen(TypeExpression::set(vector)), int());
        assert_eq!(ty.to_string(), "map<frozen<set<vector<int, 5>>>, int>");
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            TypeExpression::vector(int(), 0),
            Err(StructuralError::InvalidDimensions { dimensions: 0 })
        );
    }

    #[test]
    fn test_children_order() {
        let ty = TypeExpression::tuple(vec![
            TypeExpression::scalar(ScalarType::Text),
            int(),
            TypeExpression::scalar(ScalarType::Uuid),
        ]);
        let names: Vec<String> = ty.children().iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["text", "int", "uuid"]);
        assert!(int().children().is_empty());
    }

    #[test]
    fn test_multi_cell() {
        assert!(TypeExpression::list(int()).is_multi_cell());
        assert!(!TypeExpression::frozen(TypeExpression::list(int())).is_multi_cell());
        assert!(!TypeExpression::tuple(vec![int()]).is_multi_cell());
        assert!(!TypeExpression::vector(int(), 3).unwrap().is_multi_cell());
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let frozen = TypeExpression::list(int()).freeze();
        assert_eq!(frozen.to_string(), "frozen<list<int>>");
        assert_eq!(frozen.clone().freeze(), frozen);
    }

    #[test]
    fn test_user_defined_rejects_self_reference() {
        let inner = TypeExpression::user_defined("ks", "point", vec![("x".into(), int())]).unwrap();
        let result = TypeExpression::user_defined(
            "ks",
            "point",
            vec![("p".into(), TypeExpression::frozen(TypeExpression::list(inner.clone())))],
        );
        assert_eq!(
            result,
            Err(StructuralError::CircularReference {
                name: "ks.point".to_string()
            })
        );

        // Same name in another keyspace is a different type.
        let other = TypeExpression::user_defined("other", "point", vec![("p".into(), inner)]);
        assert!(other.is_ok());
    }
}
