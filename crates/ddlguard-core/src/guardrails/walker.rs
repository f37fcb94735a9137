//! Locating vector types inside nested type expressions.
//!
//! Vectors can hide anywhere in a declared type: as a collection element, a
//! map key or value, a tuple component, behind `frozen<>`, or in a field of a
//! user type. [`VectorDimensionWalker::find`] visits the whole tree in
//! pre-order, left to right, and yields every vector it meets.

use std::fmt;

use crate::types::TypeExpression;

/// One step from a type to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    VectorElement,
    ListElement,
    SetElement,
    MapKey,
    MapValue,
    TupleComponent(usize),
    Frozen,
    UdtField(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::VectorElement => write!(f, "vector"),
            PathSegment::ListElement => write!(f, "list"),
            PathSegment::SetElement => write!(f, "set"),
            PathSegment::MapKey => write!(f, "map.key"),
            PathSegment::MapValue => write!(f, "map.value"),
            PathSegment::TupleComponent(i) => write!(f, "tuple.{}", i),
            PathSegment::Frozen => write!(f, "frozen"),
            PathSegment::UdtField(name) => write!(f, "{}", name),
        }
    }
}

/// Location of a node relative to the declared type's root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypePath(Vec<PathSegment>);

impl TypePath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// The declared type itself.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn child(&self, segment: PathSegment) -> TypePath {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        TypePath(segments)
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "(top level)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A vector found inside a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorOccurrence {
    pub dimensions: u32,
    /// Where the vector sits; diagnostic only.
    pub path: TypePath,
}

/// Finds vector types in a type expression.
pub struct VectorDimensionWalker;

impl VectorDimensionWalker {
    /// Lazily iterate over every vector in `root`.
    ///
    /// The iterator is cheap to clone, and calling `find` again restarts the
    /// traversal. The same vector type appearing twice yields two occurrences.
    pub fn find(root: &TypeExpression) -> VectorOccurrences<'_> {
        VectorOccurrences {
            stack: vec![(root, TypePath::default())],
        }
    }
}

/// Iterator returned by [`VectorDimensionWalker::find`].
///
/// Uses an explicit work stack rather than recursion, so depth is bounded only
/// by memory.
#[derive(Debug, Clone)]
pub struct VectorOccurrences<'a> {
    stack: Vec<(&'a TypeExpression, TypePath)>,
}

impl<'a> VectorOccurrences<'a> {
    /// Push children right to left so the leftmost is visited first.
    fn push_children(&mut self, node: &'a TypeExpression, path: &TypePath) {
        match node {
            TypeExpression::Scalar(_) => {}
            TypeExpression::Vector { element, .. } => {
                self.stack.push((element, path.child(PathSegment::VectorElement)));
            }
            TypeExpression::List(inner) => {
                self.stack.push((inner, path.child(PathSegment::ListElement)));
            }
            TypeExpression::Set(inner) => {
                self.stack.push((inner, path.child(PathSegment::SetElement)));
            }
            TypeExpression::Map { key, value } => {
                self.stack.push((value, path.child(PathSegment::MapValue)));
                self.stack.push((key, path.child(PathSegment::MapKey)));
            }
            TypeExpression::Tuple(components) => {
                for (i, component) in components.iter().enumerate().rev() {
                    self.stack.push((component, path.child(PathSegment::TupleComponent(i))));
                }
            }
            TypeExpression::Frozen(inner) => {
                self.stack.push((inner, path.child(PathSegment::Frozen)));
            }
            TypeExpression::UserDefined(udt) => {
                for (name, ty) in udt.fields.iter().rev() {
                    self.stack.push((ty, path.child(PathSegment::UdtField(name.clone()))));
                }
            }
        }
    }
}

impl<'a> Iterator for VectorOccurrences<'a> {
    type Item = VectorOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            self.push_children(node, &path);
            if let TypeExpression::Vector { dimensions, .. } = node {
                return Some(VectorOccurrence {
                    dimensions: *dimensions,
                    path,
                });
            }
        }
        None
    }
}
