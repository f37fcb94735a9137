//! Resolving declared types against the catalog.

use std::collections::HashMap;

use ddlguard_lang::{QualifiedName, TypeSpec, TypeSpecKind};

use super::catalog::KeyspaceSchema;
use super::user_type::UserTypeDef;
use crate::error::{CatalogError, CatalogResult, StructuralError};
use crate::types::{ScalarType, TypeExpression, UserType};

/// Deepest nesting a resolved type may reach, user types expanded.
pub const MAX_RESOLVED_DEPTH: usize = 256;

/// Most type nodes one resolver may produce, user types expanded.
pub const MAX_RESOLVED_NODES: usize = 10_000;

/// A user type already expanded, with the nodes and depth it accounts for.
struct Expanded {
    user_type: UserType,
    nodes: usize,
    depth: usize,
}

/// Turns [`TypeSpec`]s into [`TypeExpression`]s for one keyspace.
///
/// A pending definition shadows the catalog entry of the same name, so a type
/// being created or altered can be checked before it is stored.
///
/// User types are inlined by value. Each one is expanded once per resolver
/// and reused, but every use still counts towards [`MAX_RESOLVED_NODES`].
pub(crate) struct Resolver<'a> {
    keyspace: &'a str,
    schema: Option<&'a KeyspaceSchema>,
    pending: Option<&'a UserTypeDef>,
    /// User types currently being expanded, outermost first.
    visiting: Vec<String>,
    expanded: HashMap<String, Expanded>,
    depth: usize,
    /// Deepest `depth` reached since the innermost expansion began.
    peak: usize,
    nodes: usize,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(keyspace: &'a str, schema: Option<&'a KeyspaceSchema>) -> Self {
        Self {
            keyspace,
            schema,
            pending: None,
            visiting: Vec::new(),
            expanded: HashMap::new(),
            depth: 0,
            peak: 0,
            nodes: 0,
        }
    }

    pub(crate) fn with_pending(mut self, def: &'a UserTypeDef) -> Self {
        self.pending = Some(def);
        self
    }

    pub(crate) fn resolve(&mut self, spec: &TypeSpec) -> CatalogResult<TypeExpression> {
        if self.depth == MAX_RESOLVED_DEPTH {
            return Err(CatalogError::TypeTooDeep {
                limit: MAX_RESOLVED_DEPTH,
            });
        }
        self.charge(1)?;

        self.depth += 1;
        self.peak = self.peak.max(self.depth);
        let resolved = self.resolve_kind(spec);
        self.depth -= 1;
        resolved
    }

    fn resolve_kind(&mut self, spec: &TypeSpec) -> CatalogResult<TypeExpression> {
        match &spec.kind {
            TypeSpecKind::Named(name) => self.resolve_named(name),
            TypeSpecKind::List(inner) => {
                let element = self.resolve_collection_element(spec, inner)?;
                Ok(TypeExpression::list(element))
            }
            TypeSpecKind::Set(inner) => {
                let element = self.resolve_collection_element(spec, inner)?;
                Ok(TypeExpression::set(element))
            }
            TypeSpecKind::Map { key, value } => {
                let key = self.resolve_collection_element(spec, key)?;
                let value = self.resolve_collection_element(spec, value)?;
                Ok(TypeExpression::map(key, value))
            }
            TypeSpecKind::Tuple(components) => {
                let components = components
                    .iter()
                    .map(|component| self.resolve(component))
                    .collect::<CatalogResult<Vec<_>>>()?;
                Ok(TypeExpression::tuple(components))
            }
            TypeSpecKind::Frozen(inner) => {
                let inner = self.resolve(inner)?;
                if let TypeExpression::Scalar(_) = inner {
                    return Err(CatalogError::InvalidFrozen {
                        ty: spec.to_string(),
                    });
                }
                Ok(inner.freeze())
            }
            TypeSpecKind::Vector {
                element,
                dimensions,
            } => {
                let element = self.resolve(element)?;
                Ok(TypeExpression::vector(element, dimensions.value)?)
            }
        }
    }

    /// Expand the user type `name` in this keyspace.
    pub(crate) fn resolve_user_type(&mut self, name: &str) -> CatalogResult<UserType> {
        let def = self.lookup(name).ok_or_else(|| CatalogError::UnknownType {
            keyspace: self.keyspace.to_string(),
            name: name.to_string(),
        })?;

        let qualified = def.qualified_name();
        if self.visiting.contains(&qualified) {
            return Err(StructuralError::CircularReference { name: qualified }.into());
        }

        if let Some(expanded) = self.expanded.get(&qualified) {
            let depth = self.depth + expanded.depth;
            if depth > MAX_RESOLVED_DEPTH {
                return Err(CatalogError::TypeTooDeep {
                    limit: MAX_RESOLVED_DEPTH,
                });
            }
            let nodes = self.nodes.saturating_add(expanded.nodes);
            if nodes > MAX_RESOLVED_NODES {
                return Err(CatalogError::TypeTooLarge {
                    limit: MAX_RESOLVED_NODES,
                });
            }
            let user_type = expanded.user_type.clone();
            self.nodes = nodes;
            self.peak = self.peak.max(depth);
            return Ok(user_type);
        }

        let nodes_before = self.nodes;
        let outer_peak = self.peak;
        self.peak = self.depth;

        // Self-reference is already ruled out by `visiting`.
        self.visiting.push(qualified.clone());
        let fields = def
            .fields
            .iter()
            .map(|field| self.resolve(&field.ty).map(|ty| (field.name.clone(), ty)))
            .collect::<CatalogResult<Vec<_>>>();
        self.visiting.pop();

        let depth = self.peak - self.depth;
        self.peak = self.peak.max(outer_peak);

        let user_type = UserType {
            keyspace: self.keyspace.to_string(),
            name: name.to_string(),
            fields: fields?,
        };
        self.expanded.insert(
            qualified,
            Expanded {
                user_type: user_type.clone(),
                nodes: self.nodes - nodes_before,
                depth,
            },
        );
        Ok(user_type)
    }

    /// Count `nodes` more resolved nodes against the budget.
    fn charge(&mut self, nodes: usize) -> CatalogResult<()> {
        self.nodes = self.nodes.saturating_add(nodes);
        if self.nodes > MAX_RESOLVED_NODES {
            return Err(CatalogError::TypeTooLarge {
                limit: MAX_RESOLVED_NODES,
            });
        }
        Ok(())
    }

    fn resolve_named(&mut self, name: &QualifiedName) -> CatalogResult<TypeExpression> {
        match &name.keyspace {
            Some(keyspace) if keyspace.value != self.keyspace => {
                return Err(CatalogError::CrossKeyspaceType {
                    keyspace: self.keyspace.to_string(),
                    other: keyspace.value.clone(),
                });
            }
            Some(_) => {}
            None => {
                if let Some(scalar) = ScalarType::from_name(&name.name.value) {
                    return Ok(TypeExpression::scalar(scalar));
                }
            }
        }

        self.resolve_user_type(&name.name.value)
            .map(TypeExpression::UserDefined)
    }

    /// Collections hold single-cell values only.
    fn resolve_collection_element(
        &mut self,
        collection: &TypeSpec,
        element: &TypeSpec,
    ) -> CatalogResult<TypeExpression> {
        let element = self.resolve(element)?;
        if element.is_multi_cell() {
            return Err(CatalogError::NonFrozenNested {
                ty: collection.to_string(),
            });
        }
        Ok(element)
    }

    fn lookup(&self, name: &str) -> Option<&'a UserTypeDef> {
        self.pending
            .filter(|def| def.name == name)
            .or_else(|| self.schema.and_then(|schema| schema.user_type(name)))
    }
}
