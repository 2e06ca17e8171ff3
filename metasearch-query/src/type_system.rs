//! The type-system seam
//!
//! The compiler never reads type definitions itself. It asks a `TypeSystem`
//! which qualified references an unqualified property name stands for under a
//! given `TypeScope`, and which GUIDs a type name covers.

use crate::property_ref::{PropertyRefEntry, QualifiedPropertyRef};
use crate::value::SearchValue;
use metasearch_vocab::{header, namespaces};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Where a property condition is evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Properties of the row's entity
    Entity,
    /// Properties of the row's relationship
    Relationship,
    /// Properties of one named classification attached to the row
    Classification(Arc<str>),
}

impl Namespace {
    /// Namespace for a classification's properties
    pub fn classification(name: impl AsRef<str>) -> Self {
        Namespace::Classification(Arc::from(name.as_ref()))
    }

    /// Keyword prefix shared by every property in this namespace
    pub fn prefix(&self) -> String {
        match self {
            Namespace::Entity => namespaces::ENTITY_PROPERTIES.to_string(),
            Namespace::Relationship => namespaces::RELATIONSHIP_PROPERTIES.to_string(),
            Namespace::Classification(name) => format!(
                "{}.{}.{}",
                namespaces::CLASSIFICATIONS,
                name,
                namespaces::CLASSIFICATION_PROPERTIES
            ),
        }
    }

    /// Stored attribute keyword for a property declared by `declaring_type`
    pub fn qualify(&self, declaring_type: &str, property: &str) -> String {
        format!(
            "{}{}{}.{}",
            self.prefix(),
            namespaces::SEPARATOR,
            declaring_type,
            property
        )
    }

    /// Name of the classification, if this is a classification namespace
    pub fn classification_name(&self) -> Option<&str> {
        match self {
            Namespace::Classification(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

/// Concrete record types a search is restricted to
///
/// An empty scope is unrestricted. Scopes are values: restricting one yields
/// a new scope and leaves the original untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeScope {
    types: BTreeSet<Arc<str>>,
}

impl TypeScope {
    /// Unrestricted scope
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Scope limited to the given type names
    pub fn of<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            types: types.into_iter().map(|t| Arc::from(t.as_ref())).collect(),
        }
    }

    /// Check if no restriction applies
    pub fn is_unrestricted(&self) -> bool {
        self.types.is_empty()
    }

    /// Check if a type name is in scope
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    /// Scope limited to exactly one type
    pub fn restrict_to(&self, type_name: &str) -> TypeScope {
        TypeScope::of([type_name])
    }

    /// Type names in scope, in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.as_ref())
    }

    /// Number of types in scope
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the scope lists no types (same as unrestricted)
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Read-only view of the metadata type system
///
/// Implementations must be safe for concurrent reads; the compiler holds no
/// lock while querying them.
pub trait TypeSystem: Send + Sync {
    /// Qualified references `name` could denote under `scope`
    ///
    /// `sample` lets the implementation drop variations whose declared kind
    /// could never match the value being compared. The result is ordered and
    /// free of duplicates.
    fn resolve_property_references(
        &self,
        name: &str,
        namespace: &Namespace,
        scope: &TypeScope,
        sample: Option<&SearchValue>,
    ) -> Vec<QualifiedPropertyRef>;

    /// Entry behind a reference this type system issued
    fn property_ref(&self, property: QualifiedPropertyRef) -> &PropertyRefEntry;

    /// Check if `name` is a built-in header property
    fn is_builtin_header_property(&self, name: &str) -> bool {
        header::is_header_property(name)
    }

    /// GUID of a type, if the name is known
    fn type_guid(&self, type_name: &str) -> Option<Arc<str>>;

    /// GUIDs of a type and every one of its subtypes (empty if unknown)
    fn subtype_guids(&self, type_name: &str) -> Vec<Arc<str>>;

    /// Type declaring a classification's properties, if the classification is known
    fn classification_type(&self, classification: &str) -> Option<Arc<str>>;
}
