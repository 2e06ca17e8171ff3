//! In-memory type system
//!
//! `TypeCatalog` implements `TypeSystem` over a fixed set of type definitions.
//! It interns every qualified property reference up front, so resolution is a
//! walk up each in-scope type's supertype chain plus arena lookups.
//!
//! Definitions can be built in code or decoded from JSON:
//!
//! ```json
//! [
//!   {"name": "Referenceable", "guid": "a32316b8", "category": "entity",
//!    "attributes": [{"name": "qualifiedName", "kind": "string"}]},
//!   {"name": "Asset", "guid": "896d14c2", "category": "entity",
//!    "supertype": "Referenceable",
//!    "attributes": [{"name": "name", "kind": "string"}]}
//! ]
//! ```

use crate::error::{Result, SearchError};
use crate::property_ref::{PropertyRefArena, PropertyRefEntry, QualifiedPropertyRef};
use crate::type_system::{Namespace, TypeScope, TypeSystem};
use crate::value::{PrimitiveKind, SearchValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Kind of instance a type describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeCategory {
    Entity,
    Relationship,
    Classification,
}

impl TypeCategory {
    fn fits(self, namespace: &Namespace) -> bool {
        matches!(
            (self, namespace),
            (TypeCategory::Entity, Namespace::Entity)
                | (TypeCategory::Relationship, Namespace::Relationship)
                | (TypeCategory::Classification, Namespace::Classification(_))
        )
    }
}

/// Declared attribute of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub kind: PrimitiveKind,
}

/// Type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub guid: String,
    pub category: TypeCategory,
    #[serde(default)]
    pub supertype: Option<String>,
    /// Attributes declared by this type (inherited ones are not repeated)
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl TypeDef {
    /// Create a type definition with no supertype or attributes
    pub fn new(category: TypeCategory, name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
            category,
            supertype: None,
            attributes: Vec::new(),
        }
    }

    /// Entity type definition
    pub fn entity(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self::new(TypeCategory::Entity, name, guid)
    }

    /// Relationship type definition
    pub fn relationship(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self::new(TypeCategory::Relationship, name, guid)
    }

    /// Classification type definition
    pub fn classification(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self::new(TypeCategory::Classification, name, guid)
    }

    /// Set the supertype
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    /// Declare an attribute
    pub fn attribute(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.attributes.push(AttributeDef {
            name: name.into(),
            kind,
        });
        self
    }
}

#[derive(Debug)]
struct TypeNode {
    guid: Arc<str>,
    category: TypeCategory,
    supertype: Option<Arc<str>>,
    attributes: Vec<(Arc<str>, PrimitiveKind)>,
    subtypes: Vec<Arc<str>>,
}

/// In-memory `TypeSystem`
#[derive(Debug)]
pub struct TypeCatalog {
    types: HashMap<Arc<str>, TypeNode>,
    /// Type names in definition order
    order: Vec<Arc<str>>,
    refs: PropertyRefArena,
}

impl TypeCatalog {
    /// Build a catalog from type definitions
    ///
    /// Supertypes may be defined in any order but must exist and share the
    /// subtype's category.
    pub fn new(defs: impl IntoIterator<Item = TypeDef>) -> Result<Self> {
        let mut types: HashMap<Arc<str>, TypeNode> = HashMap::new();
        let mut order = Vec::new();

        for def in defs {
            let name: Arc<str> = Arc::from(def.name.as_str());
            if types.contains_key(&name) {
                return Err(SearchError::DuplicateType(def.name));
            }
            let node = TypeNode {
                guid: Arc::from(def.guid.as_str()),
                category: def.category,
                supertype: def.supertype.as_deref().map(Arc::from),
                attributes: def
                    .attributes
                    .iter()
                    .map(|a| (Arc::from(a.name.as_str()), a.kind))
                    .collect(),
                subtypes: Vec::new(),
            };
            types.insert(name.clone(), node);
            order.push(name);
        }

        for name in &order {
            let Some(supertype) = types[name].supertype.clone() else {
                continue;
            };
            let category = types[name].category;
            let parent = types
                .get_mut(&supertype)
                .ok_or_else(|| SearchError::UnknownSupertype {
                    type_name: name.to_string(),
                    supertype: supertype.to_string(),
                })?;
            if parent.category != category {
                return Err(SearchError::CategoryMismatch {
                    type_name: name.to_string(),
                    supertype: supertype.to_string(),
                });
            }
            parent.subtypes.push(name.clone());
        }

        let mut catalog = Self {
            types,
            order,
            refs: PropertyRefArena::new(),
        };
        catalog.intern_all();
        Ok(catalog)
    }

    /// Build a catalog from a JSON array of type definitions
    pub fn from_json(json: &str) -> Result<Self> {
        let defs: Vec<TypeDef> = serde_json::from_str(json)?;
        Self::new(defs)
    }

    /// Number of defined types
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog defines no types
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// A type and its supertypes, nearest first
    ///
    /// Stops after visiting every defined type once, so a cyclic definition
    /// cannot loop.
    fn lineage(&self, type_name: &str) -> Vec<(&Arc<str>, &TypeNode)> {
        let mut out = Vec::new();
        let mut current = self.types.get_key_value(type_name);
        while let Some((name, node)) = current {
            if out.len() > self.order.len() {
                break;
            }
            out.push((name, node));
            current = node
                .supertype
                .as_deref()
                .and_then(|s| self.types.get_key_value(s));
        }
        out
    }

    fn namespace_for(&self, type_name: &Arc<str>, category: TypeCategory) -> Namespace {
        match category {
            TypeCategory::Entity => Namespace::Entity,
            TypeCategory::Relationship => Namespace::Relationship,
            TypeCategory::Classification => Namespace::Classification(type_name.clone()),
        }
    }

    fn intern_all(&mut self) {
        let mut pending = Vec::new();
        for name in &self.order {
            let namespace = self.namespace_for(name, self.types[name].category);
            for (declaring, node) in self.lineage(name) {
                for (attr, kind) in &node.attributes {
                    pending.push((
                        namespace.qualify(declaring, attr),
                        declaring.clone(),
                        attr.clone(),
                        *kind,
                    ));
                }
            }
        }
        for (keyword, declaring, attr, kind) in pending {
            self.refs.intern(&keyword, &declaring, &attr, kind);
        }
    }
}

impl TypeSystem for TypeCatalog {
    fn resolve_property_references(
        &self,
        name: &str,
        namespace: &Namespace,
        scope: &TypeScope,
        sample: Option<&SearchValue>,
    ) -> Vec<QualifiedPropertyRef> {
        let candidates: Vec<&str> = if scope.is_unrestricted() {
            self.order.iter().map(|n| n.as_ref()).collect()
        } else {
            scope.iter().collect()
        };

        let mut found = BTreeSet::new();
        for type_name in candidates {
            let Some(node) = self.types.get(type_name) else {
                continue;
            };
            if !node.category.fits(namespace) {
                continue;
            }
            for (declaring, ancestor) in self.lineage(type_name) {
                if !ancestor.attributes.iter().any(|(a, _)| a.as_ref() == name) {
                    continue;
                }
                if let Some(id) = self.refs.lookup(&namespace.qualify(declaring, name)) {
                    found.insert(id);
                }
            }
        }

        found
            .into_iter()
            .filter(|id| sample.map_or(true, |v| self.refs.get(*id).kind.accepts(v)))
            .collect()
    }

    fn property_ref(&self, property: QualifiedPropertyRef) -> &PropertyRefEntry {
        self.refs.get(property)
    }

    fn type_guid(&self, type_name: &str) -> Option<Arc<str>> {
        self.types.get(type_name).map(|n| n.guid.clone())
    }

    fn subtype_guids(&self, type_name: &str) -> Vec<Arc<str>> {
        let mut out = Vec::new();
        let mut stack = vec![type_name];
        let mut seen = BTreeSet::new();
        while let Some(name) = stack.pop() {
            let Some(node) = self.types.get(name) else {
                continue;
            };
            if !seen.insert(name) {
                continue;
            }
            out.push(node.guid.clone());
            stack.extend(node.subtypes.iter().rev().map(|s| s.as_ref()));
        }
        out
    }

    fn classification_type(&self, classification: &str) -> Option<Arc<str>> {
        self.types
            .get_key_value(classification)
            .filter(|(_, node)| node.category == TypeCategory::Classification)
            .map(|(name, _)| name.clone())
    }
}
