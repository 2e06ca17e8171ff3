//! Interned qualified property references
//!
//! An unqualified property name like `name` stands for one stored attribute
//! per declaring type (`entityProperties/Asset.name`,
//! `entityProperties/GlossaryTerm.name`, ...). The type system interns each of
//! those once and hands out `QualifiedPropertyRef` handles, so the compiler
//! compares and counts references without touching strings.

use crate::value::PrimitiveKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Handle to one type-specific stored attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedPropertyRef(pub u32);

impl QualifiedPropertyRef {
    /// Get the underlying index value
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a `QualifiedPropertyRef` stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRefEntry {
    /// Type that declares the property
    pub declaring_type: Arc<str>,
    /// Unqualified property name
    pub property: Arc<str>,
    /// Declared primitive kind
    pub kind: PrimitiveKind,
    /// Stored attribute keyword
    pub attribute: Arc<str>,
}

/// Arena of interned property references, keyed by attribute keyword
#[derive(Debug, Default)]
pub struct PropertyRefArena {
    by_attribute: HashMap<Arc<str>, QualifiedPropertyRef>,
    entries: Vec<PropertyRefEntry>,
}

impl PropertyRefArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a property reference, returning the existing handle if the
    /// attribute keyword was seen before
    pub fn intern(
        &mut self,
        attribute: &str,
        declaring_type: &str,
        property: &str,
        kind: PrimitiveKind,
    ) -> QualifiedPropertyRef {
        if let Some(&id) = self.by_attribute.get(attribute) {
            return id;
        }
        let id = QualifiedPropertyRef(self.entries.len() as u32);
        let attribute: Arc<str> = Arc::from(attribute);
        self.by_attribute.insert(attribute.clone(), id);
        self.entries.push(PropertyRefEntry {
            declaring_type: Arc::from(declaring_type),
            property: Arc::from(property),
            kind,
            attribute,
        });
        id
    }

    /// Look up the handle for an attribute keyword
    pub fn lookup(&self, attribute: &str) -> Option<QualifiedPropertyRef> {
        self.by_attribute.get(attribute).copied()
    }

    /// Get the entry behind a handle
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different arena.
    pub fn get(&self, id: QualifiedPropertyRef) -> &PropertyRefEntry {
        &self.entries[id.index()]
    }

    /// Number of interned references
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
