//! Vocabulary Constants for Metadata Search
//!
//! This crate provides a centralized location for the attribute keywords,
//! header property names, and diagnostic codes shared by the search compiler
//! and the store that executes its queries.
//!
//! # Organization
//!
//! - `header` - Built-in header properties carried by every instance
//! - `attr` - Attribute keywords of the stored document shape
//! - `namespaces` - Prefixes used to qualify type-specific property keywords
//! - `diagnostics` - Diagnostic codes reported by the compiler

pub mod diagnostics;

/// Built-in instance header properties
///
/// Header properties are never type-specific: every entity, relationship and
/// classification carries them under a single, unqualified attribute.
pub mod header {
    /// Creation timestamp
    pub const CREATE_TIME: &str = "createTime";

    /// Last update timestamp
    pub const UPDATE_TIME: &str = "updateTime";

    /// User that created the instance
    pub const CREATED_BY: &str = "createdBy";

    /// User that last updated the instance
    pub const UPDATED_BY: &str = "updatedBy";

    /// Users maintaining the instance
    pub const MAINTAINED_BY: &str = "maintainedBy";

    /// Instance version number
    pub const VERSION: &str = "version";

    /// Current lifecycle status
    pub const CURRENT_STATUS: &str = "currentStatus";

    /// Home metadata collection identifier
    pub const METADATA_COLLECTION_ID: &str = "metadataCollectionId";

    /// Home metadata collection display name
    pub const METADATA_COLLECTION_NAME: &str = "metadataCollectionName";

    /// Provenance of the instance (local, external, ...)
    pub const INSTANCE_PROVENANCE_TYPE: &str = "instanceProvenanceType";

    /// Canonical URL of the instance
    pub const INSTANCE_URL: &str = "instanceURL";

    /// Every header property, in declaration order
    pub const ALL: &[&str] = &[
        CREATE_TIME,
        UPDATE_TIME,
        CREATED_BY,
        UPDATED_BY,
        MAINTAINED_BY,
        VERSION,
        CURRENT_STATUS,
        METADATA_COLLECTION_ID,
        METADATA_COLLECTION_NAME,
        INSTANCE_PROVENANCE_TYPE,
        INSTANCE_URL,
    ];

    /// Check if a property name is a built-in header property
    pub fn is_header_property(name: &str) -> bool {
        ALL.contains(&name)
    }
}

/// Attribute keywords of the stored document shape
pub mod attr {
    /// GUIDs of the instance's type and every one of its supertypes (multi-valued)
    pub const TYPE_GUIDS: &str = "type.guids";

    /// Name of the instance's concrete type
    pub const TYPE_NAME: &str = "type.name";

    /// Lifecycle status ordinal
    pub const CURRENT_STATUS: &str = "currentStatus";

    /// Creation timestamp
    pub const CREATE_TIME: &str = "createTime";

    /// Last update timestamp
    pub const UPDATE_TIME: &str = "updateTime";

    /// Home metadata collection identifier
    pub const METADATA_COLLECTION_ID: &str = "metadataCollectionId";

    /// References to the entities at either end of a relationship (multi-valued)
    pub const ENTITY_PROXIES: &str = "entityProxies";

    /// Names of the classifications attached to an entity (multi-valued)
    pub const CLASSIFICATIONS: &str = "classifications";
}

/// Namespace prefixes for type-qualified property keywords
///
/// A qualified keyword has the shape `<namespace>/<DeclaringType>.<property>`.
pub mod namespaces {
    /// Entity instance properties
    pub const ENTITY_PROPERTIES: &str = "entityProperties";

    /// Relationship instance properties
    pub const RELATIONSHIP_PROPERTIES: &str = "relationshipProperties";

    /// Root of the per-classification namespaces
    pub const CLASSIFICATIONS: &str = "classifications";

    /// Property segment inside a classification namespace
    pub const CLASSIFICATION_PROPERTIES: &str = "classificationProperties";

    /// Separator between the namespace and the qualified name
    pub const SEPARATOR: char = '/';
}
