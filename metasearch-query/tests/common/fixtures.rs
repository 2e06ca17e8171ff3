//! Shared type catalog and documents.
//!
//! ```text
//! Referenceable (qualifiedName)
//! ├── Asset (name, owner, description)
//! │   ├── DataSet
//! │   └── Process (rank: long)
//! └── GlossaryTerm (name, summary)
//! Confidentiality  classification (level: long)
//! SemanticAssignment  relationship (description)
//! ```

use super::eval::{Doc, Value};
use metasearch_query::{InstanceStatus, Literal, PrimitiveKind, TypeCatalog, TypeDef};

pub fn catalog() -> TypeCatalog {
    TypeCatalog::new([
        TypeDef::entity("Referenceable", "g-ref").attribute("qualifiedName", PrimitiveKind::String),
        TypeDef::entity("Asset", "g-asset")
            .extends("Referenceable")
            .attribute("name", PrimitiveKind::String)
            .attribute("owner", PrimitiveKind::String)
            .attribute("description", PrimitiveKind::String),
        TypeDef::entity("DataSet", "g-dataset").extends("Asset"),
        TypeDef::entity("Process", "g-process")
            .extends("Asset")
            .attribute("rank", PrimitiveKind::Long),
        TypeDef::entity("GlossaryTerm", "g-term")
            .extends("Referenceable")
            .attribute("name", PrimitiveKind::String)
            .attribute("summary", PrimitiveKind::String),
        TypeDef::classification("Confidentiality", "g-conf").attribute("level", PrimitiveKind::Long),
        TypeDef::relationship("SemanticAssignment", "g-sa")
            .attribute("description", PrimitiveKind::String),
    ])
    .unwrap()
}

fn lineage(type_name: &str) -> &'static [&'static str] {
    match type_name {
        "Referenceable" => &["g-ref"],
        "Asset" => &["g-asset", "g-ref"],
        "DataSet" => &["g-dataset", "g-asset", "g-ref"],
        "Process" => &["g-process", "g-asset", "g-ref"],
        "GlossaryTerm" => &["g-term", "g-ref"],
        other => panic!("no fixture lineage for {other}"),
    }
}

/// Builder for an entity document shaped the way the store keeps them.
pub struct EntityDoc {
    doc: Doc,
}

impl EntityDoc {
    /// An ACTIVE instance of `type_name`
    pub fn new(id: &str, type_name: &str) -> Self {
        let mut doc = Doc::new(id).with("type.name", Value::string(type_name));
        for guid in lineage(type_name) {
            doc = doc.with("type.guids", Value::string(guid));
        }
        Self { doc }.status(InstanceStatus::Active)
    }

    pub fn status(mut self, status: InstanceStatus) -> Self {
        self.doc.attrs.retain(|(a, _)| a != "currentStatus");
        self.doc = self
            .doc
            .with("currentStatus", Value::Lit(Literal::Long(status.ordinal())));
        self
    }

    pub fn header(mut self, attr: &str, value: Literal) -> Self {
        self.doc = self.doc.with(attr, Value::Lit(value));
        self
    }

    /// Property declared by `declaring`
    pub fn prop(mut self, declaring: &str, name: &str, value: Literal) -> Self {
        self.doc = self
            .doc
            .with(&format!("entityProperties/{declaring}.{name}"), Value::Lit(value));
        self
    }

    pub fn string_prop(self, declaring: &str, name: &str, value: &str) -> Self {
        self.prop(declaring, name, Literal::string(value))
    }

    pub fn classified(mut self, classification: &str, properties: &[(&str, Literal)]) -> Self {
        self.doc = self.doc.with("classifications", Value::string(classification));
        for (name, value) in properties {
            self.doc = self.doc.with(
                &format!(
                    "classifications.{classification}.classificationProperties/{classification}.{name}"
                ),
                Value::Lit(value.clone()),
            );
        }
        self
    }

    pub fn build(self) -> Doc {
        self.doc
    }
}

/// Assets and glossary terms sharing the `name` property.
pub fn named_documents() -> Vec<Doc> {
    vec![
        EntityDoc::new("asset-1", "Asset")
            .string_prop("Asset", "name", "Inventory")
            .string_prop("Asset", "owner", "ann")
            .classified("Confidentiality", &[("level", Literal::Long(3))])
            .build(),
        EntityDoc::new("asset-2", "Asset")
            .string_prop("Asset", "name", "Inventory Report")
            .string_prop("Asset", "owner", "bob")
            .build(),
        EntityDoc::new("dataset-1", "DataSet")
            .string_prop("Asset", "name", "inventory.csv")
            .status(InstanceStatus::Deleted)
            .build(),
        EntityDoc::new("process-1", "Process")
            .string_prop("Asset", "name", "Load inventory")
            .string_prop("Asset", "owner", "ann")
            .prop("Process", "rank", Literal::Long(4))
            .classified("Confidentiality", &[("level", Literal::Long(1))])
            .build(),
        EntityDoc::new("term-1", "GlossaryTerm")
            .string_prop("GlossaryTerm", "name", "Inventory")
            .string_prop("GlossaryTerm", "summary", "Goods held in stock")
            .status(InstanceStatus::Draft)
            .build(),
        EntityDoc::new("term-2", "GlossaryTerm")
            .string_prop("GlossaryTerm", "name", "Customer")
            .build(),
    ]
}

/// Eight processes covering every combination of three facts:
/// `owner = ann`, `name` starts with `Inv`, `rank > 2`.
///
/// Ids spell the combination, e.g. `p-101` owns, is not `Inv*`, ranks high.
pub fn truth_table() -> Vec<Doc> {
    let mut docs = Vec::new();
    for bits in 0..8u8 {
        let (a, b, c) = (bits & 4 != 0, bits & 2 != 0, bits & 1 != 0);
        let id = format!("p-{}{}{}", u8::from(a), u8::from(b), u8::from(c));
        docs.push(
            EntityDoc::new(&id, "Process")
                .string_prop("Asset", "owner", if a { "ann" } else { "zed" })
                .string_prop("Asset", "name", if b { "Inventory" } else { "Customer" })
                .prop("Process", "rank", Literal::Long(if c { 5 } else { 1 }))
                .build(),
        );
    }
    docs
}

/// The `(a, b, c)` facts encoded in a truth-table id
pub fn facts(id: &str) -> (bool, bool, bool) {
    let bits: Vec<bool> = id.trim_start_matches("p-").chars().map(|c| c == '1').collect();
    (bits[0], bits[1], bits[2])
}
