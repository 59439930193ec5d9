//! Provenance entries in `PcGts/Metadata`.

use super::xml::{self, Element};

/// `Metadata` element name.
pub const METADATA: &str = "Metadata";

/// A `MetadataItem` recording a processing step and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataItem {
    /// `@type`, e.g. `processingStep`
    pub item_type: String,
    /// `@name`, e.g. the workflow step
    pub name: String,
    /// `@value`, e.g. the tool name
    pub value: String,
    /// Optional `Labels` group
    pub labels: Option<Labels>,
}

/// A `Labels` group of a metadata item.
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    /// `@externalModel`
    pub external_model: String,
    /// `@externalId`
    pub external_id: String,
    /// `(type, value)` pairs, one `Label` each
    pub labels: Vec<(String, String)>,
}

impl MetadataItem {
    /// A `processingStep` item.
    pub fn processing_step(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            item_type: "processingStep".to_string(),
            name: name.into(),
            value: value.into(),
            labels: None,
        }
    }

    /// Attach a `Labels` group.
    pub fn with_labels(
        mut self,
        external_model: impl Into<String>,
        external_id: impl Into<String>,
        labels: Vec<(String, String)>,
    ) -> Self {
        self.labels = Some(Labels {
            external_model: external_model.into(),
            external_id: external_id.into(),
            labels,
        });
        self
    }

    /// Build the element, using the namespace prefix of `sibling`.
    pub fn to_element(&self, sibling: &str) -> Element {
        let mut item = Element::new(xml::with_prefix_of(sibling, "MetadataItem"))
            .with_attribute("type", &self.item_type)
            .with_attribute("name", &self.name)
            .with_attribute("value", &self.value);
        if let Some(labels) = &self.labels {
            let group = labels.labels.iter().fold(
                Element::new(xml::with_prefix_of(sibling, "Labels"))
                    .with_attribute("externalModel", &labels.external_model)
                    .with_attribute("externalId", &labels.external_id),
                |group, (label_type, value)| {
                    group.with_child(
                        Element::new(xml::with_prefix_of(sibling, "Label"))
                            .with_attribute("type", label_type)
                            .with_attribute("value", value),
                    )
                },
            );
            item = item.with_child(group);
        }
        item
    }
}

/// A fresh `Metadata` element with the mandatory children.
pub fn new_metadata(sibling: &str, creator: &str) -> Element {
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    Element::new(xml::with_prefix_of(sibling, METADATA))
        .with_child(Element::new(xml::with_prefix_of(sibling, "Creator")).with_text(creator))
        .with_child(Element::new(xml::with_prefix_of(sibling, "Created")).with_text(now.clone()))
        .with_child(Element::new(xml::with_prefix_of(sibling, "LastChange")).with_text(now))
}
