//! DSpace Intermediate Metadata (DIM) records and their conversion to
//! Dublin Core descriptors.
//!
//! A DIM record is a flat list of fields:
//!
//! ```xml
//! <dim:dim xmlns:dim="http://www.dspace.org/xmlns/dspace/dim">
//!   <dim:field mdschema="dc" element="title" lang="en">Example</dim:field>
//!   <dim:field mdschema="dc" element="date" qualifier="issued">2020</dim:field>
//!   <dim:field mdschema="dcterms" element="abstract">…</dim:field>
//! </dim:dim>
//! ```
//!
//! Only fields with `mdschema="dc"` survive conversion.

use roxmltree::{Document, Node};

use crate::error::{PackagerError, Result};
use crate::oai::{NamespaceTable, RecordDocument};

/// Metadata schema kept by the conversion.
pub const DC_SCHEMA: &str = "dc";

/// One `<dim:field>` of a native record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeField {
    pub schema: Option<String>,
    pub element: Option<String>,
    pub qualifier: Option<String>,
    pub language: Option<String>,
    pub text: String,
}

impl NativeField {
    /// Field in `schema` with the given element and text.
    #[must_use]
    pub fn new(schema: &str, element: &str, text: &str) -> Self {
        Self {
            schema: Some(schema.to_string()),
            element: Some(element.to_string()),
            qualifier: None,
            language: None,
            text: text.to_string(),
        }
    }

    #[must_use]
    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = Some(qualifier.to_string());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }
}

/// A native metadata record as fetched for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeMetadataRecord {
    /// OAI identifier of the item.
    pub identifier: String,
    /// Fields in document order.
    pub fields: Vec<NativeField>,
}

impl NativeMetadataRecord {
    /// Parse the `dim:dim` payload of a `GetRecord` response.
    pub fn from_record(record: &RecordDocument, ns: &NamespaceTable) -> Result<Self> {
        Self::parse(record.payload_xml(), &record.identifier, ns)
    }

    /// Parse a standalone `dim:dim` document.
    ///
    /// Every element below the root is taken as a field, in document order.
    pub fn parse(xml: &str, identifier: &str, ns: &NamespaceTable) -> Result<Self> {
        let dim = ns.uri("dim")?;
        let doc = Document::parse(xml)?;
        let root = doc.root_element();

        if !root.has_tag_name((dim, "dim")) {
            return Err(PackagerError::MissingElement {
                element: "dim:dim".to_string(),
                context: format!("metadata of {identifier}"),
            });
        }

        let fields = root
            .descendants()
            .skip(1)
            .filter(|n| n.is_element())
            .map(|n| NativeField {
                schema: attr(n, "mdschema"),
                element: attr(n, "element"),
                qualifier: attr(n, "qualifier"),
                language: attr(n, "lang"),
                text: n.text().unwrap_or_default().to_string(),
            })
            .collect();

        Ok(Self {
            identifier: identifier.to_string(),
            fields,
        })
    }
}

fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// A flattened Dublin Core value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcDescriptor {
    pub element: String,
    pub qualifier: Option<String>,
    pub language: Option<String>,
    pub text: String,
}

impl DcDescriptor {
    /// `dc.element[.qualifier]` key, as listed in element summaries.
    ///
    /// # Examples
    /// ```
    /// use dc_ore_packager::dim::DcDescriptor;
    ///
    /// let d = DcDescriptor {
    ///     element: "date".to_string(),
    ///     qualifier: Some("issued".to_string()),
    ///     language: None,
    ///     text: "2020".to_string(),
    /// };
    /// assert_eq!(d.key(), "dc.date.issued");
    /// ```
    #[must_use]
    pub fn key(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{DC_SCHEMA}.{}.{q}", self.element),
            None => format!("{DC_SCHEMA}.{}", self.element),
        }
    }
}

/// Convert a native record into Dublin Core descriptors.
///
/// Fields outside the `dc` schema are dropped without error. A `dc` field
/// without a (non-empty) `element` attribute fails the whole conversion.
/// Order and repeated values are preserved; text is copied as is.
pub fn convert(record: &NativeMetadataRecord) -> Result<Vec<DcDescriptor>> {
    let mut descriptors = Vec::new();

    for (position, field) in record.fields.iter().enumerate() {
        if field.schema.as_deref() != Some(DC_SCHEMA) {
            continue;
        }

        let element = field
            .element
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| PackagerError::SchemaViolation {
                identifier: record.identifier.clone(),
                position: position + 1,
            })?;

        descriptors.push(DcDescriptor {
            element: element.to_string(),
            qualifier: field.qualifier.clone(),
            language: field.language.clone(),
            text: field.text.clone(),
        });
    }

    tracing::debug!(
        identifier = %record.identifier,
        fields = record.fields.len(),
        descriptors = descriptors.len(),
        "Converted DIM record"
    );
    Ok(descriptors)
}
