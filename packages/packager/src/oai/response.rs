//! Parsing of OAI-PMH `Identify` and `GetRecord` responses.
//!
//! These functions work on response text only, so they can be exercised
//! without a server.

use roxmltree::{Document, Node};

use crate::error::{PackagerError, Result};
use crate::oai::namespaces::NamespaceTable;
use crate::xml::{child_text, element_children, get_tag_name, require_child, serialize_element};

/// Repository identifier fields from an `Identify` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyResponse {
    /// `oai-identifier/repositoryIdentifier`.
    pub repository_identifier: String,
    /// `oai-identifier/delimiter`.
    pub delimiter: String,
    /// `oai-identifier/sampleIdentifier`, when the repository publishes one.
    pub sample_identifier: Option<String>,
}

/// The `<metadata>` payload of a `GetRecord` response.
///
/// The payload element is kept as standalone XML text (namespace
/// declarations included), so it outlives the response buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDocument {
    /// OAI identifier the record was requested for.
    pub identifier: String,
    /// Metadata prefix the record was requested in.
    pub metadata_prefix: String,
    payload: String,
}

impl RecordDocument {
    /// Standalone XML of the metadata payload element.
    #[must_use]
    pub fn payload_xml(&self) -> &str {
        &self.payload
    }
}

/// Validate the OAI-PMH envelope and surface an OAI `<error>` if present.
fn envelope<'a, 'input>(
    doc: &'a Document<'input>,
    verb: &str,
    ns: &NamespaceTable,
) -> Result<Node<'a, 'input>> {
    let oai = ns.uri("oai")?;
    let root = doc.root_element();

    if !root.has_tag_name((oai, "OAI-PMH")) {
        return Err(PackagerError::MissingElement {
            element: "oai:OAI-PMH".to_string(),
            context: format!("{verb} response (root is <{}>)", get_tag_name(root)),
        });
    }

    if let Some(error) = root
        .children()
        .find(|n| n.is_element() && n.has_tag_name((oai, "error")))
    {
        let code = error.attribute("code").unwrap_or("unknown").to_string();
        let message = error
            .text()
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        tracing::warn!(verb, code = %code, message = %message, "OAI-PMH error response");
        return Err(PackagerError::OaiError {
            verb: verb.to_string(),
            code,
            message,
        });
    }

    Ok(root)
}

/// Parse an `Identify` response.
///
/// Looks through every `<description>` for an `oai-identifier` block;
/// `repositoryIdentifier` and `delimiter` are required.
pub fn parse_identify(xml: &str, ns: &NamespaceTable) -> Result<IdentifyResponse> {
    let oai = ns.uri("oai")?;
    let oai_id = ns.uri("oai_id")?;
    let context = "Identify response";

    let doc = Document::parse(xml)?;
    let root = envelope(&doc, "Identify", ns)?;
    let identify = require_child(root, oai, "Identify", "oai:Identify", context)?;

    let identifier = element_children(identify)
        .filter(|n| n.has_tag_name((oai, "description")))
        .find_map(|description| {
            element_children(description).find(|n| n.has_tag_name((oai_id, "oai-identifier")))
        })
        .ok_or_else(|| PackagerError::MissingElement {
            element: "oai_id:oai-identifier".to_string(),
            context: context.to_string(),
        })?;

    let repository_identifier = child_text(identifier, oai_id, "repositoryIdentifier")
        .ok_or_else(|| PackagerError::MissingElement {
            element: "oai_id:repositoryIdentifier".to_string(),
            context: context.to_string(),
        })?;
    let delimiter = child_text(identifier, oai_id, "delimiter").ok_or_else(|| {
        PackagerError::MissingElement {
            element: "oai_id:delimiter".to_string(),
            context: context.to_string(),
        }
    })?;
    let sample_identifier = child_text(identifier, oai_id, "sampleIdentifier");

    Ok(IdentifyResponse {
        repository_identifier,
        delimiter,
        sample_identifier,
    })
}

/// Parse a `GetRecord` response and lift out its metadata payload.
///
/// A response without `GetRecord/record/metadata/*` (for example a deleted
/// record) is a [`PackagerError::MissingElement`].
pub fn parse_get_record(
    xml: &str,
    identifier: &str,
    metadata_prefix: &str,
    ns: &NamespaceTable,
) -> Result<RecordDocument> {
    let oai = ns.uri("oai")?;
    let context = format!("GetRecord response for {identifier} ({metadata_prefix})");

    let doc = Document::parse(xml)?;
    let root = envelope(&doc, "GetRecord", ns)?;
    let get_record = require_child(root, oai, "GetRecord", "oai:GetRecord", &context)?;
    let record = require_child(get_record, oai, "record", "oai:record", &context)?;
    let metadata = require_child(record, oai, "metadata", "oai:metadata", &context)?;
    let payload = element_children(metadata)
        .next()
        .ok_or_else(|| PackagerError::MissingElement {
            element: "metadata payload".to_string(),
            context: context.clone(),
        })?;

    Ok(RecordDocument {
        identifier: identifier.to_string(),
        metadata_prefix: metadata_prefix.to_string(),
        payload: serialize_element(payload),
    })
}
