//! Blocking OAI-PMH client.

use reqwest::blocking::Client;

use crate::config::oai_request_url;
use crate::error::Result;
use crate::http::{create_client, get_text};
use crate::oai::namespaces::NamespaceTable;
use crate::oai::response::{parse_get_record, parse_identify, IdentifyResponse, RecordDocument};

/// Anything that can answer an OAI-PMH `Identify`.
///
/// Identifier resolution only needs this verb, so it is kept behind a trait
/// that tests can implement without a server.
pub trait IdentifySource {
    /// Issue `Identify` and return the repository identifier fields.
    fn identify(&self) -> Result<IdentifyResponse>;
}

/// Client for one repository's OAI-PMH endpoint.
///
/// Performs no retries; a failed request is returned to the caller as is.
#[derive(Debug, Clone)]
pub struct OaiClient {
    client: Client,
    endpoint: String,
    namespaces: NamespaceTable,
}

impl OaiClient {
    /// Create a client for the repository at `base_url`.
    pub fn new(base_url: &str, verify_tls: bool) -> Result<Self> {
        Ok(Self {
            client: create_client(verify_tls)?,
            endpoint: oai_request_url(base_url),
            namespaces: NamespaceTable::standard(),
        })
    }

    /// Replace the namespace table used for parsing responses.
    #[must_use]
    pub fn with_namespaces(mut self, namespaces: NamespaceTable) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// The `{base}/oai/request` endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// Issue `GetRecord` and return the record's metadata payload.
    pub fn get_record(&self, metadata_prefix: &str, identifier: &str) -> Result<RecordDocument> {
        let body = get_text(
            &self.client,
            &self.endpoint,
            &[
                ("verb", "GetRecord"),
                ("metadataPrefix", metadata_prefix),
                ("identifier", identifier),
            ],
        )?;
        let record = parse_get_record(&body, identifier, metadata_prefix, &self.namespaces)?;
        tracing::debug!(identifier, metadata_prefix, "Fetched record");
        Ok(record)
    }
}

impl IdentifySource for OaiClient {
    fn identify(&self) -> Result<IdentifyResponse> {
        let body = get_text(&self.client, &self.endpoint, &[("verb", "Identify")])?;
        let response = parse_identify(&body, &self.namespaces)?;
        tracing::debug!(
            repository_identifier = %response.repository_identifier,
            delimiter = %response.delimiter,
            "Repository identified"
        );
        Ok(response)
    }
}
