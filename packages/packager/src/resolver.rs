//! Repository identifier resolution and OAI item identifier composition.
//!
//! An OAI item identifier has the form
//! `oai{delimiter}{repositoryIdentifier}{delimiter}{handle}`, e.g.
//! `oai:demo.dspace.org:10673/7`.

use std::fmt;

use crate::config::DEFAULT_DELIMITER;
use crate::error::Result;
use crate::exceptions::RepositoryExceptions;
use crate::oai::{IdentifyResponse, IdentifySource};

/// Scheme component that starts every OAI identifier.
const OAI_SCHEME: &str = "oai";

/// The repository part of OAI identifiers, resolved once per repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentifier {
    pub id: String,
    pub delimiter: String,
    pub sample_identifier: Option<String>,
    /// Handle prefix the repository mints under, taken from the sample identifier.
    pub handle_prefix: Option<String>,
}

impl RepositoryIdentifier {
    /// Identifier supplied by an operator override: default delimiter,
    /// no sample, no handle prefix.
    #[must_use]
    pub fn from_override(id: &str) -> Self {
        Self {
            id: id.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            sample_identifier: None,
            handle_prefix: None,
        }
    }

    /// Identifier taken from an `Identify` response.
    #[must_use]
    pub fn from_identify(response: IdentifyResponse) -> Self {
        let handle_prefix = response
            .sample_identifier
            .as_deref()
            .and_then(|sample| derive_handle_prefix(sample, &response.delimiter));
        Self {
            id: response.repository_identifier,
            delimiter: response.delimiter,
            sample_identifier: response.sample_identifier,
            handle_prefix,
        }
    }

    /// Normalise a raw handle for this repository.
    ///
    /// Leading and trailing `/` are stripped. With `use_id_prefix` set and a
    /// known handle prefix, the handle's own prefix is replaced by the
    /// repository's. A handle that is empty after stripping stays empty.
    #[must_use]
    pub fn normalize_handle(&self, raw: &str, use_id_prefix: bool) -> String {
        let handle = raw.trim_matches('/');
        match (&self.handle_prefix, use_id_prefix) {
            (Some(prefix), true) if !handle.is_empty() => {
                let suffix = handle.split_once('/').map_or(handle, |(_, suffix)| suffix);
                format!("{prefix}/{suffix}")
            }
            _ => handle.to_string(),
        }
    }

    /// Compose the OAI identifier for an already-normalised handle.
    #[must_use]
    pub fn compose(&self, handle: &str) -> OaiIdentifier {
        compose(self, handle)
    }
}

/// Derive the handle prefix from a sample identifier.
///
/// Takes the last delimiter-separated segment and keeps the part before its
/// first `/`.
///
/// # Examples
/// ```
/// use dc_ore_packager::resolver::derive_handle_prefix;
///
/// assert_eq!(
///     derive_handle_prefix("oai:demo.dspace.org:123456789/1", ":"),
///     Some("123456789".to_string())
/// );
/// ```
pub fn derive_handle_prefix(sample_identifier: &str, delimiter: &str) -> Option<String> {
    if delimiter.is_empty() {
        return None;
    }
    sample_identifier
        .rsplit(delimiter)
        .next()
        .and_then(|last| last.split('/').next())
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}

/// Resolve the repository identifier for `base_url`.
///
/// An identifier override in `exceptions` wins and no request is made.
/// Otherwise `Identify` is issued; its failure is returned as is, and no
/// default identifier is ever assumed.
pub fn resolve(
    source: &impl IdentifySource,
    base_url: &str,
    exceptions: &RepositoryExceptions,
) -> Result<RepositoryIdentifier> {
    if let Some(id) = exceptions.identifier_override(base_url) {
        tracing::info!(base_url, id, "Using repository identifier override");
        return Ok(RepositoryIdentifier::from_override(id));
    }

    let identifier = RepositoryIdentifier::from_identify(source.identify()?);
    tracing::info!(
        base_url,
        id = %identifier.id,
        delimiter = %identifier.delimiter,
        handle_prefix = ?identifier.handle_prefix,
        "Resolved repository identifier"
    );
    Ok(identifier)
}

/// Full OAI identifier of one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OaiIdentifier(String);

impl OaiIdentifier {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split an identifier back into `(repository id, handle)`.
    ///
    /// Only unambiguous when the delimiter occurs in neither part's prefix;
    /// the handle is everything after the second delimiter.
    #[must_use]
    pub fn parse<'a>(value: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
        if delimiter.is_empty() {
            return None;
        }
        value
            .strip_prefix(OAI_SCHEME)?
            .strip_prefix(delimiter)?
            .split_once(delimiter)
    }
}

impl fmt::Display for OaiIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OaiIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compose `oai{d}{repository id}{d}{handle}`. Pure string concatenation.
#[must_use]
pub fn compose(repository: &RepositoryIdentifier, handle: &str) -> OaiIdentifier {
    let d = &repository.delimiter;
    OaiIdentifier(format!("{OAI_SCHEME}{d}{}{d}{handle}", repository.id))
}
