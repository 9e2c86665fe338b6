//! Namespace table used when reading OAI-PMH responses.
//!
//! The table is an ordinary value handed to each parser call site; nothing is
//! registered process-wide.

use crate::error::{PackagerError, Result};

/// OAI-PMH envelope.
pub const OAI: &str = "http://www.openarchives.org/OAI/2.0/";
/// Simple Dublin Core in OAI-PMH.
pub const OAI_DC: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";
/// OAI identifier description inside `Identify`.
pub const OAI_IDENTIFIER: &str = "http://www.openarchives.org/OAI/2.0/oai-identifier";
/// Atom, used for ORE resource maps.
pub const ATOM: &str = "http://www.w3.org/2005/Atom";
/// ORE Atom serialization extensions.
pub const ORE_ATOM: &str = "http://www.openarchives.org/ore/atom/";
/// DSpace qualified Dublin Core.
pub const QDC: &str = "http://dspace.org/qualifieddc/";
/// XOAI.
pub const XOAI: &str = "http://www.lyncode.com/xoai";
/// Dublin Core terms.
pub const DCTERMS: &str = "http://purl.org/dc/terms/";
/// DSpace intermediate metadata (DIM).
pub const DIM: &str = "http://www.dspace.org/xmlns/dspace/dim";

/// Prefix-to-URI table for the namespaces this crate understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl NamespaceTable {
    /// Table with the OAI-PMH, identifier, Atom/ORE, DIM and DC namespaces.
    #[must_use]
    pub fn standard() -> Self {
        let entries = [
            ("oai", OAI),
            ("oai_dc", OAI_DC),
            ("atom", ATOM),
            ("oai_id", OAI_IDENTIFIER),
            ("qdc", QDC),
            ("xoai", XOAI),
            ("dcterms", DCTERMS),
            ("dim", DIM),
            ("oreatom", ORE_ATOM),
        ]
        .into_iter()
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect();
        Self { entries }
    }

    /// Empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace a prefix binding.
    #[must_use]
    pub fn with(mut self, prefix: &str, uri: &str) -> Self {
        self.entries.retain(|(p, _)| p != prefix);
        self.entries.push((prefix.to_string(), uri.to_string()));
        self
    }

    /// URI bound to `prefix`, if any.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// URI bound to `prefix`, or an error if the table does not know it.
    pub fn uri(&self, prefix: &str) -> Result<&str> {
        self.get(prefix)
            .ok_or_else(|| PackagerError::UnknownNamespacePrefix(prefix.to_string()))
    }

    /// Iterate over `(prefix, uri)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}
