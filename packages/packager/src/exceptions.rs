//! Per-repository exceptions.
//!
//! Some repositories have a broken or slow `Identify` verb, or publish items
//! under a handle prefix different from the one operators know them by. The
//! exception table, keyed by repository base URL, lets an operator supply the
//! OAI repository identifier directly and/or force handle-prefix rewriting.
//!
//! ```yaml
//! "https://repo.example":
//!   id: repo.example
//! "https://other.example":
//!   use_id_prefix: true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Overrides for a single repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryException {
    /// Repository identifier to use instead of calling `Identify`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Rewrite item handles with the repository's handle prefix.
    #[serde(default)]
    pub use_id_prefix: bool,
}

/// Exception table keyed by repository base URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryExceptions {
    entries: BTreeMap<String, RepositoryException>,
}

fn key(base_url: &str) -> &str {
    base_url.trim().trim_end_matches('/')
}

impl RepositoryExceptions {
    /// Parse an exception table from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let parsed: BTreeMap<String, RepositoryException> = serde_yaml_ng::from_str(yaml)?;
        Ok(parsed
            .into_iter()
            .fold(Self::default(), |mut table, (url, exception)| {
                table.insert(&url, exception);
                table
            }))
    }

    /// Load an exception table from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Add or replace the exception for `base_url`.
    pub fn insert(&mut self, base_url: &str, exception: RepositoryException) {
        self.entries.insert(key(base_url).to_string(), exception);
    }

    /// Exception registered for `base_url`, if any.
    #[must_use]
    pub fn get(&self, base_url: &str) -> Option<&RepositoryException> {
        self.entries.get(key(base_url))
    }

    /// Repository identifier override for `base_url`.
    #[must_use]
    pub fn identifier_override(&self, base_url: &str) -> Option<&str> {
        self.get(base_url).and_then(|e| e.id.as_deref())
    }

    /// Whether `base_url` forces handle-prefix rewriting.
    #[must_use]
    pub fn use_id_prefix(&self, base_url: &str) -> bool {
        self.get(base_url).is_some_and(|e| e.use_id_prefix)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
