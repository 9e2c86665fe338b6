//! Configuration constants, validation functions, and the packager configuration.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{PackagerError, Result};
use crate::exceptions::RepositoryExceptions;

/// Path of the OAI-PMH endpoint relative to a repository base URL.
pub const OAI_REQUEST_PATH: &str = "/oai/request";

/// HTTP timeout in seconds, applied to every request.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default directory for generated archives.
pub const DEFAULT_OUTPUT_DIR: &str = "./tmp";

/// Native metadata prefix requested for descriptive metadata.
pub const DIM_METADATA_PREFIX: &str = "dim";

/// Metadata prefix requested for the ORE resource map.
pub const ORE_METADATA_PREFIX: &str = "ore";

/// Delimiter assumed when a repository identifier comes from an override.
pub const DEFAULT_DELIMITER: &str = ":";

/// Validate and normalise a repository base URL.
///
/// Trailing slashes are removed so that `{base}/oai/request` never contains
/// a double slash.
///
/// # Examples
/// ```
/// use dc_ore_packager::config::validate_base_url;
///
/// assert_eq!(validate_base_url("https://repo.example/").unwrap(), "https://repo.example");
/// assert!(validate_base_url("repo.example").is_err());
/// assert!(validate_base_url("ftp://repo.example").is_err());
/// ```
pub fn validate_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');

    let parsed = Url::parse(trimmed).map_err(|e| PackagerError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(PackagerError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            })
        }
    }

    if parsed.host_str().is_none() {
        return Err(PackagerError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(trimmed.to_string())
}

/// Build the OAI-PMH endpoint URL for a (validated) base URL.
///
/// # Examples
/// ```
/// use dc_ore_packager::config::oai_request_url;
///
/// assert_eq!(oai_request_url("https://repo.example"), "https://repo.example/oai/request");
/// ```
pub fn oai_request_url(base_url: &str) -> String {
    format!("{}{OAI_REQUEST_PATH}", base_url.trim_end_matches('/'))
}

/// Generate a fresh archive file name inside `output_dir`.
pub fn generated_output_file(output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}.zip", uuid::Uuid::new_v4()))
}

/// Everything the packager needs to know about one target repository.
#[derive(Debug, Clone)]
pub struct PackagerConfig {
    /// Repository base URL, normalised without trailing slash.
    pub base_url: String,
    /// Verify TLS certificates (default: true).
    pub verify_tls: bool,
    /// Rewrite handle prefixes with the repository's own handle prefix.
    pub use_id_prefix: bool,
    /// Per-repository overrides.
    pub exceptions: RepositoryExceptions,
    /// Directory for generated archive names.
    pub output_dir: PathBuf,
    /// Explicit archive path; generated inside `output_dir` when absent.
    pub output_file: Option<PathBuf>,
}

impl PackagerConfig {
    /// Create a configuration for `base_url` with default settings.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            verify_tls: true,
            use_id_prefix: false,
            exceptions: RepositoryExceptions::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: None,
        })
    }

    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn with_use_id_prefix(mut self, use_id_prefix: bool) -> Self {
        self.use_id_prefix = use_id_prefix;
        self
    }

    pub fn with_exceptions(mut self, exceptions: RepositoryExceptions) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_output_file(mut self, output_file: impl Into<PathBuf>) -> Self {
        self.output_file = Some(output_file.into());
        self
    }

    /// OAI-PMH endpoint for this repository.
    #[must_use]
    pub fn oai_request_url(&self) -> String {
        oai_request_url(&self.base_url)
    }

    /// Whether handle prefixes should be rewritten, by flag or by exception.
    #[must_use]
    pub fn effective_use_id_prefix(&self) -> bool {
        self.use_id_prefix || self.exceptions.use_id_prefix(&self.base_url)
    }

    /// Resolve the archive path: the explicit file, or a generated name.
    pub fn resolve_output_file(&self) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| generated_output_file(&self.output_dir))
    }
}
