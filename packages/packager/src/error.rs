//! Error types for the packager.
//!
//! `PackagerError` carries detailed context for library consumers, and
//! [`ErrorKind`] collapses it onto the coarse failure classes callers act on
//! (protocol, parse, schema violation, storage, configuration).

use thiserror::Error;

/// Coarse classification of a [`PackagerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, non-success HTTP status, or an unexpected OAI-PMH response.
    Protocol,
    /// Response body is not well-formed XML.
    Parse,
    /// A `dc` field without an `element` attribute.
    SchemaViolation,
    /// The output container or one of its entries could not be written.
    Storage,
    /// Invalid operator input (base URL, handle list, exceptions file).
    Config,
}

/// Main error type for the packager library.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// Base URL is not an absolute http(s) URL.
    #[error("Invalid base URL: '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// No handles were given to package.
    #[error("At least one item handle is required")]
    NoHandles,

    /// A handle is empty once surrounding `/` are stripped.
    #[error("Item handle #{number} ('{raw}') is empty")]
    EmptyHandle { number: usize, raw: String },

    /// Item index outside the configured handle list.
    #[error("Item #{number} requested, but only {count} items are configured")]
    ItemOutOfRange { number: usize, count: usize },

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Repository answered with a non-success status code.
    #[error("OAI-PMH {verb} request to {url} returned HTTP {status}")]
    HttpStatus {
        verb: String,
        url: String,
        status: u16,
    },

    /// Repository answered with an OAI-PMH `<error>` element.
    #[error("OAI-PMH {verb} failed with {code}: {message}")]
    OaiError {
        verb: String,
        code: String,
        message: String,
    },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Response body is not valid UTF-8.
    #[error("{context} response is not valid UTF-8 (invalid byte at offset {valid_up_to})")]
    InvalidEncoding { context: String, valid_up_to: usize },

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// A namespace prefix was requested that the namespace table does not know.
    #[error("Unknown namespace prefix: '{0}'")]
    UnknownNamespacePrefix(String),

    /// A `dc` metadata field is missing its `element` attribute.
    #[error("Metadata field #{position} of {identifier} has schema 'dc' but no element attribute")]
    SchemaViolation { identifier: String, position: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container error.
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Repository exceptions file could not be parsed.
    #[error("Invalid repository exceptions file: {0}")]
    ExceptionsFile(#[from] serde_yaml_ng::Error),
}

impl PackagerError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_)
            | Self::HttpStatus { .. }
            | Self::OaiError { .. }
            | Self::MissingElement { .. }
            | Self::UnknownNamespacePrefix(_) => ErrorKind::Protocol,
            Self::XmlParse(_) | Self::InvalidEncoding { .. } => ErrorKind::Parse,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::Io(_) | Self::Zip(_) => ErrorKind::Storage,
            Self::InvalidBaseUrl { .. }
            | Self::NoHandles
            | Self::EmptyHandle { .. }
            | Self::ItemOutOfRange { .. }
            | Self::ExceptionsFile(_) => ErrorKind::Config,
        }
    }

    /// True for failures that should be treated as protocol errors.
    ///
    /// Parse errors propagate exactly like protocol errors.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(self.kind(), ErrorKind::Protocol | ErrorKind::Parse)
    }
}

/// Result type alias for packager operations.
pub type Result<T> = std::result::Result<T, PackagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PackagerError::OaiError {
            verb: "GetRecord".to_string(),
            code: "idDoesNotExist".to_string(),
            message: "No matching identifier".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "OAI-PMH GetRecord failed with idDoesNotExist: No matching identifier"
        );
    }

    #[test]
    fn test_schema_violation_display() {
        let err = PackagerError::SchemaViolation {
            identifier: "oai:example.repo:10673/7".to_string(),
            position: 3,
        };
        assert!(err.to_string().contains("oai:example.repo:10673/7"));
        assert!(err.to_string().contains("#3"));
    }

    #[test]
    fn test_kind_classification() {
        let missing = PackagerError::MissingElement {
            element: "oai:GetRecord".to_string(),
            context: "OAI-PMH response".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::Protocol);
        assert!(missing.is_protocol());

        let parse = roxmltree::Document::parse("<unclosed>").unwrap_err();
        let parse = PackagerError::from(parse);
        assert_eq!(parse.kind(), ErrorKind::Parse);
        assert!(parse.is_protocol());

        let io = PackagerError::from(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), ErrorKind::Storage);
        assert!(!io.is_protocol());

        assert_eq!(PackagerError::NoHandles.kind(), ErrorKind::Config);

        let encoding = PackagerError::InvalidEncoding {
            context: "GetRecord".to_string(),
            valid_up_to: 12,
        };
        assert_eq!(encoding.kind(), ErrorKind::Parse);
        assert!(encoding.is_protocol());

        let empty = PackagerError::EmptyHandle {
            number: 1,
            raw: "/".to_string(),
        };
        assert_eq!(empty.kind(), ErrorKind::Config);
    }
}
