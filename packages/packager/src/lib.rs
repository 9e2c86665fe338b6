//! DC-ORE Packager - Repackage DSpace items as Simple Archive Format zips.
//!
//! This crate harvests items from a DSpace repository over OAI-PMH, converts
//! their native DIM metadata to Dublin Core, and bundles each item with its
//! ORE resource map into a single Simple Archive Format (SAF) zip.
//!
//! # Example
//!
//! ```
//! use dc_ore_packager::config;
//!
//! // Base URLs are normalised before use
//! assert_eq!(
//!     config::validate_base_url("https://demo.dspace.org/").unwrap(),
//!     "https://demo.dspace.org"
//! );
//! assert!(config::validate_base_url("ftp://demo.dspace.org").is_err());
//! ```
//!
//! # Architecture
//!
//! The packager is organized into several modules:
//!
//! - [`config`]: Configuration constants, validation and [`PackagerConfig`]
//! - [`exceptions`]: Per-repository overrides loaded from YAML
//! - [`error`]: Error types and Result alias
//! - [`http`]: Blocking HTTP client setup
//! - [`oai`]: OAI-PMH client, namespaces and response parsing
//! - [`resolver`]: Repository identifier resolution and OAI identifiers
//! - [`dim`]: DIM records and conversion to Dublin Core
//! - [`saf`]: Simple Archive Format item rendering
//! - [`xml`]: XML utilities
//! - [`packager`]: Archive assembly
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod dim;
pub mod error;
pub mod exceptions;
pub mod http;
pub mod oai;
pub mod packager;
pub mod resolver;
pub mod saf;
pub mod xml;

// Re-export the main entry point
pub use packager::Packager;

// Re-export commonly used items
pub use config::{validate_base_url, PackagerConfig};
pub use dim::{convert, DcDescriptor, NativeField, NativeMetadataRecord};
pub use error::{ErrorKind, PackagerError, Result};
pub use exceptions::{RepositoryException, RepositoryExceptions};
pub use oai::OaiClient;
pub use resolver::{OaiIdentifier, RepositoryIdentifier};
pub use saf::ArchiveItem;
