//! OAI-PMH protocol support: namespace table, response parsing, and client.

pub mod client;
pub mod namespaces;
pub mod response;

pub use client::{IdentifySource, OaiClient};
pub use namespaces::NamespaceTable;
pub use response::{parse_get_record, parse_identify, IdentifyResponse, RecordDocument};
