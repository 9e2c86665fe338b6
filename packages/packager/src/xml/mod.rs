//! XML helpers: namespace-aware navigation and subtree serialization.

mod utils;
mod writer;

pub use utils::{child_text, element_children, find_child, get_tag_name, require_child};
pub use writer::{escape_attr, escape_text, serialize_element, XML_DECLARATION};
