//! XML utility functions for navigating namespaced DOM trees.
//!
//! All lookups match on the expanded name (namespace URI + local name), so an
//! element in the wrong namespace is treated as missing.

use roxmltree::Node;

use crate::error::{PackagerError, Result};

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use dc_ore_packager::xml::get_tag_name;
///
/// let xml = r#"<oai:record xmlns:oai="http://www.openarchives.org/OAI/2.0/"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "record");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given namespace and local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use dc_ore_packager::xml::find_child;
///
/// let ns = "http://www.openarchives.org/OAI/2.0/";
/// let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><Identify/></OAI-PMH>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert!(find_child(doc.root_element(), ns, "Identify").is_some());
/// assert!(find_child(doc.root_element(), "urn:other", "Identify").is_none());
/// ```
pub fn find_child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name((namespace, name)))
}

/// Like [`find_child`], but a missing element is an error.
///
/// `display_name` is the prefixed name used in the error message
/// (e.g. `oai:GetRecord`).
pub fn require_child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
    display_name: &str,
    context: &str,
) -> Result<Node<'a, 'input>> {
    find_child(node, namespace, name).ok_or_else(|| PackagerError::MissingElement {
        element: display_name.to_string(),
        context: context.to_string(),
    })
}

/// Trimmed text of the named child element, if present and non-empty.
pub fn child_text(node: Node<'_, '_>, namespace: &str, name: &str) -> Option<String> {
    find_child(node, namespace, name)
        .and_then(|child| child.text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const NS: &str = "http://www.openarchives.org/OAI/2.0/";

    #[test]
    fn test_find_child_prefixed_and_default_namespace() {
        let prefixed = r#"<oai:root xmlns:oai="http://www.openarchives.org/OAI/2.0/"><oai:a/></oai:root>"#;
        let default = r#"<root xmlns="http://www.openarchives.org/OAI/2.0/"><a/></root>"#;

        for xml in [prefixed, default] {
            let doc = Document::parse(xml).unwrap();
            assert!(find_child(doc.root_element(), NS, "a").is_some());
        }
    }

    #[test]
    fn test_find_child_wrong_namespace() {
        let xml = r#"<root><a/></root>"#;
        let doc = Document::parse(xml).unwrap();
        assert!(find_child(doc.root_element(), NS, "a").is_none());
    }

    #[test]
    fn test_require_child_error() {
        let xml = r#"<root xmlns="http://www.openarchives.org/OAI/2.0/"/>"#;
        let doc = Document::parse(xml).unwrap();

        let err = require_child(doc.root_element(), NS, "GetRecord", "oai:GetRecord", "response")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required XML element: oai:GetRecord in response"
        );
    }

    #[test]
    fn test_child_text() {
        let xml = r#"<root xmlns="http://www.openarchives.org/OAI/2.0/"><a>  value </a><b>  </b></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        assert_eq!(child_text(root, NS, "a"), Some("value".to_string()));
        assert_eq!(child_text(root, NS, "b"), None);
        assert_eq!(child_text(root, NS, "c"), None);
    }

    #[test]
    fn test_element_children() {
        let xml = r#"<root>text<child1/>more<!-- note --><child2/></root>"#;
        let doc = Document::parse(xml).unwrap();

        let children: Vec<_> = element_children(doc.root_element()).collect();
        assert_eq!(children.len(), 2);
    }
}
