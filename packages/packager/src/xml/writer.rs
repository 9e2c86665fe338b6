//! Serialization of roxmltree subtrees back to XML text.
//!
//! roxmltree is read-only, so payloads lifted out of an OAI-PMH envelope are
//! written back out here. The root of the written subtree declares every
//! in-scope namespace that the subtree actually uses, which makes the output a
//! standalone document even when the declarations lived on an ancestor.

use std::collections::BTreeSet;

use roxmltree::{Node, NodeType};

/// XML declaration written at the top of generated documents.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Escape character data.
///
/// # Examples
/// ```
/// use dc_ore_packager::xml::escape_text;
///
/// assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
/// ```
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value (double-quoted).
pub fn escape_attr(s: &str) -> String {
    escape_text(s)
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}

/// Serialize an element and its descendants as a standalone fragment.
pub fn serialize_element(node: Node<'_, '_>) -> String {
    let used = used_namespaces(node);
    let mut out = String::new();
    write_node(&mut out, node, None, &used);
    out
}

/// Namespace URIs referenced by elements or attributes in the subtree.
fn used_namespaces(node: Node<'_, '_>) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    for n in node.descendants().filter(|n| n.is_element()) {
        if let Some(uri) = n.tag_name().namespace() {
            used.insert(uri.to_string());
        }
        for attr in n.attributes() {
            if let Some(uri) = attr.namespace() {
                used.insert(uri.to_string());
            }
        }
    }
    used
}

fn write_node(
    out: &mut String,
    node: Node<'_, '_>,
    parent: Option<Node<'_, '_>>,
    used: &BTreeSet<String>,
) {
    match node.node_type() {
        NodeType::Element => write_element(out, node, parent, used),
        NodeType::Text => out.push_str(&escape_text(node.text().unwrap_or_default())),
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(node.text().unwrap_or_default());
            out.push_str("-->");
        }
        NodeType::Root | NodeType::PI => {}
    }
}

fn write_element(
    out: &mut String,
    node: Node<'_, '_>,
    parent: Option<Node<'_, '_>>,
    used: &BTreeSet<String>,
) {
    let tag = node.tag_name();
    let name = qualified_name(node, tag.namespace(), tag.name(), false);

    out.push('<');
    out.push_str(&name);

    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE {
            continue;
        }
        let declare = match parent {
            None => used.contains(ns.uri()),
            Some(p) => !p
                .namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri()),
        };
        if !declare {
            continue;
        }
        match ns.name() {
            Some(prefix) => {
                out.push_str(" xmlns:");
                out.push_str(prefix);
            }
            None => out.push_str(" xmlns"),
        }
        out.push_str("=\"");
        out.push_str(&escape_attr(ns.uri()));
        out.push('"');
    }

    for attr in node.attributes() {
        out.push(' ');
        out.push_str(&qualified_name(node, attr.namespace(), attr.name(), true));
        out.push_str("=\"");
        out.push_str(&escape_attr(attr.value()));
        out.push('"');
    }

    if !node.has_children() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in node.children() {
        write_node(out, child, Some(node), used);
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

/// Prefixed name for an element or attribute, using the prefixes in scope.
fn qualified_name(
    node: Node<'_, '_>,
    namespace: Option<&str>,
    local: &str,
    is_attribute: bool,
) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };
    if uri == XML_NAMESPACE {
        return format!("xml:{local}");
    }
    // Unprefixed attributes never take the default namespace.
    if !is_attribute
        && node
            .namespaces()
            .any(|ns| ns.name().is_none() && ns.uri() == uri)
    {
        return local.to_string();
    }
    match node
        .namespaces()
        .find(|ns| ns.name().is_some() && ns.uri() == uri)
        .and_then(|ns| ns.name())
    {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"say "hi" & <bye>"#), "say &quot;hi&quot; &amp; &lt;bye&gt;");
    }

    #[test]
    fn test_serialize_self_contained_element() {
        let xml = r#"<atom:entry xmlns:atom="http://www.w3.org/2005/Atom"><atom:id>urn:x</atom:id><atom:link rel="alternate" href="http://x/1"/></atom:entry>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(serialize_element(doc.root_element()), xml);
    }

    #[test]
    fn test_serialize_carries_inherited_namespaces() {
        let xml = r#"<wrapper xmlns:atom="http://www.w3.org/2005/Atom" xmlns:dcterms="http://purl.org/dc/terms/"><atom:entry><dcterms:title>T</dcterms:title></atom:entry></wrapper>"#;
        let doc = Document::parse(xml).unwrap();
        let entry = doc.root_element().first_element_child().unwrap();

        let out = serialize_element(entry);
        assert!(out.starts_with("<atom:entry"));
        assert!(out.contains(r#"xmlns:atom="http://www.w3.org/2005/Atom""#));
        assert!(out.contains(r#"xmlns:dcterms="http://purl.org/dc/terms/""#));
        assert!(out.ends_with("<dcterms:title>T</dcterms:title></atom:entry>"));

        // Output must stand on its own.
        let reparsed = Document::parse(&out).unwrap();
        assert!(reparsed
            .root_element()
            .has_tag_name(("http://www.w3.org/2005/Atom", "entry")));
    }

    #[test]
    fn test_serialize_skips_unused_ancestor_namespaces() {
        let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><metadata><dim:dim xmlns:dim="urn:dim"><dim:field/></dim:dim></metadata></OAI-PMH>"#;
        let doc = Document::parse(xml).unwrap();
        let dim = doc
            .descendants()
            .find(|n| n.has_tag_name(("urn:dim", "dim")))
            .unwrap();

        assert_eq!(
            serialize_element(dim),
            r#"<dim:dim xmlns:dim="urn:dim"><dim:field/></dim:dim>"#
        );
    }

    #[test]
    fn test_serialize_default_namespace_and_escaping() {
        let xml = r#"<r xmlns="urn:a"><v k="a&amp;b">1 &lt; 2</v></r>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(serialize_element(doc.root_element()), xml);
    }

    #[test]
    fn test_serialize_xml_lang() {
        let xml = r#"<r><t xml:lang="en">x</t></r>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(serialize_element(doc.root_element()), xml);
    }
}
