//! DSpace Simple Archive Format (SAF) item rendering.
//!
//! Each item directory holds three files:
//!
//! - `dublin_core.xml`: `<dublin_core schema="dc">` with one `<dcvalue>` per descriptor
//! - `ORE.xml`: the item's ORE resource map (an Atom entry)
//! - `contents`: the bundle manifest, declaring `ORE.xml` as member of bundle `ORE`

use roxmltree::Document;

use crate::dim::{DcDescriptor, DC_SCHEMA};
use crate::error::{PackagerError, Result};
use crate::oai::{NamespaceTable, RecordDocument};
use crate::xml::{escape_attr, escape_text, XML_DECLARATION};

/// Name of the Dublin Core metadata file.
pub const DUBLIN_CORE_FILE: &str = "dublin_core.xml";

/// Name of the resource map file.
pub const ORE_FILE: &str = "ORE.xml";

/// Name of the content manifest file.
pub const CONTENTS_FILE: &str = "contents";

/// Manifest content: `ORE.xml` in bundle `ORE`, no trailing newline.
pub const CONTENTS_MANIFEST: &str = "ORE.xml\tbundle:ORE";

/// Render descriptors as a DSpace `dublin_core.xml` document.
///
/// `qualifier` and `language` attributes are omitted when absent.
///
/// # Examples
/// ```
/// use dc_ore_packager::dim::DcDescriptor;
/// use dc_ore_packager::saf::render_dublin_core;
///
/// let xml = render_dublin_core(&[DcDescriptor {
///     element: "title".to_string(),
///     qualifier: None,
///     language: Some("en".to_string()),
///     text: "Example".to_string(),
/// }]);
/// assert!(xml.contains(r#"<dcvalue element="title" language="en">Example</dcvalue>"#));
/// ```
pub fn render_dublin_core(descriptors: &[DcDescriptor]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!("<dublin_core schema=\"{DC_SCHEMA}\">\n"));

    for d in descriptors {
        xml.push_str("  <dcvalue element=\"");
        xml.push_str(&escape_attr(&d.element));
        xml.push('"');
        if let Some(q) = &d.qualifier {
            xml.push_str(" qualifier=\"");
            xml.push_str(&escape_attr(q));
            xml.push('"');
        }
        if let Some(lang) = &d.language {
            xml.push_str(" language=\"");
            xml.push_str(&escape_attr(lang));
            xml.push('"');
        }
        xml.push('>');
        xml.push_str(&escape_text(&d.text));
        xml.push_str("</dcvalue>\n");
    }

    xml.push_str("</dublin_core>\n");
    xml
}

/// An item's ORE resource map, passed through as fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMap {
    xml: String,
}

impl ResourceMap {
    /// Take the `atom:entry` payload of an `ore` record.
    pub fn from_record(record: &RecordDocument, ns: &NamespaceTable) -> Result<Self> {
        let atom = ns.uri("atom")?;
        let doc = Document::parse(record.payload_xml())?;

        if !doc.root_element().has_tag_name((atom, "entry")) {
            return Err(PackagerError::MissingElement {
                element: "atom:entry".to_string(),
                context: format!("ORE record of {}", record.identifier),
            });
        }

        Ok(Self {
            xml: record.payload_xml().to_string(),
        })
    }

    /// Resource map document text (UTF-8).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.xml
    }
}

/// One packaged item: descriptors, resource map, and the fixed manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveItem {
    pub descriptors: Vec<DcDescriptor>,
    pub resource_map: ResourceMap,
}

impl ArchiveItem {
    /// Content of the item's `dublin_core.xml`.
    #[must_use]
    pub fn dublin_core_xml(&self) -> String {
        render_dublin_core(&self.descriptors)
    }

    /// Content of the item's `ORE.xml`.
    #[must_use]
    pub fn ore_xml(&self) -> &str {
        self.resource_map.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oai::parse_get_record;
    use pretty_assertions::assert_eq;

    fn descriptor(element: &str, qualifier: Option<&str>, text: &str) -> DcDescriptor {
        DcDescriptor {
            element: element.to_string(),
            qualifier: qualifier.map(str::to_string),
            language: None,
            text: text.to_string(),
        }
    }

    fn ore_record(payload: &str) -> RecordDocument {
        let xml = format!(
            r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/"><GetRecord><record><header/><metadata>{payload}</metadata></record></GetRecord></OAI-PMH>"#
        );
        parse_get_record(&xml, "oai:example.repo:10673/7", "ore", &NamespaceTable::standard())
            .unwrap()
    }

    #[test]
    fn test_render_dublin_core() {
        let xml = render_dublin_core(&[
            descriptor("title", None, "Example"),
            descriptor("date", Some("issued"), "2020"),
            descriptor("description", None, ""),
        ]);

        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<dublin_core schema="dc">
  <dcvalue element="title">Example</dcvalue>
  <dcvalue element="date" qualifier="issued">2020</dcvalue>
  <dcvalue element="description"></dcvalue>
</dublin_core>
"#
        );
    }

    #[test]
    fn test_render_dublin_core_escapes_and_roundtrips_text() {
        let text = "Fish & Chips <fried> \"quoted\" – ação";
        let xml = render_dublin_core(&[descriptor("title", None, text)]);

        let doc = Document::parse(&xml).unwrap();
        let value = doc.root_element().first_element_child().unwrap();
        assert_eq!(value.text(), Some(text));
        assert_eq!(doc.root_element().attribute("schema"), Some("dc"));
    }

    #[test]
    fn test_render_empty_descriptor_list() {
        let xml = render_dublin_core(&[]);
        let doc = Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "dublin_core");
        assert_eq!(doc.root_element().children().filter(|n| n.is_element()).count(), 0);
    }

    #[test]
    fn test_resource_map_from_record() {
        let entry = r#"<atom:entry xmlns:atom="http://www.w3.org/2005/Atom"><atom:id>http://repo.example/handle/10673/7/ore.xml</atom:id></atom:entry>"#;
        let map = ResourceMap::from_record(&ore_record(entry), &NamespaceTable::standard()).unwrap();
        assert_eq!(map.as_str(), entry);
    }

    #[test]
    fn test_resource_map_requires_atom_entry() {
        let payload = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/>"#;
        let err = ResourceMap::from_record(&ore_record(payload), &NamespaceTable::standard())
            .unwrap_err();
        assert!(err.to_string().contains("atom:entry"));
    }

    #[test]
    fn test_archive_item_documents() {
        let entry = r#"<atom:entry xmlns:atom="http://www.w3.org/2005/Atom"/>"#;
        let item = ArchiveItem {
            descriptors: vec![descriptor("title", None, "Example")],
            resource_map: ResourceMap::from_record(&ore_record(entry), &NamespaceTable::standard())
                .unwrap(),
        };

        assert!(item
            .dublin_core_xml()
            .contains(r#"<dcvalue element="title">Example</dcvalue>"#));
        assert_eq!(item.ore_xml(), entry);
    }

    #[test]
    fn test_contents_manifest() {
        assert_eq!(CONTENTS_MANIFEST, "ORE.xml\tbundle:ORE");
        assert!(!CONTENTS_MANIFEST.ends_with('\n'));
        assert!(CONTENTS_MANIFEST.starts_with(ORE_FILE));
    }
}
