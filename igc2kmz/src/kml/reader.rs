//! Lecture d'un document KML en arbre d'éléments (quick-xml, espaces de noms résolus)

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use tracing::trace;

use super::{qualified_name, Element, Node};
use crate::ConvertError;

/// Parse un document XML et retourne son élément racine
///
/// Retourne `Ok(None)` si le document ne contient aucun élément.
/// Les textes composés uniquement de blancs sont ignorés dans les
/// éléments qui ont des sous-éléments (indentation). Les attributs
/// préfixés sont stockés sous la forme `{uri}nom`.
pub fn parse_str(xml: &str) -> Result<Option<Element>, ConvertError> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let namespace = namespace_of(&resolved);
        match event {
            Event::Start(e) => {
                let element = open_element(&reader, namespace, &e)?;
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = open_element(&reader, namespace, &e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, close_element(element));
                }
            }
            Event::Text(e) => push_text(&mut stack, &String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => push_text(&mut stack, &String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    push_text(&mut stack, ch.encode_utf8(&mut [0; 4]));
                } else {
                    let entity = match &*e {
                        b"amp" => "&",
                        b"lt" => "<",
                        b"gt" => ">",
                        b"quot" => "\"",
                        b"apos" => "'",
                        other => {
                            trace!(
                                entity = %String::from_utf8_lossy(other),
                                "Dropping unknown entity reference"
                            );
                            ""
                        }
                    };
                    push_text(&mut stack, entity);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(root)
}

fn namespace_of(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    e: &BytesStart<'_>,
) -> Result<Element, ConvertError> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut element = Element::new(None, name);
    element.namespace = namespace;

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let raw_key = attr.key.as_ref();
        // les déclarations sont redéclarées à l'écriture
        if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attr.key);
        let local = String::from_utf8_lossy(local.as_ref());
        let key = match resolved {
            ResolveResult::Bound(ns) => {
                qualified_name(&String::from_utf8_lossy(ns.as_ref()), &local)
            }
            ResolveResult::Unbound => local.into_owned(),
            ResolveResult::Unknown(prefix) => {
                trace!(
                    prefix = %String::from_utf8_lossy(&prefix),
                    "Attribute prefix is not declared"
                );
                String::from_utf8_lossy(raw_key).into_owned()
            }
        };

        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn close_element(mut element: Element) -> Element {
    let has_elements = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Element(_)));

    if has_elements {
        element.children.retain(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(_) => true,
        });
    }

    element
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn push_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };

    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kml::{writer, KML_NS};

    #[test]
    fn test_parse_qualified_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>flight</name>
    <Style id="trackStyle"/>
  </Document>
</kml>"#;

        let root = parse_str(xml).unwrap().unwrap();
        assert!(root.is(Some(KML_NS), "kml"));
        assert!(root.attributes.is_empty());

        let doc = root.find(Some(KML_NS), "Document").unwrap();
        assert_eq!(doc.elements().count(), 2);
        assert_eq!(doc.find(Some(KML_NS), "name").unwrap().text(), "flight");
        assert_eq!(
            doc.find(Some(KML_NS), "Style").unwrap().attr("id"),
            Some("trackStyle")
        );
    }

    #[test]
    fn test_parse_prefixed_document() {
        let xml = r#"<k:kml xmlns:k="http://www.opengis.net/kml/2.2"><k:Document/></k:kml>"#;
        let root = parse_str(xml).unwrap().unwrap();
        assert!(root.find(Some(KML_NS), "Document").is_some());
    }

    #[test]
    fn test_parse_unqualified_document() {
        let root = parse_str("<kml><Document><name>x</name></Document></kml>")
            .unwrap()
            .unwrap();
        assert!(root.find(None, "Document").is_some());
        assert!(root.find(Some(KML_NS), "Document").is_none());
    }

    #[test]
    fn test_parse_entities() {
        let root = parse_str("<d a=\"x &amp; y\">Pilot: O&apos;Brien &#233;</d>")
            .unwrap()
            .unwrap();
        assert_eq!(root.text(), "Pilot: O'Brien é");
        assert_eq!(root.attr("a"), Some("x & y"));
    }

    #[test]
    fn test_parse_keeps_text_newlines() {
        let root = parse_str("<description>Pilot: A\nDate: 2024-07-15</description>")
            .unwrap()
            .unwrap();
        assert_eq!(root.text(), "Pilot: A\nDate: 2024-07-15");
    }

    #[test]
    fn test_parse_prefixed_attributes() {
        let xml = r#"<kml xmlns="http://www.opengis.net/kml/2.2" xmlns:gx="http://www.google.com/kml/ext/2.2"><Placemark id="p" gx:balloonVisibility="1" xml:lang="fr"/></kml>"#;
        let root = parse_str(xml).unwrap().unwrap();
        assert!(root.attributes.is_empty());

        let placemark = root.find(Some(KML_NS), "Placemark").unwrap();
        assert_eq!(placemark.attr("id"), Some("p"));
        assert_eq!(
            placemark.attr("{http://www.google.com/kml/ext/2.2}balloonVisibility"),
            Some("1")
        );
        assert_eq!(
            placemark.attr("{http://www.w3.org/XML/1998/namespace}lang"),
            Some("fr")
        );
    }

    #[test]
    fn test_parse_unknown_entity_dropped() {
        let root = parse_str("<name>a&nbsp;b</name>").unwrap().unwrap();
        assert_eq!(root.text(), "ab");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_str("").unwrap().is_none());
    }

    #[test]
    fn test_parse_mismatched_tags() {
        assert!(parse_str("<kml><Document></kml>").is_err());
    }

    #[test]
    fn test_written_tree_reads_back_identical() {
        let tree = Element::kml("kml").with_child(
            Element::kml("Document")
                .with_child(Element::kml("name").with_text("a & b"))
                .with_child(Element::kml("Style").with_attr("id", "s")),
        );

        let xml = writer::to_string(&tree).unwrap();
        assert_eq!(parse_str(&xml).unwrap().unwrap(), tree);
    }
}
