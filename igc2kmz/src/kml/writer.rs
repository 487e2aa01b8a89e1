//! Sérialisation de l'arbre KML avec quick-xml

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{split_qualified_name, Element, Node, XML_NS};
use crate::ConvertError;

/// Préfixes usuels des extensions KML
const KNOWN_PREFIXES: &[(&str, &str)] = &[
    ("http://www.google.com/kml/ext/2.2", "gx"),
    ("http://www.w3.org/2005/Atom", "atom"),
];

/// Liaisons (uri, préfixe) visibles depuis un élément
type Bindings = [(String, String)];

/// Sérialise l'arbre en XML indenté, sans déclaration
///
/// L'espace de noms par défaut (`xmlns`) n'est déclaré que lorsqu'il
/// change par rapport au parent. Les attributs `{uri}nom` reçoivent un
/// préfixe déclaré sur le premier élément qui l'utilise.
pub fn to_string(root: &Element) -> Result<String, ConvertError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut generated = 0;
    write_element(&mut writer, root, None, &[], &mut generated)?;

    let bytes = writer.into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    inherited: Option<&str>,
    bindings: &Bindings,
    generated: &mut usize,
) -> Result<(), ConvertError> {
    let namespace = element.namespace.as_deref();

    let mut declared: Vec<(String, String)> = Vec::new();
    let mut attributes = Vec::with_capacity(element.attributes.len());
    for (key, value) in &element.attributes {
        let name = match split_qualified_name(key) {
            None => key.clone(),
            Some((uri, local)) if uri == XML_NS => format!("xml:{}", local),
            Some((uri, local)) => {
                let prefix = match lookup_prefix(bindings, &declared, uri) {
                    Some(prefix) => prefix.to_string(),
                    None => {
                        let prefix = new_prefix(bindings, &declared, uri, generated);
                        declared.push((uri.to_string(), prefix.clone()));
                        prefix
                    }
                };
                format!("{}:{}", prefix, local)
            }
        };
        attributes.push((name, value.as_str()));
    }

    let mut start = BytesStart::new(element.name.as_str());
    if namespace != inherited {
        start.push_attribute(("xmlns", namespace.unwrap_or("")));
    }
    for (uri, prefix) in &declared {
        let key = format!("xmlns:{}", prefix);
        start.push_attribute((key.as_str(), uri.as_str()));
    }
    for (name, value) in &attributes {
        start.push_attribute((name.as_str(), *value));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    let scope: Cow<'_, Bindings> = if declared.is_empty() {
        Cow::Borrowed(bindings)
    } else {
        Cow::Owned(bindings.iter().cloned().chain(declared).collect())
    };

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child, namespace, &scope, generated)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;

    Ok(())
}

/// Préfixe lié à `uri` dans la portée courante, le plus proche d'abord
fn lookup_prefix<'a>(
    bindings: &'a Bindings,
    declared: &'a Bindings,
    uri: &str,
) -> Option<&'a str> {
    bindings
        .iter()
        .chain(declared)
        .rev()
        .find(|(bound, prefix)| bound == uri && !is_shadowed(bindings, declared, bound, prefix))
        .map(|(_, prefix)| prefix.as_str())
}

/// Vrai si `prefix` a été relié plus bas à un autre espace de noms
fn is_shadowed(bindings: &Bindings, declared: &Bindings, uri: &str, prefix: &str) -> bool {
    bindings
        .iter()
        .chain(declared)
        .rev()
        .find(|(_, bound)| bound == prefix)
        .is_some_and(|(bound, _)| bound != uri)
}

/// Préfixe usuel s'il est libre, sinon `nsN`
fn new_prefix(
    bindings: &Bindings,
    declared: &Bindings,
    uri: &str,
    generated: &mut usize,
) -> String {
    let in_use = |candidate: &str| {
        bindings
            .iter()
            .chain(declared)
            .any(|(_, prefix)| prefix == candidate)
    };

    if let Some(&(_, known)) = KNOWN_PREFIXES.iter().find(|(known_uri, _)| *known_uri == uri) {
        if !in_use(known) {
            return known.to_string();
        }
    }

    loop {
        let candidate = format!("ns{}", generated);
        *generated += 1;
        if !in_use(&candidate) {
            return candidate;
        }
    }
}
