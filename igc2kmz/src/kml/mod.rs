//! Modèle KML: arbre d'éléments avec espaces de noms résolus
//!
//! Les documents produits (trace unique ou fusion) et les documents relus
//! depuis une archive partagent le même arbre, ce qui permet à la fusion
//! de déplacer des sous-arbres tels quels.

pub mod document;
pub mod reader;
pub mod writer;

pub use document::{IconStyle, LineStyle, Placemark, PlacemarkGeometry, TrackDocument};
pub use reader::parse_str;
pub use writer::to_string;

/// Espace de noms KML 2.2
pub const KML_NS: &str = "http://www.opengis.net/kml/2.2";

/// Espace de noms réservé du préfixe `xml`
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Nom d'attribut qualifié `{uri}nom`
pub fn qualified_name(namespace: &str, name: &str) -> String {
    format!("{{{}}}{}", namespace, name)
}

/// Découpe un nom `{uri}nom` en (uri, nom)
pub fn split_qualified_name(key: &str) -> Option<(&str, &str)> {
    key.strip_prefix('{')?.split_once('}')
}

/// Noeud d'un élément: sous-élément ou texte
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Élément XML (nom local + espace de noms)
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// URI de l'espace de noms (None = non qualifié)
    pub namespace: Option<String>,
    /// Nom local, sans préfixe
    pub name: String,
    /// Attributs dans l'ordre du document (`{uri}nom` si préfixés)
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Élément dans l'espace de noms KML
    pub fn kml(name: impl Into<String>) -> Self {
        Self::new(Some(KML_NS), name)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Vrai si l'élément porte ce nom local dans cet espace de noms
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remplace la valeur d'un attribut existant ou l'ajoute
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Concaténation des noeuds texte directs
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Remplace les noeuds texte directs par `text`
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|node| matches!(node, Node::Element(_)));
        self.children.insert(0, Node::Text(text.into()));
    }

    /// Sous-éléments directs
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Premier sous-élément direct correspondant
    pub fn find(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        self.elements().find(|child| child.is(namespace, name))
    }

    pub fn find_mut(&mut self, namespace: Option<&str>, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(child) if child.is(namespace, name) => Some(child),
            _ => None,
        })
    }

    /// Retire et retourne les sous-éléments directs correspondants
    pub fn take_children(&mut self, namespace: Option<&str>, name: &str) -> Vec<Element> {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.children.len());

        for node in std::mem::take(&mut self.children) {
            match node {
                Node::Element(child) if child.is(namespace, name) => taken.push(child),
                other => kept.push(other),
            }
        }

        self.children = kept;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let doc = Element::kml("Document")
            .with_child(Element::kml("name").with_text("flight"))
            .with_child(Element::kml("Style").with_attr("id", "trackStyle"));

        assert_eq!(doc.find(Some(KML_NS), "name").unwrap().text(), "flight");
        assert_eq!(
            doc.find(Some(KML_NS), "Style").unwrap().attr("id"),
            Some("trackStyle")
        );
        assert!(doc.find(None, "name").is_none());
    }

    #[test]
    fn test_qualified_names() {
        let key = qualified_name("http://www.google.com/kml/ext/2.2", "balloonVisibility");
        assert_eq!(key, "{http://www.google.com/kml/ext/2.2}balloonVisibility");
        assert_eq!(
            split_qualified_name(&key),
            Some(("http://www.google.com/kml/ext/2.2", "balloonVisibility"))
        );
        assert_eq!(split_qualified_name("id"), None);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut style = Element::kml("Style").with_attr("id", "a");
        style.set_attr("id", "b");
        assert_eq!(style.attributes, vec![("id".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_set_text_keeps_elements() {
        let mut el = Element::kml("styleUrl")
            .with_text("#a")
            .with_child(Element::kml("x"));
        el.set_text("#b");
        assert_eq!(el.text(), "#b");
        assert_eq!(el.elements().count(), 1);
    }

    #[test]
    fn test_take_children_preserves_order() {
        let mut doc = Element::kml("Document")
            .with_child(Element::kml("Placemark").with_attr("id", "1"))
            .with_child(Element::kml("Style"))
            .with_child(Element::kml("Placemark").with_attr("id", "2"));

        let placemarks = doc.take_children(Some(KML_NS), "Placemark");
        assert_eq!(placemarks.len(), 2);
        assert_eq!(placemarks[0].attr("id"), Some("1"));
        assert_eq!(placemarks[1].attr("id"), Some("2"));
        assert_eq!(doc.elements().count(), 1);
    }
}
