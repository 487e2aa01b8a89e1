//! Document KML d'une trace unique
//!
//! Structures typées par élément, rendues ensuite en arbre [`Element`].

use igc::{Fix, Track};

use super::Element;
use crate::color::Rgb;
use crate::config::Config;

/// Identifiant du style de la ligne de trace
pub const TRACK_STYLE_ID: &str = "trackStyle";
/// Identifiant du style des marqueurs
pub const PIN_STYLE_ID: &str = "pinStyle";

const ALTITUDE_MODE: &str = "absolute";

/// Style de ligne (couleur KML + épaisseur)
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub alpha: u8,
    pub width: u32,
}

/// Style d'icône des marqueurs
#[derive(Debug, Clone, PartialEq)]
pub struct IconStyle {
    pub scale: f64,
}

/// Géométrie d'un placemark
#[derive(Debug, Clone, PartialEq)]
pub enum PlacemarkGeometry {
    /// Trace complète (extrude 0, tessellate 1)
    LineString(Vec<Fix>),
    /// Marqueur ponctuel
    Point(Fix),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    /// Référence de style, avec le `#`
    pub style_url: String,
    pub geometry: PlacemarkGeometry,
}

/// Document complet pour une trace
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDocument {
    pub name: String,
    pub description: Option<String>,
    pub line_style: LineStyle,
    pub icon_style: IconStyle,
    /// Trace, puis décollage et atterrissage s'ils existent
    pub placemarks: Vec<Placemark>,
}

impl TrackDocument {
    /// Construit le document d'une trace
    pub fn from_track(track: &Track, name: &str, color: Rgb, config: &Config) -> Self {
        let mut placemarks = vec![Placemark {
            name: name.to_string(),
            style_url: format!("#{}", TRACK_STYLE_ID),
            geometry: PlacemarkGeometry::LineString(track.fixes.clone()),
        }];

        let markers = [("Takeoff", track.takeoff()), ("Landing", track.landing())];
        for (label, fix) in markers {
            if let Some(fix) = fix {
                placemarks.push(Placemark {
                    name: label.to_string(),
                    style_url: format!("#{}", PIN_STYLE_ID),
                    geometry: PlacemarkGeometry::Point(*fix),
                });
            }
        }

        Self {
            name: name.to_string(),
            description: describe(track),
            line_style: LineStyle {
                color,
                alpha: config.alpha,
                width: config.line_width,
            },
            icon_style: IconStyle {
                scale: config.icon_scale,
            },
            placemarks,
        }
    }

    /// Rend l'arbre complet, racine `kml` comprise
    pub fn into_element(self) -> Element {
        let mut document = Element::kml("Document").with_child(text_element("name", &self.name));

        if let Some(description) = &self.description {
            document.push(text_element("description", description));
        }

        document.push(self.line_style.into_element());
        document.push(self.icon_style.into_element());

        for placemark in self.placemarks {
            document.push(placemark.into_element());
        }

        Element::kml("kml").with_child(document)
    }
}

impl LineStyle {
    fn into_element(self) -> Element {
        Element::kml("Style").with_attr("id", TRACK_STYLE_ID).with_child(
            Element::kml("LineStyle")
                .with_child(text_element("color", &self.color.to_kml(self.alpha)))
                .with_child(text_element("width", &self.width.to_string())),
        )
    }
}

impl IconStyle {
    fn into_element(self) -> Element {
        Element::kml("Style").with_attr("id", PIN_STYLE_ID).with_child(
            Element::kml("IconStyle").with_child(text_element("scale", &format_number(self.scale))),
        )
    }
}

impl Placemark {
    fn into_element(self) -> Element {
        let geometry = match self.geometry {
            PlacemarkGeometry::LineString(fixes) => Element::kml("LineString")
                .with_child(text_element("altitudeMode", ALTITUDE_MODE))
                .with_child(text_element("extrude", "0"))
                .with_child(text_element("tessellate", "1"))
                .with_child(text_element("coordinates", &coordinates(&fixes))),
            PlacemarkGeometry::Point(fix) => Element::kml("Point")
                .with_child(text_element("altitudeMode", ALTITUDE_MODE))
                .with_child(text_element("coordinates", &coordinate(&fix))),
        };

        Element::kml("Placemark")
            .with_child(text_element("name", &self.name))
            .with_child(text_element("styleUrl", &self.style_url))
            .with_child(geometry)
    }
}

fn text_element(name: &str, text: &str) -> Element {
    Element::kml(name).with_text(text)
}

/// Lignes `Pilot:` et `Date:` présentes, None si aucune
fn describe(track: &Track) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(pilot) = &track.pilot {
        lines.push(format!("Pilot: {}", pilot));
    }
    if let Some(date) = track.date {
        lines.push(format!("Date: {}", date.format("%Y-%m-%d")));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Triplet `lon,lat,alt`
fn coordinate(fix: &Fix) -> String {
    format!(
        "{},{},{}",
        format_number(fix.longitude()),
        format_number(fix.latitude()),
        fix.altitude
    )
}

fn coordinates(fixes: &[Fix]) -> String {
    fixes.iter().map(coordinate).collect::<Vec<_>>().join(" ")
}

/// Forme décimale la plus courte, au moins un chiffre après la virgule (`7.0`)
fn format_number(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}
