//! Couleurs des traces: roue chromatique HSV et encodage KML

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::ConvertError;

/// Couleur RGB 8 bits par canal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Encodage KML `aabbggrr` (hex minuscule)
    pub fn to_kml(self, alpha: u8) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}", alpha, self.b, self.g, self.r)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Rgb {
    type Err = ConvertError;

    /// Accepte `#rrggbb` ou `rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ConvertError::InvalidColor(s.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ConvertError::InvalidColor(s.to_string()))
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Génère `n` couleurs réparties uniformément sur la roue des teintes
///
/// Teinte i/n, saturation et valeur maximales, canaux tronqués (pas
/// arrondis) à 8 bits.
pub fn generate_colors(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| {
            let hue = i as f64 / n as f64;
            let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
            Rgb::new(quantize(r), quantize(g), quantize(b))
        })
        .collect()
}

fn quantize(channel: f64) -> u8 {
    (channel * 255.0) as u8
}

/// Conversion HSV -> RGB, composantes dans [0, 1]
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }

    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as i64 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
