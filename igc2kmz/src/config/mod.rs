//! Configuration du rendu et de la découverte des fichiers

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};

/// Configuration principale
///
/// Tous les champs sont optionnels dans le JSON.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Épaisseur de la ligne de trace
    pub line_width: u32,

    /// Échelle des icônes de décollage/atterrissage
    pub icon_scale: f64,

    /// Opacité de la trace (255 = opaque)
    pub alpha: u8,

    /// Extension des tracklogs (sans point, insensible à la casse)
    pub igc_extension: String,

    /// Extension des archives à fusionner
    pub kmz_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_width: 3,
            icon_scale: 1.0,
            alpha: 255,
            igc_extension: "igc".to_string(),
            kmz_extension: "kmz".to_string(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.line_width, 3);
        assert_eq!(config.icon_scale, 1.0);
        assert_eq!(config.alpha, 255);
        assert_eq!(config.igc_extension, "igc");
        assert_eq!(config.kmz_extension, "kmz");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"line_width": 5, "alpha": 128}"#).unwrap();
        assert_eq!(config.line_width, 5);
        assert_eq!(config.alpha, 128);
        assert_eq!(config.icon_scale, 1.0);
        assert_eq!(config.igc_extension, "igc");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("igc2kmz.json");
        std::fs::write(&path, r#"{"icon_scale": 1.5}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.icon_scale, 1.5);
        assert_eq!(config.line_width, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"alpha": 300}"#).unwrap();

        assert!(Config::load(&path).is_err());
    }
}
