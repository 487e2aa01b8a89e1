//! # igc
//!
//! Parser pour les tracklogs IGC (International Gliding Commission) produits
//! par les enregistreurs de vol (parapente, planeur).
//!
//! ## Features
//!
//! - Décodage tolérant: une ligne illisible est ignorée, jamais fatale
//! - Validation UTF-8 SIMD avec `simdutf8`, repli avec remplacement via `encoding_rs`
//! - Découpage des lignes avec `memchr` (`\n`, `\r\n` et `\r`)
//! - Positions en `geo::Point` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use igc::parse;
//! use std::path::Path;
//!
//! let track = parse(Path::new("2024-07-15-XCT-001.igc"))?;
//! println!("Pilote: {:?}", track.pilot);
//! println!("{} points", track.fixes.len());
//! ```

pub mod error;
pub mod parser;
pub mod types;

pub use chrono::NaiveDate;
pub use error::IgcError;
pub use parser::{decode_line, Record, TrackBuilder};
pub use types::{Fix, Track};

use std::borrow::Cow;
use std::path::Path;

use memchr::memchr2_iter;
use tracing::{debug, trace};

/// Parse un fichier IGC et retourne la trace complète.
///
/// # Errors
///
/// Retourne `IgcError::Io` si le fichier est illisible et
/// `IgcError::NoValidFixes` si aucun point valide n'a été décodé.
pub fn parse(path: &Path) -> Result<Track, IgcError> {
    let data = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), "Parsing IGC file");
    parse_bytes(&data)
}

/// Parse le contenu brut d'un fichier IGC
pub fn parse_bytes(data: &[u8]) -> Result<Track, IgcError> {
    let text = decode_text(data);
    let mut builder = TrackBuilder::new();

    let mut start = 0;
    for end in memchr2_iter(b'\n', b'\r', text.as_bytes()) {
        builder.push_line(&text[start..end]);
        start = end + 1;
    }
    if start < text.len() {
        builder.push_line(&text[start..]);
    }

    debug!(
        fixes = builder.fix_count(),
        skipped = builder.skipped(),
        "IGC records decoded"
    );

    builder.finish()
}

/// Décode en UTF-8, les octets invalides sont remplacés (U+FFFD)
fn decode_text(data: &[u8]) -> Cow<'_, str> {
    match simdutf8::basic::from_utf8(data) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (decoded, _, had_errors) = encoding_rs::UTF_8.decode(data);
            if had_errors {
                trace!("Replaced invalid UTF-8 sequences");
            }
            decoded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "AXCT7f3a\r\n\
        HFDTEDATE:150724,01\r\n\
        HFPLTPILOTINCHARGE:Jane Doe\r\n\
        B1200004500000N00700000EA0100001000\r\n\
        B1200014500060N00700060EA0100001100\r\n";

    #[test]
    fn test_parse_bytes_sample() {
        let track = parse_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(track.pilot.as_deref(), Some("Jane Doe"));
        assert_eq!(track.date.map(|d| d.to_string()).as_deref(), Some("2024-07-15"));
        assert_eq!(track.fixes.len(), 2);
        assert_eq!(track.fixes[0].latitude(), 45.0);
        assert!((track.fixes[1].longitude() - 7.001).abs() < 1e-12);
    }

    #[test]
    fn test_parse_bytes_lone_carriage_returns() {
        let data = SAMPLE.replace("\r\n", "\r");
        let track = parse_bytes(data.as_bytes()).unwrap();
        assert_eq!(track.fixes.len(), 2);
    }

    #[test]
    fn test_parse_bytes_without_trailing_newline() {
        let data = SAMPLE.trim_end();
        assert_eq!(parse_bytes(data.as_bytes()).unwrap().fixes.len(), 2);
    }

    #[test]
    fn test_parse_bytes_invalid_utf8_replaced() {
        let mut data = b"HFPLTPILOTINCHARGE:Ren\xe9\n".to_vec();
        data.extend_from_slice(b"B1200004500000N00700000EA0100001000\n");

        let track = parse_bytes(&data).unwrap();
        assert_eq!(track.pilot.as_deref(), Some("Ren\u{fffd}"));
        assert_eq!(track.fixes.len(), 1);
    }

    #[test]
    fn test_parse_bytes_invalid_byte_in_fix_time() {
        let data = b"B12\xe90004500000N00700000EA0100001000\n";

        let track = parse_bytes(data).unwrap();
        assert_eq!(track.fixes.len(), 1);
        assert_eq!(track.fixes[0].latitude(), 45.0);
        assert_eq!(track.fixes[0].longitude(), 7.0);
        assert_eq!(track.fixes[0].altitude, 1000);
    }

    #[test]
    fn test_parse_bytes_no_fixes() {
        let result = parse_bytes(b"AXCT\nHFDTE150724\n");
        assert!(matches!(result, Err(IgcError::NoValidFixes)));
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse(Path::new("nonexistent.igc"));
        assert!(matches!(result, Err(IgcError::Io(_))));
    }
}
