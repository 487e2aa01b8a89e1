//! Décodage ligne à ligne des fichiers IGC

pub mod fix;
pub mod header;

use tracing::trace;

use crate::types::{Fix, Track};
use crate::IgcError;

pub use header::Header;

/// Enregistrement IGC exploitable
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Ligne H (pilote et/ou date)
    Header(Header),
    /// Ligne B valide
    Fix(Fix),
}

/// Décode une ligne IGC
///
/// Les lignes autres que H et B, ainsi que les fix marqués invalides,
/// donnent `Ok(None)`. Une ligne B illisible donne `MalformedRecord`.
pub fn decode_line(line: &str) -> Result<Option<Record>, IgcError> {
    let line = line.trim();

    match line.as_bytes().first() {
        Some(b'H') => Ok(Some(Record::Header(header::parse(line)))),
        Some(b'B') => Ok(fix::parse(line)?.map(Record::Fix)),
        _ => Ok(None),
    }
}

/// Accumule les enregistrements d'un fichier en une `Track`
#[derive(Debug, Default)]
pub struct TrackBuilder {
    track: Track,
    skipped: usize,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Décode une ligne et met à jour la trace en cours
    pub fn push_line(&mut self, line: &str) {
        match decode_line(line) {
            Ok(Some(Record::Header(header))) => {
                if header.pilot.is_some() {
                    self.track.pilot = header.pilot;
                }
                if header.date.is_some() {
                    self.track.date = header.date;
                }
            }
            Ok(Some(Record::Fix(fix))) => self.track.fixes.push(fix),
            Ok(None) => {}
            Err(e) => {
                self.skipped += 1;
                trace!(error = %e, "Skipping record");
            }
        }
    }

    /// Nombre de points décodés jusqu'ici
    pub fn fix_count(&self) -> usize {
        self.track.fixes.len()
    }

    /// Nombre de lignes rejetées
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Termine la trace; échoue si aucun point n'a été décodé
    pub fn finish(self) -> Result<Track, IgcError> {
        if self.track.fixes.is_empty() {
            return Err(IgcError::NoValidFixes);
        }
        Ok(self.track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_decode_ignores_other_records() {
        assert_eq!(decode_line("AXXXABC").unwrap(), None);
        assert_eq!(decode_line("I013638FXA").unwrap(), None);
        assert_eq!(decode_line("").unwrap(), None);
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let record = decode_line("  B1200004500000N00700000EA0012000340\r").unwrap();
        assert!(matches!(record, Some(Record::Fix(f)) if f.altitude == 340));
    }

    #[test]
    fn test_builder_keeps_latest_non_null_metadata() {
        let mut builder = TrackBuilder::new();
        builder.push_line("HFPLTPILOTINCHARGE:Alice");
        builder.push_line("HFDTE150724");
        builder.push_line("HFPLTPILOTINCHARGE:");
        builder.push_line("HFDTE991399");
        builder.push_line("B1200004500000N00700000EA0012000340");

        let track = builder.finish().unwrap();
        assert_eq!(track.pilot.as_deref(), Some("Alice"));
        assert_eq!(track.date, NaiveDate::from_ymd_opt(2024, 7, 15));
    }

    #[test]
    fn test_builder_skips_malformed_lines() {
        let mut builder = TrackBuilder::new();
        builder.push_line("B1200004500000N00700000EA0012000340");
        builder.push_line("B12000045");
        builder.push_line("B1200004500000N00700000EV0012000340");
        builder.push_line("B1200004500060N00700060EA0012000350");

        assert_eq!(builder.fix_count(), 2);
        assert_eq!(builder.skipped(), 1);

        let track = builder.finish().unwrap();
        assert_eq!(track.fixes[0].altitude, 340);
        assert_eq!(track.fixes[1].altitude, 350);
    }

    #[test]
    fn test_builder_empty_track_fails() {
        let mut builder = TrackBuilder::new();
        builder.push_line("HFPLTPILOTINCHARGE:Alice");
        builder.push_line("B1200004500000N00700000EV0012000340");

        assert!(matches!(builder.finish(), Err(IgcError::NoValidFixes)));
    }
}
