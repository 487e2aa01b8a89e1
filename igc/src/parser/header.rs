//! Parser pour les enregistrements H (en-têtes)

use std::ops::Range;

use chrono::NaiveDate;
use memchr::memchr;
use tracing::trace;

/// Métadonnées portées par une ligne H
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Nom du pilote (HFPLT, HPPLT, ...)
    pub pilot: Option<String>,

    /// Date du vol (HFDTE / HPDTE)
    pub date: Option<NaiveDate>,
}

/// Parse une ligne H déjà débarrassée de ses blancs
pub fn parse(line: &str) -> Header {
    let upper = line.to_ascii_uppercase();

    Header {
        pilot: parse_pilot(line, &upper),
        date: parse_date(line, &upper),
    }
}

/// Tout ce qui suit le premier ':' d'une ligne contenant PLT
fn parse_pilot(line: &str, upper: &str) -> Option<String> {
    if !upper.contains("PLT") {
        return None;
    }

    let colon = memchr(b':', line.as_bytes())?;
    let name = line[colon + 1..].trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Date DDMMYY: les 6 premiers chiffres après le préfixe HFDTE/HPDTE
///
/// Accepte aussi bien `HFDTE150724` que `HFDTEDATE:150724,01`. Pivot du
/// siècle: 69-99 => 19xx, 00-68 => 20xx. Une date impossible (mois 13,
/// 31 février) est ignorée sans erreur.
fn parse_date(line: &str, upper: &str) -> Option<NaiveDate> {
    if !(upper.starts_with("HFDTE") || upper.starts_with("HPDTE")) {
        return None;
    }

    let digits: String = line
        .chars()
        .skip(5)
        .filter(char::is_ascii_digit)
        .take(6)
        .collect();

    if digits.len() < 6 {
        return None;
    }

    let number = |range: Range<usize>| digits[range].parse::<u32>().ok();
    let (day, month, short_year) = (number(0..2)?, number(2..4)?, number(4..6)?);
    let year = if short_year >= 69 {
        1900 + short_year
    } else {
        2000 + short_year
    };

    let date = NaiveDate::from_ymd_opt(year as i32, month, day);
    if date.is_none() {
        trace!(digits = %digits, "Discarding invalid flight date");
    }
    date
}
