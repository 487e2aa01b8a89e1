//! Parser pour les enregistrements B (points GPS)
//!
//! Format: `B HHMMSS DDMMmmmN DDDMMmmmE V PPPPP GGGGG`
//! - Latitude: DDMMmmm + N/S (degrés, minutes x 1000)
//! - Longitude: DDDMMmmm + E/W
//! - Validité: A (fix 3D) ou V (invalide)
//! - Altitude pression puis altitude GPS, 5 caractères chacune, en mètres

use std::ops::Range;
use std::str::FromStr;

use crate::types::Fix;
use crate::IgcError;

/// Longueur minimale d'un enregistrement B exploitable
pub const MIN_LENGTH: usize = 35;

const LAT_DEGREES: Range<usize> = 7..9;
const LAT_MINUTES: Range<usize> = 9..14;
const LAT_HEMISPHERE: Range<usize> = 14..15;
const LON_DEGREES: Range<usize> = 15..18;
const LON_MINUTES: Range<usize> = 18..23;
const LON_HEMISPHERE: Range<usize> = 23..24;
const VALIDITY: Range<usize> = 24..25;
const PRESSURE_ALTITUDE: Range<usize> = 25..30;
const GPS_ALTITUDE: Range<usize> = 30..35;

/// Parse une ligne B déjà débarrassée de ses blancs
///
/// Retourne `Ok(None)` pour un fix marqué invalide (validité != 'A').
pub fn parse(line: &str) -> Result<Option<Fix>, IgcError> {
    let length = line.chars().count();
    if length < MIN_LENGTH {
        return Err(IgcError::malformed(
            'B',
            format!("record too short ({length} chars)"),
        ));
    }

    if field(line, VALIDITY, "validity")? != "A" {
        return Ok(None);
    }

    let latitude = coordinate(line, LAT_DEGREES, LAT_MINUTES, LAT_HEMISPHERE, "S")?;
    let longitude = coordinate(line, LON_DEGREES, LON_MINUTES, LON_HEMISPHERE, "W")?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(IgcError::malformed(
            'B',
            format!("latitude out of range: {latitude}"),
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(IgcError::malformed(
            'B',
            format!("longitude out of range: {longitude}"),
        ));
    }

    let gps_altitude: i32 = number(line, GPS_ALTITUDE, "GPS altitude")?;
    let pressure_altitude: i32 = number(line, PRESSURE_ALTITUDE, "pressure altitude")?;

    Ok(Some(Fix::new(
        latitude,
        longitude,
        select_altitude(gps_altitude, pressure_altitude),
    )))
}

/// Altitude GPS si strictement positive, sinon altitude pression
pub fn select_altitude(gps: i32, pressure: i32) -> i32 {
    if gps > 0 {
        gps
    } else {
        pressure
    }
}

/// Degrés + minutes/1000/60, négatif pour l'hémisphère sud/ouest
fn coordinate(
    line: &str,
    degrees: Range<usize>,
    minutes: Range<usize>,
    hemisphere: Range<usize>,
    negative: &str,
) -> Result<f64, IgcError> {
    let deg: i32 = number(line, degrees, "degrees")?;
    let thousandths: i32 = number(line, minutes, "minutes")?;

    let value = f64::from(deg) + (f64::from(thousandths) / 1000.0) / 60.0;

    if field(line, hemisphere, "hemisphere")? == negative {
        Ok(-value)
    } else {
        Ok(value)
    }
}

/// Champ aux colonnes `range`, comptées en caractères
fn field<'a>(line: &'a str, range: Range<usize>, name: &str) -> Result<&'a str, IgcError> {
    byte_offset(line, range.start)
        .zip(byte_offset(line, range.end))
        .and_then(|(start, end)| line.get(start..end))
        .ok_or_else(|| IgcError::malformed('B', format!("{name} not found at {range:?}")))
}

/// Position en octets du caractère d'index `column`
fn byte_offset(line: &str, column: usize) -> Option<usize> {
    if line.is_ascii() {
        return (column <= line.len()).then_some(column);
    }

    line.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(line.len()))
        .nth(column)
}

fn number<T: FromStr>(line: &str, range: Range<usize>, name: &str) -> Result<T, IgcError> {
    let raw = field(line, range, name)?;
    raw.trim()
        .parse::<T>()
        .map_err(|_| IgcError::malformed('B', format!("invalid {name}: {raw:?}")))
}
