//! Encoded polyline codec (precision 5, latitude first).
//!
//! Each value is a zig-zag encoded delta split into 5-bit chunks, least
//! significant first, offset by 63. Bit `0x20` marks a continuation chunk.

use geo::{Coord, LineString};

const PRECISION: f64 = 100_000.0;
const CHUNK_OFFSET: u8 = 63;
const CONTINUATION: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
/// Values wider than this cannot come from a real coordinate.
const MAX_SHIFT: u32 = 35;
/// Largest scaled coordinate `encode` accepts. Deltas between two such
/// values always fit in an `i64`.
const MAX_SCALED: f64 = i32::MAX as f64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolylineError {
    #[error("invalid polyline character {byte:#04x} at byte {index}")]
    InvalidCharacter { index: usize, byte: u8 },

    #[error("polyline ends in the middle of a value or coordinate at byte {index}")]
    UnexpectedEnd { index: usize },

    #[error("polyline value starting before byte {index} overflows")]
    Overflow { index: usize },

    #[error("coordinate {index} cannot be encoded")]
    Unencodable { index: usize },
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = *bytes
            .get(*index)
            .ok_or(PolylineError::UnexpectedEnd { index: *index })?;
        if !(CHUNK_OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter { index: *index, byte });
        }
        *index += 1;

        let chunk = i64::from(byte - CHUNK_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        if chunk & CONTINUATION == 0 {
            break;
        }
        shift += 5;
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { index: *index });
        }
    }

    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

/// Decode a polyline, rejecting input that ends mid-value or mid-coordinate.
pub fn decode(encoded: &str) -> Result<LineString, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let (mut lat, mut lon) = (0i64, 0i64);
    let mut coords = Vec::new();

    while index < bytes.len() {
        lat = lat
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(PolylineError::Overflow { index })?;
        lon = lon
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(PolylineError::Overflow { index })?;
        coords.push(Coord {
            x: lon as f64 / PRECISION,
            y: lat as f64 / PRECISION,
        });
    }

    Ok(LineString::new(coords))
}

/// Decode as many complete coordinates as possible, dropping a malformed
/// or incomplete tail.
pub fn decode_lenient(encoded: &str) -> LineString {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let (mut lat, mut lon) = (0i64, 0i64);
    let mut coords = Vec::new();

    while index < bytes.len() {
        let Ok(dlat) = next_value(bytes, &mut index) else {
            break;
        };
        let Ok(dlon) = next_value(bytes, &mut index) else {
            break;
        };
        let (Some(next_lat), Some(next_lon)) = (lat.checked_add(dlat), lon.checked_add(dlon))
        else {
            break;
        };
        lat = next_lat;
        lon = next_lon;
        coords.push(Coord {
            x: lon as f64 / PRECISION,
            y: lat as f64 / PRECISION,
        });
    }

    LineString::new(coords)
}

fn push_value(out: &mut String, value: i64) {
    let mut remaining = if value < 0 { !(value << 1) } else { value << 1 };
    while remaining >= CONTINUATION {
        out.push(char::from((CONTINUATION | (remaining & CHUNK_MASK)) as u8 + CHUNK_OFFSET));
        remaining >>= 5;
    }
    out.push(char::from(remaining as u8 + CHUNK_OFFSET));
}

fn scaled(value: f64, index: usize) -> Result<i64, PolylineError> {
    let scaled = (value * PRECISION).round();
    if !scaled.is_finite() || scaled.abs() > MAX_SCALED {
        return Err(PolylineError::Unencodable { index });
    }
    Ok(scaled as i64)
}

/// Encode a line at precision 5. Non-finite or wildly out of range
/// coordinates are rejected.
pub fn encode(line: &LineString) -> Result<String, PolylineError> {
    let mut out = String::new();
    let (mut prev_lat, mut prev_lon) = (0i64, 0i64);
    for (index, coord) in line.coords().enumerate() {
        let lat = scaled(coord.y, index)?;
        let lon = scaled(coord.x, index)?;
        let (Some(dlat), Some(dlon)) = (lat.checked_sub(prev_lat), lon.checked_sub(prev_lon))
        else {
            return Err(PolylineError::Unencodable { index });
        };
        push_value(&mut out, dlat);
        push_value(&mut out, dlon);
        prev_lat = lat;
        prev_lon = lon;
    }
    Ok(out)
}
