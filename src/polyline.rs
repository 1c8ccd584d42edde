//! Polyline representation for route geometries.
//!
//! Routes are held as decoded coordinate sequences. The compact encoded
//! polyline format only appears at the routing-service boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoPoint;

/// Precision used by OSRM's `geometries=polyline`.
pub const OSRM_PRECISION: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid character {byte:#04x} at offset {offset}")]
    InvalidCharacter { byte: u8, offset: usize },
    #[error("encoded polyline ends in the middle of a value")]
    Truncated,
    #[error("encoded value at offset {0} overflows")]
    Overflow(usize),
    #[error("point {0} is out of range for the requested precision")]
    Unencodable(usize),
}

/// Largest scaled coordinate magnitude the encoder accepts. Keeps deltas and
/// their zig-zag shift inside `i64`.
const MAX_SCALED: f64 = (1u64 << 61) as f64;

/// A route geometry as decoded (lat, lon) points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<GeoPoint>,
}

impl Polyline {
    /// Creates a polyline from decoded points.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Returns the points as a slice.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Consumes the polyline and returns the owned points.
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the polyline has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Decodes an encoded polyline string with `precision` decimal digits.
    pub fn decode(encoded: &str, precision: u32) -> Result<Self, PolylineError> {
        let factor = 10f64.powi(precision as i32);
        let bytes = encoded.as_bytes();
        let mut offset = 0;
        let mut lat: i64 = 0;
        let mut lon: i64 = 0;
        let mut points = Vec::new();

        while offset < bytes.len() {
            lat = accumulate(lat, bytes, &mut offset)?;
            lon = accumulate(lon, bytes, &mut offset)?;
            points.push(GeoPoint::new(lat as f64 / factor, lon as f64 / factor));
        }

        Ok(Self { points })
    }

    /// Encodes the points with `precision` decimal digits.
    ///
    /// Fails with [`PolylineError::Unencodable`] for non-finite coordinates or
    /// ones too large to scale into the integer representation.
    pub fn encode(&self, precision: u32) -> Result<String, PolylineError> {
        let factor = 10f64.powi(precision as i32);
        let mut out = String::new();
        let mut prev_lat: i64 = 0;
        let mut prev_lon: i64 = 0;

        for (index, point) in self.points.iter().enumerate() {
            let lat = scale(point.lat, factor).ok_or(PolylineError::Unencodable(index))?;
            let lon = scale(point.lon, factor).ok_or(PolylineError::Unencodable(index))?;
            encode_value(lat - prev_lat, &mut out);
            encode_value(lon - prev_lon, &mut out);
            prev_lat = lat;
            prev_lon = lon;
        }

        Ok(out)
    }
}

impl From<Vec<GeoPoint>> for Polyline {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self::new(points)
    }
}

fn scale(value: f64, factor: f64) -> Option<i64> {
    let scaled = (value * factor).round();
    (scaled.is_finite() && scaled.abs() < MAX_SCALED).then_some(scaled as i64)
}

fn accumulate(total: i64, bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let start = *offset;
    let delta = decode_value(bytes, offset)?;
    total.checked_add(delta).ok_or(PolylineError::Overflow(start))
}

fn decode_value(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let start = *offset;
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*offset).ok_or(PolylineError::Truncated)?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter { byte, offset: *offset });
        }
        if shift > 60 {
            return Err(PolylineError::Overflow(start));
        }
        *offset += 1;

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

fn encode_value(value: i64, out: &mut String) {
    let mut shifted = if value < 0 { !(value << 1) } else { value << 1 };
    while shifted >= 0x20 {
        out.push((((shifted & 0x1f) | 0x20) as u8 + 63) as char);
        shifted >>= 5;
    }
    out.push((shifted as u8 + 63) as char);
}
