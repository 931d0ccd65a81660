//! Radius math, coordinate parsing, and map links.

use crate::types::Coordinate;

pub const METERS_PER_MILE: f64 = 1609.34;
pub const MIN_RADIUS_MILES: f64 = 2.0;
pub const MAX_RADIUS_MILES: f64 = 10.0;
pub const DEFAULT_RADIUS_MILES: f64 = 5.0;

/// Converts a search radius to whole meters, rounding half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn radius_miles_to_meters(miles: f64) -> u32 {
    (miles * METERS_PER_MILE).round().max(0.0) as u32
}

/// Applies the caller-facing default and the [2, 10] mile bounds.
///
/// A non-finite radius is treated as absent.
#[must_use]
pub fn clamp_radius_miles(radius: Option<f64>) -> f64 {
    radius
        .filter(|r| r.is_finite())
        .unwrap_or(DEFAULT_RADIUS_MILES)
        .clamp(MIN_RADIUS_MILES, MAX_RADIUS_MILES)
}

/// Parses `"lat,lng"` text. Exactly two comma-separated finite numbers,
/// whitespace around each allowed.
#[must_use]
pub fn parse_lat_lng(input: &str) -> Option<Coordinate> {
    let mut parts = input.split(',').map(str::trim);
    let lat = parts.next()?.parse::<f64>().ok()?;
    let lng = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Coordinate::new(lat, lng).ok()
}

/// Canonical map link for a coordinate.
#[must_use]
pub fn map_url(coordinate: Coordinate) -> String {
    format!(
        "https://maps.google.com/?q={},{}",
        coordinate.lat, coordinate.lng
    )
}
