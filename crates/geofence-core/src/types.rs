//! Value types passed between pipeline stages.
//!
//! Field names serialize in camelCase so the JSON shape matches what the
//! browser client and the export endpoint exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A WGS84 point. Both components must be finite; range is not checked here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting NaN and infinities.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NonFiniteCoordinate`] when either component is not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let c = Self { lat, lng };
        if c.is_finite() {
            Ok(c)
        } else {
            Err(CoreError::NonFiniteCoordinate { lat, lng })
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Route origin: a resolved coordinate plus the label it was resolved from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Origin {
    #[must_use]
    pub fn new(coordinate: Coordinate, label: Option<String>) -> Self {
        Self { coordinate, label }
    }

    /// The label when present, otherwise `"lat,lng"`.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.coordinate.to_string())
    }
}

impl From<Coordinate> for Origin {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            label: None,
        }
    }
}

/// A business discovered by nearby search.
///
/// `place_id` is the dedup key. The optional contact fields are only ever
/// filled in by enrichment; their absence is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub coordinates: Coordinate,
    pub primary_category: String,
    /// Provider order, duplicates kept.
    pub types: Vec<String>,
    pub map_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub international_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl BusinessRecord {
    /// Preferred display phone: formatted, then international.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.formatted_phone_number
            .as_deref()
            .or(self.international_phone_number.as_deref())
    }
}

/// A business placed at a 1-based position in a finalized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    #[serde(flatten)]
    pub business: BusinessRecord,
    pub stop_number: u32,
}

/// An ordered round trip from `origin` through `stops` and back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteList {
    pub origin: Origin,
    pub stops: Vec<Stop>,
    pub total_distance_meters: u64,
    pub total_duration_seconds: u64,
}

impl RouteList {
    /// The route with no stops and zero totals.
    #[must_use]
    pub fn empty(origin: Origin) -> Self {
        Self {
            origin,
            stops: Vec::new(),
            total_distance_meters: 0,
            total_duration_seconds: 0,
        }
    }
}

/// One table cell. Numbers stay numbers so spreadsheet sinks keep their type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(n) => write!(f, "{n}"),
            Cell::Float(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Integer(i64::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// True when every row has exactly one cell per header.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.headers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> BusinessRecord {
        BusinessRecord {
            place_id: id.to_owned(),
            name: format!("Business {id}"),
            address: "1 Main St".to_owned(),
            coordinates: Coordinate {
                lat: 37.42,
                lng: -122.08,
            },
            primary_category: "store".to_owned(),
            types: vec!["store".to_owned()],
            map_url: "https://maps.google.com/?q=37.42,-122.08".to_owned(),
            formatted_phone_number: None,
            international_phone_number: None,
            website: None,
        }
    }

    #[test]
    fn coordinate_new_rejects_nan() {
        assert!(Coordinate::new(f64::NAN, 1.0).is_err());
        assert!(Coordinate::new(1.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(37.42, -122.08).is_ok());
    }

    #[test]
    fn origin_display_label_falls_back_to_coordinates() {
        let origin = Origin::from(Coordinate {
            lat: 37.42,
            lng: -122.08,
        });
        assert_eq!(origin.display_label(), "37.42,-122.08");

        let labelled = Origin::new(origin.coordinate, Some("HQ".to_owned()));
        assert_eq!(labelled.display_label(), "HQ");
    }

    #[test]
    fn phone_prefers_formatted_number() {
        let mut r = record("A");
        assert_eq!(r.phone(), None);
        r.international_phone_number = Some("+1 650-555-0100".to_owned());
        assert_eq!(r.phone(), Some("+1 650-555-0100"));
        r.formatted_phone_number = Some("(650) 555-0100".to_owned());
        assert_eq!(r.phone(), Some("(650) 555-0100"));
    }

    #[test]
    fn stop_serializes_flat_with_camel_case_keys() {
        let stop = Stop {
            business: record("A"),
            stop_number: 1,
        };
        let json = serde_json::to_value(&stop).expect("serialize stop");
        assert_eq!(json["placeId"], "A");
        assert_eq!(json["stopNumber"], 1);
        assert_eq!(json["mapUrl"], "https://maps.google.com/?q=37.42,-122.08");
        assert!(json.get("website").is_none());
    }

    #[test]
    fn cell_deserializes_numbers_and_text() {
        let row: Vec<Cell> = serde_json::from_str(r#"[1, 2.5, "x"]"#).expect("parse row");
        assert_eq!(
            row,
            vec![Cell::Integer(1), Cell::Float(2.5), Cell::Text("x".to_owned())]
        );
        assert_eq!(row[0].to_string(), "1");
        assert_eq!(row[2].to_string(), "x");
    }

    #[test]
    fn table_is_rectangular_detects_ragged_rows() {
        let mut table = Table {
            headers: vec!["a".to_owned(), "b".to_owned()],
            rows: vec![vec![Cell::from("1"), Cell::from("2")]],
        };
        assert!(table.is_rectangular());
        table.rows.push(vec![Cell::from("only one")]);
        assert!(!table.is_rectangular());
    }
}
