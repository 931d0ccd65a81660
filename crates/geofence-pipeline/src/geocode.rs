//! Origin resolution.

use async_trait::async_trait;
use geofence_core::{parse_lat_lng, Origin};

use crate::error::PipelineError;

/// Turns caller location text into an origin.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, text: &str) -> Result<Origin, PipelineError>;
}

/// Accepts only `"lat,lng"` text. There is no address backend, so anything
/// else is a configuration error rather than bad input.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoordinateGeocoder;

#[async_trait]
impl Geocoder for CoordinateGeocoder {
    async fn resolve(&self, text: &str) -> Result<Origin, PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PipelineError::Validation("location is required".to_owned()));
        }
        match parse_lat_lng(text) {
            Some(coordinate) => Ok(Origin::new(coordinate, Some(text.to_owned()))),
            None => Err(PipelineError::Configuration(format!(
                "no geocoding backend configured; expected \"lat,lng\" but got {text:?}"
            ))),
        }
    }
}
