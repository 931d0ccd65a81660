//! Nearby search endpoint.

use async_trait::async_trait;
use geofence_core::{map_url, BusinessRecord};

use super::GoogleMapsClient;
use crate::error::PlacesError;
use crate::ports::PlacesProvider;
use crate::types::{NearbyPage, NearbyQuery, NearbySearchResponse, PlaceResult};

const ENDPOINT: &str = "place/nearbysearch/json";

/// Sentinel primary category for places reported without any type.
pub const UNKNOWN_CATEGORY: &str = "unknown";

#[async_trait]
impl PlacesProvider for GoogleMapsClient {
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::UnexpectedStatus`] on a non-2xx HTTP status.
    /// - [`PlacesError::Api`] when the envelope status is not `OK` / `ZERO_RESULTS`.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    async fn nearby_page(&self, query: &NearbyQuery) -> Result<NearbyPage, PlacesError> {
        if query.page_token.is_some() && !self.page_token_delay.is_zero() {
            tokio::time::sleep(self.page_token_delay).await;
        }

        let location = query.location.to_string();
        let radius = query.radius_meters.to_string();
        let mut params = vec![("location", location.as_str()), ("radius", radius.as_str())];
        if let Some(hint) = query.type_hint.as_deref() {
            params.push(("type", hint));
        }
        if let Some(token) = query.page_token.as_deref() {
            params.push(("pagetoken", token));
        }

        let url = self.build_url(ENDPOINT, &params)?;
        let body: NearbySearchResponse = self.get_json(url, ENDPOINT).await?;
        Self::check_status(ENDPOINT, &body.status, body.error_message.as_deref())?;

        tracing::debug!(
            results = body.results.len(),
            has_next = body.next_page_token.is_some(),
            "nearby search page received"
        );

        Ok(NearbyPage {
            results: body.results.into_iter().map(place_to_record).collect(),
            next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

/// Converts a raw search result into a [`BusinessRecord`].
///
/// Address prefers `formatted_address`, then `vicinity`, then `""`. The
/// primary category is the first type, or [`UNKNOWN_CATEGORY`] when the
/// place has none.
#[must_use]
pub fn place_to_record(place: PlaceResult) -> BusinessRecord {
    let address = place
        .formatted_address
        .or(place.vicinity)
        .unwrap_or_default();
    let types = place.types.unwrap_or_default();
    let primary_category = types
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_owned());
    let coordinates = place.geometry.location;

    BusinessRecord {
        place_id: place.place_id,
        name: place.name,
        address,
        coordinates,
        primary_category,
        types,
        map_url: map_url(coordinates),
        formatted_phone_number: None,
        international_phone_number: None,
        website: None,
    }
}
