//! Place details endpoint, restricted to contact fields.

use async_trait::async_trait;

use super::GoogleMapsClient;
use crate::error::PlacesError;
use crate::ports::EnrichmentProvider;
use crate::types::{PlaceContact, PlaceDetailsResponse};

const ENDPOINT: &str = "place/details/json";

const CONTACT_FIELDS: &str = "formatted_phone_number,international_phone_number,website";

#[async_trait]
impl EnrichmentProvider for GoogleMapsClient {
    async fn place_contact(&self, place_id: &str) -> Result<PlaceContact, PlacesError> {
        let url = self.build_url(ENDPOINT, &[("place_id", place_id), ("fields", CONTACT_FIELDS)])?;
        let body: PlaceDetailsResponse = self.get_json(url, ENDPOINT).await?;
        Self::check_status(ENDPOINT, &body.status, body.error_message.as_deref())?;
        Ok(body.result.unwrap_or_default())
    }
}
