// Provider ports.
//
// The pipeline only talks to these traits. `GoogleMapsClient` implements all
// three against the live web services; `fixtures` implements them from
// canned JSON for test mode.

use std::sync::Arc;

use async_trait::async_trait;
use geofence_core::Coordinate;

use crate::error::PlacesError;
use crate::types::{NearbyPage, NearbyQuery, OptimizedRoute, PlaceContact};

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Fetches a single page of nearby results.
    async fn nearby_page(&self, query: &NearbyQuery) -> Result<NearbyPage, PlacesError>;
}

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Requests an optimized closed loop `origin → waypoints → origin`.
    async fn optimize_round_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<OptimizedRoute, PlacesError>;
}

#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Looks up phone numbers and website for a place.
    async fn place_contact(&self, place_id: &str) -> Result<PlaceContact, PlacesError>;
}

#[async_trait]
impl<T: PlacesProvider + ?Sized> PlacesProvider for Arc<T> {
    async fn nearby_page(&self, query: &NearbyQuery) -> Result<NearbyPage, PlacesError> {
        (**self).nearby_page(query).await
    }
}

#[async_trait]
impl<T: DirectionsProvider + ?Sized> DirectionsProvider for Arc<T> {
    async fn optimize_round_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<OptimizedRoute, PlacesError> {
        (**self).optimize_round_trip(origin, waypoints).await
    }
}

#[async_trait]
impl<T: EnrichmentProvider + ?Sized> EnrichmentProvider for Arc<T> {
    async fn place_contact(&self, place_id: &str) -> Result<PlaceContact, PlacesError> {
        (**self).place_contact(place_id).await
    }
}
