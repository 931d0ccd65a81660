//! Provider access for the geofence route planner.
//!
//! Provides:
//! - The provider ports ([`PlacesProvider`], [`DirectionsProvider`],
//!   [`EnrichmentProvider`]) and their Google Maps implementation.
//! - Paginated, deduplicating business discovery.
//! - Route ordering from a provider-optimized waypoint permutation.
//! - Contact enrichment, opt-in back-off, and deterministic fixtures.

pub mod client;
pub mod discovery;
pub mod enrich;
pub mod error;
pub mod fixtures;
pub mod ports;
pub mod retry;
pub mod route;
pub mod types;

pub use client::{place_to_record, GoogleMapsClient, UNKNOWN_CATEGORY};
pub use discovery::{discover, DEFAULT_MAX_PAGES};
pub use enrich::enrich_stops;
pub use error::PlacesError;
pub use fixtures::{FixtureContacts, FixtureDirections, FixturePlaces, FixtureSet};
pub use ports::{DirectionsProvider, EnrichmentProvider, PlacesProvider};
pub use retry::{backoff_delay, is_retriable, retry_with_backoff, RetryPolicy, Retrying};
pub use route::{apply_waypoint_order, order_route};
pub use types::{LegSummary, NearbyPage, NearbyQuery, OptimizedRoute, PlaceContact};
