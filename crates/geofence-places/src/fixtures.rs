//! Deterministic providers for test mode and unit tests.
//!
//! Each fixture records what it was asked so tests can assert on the calls.
//! [`FixtureSet::load`] reads provider-shaped JSON from a directory:
//!
//! - `nearby_*.json`: nearby-search responses, served in file-name order.
//! - `directions.json`: one directions response.
//! - `details.json` (optional): `{ "<place_id>": { "website": ... } }`.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use geofence_core::Coordinate;

use crate::client::{optimized_from_response, place_to_record};
use crate::error::PlacesError;
use crate::ports::{DirectionsProvider, EnrichmentProvider, PlacesProvider};
use crate::types::{
    DirectionsResponse, NearbyPage, NearbyQuery, NearbySearchResponse, OptimizedRoute,
    PlaceContact,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serves queued pages in call order. Once the queue is empty every call
/// returns an empty last page.
pub struct FixturePlaces {
    pages: Mutex<VecDeque<NearbyPage>>,
    calls: Mutex<Vec<NearbyQuery>>,
    fail_on_call: Option<usize>,
}

impl FixturePlaces {
    pub fn new(pages: Vec<NearbyPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            calls: Mutex::new(Vec::new()),
            fail_on_call: None,
        }
    }

    /// Makes the `n`th call (1-based) fail with [`PlacesError::Fixture`].
    #[must_use]
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<NearbyQuery> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PlacesProvider for FixturePlaces {
    async fn nearby_page(&self, query: &NearbyQuery) -> Result<NearbyPage, PlacesError> {
        let call_number = {
            let mut calls = lock(&self.calls);
            calls.push(query.clone());
            calls.len()
        };
        if self.fail_on_call == Some(call_number) {
            return Err(PlacesError::Fixture(format!(
                "nearby call {call_number} configured to fail"
            )));
        }
        Ok(lock(&self.pages).pop_front().unwrap_or_default())
    }
}

/// Returns one configured answer for every directions request.
pub struct FixtureDirections {
    route: OptimizedRoute,
    failure: Option<String>,
    lenient: bool,
    calls: Mutex<Vec<(Coordinate, Vec<Coordinate>)>>,
}

impl FixtureDirections {
    /// Answers verbatim with `route`.
    pub fn new(route: OptimizedRoute) -> Self {
        Self {
            route,
            failure: None,
            lenient: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with a [`PlacesError::Api`] carrying `status`.
    pub fn failing(status: &str) -> Self {
        let mut fixture = Self::new(OptimizedRoute::default());
        fixture.failure = Some(status.to_owned());
        fixture
    }

    /// Drops the configured order when its length does not match the
    /// request, so a single file works for any filtered stop count.
    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub fn calls(&self) -> Vec<(Coordinate, Vec<Coordinate>)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl DirectionsProvider for FixtureDirections {
    async fn optimize_round_trip(
        &self,
        origin: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<OptimizedRoute, PlacesError> {
        lock(&self.calls).push((origin, waypoints.to_vec()));
        if let Some(status) = &self.failure {
            return Err(PlacesError::Api {
                endpoint: "directions/json".to_owned(),
                status: status.clone(),
                message: "fixture failure".to_owned(),
            });
        }

        let mut route = self.route.clone();
        if self.lenient
            && route
                .waypoint_order
                .as_ref()
                .is_some_and(|order| order.len() != waypoints.len())
        {
            tracing::debug!(
                waypoints = waypoints.len(),
                "fixture waypoint order does not fit request; using identity"
            );
            route.waypoint_order = None;
        }
        Ok(route)
    }
}

/// Contact details keyed by place id. Unknown ids fail the lookup.
pub struct FixtureContacts {
    contacts: HashMap<String, PlaceContact>,
}

impl FixtureContacts {
    pub fn new<I, K>(contacts: I) -> Self
    where
        I: IntoIterator<Item = (K, PlaceContact)>,
        K: Into<String>,
    {
        Self {
            contacts: contacts.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[async_trait]
impl EnrichmentProvider for FixtureContacts {
    async fn place_contact(&self, place_id: &str) -> Result<PlaceContact, PlacesError> {
        self.contacts
            .get(place_id)
            .cloned()
            .ok_or_else(|| PlacesError::Fixture(format!("no contact fixture for {place_id}")))
    }
}

/// Every provider needed for one test-mode run.
pub struct FixtureSet {
    pub places: FixturePlaces,
    pub directions: FixtureDirections,
    pub contacts: Option<FixtureContacts>,
}

impl FixtureSet {
    /// Loads fixtures from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Fixture`] when the directory cannot be read,
    /// has no `nearby_*.json` or `directions.json`, or a file is not valid
    /// provider JSON.
    pub fn load(dir: &Path) -> Result<Self, PlacesError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            PlacesError::Fixture(format!("cannot read fixture dir {}: {e}", dir.display()))
        })?;

        let mut nearby_files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("nearby_") && n.ends_with(".json"))
            })
            .collect();
        nearby_files.sort_by_cached_key(|path| page_sort_key(path));
        if nearby_files.is_empty() {
            return Err(PlacesError::Fixture(format!(
                "no nearby_*.json files in {}",
                dir.display()
            )));
        }

        let pages = nearby_files
            .iter()
            .map(|path| {
                let body: NearbySearchResponse = read_json(path)?;
                Ok(NearbyPage {
                    results: body.results.into_iter().map(place_to_record).collect(),
                    next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
                })
            })
            .collect::<Result<Vec<_>, PlacesError>>()?;

        let directions: DirectionsResponse = read_json(&dir.join("directions.json"))?;

        let details_path = dir.join("details.json");
        let contacts = if details_path.exists() {
            let map: HashMap<String, PlaceContact> = read_json(&details_path)?;
            Some(FixtureContacts::new(map))
        } else {
            None
        };

        tracing::info!(
            dir = %dir.display(),
            pages = pages.len(),
            has_contacts = contacts.is_some(),
            "loaded provider fixtures"
        );

        Ok(Self {
            places: FixturePlaces::new(pages),
            directions: FixtureDirections::new(optimized_from_response(directions)).lenient(),
            contacts,
        })
    }
}

/// `nearby_<n>.json` sorts by `n` numerically; names without a number
/// come last, by name.
fn page_sort_key(path: &Path) -> (u64, String) {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_owned();
    let index = name
        .strip_prefix("nearby_")
        .and_then(|rest| rest.strip_suffix(".json"))
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(u64::MAX);
    (index, name)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PlacesError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| PlacesError::Fixture(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| PlacesError::Fixture(format!("invalid JSON in {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_ONE: &str = r#"{
        "status": "OK",
        "next_page_token": "tok",
        "results": [
            {"place_id": "A", "name": "Alpha Diner", "vicinity": "1 Main St",
             "geometry": {"location": {"lat": 37.421, "lng": -122.081}},
             "types": ["restaurant", "food"]},
            {"place_id": "B", "name": "Beta Books", "vicinity": "2 Main St",
             "geometry": {"location": {"lat": 37.425, "lng": -122.079}},
             "types": ["book_store", "store"]}
        ]
    }"#;

    const PAGE_TWO: &str = r#"{
        "status": "OK",
        "results": [
            {"place_id": "A", "name": "Alpha Diner", "vicinity": "1 Main St",
             "geometry": {"location": {"lat": 37.421, "lng": -122.081}},
             "types": ["restaurant"]}
        ]
    }"#;

    const DIRECTIONS: &str = r#"{
        "status": "OK",
        "routes": [{"waypoint_order": [0], "legs": [
            {"distance": {"text": "1 km", "value": 1000},
             "duration": {"text": "2 mins", "value": 120}}
        ]}]
    }"#;

    fn write_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            std::fs::write(dir.path().join(name), body).unwrap();
        }
        dir
    }

    fn query(token: Option<&str>) -> NearbyQuery {
        NearbyQuery {
            location: Coordinate {
                lat: 37.42,
                lng: -122.08,
            },
            radius_meters: 8047,
            type_hint: None,
            page_token: token.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn load_serves_pages_in_file_order() {
        let dir = write_dir(&[
            ("nearby_2.json", PAGE_TWO),
            ("nearby_1.json", PAGE_ONE),
            ("directions.json", DIRECTIONS),
        ]);
        let set = FixtureSet::load(dir.path()).unwrap();

        let first = set.places.nearby_page(&query(None)).await.unwrap();
        assert_eq!(first.results.len(), 2);
        assert_eq!(first.next_page_token.as_deref(), Some("tok"));
        assert_eq!(first.results[0].primary_category, "restaurant");

        let second = set.places.nearby_page(&query(Some("tok"))).await.unwrap();
        assert_eq!(second.results[0].place_id, "A");
        assert!(second.next_page_token.is_none());

        let exhausted = set.places.nearby_page(&query(None)).await.unwrap();
        assert!(exhausted.results.is_empty());
        assert!(set.contacts.is_none());
    }

    #[tokio::test]
    async fn load_orders_pages_by_number_not_by_name() {
        let mut files = vec![("directions.json".to_owned(), DIRECTIONS.to_owned())];
        for n in 1..=10 {
            let body = format!(
                r#"{{"status": "OK", "results": [
                    {{"place_id": "P{n}", "name": "Place {n}", "vicinity": "",
                      "geometry": {{"location": {{"lat": 37.4, "lng": -122.0}}}},
                      "types": ["store"]}}
                ]}}"#
            );
            files.push((format!("nearby_{n}.json"), body));
        }
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(name, body)| (name.as_str(), body.as_str()))
            .collect();
        let dir = write_dir(&borrowed);
        let set = FixtureSet::load(dir.path()).unwrap();

        let mut served = Vec::new();
        for _ in 0..10 {
            let page = set.places.nearby_page(&query(None)).await.unwrap();
            served.push(page.results[0].place_id.clone());
        }
        let expected: Vec<String> = (1..=10).map(|n| format!("P{n}")).collect();
        assert_eq!(served, expected);
    }

    #[test]
    fn page_sort_key_puts_unnumbered_names_last() {
        let mut names = vec!["nearby_extra.json", "nearby_10.json", "nearby_2.json"];
        names.sort_by_cached_key(|n| page_sort_key(Path::new(n)));
        assert_eq!(names, vec!["nearby_2.json", "nearby_10.json", "nearby_extra.json"]);
    }

    #[tokio::test]
    async fn loaded_directions_fall_back_to_identity_on_size_mismatch() {
        let dir = write_dir(&[("nearby_1.json", PAGE_ONE), ("directions.json", DIRECTIONS)]);
        let set = FixtureSet::load(dir.path()).unwrap();
        let wp = [
            Coordinate { lat: 1.0, lng: 1.0 },
            Coordinate { lat: 2.0, lng: 2.0 },
        ];
        let route = set
            .directions
            .optimize_round_trip(wp[0], &wp)
            .await
            .unwrap();
        assert_eq!(route.waypoint_order, None);
        assert_eq!(route.legs.len(), 1);
    }

    #[tokio::test]
    async fn load_reads_optional_details() {
        let dir = write_dir(&[
            ("nearby_1.json", PAGE_ONE),
            ("directions.json", DIRECTIONS),
            ("details.json", r#"{"B": {"website": "https://beta.test"}}"#),
        ]);
        let set = FixtureSet::load(dir.path()).unwrap();
        let contacts = set.contacts.unwrap();
        let b = contacts.place_contact("B").await.unwrap();
        assert_eq!(b.website.as_deref(), Some("https://beta.test"));
        assert!(contacts.place_contact("A").await.is_err());
    }

    #[test]
    fn load_requires_nearby_files() {
        let dir = write_dir(&[("directions.json", DIRECTIONS)]);
        let err = FixtureSet::load(dir.path()).err().unwrap();
        assert!(err.to_string().contains("nearby_"), "{err}");
    }

    #[test]
    fn load_reports_invalid_json() {
        let dir = write_dir(&[("nearby_1.json", "{not json"), ("directions.json", DIRECTIONS)]);
        let err = FixtureSet::load(dir.path()).err().unwrap();
        assert!(matches!(err, PlacesError::Fixture(_)));
    }

    #[tokio::test]
    async fn failing_directions_report_api_error() {
        let d = FixtureDirections::failing("OVER_QUERY_LIMIT");
        let c = Coordinate { lat: 0.0, lng: 0.0 };
        let err = d.optimize_round_trip(c, &[c]).await.unwrap_err();
        assert!(matches!(err, PlacesError::Api { ref status, .. } if status == "OVER_QUERY_LIMIT"));
        assert_eq!(d.call_count(), 1);
    }
}
