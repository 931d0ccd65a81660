//! Paginated nearby discovery with cross-page deduplication.

use std::collections::HashSet;

use geofence_core::{radius_miles_to_meters, BusinessRecord, Coordinate};

use crate::error::PlacesError;
use crate::ports::PlacesProvider;
use crate::types::NearbyQuery;

/// Pages fetched per discovery run unless the caller says otherwise.
pub const DEFAULT_MAX_PAGES: u32 = 3;

/// Walks nearby-search pages around `origin` and returns every business once.
///
/// Pages are requested one after another because each continuation token
/// comes from the previous response. The walk stops when a page carries no
/// token or after `max_pages` pages, whichever comes first. A `place_id`
/// seen on an earlier page (or earlier on the same page) is dropped, so the
/// first occurrence wins and keeps its position.
///
/// # Errors
///
/// Returns the first [`PlacesError`] from the provider. Pages fetched before
/// the failure are discarded.
pub async fn discover<P>(
    provider: &P,
    origin: Coordinate,
    radius_miles: f64,
    max_pages: u32,
    type_hint: Option<&str>,
) -> Result<Vec<BusinessRecord>, PlacesError>
where
    P: PlacesProvider + ?Sized,
{
    let radius_meters = radius_miles_to_meters(radius_miles);
    let mut seen: HashSet<String> = HashSet::new();
    let mut records: Vec<BusinessRecord> = Vec::new();
    let mut page_token: Option<String> = None;

    for page_number in 1..=max_pages {
        let query = NearbyQuery {
            location: origin,
            radius_meters,
            type_hint: type_hint.map(str::to_owned),
            page_token: page_token.take(),
        };
        let page = provider.nearby_page(&query).await?;

        let received = page.results.len();
        let before = records.len();
        for record in page.results {
            if seen.insert(record.place_id.clone()) {
                records.push(record);
            }
        }
        tracing::debug!(
            page = page_number,
            received,
            kept = records.len() - before,
            "discovery page processed"
        );

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    tracing::info!(
        origin = %origin,
        radius_meters,
        businesses = records.len(),
        "discovery complete"
    );
    Ok(records)
}
