//! Contact-detail enrichment for already ordered stops.

use std::time::Duration;

use geofence_core::Stop;

use crate::ports::EnrichmentProvider;
use crate::types::PlaceContact;

/// Attaches phone numbers and website to each stop, in place.
///
/// Lookups run one at a time with `delay` between them. A failed lookup is
/// logged and leaves that stop untouched; enrichment never fails the run.
/// Returns how many stops received contact details.
pub async fn enrich_stops<E>(provider: &E, stops: &mut [Stop], delay: Duration) -> usize
where
    E: EnrichmentProvider + ?Sized,
{
    let mut enriched = 0;
    for (i, stop) in stops.iter_mut().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match provider.place_contact(&stop.business.place_id).await {
            Ok(contact) => {
                if apply_contact(stop, contact) {
                    enriched += 1;
                }
            }
            Err(e) => {
                tracing::warn!(
                    place_id = %stop.business.place_id,
                    error = %e,
                    "place details lookup failed; keeping stop without contact info"
                );
            }
        }
    }
    tracing::debug!(enriched, total = stops.len(), "enrichment complete");
    enriched
}

/// Copies the non-empty fields of `contact` onto the stop.
fn apply_contact(stop: &mut Stop, contact: PlaceContact) -> bool {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let PlaceContact {
        formatted_phone_number,
        international_phone_number,
        website,
    } = contact;

    let business = &mut stop.business;
    let mut changed = false;
    if let Some(v) = non_empty(formatted_phone_number) {
        business.formatted_phone_number = Some(v);
        changed = true;
    }
    if let Some(v) = non_empty(international_phone_number) {
        business.international_phone_number = Some(v);
        changed = true;
    }
    if let Some(v) = non_empty(website) {
        business.website = Some(v);
        changed = true;
    }
    changed
}
