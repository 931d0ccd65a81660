//! Route ordering: applies a provider-chosen visiting order to the stops.

use geofence_core::{BusinessRecord, Coordinate, Origin, RouteList, Stop};

use crate::error::PlacesError;
use crate::ports::DirectionsProvider;
use crate::types::LegSummary;

/// Orders `stops` as a closed loop from `origin` back to `origin`.
///
/// An empty stop list returns an empty route with zero totals and never
/// reaches the provider. Otherwise the provider's permutation is applied
/// as-is (identity when it sends none) and leg figures are summed, counting
/// missing values as zero.
///
/// # Errors
///
/// - Any [`PlacesError`] from the provider.
/// - [`PlacesError::InvalidWaypointOrder`] if the returned order is not a
///   permutation of the submitted stops.
pub async fn order_route<D>(
    provider: &D,
    origin: Origin,
    stops: Vec<BusinessRecord>,
) -> Result<RouteList, PlacesError>
where
    D: DirectionsProvider + ?Sized,
{
    if stops.is_empty() {
        return Ok(RouteList::empty(origin));
    }

    let waypoints: Vec<Coordinate> = stops.iter().map(|s| s.coordinates).collect();
    let optimized = provider
        .optimize_round_trip(origin.coordinate, &waypoints)
        .await?;

    let (total_distance_meters, total_duration_seconds) = sum_legs(&optimized.legs);
    let stops = apply_waypoint_order(stops, optimized.waypoint_order.as_deref())?;

    tracing::info!(
        stops = stops.len(),
        total_distance_meters,
        total_duration_seconds,
        "route ordered"
    );

    Ok(RouteList {
        origin,
        stops,
        total_distance_meters,
        total_duration_seconds,
    })
}

/// Returns `records[order[i]]` numbered `i + 1`, or the input order when
/// `order` is `None`.
///
/// # Errors
///
/// Returns [`PlacesError::InvalidWaypointOrder`] when `order` has the wrong
/// length, an out-of-range index, or a repeated index.
pub fn apply_waypoint_order(
    records: Vec<BusinessRecord>,
    order: Option<&[usize]>,
) -> Result<Vec<Stop>, PlacesError> {
    let Some(order) = order else {
        return Ok(number_stops(records));
    };

    let waypoints = records.len();
    let invalid = || PlacesError::InvalidWaypointOrder {
        order: order.to_vec(),
        waypoints,
    };
    if order.len() != waypoints {
        return Err(invalid());
    }

    let mut slots: Vec<Option<BusinessRecord>> = records.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(order.len());
    for &index in order {
        let record = slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(&invalid)?;
        ordered.push(record);
    }
    Ok(number_stops(ordered))
}

fn number_stops(records: Vec<BusinessRecord>) -> Vec<Stop> {
    records
        .into_iter()
        .zip(1u32..)
        .map(|(business, stop_number)| Stop {
            business,
            stop_number,
        })
        .collect()
}

fn sum_legs(legs: &[LegSummary]) -> (u64, u64) {
    legs.iter().fold((0u64, 0u64), |(distance, duration), leg| {
        (
            distance.saturating_add(leg.distance_meters.unwrap_or(0)),
            duration.saturating_add(leg.duration_seconds.unwrap_or(0)),
        )
    })
}
