//! Route → table projection used by every export and delivery sink.

use crate::types::{Cell, RouteList, Stop, Table};

pub const TABLE_HEADERS: [&str; 8] = [
    "#",
    "Business Name",
    "Address",
    "Phone",
    "Website",
    "Map URL",
    "ETA to Next",
    "Distance to Next",
];

/// Projects a route into the fixed-column table, one row per stop in route
/// order.
///
/// Phone and website are empty unless enrichment filled them in. The two
/// per-leg columns are always empty: the route only carries aggregate totals.
#[must_use]
pub fn format_route(route: &RouteList) -> Table {
    Table {
        headers: TABLE_HEADERS.iter().map(|h| (*h).to_owned()).collect(),
        rows: route.stops.iter().map(stop_row).collect(),
    }
}

fn stop_row(stop: &Stop) -> Vec<Cell> {
    let b = &stop.business;
    vec![
        Cell::from(stop.stop_number),
        Cell::from(b.name.as_str()),
        Cell::from(b.address.as_str()),
        Cell::from(b.phone().unwrap_or_default()),
        Cell::from(b.website.as_deref().unwrap_or_default()),
        Cell::from(b.map_url.as_str()),
        Cell::from(""),
        Cell::from(""),
    ]
}
