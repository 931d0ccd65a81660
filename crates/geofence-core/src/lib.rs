//! Domain model and pure pipeline stages for the geofence route planner.
//!
//! Everything in this crate is free of I/O except configuration loading:
//! coordinates and radius math, category matching and filtering, and the
//! route → table projection.

pub mod app_config;
pub mod categories;
pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use categories::{filter_by_category, matches_excluded, normalize_category, CategorySynonyms};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use format::{format_route, TABLE_HEADERS};
pub use geo::{
    clamp_radius_miles, map_url, parse_lat_lng, radius_miles_to_meters, DEFAULT_RADIUS_MILES,
    MAX_RADIUS_MILES, METERS_PER_MILE, MIN_RADIUS_MILES,
};
pub use types::{BusinessRecord, Cell, Coordinate, Origin, RouteList, Stop, Table};
