//! Route planning pipeline: request validation, origin resolution, the
//! discover → filter → cap → order → format run, and export/delivery sinks.

pub mod error;
pub mod geocode;
pub mod orchestrator;
pub mod request;
pub mod sinks;

pub use error::{PipelineError, SinkError};
pub use geocode::{CoordinateGeocoder, Geocoder};
pub use orchestrator::{
    route_summary, Links, PlanOutcome, Providers, RoutePlanner, MAX_PAGES, MAX_STOPS,
};
pub use request::{DeliveryTarget, OutputTarget, PlanRequest};
pub use sinks::{
    to_csv_string, CsvWriter, DeliveryOutcome, DeliveryReport, EmailNotifier, EmailTransport,
    LogTransport, Notifier, RouteMessage, SheetWriter, SinkKind, Sinks, SlackNotifier, TableSink,
    NO_EMAIL_TRANSPORT,
};
