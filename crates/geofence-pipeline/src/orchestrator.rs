//! Route planning runs: geocode, discover, filter, cap, order, enrich,
//! format, then hand the table to the sinks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use geofence_core::{
    clamp_radius_miles, format_route, AppConfig, CategorySynonyms, Origin, RouteList, Table,
};
use geofence_places::{
    discover, enrich_stops, order_route, DirectionsProvider, EnrichmentProvider, FixtureSet,
    GoogleMapsClient, PlacesProvider, RetryPolicy, Retrying, DEFAULT_MAX_PAGES,
};
use serde::Serialize;

use crate::error::{PipelineError, SinkError};
use crate::geocode::{CoordinateGeocoder, Geocoder};
use crate::request::PlanRequest;
use crate::sinks::{
    CsvWriter, DeliveryReport, EmailNotifier, Notifier, RouteMessage, SheetWriter, SinkKind,
    Sinks, SlackNotifier, TableSink,
};

/// Discovery page bound per run.
pub const MAX_PAGES: u32 = DEFAULT_MAX_PAGES;

/// Most stops handed to route ordering. Directions requests allow about 25
/// locations in total, origin and destination included.
pub const MAX_STOPS: usize = 23;

/// File stem used for CSV exports.
const CSV_TITLE: &str = "geofence_route";

/// Provider ports used by one run.
#[derive(Clone)]
pub struct Providers {
    pub places: Arc<dyn PlacesProvider>,
    pub directions: Arc<dyn DirectionsProvider>,
    /// Contact lookups; `None` leaves phone and website columns empty.
    pub enrichment: Option<Arc<dyn EnrichmentProvider>>,
}

impl Providers {
    /// Live Google Maps providers wrapped in the configured retry policy.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Configuration`] when the places or directions key
    ///   is not set.
    /// - [`PipelineError::Provider`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let places_key = config.places_api_key.as_deref().ok_or_else(|| {
            PipelineError::Configuration("GOOGLE_PLACES_API_KEY is not set".to_owned())
        })?;
        let directions_key = config.directions_api_key.as_deref().ok_or_else(|| {
            PipelineError::Configuration("GOOGLE_DIRECTIONS_API_KEY is not set".to_owned())
        })?;

        let policy = RetryPolicy::new(config.max_retries, config.retry_backoff_base_ms);
        let places = Arc::new(Retrying::new(
            GoogleMapsClient::new(places_key, config.request_timeout_secs)?,
            policy,
        ));
        let directions = Retrying::new(
            GoogleMapsClient::new(directions_key, config.request_timeout_secs)?,
            policy,
        );

        Ok(Self {
            places: places.clone(),
            directions: Arc::new(directions),
            enrichment: Some(places as Arc<dyn EnrichmentProvider>),
        })
    }

    /// Deterministic providers backed by a loaded fixture set.
    #[must_use]
    pub fn from_fixtures(set: FixtureSet) -> Self {
        Self {
            places: Arc::new(set.places),
            directions: Arc::new(set.directions),
            enrichment: set
                .contacts
                .map(|c| Arc::new(c) as Arc<dyn EnrichmentProvider>),
        }
    }
}

/// Export links produced by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_url: Option<String>,
}

/// Everything a caller gets back from [`RoutePlanner::plan`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub preview: Table,
    pub links: Links,
    pub deliveries: Vec<DeliveryReport>,
    pub route: RouteList,
}

/// Runs route planning against injected providers and sinks.
pub struct RoutePlanner {
    geocoder: Arc<dyn Geocoder>,
    live: Option<Providers>,
    fixtures_dir: Option<PathBuf>,
    synonyms: CategorySynonyms,
    sinks: Sinks,
    enrich_delay: Duration,
}

impl RoutePlanner {
    /// A planner with no providers yet. Add them with
    /// [`with_providers`](Self::with_providers) and/or
    /// [`with_fixtures_dir`](Self::with_fixtures_dir).
    pub fn new(geocoder: Arc<dyn Geocoder>, sinks: Sinks) -> Self {
        Self {
            geocoder,
            live: None,
            fixtures_dir: None,
            synonyms: CategorySynonyms::default(),
            sinks,
            enrich_delay: Duration::ZERO,
        }
    }

    /// Builds the production planner: coordinate geocoder, Google providers
    /// when both keys are set, file exports under `export_dir`, Slack when a
    /// webhook is configured, and logged email.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Configuration`] if the synonyms file cannot be loaded.
    /// - [`PipelineError::Provider`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let synonyms = match &config.category_synonyms_path {
            Some(path) => CategorySynonyms::load(path)?,
            None => CategorySynonyms::default(),
        };

        let live = match Providers::from_config(config) {
            Ok(providers) => Some(providers),
            Err(PipelineError::Configuration(reason)) => {
                tracing::warn!(%reason, "live providers disabled; only test-mode runs will work");
                None
            }
            Err(e) => return Err(e),
        };

        let slack = match config.slack_webhook_url.as_deref() {
            Some(url) => Some(Arc::new(
                SlackNotifier::new(url, config.request_timeout_secs)
                    .map_err(|e| PipelineError::Configuration(e.to_string()))?,
            ) as Arc<dyn Notifier>),
            None => None,
        };

        let sinks = Sinks {
            sheet: Arc::new(SheetWriter::new(&config.export_dir)),
            csv: Arc::new(CsvWriter::new(&config.export_dir)),
            slack,
            email: Arc::new(EmailNotifier::default()),
        };

        let mut planner = Self::new(Arc::new(CoordinateGeocoder), sinks)
            .with_synonyms(synonyms)
            .with_fixtures_dir(config.fixtures_dir.clone())
            .with_enrich_delay(Duration::from_millis(config.enrich_delay_ms));
        planner.live = live;
        Ok(planner)
    }

    #[must_use]
    pub fn with_providers(mut self, providers: Providers) -> Self {
        self.live = Some(providers);
        self
    }

    #[must_use]
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_synonyms(mut self, synonyms: CategorySynonyms) -> Self {
        self.synonyms = synonyms;
        self
    }

    #[must_use]
    pub fn with_enrich_delay(mut self, delay: Duration) -> Self {
        self.enrich_delay = delay;
        self
    }

    /// Whether non-test runs can reach live providers.
    #[must_use]
    pub fn has_live_providers(&self) -> bool {
        self.live.is_some()
    }

    /// Fixture sets are reloaded per run so page queues start fresh. The
    /// file reads run on the blocking pool.
    async fn providers(&self, test_mode: bool) -> Result<Providers, PipelineError> {
        if test_mode {
            let dir = self.fixtures_dir.clone().ok_or_else(|| {
                PipelineError::Configuration("test mode requested but no fixtures dir".to_owned())
            })?;
            let set = tokio::task::spawn_blocking(move || FixtureSet::load(&dir))
                .await
                .map_err(|e| PipelineError::Configuration(format!("fixture load aborted: {e}")))?
                .map_err(|e| PipelineError::Configuration(e.to_string()))?;
            return Ok(Providers::from_fixtures(set));
        }
        self.live.clone().ok_or_else(|| {
            PipelineError::Configuration(
                "GOOGLE_PLACES_API_KEY and GOOGLE_DIRECTIONS_API_KEY must be set".to_owned(),
            )
        })
    }

    /// Discovers, filters, caps, orders, and enriches stops around `origin`.
    ///
    /// Radius is clamped to the supported range. Zero discovered businesses,
    /// or all of them excluded, is an empty route rather than an error.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a non-finite origin.
    /// - [`PipelineError::Configuration`] when the needed providers are missing.
    /// - [`PipelineError::Provider`] when discovery or ordering fails.
    pub async fn search(
        &self,
        origin: Origin,
        radius_miles: Option<f64>,
        excluded: &[String],
        test_mode: bool,
    ) -> Result<RouteList, PipelineError> {
        if !origin.coordinate.is_finite() {
            return Err(PipelineError::Validation(
                "origin coordinates must be finite numbers".to_owned(),
            ));
        }
        let radius = clamp_radius_miles(radius_miles);
        let providers = self.providers(test_mode).await?;

        let discovered = discover(
            providers.places.as_ref(),
            origin.coordinate,
            radius,
            MAX_PAGES,
            None,
        )
        .await?;
        let discovered_count = discovered.len();

        let mut candidates = self.synonyms.filter(discovered, excluded);
        let kept = candidates.len();
        if candidates.len() > MAX_STOPS {
            tracing::info!(kept, cap = MAX_STOPS, "capping stops for route ordering");
            candidates.truncate(MAX_STOPS);
        }
        tracing::info!(
            discovered = discovered_count,
            excluded = discovered_count - kept,
            stops = candidates.len(),
            "stops selected"
        );

        let mut route = order_route(providers.directions.as_ref(), origin, candidates).await?;

        if let Some(enrichment) = &providers.enrichment {
            let delay = if test_mode {
                Duration::ZERO
            } else {
                self.enrich_delay
            };
            enrich_stops(enrichment.as_ref(), &mut route.stops, delay).await;
        }

        Ok(route)
    }

    /// Runs a full request: resolve the origin, build the route, export the
    /// table, and notify the requested recipient.
    ///
    /// Sink failures are reported in [`PlanOutcome::deliveries`] and never
    /// fail the run.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a blank location.
    /// - [`PipelineError::Configuration`] when the location cannot be
    ///   geocoded or providers are missing.
    /// - [`PipelineError::Provider`] when discovery or ordering fails.
    pub async fn plan(&self, request: &PlanRequest) -> Result<PlanOutcome, PipelineError> {
        request.validate()?;
        let radius = request.effective_radius();
        let origin = self.geocoder.resolve(&request.location).await?;
        let label = origin.display_label();

        tracing::info!(
            origin = %label,
            radius,
            output = ?request.output,
            deliver = ?request.deliver,
            test_mode = request.test_mode,
            "route plan started"
        );

        let route = self
            .search(origin, Some(radius), &request.exclusions(), request.test_mode)
            .await?;
        let table = format_route(&route);

        let mut deliveries = Vec::new();
        let mut links = Links::default();
        if request.output.wants_sheet() {
            let title = format!("Geofence Route - {label}");
            let report = export(SinkKind::Sheet, self.sinks.sheet.as_ref(), &title, &table).await;
            links.sheet_url = report.link().map(str::to_owned);
            deliveries.push(report);
        }
        if request.output.wants_csv() {
            let report = export(SinkKind::Csv, self.sinks.csv.as_ref(), CSV_TITLE, &table).await;
            links.csv_url = report.link().map(str::to_owned);
            deliveries.push(report);
        }

        let message = RouteMessage::new(
            route_summary(&label, radius, route.stops.len()),
            &table,
            links.sheet_url.clone(),
            links.csv_url.clone(),
        );
        if let Some(recipient) = request.slack_target() {
            let report = match &self.sinks.slack {
                Some(slack) => notify(SinkKind::Slack, slack.as_ref(), recipient, &message).await,
                None => DeliveryReport::skipped(SinkKind::Slack, "SLACK_WEBHOOK_URL is not set"),
            };
            deliveries.push(report);
        } else if let Some(to) = request.email_target() {
            deliveries
                .push(notify(SinkKind::Email, self.sinks.email.as_ref(), to, &message).await);
        }

        tracing::info!(
            stops = route.stops.len(),
            total_distance_meters = route.total_distance_meters,
            total_duration_seconds = route.total_duration_seconds,
            failed_sinks = deliveries.iter().filter(|d| d.is_failed()).count(),
            "route plan finished"
        );

        Ok(PlanOutcome {
            preview: table,
            links,
            deliveries,
            route,
        })
    }
}

/// `Origin: {label} • Radius: {r} mi • Stops: {n}`
#[must_use]
pub fn route_summary(label: &str, radius_miles: f64, stops: usize) -> String {
    format!("Origin: {label} • Radius: {radius_miles} mi • Stops: {stops}")
}

async fn export(kind: SinkKind, sink: &dyn TableSink, title: &str, table: &Table) -> DeliveryReport {
    match sink.write(title, table).await {
        Ok(link) => DeliveryReport::delivered(kind, Some(link)),
        Err(e) => {
            tracing::error!(sink = %kind, error = %e, "export failed");
            DeliveryReport::failed(kind, &e)
        }
    }
}

async fn notify(
    kind: SinkKind,
    notifier: &dyn Notifier,
    recipient: &str,
    message: &RouteMessage,
) -> DeliveryReport {
    match notifier.notify(recipient, message).await {
        Ok(()) => DeliveryReport::delivered(kind, None),
        Err(SinkError::NotConfigured(reason)) => {
            tracing::info!(sink = %kind, %reason, "delivery skipped");
            DeliveryReport::skipped(kind, reason)
        }
        Err(e) => {
            tracing::error!(sink = %kind, error = %e, "delivery failed");
            DeliveryReport::failed(kind, &e)
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
