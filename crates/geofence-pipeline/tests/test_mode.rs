//! Fixture-driven runs through `RoutePlanner::from_config`, with file exports
//! in a temp dir and Slack delivery against a wiremock webhook.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use geofence_core::{AppConfig, Cell, Environment};
use geofence_pipeline::{
    DeliveryOutcome, DeliveryTarget, OutputTarget, PipelineError, PlanRequest, RoutePlanner,
    SinkKind, NO_EMAIL_TRANSPORT,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo_fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn config(export_dir: &Path, slack_webhook_url: Option<String>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        log_level: "debug".to_owned(),
        places_api_key: None,
        directions_api_key: None,
        maps_api_key: None,
        basic_auth_password: None,
        slack_webhook_url,
        export_dir: export_dir.to_path_buf(),
        fixtures_dir: repo_fixtures(),
        category_synonyms_path: None,
        request_timeout_secs: 5,
        max_retries: 0,
        retry_backoff_base_ms: 0,
        enrich_delay_ms: 0,
    }
}

fn test_request() -> PlanRequest {
    PlanRequest {
        test_mode: true,
        ..PlanRequest::new("37.42,-122.08")
    }
}

#[tokio::test]
async fn fixture_run_orders_enriches_and_exports() {
    let tmp = tempfile::tempdir().unwrap();
    let planner = RoutePlanner::from_config(&config(tmp.path(), None)).unwrap();
    assert!(!planner.has_live_providers());

    let request = PlanRequest {
        output: OutputTarget::Both,
        ..test_request()
    };
    let outcome = planner.plan(&request).await.unwrap();

    let ids: Vec<&str> = outcome
        .route
        .stops
        .iter()
        .map(|s| s.business.place_id.as_str())
        .collect();
    assert_eq!(ids, vec!["C", "A", "D", "B"]);
    assert_eq!(outcome.route.total_distance_meters, 5300);
    assert_eq!(outcome.route.total_duration_seconds, 950);

    let rows = &outcome.preview.rows;
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], Cell::Integer(1));
    assert_eq!(rows[1][3], Cell::Text("(650) 555-0101".to_owned()));
    assert_eq!(rows[0][3], Cell::Text(String::new()));

    let csv_link = outcome.links.csv_url.as_deref().unwrap();
    let csv = std::fs::read_to_string(csv_link.trim_start_matches("file://")).unwrap();
    assert!(csv.starts_with(
        "#,Business Name,Address,Phone,Website,Map URL,ETA to Next,Distance to Next\n"
    ));
    assert!(csv.contains("\"300 Charleston Rd, Mountain View, CA 94043, USA\""));
    assert!(outcome.links.sheet_url.as_deref().unwrap().ends_with(".tsv"));
}

#[tokio::test]
async fn fixture_run_with_exclusions_falls_back_to_identity_order() {
    let tmp = tempfile::tempdir().unwrap();
    let planner = RoutePlanner::from_config(&config(tmp.path(), None)).unwrap();

    let request = PlanRequest {
        excluded_categories: vec!["restaurant".to_owned(), "salon".to_owned()],
        ..test_request()
    };
    let outcome = planner.plan(&request).await.unwrap();

    let ids: Vec<&str> = outcome
        .route
        .stops
        .iter()
        .map(|s| s.business.place_id.as_str())
        .collect();
    assert_eq!(ids, vec!["B", "D"]);
    let numbers: Vec<u32> = outcome.route.stops.iter().map(|s| s.stop_number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn slack_delivery_posts_block_kit_payload() {
    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/route"))
        .and(body_partial_json(serde_json::json!({
            "channel": "#field-team",
            "text": "Origin: 37.42,-122.08 • Radius: 3 mi • Stops: 4",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&webhook)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let url = format!("{}/hooks/route", webhook.uri());
    let planner = RoutePlanner::from_config(&config(tmp.path(), Some(url))).unwrap();

    let request = PlanRequest {
        radius_miles: Some(3.0),
        deliver: DeliveryTarget::Slack,
        slack_recipient: Some("#field-team".to_owned()),
        ..test_request()
    };
    let outcome = planner.plan(&request).await.unwrap();

    let slack = outcome
        .deliveries
        .iter()
        .find(|d| d.sink == SinkKind::Slack)
        .unwrap();
    assert_eq!(slack.outcome, DeliveryOutcome::Delivered { link: None });
}

#[tokio::test]
async fn slack_error_is_reported_not_raised() {
    let webhook = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&webhook)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let planner = RoutePlanner::from_config(&config(tmp.path(), Some(webhook.uri()))).unwrap();
    let request = PlanRequest {
        deliver: DeliveryTarget::Slack,
        slack_recipient: Some("@sam".to_owned()),
        ..test_request()
    };
    let outcome = planner.plan(&request).await.unwrap();

    assert!(outcome.links.sheet_url.is_some());
    let slack = outcome.deliveries.last().unwrap();
    assert_eq!(slack.sink, SinkKind::Slack);
    assert!(slack.is_failed());
}

#[tokio::test]
async fn email_without_transport_is_reported_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let planner = RoutePlanner::from_config(&config(tmp.path(), None)).unwrap();
    let request = PlanRequest {
        deliver: DeliveryTarget::Email,
        email: Some("ops@example.com".to_owned()),
        ..test_request()
    };
    let outcome = planner.plan(&request).await.unwrap();

    let email = outcome.deliveries.last().unwrap();
    assert_eq!(email.sink, SinkKind::Email);
    assert_eq!(
        email.outcome,
        DeliveryOutcome::Skipped {
            reason: NO_EMAIL_TRANSPORT.to_owned()
        }
    );
}

#[tokio::test]
async fn live_run_without_keys_is_a_configuration_error() {
    let tmp = tempfile::tempdir().unwrap();
    let planner = RoutePlanner::from_config(&config(tmp.path(), None)).unwrap();
    let err = planner
        .plan(&PlanRequest::new("37.42,-122.08"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
}

#[tokio::test]
async fn missing_fixture_dir_is_a_configuration_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = config(tmp.path(), None);
    cfg.fixtures_dir = tmp.path().join("does-not-exist");
    let planner = RoutePlanner::from_config(&cfg).unwrap();
    let err = planner.plan(&test_request()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Configuration(_)));
}
