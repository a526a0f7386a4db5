//! End-to-end tests for the traffic endpoint.
//!
//! The real `TomTomClient` talks HTTP to an in-process server standing in for
//! the flow API, so these tests need no network access or API key.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use traffic_aggregator::api::{create_router, AppState};
use traffic_aggregator::config::Config;
use traffic_aggregator::traffic::{
    sample_grid, FlowSource, GeoPoint, TomTomClient, TrafficAggregator,
};

const API_KEY: &str = "integration-key";

type Responder = Arc<dyn Fn(GeoPoint) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct Upstream {
    respond: Responder,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

async fn flow_handler(
    State(upstream): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    upstream.calls.fetch_add(1, Ordering::SeqCst);

    if params.get("key").map(String::as_str) != Some(API_KEY) {
        return (StatusCode::FORBIDDEN, "Developer Inactive".to_string());
    }

    let point = params
        .get("point")
        .and_then(|p| p.split_once(','))
        .and_then(|(lat, lon)| Some(GeoPoint::new(lat.parse().ok()?, lon.parse().ok()?)));

    let Some(point) = point else {
        return (StatusCode::BAD_REQUEST, "bad point".to_string());
    };

    if !upstream.delay.is_zero() {
        tokio::time::sleep(upstream.delay).await;
    }

    (upstream.respond)(point)
}

/// Start a fake flow API and return its URL and call counter.
async fn spawn_upstream(
    delay: Duration,
    respond: impl Fn(GeoPoint) -> (StatusCode, String) + Send + Sync + 'static,
) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = Upstream {
        respond: Arc::new(respond),
        delay,
        calls: Arc::clone(&calls),
    };

    let app = Router::new()
        .route("/flow", get(flow_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/flow", addr), calls)
}

fn flow_body(current: i64, free_flow: i64) -> String {
    json!({
        "flowSegmentData": {
            "frc": "FRC3",
            "currentSpeed": current,
            "freeFlowSpeed": free_flow,
            "confidence": 1.0
        }
    })
    .to_string()
}

fn test_config(flow_url: String) -> Config {
    Config {
        tomtom_api_key: API_KEY.to_string(),
        tomtom_flow_url: flow_url,
        http_timeout_ms: 500,
        ..Config::default()
    }
}

fn build_app(config: &Config) -> Router {
    let client = TomTomClient::new(config).unwrap();
    let aggregator = TrafficAggregator::new(Arc::new(client), config.max_concurrent_requests);
    create_router(AppState::new(aggregator, config.default_center()))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn entry_points(body: &Value) -> Vec<(f64, f64)> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|e| (e["lat"].as_f64().unwrap(), e["lon"].as_f64().unwrap()))
        .collect()
}

#[tokio::test]
async fn reports_full_grid_in_lat_major_order() {
    let (url, calls) = spawn_upstream(Duration::ZERO, |_| (StatusCode::OK, flow_body(30, 60))).await;
    let app = build_app(&test_config(url));

    let (status, body) = get_json(app, "/traffic?lat=12.97&lon=77.59").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 25);

    let expected: Vec<_> = sample_grid(GeoPoint::new(12.97, 77.59))
        .into_iter()
        .map(|p| (p.lat, p.lon))
        .collect();
    assert_eq!(entry_points(&body), expected);

    assert_eq!(
        body[0],
        json!({
            "lat": expected[0].0,
            "lon": expected[0].1,
            "traffic_level": "Medium",
            "congestion_percent": 50,
            "current_speed": 30,
            "free_flow_speed": 60
        })
    );
}

#[tokio::test]
async fn classifies_each_point_independently() {
    let center = GeoPoint::new(10.0, 20.0);
    let grid = sample_grid(center);
    let (jammed, clear) = (grid[0], grid[24]);

    let (url, _) = spawn_upstream(Duration::ZERO, move |point| {
        if point == jammed {
            (StatusCode::OK, flow_body(0, 60))
        } else if point == clear {
            (StatusCode::OK, flow_body(70, 60))
        } else {
            (StatusCode::OK, flow_body(40, 60))
        }
    })
    .await;
    let app = build_app(&test_config(url));

    let (_, body) = get_json(app, "/traffic?lat=10&lon=20").await;
    let entries = body.as_array().unwrap();

    assert_eq!(entries[0]["traffic_level"], "High");
    assert_eq!(entries[0]["congestion_percent"], 100);
    assert_eq!(entries[24]["traffic_level"], "Low");
    assert_eq!(entries[24]["congestion_percent"], 0);
    assert_eq!(entries[12]["traffic_level"], "Medium");
    assert_eq!(entries[12]["congestion_percent"], 33);
}

#[tokio::test]
async fn omits_points_without_flow_data() {
    let center = GeoPoint::new(12.9716, 77.5946);
    let grid = sample_grid(center);
    let (missing, empty, broken) = (grid[1], grid[2], grid[3]);

    let (url, _) = spawn_upstream(Duration::ZERO, move |point| {
        if point == missing {
            (StatusCode::OK, "{}".to_string())
        } else if point == empty {
            (StatusCode::OK, json!({ "flowSegmentData": {} }).to_string())
        } else if point == broken {
            (StatusCode::OK, "<html>gateway</html>".to_string())
        } else {
            (StatusCode::OK, flow_body(50, 50))
        }
    })
    .await;
    let app = build_app(&test_config(url));

    let (status, body) = get_json(app, "/traffic").await;

    assert_eq!(status, StatusCode::OK);
    let points = entry_points(&body);
    assert_eq!(points.len(), 22);
    for skipped in [missing, empty, broken] {
        assert!(!points.contains(&(skipped.lat, skipped.lon)));
    }
    assert_eq!(points[0], (grid[0].lat, grid[0].lon));
    assert_eq!(points[1], (grid[4].lat, grid[4].lon));
}

#[tokio::test]
async fn upstream_errors_degrade_to_empty_array() {
    let (url, calls) = spawn_upstream(Duration::ZERO, |_| {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
    })
    .await;
    let app = build_app(&test_config(url));

    let (status, body) = get_json(app, "/traffic?lat=1.5&lon=2.5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert_eq!(calls.load(Ordering::SeqCst), 25);
}

#[tokio::test]
async fn unreachable_upstream_degrades_to_empty_array() {
    // Grab a free port, then release it so nothing is listening there.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = build_app(&test_config(format!("http://{}/flow", addr)));

    let (status, body) = get_json(app, "/traffic").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn slow_upstream_is_cut_off_by_timeout() {
    let (url, _) = spawn_upstream(Duration::from_secs(5), |_| (StatusCode::OK, flow_body(30, 60))).await;
    let mut config = test_config(url);
    config.http_timeout_ms = 100;
    config.max_concurrent_requests = 25;
    let app = build_app(&config);

    let started = std::time::Instant::now();
    let (status, body) = get_json(app, "/traffic").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn wrong_api_key_is_a_per_point_failure() {
    let (url, _) = spawn_upstream(Duration::ZERO, |_| (StatusCode::OK, flow_body(30, 60))).await;
    let mut config = test_config(url);
    config.tomtom_api_key = "wrong".to_string();

    let client = TomTomClient::new(&config).unwrap();
    let result = client.fetch_flow(GeoPoint::new(0.0, 0.0)).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn malformed_coordinates_are_rejected_before_fan_out() {
    let (url, calls) = spawn_upstream(Duration::ZERO, |_| (StatusCode::OK, flow_body(30, 60))).await;
    let app = build_app(&test_config(url));

    let (status, body) = get_json(app, "/traffic?lat=12.97&lon=east").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_query");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_requests_have_identical_shape() {
    let (url, _) = spawn_upstream(Duration::ZERO, |point| {
        if point.lon > 77.6 {
            (StatusCode::OK, "{}".to_string())
        } else {
            (StatusCode::OK, flow_body(45, 60))
        }
    })
    .await;
    let app = build_app(&test_config(url));

    let (_, first) = get_json(app.clone(), "/traffic?lat=12.9716&lon=77.5946").await;
    let (_, second) = get_json(app, "/traffic?lat=12.9716&lon=77.5946").await;

    assert_eq!(first, second);
    assert!(!first.as_array().unwrap().is_empty());
}
