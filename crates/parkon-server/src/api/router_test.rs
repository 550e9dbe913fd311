use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use parkon_db::PoolConfig;
use parkon_search::{
    InventoryProvider, MemorySink, PgSearchSink, PostcodeClient, SearchService, SearchSink,
    TflClient, TflSettings,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const REALTIME_KEY: &str = "live-key";

/// Pool pointed at a closed port: nothing connects until a handler asks.
fn unreachable_pool() -> PgPool {
    parkon_db::connect_pool_lazy(
        "postgres://parkon@127.0.0.1:1/parkon",
        PoolConfig {
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
        },
    )
    .expect("lazy pool")
}

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Occupancy/CarPark"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "CarParks_A", "name": "Whitehall", "lat": 51.5045, "lon": -0.1260,
             "bayCount": 40, "spacesAvailable": 3}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/postcodes/SW1A(%20| )1AA$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "result": {"postcode": "SW1A 1AA", "latitude": 51.501, "longitude": -0.1416}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/postcodes/ZZ99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/postcodes/EC1A"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

fn app_with(server: &MockServer, rate_limit: RateLimitState) -> (Router, MemorySink) {
    let sink = MemorySink::new();
    let app = app_with_sink(server, rate_limit, Arc::new(sink.clone()));
    (app, sink)
}

fn app_with_sink(
    server: &MockServer,
    rate_limit: RateLimitState,
    sink: Arc<dyn SearchSink>,
) -> Router {
    let tfl = TflClient::new(&TflSettings {
        base_url: server.uri(),
        api_key: None,
        request_timeout: Duration::from_secs(5),
        deadline: Duration::from_secs(10),
        user_agent: "parkon-test/0.1".to_string(),
    })
    .expect("tfl client");
    let inventory = InventoryProvider::load(None).expect("inventory");
    let search = SearchService::new(tfl, inventory, sink, 16.0934);
    let geocoder =
        PostcodeClient::new(&server.uri(), Duration::from_secs(5), "parkon-test/0.1")
            .expect("geocoder");

    let state = AppState {
        pool: unreachable_pool(),
        search: Arc::new(search),
        geocoder: Arc::new(geocoder),
    };
    build_app(state, PrivilegeState::from_keys(REALTIME_KEY), rate_limit)
}

async fn get_json(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("bad_gateway", StatusCode::BAD_GATEWAY),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "x").into_response();
        assert_eq!(response.status(), status, "{code}");
    }
}

#[tokio::test]
async fn search_returns_envelope_with_message() {
    let server = upstream().await;
    let (app, sink) = app_with(&server, default_rate_limit_state());

    let (status, json) = get_json(
        app,
        "/api/v1/parking/search?latitude=51.5074&longitude=-0.1278&radius_km=2.0&spot_type=&max_price=",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = json["data"]["items"].as_array().expect("items array");
    assert!(!items.is_empty());
    assert!(items.len() <= 20);
    assert!(items
        .iter()
        .all(|item| item["distance_km"].as_f64().unwrap_or(f64::MAX) <= 2.0));
    let total = json["data"]["total_matched"].as_u64().expect("total");
    assert_eq!(json["message"], format!("Found {total} parking spots"));
    assert!(json["meta"]["request_id"].is_string());
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn search_succeeds_when_cache_write_fails() {
    let server = upstream().await;
    let sink = Arc::new(PgSearchSink::new(unreachable_pool()));
    let app = app_with_sink(&server, default_rate_limit_state(), sink);

    let (status, json) = get_json(
        app,
        "/api/v1/parking/search?latitude=51.5074&longitude=-0.1278&radius_km=2",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = json["data"]["items"].as_array().expect("items array");
    assert!(!items.is_empty());
    assert!(json["message"]
        .as_str()
        .is_some_and(|m| m.starts_with("Found ")));

    // Let the detached insert run into the closed port; the response is already out.
    tokio::time::sleep(Duration::from_millis(1500)).await;
}

#[tokio::test]
async fn live_occupancy_requires_realtime_token() {
    let server = upstream().await;
    let uri = "/api/v1/parking/search?latitude=51.5074&longitude=-0.1278&radius_km=1";

    let find_live = |json: &serde_json::Value| -> serde_json::Value {
        json["data"]["items"]
            .as_array()
            .and_then(|items| items.iter().find(|i| i["id"] == "tfl_CarParks_A").cloned())
            .expect("tfl car park in results")
    };

    let (app, _) = app_with(&server, default_rate_limit_state());
    let (_, anonymous) = get_json(app, uri, None).await;
    let spot = find_live(&anonymous);
    assert_eq!(spot["realtime"], false);
    assert!(spot["live_free_spaces"].is_null());

    let (app, _) = app_with(&server, default_rate_limit_state());
    let (_, standard) = get_json(app, uri, Some("not-a-realtime-key")).await;
    assert!(find_live(&standard)["live_free_spaces"].is_null());

    let (app, _) = app_with(&server, default_rate_limit_state());
    let (_, realtime) = get_json(app, uri, Some(REALTIME_KEY)).await;
    let spot = find_live(&realtime);
    assert_eq!(spot["realtime"], true);
    assert_eq!(spot["live_free_spaces"], 3);
}

#[tokio::test]
async fn search_rejects_invalid_input() {
    let server = upstream().await;
    for uri in [
        "/api/v1/parking/search?longitude=-0.1278",
        "/api/v1/parking/search?latitude=95&longitude=0",
        "/api/v1/parking/search?latitude=51.5&longitude=-0.1&spot_type=truck",
        "/api/v1/parking/search?latitude=51.5&longitude=-0.1&max_price=-1",
        "/api/v1/parking/search?latitude=51.5&longitude=-0.1&radius_miles=11",
        "/api/v1/parking/search?latitude=51.5&longitude=-0.1&radius_miles=1&radius_km=1",
    ] {
        let (app, sink) = app_with(&server, default_rate_limit_state());
        let (status, json) = get_json(app, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"]["code"], "validation_error", "{uri}");
        assert!(sink.records().is_empty());
    }
}

#[tokio::test]
async fn geocode_resolves_known_postcode() {
    let server = upstream().await;
    let (app, _) = app_with(&server, default_rate_limit_state());
    let (status, json) = get_json(app, "/api/v1/geocode?q=sw1a%201aa", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["postcode"], "SW1A 1AA");
    assert!(json["data"]["latitude"].is_f64());
}

#[tokio::test]
async fn geocode_error_statuses() {
    let server = upstream().await;
    let cases = [
        ("/api/v1/geocode", StatusCode::BAD_REQUEST, "validation_error"),
        ("/api/v1/geocode?q=%20%20", StatusCode::BAD_REQUEST, "validation_error"),
        ("/api/v1/geocode?q=ZZ99%209ZZ", StatusCode::NOT_FOUND, "not_found"),
        ("/api/v1/geocode?q=EC1A%201BB", StatusCode::BAD_GATEWAY, "bad_gateway"),
    ];
    for (uri, expected, code) in cases {
        let (app, _) = app_with(&server, default_rate_limit_state());
        let (status, json) = get_json(app, uri, None).await;
        assert_eq!(status, expected, "{uri}");
        assert_eq!(json["error"]["code"], code, "{uri}");
    }
}

#[tokio::test]
async fn request_id_is_echoed() {
    let server = upstream().await;
    let (app, _) = app_with(&server, default_rate_limit_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/geocode")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let server = upstream().await;
    let (app, _) = app_with(&server, RateLimitState::new(1, Duration::from_secs(60)));

    let (first, _) = get_json(app.clone(), "/api/v1/geocode", None).await;
    assert_eq!(first, StatusCode::BAD_REQUEST);

    let (second, json) = get_json(app, "/api/v1/geocode", None).await;
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let server = upstream().await;
    let (app, _) = app_with(&server, default_rate_limit_state());
    let (status, json) = get_json(app, "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["status"], "degraded");
    assert_eq!(json["data"]["database"], "unavailable");
}
