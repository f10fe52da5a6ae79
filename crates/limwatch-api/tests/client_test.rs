// Integration tests for `LimiterClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use limwatch_api::{Error, LimiterClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LimiterClient) {
    let server = MockServer::start().await;
    let url = server.uri().parse().expect("mock server URI");
    let client = LimiterClient::with_client(reqwest::Client::new(), url);
    (server, client)
}

// ── Telemetry ───────────────────────────────────────────────────────

#[tokio::test]
async fn traffic_reading_decodes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/traffic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rate": 42,
            "timestamp": "2025-05-02 12:00:00",
        })))
        .mount(&server)
        .await;

    let reading = client.traffic().await.expect("traffic");
    assert_eq!(reading.rate, 42);
    assert_eq!(reading.timestamp, "2025-05-02 12:00:00");
}

#[tokio::test]
async fn traffic_missing_fields_default_to_zero() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/traffic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let reading = client.traffic().await.expect("traffic");
    assert_eq!(reading.rate, 0);
    assert_eq!(reading.timestamp, "");
}

#[tokio::test]
async fn ip_hits_preserves_server_order() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/ip-hits"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            // Hand-built body so key order is under our control.
            r#"{"ip_hits_last_minute":{"10.0.0.1":5,"127.0.0.1":5,"192.168.1.1":8}}"#,
        ))
        .mount(&server)
        .await;

    let hits = client.ip_hits().await.expect("ip hits");
    let keys: Vec<&str> = hits
        .ip_hits_last_minute
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["10.0.0.1", "127.0.0.1", "192.168.1.1"]);
}

#[tokio::test]
async fn blocked_list_normalizes_blocked_since() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/blocked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blocked_ips": [
                { "ip": "192.168.1.1", "blocked_since": "2025-05-02 00:00:00" },
            ]
        })))
        .mount(&server)
        .await;

    let blocked = client.blocked_ips().await.expect("blocked");
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].ip, "192.168.1.1");
    assert_eq!(blocked[0].date, "2025-05-02");
    assert_eq!(blocked[0].time, "00:00:00");
}

#[tokio::test]
async fn blocked_list_accepts_split_date_time() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/blocked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blocked_ips": [
                { "ip": "10.0.0.1", "date": "2025-05-02", "time": "00:05:00" },
            ]
        })))
        .mount(&server)
        .await;

    let blocked = client.blocked_ips().await.expect("blocked");
    assert_eq!(blocked[0].ip, "10.0.0.1");
    assert_eq!(blocked[0].date, "2025-05-02");
    assert_eq!(blocked[0].time, "00:05:00");
}

#[tokio::test]
async fn config_unwraps_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": {
                "algorithm": "SHA-256",
                "threshold": 100.0,
                "time_window": 10,
                "block_duration": 300,
            }
        })))
        .mount(&server)
        .await;

    let config = client.config().await.expect("config");
    assert_eq!(config.algorithm.as_deref(), Some("SHA-256"));
    assert!((config.threshold - 100.0).abs() < f64::EPSILON);
    assert_eq!(config.time_window, 10);
    assert_eq!(config.block_duration, 300);
}

#[tokio::test]
async fn config_accepts_bare_record() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "threshold": 50.0,
            "time_window": 5,
            "block_duration": 120,
        })))
        .mount(&server)
        .await;

    let config = client.config().await.expect("config");
    assert_eq!(config.algorithm, None);
    assert_eq!(config.time_window, 5);
    assert_eq!(config.block_duration, 120);
}

// ── Control ─────────────────────────────────────────────────────────

#[tokio::test]
async fn block_posts_ip_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/control/block"))
        .and(body_json(json!({ "ip": "192.168.1.1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client.block_ip("192.168.1.1").await.expect("block");
}

#[tokio::test]
async fn update_config_sends_all_three_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/control/config"))
        .and(body_json(json!({
            "threshold": 250.0,
            "time_window": 30,
            "block_duration": 600,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client.update_config(250.0, 30, 600).await.expect("update");
}

#[tokio::test]
async fn bodyless_ack_counts_as_success() {
    let (server, client) = setup().await;

    // Some limiter versions ack writes with 200 and no body at all.
    Mock::given(method("POST"))
        .and(path("/control/block"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.block_ip("172.16.0.9").await.expect("block");
}

#[tokio::test]
async fn plain_text_ack_counts_as_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/control/config"))
        .respond_with(ResponseTemplate::new(200).set_body_string("updated"))
        .expect(1)
        .mount(&server)
        .await;

    client.update_config(100.0, 10, 300).await.expect("update");
}

#[tokio::test]
async fn write_failure_propagates() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/control/unblock"))
        .respond_with(ResponseTemplate::new(500).set_body_string("limiter unavailable"))
        .mount(&server)
        .await;

    let err = client.unblock_ip("10.0.0.1").await.expect_err("must fail");
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "limiter unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/telemetry/traffic"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.traffic().await.expect_err("must fail");
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("unexpected error: {other:?}"),
    }
}
