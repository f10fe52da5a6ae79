//! End-to-end command flow tests against a mock limiter.

#![allow(clippy::float_cmp)]

use limwatch_api::LimiterClient;
use limwatch_core::{
    BlockedEntry, BlockedList, ConfigEditor, CoreError, LimiterConfig, TrafficSample,
    TrafficSeries, command, fetch,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, LimiterClient) {
    let server = MockServer::start().await;
    let url = server.uri().parse().expect("mock server URI");
    let client = LimiterClient::with_client(reqwest::Client::new(), url);
    (server, client)
}

fn seeded_list() -> BlockedList {
    let mut list = BlockedList::default();
    list.replace(vec![BlockedEntry {
        ip: "10.0.0.1".into(),
        date: "2025-05-02".into(),
        time: "08:00:00".into(),
    }]);
    list
}

#[tokio::test]
async fn duplicate_block_never_reaches_the_wire() {
    let (server, _client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/control/block"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let list = seeded_list();
    let err = command::prepare_block("10.0.0.1", &list);
    assert!(matches!(err, Err(CoreError::AlreadyBlocked { .. })));
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn confirmed_block_appends_a_stamped_entry() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/control/block"))
        .and(body_json(serde_json::json!({"ip": "172.16.0.9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut list = seeded_list();
    command::prepare_block("172.16.0.9", &list).expect("valid and not yet blocked");
    command::submit_block(&client, "172.16.0.9")
        .await
        .expect("mock accepts the block");
    let entry = list.apply_block("172.16.0.9");

    assert!(list.contains("172.16.0.9"));
    assert_eq!(list.len(), 2);
    // Client-stamped wall clock, not a server value.
    assert_eq!(entry.date.len(), 10);
    assert_eq!(entry.time.len(), 8);
}

#[tokio::test]
async fn failed_block_leaves_the_list_untouched() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/control/block"))
        .respond_with(ResponseTemplate::new(500).set_body_string("limiter unavailable"))
        .mount(&server)
        .await;

    let mut list = seeded_list();
    command::prepare_block("172.16.0.9", &list).expect("valid and not yet blocked");
    let err = command::submit_block(&client, "172.16.0.9").await;

    assert!(matches!(err, Err(CoreError::Api { .. })));
    // Confirm-then-update: nothing was appended before the failure.
    assert!(!list.contains("172.16.0.9"));
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn confirmed_unblock_removes_exactly_one_entry() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/control/unblock"))
        .and(body_json(serde_json::json!({"ip": "10.0.0.1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut list = seeded_list();
    command::submit_unblock(&client, "10.0.0.1")
        .await
        .expect("mock accepts the unblock");
    let removed = list.apply_unblock("10.0.0.1");

    assert_eq!(removed.map(|e| e.ip), Some("10.0.0.1".to_owned()));
    assert!(list.is_empty());
}

#[tokio::test]
async fn failed_unblock_retains_the_entry() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/control/unblock"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut list = seeded_list();
    let err = command::submit_unblock(&client, "10.0.0.1").await;

    assert!(err.is_err());
    assert!(list.contains("10.0.0.1"));
}

#[tokio::test]
async fn config_save_sends_every_field_and_commits() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/control/config"))
        .and(body_json(serde_json::json!({
            "threshold": 250.0,
            "time_window": 30,
            "block_duration": 600,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut editor = ConfigEditor::default();
    editor.set_committed(LimiterConfig::default());
    {
        let draft = editor.begin_edit();
        draft.threshold = 250.0;
        draft.time_window = 30;
        draft.block_duration = 600;
    }

    let draft = editor.draft().expect("edit in progress").clone();
    command::submit_config(&client, &draft)
        .await
        .expect("mock accepts the config");
    editor.commit();

    assert!(!editor.is_editing());
    assert_eq!(editor.committed().threshold, 250.0);
    assert_eq!(editor.committed().time_window, 30);
    assert_eq!(editor.committed().block_duration, 600);
}

#[tokio::test]
async fn failed_config_save_keeps_the_draft_open() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/control/config"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut editor = ConfigEditor::default();
    editor.begin_edit().threshold = 999.0;

    let draft = editor.draft().expect("edit in progress").clone();
    let err = command::submit_config(&client, &draft).await;

    assert!(err.is_err());
    // Draft survives for a manual retry; committed is unchanged.
    assert!(editor.is_editing());
    assert_eq!(editor.draft().map(|d| d.threshold), Some(999.0));
    assert_eq!(editor.committed().threshold, LimiterConfig::default().threshold);
}

#[tokio::test]
async fn traffic_polls_append_in_order() {
    let (server, client) = setup().await;

    let mut series = TrafficSeries::new(10);
    for i in 0..3u64 {
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/telemetry/traffic"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rate": i * 100,
                "timestamp": format!("2025-05-02 09:00:{i:02}"),
            })))
            .mount(&server)
            .await;

        let sample = fetch::traffic_sample(&client).await;
        fetch::apply_traffic(&mut series, sample);
    }

    assert_eq!(series.rates(), vec![0, 100, 200]);
    assert_eq!(
        series.latest(),
        Some(&TrafficSample {
            timestamp: "2025-05-02 09:00:02".to_owned(),
            rate: 200,
        })
    );
}
