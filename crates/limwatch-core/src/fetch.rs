//! Read-path fetchers with the degrade-to-fallback contract.
//!
//! Reads feed a best-effort live display: a failed fetch is logged and
//! replaced with a fixed placeholder value so the dashboard shows stale
//! data instead of an error state. Write failures are never handled
//! here; those surface through [`crate::command`].

use limwatch_api::LimiterClient;
use tracing::warn;

use crate::model::{BlockedEntry, ClientHit, LimiterConfig, OverviewMetrics, TrafficSample};
use crate::view::TrafficSeries;

/// Current traffic reading, or a zero-rate placeholder on failure.
pub async fn traffic_sample(client: &LimiterClient) -> TrafficSample {
    match client.traffic().await {
        Ok(reading) => TrafficSample {
            timestamp: reading.timestamp,
            rate: reading.rate,
        },
        Err(err) => {
            warn!(error = %err, "traffic fetch failed, using placeholder");
            TrafficSample {
                timestamp: "2025-05-02 00:00:00".to_owned(),
                rate: 0,
            }
        }
    }
}

/// Overview metrics aggregated from three telemetry reads.
///
/// The aggregate is all-or-nothing: if any leg fails the whole
/// placeholder object is returned, matching the single surface the
/// widget renders.
pub async fn overview(client: &LimiterClient) -> OverviewMetrics {
    let (traffic, hits, blocked) =
        tokio::join!(client.traffic(), client.ip_hits(), client.blocked_ips());

    match (traffic, hits, blocked) {
        (Ok(traffic), Ok(hits), Ok(blocked)) => OverviewMetrics::derive(
            traffic.rate,
            hits.ip_hits_last_minute.len() as u64,
            blocked.len() as u64,
        ),
        (traffic, hits, blocked) => {
            for err in [traffic.err(), hits.err(), blocked.err()].into_iter().flatten() {
                warn!(error = %err, "overview fetch failed, using placeholder");
            }
            OverviewMetrics {
                traffic: 3456,
                users: 1234,
                blocked_ips: 56,
                allowed_users: 789,
            }
        }
    }
}

/// Per-client hit counts sorted descending, or a placeholder triple.
///
/// Ties keep the order the limiter reported them in.
pub async fn top_clients(client: &LimiterClient) -> Vec<ClientHit> {
    match client.ip_hits().await {
        Ok(hits) => {
            let mut clients: Vec<ClientHit> = hits
                .ip_hits_last_minute
                .into_iter()
                .map(|(name, count)| ClientHit { name, count })
                .collect();
            clients.sort_by(|a, b| b.count.cmp(&a.count));
            clients
        }
        Err(err) => {
            warn!(error = %err, "top clients fetch failed, using placeholder");
            vec![
                ClientHit { name: "127.0.0.1".to_owned(), count: 10 },
                ClientHit { name: "192.168.1.1".to_owned(), count: 8 },
                ClientHit { name: "10.0.0.1".to_owned(), count: 5 },
            ]
        }
    }
}

/// The limiter's block list, or a placeholder pair on failure.
pub async fn blocked_list(client: &LimiterClient) -> Vec<BlockedEntry> {
    match client.blocked_ips().await {
        Ok(entries) => entries.into_iter().map(BlockedEntry::from).collect(),
        Err(err) => {
            warn!(error = %err, "blocked list fetch failed, using placeholder");
            vec![
                BlockedEntry {
                    ip: "192.168.1.1".to_owned(),
                    date: "2025-05-02".to_owned(),
                    time: "00:00:00".to_owned(),
                },
                BlockedEntry {
                    ip: "10.0.0.1".to_owned(),
                    date: "2025-05-02".to_owned(),
                    time: "00:05:00".to_owned(),
                },
            ]
        }
    }
}

/// The limiter's current rate-limiting configuration, or the placeholder
/// values a typical limiter ships with. The zeroed `Default` is only for
/// widget-mount state, never shown as a fetch substitute.
pub async fn limiter_config(client: &LimiterClient) -> LimiterConfig {
    match client.config().await {
        Ok(config) => config.into(),
        Err(err) => {
            warn!(error = %err, "config fetch failed, using placeholder");
            LimiterConfig {
                algorithm: crate::model::DEFAULT_ALGORITHM.into(),
                threshold: 100.0,
                time_window: 10,
                block_duration: 300,
            }
        }
    }
}

/// Append a traffic sample to the rolling series.
pub fn apply_traffic(series: &mut TrafficSeries, sample: TrafficSample) {
    series.push(sample);
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn setup() -> (MockServer, LimiterClient) {
        let server = MockServer::start().await;
        let url = server.uri().parse().expect("mock server URI");
        let client = LimiterClient::with_client(reqwest::Client::new(), url);
        (server, client)
    }

    #[tokio::test]
    async fn traffic_failure_yields_placeholder() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/telemetry/traffic"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sample = traffic_sample(&client).await;
        assert_eq!(sample.rate, 0);
        assert_eq!(sample.timestamp, "2025-05-02 00:00:00");
    }

    #[tokio::test]
    async fn overview_is_all_or_nothing() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/telemetry/traffic"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rate": 42, "timestamp": "2025-05-02 09:00:00"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/telemetry/ip-hits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip_hits_last_minute": {"1.1.1.1": 3, "2.2.2.2": 9}
            })))
            .mount(&server)
            .await;
        // Blocked leg fails, so the whole placeholder object comes back.
        Mock::given(method("GET"))
            .and(path("/telemetry/blocked"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let metrics = overview(&client).await;
        assert_eq!(metrics.traffic, 3456);
        assert_eq!(metrics.users, 1234);
        assert_eq!(metrics.blocked_ips, 56);
        assert_eq!(metrics.allowed_users, 789);
    }

    #[tokio::test]
    async fn overview_derives_allowed_users() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/telemetry/traffic"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rate": 42, "timestamp": "2025-05-02 09:00:00"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/telemetry/ip-hits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip_hits_last_minute": {"1.1.1.1": 3, "2.2.2.2": 9, "3.3.3.3": 1}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/telemetry/blocked"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "blocked_ips": [{"ip": "9.9.9.9", "blocked_since": "2025-05-02 08:00:00"}]
            })))
            .mount(&server)
            .await;

        let metrics = overview(&client).await;
        assert_eq!(metrics.traffic, 42);
        assert_eq!(metrics.users, 3);
        assert_eq!(metrics.blocked_ips, 1);
        assert_eq!(metrics.allowed_users, 2);
    }

    #[tokio::test]
    async fn top_clients_sorts_descending_with_stable_ties() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/telemetry/ip-hits"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(
                    r#"{"ip_hits_last_minute":{"10.0.0.1":5,"10.0.0.2":9,"10.0.0.3":5}}"#,
                ),
            )
            .mount(&server)
            .await;

        let clients = top_clients(&client).await;
        let names: Vec<&str> = clients.iter().map(|c| c.name.as_str()).collect();
        // 10.0.0.1 and 10.0.0.3 tie at 5; response order holds.
        assert_eq!(names, vec!["10.0.0.2", "10.0.0.1", "10.0.0.3"]);
    }

    #[tokio::test]
    async fn blocked_failure_yields_placeholder_pair() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/telemetry/blocked"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let entries = blocked_list(&client).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ip, "192.168.1.1");
        assert_eq!(entries[1].ip, "10.0.0.1");
        assert_eq!(entries[1].time, "00:05:00");
    }

    #[tokio::test]
    async fn config_failure_yields_placeholder() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/telemetry/config"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = limiter_config(&client).await;
        assert_eq!(config.threshold, 100.0);
        assert_eq!(config.time_window, 10);
        assert_eq!(config.block_duration, 300);
        assert_eq!(config.algorithm, "SHA-256");
    }
}
