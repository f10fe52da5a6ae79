//! Poll bridge: connects the core pollers to TUI actions.
//!
//! Runs as a background task: spawns one interval poller per widget feed
//! and forwards every result as an [`Action`] through the TUI's action
//! channel. Shuts down cleanly on cancellation; a result that resolves
//! after cancellation is discarded by the poller itself.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use limwatch_api::LimiterClient;
use limwatch_config::PollIntervals;
use limwatch_core::{fetch, spawn_poller};

use crate::action::Action;

/// Spawn the per-widget pollers and keep them alive until `cancel` fires.
pub async fn spawn_poll_bridge(
    client: LimiterClient,
    intervals: PollIntervals,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    debug!(
        traffic_secs = intervals.traffic,
        overview_secs = intervals.overview,
        clients_secs = intervals.clients,
        blocked_secs = intervals.blocked,
        config_secs = intervals.config,
        "starting pollers"
    );

    let traffic = {
        let client = client.clone();
        let tx = action_tx.clone();
        spawn_poller(
            Duration::from_secs(intervals.traffic),
            move || {
                let client = client.clone();
                async move { fetch::traffic_sample(&client).await }
            },
            move |sample| {
                let _ = tx.send(Action::TrafficUpdated(sample));
            },
        )
    };

    let overview = {
        let client = client.clone();
        let tx = action_tx.clone();
        spawn_poller(
            Duration::from_secs(intervals.overview),
            move || {
                let client = client.clone();
                async move { fetch::overview(&client).await }
            },
            move |metrics| {
                let _ = tx.send(Action::OverviewUpdated(metrics));
            },
        )
    };

    let clients = {
        let client = client.clone();
        let tx = action_tx.clone();
        spawn_poller(
            Duration::from_secs(intervals.clients),
            move || {
                let client = client.clone();
                async move { fetch::top_clients(&client).await }
            },
            move |hits| {
                let _ = tx.send(Action::TopClientsUpdated(hits));
            },
        )
    };

    let blocked = {
        let client = client.clone();
        let tx = action_tx.clone();
        spawn_poller(
            Duration::from_secs(intervals.blocked),
            move || {
                let client = client.clone();
                async move { fetch::blocked_list(&client).await }
            },
            move |entries| {
                let _ = tx.send(Action::BlockedUpdated(entries));
            },
        )
    };

    let config = {
        let client = client.clone();
        let tx = action_tx;
        spawn_poller(
            Duration::from_secs(intervals.config),
            move || {
                let client = client.clone();
                async move { fetch::limiter_config(&client).await }
            },
            move |config| {
                let _ = tx.send(Action::ConfigUpdated(config));
            },
        )
    };

    cancel.cancelled().await;

    traffic.cancel();
    overview.cancel();
    clients.cancel();
    blocked.cancel();
    config.cancel();
    debug!("pollers stopped");
}
