// Control (write) endpoints
//
// Operator-intentional mutations. Unlike the telemetry surface, failures
// here always propagate: silently swallowing a failed write would
// desynchronize the operator's mental model from the real limiter state.

use serde_json::json;
use tracing::debug;

use crate::client::LimiterClient;
use crate::error::Error;

impl LimiterClient {
    /// Block an IP address.
    ///
    /// `POST /control/block` with `{"ip": "..."}`
    pub async fn block_ip(&self, ip: &str) -> Result<(), Error> {
        let url = self.control_url("block")?;
        debug!(ip, "blocking address");
        self.post_ack(url, &json!({ "ip": ip })).await
    }

    /// Unblock an IP address.
    ///
    /// `POST /control/unblock` with `{"ip": "..."}`
    pub async fn unblock_ip(&self, ip: &str) -> Result<(), Error> {
        let url = self.control_url("unblock")?;
        debug!(ip, "unblocking address");
        self.post_ack(url, &json!({ "ip": ip })).await
    }

    /// Update the limiter configuration.
    ///
    /// `POST /control/config` with the full three-field body. Earlier
    /// limiter frontends sent `threshold` alone; the server accepts the
    /// full record and that partial payload is superseded.
    pub async fn update_config(
        &self,
        threshold: f64,
        time_window: u64,
        block_duration: u64,
    ) -> Result<(), Error> {
        let url = self.control_url("config")?;
        debug!(threshold, time_window, block_duration, "updating config");
        self.post_ack(
            url,
            &json!({
                "threshold": threshold,
                "time_window": time_window,
                "block_duration": block_duration,
            }),
        )
        .await
    }
}
