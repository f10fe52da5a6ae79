// Limiter API HTTP client
//
// Wraps `reqwest::Client` with limiter-specific URL construction and
// response decoding. The telemetry (read) and control (write) endpoint
// groups are implemented as inherent methods in sibling files to keep
// this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the limiter's telemetry and control API.
///
/// Read endpoints live under `/telemetry/`, write endpoints under
/// `/control/`. Every method returns `Result` -- the read-path
/// fallback contract (stale-but-present display) is implemented one
/// layer up, in `limwatch-core`, so this crate stays honest about
/// what the server actually said.
#[derive(Debug, Clone)]
pub struct LimiterClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LimiterClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` should be the limiter root
    /// (e.g. `http://127.0.0.1:9090`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The limiter base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a telemetry path: `{base}/telemetry/{path}`
    pub(crate) fn telemetry_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(&format!("telemetry/{path}"))
            .map_err(Error::InvalidUrl)
    }

    /// Build a full URL for a control path: `{base}/control/{path}`
    pub(crate) fn control_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(&format!("control/{path}"))
            .map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a POST request and treat any 2xx status as acknowledgement,
    /// discarding the body. Write endpoints ack with whatever body the
    /// limiter version feels like (JSON, plain text, nothing at all), so
    /// decoding it would turn confirmed writes into reported failures.
    pub(crate) async fn post_ack(&self, url: Url, body: &impl Serialize) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        Err(Error::Api {
            status: status.as_u16(),
            message: if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            } else {
                body
            },
        })
    }

    /// Check the HTTP status and decode the body, keeping the raw text
    /// around for diagnostics when deserialization fails.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_owned()
                } else {
                    body
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
