// Telemetry (read) endpoints
//
// The limiter's read surface has drifted across deployments: the blocked
// list carries either a single `blocked_since` stamp or split `date`/`time`
// fields, and the config endpoint is sometimes wrapped in `{config: {...}}`.
// All of that drift is normalized HERE, at the API boundary, so consumers
// see exactly one canonical shape per resource.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::client::LimiterClient;
use crate::error::Error;

// ── Canonical shapes ─────────────────────────────────────────────────

/// One traffic-rate reading.
///
/// `GET /telemetry/traffic`
#[derive(Debug, Clone, Deserialize)]
pub struct TrafficReading {
    #[serde(default)]
    pub rate: u64,
    #[serde(default)]
    pub timestamp: String,
}

/// Per-client hit counts over the limiter's sliding window.
///
/// The map preserves the server's iteration order -- consumers sorting by
/// count rely on it for stable tie-breaking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpHits {
    #[serde(default)]
    pub ip_hits_last_minute: IndexMap<String, u64>,
}

/// One blocked address, normalized to split date/time fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedIp {
    pub ip: String,
    pub date: String,
    pub time: String,
}

/// The limiter's current configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LimiterConfig {
    /// Hashing algorithm label; older limiters omit it.
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub time_window: u64,
    #[serde(default)]
    pub block_duration: u64,
}

// ── Wire shapes (private) ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct BlockedResponse {
    #[serde(default)]
    blocked_ips: Vec<BlockedWire>,
}

/// Raw blocked-list entry. Either `blocked_since` ("YYYY-MM-DD HH:MM:SS")
/// or split `date`/`time` fields, depending on limiter version.
#[derive(Debug, Deserialize)]
struct BlockedWire {
    ip: String,
    #[serde(default)]
    blocked_since: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

impl BlockedWire {
    fn normalize(self) -> BlockedIp {
        let (date, time) = match (self.date, self.time, self.blocked_since) {
            (Some(d), Some(t), _) => (d, t),
            (_, _, Some(since)) => match since.split_once(' ') {
                Some((d, t)) => (d.to_owned(), t.to_owned()),
                None => (since, String::new()),
            },
            _ => (String::new(), String::new()),
        };
        BlockedIp { ip: self.ip, date, time }
    }
}

/// Config endpoint envelope: newer limiters wrap the record in
/// `{config: {...}}`, older ones return it bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConfigEnvelope {
    Wrapped { config: LimiterConfig },
    Bare(LimiterConfig),
}

impl ConfigEnvelope {
    fn into_inner(self) -> LimiterConfig {
        match self {
            Self::Wrapped { config } | Self::Bare(config) => config,
        }
    }
}

// ── Endpoint methods ─────────────────────────────────────────────────

impl LimiterClient {
    /// Fetch the current traffic rate.
    ///
    /// `GET /telemetry/traffic`
    pub async fn traffic(&self) -> Result<TrafficReading, Error> {
        let url = self.telemetry_url("traffic")?;
        self.get(url).await
    }

    /// Fetch per-client hit counts for the limiter's sliding window.
    ///
    /// `GET /telemetry/ip-hits`
    pub async fn ip_hits(&self) -> Result<IpHits, Error> {
        let url = self.telemetry_url("ip-hits")?;
        self.get(url).await
    }

    /// Fetch the blocked-IP list, normalized to split date/time stamps.
    ///
    /// `GET /telemetry/blocked`
    pub async fn blocked_ips(&self) -> Result<Vec<BlockedIp>, Error> {
        let url = self.telemetry_url("blocked")?;
        let resp: BlockedResponse = self.get(url).await?;
        debug!(count = resp.blocked_ips.len(), "fetched blocked list");
        Ok(resp
            .blocked_ips
            .into_iter()
            .map(BlockedWire::normalize)
            .collect())
    }

    /// Fetch the limiter's current configuration, unwrapping the
    /// `{config: {...}}` envelope when present.
    ///
    /// `GET /telemetry/config`
    pub async fn config(&self) -> Result<LimiterConfig, Error> {
        let url = self.telemetry_url("config")?;
        let envelope: ConfigEnvelope = self.get(url).await?;
        Ok(envelope.into_inner())
    }
}
