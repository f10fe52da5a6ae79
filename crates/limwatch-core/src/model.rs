// ── Domain model ──
//
// Client-held projections of limiter state. All of these are transient:
// created empty at widget mount, refreshed by polling, discarded at
// unmount. Nothing here touches wire shapes -- limwatch-api normalizes
// those before they reach this layer.

use serde::Serialize;

/// Algorithm label shown when the limiter omits one.
pub const DEFAULT_ALGORITHM: &str = "SHA-256";

/// One point in the rolling traffic series, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrafficSample {
    /// Server-reported sample time (ISO-8601 text, displayed as-is).
    pub timestamp: String,
    pub rate: u64,
}

/// One row of the "current top clients" snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientHit {
    /// Client IP address.
    pub name: String,
    pub count: u64,
}

/// One blocked address, keyed by `ip` within the block list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedEntry {
    pub ip: String,
    pub date: String,
    pub time: String,
}

/// Aggregated headline metrics for the overview cards.
///
/// `allowed_users` is always recomputed client-side as
/// `users - blocked_ips`; the server's own figure is not trusted.
/// Transiently negative values are possible when the two underlying
/// snapshots straddle a block, hence the signed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OverviewMetrics {
    pub traffic: u64,
    pub users: u64,
    pub blocked_ips: u64,
    pub allowed_users: i64,
}

impl OverviewMetrics {
    /// Derive the full metric set from the three telemetry legs.
    pub fn derive(traffic: u64, users: u64, blocked_ips: u64) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let allowed_users = users as i64 - blocked_ips as i64;
        Self {
            traffic,
            users,
            blocked_ips,
            allowed_users,
        }
    }
}

/// The limiter's tunable configuration.
///
/// Numeric fields are constrained to >= 0 at the input layer; no upper
/// bound is enforced client-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimiterConfig {
    pub algorithm: String,
    pub threshold: f64,
    /// Sliding-window length, seconds.
    pub time_window: u64,
    /// How long a block lasts, seconds.
    pub block_duration: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.into(),
            threshold: 0.0,
            time_window: 0,
            block_duration: 0,
        }
    }
}

impl From<limwatch_api::LimiterConfig> for LimiterConfig {
    fn from(wire: limwatch_api::LimiterConfig) -> Self {
        Self {
            algorithm: wire.algorithm.unwrap_or_else(|| DEFAULT_ALGORITHM.into()),
            threshold: wire.threshold,
            time_window: wire.time_window,
            block_duration: wire.block_duration,
        }
    }
}

impl From<limwatch_api::BlockedIp> for BlockedEntry {
    fn from(wire: limwatch_api::BlockedIp) -> Self {
        Self {
            ip: wire.ip,
            date: wire.date,
            time: wire.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_users_is_users_minus_blocked() {
        let m = OverviewMetrics::derive(9000, 1234, 56);
        assert_eq!(m.allowed_users, 1178);
    }

    #[test]
    fn allowed_users_can_go_negative_transiently() {
        let m = OverviewMetrics::derive(0, 2, 5);
        assert_eq!(m.allowed_users, -3);
    }

    #[test]
    fn missing_algorithm_defaults() {
        let wire = limwatch_api::LimiterConfig {
            algorithm: None,
            threshold: 100.0,
            time_window: 10,
            block_duration: 300,
        };
        let cfg = LimiterConfig::from(wire);
        assert_eq!(cfg.algorithm, DEFAULT_ALGORITHM);
    }
}
