// limwatch-api: Async Rust client for the limiter's telemetry and control API

pub mod client;
pub mod control;
pub mod error;
pub mod telemetry;
pub mod transport;

pub use client::LimiterClient;
pub use error::Error;
pub use telemetry::{BlockedIp, IpHits, LimiterConfig, TrafficReading};
