use thiserror::Error;

/// Top-level error type for the `limwatch-api` crate.
///
/// Covers every failure mode the limiter API can produce: transport,
/// non-success HTTP statuses, and response decoding. `limwatch-core`
/// maps these into user-facing diagnostics -- and decides per call site
/// whether a failure is surfaced or papered over with fallback data.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// The limiter rejected the request (non-2xx status).
    #[error("Limiter API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
