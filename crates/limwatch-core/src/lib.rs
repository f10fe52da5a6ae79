// limwatch-core: live-state sync layer between limwatch-api and the dashboard.
//
// Owns the parts with real consistency and timing concerns: the read-path
// fallback contract, the polling primitive, per-widget view state, and the
// confirm-then-update command flows. Rendering lives elsewhere.

pub mod command;
pub mod error;
pub mod fetch;
pub mod model;
pub mod poller;
pub mod validate;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use model::{BlockedEntry, ClientHit, LimiterConfig, OverviewMetrics, TrafficSample};
pub use poller::{PollHandle, spawn_poller};
pub use validate::validate_ipv4;
pub use view::{BlockedList, ConfigEditor, TrafficSeries};
