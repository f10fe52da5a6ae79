//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;

use limwatch_core::{BlockedEntry, ClientHit, LimiterConfig, OverviewMetrics, TrafficSample};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Pending confirmation action. Every limiter write passes through one.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    BlockIp { ip: String },
    UnblockIp { ip: String },
    SaveConfig { draft: LimiterConfig },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockIp { ip } => write!(f, "Block {ip}?"),
            Self::UnblockIp { ip } => write!(f, "Unblock {ip}?"),
            Self::SaveConfig { draft } => write!(
                f,
                "Save config (threshold {}, window {}s, block {}s)?",
                draft.threshold, draft.time_window, draft.block_duration
            ),
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Data events (from the pollers) ────────────────────────────
    TrafficUpdated(TrafficSample),
    OverviewUpdated(OverviewMetrics),
    TopClientsUpdated(Vec<ClientHit>),
    BlockedUpdated(Vec<BlockedEntry>),
    ConfigUpdated(LimiterConfig),

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Write outcomes (from command tasks) ───────────────────────
    BlockSucceeded { ip: String },
    BlockFailed { ip: String, error: String },
    UnblockSucceeded { ip: String },
    UnblockFailed { ip: String, error: String },
    ConfigSaved,
    ConfigSaveFailed { error: String },

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
