//! Color palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ACCENT_BLUE: Color = Color::Rgb(97, 175, 239); // #61afef
pub const TEAL: Color = Color::Rgb(86, 182, 194); // #56b6c2
pub const AMBER: Color = Color::Rgb(229, 192, 123); // #e5c07b
pub const SUCCESS_GREEN: Color = Color::Rgb(152, 195, 121); // #98c379
pub const ERROR_RED: Color = Color::Rgb(224, 108, 117); // #e06c75

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(171, 178, 191); // #abb2bf
pub const BORDER_GRAY: Color = Color::Rgb(92, 99, 112); // #5c6370
pub const BG_HIGHLIGHT: Color = Color::Rgb(44, 49, 60); // #2c313c
pub const BG_DARK: Color = Color::Rgb(30, 34, 42); // #1e222a

/// Fill color behind the traffic sparkline.
pub const TRAFFIC_FILL: Color = Color::Rgb(28, 45, 60);

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(TEAL)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(ACCENT_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(TEAL)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Active tab in the tab bar.
pub fn tab_active() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

/// Inactive tab in the tab bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Metric value in the overview cards.
pub fn metric_value() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

/// Metric label under a card value.
pub fn metric_label() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Inline validation / command error text.
pub fn inline_error() -> Style {
    Style::default().fg(ERROR_RED)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
}
