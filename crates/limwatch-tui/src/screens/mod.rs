//! Screen implementations. Each screen is a top-level Component.

pub mod blocked;
pub mod clients;
pub mod config;
pub mod overview;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
pub fn create_screens(traffic_retention: usize) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Overview,
            Box::new(overview::OverviewScreen::new(traffic_retention)),
        ),
        (ScreenId::Clients, Box::new(clients::ClientsScreen::new())),
        (ScreenId::Blocked, Box::new(blocked::BlockedScreen::new())),
        (ScreenId::Config, Box::new(config::ConfigScreen::new())),
    ]
}
