//! Overview screen: metric cards above a rolling traffic chart.
//!
//! Layout:
//! ┌─ Traffic ──┐ ┌─ Users ──┐ ┌─ Blocked ──┐ ┌─ Allowed ──┐
//! └────────────┘ └──────────┘ └────────────┘ └────────────┘
//! ┌─ Requests per second ─────────────────────────────────┐
//! │  (sparkline over the retained sample window)          │
//! └───────────────────────────────────────────────────────┘

use color_eyre::eyre::Result;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline};

use limwatch_core::{OverviewMetrics, TrafficSeries};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct OverviewScreen {
    focused: bool,
    metrics: OverviewMetrics,
    series: TrafficSeries,
}

impl OverviewScreen {
    pub fn new(traffic_retention: usize) -> Self {
        Self {
            focused: false,
            metrics: OverviewMetrics::default(),
            series: TrafficSeries::new(traffic_retention),
        }
    }

    fn render_card(frame: &mut Frame, area: Rect, label: &str, value: String) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            Line::from(Span::styled(value, theme::metric_value())).alignment(Alignment::Center),
            Line::from(Span::styled(label.to_owned(), theme::metric_label()))
                .alignment(Alignment::Center),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect) {
        let cols = Layout::horizontal([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(area);

        Self::render_card(frame, cols[0], "req/s", self.metrics.traffic.to_string());
        Self::render_card(frame, cols[1], "users", self.metrics.users.to_string());
        Self::render_card(
            frame,
            cols[2],
            "blocked IPs",
            self.metrics.blocked_ips.to_string(),
        );
        Self::render_card(
            frame,
            cols[3],
            "allowed users",
            self.metrics.allowed_users.to_string(),
        );
    }

    fn render_traffic(&self, frame: &mut Frame, area: Rect) {
        let latest = self.series.latest();
        let summary = latest.map_or_else(String::new, |s| {
            format!(
                "{} req/s at {} ({} total over {} samples) ",
                s.rate,
                s.timestamp,
                self.series.total_rate(),
                self.series.len(),
            )
        });
        let title = Line::from(vec![
            Span::styled(" Requests per second ", theme::title_style()),
            Span::styled(summary, Style::default().fg(theme::BORDER_GRAY)),
        ]);

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        if self.series.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  Waiting for data…")
                    .style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        // Show only the rightmost window that fits the panel.
        let inner_width = usize::from(area.width.saturating_sub(2));
        let mut rates = self.series.rates();
        if rates.len() > inner_width {
            rates.drain(..rates.len() - inner_width);
        }

        let sparkline = Sparkline::default()
            .block(block)
            .data(&rates)
            .style(Style::default().fg(theme::TEAL).bg(theme::TRAFFIC_FILL));
        frame.render_widget(sparkline, area);
    }
}

impl Component for OverviewScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::TrafficUpdated(sample) => {
                self.series.push(sample.clone());
            }
            Action::OverviewUpdated(metrics) => {
                self.metrics = *metrics;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Length(4), Constraint::Min(5)]).split(area);
        self.render_cards(frame, rows[0]);
        self.render_traffic(frame, rows[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
