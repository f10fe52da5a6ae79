//! Top clients screen: per-IP hit counts with proportional bars.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use limwatch_core::ClientHit;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct ClientsScreen {
    focused: bool,
    clients: Vec<ClientHit>,
    table_state: TableState,
}

impl ClientsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            clients: Vec::new(),
            table_state: TableState::default(),
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn move_selection(&mut self, delta: i64) {
        if self.clients.is_empty() {
            return;
        }
        let len = self.clients.len() as i64;
        let next = (self.selected_index() as i64 + delta).clamp(0, len - 1);
        #[allow(clippy::cast_sign_loss)]
        self.table_state.select(Some(next as usize));
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn hit_bar(count: u64, max: u64, width: usize) -> String {
        if max == 0 || width == 0 {
            return String::new();
        }
        let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
        "▇".repeat(filled.min(width))
    }
}

impl Component for ClientsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::Char('G') => {
                if !self.clients.is_empty() {
                    self.table_state.select(Some(self.clients.len() - 1));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::TopClientsUpdated(clients) = action {
            // Wholesale replacement; the poll result is already sorted.
            self.clients = clients.clone();
            if self.selected_index() >= self.clients.len() {
                self.table_state
                    .select(self.clients.len().checked_sub(1));
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Top Clients (last minute) ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        if self.clients.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  Waiting for data…")
                    .style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        let max_hits = self.clients.iter().map(|c| c.count).max().unwrap_or(0);
        let bar_width = usize::from(area.width.saturating_sub(32)).min(40);

        let rows: Vec<Row> = self
            .clients
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(c.name.clone()).style(theme::table_row()),
                    Cell::from(c.count.to_string()).style(theme::metric_value()),
                    Cell::from(Span::styled(
                        Self::hit_bar(c.count, max_hits, bar_width),
                        Style::default().fg(theme::TEAL),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(18),
                Constraint::Length(8),
                Constraint::Min(10),
            ],
        )
        .header(Row::new(vec!["IP", "Hits", ""]).style(theme::table_header()))
        .block(block)
        .row_highlight_style(theme::table_selected());

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bar_scales_to_the_maximum() {
        assert_eq!(ClientsScreen::hit_bar(10, 10, 8).chars().count(), 8);
        assert_eq!(ClientsScreen::hit_bar(5, 10, 8).chars().count(), 4);
        assert_eq!(ClientsScreen::hit_bar(0, 10, 8).chars().count(), 0);
        assert_eq!(ClientsScreen::hit_bar(3, 0, 8), "");
    }

    #[test]
    fn replacement_clamps_the_selection() {
        let mut screen = ClientsScreen::new();
        screen.clients = vec![
            ClientHit { name: "1.1.1.1".into(), count: 4 },
            ClientHit { name: "2.2.2.2".into(), count: 2 },
        ];
        screen.table_state.select(Some(1));

        screen
            .update(&Action::TopClientsUpdated(vec![ClientHit {
                name: "3.3.3.3".into(),
                count: 9,
            }]))
            .expect("update");
        assert_eq!(screen.table_state.selected(), Some(0));
    }
}
