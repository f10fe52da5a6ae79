//! Blocked IPs screen: block list table plus the add-block input flow.
//!
//! Adding an address walks Idle → typing → local validation → confirm
//! dialog → submit. The list itself is only mutated by poll results and
//! by confirmed command outcomes; a rejected or failed write leaves it
//! exactly as it was.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use limwatch_core::{BlockedList, command};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;

pub struct BlockedScreen {
    focused: bool,
    blocked: BlockedList,
    table_state: TableState,
    /// Add-block input buffer; `None` means not typing.
    input: Option<String>,
    /// Inline validation or command error.
    error: Option<String>,
}

impl BlockedScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            blocked: BlockedList::default(),
            table_state: TableState::default(),
            input: None,
            error: None,
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn move_selection(&mut self, delta: i64) {
        if self.blocked.is_empty() {
            return;
        }
        let len = self.blocked.len() as i64;
        let next = (self.selected_index() as i64 + delta).clamp(0, len - 1);
        self.table_state.select(Some(next as usize));
    }

    /// Validate the typed address and raise the confirm dialog, or show
    /// the validation error inline. No network traffic either way.
    fn submit_input(&mut self) -> Option<Action> {
        let ip = self.input.as_deref().unwrap_or("").trim().to_owned();
        match command::prepare_block(&ip, &self.blocked) {
            Ok(()) => {
                self.error = None;
                Some(Action::ShowConfirm(ConfirmAction::BlockIp { ip }))
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.input = None;
                self.error = None;
            }
            KeyCode::Enter => return self.submit_input(),
            KeyCode::Backspace => {
                if let Some(input) = self.input.as_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.input.as_mut() {
                    input.push(c);
                }
            }
            _ => {}
        }
        None
    }
}

impl Component for BlockedScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.input.is_some() {
            return Ok(self.handle_input_key(key));
        }

        match key.code {
            KeyCode::Char('a') => {
                self.input = Some(String::new());
                self.error = None;
            }
            KeyCode::Char('u') | KeyCode::Delete => {
                if let Some(entry) = self.blocked.entries().get(self.selected_index()) {
                    return Ok(Some(Action::ShowConfirm(ConfirmAction::UnblockIp {
                        ip: entry.ip.clone(),
                    })));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::Char('G') => {
                if !self.blocked.is_empty() {
                    self.table_state.select(Some(self.blocked.len() - 1));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::BlockedUpdated(entries) => {
                self.blocked.replace(entries.clone());
                if self.selected_index() >= self.blocked.len() {
                    self.table_state.select(self.blocked.len().checked_sub(1));
                }
            }
            Action::BlockSucceeded { ip } => {
                // A poll may have already delivered the entry in between.
                if !self.blocked.contains(ip) {
                    self.blocked.apply_block(ip);
                }
                self.input = None;
                self.error = None;
            }
            Action::BlockFailed { error, .. } => {
                // Entry was never added; keep the input for a retry.
                self.error = Some(error.clone());
            }
            Action::UnblockSucceeded { ip } => {
                self.blocked.apply_unblock(ip);
                if self.selected_index() >= self.blocked.len() {
                    self.table_state.select(self.blocked.len().checked_sub(1));
                }
            }
            Action::UnblockFailed { error, .. } => {
                self.error = Some(error.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows_area = Layout::vertical([Constraint::Min(3), Constraint::Length(2)]).split(area);

        let block = Block::default()
            .title(Span::styled(" Blocked IPs ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        if self.blocked.is_empty() {
            let inner = block.inner(rows_area[0]);
            frame.render_widget(block, rows_area[0]);
            frame.render_widget(
                Paragraph::new("  No blocked addresses")
                    .style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
        } else {
            let rows: Vec<Row> = self
                .blocked
                .entries()
                .iter()
                .map(|e| {
                    Row::new(vec![
                        Cell::from(e.ip.clone()).style(theme::table_row()),
                        Cell::from(e.date.clone()).style(theme::table_row()),
                        Cell::from(e.time.clone()).style(theme::table_row()),
                    ])
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Length(18),
                    Constraint::Length(12),
                    Constraint::Length(10),
                ],
            )
            .header(Row::new(vec!["IP", "Date", "Time"]).style(theme::table_header()))
            .block(block)
            .row_highlight_style(theme::table_selected());

            let mut state = self.table_state.clone();
            frame.render_stateful_widget(table, rows_area[0], &mut state);
        }

        // Input / hint line, with any inline error underneath.
        let prompt = if let Some(input) = &self.input {
            Line::from(vec![
                Span::styled(" block: ", Style::default().fg(theme::ACCENT_BLUE)),
                Span::styled(input.clone(), Style::default().fg(theme::DIM_WHITE)),
                Span::styled("█", Style::default().fg(theme::TEAL)),
                Span::styled("  Enter confirm  Esc cancel", theme::key_hint()),
            ])
        } else {
            Line::from(vec![
                Span::styled(" a ", theme::key_hint_key()),
                Span::styled("add block  ", theme::key_hint()),
                Span::styled("u ", theme::key_hint_key()),
                Span::styled("unblock selected  ", theme::key_hint()),
                Span::styled("j/k ", theme::key_hint_key()),
                Span::styled("move", theme::key_hint()),
            ])
        };

        let mut lines = vec![prompt];
        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                format!(" {error}"),
                theme::inline_error(),
            )));
        }
        frame.render_widget(Paragraph::new(lines), rows_area[1]);
    }

    fn captures_input(&self) -> bool {
        self.input.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent};
    use limwatch_core::BlockedEntry;
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn type_ip(screen: &mut BlockedScreen, ip: &str) -> Option<Action> {
        screen.handle_key_event(key(KeyCode::Char('a'))).expect("key");
        for c in ip.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).expect("key");
        }
        screen.handle_key_event(key(KeyCode::Enter)).expect("key")
    }

    #[test]
    fn valid_input_raises_the_confirm_dialog() {
        let mut screen = BlockedScreen::new();
        let action = type_ip(&mut screen, "192.168.1.1");
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::BlockIp { ip })) if ip == "192.168.1.1"
        ));
        assert!(screen.error.is_none());
    }

    #[test]
    fn malformed_input_shows_an_inline_error() {
        let mut screen = BlockedScreen::new();
        let action = type_ip(&mut screen, "999.1.1.1");
        assert!(action.is_none());
        assert!(screen.error.is_some());
        // Buffer stays so the operator can fix it.
        assert_eq!(screen.input.as_deref(), Some("999.1.1.1"));
    }

    #[test]
    fn duplicate_input_is_rejected_before_confirm() {
        let mut screen = BlockedScreen::new();
        screen
            .update(&Action::BlockedUpdated(vec![BlockedEntry {
                ip: "10.0.0.1".into(),
                date: "2025-05-02".into(),
                time: "00:00:00".into(),
            }]))
            .expect("update");

        let action = type_ip(&mut screen, "10.0.0.1");
        assert!(action.is_none());
        assert!(screen.error.is_some());
        assert_eq!(screen.blocked.len(), 1);
    }

    #[test]
    fn confirmed_block_clears_the_input() {
        let mut screen = BlockedScreen::new();
        let _ = type_ip(&mut screen, "172.16.0.9");

        screen
            .update(&Action::BlockSucceeded { ip: "172.16.0.9".into() })
            .expect("update");
        assert!(screen.blocked.contains("172.16.0.9"));
        assert!(screen.input.is_none());
        assert!(screen.error.is_none());
    }

    #[test]
    fn block_confirmed_after_a_poll_does_not_duplicate() {
        let mut screen = BlockedScreen::new();
        let _ = type_ip(&mut screen, "172.16.0.9");

        // A blocked-list poll delivers the new entry first.
        screen
            .update(&Action::BlockedUpdated(vec![BlockedEntry {
                ip: "172.16.0.9".into(),
                date: "2025-05-02".into(),
                time: "09:00:00".into(),
            }]))
            .expect("update");
        screen
            .update(&Action::BlockSucceeded { ip: "172.16.0.9".into() })
            .expect("update");

        assert_eq!(screen.blocked.len(), 1);
        assert!(screen.input.is_none());
    }

    #[test]
    fn failed_block_keeps_the_input_and_list() {
        let mut screen = BlockedScreen::new();
        let _ = type_ip(&mut screen, "172.16.0.9");

        screen
            .update(&Action::BlockFailed {
                ip: "172.16.0.9".into(),
                error: "limiter unavailable".into(),
            })
            .expect("update");
        assert!(!screen.blocked.contains("172.16.0.9"));
        assert_eq!(screen.input.as_deref(), Some("172.16.0.9"));
        assert_eq!(screen.error.as_deref(), Some("limiter unavailable"));
    }
}
