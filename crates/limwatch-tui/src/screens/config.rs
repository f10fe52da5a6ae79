//! Config screen: view the limiter settings and edit them in place.
//!
//! The committed values refresh from the poller; an open edit holds the
//! operator's draft in string buffers until a confirmed save. A failed
//! save stays in edit mode with the draft untouched.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use limwatch_core::ConfigEditor;

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ConfigField {
    #[default]
    Threshold,
    TimeWindow,
    BlockDuration,
}

impl ConfigField {
    const ALL: [ConfigField; 3] = [Self::Threshold, Self::TimeWindow, Self::BlockDuration];

    fn label(self) -> &'static str {
        match self {
            Self::Threshold => "Threshold (req/s)",
            Self::TimeWindow => "Time window (s)",
            Self::BlockDuration => "Block duration (s)",
        }
    }

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// String buffers for the three editable fields.
#[derive(Debug, Clone, Default)]
struct EditBuffers {
    threshold: String,
    time_window: String,
    block_duration: String,
}

pub struct ConfigScreen {
    focused: bool,
    editor: ConfigEditor,
    buffers: Option<EditBuffers>,
    active_field: ConfigField,
    error: Option<String>,
}

impl ConfigScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            editor: ConfigEditor::default(),
            buffers: None,
            active_field: ConfigField::default(),
            error: None,
        }
    }

    fn begin_edit(&mut self) {
        let draft = self.editor.begin_edit();
        self.buffers = Some(EditBuffers {
            threshold: draft.threshold.to_string(),
            time_window: draft.time_window.to_string(),
            block_duration: draft.block_duration.to_string(),
        });
        self.active_field = ConfigField::default();
        self.error = None;
    }

    fn cancel_edit(&mut self) {
        self.editor.cancel_edit();
        self.buffers = None;
        self.error = None;
    }

    fn active_buffer_mut(&mut self) -> Option<&mut String> {
        let buffers = self.buffers.as_mut()?;
        Some(match self.active_field {
            ConfigField::Threshold => &mut buffers.threshold,
            ConfigField::TimeWindow => &mut buffers.time_window,
            ConfigField::BlockDuration => &mut buffers.block_duration,
        })
    }

    /// Parse the buffers into the draft and raise the confirm dialog, or
    /// show the first parse error inline.
    fn submit_edit(&mut self) -> Option<Action> {
        let Some(buffers) = self.buffers.clone() else {
            return None;
        };

        let threshold: f64 = match buffers.threshold.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                self.error = Some(format!("invalid threshold: {}", buffers.threshold));
                return None;
            }
        };
        let time_window: u64 = match buffers.time_window.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                self.error = Some(format!("invalid time window: {}", buffers.time_window));
                return None;
            }
        };
        let block_duration: u64 = match buffers.block_duration.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                self.error = Some(format!("invalid block duration: {}", buffers.block_duration));
                return None;
            }
        };

        let draft = self.editor.begin_edit();
        draft.threshold = threshold;
        draft.time_window = time_window;
        draft.block_duration = block_duration;
        self.error = None;

        Some(Action::ShowConfirm(ConfirmAction::SaveConfig {
            draft: draft.clone(),
        }))
    }

    fn render_fields(&self, frame: &mut Frame, area: Rect) {
        let editing = self.buffers.is_some();
        let values = self.buffers.clone().unwrap_or_else(|| {
            let committed = self.editor.committed();
            EditBuffers {
                threshold: committed.threshold.to_string(),
                time_window: committed.time_window.to_string(),
                block_duration: committed.block_duration.to_string(),
            }
        });

        let mut lines = vec![
            Line::from(vec![
                Span::styled("  Algorithm        ", theme::metric_label()),
                Span::styled(
                    self.editor.committed().algorithm.clone(),
                    Style::default().fg(theme::DIM_WHITE),
                ),
            ]),
            Line::from(""),
        ];

        for (field, value) in [
            (ConfigField::Threshold, &values.threshold),
            (ConfigField::TimeWindow, &values.time_window),
            (ConfigField::BlockDuration, &values.block_duration),
        ] {
            let active = editing && field == self.active_field;
            let marker = if active { "▸ " } else { "  " };
            let value_style = if active {
                Style::default().fg(theme::TEAL)
            } else if editing {
                Style::default().fg(theme::DIM_WHITE)
            } else {
                theme::metric_value()
            };

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(theme::TEAL)),
                Span::styled(format!("{:<17}", field.label()), theme::metric_label()),
                Span::styled(value.clone(), value_style),
            ];
            if active {
                spans.push(Span::styled("█", Style::default().fg(theme::TEAL)));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(""));
        if editing {
            lines.push(Line::from(vec![
                Span::styled("  Tab ", theme::key_hint_key()),
                Span::styled("next field  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("save  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("discard", theme::key_hint()),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled("  e ", theme::key_hint_key()),
                Span::styled("edit", theme::key_hint()),
            ]));
        }

        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                format!("  {error}"),
                theme::inline_error(),
            )));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl Component for ConfigScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.buffers.is_none() {
            if key.code == KeyCode::Char('e') {
                self.begin_edit();
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Enter => return Ok(self.submit_edit()),
            KeyCode::Tab | KeyCode::Down => self.active_field = self.active_field.next(),
            KeyCode::BackTab | KeyCode::Up => self.active_field = self.active_field.prev(),
            KeyCode::Backspace => {
                if let Some(buffer) = self.active_buffer_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                if let Some(buffer) = self.active_buffer_mut() {
                    buffer.push(c);
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ConfigUpdated(config) => {
                // An open draft keeps the operator's values.
                self.editor.set_committed(config.clone());
            }
            Action::ConfigSaved => {
                self.editor.commit();
                self.buffers = None;
                self.error = None;
            }
            Action::ConfigSaveFailed { error } => {
                // Draft and buffers stay put for a manual retry.
                self.error = Some(error.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.buffers.is_some() {
            " Limiter Config (editing) "
        } else {
            " Limiter Config "
        };
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Min(8)]).split(inner);
        self.render_fields(frame, rows[0]);
    }

    fn captures_input(&self) -> bool {
        self.buffers.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
