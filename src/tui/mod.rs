//! Ratatui-based terminal UI.
//!
//! The page is a single form: thirteen inputs in schema order, a
//! "Predict Income" action, and a result banner. Every edit clears the banner
//! so what is shown always belongs to the current values.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tracing::{debug, info};

use crate::error::{AppError, exit};
use crate::form::{FieldInput, FormState, build_request};
use crate::report::{INCOME_THRESHOLD, Outcome, render_result};
use crate::schema::{FIELD_COUNT, SCHEMA};
use crate::service::PredictionService;

pub mod theme;

pub use theme::Theme;

/// Row index of the "Predict Income" action, just below the inputs.
const ACTION_ROW: usize = FIELD_COUNT;

/// Start the TUI.
pub fn run(service: PredictionService, theme: Theme) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(exit::TERMINAL, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(service, theme);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(exit::TERMINAL, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(exit::TERMINAL, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    service: PredictionService,
    theme: Theme,
    form: FormState,
    selected_row: usize,
    /// Digits typed into the selected stepper, while numeric entry is active.
    entry: Option<String>,
    outcome: Option<Outcome>,
    status: String,
}

impl App {
    fn new(service: PredictionService, theme: Theme) -> Self {
        Self {
            service,
            theme,
            form: FormState::new(),
            selected_row: 0,
            entry: None,
            outcome: None,
            status: "Fill in the form, then choose Predict Income.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(exit::TERMINAL, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(exit::TERMINAL, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(exit::TERMINAL, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        info!("form closed");
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.entry.is_some() {
            self.handle_entry(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_row < ACTION_ROW {
                    self.selected_row += 1;
                }
            }
            KeyCode::Left => self.edit_selected(|input| input.adjust(false)),
            KeyCode::Right => self.edit_selected(|input| input.adjust(true)),
            KeyCode::PageDown => self.edit_selected(|input| input.coarse_adjust(false)),
            KeyCode::PageUp => self.edit_selected(|input| input.coarse_adjust(true)),
            KeyCode::Home => self.edit_selected(|input| input.jump(false)),
            KeyCode::End => self.edit_selected(|input| input.jump(true)),
            KeyCode::Enter => {
                if self.selected_row == ACTION_ROW {
                    self.predict();
                } else if self.form.input(self.selected_row).is_some_and(FieldInput::is_numeric) {
                    self.entry = Some(String::new());
                    self.status = format!(
                        "Editing {} ({}). Enter to apply, Esc to cancel.",
                        SCHEMA[self.selected_row].label,
                        SCHEMA[self.selected_row].domain.describe()
                    );
                }
            }
            KeyCode::Char('p') => self.predict(),
            _ => {}
        }

        false
    }

    fn handle_entry(&mut self, code: KeyCode) {
        let Some(buffer) = self.entry.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.entry = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let raw = buffer.clone();
                self.entry = None;
                self.apply_entry(&raw);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if buffer.len() < 6 {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_entry(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            self.status = "Edit canceled.".to_string();
            return;
        }
        let column = SCHEMA[self.selected_row].column;
        match self.form.try_set_raw(column, raw) {
            Ok(()) => {
                self.outcome = None;
                self.status = format!("{}: {raw}", SCHEMA[self.selected_row].label);
            }
            Err(err) => {
                debug!(column, raw, "rejected entry");
                self.status = format!("Rejected: {err}");
            }
        }
    }

    fn edit_selected(&mut self, edit: impl FnOnce(&mut FieldInput)) {
        let row = self.selected_row;
        let Some(input) = self.form.input_mut(row) else {
            return;
        };
        let before = input.value();
        edit(&mut *input);
        let after = input.value();
        if before != after {
            self.outcome = None;
            self.status = format!("{}: {after}", SCHEMA[row].label);
        }
    }

    fn predict(&mut self) {
        let request = build_request(&self.form.render_inputs());
        match self.service.predict(&request) {
            Ok(class) => {
                self.status = format!("Predicted label {}.", class.label());
                self.outcome = Some(render_result(class));
            }
            Err(err) => {
                self.outcome = None;
                self.status = format!("Prediction failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_form(frame, chunks[1]);
        self.draw_banner(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled("💼 Adult Income Prediction", self.theme.header)),
            Line::from(Span::styled(
                format!("Predict whether income exceeds {INCOME_THRESHOLD} per month"),
                self.theme.subtitle,
            )),
            Line::from(Span::styled(format!("Model: {}", self.service.describe()), self.theme.subtitle)),
        ];
        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .style(self.theme.subtitle)
            .block(Block::default().borders(Borders::ALL).style(self.theme.subtitle));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let label_width = SCHEMA.iter().map(|f| f.label.len()).max().unwrap_or(0);

        let mut items: Vec<ListItem> = Vec::with_capacity(ACTION_ROW + 1);
        for (row, spec) in SCHEMA.iter().enumerate() {
            let Some(input) = self.form.input(row) else {
                continue;
            };
            let value = match (&self.entry, row == self.selected_row) {
                (Some(buffer), true) => format!("{buffer}▏"),
                _ => input.value().to_string(),
            };
            let hint = match input {
                FieldInput::Stepper(s) => {
                    let (min, max) = s.bounds();
                    format!("{min}–{max}")
                }
                FieldInput::Selector(s) => format!("{}/{}", s.index() + 1, s.options().len()),
            };
            let value_style = if self.entry.is_some() && row == self.selected_row {
                self.theme.editing
            } else {
                self.theme.value
            };
            items.push(ListItem::new(Line::from(vec![
                Span::styled(format!("{:<label_width$}  ", spec.label), self.theme.label),
                Span::styled(format!("‹ {value} ›"), value_style),
                Span::styled(format!("  {hint}"), self.theme.hint),
            ])));
        }

        let button_style = if self.selected_row == ACTION_ROW {
            self.theme.button_focused
        } else {
            self.theme.button
        };
        items.push(ListItem::new(Line::from(Span::styled("[ Predict Income ]", button_style))));

        let list = List::new(items)
            .style(self.theme.card)
            .block(Block::default().title("Applicant").borders(Borders::ALL))
            .highlight_style(self.theme.highlight)
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_row));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_banner(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let p = match &self.outcome {
            Some(outcome) => Paragraph::new(outcome.message.as_str())
                .alignment(Alignment::Center)
                .style(self.theme.outcome(outcome.kind)),
            None => Paragraph::new("No prediction yet.")
                .alignment(Alignment::Center)
                .style(self.theme.hint),
        };
        frame.render_widget(p.block(Block::default().title("Result").borders(Borders::ALL)), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  PgUp/PgDn step  Home/End min/max  Enter edit/predict  p predict  q quit";
        let line = Line::from(vec![
            Span::styled(help, self.theme.hint),
            Span::raw(" | "),
            Span::styled(&self.status, self.theme.status),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
