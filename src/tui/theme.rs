//! Page styling.
//!
//! One template, two palettes. `Gradient` mirrors the styled page (dark teal
//! header, blue action button, white labels on a dark card); `Plain` keeps the
//! terminal's own colors.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::ThemeName;
use crate::report::OutcomeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub header: Style,
    pub subtitle: Style,
    pub card: Style,
    pub label: Style,
    pub value: Style,
    pub hint: Style,
    pub highlight: Style,
    pub button: Style,
    pub button_focused: Style,
    pub success: Style,
    pub warning: Style,
    pub status: Style,
    pub editing: Style,
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Gradient => Self::gradient(),
            ThemeName::Plain => Self::plain(),
        }
    }

    fn gradient() -> Self {
        let teal = Color::Rgb(0x20, 0x3a, 0x43);
        let card = Color::Rgb(0x14, 0x14, 0x14);
        let blue = Color::Rgb(0x25, 0x63, 0xeb);
        Self {
            header: Style::default().fg(Color::White).bg(teal).add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(Color::Gray).bg(teal),
            card: Style::default().fg(Color::White).bg(card),
            label: Style::default().fg(Color::White),
            value: Style::default().fg(Color::Cyan),
            hint: Style::default().fg(Color::DarkGray),
            highlight: Style::default().fg(Color::White).bg(Color::Rgb(0x1f, 0x29, 0x37)),
            button: Style::default().fg(Color::White).bg(Color::Rgb(0x1e, 0x3a, 0x8a)),
            button_focused: Style::default().fg(Color::White).bg(blue).add_modifier(Modifier::BOLD),
            success: Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
            warning: Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
            status: Style::default().fg(Color::Yellow),
            editing: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        }
    }

    fn plain() -> Self {
        Self {
            header: Style::default().add_modifier(Modifier::BOLD),
            subtitle: Style::default(),
            card: Style::default(),
            label: Style::default(),
            value: Style::default().add_modifier(Modifier::BOLD),
            hint: Style::default().fg(Color::Gray),
            highlight: Style::default().add_modifier(Modifier::REVERSED),
            button: Style::default(),
            button_focused: Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            success: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            warning: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            status: Style::default().fg(Color::Yellow),
            editing: Style::default().add_modifier(Modifier::BOLD),
        }
    }

    pub fn outcome(&self, kind: OutcomeKind) -> Style {
        match kind {
            OutcomeKind::Success => self.success,
            OutcomeKind::Warning => self.warning,
        }
    }
}
