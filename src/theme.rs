//! Centralized theme and styling for the TUI
//!
//! Single source of truth for colors and styles so the form and the modal
//! dialogs stay visually consistent.

#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

/// Core color palette
pub struct Colors;

impl Colors {
    /// Primary dark background for panels and dialogs
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Error dialog background
    pub const BG_DANGER: Color = Color::Rgb(30, 20, 20);

    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Secondary/muted text color
    pub const FG_SECONDARY: Color = Color::Gray;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Primary accent - borders, titles
    pub const PRIMARY: Color = Color::Cyan;

    /// Secondary accent - focused fields, selection
    pub const SECONDARY: Color = Color::Yellow;

    /// Success/positive feedback
    pub const SUCCESS: Color = Color::Green;

    /// Warnings and confirmations
    pub const WARNING: Color = Color::Yellow;

    /// Errors
    pub const ERROR: Color = Color::Red;
}

/// Pre-built styles
pub struct Styles;

impl Styles {
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    pub fn field() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    pub fn field_focused() -> Style {
        Style::default()
            .fg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn field_disabled() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn hint() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    pub fn dialog_border() -> Style {
        Style::default().fg(Colors::PRIMARY)
    }

    pub fn error_border() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    pub fn warning_border() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn confirm_selected() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the strength meter at a given fraction.
    pub fn meter(fraction: f64) -> Style {
        let color = if fraction < 0.25 {
            Colors::ERROR
        } else if fraction < 0.5 {
            Colors::WARNING
        } else {
            Colors::SUCCESS
        };
        Style::default().fg(color)
    }
}
