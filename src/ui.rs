//! Rendering for the create-user screen and its modal dialogs
//!
//! Pure drawing: all state lives in [`CreateUserScreen`] and the dialog
//! parameters; nothing here mutates anything.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::screen::CreateUserScreen;
use crate::theme::{Colors, Styles};
use crate::types::Field;

const INTRO: &str = "You must create a 'username' for regular (non-administrative) use of \
     your system. To create a system 'username', please provide the information requested \
     below.";

const NETWORK_HINT: &str = "If you need to use network authentication, such as Kerberos or \
     NIS, please choose Use network login.";

/// Render the create-user form.
pub fn draw_form(f: &mut Frame, screen: &CreateUserScreen) {
    let area = f.area();

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::dialog_border())
        .title(Span::styled(" Create User ", Styles::title()));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // intro
            Constraint::Length(1), // full name
            Constraint::Length(1), // username
            Constraint::Length(1), // password + meter
            Constraint::Length(1), // confirm + indicator
            Constraint::Length(1), // admin checkbox
            Constraint::Length(2), // network hint
            Constraint::Length(1), // network login action
            Constraint::Length(1), // spacer
            Constraint::Length(1), // create action
            Constraint::Min(0),    // filler
            Constraint::Length(1), // key hints
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(INTRO).wrap(Wrap { trim: true }).style(Styles::label()),
        rows[0],
    );

    draw_entry_row(f, rows[1], screen, Field::FullName);
    draw_entry_row(f, rows[2], screen, Field::Username);
    draw_entry_row(f, rows[3], screen, Field::Password);
    draw_entry_row(f, rows[4], screen, Field::Confirm);
    draw_admin_row(f, rows[5], screen);

    f.render_widget(
        Paragraph::new(NETWORK_HINT)
            .wrap(Wrap { trim: true })
            .style(Styles::hint()),
        rows[6],
    );
    draw_action_row(f, rows[7], screen, Field::NetworkLogin, screen.network_auth_done);
    draw_action_row(f, rows[9], screen, Field::CreateButton, false);

    f.render_widget(
        Paragraph::new("Tab/↑↓ move · Enter activate · Space toggle · Esc quit")
            .alignment(Alignment::Center)
            .style(Styles::hint()),
        rows[11],
    );
}

fn draw_entry_row(f: &mut Frame, area: Rect, screen: &CreateUserScreen, field: Field) {
    let focused = screen.focus == field;
    let label_style = if focused {
        Styles::field_focused()
    } else {
        Styles::label()
    };

    let value = match field {
        Field::FullName => screen.full_name.clone(),
        Field::Username => screen.username.clone(),
        Field::Password => "*".repeat(screen.password.chars().count()),
        Field::Confirm => "*".repeat(screen.confirm.chars().count()),
        _ => String::new(),
    };

    let mut spans = vec![
        Span::styled(format!("{:>18}: ", field.to_string()), label_style),
        Span::styled(value, Styles::field()),
    ];
    if focused {
        spans.push(Span::styled("_", Styles::field_focused()));
    }

    // Trailing decorations: strength meter and confirm indicator.
    match field {
        Field::Password => {
            let strength = screen.strength();
            if !strength.label.is_empty() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    strength.label,
                    Styles::meter(strength.fraction),
                ));
            }
        }
        Field::Confirm => match screen.confirm_matches() {
            Some(true) => {
                spans.push(Span::raw("  "));
                spans.push(Span::styled("match", Styles::meter(1.0)));
            }
            Some(false) => {
                spans.push(Span::raw("  "));
                spans.push(Span::styled("no match", Styles::meter(0.0)));
            }
            None => {}
        },
        _ => {}
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_admin_row(f: &mut Frame, area: Rect, screen: &CreateUserScreen) {
    let focused = screen.focus == Field::Admin;
    let marker = if screen.wants_admin { "[x]" } else { "[ ]" };
    let style = if screen.admin_forced {
        Styles::field_disabled()
    } else if focused {
        Styles::field_focused()
    } else {
        Styles::field()
    };

    let mut text = format!("{:>18}  {} {}", "", marker, Field::Admin);
    if screen.admin_forced {
        text.push_str(" (required)");
    }
    f.render_widget(Paragraph::new(Span::styled(text, style)), area);
}

fn draw_action_row(f: &mut Frame, area: Rect, screen: &CreateUserScreen, field: Field, done: bool) {
    let focused = screen.focus == field;
    let style = if focused {
        Styles::field_focused()
    } else {
        Styles::field()
    };
    let mut label = format!("{:>18}  [ {} ]", "", field);
    if done {
        label.push_str(" (done)");
    }
    f.render_widget(Paragraph::new(Span::styled(label, style)), area);
}

/// Render a blocking error dialog over the form.
pub fn draw_error_dialog(f: &mut Frame, message: &str) {
    let area = centered_rect(f.area(), 60, 30);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::error_border())
        .title(Span::styled(" Error ", Styles::error_border()))
        .style(ratatui::style::Style::default().bg(Colors::BG_DANGER));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    f.render_widget(
        Paragraph::new(message).wrap(Wrap { trim: true }).style(Styles::field()),
        rows[0],
    );
    f.render_widget(
        Paragraph::new("Press Enter to continue")
            .alignment(Alignment::Center)
            .style(Styles::hint()),
        rows[1],
    );
}

/// Render a blocking yes/no dialog over the form.
pub fn draw_confirm_dialog(f: &mut Frame, message: &str, yes_selected: bool) {
    let area = centered_rect(f.area(), 60, 40);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::warning_border())
        .title(Span::styled(" Warning ", Styles::warning_border()))
        .style(ratatui::style::Style::default().bg(Colors::BG_PRIMARY));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(message).wrap(Wrap { trim: true }).style(Styles::field()),
        rows[0],
    );

    let (yes_style, no_style) = if yes_selected {
        (Styles::confirm_selected(), Styles::field())
    } else {
        (Styles::field(), Styles::confirm_selected())
    };
    let buttons = Line::from(vec![
        Span::styled("  Yes  ", yes_style),
        Span::raw("    "),
        Span::styled("  No  ", no_style),
    ]);
    f.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        rows[1],
    );
    f.render_widget(
        Paragraph::new("←/→ select · Enter confirm")
            .alignment(Alignment::Center)
            .style(Styles::hint()),
        rows[2],
    );
}

/// Render the please-wait window shown during long operations.
pub fn draw_wait_window(f: &mut Frame, message: &str) {
    let area = centered_rect(f.area(), 60, 25);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::dialog_border())
        .title(Span::styled(" Please wait ", Styles::title()))
        .style(ratatui::style::Style::default().bg(Colors::BG_PRIMARY));
    let inner = block.inner(area);
    f.render_widget(block, area);

    f.render_widget(
        Paragraph::new(message)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Styles::field()),
        inner,
    );
}

/// Centered rectangle taking the given percentages of the frame.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (area.width * percent_x / 100).max(20).min(area.width);
    let height = (area.height * percent_y / 100).max(5).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(outer, 60, 30);
        assert!(rect.x >= outer.x && rect.y >= outer.y);
        assert!(rect.right() <= outer.right());
        assert!(rect.bottom() <= outer.bottom());
    }

    #[test]
    fn test_centered_rect_clamps_to_small_terminals() {
        let outer = Rect::new(0, 0, 10, 4);
        let rect = centered_rect(outer, 60, 30);
        assert!(rect.width <= outer.width);
        assert!(rect.height <= outer.height);
    }
}
