//! Wizard application: terminal lifecycle and event loop
//!
//! Owns the terminal, runs the create-user screen, and implements the
//! workflow's [`Interaction`] collaborator with blocking modal dialogs.
//! The whole apply runs on this one thread; during the ownership walk the
//! workflow yields back here through [`Interaction::tick`] so pending
//! events are drained and the interface never looks frozen.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::accounts::ShadowDatabase;
use crate::config_file::WizardConfig;
use crate::error::Result;
use crate::netauth;
use crate::provision::{Confirmation, Interaction, Provisioner};
use crate::screen::{CreateUserScreen, ScreenEvent};
use crate::types::{ApplyOutcome, Field};
use crate::ui;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Terminal guard: raw mode + alternate screen on, restored on teardown.
struct Tui {
    terminal: Term,
}

impl Tui {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Tui { terminal })
    }

    fn restore(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Run the wizard to completion. Returns the outcome of the accepted apply,
/// or `Failure` when the operator backs out.
pub fn run_wizard(config: &WizardConfig, testing: bool) -> Result<ApplyOutcome> {
    let mut db = ShadowDatabase::from_config(config);

    let mut screen = CreateUserScreen::new();
    if let Some(admin_group) = config.admin_groups.first() {
        screen.initialize(&db, admin_group);
    }

    let mut tui = Tui::new()?;
    let result = event_loop(&mut tui.terminal, &mut screen, &mut db, config, testing);
    let restored = tui.restore();

    let outcome = result?;
    restored?;
    Ok(outcome)
}

fn event_loop(
    terminal: &mut Term,
    screen: &mut CreateUserScreen,
    db: &mut ShadowDatabase,
    config: &WizardConfig,
    testing: bool,
) -> Result<ApplyOutcome> {
    loop {
        let view = &*screen;
        terminal.draw(|f| ui::draw_form(f, view))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_ctrl_c(key) {
            info!("wizard interrupted by operator");
            return Ok(ApplyOutcome::Failure);
        }

        match screen.handle_key(key) {
            ScreenEvent::Continue => {}
            ScreenEvent::Quit => {
                info!("wizard dismissed without creating an account");
                return Ok(ApplyOutcome::Failure);
            }
            ScreenEvent::NetworkLogin => {
                run_network_login(terminal, screen, config)?;
            }
            ScreenEvent::Apply => {
                let form = screen.form_input();
                let mut iface = TuiInterface::new(&mut *terminal, &mut *screen);
                let result =
                    Provisioner::new(&mut *db, config).apply(&form, &mut iface, testing);
                match result {
                    Ok(ApplyOutcome::Success) => return Ok(ApplyOutcome::Success),
                    Ok(ApplyOutcome::Failure) => {}
                    Err(err) => {
                        let _ = iface.show_error(&format!("Account creation failed: {}", err));
                        return Err(err);
                    }
                }
            }
        }
    }
}

fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'))
}

/// Launch the network-auth helper and block modally until it exits. The
/// helper owns any configuration it performs; we only remember that it ran.
fn run_network_login(
    terminal: &mut Term,
    screen: &mut CreateUserScreen,
    config: &WizardConfig,
) -> Result<()> {
    const WAIT_MESSAGE: &str = "Waiting for the network login tool to finish...";

    let result = {
        let view = &*screen;
        let mut pump = || {
            let _ = terminal.draw(|f| {
                ui::draw_form(f, view);
                ui::draw_wait_window(f, WAIT_MESSAGE);
            });
            drain_pending_events();
        };
        netauth::run_auth_helper(&config.auth_helper, &mut pump)
    };

    match result {
        Ok(success) => {
            if !success {
                warn!("network-auth helper exited with failure");
            }
            screen.network_auth_done = true;
            Ok(())
        }
        Err(err) => {
            let mut iface = TuiInterface::new(terminal, screen);
            iface.show_error(&format!("Could not run the network login tool: {}", err))?;
            Ok(())
        }
    }
}

/// Discard any queued input so a long operation cannot replay stale keys.
fn drain_pending_events() {
    while let Ok(true) = event::poll(Duration::ZERO) {
        if event::read().is_err() {
            break;
        }
    }
}

/// [`Interaction`] implementation over the live terminal and screen.
struct TuiInterface<'a> {
    terminal: &'a mut Term,
    screen: &'a mut CreateUserScreen,
    wait_message: Option<String>,
}

impl<'a> TuiInterface<'a> {
    fn new(terminal: &'a mut Term, screen: &'a mut CreateUserScreen) -> Self {
        TuiInterface {
            terminal,
            screen,
            wait_message: None,
        }
    }

    fn draw_wait_frame(&mut self) -> Result<()> {
        let view = &*self.screen;
        let message = self.wait_message.clone();
        self.terminal.draw(|f| {
            ui::draw_form(f, view);
            if let Some(message) = &message {
                ui::draw_wait_window(f, message);
            }
        })?;
        Ok(())
    }
}

impl Interaction for TuiInterface<'_> {
    fn show_error(&mut self, message: &str) -> Result<()> {
        loop {
            let view = &*self.screen;
            self.terminal.draw(|f| {
                ui::draw_form(f, view);
                ui::draw_error_dialog(f, message);
            })?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    return Ok(());
                }
            }
        }
    }

    fn confirm(&mut self, message: &str) -> Result<Confirmation> {
        // Default to No: every confirmation here guards something sticky.
        let mut yes_selected = false;
        loop {
            let view = &*self.screen;
            self.terminal.draw(|f| {
                ui::draw_form(f, view);
                ui::draw_confirm_dialog(f, message, yes_selected);
            })?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                        yes_selected = !yes_selected;
                    }
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(Confirmation::Yes),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        return Ok(Confirmation::No)
                    }
                    KeyCode::Enter => {
                        return Ok(if yes_selected {
                            Confirmation::Yes
                        } else {
                            Confirmation::No
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    fn clear_field(&mut self, field: Field) {
        self.screen.clear_field(field);
    }

    fn focus_field(&mut self, field: Field) {
        self.screen.focus_field(field);
    }

    fn begin_wait(&mut self, message: &str) -> Result<()> {
        self.wait_message = Some(message.to_string());
        self.draw_wait_frame()
    }

    fn end_wait(&mut self) {
        self.wait_message = None;
    }

    fn tick(&mut self) {
        // Cooperative yield mid-walk: refresh the wait window and drop any
        // keys typed into it. Draw errors are not worth aborting the walk.
        let _ = self.draw_wait_frame();
        drain_pending_events();
    }
}
