//! Create-user screen state
//!
//! Owns the editable form fields, the focus cycle, and the entry-changed
//! behaviors: guessing a username from the full name until the operator
//! edits the username by hand, the password strength readout, and the
//! confirm-match indicator. Key handling mirrors the wizard's other
//! dialogs: Tab/arrows move focus, Enter activates, Esc backs out.

use crossterm::event::{KeyCode, KeyEvent};
use strum::IntoEnumIterator;
use tracing::warn;

use crate::accounts::AccountDatabase;
use crate::pwcheck::{self, Strength};
use crate::types::{Field, FormInput};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Continue,
    /// Operator activated the create-account action.
    Apply,
    /// Operator asked for the network login helper.
    NetworkLogin,
    /// Operator backed out of the wizard.
    Quit,
}

/// State of the create-user form.
#[derive(Debug)]
pub struct CreateUserScreen {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub wants_admin: bool,
    /// Admin membership is mandatory (no other administrator exists).
    pub admin_forced: bool,
    /// The external network-auth helper has been run.
    pub network_auth_done: bool,
    pub focus: Field,
    /// Keep deriving the username from the full name until the operator
    /// types a username directly.
    guess_username: bool,
}

impl Default for CreateUserScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateUserScreen {
    pub fn new() -> Self {
        CreateUserScreen {
            full_name: String::new(),
            username: String::new(),
            password: String::new(),
            confirm: String::new(),
            wants_admin: false,
            admin_forced: false,
            network_auth_done: false,
            focus: Field::FullName,
            guess_username: true,
        }
    }

    /// Reset the form and work out the admin-checkbox default: when root's
    /// password is locked and the first privileged group is empty, the new
    /// account must be an administrator and the checkbox is pinned.
    pub fn initialize(&mut self, db: &dyn AccountDatabase, admin_group: &str) {
        self.reset();

        let forced = (|| -> crate::error::Result<bool> {
            let Some(root) = db.lookup_user_by_uid(0)? else {
                return Ok(false);
            };
            let members = db.enumerate_group_members(admin_group)?;
            Ok(root.locked && members.is_empty())
        })();

        match forced {
            Ok(true) => {
                self.wants_admin = true;
                self.admin_forced = true;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(error = %err, "could not determine admin default");
            }
        }
    }

    /// Blank every field and restore the initial focus.
    pub fn reset(&mut self) {
        self.full_name.clear();
        self.username.clear();
        self.password.clear();
        self.confirm.clear();
        self.focus = Field::FullName;
        self.guess_username = true;
    }

    /// Snapshot the form for one apply attempt.
    pub fn form_input(&self) -> FormInput {
        FormInput {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm.clone(),
            wants_admin: self.wants_admin,
            network_auth_done: self.network_auth_done,
        }
    }

    /// Strength readout for the meter next to the password field.
    pub fn strength(&self) -> Strength {
        let username = if self.username.is_empty() {
            None
        } else {
            Some(self.username.as_str())
        };
        pwcheck::estimate(&self.password, username)
    }

    /// Confirm indicator: `None` while the password is empty, otherwise
    /// whether the confirmation matches.
    pub fn confirm_matches(&self) -> Option<bool> {
        if self.password.is_empty() {
            None
        } else {
            Some(self.password == self.confirm)
        }
    }

    pub fn clear_field(&mut self, field: Field) {
        match field {
            Field::FullName => self.full_name.clear(),
            Field::Username => {
                self.username.clear();
                self.guess_username = true;
            }
            Field::Password => self.password.clear(),
            Field::Confirm => self.confirm.clear(),
            _ => {}
        }
    }

    pub fn focus_field(&mut self, field: Field) {
        self.focus = field;
    }

    fn next_field(&mut self) {
        let fields: Vec<Field> = Field::iter().collect();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + 1) % fields.len()];
    }

    fn prev_field(&mut self) {
        let fields: Vec<Field> = Field::iter().collect();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(idx + fields.len() - 1) % fields.len()];
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenEvent {
        match key.code {
            KeyCode::Esc => return ScreenEvent::Quit,
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.prev_field(),
            KeyCode::Enter => match self.focus {
                Field::CreateButton => return ScreenEvent::Apply,
                Field::NetworkLogin => return ScreenEvent::NetworkLogin,
                Field::Admin => self.toggle_admin(),
                _ => self.next_field(),
            },
            KeyCode::Char(' ') if self.focus == Field::Admin => self.toggle_admin(),
            KeyCode::Char(c) => self.push_char(c),
            KeyCode::Backspace => self.pop_char(),
            _ => {}
        }
        ScreenEvent::Continue
    }

    fn toggle_admin(&mut self) {
        if !self.admin_forced {
            self.wants_admin = !self.wants_admin;
        }
    }

    fn push_char(&mut self, c: char) {
        match self.focus {
            Field::FullName => {
                self.full_name.push(c);
                self.refresh_guess();
            }
            Field::Username => {
                self.username.push(c);
                self.guess_username = self.username.is_empty();
            }
            Field::Password => self.password.push(c),
            Field::Confirm => self.confirm.push(c),
            _ => {}
        }
    }

    fn pop_char(&mut self) {
        match self.focus {
            Field::FullName => {
                self.full_name.pop();
                self.refresh_guess();
            }
            Field::Username => {
                self.username.pop();
                self.guess_username = self.username.is_empty();
            }
            Field::Password => {
                self.password.pop();
            }
            Field::Confirm => {
                self.confirm.pop();
            }
            _ => {}
        }
    }

    fn refresh_guess(&mut self) {
        if self.guess_username {
            self.username = guess_username(&self.full_name);
        }
    }
}

/// Derive a username candidate from a full name: first word, lowercased,
/// reduced to ASCII. Characters without an obvious ASCII fold are dropped;
/// validation still has the final say.
pub fn guess_username(full_name: &str) -> String {
    let Some(first_word) = full_name.split_whitespace().next() else {
        return String::new();
    };

    first_word
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(fold_ascii)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
        .collect()
}

/// Fold common accented Latin letters to their ASCII base; pass ASCII
/// through and drop the rest.
fn fold_ascii(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ß' => 's',
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut CreateUserScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_guess_username_from_full_name() {
        assert_eq!(guess_username("Alice Jones"), "alice");
        assert_eq!(guess_username("  Bob "), "bob");
        assert_eq!(guess_username(""), "");
    }

    #[test]
    fn test_guess_username_folds_accents() {
        assert_eq!(guess_username("José García"), "jose");
        assert_eq!(guess_username("Ümit"), "umit");
        assert_eq!(guess_username("François"), "francois");
    }

    #[test]
    fn test_guess_username_drops_unfoldable() {
        assert_eq!(guess_username("Алексей"), "");
    }

    #[test]
    fn test_typing_full_name_tracks_username() {
        let mut screen = CreateUserScreen::new();
        type_text(&mut screen, "Alice Jones");
        assert_eq!(screen.username, "alice");
    }

    #[test]
    fn test_manual_username_stops_guessing() {
        let mut screen = CreateUserScreen::new();
        type_text(&mut screen, "Alice");
        screen.focus = Field::Username;
        type_text(&mut screen, "x");
        assert_eq!(screen.username, "alicex");

        screen.focus = Field::FullName;
        type_text(&mut screen, " Jones");
        // No longer tracking the full name.
        assert_eq!(screen.username, "alicex");
    }

    #[test]
    fn test_clearing_username_resumes_guessing() {
        let mut screen = CreateUserScreen::new();
        type_text(&mut screen, "Alice");
        screen.focus = Field::Username;
        type_text(&mut screen, "x");
        for _ in 0..6 {
            screen.handle_key(key(KeyCode::Backspace));
        }
        assert!(screen.username.is_empty());

        screen.focus = Field::FullName;
        type_text(&mut screen, "!");
        assert_eq!(screen.username, "alice");
    }

    #[test]
    fn test_focus_cycle_wraps() {
        let mut screen = CreateUserScreen::new();
        assert_eq!(screen.focus, Field::FullName);
        screen.handle_key(key(KeyCode::BackTab));
        assert_eq!(screen.focus, Field::CreateButton);
        screen.handle_key(key(KeyCode::Tab));
        assert_eq!(screen.focus, Field::FullName);
    }

    #[test]
    fn test_enter_on_create_button_applies() {
        let mut screen = CreateUserScreen::new();
        screen.focus = Field::CreateButton;
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), ScreenEvent::Apply);
    }

    #[test]
    fn test_enter_on_entry_advances_focus() {
        let mut screen = CreateUserScreen::new();
        assert_eq!(
            screen.handle_key(key(KeyCode::Enter)),
            ScreenEvent::Continue
        );
        assert_eq!(screen.focus, Field::Username);
    }

    #[test]
    fn test_admin_toggle() {
        let mut screen = CreateUserScreen::new();
        screen.focus = Field::Admin;
        screen.handle_key(key(KeyCode::Char(' ')));
        assert!(screen.wants_admin);
        screen.handle_key(key(KeyCode::Char(' ')));
        assert!(!screen.wants_admin);
    }

    #[test]
    fn test_forced_admin_cannot_be_unset() {
        let mut screen = CreateUserScreen::new();
        screen.wants_admin = true;
        screen.admin_forced = true;
        screen.focus = Field::Admin;
        screen.handle_key(key(KeyCode::Char(' ')));
        assert!(screen.wants_admin);
    }

    #[test]
    fn test_escape_quits() {
        let mut screen = CreateUserScreen::new();
        assert_eq!(screen.handle_key(key(KeyCode::Esc)), ScreenEvent::Quit);
    }

    #[test]
    fn test_confirm_indicator() {
        let mut screen = CreateUserScreen::new();
        assert_eq!(screen.confirm_matches(), None);
        screen.password = "secret".to_string();
        screen.confirm = "secret".to_string();
        assert_eq!(screen.confirm_matches(), Some(true));
        screen.confirm = "other".to_string();
        assert_eq!(screen.confirm_matches(), Some(false));
    }

    #[test]
    fn test_reset_blanks_everything() {
        let mut screen = CreateUserScreen::new();
        type_text(&mut screen, "Alice");
        screen.password = "pw".to_string();
        screen.focus = Field::Confirm;
        screen.reset();
        assert!(screen.full_name.is_empty());
        assert!(screen.username.is_empty());
        assert!(screen.password.is_empty());
        assert_eq!(screen.focus, Field::FullName);
    }
}
