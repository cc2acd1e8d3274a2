//! Core wizard types
//!
//! Form input collected from the operator, the apply outcome reported back
//! to the caller, and the set of focusable form fields.

use strum::{Display, EnumIter};

/// Everything the create-user form collects for one provisioning attempt.
///
/// Built from the screen state immediately before apply and not mutated
/// afterwards; the screen keeps its own editable copy of the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub confirm_password: String,
    /// Add the account to the privileged groups.
    pub wants_admin: bool,
    /// Set once the external network-auth helper has been run; an empty
    /// username is then accepted without further checks.
    pub network_auth_done: bool,
}

/// Result of one apply attempt.
///
/// `Failure` covers every operator-correctable rejection; unrecoverable
/// conditions are reported as errors instead and must be treated as
/// failures by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Success,
    Failure,
}

impl ApplyOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, ApplyOutcome::Success)
    }
}

/// Focusable fields of the create-user screen, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Field {
    #[strum(serialize = "Full name")]
    FullName,
    #[strum(serialize = "Username")]
    Username,
    #[strum(serialize = "Password")]
    Password,
    #[strum(serialize = "Confirm password")]
    Confirm,
    #[strum(serialize = "Add to administrators group")]
    Admin,
    #[strum(serialize = "Use network login")]
    NetworkLogin,
    #[strum(serialize = "Create account")]
    CreateButton,
}

impl Field {
    /// Whether the field holds editable text (as opposed to a toggle or
    /// button).
    pub fn is_entry(self) -> bool {
        matches!(
            self,
            Field::FullName | Field::Username | Field::Password | Field::Confirm
        )
    }

    /// Whether the field's text should be masked on screen.
    pub fn is_secret(self) -> bool {
        matches!(self, Field::Password | Field::Confirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_field_order_starts_with_full_name() {
        let first = Field::iter().next().unwrap();
        assert_eq!(first, Field::FullName);
    }

    #[test]
    fn test_entry_fields() {
        assert!(Field::Username.is_entry());
        assert!(Field::Confirm.is_entry());
        assert!(!Field::Admin.is_entry());
        assert!(!Field::CreateButton.is_entry());
    }

    #[test]
    fn test_secret_fields() {
        assert!(Field::Password.is_secret());
        assert!(Field::Confirm.is_secret());
        assert!(!Field::Username.is_secret());
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(ApplyOutcome::Success.is_success());
        assert!(!ApplyOutcome::Failure.is_success());
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(Field::FullName.to_string(), "Full name");
        assert_eq!(Field::Confirm.to_string(), "Confirm password");
    }
}
