//! Username and full-name well-formedness checks
//!
//! Usernames follow the POSIX portable rules enforced by the shadow-utils
//! tools; full names only need to survive the GECOS field of the passwd
//! database. Both checks return a message suitable for an error dialog.

use crate::error::{FirstbootError, Result};

/// Maximum username length accepted by useradd.
pub const MAX_USERNAME_LEN: usize = 32;

/// Maximum full-name length stored in the GECOS field.
pub const MAX_REALNAME_LEN: usize = 128;

/// Check that a username is acceptable to the account tools: lowercase
/// letters, digits, `_`, `.` and `-`, starting with a letter or underscore.
pub fn check_username(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FirstbootError::validation("The username must not be empty."));
    }
    if name.len() > MAX_USERNAME_LEN {
        return Err(FirstbootError::validation(format!(
            "The username must be at most {} characters long.",
            MAX_USERNAME_LEN
        )));
    }
    if name == "." || name == ".." {
        return Err(FirstbootError::validation(format!(
            "'{}' is not a valid username.",
            name
        )));
    }

    let mut chars = name.chars();
    // First character rule is stricter than the rest.
    if let Some(first) = chars.next() {
        if !(first.is_ascii_lowercase() || first == '_') {
            return Err(FirstbootError::validation(
                "The username must start with a lowercase letter or an underscore.",
            ));
        }
    }
    for c in chars {
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')) {
            return Err(FirstbootError::validation(format!(
                "The username contains an invalid character: '{}'.",
                c
            )));
        }
    }
    Ok(())
}

/// Check that a full name can be stored in the GECOS field: no colons, no
/// control characters.
pub fn check_realname(name: &str) -> Result<()> {
    if name.len() > MAX_REALNAME_LEN {
        return Err(FirstbootError::validation(format!(
            "The full name must be at most {} characters long.",
            MAX_REALNAME_LEN
        )));
    }
    if name.contains(':') {
        return Err(FirstbootError::validation(
            "The full name must not contain the ':' character.",
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(FirstbootError::validation(
            "The full name must not contain control characters.",
        ));
    }
    Ok(())
}
