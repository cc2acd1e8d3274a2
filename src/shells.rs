//! Login shell enumeration
//!
//! Reads the `/etc/shells`-style list of valid login shells. Used to decide
//! whether the system already has at least one account capable of logging
//! in when the operator leaves the username blank.

use std::io;
use std::path::Path;

/// Shell that marks an account as not login-capable.
pub const NOLOGIN_SHELL: &str = "/sbin/nologin";

/// Read the list of usable login shells: blank lines, comments, and the
/// nologin shell are dropped.
pub fn login_shells(path: &Path) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && *line != NOLOGIN_SHELL)
        .map(str::to_string)
        .collect())
}
