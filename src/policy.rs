//! Minimum-UID policy file parsing
//!
//! Reads the `login.defs`-style key/value file that defines `UID_MIN`, the
//! boundary between system and regular accounts. The file is re-read on
//! every apply so the wizard always sees the current policy.
//!
//! Line grammar:
//! - `KEY` followed by at least one space or tab, then an optional value.
//! - The value may be wrapped in double quotes; an unterminated quote runs
//!   to end of line, and trailing whitespace is dropped otherwise.
//! - Lines whose key starts with `#` (after leading whitespace) are
//!   comments. Lines with no separator after the key are ignored.
//! - Later definitions of a key override earlier ones.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use tracing::debug;

/// Fallback when `UID_MIN` is missing or unparseable.
pub const DEFAULT_UID_MIN: u32 = 500;

/// Parsed contents of a login.defs-style policy file.
#[derive(Debug, Clone, Default)]
pub struct LoginDefs {
    values: HashMap<String, String>,
}

impl LoginDefs {
    /// Parse policy text. Malformed lines are skipped, never fatal.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();

        for line in text.lines() {
            let line = line.trim_start_matches([' ', '\t']);
            if line.is_empty() {
                continue;
            }

            let Some(sep) = line.find([' ', '\t']) else {
                // Key with no separator: malformed, skip.
                debug!(line, "skipping policy line without a value");
                continue;
            };
            let (key, rest) = line.split_at(sep);
            if key.starts_with('#') {
                continue;
            }

            // Override semantics: the last definition wins.
            values.insert(key.to_string(), parse_value(rest));
        }

        LoginDefs { values }
    }

    /// Load and parse the policy file. A missing file yields an empty
    /// policy (all defaults); any other read error is propagated.
    pub fn load(path: &Path) -> io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "policy file absent, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Raw value of a key, if defined.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The minimum UID for regular accounts; anything below is a reserved
    /// system account.
    pub fn uid_min(&self) -> u32 {
        self.get("UID_MIN")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UID_MIN)
    }
}

/// Extract a value from the text following a key: skip the whitespace/quote
/// run, then read up to a closing quote or end of line.
fn parse_value(rest: &str) -> String {
    let rest = rest.trim_start_matches([' ', '\t', '"']);
    match rest.find('"') {
        Some(end) => rest[..end].to_string(),
        None => rest.trim_end().to_string(),
    }
}
