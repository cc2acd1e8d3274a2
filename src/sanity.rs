//! Pre-flight sanity checks for the runtime environment
//!
//! Verifies before the TUI starts that the account tools the wizard drives
//! are installed and that we run with root privileges (EUID 0). Failures
//! are printed to stderr and abort the program while stderr is still
//! usable.

use std::process::Command;

use tracing::{debug, info, warn};

/// Result of environment verification
#[derive(Debug)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
    pub is_root: bool,
}

impl SanityCheckResult {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty() && self.is_root
    }
}

/// Account tools the apply workflow shells out to.
const REQUIRED_BINARIES: &[&str] = &[
    "useradd",  // account creation
    "usermod",  // GECOS / primary group updates
    "groupadd", // matching per-user group
    "gpasswd",  // privileged group membership
    "chpasswd", // non-interactive password hashing
];

/// Binaries used opportunistically (warn if missing but don't fail)
const OPTIONAL_BINARIES: &[&str] = &[
    "restorecon", // SELinux relabeling of adopted home directories
];

/// Check if a binary is available in PATH
fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Check if running as root (EUID 0)
fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Perform all sanity checks and return the result
pub fn verify_environment() -> SanityCheckResult {
    let mut missing = Vec::new();

    for binary in REQUIRED_BINARIES {
        if !binary_exists(binary) {
            missing.push((*binary).to_string());
        }
    }

    for binary in OPTIONAL_BINARIES {
        if !binary_exists(binary) {
            debug!(binary, "optional binary not found");
        }
    }

    SanityCheckResult {
        missing_binaries: missing,
        is_root: is_running_as_root(),
    }
}

/// Print a clear error message to stderr and exit. Called before the TUI
/// takes over the terminal.
pub fn print_error_and_exit(result: &SanityCheckResult) -> ! {
    eprintln!();
    eprintln!("firstboot-tui: pre-flight check failed");
    eprintln!();

    if !result.is_root {
        eprintln!("error: root privileges required");
        eprintln!("  Creating accounts and fixing home-directory ownership needs EUID 0.");
        eprintln!("  Run with sudo or as root.");
        eprintln!();
    }

    if !result.missing_binaries.is_empty() {
        eprintln!("error: missing required binaries");
        for binary in &result.missing_binaries {
            eprintln!("  - {} (install: {})", binary, package_hint(binary));
        }
        eprintln!();
    }

    eprintln!("Fix the above issues and try again.");
    std::process::exit(1);
}

/// Map a binary to the package that usually provides it.
fn package_hint(binary: &str) -> &'static str {
    match binary {
        "useradd" | "usermod" | "groupadd" | "gpasswd" | "chpasswd" => "shadow-utils",
        "restorecon" => "policycoreutils",
        _ => "unknown",
    }
}

/// Skip root check (for development/testing).
/// Set FIRSTBOOT_SKIP_ROOT_CHECK=1 to skip.
pub fn should_skip_root_check() -> bool {
    std::env::var("FIRSTBOOT_SKIP_ROOT_CHECK")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Verify the environment and exit if checks fail. `skip_root` allows
/// unprivileged development runs.
pub fn run_preflight_checks(skip_root: bool) {
    debug!(skip_root, "running pre-flight sanity checks");

    let mut result = verify_environment();

    if skip_root || should_skip_root_check() {
        warn!("root check skipped");
        result.is_root = true;
    }

    if !result.is_ok() {
        print_error_and_exit(&result);
    }

    info!("pre-flight checks passed");
}
