//! External network-authentication helper
//!
//! Launches the configured helper (Kerberos/NIS/etc. setup tool) and blocks
//! until it exits, polling at a fixed interval while a caller-supplied pump
//! keeps the interface alive. The wizard only cares that the helper ran;
//! its exit status is reported but any configuration it made is its own.

use std::process::Command;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{FirstbootError, Result};

/// How often the child is polled while waiting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the helper command line and wait for it to exit, invoking `pump`
/// between polls. Returns whether the helper exited successfully.
pub fn run_auth_helper(command: &[String], pump: &mut dyn FnMut()) -> Result<bool> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| FirstbootError::system("network-auth helper command is empty"))?;

    info!(helper = %program, "launching network-auth helper");
    let mut child = Command::new(program).args(args).spawn().map_err(|err| {
        FirstbootError::system(format!("failed to launch {}: {}", program, err))
    })?;

    loop {
        pump();
        match child.try_wait()? {
            Some(status) => {
                debug!(helper = %program, %status, "network-auth helper exited");
                return Ok(status.success());
            }
            None => std::thread::sleep(POLL_INTERVAL),
        }
    }
}
