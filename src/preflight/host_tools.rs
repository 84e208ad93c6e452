//! Privilege and packaging tool checks.

use std::path::PathBuf;

use nix::unistd::Uid;

use super::types::CheckResult;

/// Check the effective user is root.
///
/// `munkipkg --sync` and the ownership reset both chown files.
pub fn check_root(euid: Uid) -> CheckResult {
    if euid.is_root() {
        CheckResult::pass("root")
    } else {
        CheckResult::fail("root", "This tool must be run as root")
    }
}

/// Check the packaging tool resolves on `PATH` (or as a path to an executable).
pub fn check_tool(tool: &str) -> (CheckResult, Option<PathBuf>) {
    match which::which(tool) {
        Ok(path) => {
            let details = path.display().to_string();
            (CheckResult::pass_with(tool, &details), Some(path))
        }
        Err(e) => {
            tracing::debug!(tool, error = %e, "tool lookup failed");
            (
                CheckResult::fail(tool, &format!("{} not found in PATH", tool)),
                None,
            )
        }
    }
}
