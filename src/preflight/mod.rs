//! Preflight checks for a batch run.
//!
//! Everything that would make the whole run pointless is checked before
//! the first package is touched: privileges, the packaging tool, and both
//! directory arguments.

mod environment;
mod host_tools;
mod types;

use std::path::PathBuf;

use anyhow::{bail, Result};
use nix::unistd::Uid;

use crate::config::Config;
use crate::output::Reporter;

pub use environment::check_directory;
pub use host_tools::{check_root, check_tool};
pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks as `euid`.
pub fn run_preflight_as(config: &Config, euid: Uid) -> PreflightReport {
    let mut checks = Vec::new();

    checks.push(check_root(euid));

    let (tool_check, tool_path) = check_tool(&config.tool);
    checks.push(tool_check);

    checks.push(check_directory("directory", &config.directory));
    checks.push(check_directory("build location", &config.build_location));

    PreflightReport { checks, tool_path }
}

/// Run all preflight checks as the current effective user.
pub fn run_preflight(config: &Config) -> PreflightReport {
    run_preflight_as(config, nix::unistd::geteuid())
}

/// Run preflight, report failures, and bail if any check failed.
///
/// Returns the resolved packaging tool on success.
pub fn run_preflight_or_fail(config: &Config, reporter: &Reporter) -> Result<PathBuf> {
    let report = run_preflight(config);
    report.print(reporter);

    let passed = report.all_passed();
    let failed = report.fail_count();
    match report.tool_path {
        Some(path) if passed => Ok(path),
        _ => bail!("Preflight failed: {} check(s) failed", failed),
    }
}
