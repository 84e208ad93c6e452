//! Preflight check types and report.

use std::path::PathBuf;

use crate::output::Reporter;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - nothing will be built.
    Fail,
}

impl CheckResult {
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: None,
        }
    }

    pub fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details.to_string()),
        }
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: Some(details.to_string()),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// Results of all preflight checks.
#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
    /// Resolved packaging tool, when it was found.
    pub tool_path: Option<PathBuf>,
}

impl PreflightReport {
    /// Returns true if all checks passed (no failures).
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(CheckResult::passed)
    }

    /// Count of failed checks.
    pub fn fail_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed()).count()
    }

    /// Failed checks, in the order they ran.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed())
    }

    /// Report failures on stderr and passes as debug logs.
    pub fn print(&self, reporter: &Reporter) {
        for check in &self.checks {
            match (&check.status, &check.details) {
                (CheckStatus::Pass, details) => {
                    tracing::debug!(check = %check.name, details = ?details, "preflight passed");
                }
                (CheckStatus::Fail, Some(details)) => reporter.error(details),
                (CheckStatus::Fail, None) => reporter.error(format!("{} failed", check.name)),
            }
        }
    }
}
