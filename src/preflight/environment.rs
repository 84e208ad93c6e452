//! Directory argument checks.

use std::path::Path;

use super::types::CheckResult;

/// Check `path` is an existing directory.
pub fn check_directory(name: &str, path: &Path) -> CheckResult {
    if path.is_dir() {
        CheckResult::pass_with(name, &path.display().to_string())
    } else {
        CheckResult::fail(name, &format!("{} is not a directory", path.display()))
    }
}
