//! Run configuration.
//!
//! Everything the batch needs is resolved here from CLI flags and the
//! environment (a `.env` file is loaded first by `main`), so nothing
//! downstream reads the working directory or process state on its own.

use std::path::PathBuf;

use crate::munkipkg::DEFAULT_TOOL;

/// Environment variable overriding the packaging tool.
pub const TOOL_ENV: &str = "MUNKIBATCH_TOOL";

/// munkibatch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory to build, or to scan for projects (default: `.`)
    pub directory: PathBuf,
    /// Directory whose `build/` receives every package (default: `.`)
    pub build_location: PathBuf,
    /// Packaging tool name or path (default: `munkipkg`)
    pub tool: String,
    /// Suppress informational output
    pub quiet: bool,
    /// Keep the ownership written by `munkipkg --sync` instead of resetting it
    pub keep_bom_owner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            build_location: PathBuf::from("."),
            tool: DEFAULT_TOOL.to_string(),
            quiet: false,
            keep_bom_owner: false,
        }
    }
}

impl Config {
    /// Whether ownership is reset after each build.
    pub fn reset_owner(&self) -> bool {
        !self.keep_bom_owner
    }
}
