//! Console output for batch runs.
//!
//! Informational lines go to stdout and respect `--quiet`.
//! Errors always go to stderr.

/// Prefix on every line this tool prints.
pub const PREFIX: &str = "munkibatch:";

/// Quiet-aware writer for user-facing messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print an informational message unless quiet.
    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{} {}", PREFIX, msg.as_ref());
        }
    }

    /// Print an error message. Never suppressed.
    pub fn error(&self, msg: impl AsRef<str>) {
        eprintln!("{} {}", PREFIX, msg.as_ref());
    }
}
