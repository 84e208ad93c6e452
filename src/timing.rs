//! Package build timing.

use std::time::Instant;

use crate::output::Reporter;

/// A simple timer for measuring how long one package took.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer with the given label.
    pub fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Finish the timer and report the elapsed time.
    pub fn finish(self, reporter: &Reporter) {
        let secs = self.start.elapsed().as_secs_f64();
        tracing::debug!(package = %self.name, secs, "package pipeline finished");
        if secs >= 60.0 {
            reporter.info(format!("[{:.1}m] {}", secs / 60.0, self.name));
        } else {
            reporter.info(format!("[{:.1}s] {}", secs, self.name));
        }
    }
}
