//! munkipkg invocation.
//!
//! Two modes are used: `--sync` applies the permissions recorded in
//! `Bom.txt`, and the plain form builds the package into `<project>/build/`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::process::Cmd;

/// Default tool name looked up on `PATH`.
pub const DEFAULT_TOOL: &str = "munkipkg";

/// Which munkipkg operation ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Sync,
    Build,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Sync => f.write_str("permission sync"),
            Step::Build => f.write_str("build"),
        }
    }
}

/// A munkipkg step that did not succeed.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{step} of {} could not start: {cause:#}", .dir.display())]
    Spawn {
        step: Step,
        dir: PathBuf,
        cause: anyhow::Error,
    },

    #[error("{step} of {} failed (exit code {code})", .dir.display())]
    ExitStatus { step: Step, dir: PathBuf, code: i32 },
}

/// A resolved munkipkg executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Munkipkg {
    path: PathBuf,
    quiet: bool,
}

impl Munkipkg {
    pub fn new(path: impl Into<PathBuf>, quiet: bool) -> Self {
        Self {
            path: path.into(),
            quiet,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `munkipkg --sync <dir> [--quiet]`
    pub fn sync_command(&self, dir: &Path) -> Cmd {
        Cmd::new(&self.path)
            .arg("--sync")
            .arg_path(dir)
            .arg_if(self.quiet, "--quiet")
    }

    /// `munkipkg <dir> [--quiet]`
    pub fn build_command(&self, dir: &Path) -> Cmd {
        Cmd::new(&self.path)
            .arg_path(dir)
            .arg_if(self.quiet, "--quiet")
    }

    /// Apply `Bom.txt` ownership and modes to the project.
    pub fn sync_permissions(&self, dir: &Path) -> Result<(), StepError> {
        self.run(Step::Sync, dir, self.sync_command(dir))
    }

    /// Build the project into `<dir>/build/`.
    pub fn build(&self, dir: &Path) -> Result<(), StepError> {
        self.run(Step::Build, dir, self.build_command(dir))
    }

    fn run(&self, step: Step, dir: &Path, cmd: Cmd) -> Result<(), StepError> {
        let status = cmd.run_interactive().map_err(|cause| StepError::Spawn {
            step,
            dir: dir.to_path_buf(),
            cause,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(StepError::ExitStatus {
                step,
                dir: dir.to_path_buf(),
                code: status.code().unwrap_or(-1),
            })
        }
    }
}
