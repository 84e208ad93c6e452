//! Batch orchestration.
//!
//! The target directory is either a munkipkg project itself, in which case
//! only it is built, or a parent whose immediate subdirectories are each
//! built independently. Per project the pipeline is:
//!
//! 1. `munkipkg --sync` (Bom.txt permissions)
//! 2. `munkipkg` build
//! 3. move `build/*.pkg` to the central build location
//! 4. reset ownership to the project's owner (unless `--owner`)
//!
//! A failed step stops steps 1-3 for that project only; the ownership
//! reset still runs so a partial sync is undone. Nothing that happens to
//! one project stops the batch.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::munkipkg::Munkipkg;
use crate::output::Reporter;
use crate::ownership;
use crate::package::{ClassifyError, PackageSource};
use crate::relocate::{self, Relocation};
use crate::timing::Timer;

/// How the target directory is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The target is a project; build only it.
    Package(PackageSource),
    /// The target is not a project; scan its subdirectories.
    Scan(PathBuf),
}

impl Target {
    /// Classify the target directory.
    pub fn classify(dir: &Path, reporter: &Reporter) -> Self {
        match PackageSource::classify(dir) {
            Ok(pkg) => Target::Package(pkg),
            Err(e) => {
                reporter.error(e.to_string());
                Target::Scan(dir.to_path_buf())
            }
        }
    }
}

/// Final state of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    /// Built and relocated; holds the relocated artifact paths.
    Built(Vec<PathBuf>),
    /// The build produced no `build/` directory.
    NoOutput,
    /// A step failed; holds the reported message.
    Failed(String),
}

/// Result of running the pipeline on one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub dir: PathBuf,
    pub status: PackageStatus,
    /// Whether ownership was reset afterwards.
    pub owner_reset: bool,
}

/// Everything a batch run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Projects that went through the pipeline, in order.
    pub packages: Vec<PackageReport>,
    /// Subdirectories skipped by classification.
    pub skipped: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn built(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages
            .iter()
            .filter(|p| matches!(p.status, PackageStatus::Built(_)))
    }

    pub fn failed(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages
            .iter()
            .filter(|p| !matches!(p.status, PackageStatus::Built(_)))
    }

    /// Every relocated artifact across the batch.
    pub fn artifacts(&self) -> Vec<&Path> {
        self.packages
            .iter()
            .filter_map(|p| match &p.status {
                PackageStatus::Built(artifacts) => Some(artifacts),
                _ => None,
            })
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn print(&self, reporter: &Reporter) {
        reporter.info(format!(
            "{} built, {} failed, {} skipped, {} package(s) collected",
            self.built().count(),
            self.failed().count(),
            self.skipped.len(),
            self.artifacts().len()
        ));
    }
}

/// Runs the pipeline over a target directory.
pub struct Batch {
    config: Config,
    tool: Munkipkg,
    reporter: Reporter,
}

impl Batch {
    /// `tool_path` is the packaging tool resolved during preflight.
    pub fn new(config: Config, tool_path: PathBuf) -> Self {
        let tool = Munkipkg::new(tool_path, config.quiet);
        let reporter = Reporter::new(config.quiet);
        Self {
            config,
            tool,
            reporter,
        }
    }

    /// Build the target, or every project directly under it.
    pub fn run(&self) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        tracing::debug!(
            tool = %self.tool.path().display(),
            directory = %self.config.directory.display(),
            build_location = %self.config.build_location.display(),
            "starting batch"
        );

        match Target::classify(&self.config.directory, &self.reporter) {
            Target::Package(pkg) => {
                summary.packages.push(self.process_package(&pkg));
            }
            Target::Scan(dir) => {
                self.reporter
                    .info(format!("examining directories in {}", dir.display()));
                for sub in subdirectories(&dir)? {
                    match self.classify_subdirectory(&sub) {
                        Ok(pkg) => summary.packages.push(self.process_package(&pkg)),
                        Err(_) => summary.skipped.push(sub),
                    }
                }
            }
        }

        Ok(summary)
    }

    fn classify_subdirectory(&self, dir: &Path) -> Result<PackageSource, ClassifyError> {
        PackageSource::classify(dir).inspect_err(|e| self.reporter.error(e.to_string()))
    }

    /// Sync, build, relocate, and (unless disabled) reset ownership.
    pub fn process_package(&self, pkg: &PackageSource) -> PackageReport {
        let timer = Timer::start(&pkg.name());
        tracing::debug!(dir = %pkg.root().display(), build_info = %pkg.build_info(), "processing package");

        let status = match self.build_and_collect(pkg) {
            Ok(status) => status,
            Err(e) => {
                let msg = format!("{:#}", e);
                self.reporter.error(&msg);
                PackageStatus::Failed(msg)
            }
        };

        let mut owner_reset = false;
        if self.config.reset_owner() {
            match ownership::reset_owner(pkg.root(), &self.reporter) {
                Ok(_) => owner_reset = true,
                Err(e) => self.reporter.error(format!("{:#}", e)),
            }
        }

        timer.finish(&self.reporter);

        PackageReport {
            dir: pkg.root().to_path_buf(),
            status,
            owner_reset,
        }
    }

    fn build_and_collect(&self, pkg: &PackageSource) -> Result<PackageStatus> {
        self.tool.sync_permissions(pkg.root())?;
        self.tool.build(pkg.root())?;

        let relocation =
            relocate::relocate_artifacts(&self.config.build_location, pkg.root(), &self.reporter)?;
        Ok(match relocation {
            Relocation::NoBuildDir => PackageStatus::NoOutput,
            Relocation::Moved { artifacts, .. } => PackageStatus::Built(artifacts),
        })
    }
}

/// Immediate subdirectories of `dir`, sorted by name. Other entries are ignored.
pub fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}
