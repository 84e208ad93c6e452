//! Package source classification.
//!
//! A munkipkg project directory needs a `payload/` or `scripts/` directory,
//! a `Bom.txt`, and a `build-info` file in one of the supported formats.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Marker subdirectories; at least one must exist.
pub const CONTENT_DIRS: [&str; 2] = ["payload", "scripts"];

/// Ownership manifest read by `munkipkg --sync`.
pub const BOM_FILE: &str = "Bom.txt";

/// Base name of the build configuration file.
pub const BUILD_INFO_STEM: &str = "build-info";

/// Supported build-info formats, in lookup order.
pub const BUILD_INFO_EXTENSIONS: [&str; 3] = ["plist", "json", "yml"];

/// Why a directory is not a package source.
///
/// Only the first unmet requirement is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("{} missing payload and scripts directories", .0.display())]
    MissingPayloadAndScripts(PathBuf),

    #[error("{} missing Bom.txt", .0.display())]
    MissingBom(PathBuf),

    #[error("{} missing build-info file", .0.display())]
    MissingBuildInfo(PathBuf),
}

/// Format of the project's build-info file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildInfoFormat {
    Plist,
    Json,
    Yaml,
}

impl BuildInfoFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "plist" => Some(Self::Plist),
            "json" => Some(Self::Json),
            "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for BuildInfoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plist => "plist",
            Self::Json => "json",
            Self::Yaml => "yml",
        };
        f.write_str(s)
    }
}

/// A directory that passed classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    root: PathBuf,
    build_info: BuildInfoFormat,
}

impl PackageSource {
    /// Classify `dir`, checking payload/scripts, then Bom.txt, then build-info.
    pub fn classify(dir: &Path) -> Result<Self, ClassifyError> {
        if !CONTENT_DIRS.iter().any(|d| dir.join(d).is_dir()) {
            return Err(ClassifyError::MissingPayloadAndScripts(dir.to_path_buf()));
        }

        if !dir.join(BOM_FILE).is_file() {
            return Err(ClassifyError::MissingBom(dir.to_path_buf()));
        }

        let build_info = BUILD_INFO_EXTENSIONS
            .iter()
            .find(|ext| dir.join(format!("{BUILD_INFO_STEM}.{ext}")).is_file())
            .and_then(|ext| BuildInfoFormat::from_extension(ext))
            .ok_or_else(|| ClassifyError::MissingBuildInfo(dir.to_path_buf()))?;

        tracing::trace!(dir = %dir.display(), %build_info, "classified as package source");
        Ok(Self {
            root: dir.to_path_buf(),
            build_info,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build_info(&self) -> BuildInfoFormat {
        self.build_info
    }

    /// Short label for messages: the directory's file name, or the full path.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}
