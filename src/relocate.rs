//! Artifact relocation.
//!
//! munkipkg leaves built packages in `<project>/build/`. They are collected
//! into `<build-location>/build/` and handed to the project's owner.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::Reporter;
use crate::ownership::Owner;

/// Name of the build output directory, both per project and central.
pub const BUILD_DIR: &str = "build";

/// Suffix identifying a built installer package.
pub const ARTIFACT_SUFFIX: &str = ".pkg";

/// What happened to one project's build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// The project has no `build/` directory; nothing was moved.
    NoBuildDir,
    /// Artifacts were moved.
    Moved {
        /// Destination path of each moved artifact.
        artifacts: Vec<PathBuf>,
        /// Whether the emptied local `build/` was removed.
        removed_build_dir: bool,
    },
}

/// True if `name` is a built package.
pub fn is_artifact(name: &str) -> bool {
    name.ends_with(ARTIFACT_SUFFIX)
}

/// Move every artifact from `pkg_dir/build` into `build_location/build`.
///
/// The owner is read from `pkg_dir` now, after the build, and applied to
/// the central build directory (when created) and to every moved artifact.
/// The local build directory is removed only if nothing but artifacts was
/// in it.
pub fn relocate_artifacts(
    build_location: &Path,
    pkg_dir: &Path,
    reporter: &Reporter,
) -> Result<Relocation> {
    let local_build = pkg_dir.join(BUILD_DIR);
    if !local_build.exists() {
        reporter.error(format!("no build directory in {}", pkg_dir.display()));
        return Ok(Relocation::NoBuildDir);
    }

    let owner = Owner::of(pkg_dir)?;

    let central_build = build_location.join(BUILD_DIR);
    if !central_build.exists() {
        reporter.info(format!("creating {}", central_build.display()));
        fs::create_dir_all(&central_build)
            .with_context(|| format!("Failed to create {}", central_build.display()))?;
        owner.apply(&central_build)?;
    }

    let entries = sorted_entries(&local_build)?;

    // Building in place: the project's build/ is the central one.
    if same_dir(&local_build, &central_build)? {
        reporter.info(format!("{} is already the build location", local_build.display()));
        let mut artifacts = Vec::new();
        for entry in entries {
            if is_artifact(&entry.file_name().to_string_lossy()) {
                owner.apply(&entry.path())?;
                artifacts.push(central_build.join(entry.file_name()));
            }
        }
        return Ok(Relocation::Moved {
            artifacts,
            removed_build_dir: false,
        });
    }

    let mut artifacts = Vec::new();
    let mut leftovers = false;
    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !is_artifact(&name) {
            tracing::debug!(entry = %name, "leaving non-artifact in build directory");
            leftovers = true;
            continue;
        }

        let dest = central_build.join(entry.file_name());
        move_path(&entry.path(), &dest)?;
        owner.apply(&dest)?;
        reporter.info(format!("{} moved to {}", name, central_build.display()));
        artifacts.push(dest);
    }

    let removed_build_dir = !leftovers;
    if removed_build_dir {
        reporter.info(format!("removing empty directory {}", local_build.display()));
        fs::remove_dir_all(&local_build)
            .with_context(|| format!("Failed to remove {}", local_build.display()))?;
    }

    Ok(Relocation::Moved {
        artifacts,
        removed_build_dir,
    })
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .collect::<io::Result<_>>()
        .with_context(|| format!("Failed to read {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn same_dir(a: &Path, b: &Path) -> Result<bool> {
    let a = fs::canonicalize(a).with_context(|| format!("Failed to resolve {}", a.display()))?;
    let b = fs::canonicalize(b).with_context(|| format!("Failed to resolve {}", b.display()))?;
    Ok(a == b)
}

/// Rename `src` to `dest`, copying when they are on different filesystems.
///
/// An existing bundle at `dest` is replaced, as rename already does for files.
fn move_path(src: &Path, dest: &Path) -> Result<()> {
    if dest.is_dir() && !dest.is_symlink() {
        tracing::debug!(dest = %dest.display(), "replacing existing bundle");
        fs::remove_dir_all(dest)
            .with_context(|| format!("Failed to remove {}", dest.display()))?;
    }
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(nix::libc::EXDEV) => {
            tracing::debug!(src = %src.display(), dest = %dest.display(), "cross-device move, copying");
            copy_then_remove(src, dest)
        }
        Err(e) => Err(e).with_context(|| {
            format!("Failed to move {} to {}", src.display(), dest.display())
        }),
    }
}

fn copy_then_remove(src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        for entry in walkdir::WalkDir::new(src) {
            let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
            let rel = entry
                .path()
                .strip_prefix(src)
                .context("walkdir yielded a path outside its root")?;
            let target = dest.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("Failed to create {}", target.display()))?;
            } else if entry.file_type().is_symlink() {
                let link = fs::read_link(entry.path())?;
                std::os::unix::fs::symlink(&link, &target)
                    .with_context(|| format!("Failed to link {}", target.display()))?;
            } else {
                fs::copy(entry.path(), &target)
                    .with_context(|| format!("Failed to copy to {}", target.display()))?;
            }
        }
        fs::remove_dir_all(src).with_context(|| format!("Failed to remove {}", src.display()))?;
    } else {
        fs::copy(src, dest)
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;
        fs::remove_file(src).with_context(|| format!("Failed to remove {}", src.display()))?;
    }
    Ok(())
}
