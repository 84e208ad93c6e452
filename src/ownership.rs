//! Ownership capture and reset.
//!
//! `munkipkg --sync` applies the owners recorded in `Bom.txt`. Unless the
//! user asks to keep those, every path below a package is handed back to
//! whoever owns the package directory itself.

use std::fmt;
use std::os::unix::fs::{lchown, MetadataExt};
use std::path::Path;

use anyhow::{Context, Result};
use nix::unistd::{Gid, Group, Uid, User};
use walkdir::WalkDir;

use crate::output::Reporter;

/// Owning user and group of a path, with resolved names for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
    pub user: String,
    pub group: String,
}

impl Owner {
    /// Read the current owner of `path` (following symlinks).
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        Ok(Self::from_ids(meta.uid(), meta.gid()))
    }

    /// Build an owner from raw ids, resolving names where possible.
    pub fn from_ids(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            gid,
            user: user_name(uid),
            group: group_name(gid),
        }
    }

    /// Apply this owner to a single path without following symlinks.
    pub fn apply(&self, path: &Path) -> Result<()> {
        lchown(path, Some(self.uid), Some(self.gid))
            .with_context(|| format!("Failed to set owner of {} to {}", path.display(), self))
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user, self.group)
    }
}

// Accounts missing from the user database are shown by number.
fn user_name(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

fn group_name(gid: u32) -> String {
    match Group::from_gid(Gid::from_raw(gid)) {
        Ok(Some(group)) => group.name,
        _ => gid.to_string(),
    }
}

/// Reset every file and directory under `root` to `root`'s own owner.
///
/// Returns the owner that was applied and the number of entries touched.
pub fn reset_owner(root: &Path, reporter: &Reporter) -> Result<(Owner, usize)> {
    let owner = Owner::of(root)?;
    reporter.info(format!(
        "setting ownership of {} to {}",
        root.display(),
        owner
    ));

    let mut count = 0;
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry =
            entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        owner.apply(entry.path())?;
        count += 1;
    }

    tracing::debug!(root = %root.display(), %owner, count, "ownership reset");
    Ok((owner, count))
}
