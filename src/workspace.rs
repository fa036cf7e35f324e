//! The transient build folder.
//!
//! Its name encodes every flag that changes the build output, so runs with
//! different flags in the same parent folder do not clobber each other.

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

use crate::flags::BuildConfig;

/// `tmp-<bits>-<par>-<thr>-<rev>[-<variant>]`; the variant suffix only
/// exists for per-user installers.
pub fn dir_name(cfg: &BuildConfig) -> String {
    let base = format!(
        "tmp-{}-{}-{}-{}",
        cfg.bitness, cfg.parallelism, cfg.threading, cfg.revision
    );
    if cfg.admin {
        return base;
    }
    let suffix = if cfg.python {
        "python"
    } else if cfg.gui {
        "gui"
    } else if cfg.msix {
        "msix"
    } else {
        "noadmin"
    };
    format!("{base}-{suffix}")
}

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Remove any leftover folder of the same name under `parent` and create
    /// it fresh.
    pub fn create_in(parent: &Path, cfg: &BuildConfig) -> Result<Self> {
        let path = parent.join(dir_name(cfg));
        remove_dir_if_exists(&path)?;
        std::fs::create_dir(&path).with_context(|| {
            format!("Cannot create temporary build folder: {}", path.display())
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where finished installers are placed: one level above the build folder.
    pub fn artifact_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(".."))
    }

    /// Delete the folder and everything in it.
    pub fn remove(&self) -> Result<()> {
        remove_dir_if_exists(&self.path)
    }
}

/// `rm -rf` that treats an absent folder as success.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}

/// Rename `from` to `to`, falling back to copy and delete across filesystems.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)
        .with_context(|| format!("failed to move {} to {}", from.display(), to.display()))?;
    std::fs::remove_file(from).with_context(|| format!("failed to remove {}", from.display()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
