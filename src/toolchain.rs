//! MinGW cross toolchain discovery.
//!
//! Lookups are informational only. A tool that cannot be found is reported as
//! such in the settings summary and fails later when it is actually invoked.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::flags::Bitness;

/// Installer builder; the same binary serves both bitnesses.
const MAKENSIS: &str = "makensis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub bitness: Bitness,
    pub cc: Option<PathBuf>,
    pub cxx: Option<PathBuf>,
    pub fortran: Option<PathBuf>,
    pub archiver: Option<PathBuf>,
    pub size: Option<PathBuf>,
    pub makensis: Option<PathBuf>,
}

impl Toolchain {
    /// Probe the directories on `PATH`.
    pub fn probe(bitness: Bitness) -> Self {
        Self::probe_in(bitness, std::env::var_os("PATH"))
    }

    /// Probe an explicit search path (same syntax as `PATH`).
    pub fn probe_in(bitness: Bitness, search_path: Option<OsString>) -> Self {
        let prefix = bitness.toolchain_prefix();
        let find = |name: &str| lookup(name, search_path.as_ref());
        Self {
            bitness,
            cc: find(&format!("{prefix}-gcc")),
            cxx: find(&format!("{prefix}-g++")),
            fortran: find(&format!("{prefix}-gfortran")),
            archiver: find(&format!("{prefix}-ar")),
            size: find(&format!("{prefix}-size")),
            makensis: find(MAKENSIS),
        }
    }

    pub fn prefix(&self) -> &'static str {
        self.bitness.toolchain_prefix()
    }

    /// Names of the tools that could not be resolved, in probe order.
    pub fn missing_tools(&self) -> Vec<String> {
        let prefix = self.prefix();
        [
            (&self.cc, format!("{prefix}-gcc")),
            (&self.cxx, format!("{prefix}-g++")),
            (&self.fortran, format!("{prefix}-gfortran")),
            (&self.archiver, format!("{prefix}-ar")),
            (&self.size, format!("{prefix}-size")),
            (&self.makensis, MAKENSIS.to_string()),
        ]
        .into_iter()
        .filter(|(path, _)| path.is_none())
        .map(|(_, name)| name)
        .collect()
    }

    /// LAMMPS size class matching the target word size.
    pub fn size_class(&self) -> &'static str {
        match self.bitness {
            Bitness::Win32 => "smallsmall",
            Bitness::Win64 => "smallbig",
        }
    }

    /// Folder of the MinGW runtime DLLs bundled into the installer.
    pub fn mingw_bin_dir(&self) -> String {
        format!("/usr/{}/sys-root/mingw/bin/", self.prefix())
    }
}

fn lookup(name: &str, search_path: Option<&OsString>) -> Option<PathBuf> {
    which::which_in(name, search_path, Path::new(".")).ok()
}

/// Render an optional tool path for the settings summary.
pub fn describe(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not found)".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
