//! Optional settings file for locations the build depends on.
//!
//! Settings are read from the TOML file named by `LAMMPS_WIN_SETTINGS`, or
//! `lammps-win-installer.toml` in the current directory. Every key is optional;
//! a missing file means all defaults. Empty or whitespace-only values are
//! treated as absent.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upstream LAMMPS repository cloned when the source folder does not exist.
pub const DEFAULT_GIT_URL: &str = "https://github.com/lammps/lammps.git";

/// Plugin collection cloned for the plain per-user installer.
pub const DEFAULT_PLUGINS_GIT_URL: &str = "git@github.com:lammps/lammps-plugins.git";

/// Base URL for prebuilt third party Windows executables.
pub const DEFAULT_THIRDPARTY_URL: &str = "http://download.lammps.org/thirdparty";

/// CMake package dir of the cross-compiled Qt5 used for GUI builds.
pub const DEFAULT_QT5_DIR: &str = "/usr/x86_64-w64-mingw32/sys-root/mingw/lib/cmake/Qt5";

pub const DEFAULT_COMPILER_LAUNCHER: &str = "ccache";

const SETTINGS_ENV_VAR: &str = "LAMMPS_WIN_SETTINGS";

const SETTINGS_FILE_NAME: &str = "lammps-win-installer.toml";

/// Raw settings as read from disk.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Folder holding `installer/` and the `mingwNN-pkgconfig/` trees.
    pub resource_dir: Option<PathBuf>,
    pub git_url: Option<String>,
    pub plugins_git_url: Option<String>,
    pub thirdparty_url: Option<String>,
    pub qt5_dir: Option<String>,
    pub compiler_launcher: Option<String>,
}

impl Settings {
    /// Load settings from the env-var override or the default file name.
    pub fn load() -> Result<Self> {
        Self::load_with_env(std::env::var_os(SETTINGS_ENV_VAR).map(PathBuf::from))
    }

    fn load_with_env(env_path: Option<PathBuf>) -> Result<Self> {
        let path = env_path.unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME));
        Self::load_from(&path)
    }

    /// Load settings from a specific path. Returns defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("failed to parse settings file at {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to read settings file at {}", path.display())),
        }
    }

    /// Resource folder; defaults to the current directory.
    pub fn resource_dir(&self) -> Result<PathBuf> {
        match &self.resource_dir {
            Some(dir) if !dir.as_os_str().is_empty() => std::path::absolute(dir)
                .with_context(|| format!("cannot resolve resource folder {}", dir.display())),
            _ => std::env::current_dir().context("cannot determine current directory"),
        }
    }

    pub fn git_url(&self) -> String {
        non_empty_trimmed(&self.git_url).unwrap_or_else(|| DEFAULT_GIT_URL.to_string())
    }

    pub fn plugins_git_url(&self) -> String {
        non_empty_trimmed(&self.plugins_git_url)
            .unwrap_or_else(|| DEFAULT_PLUGINS_GIT_URL.to_string())
    }

    /// Third party download base, without a trailing slash.
    pub fn thirdparty_url(&self) -> String {
        non_empty_trimmed(&self.thirdparty_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_THIRDPARTY_URL.to_string())
    }

    pub fn qt5_dir(&self) -> String {
        non_empty_trimmed(&self.qt5_dir).unwrap_or_else(|| DEFAULT_QT5_DIR.to_string())
    }

    pub fn compiler_launcher(&self) -> String {
        non_empty_trimmed(&self.compiler_launcher)
            .unwrap_or_else(|| DEFAULT_COMPILER_LAUNCHER.to_string())
    }
}

fn non_empty_trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
