//! NSIS installer packaging.
//!
//! Picks the installer script for the requested flavor, stages it with its
//! auxiliary files in the build folder, derives the version string and runs
//! `makensis`.

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::command::ToolCommand;
use crate::flags::{BuildConfig, Parallelism, VersionSource};
use crate::output;
use crate::toolchain::Toolchain;
use crate::workspace::Workspace;

/// Name of the staged installer script inside the build folder.
pub const STAGED_SCRIPT: &str = "lammps.nsis";

/// Files copied next to the installer script under their own names.
pub const AUX_FILES: &[&str] = &["FileAssociation.nsh", "lammps.ico", "lammps-text-logo-wide.bmp"];

/// `#define LAMMPS_VERSION "2 Aug 2023"` style declaration.
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^.*"(\w+) (\w+) (\w+)".*$"#).expect("version line pattern is a valid regex")
});

/// Installer script flavors, in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Python,
    Gui,
    Admin,
    MsMpi,
    Msix,
    NoAdmin,
}

impl Template {
    /// Highest-priority template whose flag is set.
    pub fn select(cfg: &BuildConfig) -> Self {
        if cfg.python {
            Template::Python
        } else if cfg.gui {
            Template::Gui
        } else if cfg.admin {
            Template::Admin
        } else if cfg.parallelism == Parallelism::MsMpi {
            Template::MsMpi
        } else if cfg.msix {
            Template::Msix
        } else {
            Template::NoAdmin
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Template::Python => "lammps-python.nsis",
            Template::Gui => "lammps-gui.nsis",
            Template::Admin => "lammps-admin.nsis",
            Template::MsMpi => "lammps-msmpi.nsis",
            Template::Msix => "lammps-msix.nsis",
            Template::NoAdmin => "lammps-noadmin.nsis",
        }
    }
}

/// Copy the chosen script (as [`STAGED_SCRIPT`]) and [`AUX_FILES`] from
/// `installer_dir` into `work`.
pub fn stage_files(installer_dir: &Path, work: &Path, template: Template) -> Result<()> {
    let script = installer_dir.join(template.file_name());
    std::fs::copy(&script, work.join(STAGED_SCRIPT))
        .with_context(|| format!("failed to copy installer script {}", script.display()))?;
    for name in AUX_FILES {
        let src = installer_dir.join(name);
        std::fs::copy(&src, work.join(name))
            .with_context(|| format!("failed to copy {}", src.display()))?;
    }
    Ok(())
}

/// Concatenate the three quoted tokens of a version declaration line.
pub fn version_from_line(line: &str) -> Result<String> {
    let caps = VERSION_LINE
        .captures(line.trim_end())
        .ok_or_else(|| anyhow!("unexpected version declaration: {}", line.trim_end()))?;
    Ok(format!("{}{}{}", &caps[1], &caps[2], &caps[3]))
}

/// Parse the version from the first line of `src/version.h`.
pub fn version_from_header(source_dir: &Path) -> Result<String> {
    let path = source_dir.join("src").join("version.h");
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let first = text.lines().next().unwrap_or_default();
    version_from_line(first).with_context(|| format!("cannot parse version from {}", path.display()))
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> Result<String> {
    format_date(local_or_utc(OffsetDateTime::now_local()))
}

/// The local time, or UTC with a warning when the local offset is unknown.
fn local_or_utc<E: fmt::Display>(local: Result<OffsetDateTime, E>) -> OffsetDateTime {
    local.unwrap_or_else(|e| {
        output::note(
            "warning",
            &format!("local time offset unavailable ({e}), version date uses UTC"),
        );
        OffsetDateTime::now_utc()
    })
}

fn format_date(now: OffsetDateTime) -> Result<String> {
    now.format(format_description!("[year]-[month]-[day]"))
        .context("failed to format current date")
}

/// Version string shown by the installer. `today` is supplied by the caller
/// so snapshot builds can be tested with a fixed date.
pub fn derive_version(cfg: &BuildConfig, today: impl FnOnce() -> Result<String>) -> Result<String> {
    match cfg.revision.version_source() {
        VersionSource::VersionHeader => version_from_header(&cfg.source_dir),
        VersionSource::Today => today(),
        VersionSource::Raw => Ok(cfg.revision.as_str().to_string()),
    }
}

/// The `makensis` invocation for this build, run inside the build folder.
pub fn makensis_command(
    cfg: &BuildConfig,
    toolchain: &Toolchain,
    version: &str,
    work: &Path,
) -> ToolCommand {
    let suffix = match cfg.parallelism {
        Parallelism::None => "",
        Parallelism::Mpi => "-MPI",
        Parallelism::MsMpi => "-MSMPI",
    };
    ToolCommand::new("makensis")
        .current_dir(work)
        .arg(format!("-DMINGW={}", toolchain.mingw_bin_dir()))
        .arg(format!("-DVERSION={version}{suffix}"))
        .arg(format!("-DBIT={}", cfg.bitness))
        .arg(format!("-DLMPREV={}", cfg.revision))
        .arg(STAGED_SCRIPT)
}

/// Stage the installer script and build the installer.
pub fn package(
    cfg: &BuildConfig,
    toolchain: &Toolchain,
    resource_dir: &Path,
    ws: &Workspace,
) -> Result<()> {
    output::action("Configuring", "and building installer");
    let template = Template::select(cfg);
    stage_files(&resource_dir.join("installer"), ws.path(), template)?;

    let version = derive_version(cfg, today)?;
    let cmd = makensis_command(cfg, toolchain, &version, ws.path());
    output::detail(&format!("Running: {cmd}"));
    cmd.run_logged(cfg.verbose)?;
    output::success("Done", &format!("installer version {version}"));
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
