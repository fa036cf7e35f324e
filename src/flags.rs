//! Validated build flags.
//!
//! `BuildConfig` is constructed once from the command line and then passed by
//! reference to every pipeline stage. Nothing mutates it after validation.

use anyhow::{Result, anyhow, bail};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

/// `<kind>_<day><Mon><year>`, e.g. `patch_15Mar2024`.
static DATED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(patch|stable|maintenance)_\d+(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\d{4}$",
    )
    .expect("dated tag pattern is a valid regex")
});

const TRUTHY: &[&str] = &["yes", "y", "on", "1", "true"];
const FALSY: &[&str] = &["no", "n", "off", "0", "false"];

/// Parse a yes/no style token. Returns `None` for anything outside the vocabulary.
pub fn parse_bool(token: &str) -> Option<bool> {
    let lower = token.to_ascii_lowercase();
    if TRUTHY.contains(&lower.as_str()) {
        Some(true)
    } else if FALSY.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Enumerated flags
// ---------------------------------------------------------------------------

/// Target Windows word size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitness {
    Win32,
    Win64,
}

impl Bitness {
    pub fn bits(self) -> u8 {
        match self {
            Bitness::Win32 => 32,
            Bitness::Win64 => 64,
        }
    }

    /// GNU triple prefix of the MinGW cross toolchain for this target.
    pub fn toolchain_prefix(self) -> &'static str {
        match self {
            Bitness::Win32 => "i686-w64-mingw32",
            Bitness::Win64 => "x86_64-w64-mingw32",
        }
    }
}

impl fmt::Display for Bitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl FromStr for Bitness {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "32" => Ok(Bitness::Win32),
            "64" => Ok(Bitness::Win64),
            other => bail!("Unsupported bitness flag {other}"),
        }
    }
}

/// Message passing variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallelism {
    /// Serial build against the MPI STUBS library.
    None,
    /// MPICH2 based MPI build.
    Mpi,
    /// Microsoft MPI SDK build.
    MsMpi,
}

impl Parallelism {
    pub fn uses_mpi(self) -> bool {
        !matches!(self, Parallelism::None)
    }
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parallelism::None => write!(f, "no"),
            Parallelism::Mpi => write!(f, "mpi"),
            Parallelism::MsMpi => write!(f, "ms"),
        }
    }
}

impl FromStr for Parallelism {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "no" => Ok(Parallelism::None),
            "mpi" => Ok(Parallelism::Mpi),
            "ms" => Ok(Parallelism::MsMpi),
            other => bail!("Unsupported parallel flag {other}"),
        }
    }
}

/// Thread support variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threading {
    None,
    OpenMp,
}

impl fmt::Display for Threading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threading::None => write!(f, "no"),
            Threading::OpenMp => write!(f, "omp"),
        }
    }
}

impl FromStr for Threading {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "no" => Ok(Threading::None),
            "omp" => Ok(Threading::OpenMp),
            other => bail!("Unsupported threading flag {other}"),
        }
    }
}

/// Value of the `-a` flag: a boolean admin level, or `msix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminChoice {
    Admin,
    NoAdmin,
    Msix,
}

impl AdminChoice {
    pub fn is_admin(self) -> bool {
        matches!(self, AdminChoice::Admin)
    }

    pub fn is_msix(self) -> bool {
        matches!(self, AdminChoice::Msix)
    }
}

impl FromStr for AdminChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("msix") {
            return Ok(AdminChoice::Msix);
        }
        match parse_bool(s) {
            Some(true) => Ok(AdminChoice::Admin),
            Some(false) => Ok(AdminChoice::NoAdmin),
            None => Err(anyhow!("Unknown admin option: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

/// A branch that moves upstream and has to be fast-forwarded after checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovingBranch {
    Stable,
    Release,
    Develop,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    Moving(MovingBranch),
    /// A dated release tag such as `patch_15Mar2024` or `stable_2Aug2023`.
    Dated,
    /// A full 40 character commit hash.
    Commit,
}

/// Where the installer version string comes from for a given revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Parse the version declared in `src/version.h`.
    VersionHeader,
    /// Use today's date (snapshot builds).
    Today,
    /// Use the revision string verbatim.
    Raw,
}

/// A validated source revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    raw: String,
    kind: RevisionKind,
}

impl Revision {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> RevisionKind {
        self.kind
    }

    /// Whether a checkout of this revision must be followed by `git pull`.
    pub fn is_moving(&self) -> bool {
        matches!(self.kind, RevisionKind::Moving(_))
    }

    pub fn version_source(&self) -> VersionSource {
        match self.kind {
            RevisionKind::Moving(MovingBranch::Stable | MovingBranch::Release)
            | RevisionKind::Dated => VersionSource::VersionHeader,
            RevisionKind::Moving(MovingBranch::Develop | MovingBranch::Maintenance) => {
                VersionSource::Today
            }
            RevisionKind::Commit => VersionSource::Raw,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Revision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s {
            "stable" => RevisionKind::Moving(MovingBranch::Stable),
            "release" => RevisionKind::Moving(MovingBranch::Release),
            "develop" => RevisionKind::Moving(MovingBranch::Develop),
            "maintenance" => RevisionKind::Moving(MovingBranch::Maintenance),
            _ if DATED_TAG.is_match(s) => RevisionKind::Dated,
            _ if is_commit_hash(s) => RevisionKind::Commit,
            _ => bail!("Unsupported revision flag {s}"),
        };
        Ok(Revision {
            raw: s.to_string(),
            kind,
        })
    }
}

fn is_commit_hash(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

// ---------------------------------------------------------------------------
// BuildConfig
// ---------------------------------------------------------------------------

/// The complete, validated set of build flags for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub bitness: Bitness,
    pub cpu_count: usize,
    pub parallelism: Parallelism,
    pub threading: Threading,
    pub python: bool,
    pub gui: bool,
    pub revision: Revision,
    pub verbose: bool,
    pub source_dir: PathBuf,
    pub admin: bool,
    pub msix: bool,
}

impl BuildConfig {
    /// Apply cross-field rules. Individual flag values are already typed.
    pub fn validate(&self) -> Result<()> {
        if self.python && self.gui {
            bail!("May only include either Python or LAMMPS GUI");
        }
        if self.admin && self.msix {
            bail!("An MSIX package cannot use an admin level installer");
        }
        if self.cpu_count == 0 {
            bail!("Number of CPUs must be at least 1");
        }
        Ok(())
    }

    /// The plain per-user installer: no admin, python, gui or msix variant.
    /// Only this flavor also builds the packaged plugin installers.
    pub fn is_plain_noadmin(&self) -> bool {
        !self.admin && !self.python && !self.gui && !self.msix
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// A 64-bit MPI+OpenMP admin build of `stable`, used as a baseline by unit tests.
#[cfg(test)]
pub(crate) fn sample_config() -> BuildConfig {
    BuildConfig {
        bitness: Bitness::Win64,
        cpu_count: 4,
        parallelism: Parallelism::Mpi,
        threading: Threading::OpenMp,
        python: false,
        gui: false,
        revision: "stable".parse().unwrap(),
        verbose: false,
        source_dir: PathBuf::from("/src/lammps"),
        admin: true,
        msix: false,
    }
}
