//! Command line flags.
//!
//! Every option is a short `-x value` pair. Values are typed by their
//! `FromStr` impls in [`crate::flags`], so clap reports bad values with the
//! offending flag in the message. Cross-field rules run in
//! [`Cli::into_config`].

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::flags::{
    AdminChoice, Bitness, BuildConfig, Parallelism, Revision, Threading, parse_bool,
};

const BOOL_VALUES: &str = "yes|no";

/// Cross-compile LAMMPS with MinGW and package it as a Windows installer.
#[derive(Parser, Debug)]
#[command(
    name = "lammps-win-installer",
    version,
    about,
    args_override_self = true,
    after_help = "Example:\n  lammps-win-installer -r release -t omp -p mpi"
)]
pub struct Cli {
    /// Target word size.
    #[arg(short = 'b', value_name = "32|64", default_value = "64")]
    pub bitness: Bitness,

    /// CPUs made available to the build [default: detected CPU count].
    #[arg(short = 'j', value_name = "CPUS")]
    pub cpus: Option<usize>,

    /// Message passing: none, MPICH2 or Microsoft MPI.
    #[arg(short = 'p', value_name = "no|mpi|ms", default_value = "no")]
    pub parallelism: Parallelism,

    /// Thread support: none or OpenMP.
    #[arg(short = 't', value_name = "no|omp", default_value = "omp")]
    pub threading: Threading,

    /// Bundle Python support.
    #[arg(short = 'y', value_name = BOOL_VALUES, default_value = "no",
          value_parser = bool_value, action = ArgAction::Set)]
    pub python: bool,

    /// Build LAMMPS GUI.
    #[arg(short = 'u', value_name = BOOL_VALUES, default_value = "no",
          value_parser = bool_value, action = ArgAction::Set)]
    pub gui: bool,

    /// Source revision: stable, release, develop, maintenance, a dated tag
    /// such as patch_15Mar2024, or a full commit hash.
    #[arg(short = 'r', value_name = "REV", default_value = "stable")]
    pub revision: Revision,

    /// Echo the output of every tool that runs.
    #[arg(short = 'v', value_name = BOOL_VALUES, default_value = "no",
          value_parser = bool_value, action = ArgAction::Set)]
    pub verbose: bool,

    /// LAMMPS git checkout [default: <resource dir>/lammps].
    #[arg(short = 'g', value_name = "PATH")]
    pub source_dir: Option<PathBuf>,

    /// Installer flavor: admin, per-user, or an MSIX package.
    #[arg(short = 'a', value_name = "yes|no|msix", default_value = "yes")]
    pub admin: AdminChoice,
}

fn bool_value(s: &str) -> Result<bool, String> {
    parse_bool(s).ok_or_else(|| "expected one of yes/no/y/n/on/off/1/0/true/false".to_string())
}

impl Cli {
    /// Resolve defaults that depend on the environment and validate.
    pub fn into_config(self, settings: &Settings) -> Result<BuildConfig> {
        let resource_dir = settings.resource_dir()?;
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let detected = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.into_config_with(&resource_dir, home.as_deref(), detected)
    }

    /// [`Cli::into_config`] with the environment supplied explicitly.
    pub fn into_config_with(
        self,
        resource_dir: &Path,
        home: Option<&Path>,
        detected_cpus: usize,
    ) -> Result<BuildConfig> {
        let source_dir = match self.source_dir {
            Some(dir) => {
                let expanded = expand_home(&dir, home);
                std::path::absolute(&expanded)
                    .with_context(|| format!("cannot resolve source folder {}", dir.display()))?
            }
            None => resource_dir.join("lammps"),
        };

        let cfg = BuildConfig {
            bitness: self.bitness,
            cpu_count: self.cpus.unwrap_or(detected_cpus),
            parallelism: self.parallelism,
            threading: self.threading,
            python: self.python,
            gui: self.gui,
            revision: self.revision,
            verbose: self.verbose,
            source_dir,
            admin: self.admin.is_admin(),
            msix: self.admin.is_msix(),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Replace a leading `~` component with `home`. Paths are returned unchanged
/// when there is no leading `~` or no home folder is known.
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::RevisionKind;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("lammps-win-installer").chain(args.iter().copied()))
    }

    fn config(args: &[&str]) -> Result<BuildConfig> {
        parse(args)?.into_config_with(Path::new("/res"), Some(Path::new("/home/builder")), 6)
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bitness, Bitness::Win64);
        assert_eq!(cfg.cpu_count, 6);
        assert_eq!(cfg.parallelism, Parallelism::None);
        assert_eq!(cfg.threading, Threading::OpenMp);
        assert!(!cfg.python);
        assert!(!cfg.gui);
        assert!(!cfg.verbose);
        assert_eq!(cfg.revision.as_str(), "stable");
        assert_eq!(cfg.source_dir, PathBuf::from("/res/lammps"));
        assert!(cfg.admin);
        assert!(!cfg.msix);
    }

    #[test]
    fn every_flag_is_applied() {
        let cfg = config(&[
            "-b", "32", "-j", "12", "-p", "ms", "-t", "no", "-u", "On", "-r",
            "patch_15Mar2024", "-v", "1", "-g", "/opt/lammps", "-a", "no",
        ])
        .unwrap();
        assert_eq!(cfg.bitness, Bitness::Win32);
        assert_eq!(cfg.cpu_count, 12);
        assert_eq!(cfg.parallelism, Parallelism::MsMpi);
        assert_eq!(cfg.threading, Threading::None);
        assert!(cfg.gui);
        assert!(cfg.verbose);
        assert_eq!(cfg.revision.kind(), RevisionKind::Dated);
        assert_eq!(cfg.source_dir, PathBuf::from("/opt/lammps"));
        assert!(!cfg.admin);
        assert!(!cfg.msix);
    }

    #[test]
    fn msix_clears_admin() {
        let cfg = config(&["-a", "MSIX"]).unwrap();
        assert!(!cfg.admin);
        assert!(cfg.msix);
    }

    #[test]
    fn tilde_source_dir_is_expanded() {
        let cfg = config(&["-g", "~/src/lammps"]).unwrap();
        assert_eq!(cfg.source_dir, PathBuf::from("/home/builder/src/lammps"));
    }

    #[test]
    fn relative_source_dir_is_made_absolute() {
        let cfg = config(&["-g", "lammps"]).unwrap();
        assert!(cfg.source_dir.is_absolute());
        assert!(cfg.source_dir.ends_with("lammps"));
    }

    #[test]
    fn bad_bool_names_the_flag() {
        let err = parse(&["-y", "maybe"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("-y"), "{err}");
    }

    #[test]
    fn padded_bool_is_rejected_naming_the_flag() {
        let err = parse(&["-y", " yes"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.to_string().contains("-y"), "{err}");
    }

    #[test]
    fn repeated_flag_takes_last_value() {
        let cfg = config(&["-b", "32", "-b", "64", "-y", "yes", "-y", "no"]).unwrap();
        assert_eq!(cfg.bitness, Bitness::Win64);
        assert!(!cfg.python);
    }

    #[test]
    fn bad_enum_values_are_rejected() {
        for args in [
            ["-b", "16"],
            ["-p", "openmpi"],
            ["-t", "tbb"],
            ["-a", "maybe"],
            ["-r", "patch_15March2024"],
        ] {
            let err = parse(&args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{args:?}");
        }
    }

    #[test]
    fn missing_value_and_unknown_flag_are_usage_errors() {
        assert!(parse(&["-b"]).is_err());
        assert_eq!(
            parse(&["-x", "1"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
    }

    #[test]
    fn python_and_gui_are_exclusive() {
        let err = config(&["-y", "yes", "-u", "yes"]).unwrap_err();
        assert!(err.to_string().contains("either Python or LAMMPS GUI"));
    }

    #[test]
    fn zero_cpus_is_rejected() {
        assert!(config(&["-j", "0"]).is_err());
    }

    #[test]
    fn expand_home_leaves_other_paths_alone() {
        let home = Some(Path::new("/home/u"));
        assert_eq!(expand_home(Path::new("~"), home), PathBuf::from("/home/u"));
        assert_eq!(expand_home(Path::new("/abs/~"), home), PathBuf::from("/abs/~"));
        assert_eq!(expand_home(Path::new("~other/x"), home), PathBuf::from("~other/x"));
        assert_eq!(expand_home(Path::new("~/x"), None), PathBuf::from("~/x"));
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
