//! Integration tests for the binary's exit status on bad invocations.
//!
//! Every case fails before the pipeline starts, so no toolchain is needed.

use std::process::{Command, Output};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_lammps-win-installer");

fn run(args: &[&str]) -> Output {
    let dir = TempDir::new().unwrap();
    Command::new(BIN)
        .args(args)
        .current_dir(dir.path())
        .env_remove("LAMMPS_WIN_SETTINGS")
        .output()
        .expect("failed to run binary")
}

#[test]
fn unknown_flag_is_usage_error() {
    let out = run(&["-q", "yes"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "{stderr}");
}

#[test]
fn bad_boolean_names_flag() {
    let out = run(&["-v", "sometimes"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("-v"), "{stderr}");
}

#[test]
fn unsupported_revision_is_rejected() {
    let out = run(&["-r", "v2.0"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Unsupported revision flag v2.0"), "{stderr}");
}

#[test]
fn python_with_gui_fails_validation() {
    let out = run(&["-y", "yes", "-u", "yes"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("May only include either Python or LAMMPS GUI"), "{stderr}");
}

#[test]
fn help_lists_example_invocation() {
    let out = run(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("-r release -t omp -p mpi"), "{stdout}");
    for flag in ["-b", "-j", "-p", "-t", "-y", "-u", "-r", "-v", "-g", "-a"] {
        assert!(stdout.contains(flag), "{flag} not in help");
    }
}

#[test]
fn malformed_settings_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lammps-win-installer.toml"), "git_url = [").unwrap();
    let out = Command::new(BIN)
        .current_dir(dir.path())
        .env_remove("LAMMPS_WIN_SETTINGS")
        .output()
        .expect("failed to run binary");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to parse settings file"), "{stderr}");
}
