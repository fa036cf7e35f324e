//! Library entrypoint for lammps-win-installer.
//!
//! The primary interface is the `lammps-win-installer` binary. This lib
//! target exposes the pipeline modules to integration tests.

pub mod assets;
pub mod build;
pub mod cli;
pub mod cmake;
pub mod command;
pub mod config;
pub mod download;
pub mod flags;
pub mod git;
pub mod installer;
pub mod output;
pub mod pipeline;
pub mod toolchain;
pub mod workspace;
