use anyhow::Result;
use clap::Parser;
use std::process;

use lammps_win_installer::cli::Cli;
use lammps_win_installer::config::Settings;
use lammps_win_installer::{output, pipeline};

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load()?;
    let cfg = cli.into_config(&settings)?;
    pipeline::run(&cfg, &settings)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        output::fail("error", &format!("{e:#}"));
        process::exit(1);
    }
}
