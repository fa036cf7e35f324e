//! The ordered build stages and the driver that runs them.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::flags::BuildConfig;
use crate::output;
use crate::toolchain::{self, Toolchain};
use crate::workspace::Workspace;
use crate::{assets, build, git, installer};

/// Everything a stage may read. Stages never mutate the configuration.
pub struct StageContext<'a> {
    pub cfg: &'a BuildConfig,
    pub settings: &'a Settings,
    pub toolchain: &'a Toolchain,
    pub resource_dir: &'a Path,
    pub workspace: &'a Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SyncSource,
    Build,
    CollectAssets,
    Package,
    Cleanup,
}

impl Stage {
    /// Execution order. A failing stage stops the run, so cleanup only
    /// happens after a successful package.
    pub const ALL: [Stage; 5] = [
        Stage::SyncSource,
        Stage::Build,
        Stage::CollectAssets,
        Stage::Package,
        Stage::Cleanup,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::SyncSource => "source update",
            Stage::Build => "build",
            Stage::CollectAssets => "asset collection",
            Stage::Package => "packaging",
            Stage::Cleanup => "cleanup",
        }
    }

    pub fn run(self, ctx: &StageContext<'_>) -> Result<()> {
        let cfg = ctx.cfg;
        match self {
            Stage::SyncSource => {
                output::action("Updating", &format!("LAMMPS source to {}", cfg.revision));
                git::sync_source(
                    &cfg.source_dir,
                    &ctx.settings.git_url(),
                    &cfg.revision,
                    cfg.verbose,
                )?;
                output::success("Done", "");
                Ok(())
            }
            Stage::Build => build::run(cfg, ctx.settings, ctx.resource_dir, ctx.workspace),
            Stage::CollectAssets => assets::collect(cfg, ctx.workspace),
            Stage::Package => {
                installer::package(cfg, ctx.toolchain, ctx.resource_dir, ctx.workspace)
            }
            Stage::Cleanup => {
                output::action("Cleaning up", "");
                ctx.workspace.remove()?;
                output::success("Done", "");
                Ok(())
            }
        }
    }
}

/// Rows of the summary printed before anything is built.
pub fn summary_rows(
    cfg: &BuildConfig,
    toolchain: &Toolchain,
    resource_dir: &Path,
    build_dir: &Path,
) -> Vec<(&'static str, String)> {
    vec![
        ("LAMMPS revision", cfg.revision.to_string()),
        ("Bitness", cfg.bitness.to_string()),
        ("Message passing", cfg.parallelism.to_string()),
        ("Threading", cfg.threading.to_string()),
        ("Resource folder", resource_dir.display().to_string()),
        ("Source folder", cfg.source_dir.display().to_string()),
        ("Build folder", build_dir.display().to_string()),
        ("C compiler", toolchain::describe(toolchain.cc.as_deref())),
        ("C++ compiler", toolchain::describe(toolchain.cxx.as_deref())),
        ("Fortran compiler", toolchain::describe(toolchain.fortran.as_deref())),
        ("Library archiver", toolchain::describe(toolchain.archiver.as_deref())),
        ("Size class", toolchain.size_class().to_string()),
    ]
}

/// Probe the toolchain, create the build folder under the current directory
/// and run every stage in order.
pub fn run(cfg: &BuildConfig, settings: &Settings) -> Result<()> {
    let resource_dir = settings.resource_dir()?;
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    run_in(cfg, settings, &resource_dir, &cwd)
}

/// [`run`] with the resource folder and parent of the build folder given.
pub fn run_in(
    cfg: &BuildConfig,
    settings: &Settings,
    resource_dir: &Path,
    parent: &Path,
) -> Result<()> {
    let toolchain = Toolchain::probe(cfg.bitness);
    let workspace = Workspace::create_in(parent, cfg)?;

    output::table(&summary_rows(cfg, &toolchain, resource_dir, workspace.path()));
    for tool in toolchain.missing_tools() {
        output::note("warning", &format!("{tool} not found on PATH"));
    }

    let ctx = StageContext {
        cfg,
        settings,
        toolchain: &toolchain,
        resource_dir,
        workspace: &workspace,
    };
    for stage in Stage::ALL {
        stage
            .run(&ctx)
            .with_context(|| format!("{} failed", stage.label()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{Bitness, sample_config};
    use tempfile::TempDir;

    #[test]
    fn stages_run_in_pipeline_order() {
        assert_eq!(Stage::ALL.first(), Some(&Stage::SyncSource));
        assert_eq!(Stage::ALL.last(), Some(&Stage::Cleanup));
        let package = Stage::ALL.iter().position(|s| *s == Stage::Package);
        let collect = Stage::ALL.iter().position(|s| *s == Stage::CollectAssets);
        assert!(collect < package);
    }

    #[test]
    fn summary_lists_settings_and_tools() {
        let dir = TempDir::new().unwrap();
        let cfg = sample_config();
        let tc = Toolchain::probe_in(Bitness::Win64, Some(dir.path().into()));
        let rows = summary_rows(&cfg, &tc, Path::new("/res"), Path::new("/b/tmp-64"));

        let get = |key: &str| {
            rows.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("LAMMPS revision"), "stable");
        assert_eq!(get("Bitness"), "64");
        assert_eq!(get("Message passing"), "mpi");
        assert_eq!(get("Threading"), "omp");
        assert_eq!(get("Source folder"), "/src/lammps");
        assert_eq!(get("Build folder"), "/b/tmp-64");
        assert_eq!(get("C compiler"), "(not found)");
        assert_eq!(get("Size class"), "smallbig");
    }

    #[test]
    fn cleanup_stage_removes_build_folder() {
        let parent = TempDir::new().unwrap();
        let cfg = sample_config();
        let settings = Settings::default();
        let tc = Toolchain::probe_in(cfg.bitness, Some(parent.path().into()));
        let ws = Workspace::create_in(parent.path(), &cfg).unwrap();
        std::fs::write(ws.path().join("lammps.nsis"), "; script").unwrap();

        let ctx = StageContext {
            cfg: &cfg,
            settings: &settings,
            toolchain: &tc,
            resource_dir: parent.path(),
            workspace: &ws,
        };
        Stage::Cleanup.run(&ctx).unwrap();
        assert!(!ws.path().exists());
    }

    #[test]
    fn failed_stage_keeps_build_folder_and_names_stage() {
        let parent = TempDir::new().unwrap();
        let mut cfg = sample_config();
        // `git -C` on a regular file fails even when the temp dir sits
        // inside another worktree.
        cfg.source_dir = parent.path().join("not-a-checkout");
        std::fs::write(&cfg.source_dir, "").unwrap();

        let err = run_in(&cfg, &Settings::default(), parent.path(), parent.path()).unwrap_err();
        assert!(format!("{err:#}").starts_with("source update failed"), "{err:#}");
        assert!(parent.path().join("tmp-64-mpi-omp-stable").is_dir());
    }
}
