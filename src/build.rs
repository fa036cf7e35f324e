//! Configure and compile LAMMPS and its plugins with the MinGW CMake wrappers.
//!
//! Three CMake projects are involved: the main LAMMPS build, the example
//! plugins, and (for the plain per-user installer only) the PACE plugin and
//! the separate plugin collection, which both produce their own installers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cmake::{self, CmakeConfigure};
use crate::config::Settings;
use crate::download;
use crate::flags::{Bitness, BuildConfig, Parallelism, Threading};
use crate::git;
use crate::output;
use crate::workspace::{self, Workspace};

/// Parallel degree for the main compile. Fixed, not taken from `-j`.
pub const BUILD_JOBS: u32 = 8;

/// Written next to the GUI executable so it finds the bundled Qt plugins.
pub const QT_CONF: &str = "[Paths]\nPlugins = ../qt5plugins\n";

/// Checkout folder name of the plugin collection inside the build folder.
const PLUGIN_COLLECTION_DIR: &str = "lammps-plugins";

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// `mingw32-cmake` or `mingw64-cmake`.
pub fn cmake_program(bitness: Bitness) -> String {
    format!("mingw{bitness}-cmake")
}

/// Options shared by every sub-project: shared libs plus the MPI/OpenMP variant.
fn variant_options(cmake: CmakeConfigure, cfg: &BuildConfig) -> CmakeConfigure {
    cmake
        .define("BUILD_SHARED_LIBS", "on")
        .define("BUILD_MPI", on_off(cfg.parallelism.uses_mpi()))
        .define("BUILD_OMP", on_off(cfg.threading == Threading::OpenMp))
}

/// Configure step of the main LAMMPS build.
pub fn main_configure(cfg: &BuildConfig, settings: &Settings, resource_dir: &Path) -> CmakeConfigure {
    let src = &cfg.source_dir;
    let pkgconfig = resource_dir.join(format!("mingw{}-pkgconfig", cfg.bitness));

    let cmake = CmakeConfigure::new(cmake_program(cfg.bitness))
        .define("CMAKE_BUILD_TYPE", "Release")
        .define("ADD_PKG_CONFIG_PATH", pkgconfig.display().to_string())
        .preset(pkgconfig.join("addpkg.cmake"))
        .preset(src.join("cmake/presets/mingw-cross.cmake"))
        .source(src.join("cmake"))
        .preset_if(
            cfg.bitness == Bitness::Win64,
            src.join("cmake/presets/kokkos-openmp.cmake"),
        );

    variant_options(cmake, cfg)
        .define_if(cfg.parallelism == Parallelism::MsMpi, "USE_MSMPI", "on")
        .define_if(cfg.gui, "BUILD_LAMMPS_GUI", "on")
        .define_if(cfg.gui, "Qt5_DIR", settings.qt5_dir())
        .define("WITH_GZIP", "on")
        .define("WITH_FFMPEG", "on")
        .define("LAMMPS_EXCEPTIONS", "on")
        .define("INTEL_LRT_MODE", "c++11")
        .define("BUILD_LAMMPS_SHELL", "on")
        .define("CMAKE_CXX_COMPILER_LAUNCHER", settings.compiler_launcher())
        .define("PKG_PLUGIN", "yes")
        .define("PKG_PLUMED", "yes")
        .define_if(cfg.python, "PKG_PYTHON", "yes")
}

/// Configure step of `examples/plugins`, built into `plugins/`.
pub fn example_plugins_configure(cfg: &BuildConfig, settings: &Settings) -> CmakeConfigure {
    let cmake = CmakeConfigure::new(cmake_program(cfg.bitness))
        .define("CMAKE_BUILD_TYPE", "Release")
        .source(cfg.source_dir.join("examples/plugins"))
        .binary("plugins");
    variant_options(cmake, cfg)
        .define_if(cfg.parallelism == Parallelism::MsMpi, "USE_MSMPI", "on")
        .define("CMAKE_CXX_COMPILER_LAUNCHER", settings.compiler_launcher())
}

/// Configure step for an out-of-tree plugin project that links against the
/// LAMMPS sources.
fn packaged_plugin_configure(
    cfg: &BuildConfig,
    settings: &Settings,
    source: PathBuf,
    binary: &str,
) -> CmakeConfigure {
    let cmake = CmakeConfigure::new(cmake_program(cfg.bitness))
        .define("CMAKE_BUILD_TYPE", "Release")
        .source(source)
        .binary(binary);
    variant_options(cmake, cfg)
        .define("CMAKE_CXX_COMPILER_LAUNCHER", settings.compiler_launcher())
        .define("LAMMPS_SOURCE_DIR", cfg.source_dir.join("src").display().to_string())
        .define_if(cfg.parallelism == Parallelism::MsMpi, "USE_MSMPI", "on")
}

pub fn pace_plugin_configure(cfg: &BuildConfig, settings: &Settings) -> CmakeConfigure {
    packaged_plugin_configure(
        cfg,
        settings,
        cfg.source_dir.join("examples/PACKAGES/pace/plugin"),
        "paceplugin",
    )
}

pub fn plugin_collection_configure(cfg: &BuildConfig, settings: &Settings) -> CmakeConfigure {
    packaged_plugin_configure(
        cfg,
        settings,
        PathBuf::from(PLUGIN_COLLECTION_DIR),
        "build_plugins",
    )
}

/// Third party executables that CMake does not fetch itself: `(url, file name)`.
pub fn thirdparty_downloads(cfg: &BuildConfig, settings: &Settings) -> Vec<(String, &'static str)> {
    let base = settings.thirdparty_url();
    vec![
        (format!("{base}/ffmpeg-win{}.exe.gz", cfg.bitness), "ffmpeg.exe"),
        (format!("{base}/gzip.exe.gz"), "gzip.exe"),
    ]
}

/// Move every `LAMMPS*plugin*.exe` in `build_dir` to `dest`.
pub fn relocate_plugin_installers(build_dir: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/LAMMPS*plugin*.exe",
        glob::Pattern::escape(&build_dir.to_string_lossy())
    );
    let mut moved = Vec::new();
    for entry in glob::glob(&pattern).context("invalid installer glob pattern")? {
        let exe = entry.context("failed to read installer candidate")?;
        let Some(name) = exe.file_name() else {
            continue;
        };
        let target = dest.join(name);
        workspace::move_file(&exe, &target)?;
        moved.push(target);
    }
    Ok(moved)
}

fn configure(cmake: &CmakeConfigure, work: &Path, verbose: bool) -> Result<()> {
    let cmd = cmake.to_command(work);
    output::detail(&format!("Running: {cmd}"));
    cmd.run_logged(verbose)
}

/// Configure, build and package one of the plugin installer projects, then
/// move the produced installers next to the build folder.
fn package_plugin(
    cmake: &CmakeConfigure,
    binary: &str,
    ws: &Workspace,
    verbose: bool,
) -> Result<()> {
    configure(cmake, ws.path(), verbose)?;
    output::action("Compiling", "and building installer");
    cmake::build_command(ws.path(), binary, Some("package"), None).run_logged(verbose)?;
    for exe in relocate_plugin_installers(&ws.path().join(binary), ws.artifact_dir())? {
        output::detail(&format!("Created {}", exe.display()));
    }
    Ok(())
}

/// One unit of work in [`run`], in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    FetchThirdParty,
    ConfigureMain,
    WriteQtConf,
    CompileMain,
    ExamplePlugins,
    PacePlugin,
    ClonePluginCollection,
    PluginCollection,
}

/// The steps this flavor needs. Plugin installers are only built for the
/// plain per-user installer.
pub fn planned_steps(cfg: &BuildConfig) -> Vec<BuildStep> {
    let mut steps = vec![BuildStep::FetchThirdParty, BuildStep::ConfigureMain];
    if cfg.gui {
        steps.push(BuildStep::WriteQtConf);
    }
    steps.extend([BuildStep::CompileMain, BuildStep::ExamplePlugins]);
    if cfg.is_plain_noadmin() {
        steps.extend([
            BuildStep::PacePlugin,
            BuildStep::ClonePluginCollection,
            BuildStep::PluginCollection,
        ]);
    }
    steps
}

fn run_step(
    step: BuildStep,
    cfg: &BuildConfig,
    settings: &Settings,
    resource_dir: &Path,
    ws: &Workspace,
) -> Result<()> {
    let work = ws.path();
    let verbose = cfg.verbose;
    match step {
        BuildStep::FetchThirdParty => {
            output::action("Downloading", "third party tools");
            for (url, name) in thirdparty_downloads(cfg, settings) {
                output::detail(name);
                download::fetch_gunzipped(&url, work, name)?;
            }
        }
        BuildStep::ConfigureMain => {
            output::action("Configuring", "build with CMake");
            configure(&main_configure(cfg, settings, resource_dir), work, verbose)?;
        }
        BuildStep::WriteQtConf => {
            std::fs::write(work.join("qt.conf"), QT_CONF).context("failed to write qt.conf")?;
        }
        BuildStep::CompileMain => {
            output::action("Compiling", "");
            cmake::build_command(work, ".", None, Some(BUILD_JOBS)).run_logged(verbose)?;
            output::success("Done", "");
        }
        BuildStep::ExamplePlugins => {
            output::action("Configuring", "demo plugin build with CMake");
            configure(&example_plugins_configure(cfg, settings), work, verbose)?;
            output::action("Compiling", "");
            cmake::build_command(work, "plugins", None, None).run_logged(verbose)?;
            output::success("Done", "");
        }
        BuildStep::PacePlugin => {
            output::action("Configuring", "pace plugin build with CMake");
            package_plugin(&pace_plugin_configure(cfg, settings), "paceplugin", ws, verbose)?;
            output::success("Done", "");
        }
        BuildStep::ClonePluginCollection => {
            output::action("Cloning", "lammps-plugins package");
            git::shallow_clone_command(&settings.plugins_git_url(), cfg.revision.as_str(), work)
                .run_logged(verbose)?;
        }
        BuildStep::PluginCollection => {
            output::action("Configuring", "LAMMPS plugin collection build with CMake");
            package_plugin(&plugin_collection_configure(cfg, settings), "build_plugins", ws, verbose)?;
            output::success("Done", "");
        }
    }
    Ok(())
}

/// Run every configure and build step for this flavor inside the build folder.
pub fn run(cfg: &BuildConfig, settings: &Settings, resource_dir: &Path, ws: &Workspace) -> Result<()> {
    for step in planned_steps(cfg) {
        run_step(step, cfg, settings, resource_dir, ws)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
