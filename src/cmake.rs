//! CMake configure commands as typed option tables.
//!
//! Options keep their insertion order so the rendered command line reads the
//! same way it was assembled.

use std::path::{Path, PathBuf};

use crate::command::ToolCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CmakeArg {
    /// `-D<name>=<value>`
    Define(String, String),
    /// `-C <file>`: pre-load a cache script.
    Preset(PathBuf),
    /// `-S <dir>`
    Source(PathBuf),
    /// `-B <dir>`
    Binary(PathBuf),
}

/// A pending `cmake` configure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmakeConfigure {
    program: String,
    options: Vec<CmakeArg>,
}

impl CmakeConfigure {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            options: Vec::new(),
        }
    }

    pub fn define(mut self, name: &str, value: impl Into<String>) -> Self {
        self.options
            .push(CmakeArg::Define(name.to_string(), value.into()));
        self
    }

    /// Add a define only when `cond` holds.
    pub fn define_if(self, cond: bool, name: &str, value: impl Into<String>) -> Self {
        if cond { self.define(name, value) } else { self }
    }

    pub fn preset(mut self, file: impl Into<PathBuf>) -> Self {
        self.options.push(CmakeArg::Preset(file.into()));
        self
    }

    pub fn preset_if(self, cond: bool, file: impl Into<PathBuf>) -> Self {
        if cond { self.preset(file) } else { self }
    }

    pub fn source(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.push(CmakeArg::Source(dir.into()));
        self
    }

    pub fn binary(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.push(CmakeArg::Binary(dir.into()));
        self
    }

    /// Last value given for `name`, if any.
    pub fn define_value(&self, name: &str) -> Option<&str> {
        self.options.iter().rev().find_map(|opt| match opt {
            CmakeArg::Define(n, v) if n == name => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn presets(&self) -> impl Iterator<Item = &Path> {
        self.options.iter().filter_map(|opt| match opt {
            CmakeArg::Preset(p) => Some(p.as_path()),
            _ => None,
        })
    }

    /// Render into a runnable command executed in `cwd`.
    pub fn to_command(&self, cwd: &Path) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.program).current_dir(cwd);
        for opt in &self.options {
            cmd = match opt {
                CmakeArg::Define(name, value) => cmd.arg(format!("-D{name}={value}")),
                CmakeArg::Preset(file) => cmd.arg("-C").arg(file),
                CmakeArg::Source(dir) => cmd.arg("-S").arg(dir),
                CmakeArg::Binary(dir) => cmd.arg("-B").arg(dir),
            };
        }
        cmd
    }
}

/// `cmake --build <dir>` with an optional target and parallel degree.
pub fn build_command(
    cwd: &Path,
    build_dir: &str,
    target: Option<&str>,
    parallel: Option<u32>,
) -> ToolCommand {
    let mut cmd = ToolCommand::new("cmake")
        .current_dir(cwd)
        .args(["--build", build_dir]);
    if let Some(target) = target {
        cmd = cmd.args(["--target", target]);
    }
    if let Some(jobs) = parallel {
        cmd = cmd.arg("--parallel").arg(jobs.to_string());
    }
    cmd
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_options_in_insertion_order() {
        let cfg = CmakeConfigure::new("mingw64-cmake")
            .define("CMAKE_BUILD_TYPE", "Release")
            .preset("/res/addpkg.cmake")
            .source("/src/cmake")
            .binary("build");
        let cmd = cfg.to_command(Path::new("/work"));
        assert_eq!(
            cmd.to_string(),
            "mingw64-cmake -DCMAKE_BUILD_TYPE=Release -C /res/addpkg.cmake -S /src/cmake -B build"
        );
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/work")));
    }

    #[test]
    fn conditional_options_are_skipped_when_false() {
        let cfg = CmakeConfigure::new("cmake")
            .define_if(false, "USE_MSMPI", "on")
            .preset_if(false, "/p.cmake")
            .define_if(true, "BUILD_OMP", "on");
        assert_eq!(cfg.define_value("USE_MSMPI"), None);
        assert_eq!(cfg.presets().count(), 0);
        assert_eq!(cfg.define_value("BUILD_OMP"), Some("on"));
    }

    #[test]
    fn define_value_reports_last_assignment() {
        let cfg = CmakeConfigure::new("cmake")
            .define("BUILD_MPI", "off")
            .define("BUILD_MPI", "on");
        assert_eq!(cfg.define_value("BUILD_MPI"), Some("on"));
    }

    #[test]
    fn build_command_variants() {
        let cwd = Path::new("/work");
        assert_eq!(
            build_command(cwd, ".", None, Some(8)).to_string(),
            "cmake --build . --parallel 8"
        );
        assert_eq!(
            build_command(cwd, "plugins", None, None).to_string(),
            "cmake --build plugins"
        );
        assert_eq!(
            build_command(cwd, "paceplugin", Some("package"), None).to_string(),
            "cmake --build paceplugin --target package"
        );
    }
}
