//! External tool invocation.
//!
//! A [`ToolCommand`] is a plain value: program, ordered argument tokens and an
//! optional working directory. Nothing is spawned until [`ToolCommand::run`],
//! so command construction can be checked without the tools installed.

use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::output;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn get_args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Arguments as owned strings, lossily converted. Handy in assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Run to completion and return stdout followed by stderr.
    ///
    /// A non-zero exit is an error whose message carries the command line,
    /// the exit status and the captured output verbatim.
    pub fn run(&self) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("failed to execute {}", self.program.to_string_lossy()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            bail!(
                "Command '{self}' returned non-zero exit status ({})\n{}",
                output.status,
                combined.trim_end()
            );
        }
        Ok(combined)
    }

    /// Run, echoing the captured output only when `verbose` is set.
    pub fn run_logged(&self, verbose: bool) -> Result<()> {
        let text = self.run()?;
        if verbose {
            output::tool_output(&text);
        }
        Ok(())
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
