//! Git helpers for the LAMMPS source checkout.
//!
//! All functions shell out to `git`. Commands that operate on an existing
//! checkout pass `-C <dir>` instead of changing the process working directory.

use anyhow::Result;
use std::path::Path;

use crate::command::ToolCommand;
use crate::flags::Revision;
use crate::output;

// ---------------------------------------------------------------------------
// Command construction
// ---------------------------------------------------------------------------

fn git_in(repo: &Path) -> ToolCommand {
    ToolCommand::new("git").arg("-C").arg(repo)
}

pub fn clone_command(url: &str, dest: &Path) -> ToolCommand {
    ToolCommand::new("git").args(["clone", url]).arg(dest)
}

pub fn fetch_command(repo: &Path) -> ToolCommand {
    git_in(repo).args(["fetch", "origin"])
}

pub fn checkout_command(repo: &Path, revision: &str) -> ToolCommand {
    git_in(repo).args(["checkout", revision])
}

pub fn pull_command(repo: &Path) -> ToolCommand {
    git_in(repo).arg("pull")
}

/// Single-branch depth-1 clone into `parent`, keeping the repository's own
/// directory name.
pub fn shallow_clone_command(url: &str, branch: &str, parent: &Path) -> ToolCommand {
    ToolCommand::new("git")
        .current_dir(parent)
        .args(["clone", "-b", branch, "--depth", "1", url])
}

// ---------------------------------------------------------------------------
// Source synchronization
// ---------------------------------------------------------------------------

/// The git invocations needed to bring `source_dir` to `revision`, in order.
pub fn sync_commands(source_dir: &Path, url: &str, revision: &Revision) -> Vec<ToolCommand> {
    let mut cmds = Vec::new();
    if !source_dir.exists() {
        cmds.push(clone_command(url, source_dir));
    }
    cmds.push(fetch_command(source_dir));
    cmds.push(checkout_command(source_dir, revision.as_str()));
    if revision.is_moving() {
        cmds.push(pull_command(source_dir));
    }
    cmds
}

/// Clone if needed, fetch, check out `revision`, and fast-forward moving branches.
pub fn sync_source(source_dir: &Path, url: &str, revision: &Revision, verbose: bool) -> Result<()> {
    for cmd in sync_commands(source_dir, url, revision) {
        if verbose {
            output::detail(&cmd.to_string());
        }
        cmd.run_logged(verbose)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
