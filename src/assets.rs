//! Documentation, examples and data files shipped with the installer.
//!
//! Everything is copied from the source checkout into the build folder and
//! then adjusted for Windows users: oversized or unsupported content is
//! pruned, text files get CRLF line endings and files are renamed so that
//! Windows associates them with an application.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::command::ToolCommand;
use crate::flags::BuildConfig;
use crate::output;
use crate::workspace::{self, Workspace};

/// Folders copied verbatim from the checkout (relative paths are kept).
pub const COPIED_TREES: &[&str] = &["examples", "bench", "tools", "python/lammps", "potentials"];

/// Single documents: `(path in checkout, name in build folder)`.
pub const DOC_MANIFEST: &[(&str, &str)] = &[
    ("README", "README.txt"),
    ("LICENSE", "LICENSE.txt"),
    ("doc/src/PDF/colvars-refman-lammps.pdf", "Colvars-Manual.pdf"),
    ("tools/createatoms/Manual.pdf", "CreateAtoms-Manual.pdf"),
    ("doc/src/PDF/kspace.pdf", "Kspace-Extra-Info.pdf"),
    ("doc/src/PDF/pair_gayberne_extra.pdf", "PairGayBerne-Manual.pdf"),
    ("doc/src/PDF/pair_resquared_extra.pdf", "PairReSquared-Manual.pdf"),
    ("doc/src/PDF/PDLammps_overview.pdf", "PDLAMMPS-Overview.pdf"),
    ("doc/src/PDF/PDLammps_EPS.pdf", "PDLAMMPS-EPS.pdf"),
    ("doc/src/PDF/PDLammps_VES.pdf", "PDLAMMPS-VES.pdf"),
    ("doc/src/PDF/SPH_LAMMPS_userguide.pdf", "SPH-Manual.pdf"),
    ("doc/src/PDF/MACHDYN_LAMMPS_userguide.pdf", "MACHDYN-Manual.pdf"),
    ("doc/src/PDF/CG-DNA.pdf", "CG-DNA-Manual.pdf"),
];

/// Outdated inputs, examples of packages that are not bundled, and tests.
/// Must be kept in sync with upstream additions.
pub const PRUNED_DIRS: &[&str] = &[
    "examples/accelerate",
    "examples/kim",
    "examples/mscg",
    "examples/PACKAGES/quip",
    "examples/PACKAGES/vtk",
    "bench/FERMI",
    "bench/KEPLER",
    "tools/msi2lmp/test",
];

/// Potential tables too large for the installer.
pub const PRUNED_FILES: &[&str] = &[
    "potentials/C_10_10.mesocnt",
    "potentials/TABTP_10_10.mesont",
    "examples/PACKAGES/mesont/C_10_10.mesocnt",
    "examples/PACKAGES/mesont/TABTP_10_10.mesont",
];

const CRLF_FILES: &[&str] = &["LICENSE.txt", "README.txt", "tools/msi2lmp/README"];
const CRLF_TREES: &[&str] = &["bench", "examples", "potentials", "python", "tools/msi2lmp/frc_files"];
const README_TREES: &[&str] = &["tools", "bench", "examples", "potentials", "python"];
const INPUT_TREES: &[&str] = &["bench", "examples"];

// ---------------------------------------------------------------------------
// Copying
// ---------------------------------------------------------------------------

/// `make pdf` in the checkout's `doc/` folder, then move the manual into `work`.
pub fn build_manual(source_dir: &Path, work: &Path, verbose: bool) -> Result<()> {
    let doc = source_dir.join("doc");
    ToolCommand::new("make")
        .arg("pdf")
        .current_dir(&doc)
        .run_logged(verbose)?;
    workspace::move_file(&doc.join("Manual.pdf"), &work.join("LAMMPS-Manual.pdf"))
}

/// Recursively copy `from` to `to`, following symlinks.
pub fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", from.display()))?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .with_context(|| format!("{} escaped {}", entry.path().display(), from.display()))?;
        let dest = to.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest)
                .with_context(|| format!("failed to create {}", dest.display()))?;
        } else {
            std::fs::copy(entry.path(), &dest).with_context(|| {
                format!("failed to copy {} to {}", entry.path().display(), dest.display())
            })?;
        }
    }
    Ok(())
}

pub fn copy_trees(source_dir: &Path, work: &Path) -> Result<()> {
    for tree in COPIED_TREES {
        copy_tree(&source_dir.join(tree), &work.join(tree))?;
    }
    Ok(())
}

pub fn copy_documents(source_dir: &Path, work: &Path) -> Result<()> {
    for (from, to) in DOC_MANIFEST {
        let src = source_dir.join(from);
        std::fs::copy(&src, work.join(to))
            .with_context(|| format!("failed to copy {}", src.display()))?;
    }
    Ok(())
}

/// Remove [`PRUNED_DIRS`] and [`PRUNED_FILES`]; absent entries are skipped.
pub fn prune(work: &Path) -> Result<()> {
    for dir in PRUNED_DIRS {
        workspace::remove_dir_if_exists(&work.join(dir))?;
    }
    for file in PRUNED_FILES {
        let path = work.join(file);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("failed to remove {}", path.display()));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Convert bare LF to CRLF. Returns `None` for binary data (contains NUL) or
/// when nothing would change.
pub fn to_crlf(data: &[u8]) -> Option<Vec<u8>> {
    if data.contains(&0) {
        return None;
    }
    let mut out = Vec::with_capacity(data.len() + data.len() / 32);
    let mut changed = false;
    let mut prev = 0u8;
    for &b in data {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
            changed = true;
        }
        out.push(b);
        prev = b;
    }
    changed.then_some(out)
}

/// Rewrite one file with CRLF endings. Returns whether it changed.
pub fn convert_file_to_crlf(path: &Path) -> Result<bool> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match to_crlf(&data) {
        Some(converted) => {
            std::fs::write(path, converted)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn files_under(root: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(root)
        .into_iter()
        .filter(|e| e.as_ref().map_or(true, |e| e.file_type().is_file()))
}

/// Convert the fixed document list and every file below the text trees.
/// Returns the number of files rewritten.
pub fn normalize_line_endings(work: &Path) -> Result<usize> {
    let mut converted = 0;
    for file in CRLF_FILES {
        if convert_file_to_crlf(&work.join(file))? {
            converted += 1;
        }
    }
    for tree in CRLF_TREES {
        let root = work.join(tree);
        if !root.exists() {
            continue;
        }
        for entry in files_under(&root) {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            if convert_file_to_crlf(entry.path())? {
                converted += 1;
            }
        }
    }
    Ok(converted)
}

// ---------------------------------------------------------------------------
// Renames
// ---------------------------------------------------------------------------

/// Append `suffix` to every file below `trees` whose name satisfies `matches`.
/// Candidates are collected before renaming so the walk never sees its own output.
fn append_suffix(
    work: &Path,
    trees: &[&str],
    suffix: &str,
    matches: impl Fn(&str) -> bool,
) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();
    for tree in trees {
        let root = work.join(tree);
        if !root.exists() {
            continue;
        }
        for entry in files_under(&root) {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            if entry.file_name().to_str().is_some_and(&matches) {
                candidates.push(entry.into_path());
            }
        }
    }

    let mut renamed = Vec::with_capacity(candidates.len());
    for from in candidates {
        let mut name = from.clone().into_os_string();
        name.push(suffix);
        let to = PathBuf::from(name);
        std::fs::rename(&from, &to).with_context(|| {
            format!("failed to rename {} to {}", from.display(), to.display())
        })?;
        renamed.push(to);
    }
    Ok(renamed)
}

/// `README` → `README.txt`.
pub fn rename_readmes(work: &Path) -> Result<Vec<PathBuf>> {
    append_suffix(work, README_TREES, ".txt", |name| name == "README")
}

/// `in.<name>` → `in.<name>.lmp`. Not idempotent: a second pass appends again.
pub fn tag_input_scripts(work: &Path) -> Result<Vec<PathBuf>> {
    append_suffix(work, INPUT_TREES, ".lmp", |name| name.starts_with("in."))
}

// ---------------------------------------------------------------------------
// Stage entry point
// ---------------------------------------------------------------------------

/// Build the manual and assemble all files the installer bundles.
pub fn collect(cfg: &BuildConfig, ws: &Workspace) -> Result<()> {
    let src = &cfg.source_dir;
    let work = ws.path();

    output::action("Building", "PDF manual");
    build_manual(src, work, cfg.verbose)?;
    output::success("Done", "");

    output::action("Collecting", "files for the installer package");
    copy_trees(src, work)?;
    copy_documents(src, work)?;
    prune(work)?;

    let converted = normalize_line_endings(work)?;
    let readmes = rename_readmes(work)?;
    let inputs = tag_input_scripts(work)?;
    if cfg.verbose {
        output::detail(&format!("{converted} files converted to CRLF"));
        for path in readmes.iter().chain(&inputs) {
            output::detail(&format!("renamed to {}", path.display()));
        }
    }
    output::success("Done", "");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
