//! Integration tests for assembling installer contents from a checkout.
//!
//! A miniature LAMMPS tree is created in a temp dir and run through the same
//! copy, prune, line ending and rename steps the collect stage uses (the PDF
//! manual build needs a LaTeX toolchain and is left out).

use lammps_win_installer::assets::{self, DOC_MANIFEST};
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn fake_checkout() -> TempDir {
    let src = TempDir::new().unwrap();
    let root = src.path();
    for (from, _) in DOC_MANIFEST {
        write(root, from, b"doc line\n");
    }
    write(root, "examples/melt/in.melt", b"units lj\nrun 250\n");
    write(root, "examples/melt/README", b"melt example\n");
    write(root, "examples/accelerate/in.lj", b"stale\n");
    write(root, "examples/PACKAGES/mesont/TABTP_10_10.mesont", b"huge\n");
    write(root, "examples/PACKAGES/mesont/in.mesont", b"units metal\n");
    write(root, "bench/in.lj", b"units lj\r\nrun 100\r\n");
    write(root, "bench/KEPLER/in.lj.gpu", b"gpu\n");
    write(root, "bench/POTENTIALS/README", b"bench potentials\n");
    write(root, "tools/msi2lmp/README", b"msi2lmp\n");
    write(root, "tools/msi2lmp/frc_files/cvff.frc", b"!BIOSYM forcefield\n");
    write(root, "tools/msi2lmp/test/in.test", b"test\n");
    write(root, "tools/createatoms/Manual.pdf", b"%PDF\x00binary");
    write(root, "tools/README", b"tools\n");
    write(root, "python/lammps/__init__.py", b"from .core import *\n");
    write(root, "python/lammps/README", b"python module\n");
    write(root, "potentials/Cu_u3.eam", b"Cu\n");
    write(root, "potentials/C_10_10.mesocnt", b"huge\n");
    write(root, "potentials/table.bin", b"\x00\x01\n");
    src
}

fn collect_into(src: &Path, work: &Path) {
    assets::copy_trees(src, work).unwrap();
    assets::copy_documents(src, work).unwrap();
    assets::prune(work).unwrap();
    assets::normalize_line_endings(work).unwrap();
    assets::rename_readmes(work).unwrap();
    assets::tag_input_scripts(work).unwrap();
}

#[test]
fn collected_tree_is_windows_ready() {
    let src = fake_checkout();
    let work = TempDir::new().unwrap();
    collect_into(src.path(), work.path());
    let w = work.path();

    // manifest documents under their installer names
    for (_, to) in DOC_MANIFEST {
        assert!(w.join(to).is_file(), "{to} missing");
    }
    assert_eq!(std::fs::read(w.join("LICENSE.txt")).unwrap(), b"doc line\r\n");

    // pruned content is gone
    assert!(!w.join("examples/accelerate").exists());
    assert!(!w.join("bench/KEPLER").exists());
    assert!(!w.join("tools/msi2lmp/test").exists());
    assert!(!w.join("potentials/C_10_10.mesocnt").exists());
    assert!(!w.join("examples/PACKAGES/mesont/TABTP_10_10.mesont").exists());

    // input scripts are tagged and converted
    assert_eq!(
        std::fs::read(w.join("examples/melt/in.melt.lmp")).unwrap(),
        b"units lj\r\nrun 250\r\n"
    );
    assert!(w.join("examples/PACKAGES/mesont/in.mesont.lmp").is_file());
    assert_eq!(
        std::fs::read(w.join("bench/in.lj.lmp")).unwrap(),
        b"units lj\r\nrun 100\r\n"
    );

    // READMEs renamed in every tree, including tools
    for readme in [
        "examples/melt/README.txt",
        "bench/POTENTIALS/README.txt",
        "tools/README.txt",
        "tools/msi2lmp/README.txt",
        "python/lammps/README.txt",
    ] {
        assert!(w.join(readme).is_file(), "{readme} missing");
    }
    assert_eq!(
        std::fs::read(w.join("tools/msi2lmp/README.txt")).unwrap(),
        b"msi2lmp\r\n"
    );
    assert_eq!(std::fs::read(w.join("tools/README.txt")).unwrap(), b"tools\n");

    // other text trees converted, binaries untouched
    assert_eq!(
        std::fs::read(w.join("tools/msi2lmp/frc_files/cvff.frc")).unwrap(),
        b"!BIOSYM forcefield\r\n"
    );
    assert_eq!(
        std::fs::read(w.join("python/lammps/__init__.py")).unwrap(),
        b"from .core import *\r\n"
    );
    assert_eq!(
        std::fs::read(w.join("potentials/table.bin")).unwrap(),
        b"\x00\x01\n"
    );
}

#[test]
fn second_collection_pass_double_tags_inputs() {
    let src = fake_checkout();
    let work = TempDir::new().unwrap();
    collect_into(src.path(), work.path());

    assets::rename_readmes(work.path()).unwrap();
    let retagged = assets::tag_input_scripts(work.path()).unwrap();

    assert!(work.path().join("examples/melt/README.txt").is_file());
    assert!(!work.path().join("examples/melt/README.txt.txt").exists());
    assert!(work.path().join("examples/melt/in.melt.lmp.lmp").is_file());
    assert_eq!(retagged.len(), 3);
}

#[test]
fn missing_manifest_document_is_fatal() {
    let src = fake_checkout();
    std::fs::remove_file(src.path().join("doc/src/PDF/kspace.pdf")).unwrap();
    let work = TempDir::new().unwrap();
    let err = assets::copy_documents(src.path(), work.path()).unwrap_err();
    assert!(err.to_string().contains("kspace.pdf"), "{err}");
}
