//! Test helpers for behavioral specifications.
//!
//! Builds a stub LLVM world: every external tool is a tiny shell
//! script, so specs exercise the real binary end to end without LLVM.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::PredicateBooleanExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Returns a Command configured to run the optfuzz binary
pub fn optfuzz_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("optfuzz"))
}

/// A sandbox with stub tools, a patched source tree, and a cwd.
pub struct World {
    _dir: tempfile::TempDir,
    /// Directory holding every stub binary (also prepended to PATH).
    pub bin: PathBuf,
    /// Patched LLVM source root.
    pub llvm_src: PathBuf,
    /// Current directory for the run (owns `fuzz/` and optfuzz.toml).
    pub cwd: PathBuf,
    /// The patch under test.
    pub patch: PathBuf,
}

#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[cfg(unix)]
impl World {
    /// Build a world whose cost analyzer and validator run the given
    /// bodies. Mutate/opt/extract copy files; lsdiff parses the patch.
    pub fn new(cost_body: &str, validator_body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let bin = root.join("bin");
        std::fs::create_dir(&bin).unwrap();
        write_script(&bin, "mutate", "cp \"$1\" \"$2\"");
        write_script(&bin, "merge", "cat \"$1\"/*.ll > \"$2\"");
        // opt -S -o <out> <in> -passes=<spec>
        write_script(&bin, "opt", "cp \"$4\" \"$3\"");
        // llvm-extract -S -func <name> -o <out> <in>
        write_script(&bin, "llvm-extract", "cp \"$6\" \"$5\"");
        write_script(&bin, "cost", cost_body);
        write_script(&bin, "alive-tv", validator_body);
        // Minimal lsdiff: list the files named by diff headers.
        write_script(
            &bin,
            "lsdiff",
            r#"sed -n 's|^diff --git a/\([^ ]*\).*|\1|p' "$1""#,
        );

        let llvm_src = root.join("llvm-src");
        std::fs::create_dir(&llvm_src).unwrap();

        let cwd = root.join("run");
        std::fs::create_dir(&cwd).unwrap();
        // Keep spec runtime bounded: scale budgets down hard.
        std::fs::write(
            cwd.join("optfuzz.toml"),
            "version = 1\nworkers = 2\nbudget_scale = 0.0001\n",
        )
        .unwrap();

        let patch = root.join("change.diff");
        std::fs::write(&patch, "").unwrap();

        World {
            _dir: dir,
            bin,
            llvm_src,
            cwd,
            patch,
        }
    }

    /// Write the patch contents.
    pub fn set_patch(&self, content: &str) {
        std::fs::write(&self.patch, content).unwrap();
    }

    /// Add a test file to the patched source tree.
    pub fn add_source_file(&self, rel: &str, content: &str) {
        let path = self.llvm_src.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
    }

    /// The run's work directory.
    pub fn work_dir(&self) -> PathBuf {
        self.cwd.join("fuzz")
    }

    /// Scratch stems currently present for a recipe.
    pub fn stems(&self, recipe: &str) -> Vec<String> {
        let mut stems: Vec<String> = match std::fs::read_dir(self.work_dir()) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.starts_with(&format!("{}-", recipe)))
                .map(|n| n.split('.').next().unwrap_or_default().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
        stems.sort_unstable();
        stems.dedup();
        stems
    }

    /// An optfuzz `patch` command wired into this world.
    pub fn patch_cmd(&self) -> Command {
        let mut cmd = optfuzz_cmd();
        let path = std::env::var("PATH").unwrap_or_default();
        cmd.current_dir(&self.cwd)
            .env("PATH", format!("{}:{}", self.bin.display(), path))
            .env("FUZZ_MODE", "quickfuzz")
            .env_remove("LLVM_REVISION")
            .env_remove("COMMIT_URL")
            .env_remove("PATCH_SHA256")
            .arg("patch")
            .arg(self.bin.join("alive-tv"))
            .arg(&self.bin)
            .arg(&self.llvm_src)
            .arg(&self.bin)
            .arg(&self.patch);
        cmd
    }
}

/// A patch adding one function to an InstCombine test file.
pub const INSTCOMBINE_PATCH: &str = "\
diff --git a/llvm/test/Transforms/InstCombine/add.ll b/llvm/test/Transforms/InstCombine/add.ll
--- a/llvm/test/Transforms/InstCombine/add.ll
+++ b/llvm/test/Transforms/InstCombine/add.ll
+define i32 @narrow_add(i32 %x, i32 %y) {
+  %s = add i32 %x, %y
+  ret i32 %s
+}
";

/// The test file the patch above refers to.
pub const INSTCOMBINE_TEST: &str = "\
define i32 @narrow_add(i32 %x, i32 %y) {
  %s = add i32 %x, %y
  ret i32 %s
}
";
