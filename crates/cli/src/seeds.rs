// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Seed harvesting and preparation.
//!
//! Patch mode scans the unified diff for function definitions inside
//! `.ll` test files and extracts each named function from the patched
//! source tree. Directory mode takes an existing directory of `.ll`
//! tests. Either way, preparation ends with a merged single-module seed
//! and a reference produced by one run of the optimizer.

use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::tools::{self, ToolSuite, TOOL_TIMEOUT};

/// Function-definition header in textual IR. Symbol names may contain
/// hyphens and dots, so `\w+` would truncate them; the opening
/// parenthesis anchors the match.
#[allow(clippy::expect_used)]
static FUNC_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"define .+ @([-.\w]+)\(").expect("valid regex"));

/// Directory-mode block-list: known-flaky tests excluded from seeding.
pub const BLOCK_LIST: &[&str] = &[
    // llvm/llvm-project#121428
    "select-cmp-cttz-ctlz.ll",
    // floating-point min/max flakiness
    "minmax-fold.ll",
    // llvm/llvm-project#121430
    "fneg-fabs.ll",
];

/// A (relative file, function name) pair harvested from a patch.
pub type SeedSet = BTreeSet<(String, String)>;

/// Collect seeds from a unified diff.
///
/// Every line inside a `.ll` file's hunks is scanned, context and
/// removals included: any function the diff so much as mentions is fair
/// game for fuzzing.
pub fn collect_seeds(patch: &Path) -> Result<SeedSet> {
    let file = std::fs::File::open(patch).map_err(|e| Error::io(patch, e))?;
    let reader = std::io::BufReader::new(file);

    let mut seeds = SeedSet::new();
    let mut current_file = String::new();

    for line in reader.lines() {
        let line = line.map_err(|e| Error::io(patch, e))?;
        if let Some(rest) = line.strip_prefix("diff --git a/") {
            current_file = rest
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_string();
            continue;
        }
        if !current_file.ends_with(".ll") {
            continue;
        }
        if let Some(captures) = FUNC_DEF.captures(&line) {
            let func = captures[1].to_string();
            seeds.insert((current_file.clone(), func));
        }
    }

    tracing::debug!(count = seeds.len(), "harvested seeds from patch");
    Ok(seeds)
}

/// Prepared seed artifacts for one fuzzing run.
#[derive(Debug, Clone)]
pub struct SeedArtifacts {
    /// Merged single-module seed.
    pub merged: PathBuf,
    /// The merged seed after one run of the optimizer.
    pub reference: PathBuf,
}

/// Extract each harvested function into `<work_dir>/seeds/seed<i>.ll`.
///
/// Individual extraction failures are tolerated; a function that moved
/// or was deleted by the patch simply yields no seed file.
pub fn extract_seeds(
    tools: &ToolSuite,
    llvm_src: &Path,
    work_dir: &Path,
    seeds: &SeedSet,
) -> Result<PathBuf> {
    let extract = tools
        .llvm_extract
        .as_deref()
        .ok_or_else(|| Error::Internal("seed extraction requires llvm-extract".into()))?;

    let seeds_dir = work_dir.join("seeds");
    std::fs::create_dir_all(&seeds_dir).map_err(|e| Error::io(&seeds_dir, e))?;

    for (i, (file, func)) in seeds.iter().enumerate() {
        let out = seeds_dir.join(format!("seed{i}.ll"));
        let source = llvm_src.join(file);
        let extracted = tools::run_tool(
            extract,
            [
                "-S".as_ref(),
                "-func".as_ref(),
                func.as_ref(),
                "-o".as_ref(),
                out.as_os_str(),
                source.as_os_str(),
            ],
            TOOL_TIMEOUT,
        );
        if !matches!(extracted, Ok(tools::ToolOutcome::Success(_))) {
            tracing::debug!(file = %file, func = %func, "seed extraction failed, skipping");
        }
    }

    Ok(seeds_dir)
}

/// Merge per-function seed files and produce the optimizer reference.
pub fn prepare(
    tools: &ToolSuite,
    work_dir: &Path,
    seeds_dir: &Path,
    pass_spec: &str,
) -> Result<SeedArtifacts> {
    let merged = work_dir.join("seeds.ll");
    let reference = work_dir.join("seeds_ref.ll");

    tools::run_checked(&tools.merge, [seeds_dir, merged.as_path()], TOOL_TIMEOUT)?;

    let passes = format!("-passes={pass_spec}");
    tools::run_checked(
        &tools.opt,
        [
            "-S".as_ref(),
            "-o".as_ref(),
            reference.as_os_str(),
            merged.as_os_str(),
            passes.as_ref(),
        ],
        TOOL_TIMEOUT,
    )?;

    Ok(SeedArtifacts { merged, reference })
}

/// One prepared directory-mode test: its merged seed and reference.
#[derive(Debug, Clone)]
pub struct PreparedTest {
    pub seed: PathBuf,
    pub reference: PathBuf,
}

/// Whether a directory entry is a seedable `.ll` test.
pub fn is_candidate(name: &str, extra_blocked: &[String]) -> bool {
    name.ends_with(".ll")
        && !BLOCK_LIST.contains(&name)
        && !extra_blocked.iter().any(|b| b == name)
}

/// Prepare one directory-mode candidate under `<seed_root>/<id>/`.
///
/// Returns None when any step fails; such candidates are dropped
/// silently.
pub fn prepare_candidate(
    tools: &ToolSuite,
    test_dir: &Path,
    seed_root: &Path,
    id: usize,
    name: &str,
    pass_spec: &str,
) -> Option<PreparedTest> {
    let tmp = seed_root.join(id.to_string());
    std::fs::create_dir_all(&tmp).ok()?;
    std::fs::copy(test_dir.join(name), tmp.join("orig.ll")).ok()?;

    let seed = tmp.join("seed.ll");
    let merged = tools::run_tool(
        &tools.merge,
        [tmp.as_path(), seed.as_path()],
        TOOL_TIMEOUT,
    );
    if !matches!(merged, Ok(tools::ToolOutcome::Success(_))) {
        return None;
    }

    let reference = tmp.join("ref.ll");
    let passes = format!("-passes={pass_spec}");
    let optimized = tools::run_tool(
        &tools.opt,
        [
            "-S".as_ref(),
            "-o".as_ref(),
            reference.as_os_str(),
            seed.as_os_str(),
            passes.as_ref(),
        ],
        TOOL_TIMEOUT,
    );
    if !matches!(optimized, Ok(tools::ToolOutcome::Success(_))) {
        return None;
    }

    Some(PreparedTest { seed, reference })
}

#[cfg(test)]
#[path = "seeds_tests.rs"]
mod tests;
