// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One trial: mutate the seed, optimize the mutation, ask the oracle.
//!
//! A trial never propagates errors to the scheduler. Classified tool
//! failures (optimizer timeout/crash, validator crash) become
//! interesting results with a reason tag; anything else unexpected is
//! normalized to "not interesting". Uninteresting trials always delete
//! their scratch files; interesting ones leave them for post-mortem.

use std::path::{Path, PathBuf};

use crate::cost::CostOracle;
use crate::error::Result;
use crate::recipe::Recipe;
use crate::tools::{self, ToolOutcome, ToolSuite, SMT_TIMEOUT_MS, TOOL_TIMEOUT};

/// Validator report token: no incorrect transformations found.
const VALIDATOR_CLEAN: &str = "0 incorrect transformations";
/// Validator report token: the rewrite verified as correct.
const VALIDATOR_CORRECT: &str = "Transformation seems to be correct";
/// Validator report token: src and tgt were identical.
const VALIDATOR_SYNTACTIC: &str = "(syntactically equal)";

/// Everything a trial needs, shared across one recipe run.
pub struct TrialContext<'a> {
    pub tools: &'a ToolSuite,
    pub work_dir: &'a Path,
    pub pass_spec: &'a str,
    /// The merged seed module mutations start from.
    pub seed: &'a Path,
    /// Cost oracle caching the reference module's vector.
    pub costs: &'a CostOracle,
}

/// Scratch files for one trial, named `<recipe>-<id>.{src,tgt,tgt2}.ll`.
#[derive(Debug, Clone)]
pub struct TrialPaths {
    pub stem: String,
    pub src: PathBuf,
    pub tgt: PathBuf,
    pub tgt2: PathBuf,
}

impl TrialPaths {
    pub fn new(work_dir: &Path, recipe: Recipe, id: u64) -> Self {
        let stem = format!("{}-{}", recipe.name(), id);
        Self {
            src: work_dir.join(format!("{stem}.src.ll")),
            tgt: work_dir.join(format!("{stem}.tgt.ll")),
            tgt2: work_dir.join(format!("{stem}.tgt2.ll")),
            stem,
        }
    }

    /// Delete whichever scratch files exist.
    pub fn remove_all(&self) {
        for path in [&self.src, &self.tgt, &self.tgt2] {
            if path.exists() {
                std::fs::remove_file(path).ok();
            }
        }
    }
}

/// Outcome of one trial as consumed by the scheduler.
#[derive(Debug, Clone)]
pub struct TrialResult {
    /// Scratch-name stem, `<recipe>-<id>`.
    pub stem: String,
    /// Whether this trial is evidence of a bug.
    pub interesting: bool,
    /// Empty for pure findings; a short tag or diagnostic otherwise.
    pub reason: String,
}

impl TrialResult {
    fn pass(stem: &str) -> Self {
        Self {
            stem: stem.to_string(),
            interesting: false,
            reason: String::new(),
        }
    }

    fn finding(stem: &str, reason: impl Into<String>) -> Self {
        Self {
            stem: stem.to_string(),
            interesting: true,
            reason: reason.into(),
        }
    }
}

/// Run one trial of `recipe` with trial id `id`.
pub fn run_trial(ctx: &TrialContext, recipe: Recipe, id: u64) -> TrialResult {
    let paths = TrialPaths::new(ctx.work_dir, recipe, id);

    // Unclassified worker errors are structurally ambiguous; normalize
    // them to "not interesting" rather than aborting the recipe.
    let result = match trial_inner(ctx, recipe, &paths) {
        Ok(result) => result,
        Err(e) => {
            tracing::trace!(stem = %paths.stem, error = %e, "trial error swallowed");
            TrialResult::pass(&paths.stem)
        }
    };

    if !result.interesting {
        paths.remove_all();
    }
    result
}

fn trial_inner(ctx: &TrialContext, recipe: Recipe, paths: &TrialPaths) -> Result<TrialResult> {
    // Mutate the seed.
    let mutated = tools::run_tool(
        &ctx.tools.mutate,
        [ctx.seed, paths.src.as_path(), Path::new(recipe.name())],
        TOOL_TIMEOUT,
    );
    match mutated {
        Ok(ToolOutcome::Success(_)) => {}
        _ => return Ok(TrialResult::pass(&paths.stem)),
    }

    // Optimize the mutation. The optimizer falling over on a valid
    // module is itself a finding.
    let passes = format!("-passes={}", ctx.pass_spec);
    let optimized = tools::run_tool(
        &ctx.tools.opt,
        [
            "-S".as_ref(),
            "-o".as_ref(),
            paths.tgt.as_os_str(),
            paths.src.as_os_str(),
            passes.as_ref(),
        ],
        TOOL_TIMEOUT,
    );
    match optimized {
        Ok(ToolOutcome::Success(_)) => {}
        Ok(ToolOutcome::TimedOut) => return Ok(TrialResult::finding(&paths.stem, "timeout")),
        Ok(ToolOutcome::Failed(_)) | Err(_) => {
            return Ok(TrialResult::finding(&paths.stem, "crash"));
        }
    }

    match recipe {
        Recipe::Correctness => correctness_oracle(ctx, paths),
        Recipe::Commutative | Recipe::CanonicalForm => {
            let key = ctx
                .costs
                .compare(ctx.costs.reference(), &paths.tgt, None)?;
            Ok(match key {
                Some(key) => TrialResult::finding(
                    &paths.stem,
                    format!("{}:{} is not optimized as well.", paths.src.display(), key),
                ),
                None => TrialResult::pass(&paths.stem),
            })
        }
        Recipe::MultiUse => {
            let key = ctx
                .costs
                .compare(&paths.src, &paths.tgt, Some(ctx.costs.reference()))?;
            Ok(match key {
                Some(key) => TrialResult::finding(
                    &paths.stem,
                    format!(
                        "{}:{} has more instructions than before.",
                        paths.tgt.display(),
                        key
                    ),
                ),
                None => TrialResult::pass(&paths.stem),
            })
        }
        Recipe::FlagPreserving => flag_preserving_oracle(ctx, paths),
    }
}

/// Ask the validator whether the optimized mutation is a sound rewrite.
fn correctness_oracle(ctx: &TrialContext, paths: &TrialPaths) -> Result<TrialResult> {
    let report = validate(ctx, &paths.src, &paths.tgt);
    Ok(match report {
        Ok(ToolOutcome::Success(out)) => {
            let out = String::from_utf8_lossy(&out);
            if out.contains(VALIDATOR_CLEAN) {
                TrialResult::pass(&paths.stem)
            } else {
                TrialResult::finding(&paths.stem, "")
            }
        }
        // An SMT blow-up is noise, not evidence.
        Ok(ToolOutcome::TimedOut) => TrialResult::pass(&paths.stem),
        Ok(ToolOutcome::Failed(_)) | Err(_) => TrialResult::finding(&paths.stem, "alive2 crash"),
    })
}

/// Weaken flags again on the optimized output and ask the validator
/// whether the round trip still verifies. It should not: the first
/// mutation dropped a flag the rewrite relied on.
fn flag_preserving_oracle(ctx: &TrialContext, paths: &TrialPaths) -> Result<TrialResult> {
    let remutated = tools::run_tool(
        &ctx.tools.mutate,
        [
            paths.tgt.as_path(),
            paths.tgt2.as_path(),
            Path::new(Recipe::FlagPreserving.name()),
        ],
        TOOL_TIMEOUT,
    );
    match remutated {
        Ok(ToolOutcome::Success(_)) => {}
        _ => return Ok(TrialResult::pass(&paths.stem)),
    }

    let report = validate(ctx, &paths.src, &paths.tgt2);
    Ok(match report {
        Ok(ToolOutcome::Success(out)) => {
            let out = String::from_utf8_lossy(&out);
            // A syntactically-equal pair means the mutation degenerated;
            // nothing was tested.
            if out.contains(VALIDATOR_SYNTACTIC) {
                TrialResult::pass(&paths.stem)
            } else if out.contains(VALIDATOR_CORRECT) {
                TrialResult::finding(&paths.stem, "")
            } else {
                TrialResult::pass(&paths.stem)
            }
        }
        _ => TrialResult::pass(&paths.stem),
    })
}

fn validate(
    ctx: &TrialContext,
    src: &Path,
    tgt: &Path,
) -> std::io::Result<ToolOutcome> {
    let smt_to = format!("--smt-to={}", SMT_TIMEOUT_MS);
    tools::run_tool(
        &ctx.tools.validator,
        [
            smt_to.as_ref(),
            "--disable-undef-input".as_ref(),
            src.as_os_str(),
            tgt.as_os_str(),
        ],
        TOOL_TIMEOUT,
    )
}

#[cfg(test)]
#[path = "trial_tests.rs"]
mod tests;
