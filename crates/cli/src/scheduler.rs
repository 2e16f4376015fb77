// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-recipe worker pool with time budgets and early termination.
//!
//! Trial IDs fan out in batches of `20 × workers` over a dedicated
//! rayon pool; workers push results through a crossbeam channel as they
//! finish. A batch always drains fully before the orchestrator decides
//! anything — retention must see a finite, settled candidate set, and
//! in-flight workers may still be creating or deleting scratch files
//! until then.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::trial::TrialResult;

/// Trials submitted per scheduling round.
const BATCH_FACTOR: u64 = 20;

/// How a recipe run ended.
#[derive(Debug)]
pub enum RecipeOutcome {
    /// Budget elapsed without an interesting trial.
    Passed,
    /// Some trial was interesting; carries the one retained reproducer.
    Failed(Option<TrialResult>),
}

impl RecipeOutcome {
    pub fn failed(&self) -> bool {
        matches!(self, RecipeOutcome::Failed(_))
    }
}

/// Run one recipe until a finding or budget exhaustion.
///
/// The trial function is injected so tests can drive the scheduler
/// without external tools; production binds it to `trial::run_trial`.
pub fn run_recipe<F>(
    work_dir: &Path,
    recipe: Recipe,
    budget: Duration,
    workers: usize,
    trial: F,
) -> Result<RecipeOutcome>
where
    F: Fn(u64) -> TrialResult + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Error::Internal(format!("failed to build worker pool: {e}")))?;

    let batch = BATCH_FACTOR * workers as u64;
    let start = Instant::now();
    let mut next_id = 0u64;

    while start.elapsed() < budget {
        let (tx, rx) = crossbeam_channel::unbounded::<TrialResult>();

        tracing::debug!(%recipe, next_id, batch, "submitting batch");
        pool.scope(|scope| {
            for id in next_id..next_id + batch {
                let tx = tx.clone();
                let trial = &trial;
                scope.spawn(move |_| {
                    tx.send(trial(id)).ok();
                });
            }
        });
        drop(tx);

        // The scope has drained; collect findings in completion order.
        let findings: Vec<TrialResult> = rx.iter().filter(|r| r.interesting).collect();

        if !findings.is_empty() {
            let kept = retain_one(work_dir, recipe, &findings)?;
            return Ok(RecipeOutcome::Failed(kept));
        }
        next_id += batch;
    }

    tracing::debug!(%recipe, trials = next_id, "budget elapsed");
    Ok(RecipeOutcome::Passed)
}

/// Keep the scratch files of at most one interesting trial; delete the
/// rest. Prefers the first finding that carries a reason, so the
/// retained reproducer has a diagnostic attached when any does.
///
/// Directory mode applies the same sweep after its batch drains.
pub fn retain_one(
    work_dir: &Path,
    recipe: Recipe,
    findings: &[TrialResult],
) -> Result<Option<TrialResult>> {
    let kept = findings
        .iter()
        .find(|f| !f.reason.is_empty())
        .or_else(|| findings.first())
        .cloned();

    let prefix = format!("{}-", recipe.name());
    let entries = std::fs::read_dir(work_dir).map_err(|e| Error::io(work_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(work_dir, e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(&prefix) {
            continue;
        }
        let stem = name.split('.').next().unwrap_or(&name);
        let keep = kept.as_ref().is_some_and(|k| k.stem == stem);
        if !keep {
            std::fs::remove_file(entry.path()).ok();
        }
    }

    if let Some(kept) = &kept {
        tracing::debug!(%recipe, stem = %kept.stem, "retained reproducer");
    }
    Ok(kept)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
