// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-driven fuzzing orchestration.
//!
//! Instead of harvesting seeds from a patch, every `.ll` file in an
//! existing test directory becomes a candidate (minus the block-list).
//! Trials run the correctness recipe only, each against a randomly
//! chosen prepared seed, until the requested count is reached or a
//! finding stops submission. Retention matches patch mode: at most one
//! reproducer stem survives on disk.

use std::path::PathBuf;

use indicatif::ProgressBar;
use rand::Rng;

use crate::cli::{Cli, DirArgs};
use crate::config;
use crate::cost::CostOracle;
use crate::error::{Error, ExitCode, Result};
use crate::recipe::Recipe;
use crate::scheduler;
use crate::seeds::{self, PreparedTest};
use crate::tools::ToolSuite;
use crate::trial::{self, TrialContext, TrialResult};
use crate::workdir;

/// Directory mode always runs a fixed-size pool.
const DIR_WORKERS: usize = 16;

/// The pass exercised in directory mode.
const DIR_PASS: &str = "instcombine<no-verify-fixpoint>";

/// A prepared seed plus its cached reference cost oracle.
struct SeedBench {
    prepared: PreparedTest,
    costs: CostOracle,
}

pub fn run(cli: &Cli, args: &DirArgs) -> Result<ExitCode> {
    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    let config = config::resolve(cli.config.as_deref(), &cwd)?;

    let tools = ToolSuite::for_dir(&args.validator, &args.llvm_bin, &args.tool_bin)?;
    let work_dir = workdir::recreate(&cwd)?;
    let seed_root = work_dir.join("seed");
    std::fs::create_dir_all(&seed_root).map_err(|e| Error::io(&seed_root, e))?;

    let workers = config.workers.unwrap_or(DIR_WORKERS);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| Error::Internal(format!("failed to build worker pool: {e}")))?;

    let benches = prepare_all(&pool, &tools, args, &config, &seed_root)?;
    println!("Valid tests: {}", benches.len());
    if benches.is_empty() {
        return Ok(ExitCode::Success);
    }

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(args.count)
    };

    let finding = run_trials(&pool, &tools, &work_dir, &benches, args.count, &progress)?;
    progress.finish_and_clear();

    if let Some((id, result, seed)) = &finding {
        println!("{} {} {}", id, Recipe::Correctness, seed.display());
        if !result.reason.is_empty() {
            println!("{} {}", result.stem, result.reason);
        }
    }

    Ok(ExitCode::Success)
}

/// Prepare every candidate in the test directory, in parallel.
///
/// Ids follow directory enumeration order so each candidate gets a
/// stable scratch subdirectory; failed candidates are dropped silently.
fn prepare_all(
    pool: &rayon::ThreadPool,
    tools: &ToolSuite,
    args: &DirArgs,
    config: &config::Config,
    seed_root: &std::path::Path,
) -> Result<Vec<SeedBench>> {
    let entries = std::fs::read_dir(&args.test_dir).map_err(|e| Error::io(&args.test_dir, e))?;
    let names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    use rayon::prelude::*;
    let benches: Vec<SeedBench> = pool.install(|| {
        names
            .par_iter()
            .enumerate()
            .filter_map(|(id, name)| {
                if !seeds::is_candidate(name, &config.block_list) {
                    return None;
                }
                let prepared = seeds::prepare_candidate(
                    tools,
                    &args.test_dir,
                    seed_root,
                    id,
                    name,
                    DIR_PASS,
                )?;
                let costs = CostOracle::new(tools, &prepared.reference).ok()?;
                Some(SeedBench { prepared, costs })
            })
            .collect()
    });

    tracing::info!(
        candidates = names.len(),
        valid = benches.len(),
        "prepared directory seeds"
    );
    Ok(benches)
}

/// Run correctness trials in batches until `count` is reached or a
/// finding stops submission. A batch with findings is pruned to at most
/// one kept reproducer, whose `(id, result, seed)` is returned.
fn run_trials(
    pool: &rayon::ThreadPool,
    tools: &ToolSuite,
    work_dir: &std::path::Path,
    benches: &[SeedBench],
    count: u64,
    progress: &ProgressBar,
) -> Result<Option<(u64, TrialResult, PathBuf)>> {
    let batch = 20 * pool.current_num_threads() as u64;
    let mut next_id = 0u64;

    while next_id < count {
        let end = (next_id + batch).min(count);
        let (tx, rx) = crossbeam_channel::unbounded();

        pool.scope(|scope| {
            for id in next_id..end {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let pick = rand::rng().random_range(0..benches.len());
                    let bench = &benches[pick];
                    let ctx = TrialContext {
                        tools,
                        work_dir,
                        pass_spec: DIR_PASS,
                        seed: &bench.prepared.seed,
                        costs: &bench.costs,
                    };
                    let result = trial::run_trial(&ctx, Recipe::Correctness, id);
                    progress.inc(1);
                    tx.send((id, result, bench.prepared.seed.clone())).ok();
                });
            }
        });
        drop(tx);

        let findings: Vec<(u64, TrialResult, PathBuf)> = rx
            .iter()
            .filter(|(_, result, _)| result.interesting)
            .collect();

        if !findings.is_empty() {
            let results: Vec<TrialResult> =
                findings.iter().map(|(_, result, _)| result.clone()).collect();
            let kept = scheduler::retain_one(work_dir, Recipe::Correctness, &results)?;
            return Ok(kept.and_then(|k| {
                findings
                    .into_iter()
                    .find(|(_, result, _)| result.stem == k.stem)
            }));
        }
        next_id = end;
    }

    Ok(None)
}
