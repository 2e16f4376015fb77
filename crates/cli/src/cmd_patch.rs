// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Patch-driven fuzzing orchestration.
//!
//! Gatekeeper → seed harvest → merge/reference → five recipes in fixed
//! order, each with its own time budget and worker pool. A failing
//! recipe never aborts the run; the remaining recipes still execute and
//! the process exits 0.

use std::time::Instant;

use crate::cli::{Cli, OutputFormat, PatchArgs};
use crate::color::{is_no_color_env, resolve_color};
use crate::config;
use crate::cost::CostOracle;
use crate::error::{ExitCode, Result};
use crate::recipe::Recipe;
use crate::report::{CheckLine, Preamble, RunSummary, TextReporter};
use crate::scheduler::{self, RecipeOutcome};
use crate::seeds;
use crate::tools::ToolSuite;
use crate::trial::{self, TrialContext};
use crate::workdir;

/// Budget multiplier for quick mode.
const QUICK_SCALE: f64 = 0.01;

pub fn run(cli: &Cli, args: &PatchArgs) -> Result<ExitCode> {
    let cwd = std::env::current_dir().map_err(|e| crate::error::Error::io(".", e))?;
    let config = config::resolve(cli.config.as_deref(), &cwd)?;

    let tools = ToolSuite::for_patch(&args.validator, &args.llvm_bin, &args.tool_bin)?;

    // Gatekeeper: does the patch touch a supported pass at all?
    let Some(pass_spec) = crate::gate::pass_for_patch(&args.patch)? else {
        println!("Not interesting");
        return Ok(ExitCode::Success);
    };
    tracing::info!(pass = %pass_spec, "patch selected for fuzzing");

    let work_dir = workdir::recreate(&cwd)?;

    // Harvest seeds from the patch's test changes.
    let seed_set = seeds::collect_seeds(&args.patch)?;
    if seed_set.is_empty() {
        println!("No seeds found");
        return Ok(ExitCode::Success);
    }
    let seed_count = seed_set.len();

    let seeds_dir = seeds::extract_seeds(&tools, &args.llvm_src, &work_dir, &seed_set)?;
    let artifacts = seeds::prepare(&tools, &work_dir, &seeds_dir, &pass_spec)?;
    let costs = CostOracle::new(&tools, &artifacts.reference)?;

    let scale = config.budget_scale.unwrap_or(if args.fuzz_mode == "quickfuzz" {
        QUICK_SCALE
    } else {
        1.0
    });
    let workers = config.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    tracing::info!(workers, scale, "starting checks");

    let ctx = TrialContext {
        tools: &tools,
        work_dir: &work_dir,
        pass_spec: &pass_spec,
        seed: &artifacts.merged,
        costs: &costs,
    };

    let preamble = Preamble::from_env(seed_count, &pass_spec);
    let color_choice = resolve_color(args.color, args.no_color || is_no_color_env());
    let mut reporter = TextReporter::new(color_choice);
    let text = args.output == OutputFormat::Text;
    if text {
        reporter
            .write_preamble(&preamble)
            .map_err(|e| crate::error::Error::io("stdout", e))?;
    }

    let start = Instant::now();
    let mut checks = Vec::with_capacity(Recipe::ALL.len());

    for recipe in Recipe::ALL {
        let budget = recipe.budget().mul_f64(scale);
        let outcome = scheduler::run_recipe(&work_dir, recipe, budget, workers, |id| {
            trial::run_trial(&ctx, recipe, id)
        })?;

        let (passed, kept) = match outcome {
            RecipeOutcome::Passed => (true, None),
            RecipeOutcome::Failed(kept) => (false, kept),
        };
        if text {
            if let Some(kept) = &kept {
                reporter
                    .write_finding(kept)
                    .map_err(|e| crate::error::Error::io("stdout", e))?;
            }
            reporter
                .write_check(recipe, passed)
                .map_err(|e| crate::error::Error::io("stdout", e))?;
        }
        checks.push(CheckLine::new(recipe, passed, kept.as_ref()));
    }

    let elapsed = start.elapsed();
    if text {
        reporter
            .write_footer(elapsed)
            .map_err(|e| crate::error::Error::io("stdout", e))?;
    } else {
        let summary = RunSummary::new(preamble, checks, elapsed);
        summary
            .write_to(&mut std::io::stdout().lock())
            .map_err(|e| crate::error::Error::io("stdout", e))?;
    }

    Ok(ExitCode::Success)
}
