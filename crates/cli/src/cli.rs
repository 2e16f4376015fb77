// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A differential fuzzing driver for LLVM mid-end optimization patches
#[derive(Parser)]
#[command(name = "optfuzz")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "OPTFUZZ_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fuzz the pass touched by a patch, seeded from its test changes
    Patch(PatchArgs),
    /// Fuzz an existing directory of test files (correctness only)
    Dir(DirArgs),
    /// Generate shell completions on stdout
    Completions(CompletionsArgs),
}

#[derive(clap::Args)]
pub struct PatchArgs {
    /// Path to the Alive2 translation validator binary
    #[arg(value_name = "ALIVE_TV")]
    pub validator: PathBuf,

    /// Directory containing `opt` and `llvm-extract`
    #[arg(value_name = "LLVM_BIN")]
    pub llvm_bin: PathBuf,

    /// Root of the patched LLVM source tree
    #[arg(value_name = "LLVM_SRC")]
    pub llvm_src: PathBuf,

    /// Directory containing `mutate`, `merge`, and `cost`
    #[arg(value_name = "TOOL_BIN")]
    pub tool_bin: PathBuf,

    /// Unified diff of the patch under test
    #[arg(value_name = "PATCH")]
    pub patch: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Force color output
    #[arg(long)]
    pub color: bool,

    /// Disable color output
    #[arg(long)]
    pub no_color: bool,

    /// Budget multiplier mode (`quickfuzz` scales budgets by 0.01)
    #[arg(long, env = "FUZZ_MODE", default_value = "fuzz", hide = true)]
    pub fuzz_mode: String,
}

#[derive(clap::Args)]
pub struct DirArgs {
    /// Path to the Alive2 translation validator binary
    #[arg(value_name = "ALIVE_TV")]
    pub validator: PathBuf,

    /// Directory containing `opt`
    #[arg(value_name = "LLVM_BIN")]
    pub llvm_bin: PathBuf,

    /// Directory containing `mutate`, `merge`, and `cost`
    #[arg(value_name = "TOOL_BIN")]
    pub tool_bin: PathBuf,

    /// Directory of `.ll` test files to fuzz
    #[arg(value_name = "TEST_DIR")]
    pub test_dir: PathBuf,

    /// Number of trials to run
    #[arg(value_name = "COUNT")]
    pub count: u64,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Output format for the patch-mode summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable checklist
    Text,
    /// JSON summary document
    Json,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
