// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shell completion generation.

use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::Cli;

/// Write a completion script for `shell` to stdout.
pub fn print_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "optfuzz", &mut std::io::stdout());
}
