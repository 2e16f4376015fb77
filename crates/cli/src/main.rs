// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Optfuzz CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use optfuzz::cli::{Cli, Command};
use optfuzz::error::ExitCode;
use optfuzz::{cmd_dir, cmd_patch, completions};

fn init_logging() {
    let filter = EnvFilter::try_from_env("OPTFUZZ_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("optfuzz: {}", e);
            match e.downcast_ref::<optfuzz::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::InternalError,
            }
        }
    };

    std::process::exit(exit_code as i32);
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Patch(args) => Ok(cmd_patch::run(&cli, args)?),
        Command::Dir(args) => Ok(cmd_dir::run(&cli, args)?),
        Command::Completions(args) => {
            completions::print_completions(args.shell);
            Ok(ExitCode::Success)
        }
    }
}
