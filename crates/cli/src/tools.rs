// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! External tool resolution and the subprocess driver.
//!
//! Every helper (mutator, merger, cost analyzer, optimizer, extractor,
//! translation validator) is invoked through [`run_tool`], which bounds
//! the call with a timeout, suppresses stderr, and classifies the exit
//! into a [`ToolOutcome`]. Workers depend on that classification to tell
//! an optimizer crash from an optimizer timeout from a clean run.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Uniform timeout applied to every helper invocation.
pub const TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// SMT timeout handed to the translation validator, in milliseconds.
pub const SMT_TIMEOUT_MS: u32 = 100;

/// Resolved paths to all external helper binaries.
#[derive(Debug, Clone)]
pub struct ToolSuite {
    /// Translation validator (Alive2 `alive-tv`).
    pub validator: PathBuf,
    /// Optimizer front-end (`opt`).
    pub opt: PathBuf,
    /// Function extractor (`llvm-extract`); absent in directory mode.
    pub llvm_extract: Option<PathBuf>,
    /// Program mutator.
    pub mutate: PathBuf,
    /// Module merger.
    pub merge: PathBuf,
    /// Cost analyzer.
    pub cost: PathBuf,
}

impl ToolSuite {
    /// Resolve the tools needed for patch-driven fuzzing.
    pub fn for_patch(validator: &Path, llvm_bin: &Path, tool_bin: &Path) -> Result<Self> {
        Ok(Self {
            validator: require("validator", validator.to_path_buf())?,
            opt: require("opt", llvm_bin.join("opt"))?,
            llvm_extract: Some(require("llvm-extract", llvm_bin.join("llvm-extract"))?),
            mutate: require("mutate", tool_bin.join("mutate"))?,
            merge: require("merge", tool_bin.join("merge"))?,
            cost: require("cost", tool_bin.join("cost"))?,
        })
    }

    /// Resolve the tools needed for directory-driven fuzzing.
    pub fn for_dir(validator: &Path, llvm_bin: &Path, tool_bin: &Path) -> Result<Self> {
        Ok(Self {
            validator: require("validator", validator.to_path_buf())?,
            opt: require("opt", llvm_bin.join("opt"))?,
            llvm_extract: None,
            mutate: require("mutate", tool_bin.join("mutate"))?,
            merge: require("merge", tool_bin.join("merge"))?,
            cost: require("cost", tool_bin.join("cost"))?,
        })
    }
}

/// A missing binary is a fatal setup error.
fn require(name: &'static str, path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::MissingTool { name, path })
    }
}

/// Classified result of one helper invocation.
#[derive(Debug)]
pub enum ToolOutcome {
    /// Exited with status zero; captured stdout.
    Success(Vec<u8>),
    /// Exited with a non-zero status.
    Failed(std::process::ExitStatus),
    /// Killed after exceeding the timeout.
    TimedOut,
}

impl ToolOutcome {
    /// Stdout as UTF-8 (lossy) for successful runs, None otherwise.
    pub fn stdout(&self) -> Option<String> {
        match self {
            ToolOutcome::Success(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

/// Run a helper with arguments, bounded by `timeout`.
///
/// Stdout is captured; stderr is discarded. Spawn failures surface as
/// `io::Error` so callers can decide whether they are fatal.
pub fn run_tool<I, S>(program: &Path, args: I, timeout: Duration) -> io::Result<ToolOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::null());
    cmd.stdin(Stdio::null());

    tracing::trace!(program = %program.display(), "spawning tool");
    let child = cmd.spawn()?;

    match wait_with_timeout(child, timeout) {
        Ok(output) => {
            if output.status.success() {
                Ok(ToolOutcome::Success(output.stdout))
            } else {
                Ok(ToolOutcome::Failed(output.status))
            }
        }
        Err(e) if e.kind() == io::ErrorKind::TimedOut => {
            tracing::debug!(program = %program.display(), "tool timed out");
            Ok(ToolOutcome::TimedOut)
        }
        Err(e) => Err(e),
    }
}

/// Run a setup-phase helper that must succeed; returns captured stdout.
///
/// Timeouts and non-zero exits are promoted to fatal [`Error::Tool`].
pub fn run_checked<I, S>(program: &Path, args: I, timeout: Duration) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let tool = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());

    match run_tool(program, args, timeout) {
        Ok(ToolOutcome::Success(stdout)) => Ok(stdout),
        Ok(ToolOutcome::Failed(status)) => Err(Error::Tool {
            tool,
            message: format!("exited with {}", status),
        }),
        Ok(ToolOutcome::TimedOut) => Err(Error::Tool {
            tool,
            message: format!("timed out after {:?}", timeout),
        }),
        Err(e) => Err(Error::Tool {
            tool,
            message: format!("failed to spawn: {}", e),
        }),
    }
}

/// Wait for a child process, killing it once the timeout expires.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> io::Result<Output> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(|mut s| {
                        let mut buf = Vec::new();
                        s.read_to_end(&mut buf).ok();
                        buf
                    })
                    .unwrap_or_default();
                return Ok(Output {
                    status,
                    stdout,
                    stderr: Vec::new(),
                });
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    child.kill().ok();
                    child.wait().ok();
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("command timed out after {:?}", timeout),
                    ));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
