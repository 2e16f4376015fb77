// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run reporting: preamble, checklist, and the JSON summary.
//!
//! Text output streams line by line as recipes finish, so a long
//! correctness run still shows progress. JSON is buffered and written
//! at the end.

use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::color::scheme;
use crate::recipe::Recipe;
use crate::trial::TrialResult;

/// Display-only context printed before the checklist.
#[derive(Debug, Serialize)]
pub struct Preamble {
    /// Number of harvested seed functions.
    pub seeds: usize,
    /// Normalized optimizer pass-spec.
    pub pass_spec: String,
    /// Baseline LLVM revision (display only).
    pub revision: String,
    /// Patch commit URL (display only).
    pub commit_url: String,
    /// Patch digest (display only).
    pub patch_sha256: String,
}

impl Preamble {
    /// Read the display-only fields from the environment.
    pub fn from_env(seeds: usize, pass_spec: &str) -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_else(|_| "unknown".to_string());
        Self {
            seeds,
            pass_spec: pass_spec.to_string(),
            revision: var("LLVM_REVISION"),
            commit_url: var("COMMIT_URL"),
            patch_sha256: var("PATCH_SHA256"),
        }
    }
}

/// One finished recipe for the summary.
#[derive(Debug, Serialize)]
pub struct CheckLine {
    /// Recipe name (e.g. "multi-use").
    pub name: String,
    /// Checklist label (e.g. "Multi-use handling").
    pub label: String,
    /// Whether the recipe passed.
    pub passed: bool,
    /// Retained reproducer stem, for failed recipes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reproducer: Option<String>,
    /// Diagnostic reason, when the reproducer carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CheckLine {
    pub fn new(recipe: Recipe, passed: bool, kept: Option<&TrialResult>) -> Self {
        Self {
            name: recipe.name().to_string(),
            label: recipe.label().to_string(),
            passed,
            reproducer: kept.map(|k| k.stem.clone()),
            reason: kept.and_then(|k| {
                if k.reason.is_empty() {
                    None
                } else {
                    Some(k.reason.clone())
                }
            }),
        }
    }
}

/// Streaming text formatter for the checklist.
pub struct TextReporter {
    stdout: StandardStream,
}

impl TextReporter {
    pub fn new(color_choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(color_choice),
        }
    }

    /// Print the preamble block.
    pub fn write_preamble(&mut self, preamble: &Preamble) -> std::io::Result<()> {
        writeln!(self.stdout, "Seeds: {}", preamble.seeds)?;
        writeln!(self.stdout, "Pass: `opt -passes={}`", preamble.pass_spec)?;
        writeln!(
            self.stdout,
            "Baseline: https://github.com/llvm/llvm-project/commit/{}",
            preamble.revision
        )?;
        writeln!(self.stdout, "Patch URL: {}", preamble.commit_url)?;
        writeln!(self.stdout, "Patch SHA256: {}", preamble.patch_sha256)?;
        writeln!(self.stdout, "Checklist:")?;
        Ok(())
    }

    /// Print the reproducer line for a finding with a diagnostic.
    pub fn write_finding(&mut self, kept: &TrialResult) -> std::io::Result<()> {
        if kept.reason.is_empty() {
            return Ok(());
        }
        self.stdout.set_color(&scheme::stem())?;
        write!(self.stdout, "{}", kept.stem)?;
        self.stdout.reset()?;
        writeln!(self.stdout, " {}", kept.reason)?;
        Ok(())
    }

    /// Print one checklist line: `  ✅ <label>` or `  ❌ <label>`.
    pub fn write_check(&mut self, recipe: Recipe, passed: bool) -> std::io::Result<()> {
        write!(self.stdout, "  ")?;
        if passed {
            self.stdout.set_color(&scheme::pass())?;
            write!(self.stdout, "\u{2705}")?;
        } else {
            self.stdout.set_color(&scheme::fail())?;
            write!(self.stdout, "\u{274c}")?;
        }
        self.stdout.reset()?;
        writeln!(self.stdout, " {}", recipe.label())?;
        Ok(())
    }

    /// Print the elapsed-time footer.
    pub fn write_footer(&mut self, elapsed: Duration) -> std::io::Result<()> {
        writeln!(self.stdout, "Time: {}", format_elapsed(elapsed))
    }
}

/// Complete JSON summary document.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// ISO 8601 timestamp.
    pub timestamp: String,
    /// Whether every recipe passed.
    pub passed: bool,
    #[serde(flatten)]
    pub preamble: Preamble,
    pub checks: Vec<CheckLine>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn new(preamble: Preamble, checks: Vec<CheckLine>, elapsed: Duration) -> Self {
        let passed = checks.iter().all(|c| c.passed);
        Self {
            timestamp: Utc::now().to_rfc3339(),
            passed,
            preamble,
            checks,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Write the summary as pretty JSON.
    pub fn write_to(&self, writer: &mut impl Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)
    }
}

/// Format a duration as `HH:MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
