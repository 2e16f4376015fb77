// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cost vectors and the "got worse" predicate.
//!
//! The cost analyzer summarizes a module as `<key> <count>` lines, one
//! per instruction kind. A recipe regresses when some key counts
//! strictly more instructions after optimization than in the baseline
//! it is compared against.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::tools::{self, ToolSuite, TOOL_TIMEOUT};

/// Instruction-kind name → count. BTreeMap keeps the reported
/// regressing key deterministic.
pub type CostVector = BTreeMap<String, u64>;

/// Parse cost-analyzer output. Keys may carry a trailing colon.
pub fn parse_cost(output: &str) -> Result<CostVector> {
    let mut res = CostVector::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once(' ').ok_or_else(|| Error::Tool {
            tool: "cost".into(),
            message: format!("malformed cost line: {:?}", line),
        })?;
        let key = key.strip_suffix(':').unwrap_or(key);
        let count: u64 = value.trim().parse().map_err(|_| Error::Tool {
            tool: "cost".into(),
            message: format!("malformed cost count: {:?}", line),
        })?;
        res.insert(key.to_string(), count);
    }
    Ok(res)
}

/// Find a key that got strictly worse between `before` and `after`.
///
/// Only keys present in both vectors are considered; instruction kinds
/// that first appear in `after` do not count. With a `precond` vector,
/// a regression is discarded when `before[key] < precond[key]` — the
/// input was already worse than the precondition baseline there, so the
/// optimizer is not to blame.
pub fn compare_costs(
    before: &CostVector,
    after: &CostVector,
    precond: Option<&CostVector>,
) -> Option<String> {
    for (key, after_count) in after {
        let Some(before_count) = before.get(key) else {
            continue;
        };
        if before_count < after_count {
            if let Some(precond) = precond
                && let Some(precond_count) = precond.get(key)
                && before_count < precond_count
            {
                continue;
            }
            return Some(key.clone());
        }
    }
    None
}

/// Runs the cost analyzer, caching the reference module's vector.
///
/// The reference is costed once at construction; any later comparison
/// naming the reference path reuses the cached vector.
pub struct CostOracle {
    cost_bin: PathBuf,
    reference: PathBuf,
    ref_cost: CostVector,
}

impl CostOracle {
    /// Cost the reference module and cache the result.
    pub fn new(tools: &ToolSuite, reference: &Path) -> Result<Self> {
        let cost_bin = tools.cost.clone();
        let stdout = tools::run_checked(&cost_bin, [reference], TOOL_TIMEOUT)?;
        let ref_cost = parse_cost(&String::from_utf8_lossy(&stdout))?;
        tracing::debug!(keys = ref_cost.len(), "cached reference cost");
        Ok(Self {
            cost_bin,
            reference: reference.to_path_buf(),
            ref_cost,
        })
    }

    /// The reference module this oracle was built against.
    pub fn reference(&self) -> &Path {
        &self.reference
    }

    /// Cost vector for a module, served from cache for the reference.
    pub fn cost_of(&self, path: &Path) -> Result<CostVector> {
        if path == self.reference {
            return Ok(self.ref_cost.clone());
        }
        let stdout = tools::run_checked(&self.cost_bin, [path], TOOL_TIMEOUT)?;
        parse_cost(&String::from_utf8_lossy(&stdout))
    }

    /// Compare two modules by path, optionally guarded by a
    /// precondition module. Returns the regressing key, if any.
    pub fn compare(
        &self,
        before: &Path,
        after: &Path,
        precond: Option<&Path>,
    ) -> Result<Option<String>> {
        let before_cost = self.cost_of(before)?;
        let after_cost = self.cost_of(after)?;
        let precond_cost = match precond {
            Some(path) => Some(self.cost_of(path)?),
            None => None,
        };
        Ok(compare_costs(
            &before_cost,
            &after_cost,
            precond_cost.as_ref(),
        ))
    }
}

#[cfg(test)]
#[path = "cost_tests.rs"]
mod tests;
