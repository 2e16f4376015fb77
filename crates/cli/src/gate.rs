// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The gatekeeper decides whether a patch is worth fuzzing.
//!
//! A patch is interesting when one of its touched paths mentions a
//! supported mid-end pass's test directory. The table is ordered and the
//! first match wins, so overlapping substrings resolve deterministically.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Ordered (path substring, optimizer pass-spec) table.
///
/// `PhaseOrdering` maps to the whole O3 pipeline for phase-ordering
/// tests; the ValueTracking analysis directory folds into instcombine
/// because its tests exercise that pass.
pub const PASS_TABLE: &[(&str, &str)] = &[
    ("test/Transforms/InstCombine", "instcombine<no-verify-fixpoint>"),
    ("test/Transforms/InstSimplify", "instcombine<no-verify-fixpoint>"),
    ("test/Analysis/ValueTracking", "instcombine<no-verify-fixpoint>"),
    ("test/Transforms/ConstraintElimination", "constraint-elimination"),
    ("test/Transforms/EarlyCSE", "early-cse"),
    ("test/Transforms/GVN", "gvn"),
    ("test/Transforms/NewGVN", "newgvn"),
    ("test/Transforms/Reassociate", "reassociate"),
    ("test/Transforms/SCCP", "sccp"),
    ("test/Transforms/CorrelatedValuePropagation", "correlated-propagation"),
    ("test/Transforms/SimplifyCFG", "simplifycfg"),
    ("test/Transforms/VectorCombine", "vector-combine"),
    ("PhaseOrdering", "default<O3>"),
];

/// Enumerate the files touched by a unified diff via `lsdiff`.
pub fn touched_files(patch: &Path) -> Result<String> {
    let output = Command::new("lsdiff")
        .arg(patch)
        .output()
        .map_err(|e| Error::Patch {
            message: format!("failed to run lsdiff: {}", e),
        })?;

    if !output.status.success() {
        return Err(Error::Patch {
            message: format!("lsdiff exited with {}", output.status),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Select the pass-spec for a set of touched paths. First match wins.
pub fn select_pass(diff_files: &str) -> Option<&'static str> {
    PASS_TABLE
        .iter()
        .find(|(keyword, _)| diff_files.contains(keyword))
        .map(|(_, pass)| *pass)
}

/// Normalize a selected pass-spec: fold the historical bare-keyword
/// alias, then lowercase.
pub fn normalize_pass(spec: &str) -> String {
    let spec = if spec == "ValueTracking" {
        "instcombine"
    } else {
        spec
    };
    spec.to_lowercase()
}

/// Full gatekeeper: None means the patch is not interesting.
pub fn pass_for_patch(patch: &Path) -> Result<Option<String>> {
    let files = touched_files(patch)?;
    let selected = select_pass(&files);
    tracing::debug!(?selected, "gatekeeper decision");
    Ok(selected.map(normalize_pass))
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
