// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Work-directory lifecycle.
//!
//! One fuzz run owns `./fuzz/` exclusively; it is wiped and recreated
//! at startup so stale scratch files never pollute retention sweeps.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default work directory name, relative to the current directory.
pub const WORK_DIR: &str = "fuzz";

/// Remove any previous work directory and create a fresh one.
pub fn recreate(base: &Path) -> Result<PathBuf> {
    let work_dir = base.join(WORK_DIR);
    if work_dir.exists() {
        std::fs::remove_dir_all(&work_dir).map_err(|e| Error::io(&work_dir, e))?;
    }
    std::fs::create_dir_all(&work_dir).map_err(|e| Error::io(&work_dir, e))?;
    tracing::debug!(path = %work_dir.display(), "created work directory");
    Ok(work_dir)
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
