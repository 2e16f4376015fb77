// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

/// Optfuzz error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found or invalid
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// A required external tool binary is missing
    #[error("missing tool: {name} (expected at {})", .path.display())]
    MissingTool { name: &'static str, path: PathBuf },

    /// A setup-phase tool invocation failed
    #[error("tool failed: {tool}: {message}")]
    Tool { tool: String, message: String },

    /// The patch file could not be read or enumerated
    #[error("patch error: {message}")]
    Patch { message: String },

    /// File I/O error
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type using optfuzz Error
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes per CLI spec.
///
/// Completed fuzz runs always exit 0; failing checks are reported on
/// stdout only. Non-zero codes are reserved for setup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Run completed (including "Not interesting" and failing checks)
    Success = 0,
    /// Configuration or argument error
    ConfigError = 2,
    /// Setup failed: missing tool, unreadable patch, work dir
    SetupError = 3,
    /// Internal error
    InternalError = 4,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. } | Error::Argument(_) => ExitCode::ConfigError,
            Error::MissingTool { .. } | Error::Tool { .. } | Error::Patch { .. } => {
                ExitCode::SetupError
            }
            Error::Io { .. } => ExitCode::SetupError,
            Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
