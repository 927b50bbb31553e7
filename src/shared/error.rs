use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between a clean audit,
/// an audit that found issues above the configured severity, and a run
/// that could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - audit completed, no findings at or above the fail-on severity
    Success = 0,
    /// Findings at or above the `--fail-on` severity were reported
    FindingsAboveThreshold = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (inventory collection, config, file I/O, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::FindingsAboveThreshold => write!(f, "Findings Above Threshold (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for an audit run.
///
/// Uses thiserror to derive Display and Error traits automatically.
/// Every variant carries a hint so the terminal message is actionable.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Snapshot file not found: {path}\n\n💡 Hint: {suggestion}")]
    SnapshotNotFound { path: PathBuf, suggestion: String },

    #[error("Failed to parse snapshot file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the snapshot is a valid cloud-audit JSON document")]
    SnapshotParseError { path: PathBuf, details: String },

    #[error("Inventory collection failed for scope '{scope}'\nDetails: {details}")]
    InventoryCollection { scope: String, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Invalid output directory: {path}\nReason: {reason}\n\n💡 Hint: Please specify an existing directory with --output-dir")]
    InvalidOutputDirectory { path: PathBuf, reason: String },

    /// Validation error for configuration and builder input
    #[error("Validation error: {message}")]
    Validation { message: String },
}
