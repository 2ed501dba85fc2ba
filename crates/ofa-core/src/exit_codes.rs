//! Exit codes for the `ofa` CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing and
//! are stable across releases.

use ofa_common::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed
    Clean = 0,

    /// Configuration error
    ConfigError = 10,

    /// Raw input missing or malformed
    InputError = 11,

    /// Processed table missing or unreadable
    StorageError = 12,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a failed command.
    pub fn from_error(err: &Error) -> Self {
        match err.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::InputError,
            30..=39 => ExitCode::StorageError,
            60..=69 => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}
