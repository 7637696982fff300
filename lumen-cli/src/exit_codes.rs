//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use lumen_core::{ErrorKind, LumenError};
use thiserror::Error;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Data format error (undecodable image, incomparable fingerprints).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot read input or write output).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Raised when two fingerprints cannot be compared.
#[derive(Error, Debug)]
#[error("fingerprints are incomparable ({a_len} vs {b_len} characters)")]
pub struct IncomparableFingerprints {
    pub a_len: usize,
    pub b_len: usize,
}

/// Raised after a batch when some inputs failed.
#[derive(Error, Debug)]
#[error("{failed} of {total} file(s) could not be fingerprinted")]
pub struct PartialFailure {
    pub failed: usize,
    pub total: usize,
    pub kind: ErrorKind,
}

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify by the first typed error in the chain
        let code = err
            .chain()
            .find_map(|cause| {
                if let Some(e) = cause.downcast_ref::<LumenError>() {
                    Some(code_for_kind(e.kind()))
                } else if let Some(e) = cause.downcast_ref::<PartialFailure>() {
                    Some(code_for_kind(e.kind))
                } else if cause.is::<IncomparableFingerprints>() {
                    Some(DATA_ERROR)
                } else if cause.is::<std::io::Error>() {
                    Some(IO_ERROR)
                } else {
                    None
                }
            })
            .unwrap_or(GENERAL_ERROR);

        Self {
            code,
            message: Some(message),
        }
    }
}

fn code_for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound => INPUT_ERROR,
        ErrorKind::Decode | ErrorKind::UnsupportedInput => DATA_ERROR,
        ErrorKind::Io | ErrorKind::Encode => IO_ERROR,
    }
}
