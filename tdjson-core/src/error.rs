//! Error types for the tdjson binding.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Exit status for a failure to find, load or bind the native library.
pub const EXIT_LIBRARY_UNAVAILABLE: u8 = 2;

/// Exit status for any failure after the library was bound.
pub const EXIT_RUNTIME_FAILURE: u8 = 1;

/// Error object returned by the native library (`{"@type": "error", ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NativeError {
    pub code: i32,
    pub message: String,
}

/// Binding errors.
#[derive(Debug, Error)]
pub enum TdError {
    /// None of the candidate paths exist.
    #[error("library not found (tried: {})", display_paths(.candidates))]
    LibraryNotFound { candidates: Vec<PathBuf> },

    /// A candidate exists but the OS loader rejected it.
    #[error("failed to load {}: {reason}", .path.display())]
    LibraryLoad { path: PathBuf, reason: String },

    /// An expected entry point is missing from the loaded library.
    #[error("symbol `{symbol}` not found in library: {reason}")]
    SignatureBinding { symbol: String, reason: String },

    /// The create entry point returned a null handle.
    #[error("native client creation returned a null handle")]
    ClientCreation,

    /// The native call produced something unusable.
    #[error("request execution failed: {0}")]
    RequestExecution(String),

    /// The client handle was already destroyed.
    #[error("client handle has already been destroyed")]
    ClientDestroyed,

    /// A lifecycle event arrived in a state that does not accept it.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// The request cannot be passed across the native boundary.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The native library answered with an error object.
    #[error("native error {code}: {message}")]
    Native { code: i32, message: String },

    /// The native call returned nothing where a response was required.
    #[error("no response to `{request}`")]
    MissingResponse { request: String },

    /// No matching response arrived before the deadline.
    #[error("timed out waiting for a response")]
    Timeout,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TdError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::LibraryNotFound { .. }
            | Self::LibraryLoad { .. }
            | Self::SignatureBinding { .. } => EXIT_LIBRARY_UNAVAILABLE,
            _ => EXIT_RUNTIME_FAILURE,
        }
    }

    /// Build a load error for `path`.
    pub fn load(path: &Path, reason: impl ToString) -> Self {
        Self::LibraryLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl From<NativeError> for TdError {
    fn from(err: NativeError) -> Self {
        Self::Native {
            code: err.code,
            message: err.message,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no candidates".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for binding operations.
pub type TdResult<T> = Result<T, TdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_candidates() {
        let err = TdError::LibraryNotFound {
            candidates: vec![PathBuf::from("/a/libtdjson.so"), PathBuf::from("/b/libtdjson.so")],
        };
        assert_eq!(
            err.to_string(),
            "library not found (tried: /a/libtdjson.so, /b/libtdjson.so)"
        );

        let empty = TdError::LibraryNotFound { candidates: vec![] };
        assert_eq!(empty.to_string(), "library not found (tried: no candidates)");
    }

    #[test]
    fn exit_codes_separate_discovery_from_runtime() {
        assert_eq!(TdError::LibraryNotFound { candidates: vec![] }.exit_code(), 2);
        assert_eq!(TdError::load(Path::new("/x"), "bad ELF").exit_code(), 2);
        assert_eq!(
            TdError::SignatureBinding {
                symbol: "td_json_client_create".to_string(),
                reason: "undefined".to_string(),
            }
            .exit_code(),
            2
        );
        assert_eq!(TdError::ClientCreation.exit_code(), 1);
        assert_eq!(TdError::Timeout.exit_code(), 1);
    }

    #[test]
    fn native_error_conversion() {
        let native: NativeError =
            serde_json::from_str(r#"{"code": 400, "message": "Option not found"}"#).unwrap();
        let err = TdError::from(native);
        assert_eq!(err.to_string(), "native error 400: Option not found");
    }
}
