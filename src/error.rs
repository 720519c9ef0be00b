//! Error types for mcp-beproduct.
//!
//! Two families live here:
//!
//! - [`ConfigError`]: startup failures (config file, catalog data file).
//!   These abort server initialisation.
//! - [`CapabilityError`]: the request-time taxonomy produced while routing a
//!   resource read, tool call or prompt request. The router converts these into
//!   structured error responses; none of them end the session.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::DataError;
use crate::mcp::registry::CapabilityKind;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Result type for capability dispatch.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Request-time and registration-time failures of the capability layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// No capability is registered under the requested key.
    #[error("Unknown {kind}: {key}")]
    CapabilityNotFound {
        /// Kind that was searched.
        kind: CapabilityKind,
        /// Key that was not found.
        key: String,
    },

    /// An argument was missing, ill-typed, out of range or unexpected.
    #[error("Invalid parameter '{parameter}': {reason}")]
    ValidationError {
        /// Name of the offending parameter (dotted for nested fields).
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A referenced product or inventory record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("product", "inventory").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The data-access layer failed.
    #[error("Data unavailable: {message}")]
    DataUnavailable {
        /// Description of the failure.
        message: String,
    },

    /// A capability with the same key was registered twice.
    #[error("Duplicate {kind} registration: {key}")]
    DuplicateCapability {
        /// Kind of the conflicting capability.
        kind: CapabilityKind,
        /// The conflicting key.
        key: String,
    },
}

impl CapabilityError {
    /// Builds a validation error for `parameter`.
    #[must_use]
    pub fn validation(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error kind carried in responses.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CapabilityNotFound { .. } => ErrorKind::CapabilityNotFound,
            Self::ValidationError { .. } => ErrorKind::ValidationError,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            Self::DuplicateCapability { .. } => ErrorKind::DuplicateCapability,
        }
    }
}

impl From<DataError> for CapabilityError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound { entity, id } => Self::NotFound { entity, id },
            DataError::Unavailable { message } => Self::DataUnavailable { message },
        }
    }
}

/// Wire-level error kind, serialised verbatim into error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// See [`CapabilityError::CapabilityNotFound`].
    CapabilityNotFound,
    /// See [`CapabilityError::ValidationError`].
    ValidationError,
    /// See [`CapabilityError::NotFound`].
    NotFound,
    /// See [`CapabilityError::DataUnavailable`].
    DataUnavailable,
    /// See [`CapabilityError::DuplicateCapability`].
    DuplicateCapability,
}

impl ErrorKind {
    /// Returns the kind name as sent to clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CapabilityNotFound => "CapabilityNotFound",
            Self::ValidationError => "ValidationError",
            Self::NotFound => "NotFound",
            Self::DataUnavailable => "DataUnavailable",
            Self::DuplicateCapability => "DuplicateCapability",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
