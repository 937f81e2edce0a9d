//! Custom error types for kubectl-sealer
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::Scope;

/// The main error type for kubectl-sealer operations
#[derive(Error, Debug)]
pub enum SealerError {
    /// Malformed input resource (sealed or plain)
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Failure rendering a resource back to YAML/JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The scope requires an identity field that is empty
    #[error("Identity incomplete: {field} must be given for {scope} scope")]
    IdentityIncomplete { scope: Scope, field: &'static str },

    /// The encryption gateway call failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// The decryption gateway call failed
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Sealing key material could not be fetched
    #[error("Key source error: {0}")]
    KeySource(String),

    /// The editing collaborator failed or the user gave up
    #[error("Edit aborted: {0}")]
    EditAborted(String),

    /// Edited resource failed structural validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Errors writing the output resource
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SealerError {
    /// Check if this error happened before any encryption call was attempted
    pub fn is_identity_incomplete(&self) -> bool {
        matches!(self, Self::IdentityIncomplete { .. })
    }

    /// Check if this is an encryption gateway failure
    pub fn is_encryption(&self) -> bool {
        matches!(self, Self::Encryption(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for SealerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SealerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for SealerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

/// Result type alias for kubectl-sealer operations
pub type SealerResult<T> = Result<T, SealerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SealerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_identity_incomplete_error() {
        let err = SealerError::IdentityIncomplete {
            scope: Scope::Strict,
            field: "namespace",
        };
        assert_eq!(
            err.to_string(),
            "Identity incomplete: namespace must be given for strict scope"
        );
        assert!(err.is_identity_incomplete());
        assert!(!err.is_encryption());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sealer_err: SealerError = io_err.into();
        assert!(matches!(sealer_err, SealerError::Io(_)));
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let sealer_err: SealerError = yaml_err.into();
        assert!(matches!(sealer_err, SealerError::Deserialization(_)));
    }
}
