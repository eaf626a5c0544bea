//! Error types for vaultcollect.
//!
//! All errors are strongly typed using thiserror. Every failure in the
//! pipeline is terminal for its invocation: nothing here is retried
//! internally, and no stage returns a partial result.

use thiserror::Error;

/// Validation errors raised before any network activity.
///
/// These are caller errors: the inputs themselves are wrong, and
/// resubmitting the same inputs will fail the same way.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more source elements were marked invalid.
    ///
    /// The details string aggregates `column: reason` for every invalid
    /// element, so a single failure reports everything the caller must fix.
    #[error("Provide complete and valid inputs: {details}")]
    InvalidElements {
        /// Combined `column: reason` text for all invalid elements.
        details: String,
    },

    /// An additional record supplied a field path already collected for
    /// the same table.
    #[error("Duplicate field '{path}' found in additional fields for table '{table}'")]
    DuplicateField {
        /// The colliding dotted field path.
        path: String,
        /// The table both sides target.
        table: String,
    },

    /// A read operation references a response position that is not an
    /// earlier insert in the same batch.
    #[error(
        "Operation at position {position} references response index {target}, which is not a prior insert"
    )]
    InvalidReference {
        /// Position of the offending operation within the batch.
        position: usize,
        /// The response index the reference points at.
        target: usize,
    },
}

/// Errors from the auth collaborator.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The auth collaborator could not produce an access token.
    #[error("Failed to acquire access token: {message}")]
    TokenAcquisition {
        /// Reason reported by the auth collaborator.
        message: String,
    },
}

impl AuthError {
    /// Creates a token acquisition failure.
    #[must_use]
    pub fn token_acquisition(message: impl Into<String>) -> Self {
        Self::TokenAcquisition {
            message: message.into(),
        }
    }
}

/// Transport errors for the vault round trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not reach the vault.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Underlying transport failure description.
        message: String,
    },

    /// The request body could not be serialized.
    #[error("Failed to serialize request: {message}")]
    SerializationFailed {
        /// Serializer failure description.
        message: String,
    },

    /// The response body could not be deserialized.
    #[error("Failed to deserialize response: {message}")]
    DeserializationFailed {
        /// Deserializer failure description.
        message: String,
    },

    /// The vault answered with a non-success status.
    #[error("Server error (code {code}): {message}")]
    ServerError {
        /// HTTP status code reported by the vault.
        code: u32,
        /// Server-provided error message.
        message: String,
    },
}

/// Errors raised while reconstructing the vault response.
///
/// A well-formed vault response is positionally aligned with the batch
/// that produced it; any of these means the response does not match the
/// shape the batch implies.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The response carried a different number of results than the batch.
    #[error("Vault response contained {actual} results but the batch expects {expected}")]
    LengthMismatch {
        /// Result count the batch implies.
        expected: usize,
        /// Result count actually received.
        actual: usize,
    },

    /// An insert result is missing its generated identifier.
    #[error("Vault response at position {position} is missing the generated identifier")]
    MissingIdentifier {
        /// Position of the malformed result.
        position: usize,
    },

    /// A tokenization result is missing its field values.
    #[error("Vault response at position {position} is missing tokenized fields")]
    MissingFields {
        /// Position of the malformed result.
        position: usize,
    },
}

/// Top-level error type for vaultcollect.
///
/// This enum encompasses every way a single submission can fail.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Input validation failed before any network call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The auth collaborator failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// The transport collaborator failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The vault response did not match the submitted batch.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// An internal invariant was violated.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

impl VaultError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an auth error.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns true if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if this is a response error.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }

    /// Returns true if resubmitting the same inputs could succeed.
    ///
    /// The pipeline never retries on its own; the classification exists
    /// so callers can decide whether a resubmission is worth attempting.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Response(_) | Self::Internal { .. } => false,
            Self::Auth(_) => true,
            Self::Transport(e) => match e {
                TransportError::ConnectionFailed { .. } => true,
                TransportError::ServerError { code, .. } => *code >= 500,
                _ => false,
            },
        }
    }
}

/// Result type alias for vaultcollect operations.
pub type VaultResult<T> = Result<T, VaultError>;
