//! Error taxonomy shared by the protocol core and both front ends.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DysonError>;

/// The decryption stage at which local-credential recovery failed.
///
/// The stages are strictly ordered; a failure at one stage means the later
/// stages were never attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptStage {
    /// The ciphertext blob was not valid base64.
    Base64,
    /// The raw ciphertext could not be decrypted into UTF-8 plaintext.
    Cipher,
    /// No complete JSON document could be extracted from the plaintext.
    JsonExtract,
    /// The credential document lacks the expected password field.
    FieldMissing,
}

impl fmt::Display for DecryptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Base64 => "base64",
            Self::Cipher => "cipher",
            Self::JsonExtract => "json-extract",
            Self::FieldMissing => "field-missing",
        };
        f.write_str(name)
    }
}

/// Errors produced by the protocol core.
///
/// Callers are expected to branch on the variant: re-prompt for an OTP code
/// on [`DysonError::AuthUnauthorized`] during login completion, re-enter the
/// identifier on [`DysonError::InvalidIdentifier`], and treat
/// [`DysonError::Protocol`] and [`DysonError::Transport`] as fatal. Nothing
/// is retried internally.
#[derive(Debug, Error)]
pub enum DysonError {
    /// The account identifier failed local validation. No request was made.
    #[error("invalid account identifier: {0}")]
    InvalidIdentifier(String),

    /// The backend rejected malformed authentication parameters.
    #[error("authentication request rejected: {0}")]
    AuthRejected(String),

    /// The backend rejected the credentials, token or OTP code.
    #[error("not authorized: {0}")]
    AuthUnauthorized(String),

    /// The transport delivered a well-formed response with an unexpected
    /// payload (missing or mistyped fields, unexpected status).
    #[error("unexpected response payload: {0}")]
    Protocol(String),

    /// A connection-level failure surfaced from the transport layer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Local-credential decryption failed.
    ///
    /// The full decrypted plaintext, when one exists, is emitted at debug
    /// log level only; it is deliberately absent from the error itself.
    #[error("local credential decryption failed at {stage} stage")]
    Decryption {
        /// The stage that failed.
        stage: DecryptStage,
    },
}

impl DysonError {
    /// Shorthand for a [`DysonError::Decryption`] at the given stage.
    pub(crate) fn decryption(stage: DecryptStage) -> Self {
        Self::Decryption { stage }
    }
}
