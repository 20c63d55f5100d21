//! Error types.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Copy, Clone, Deserialize, PartialEq, Eq)]
/// The class of a [JoseError]
pub enum JoseErrorKind {
    /// Malformed JSON, PEM or compact-serialization input
    Parse,
    /// Key material could not be converted in to a usable key
    Import,
    /// Key material could not be serialized back out
    Export,
    /// A kid was specified but is absent from the key set, or the key set is empty
    KeyNotFound,
    /// No usable key was able to decrypt the input
    Decryption,
    /// No usable key was able to verify the signature
    Verification,
    /// Signing failed
    Signing,
    /// Encryption failed
    Encryption,
    /// A digest operation failed
    Digest,
    /// Algorithm name not recognised
    UnsupportedAlgorithm,
    /// Operation attempted on a token in the wrong state
    InvalidState,
}

/// An error raised by this library.
///
/// This is a flat report, not an exception hierarchy: every failure carries
/// its class, the operation that raised it and a human readable message.
#[derive(Debug, Serialize, Clone, Deserialize, PartialEq, Eq)]
pub struct JoseError {
    kind: JoseErrorKind,
    location: &'static str,
    message: String,
}

impl JoseError {
    pub(crate) fn new(kind: JoseErrorKind, location: &'static str, message: String) -> Self {
        JoseError {
            kind,
            location,
            message,
        }
    }

    pub(crate) fn parse(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Parse, location, message)
    }

    pub(crate) fn import(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Import, location, message)
    }

    pub(crate) fn export(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Export, location, message)
    }

    pub(crate) fn key_not_found(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::KeyNotFound, location, message)
    }

    pub(crate) fn decryption(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Decryption, location, message)
    }

    pub(crate) fn verification(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Verification, location, message)
    }

    pub(crate) fn signing(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Signing, location, message)
    }

    pub(crate) fn encryption(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Encryption, location, message)
    }

    pub(crate) fn digest(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::Digest, location, message)
    }

    pub(crate) fn unsupported_algorithm(location: &'static str, alg: &str) -> Self {
        Self::new(
            JoseErrorKind::UnsupportedAlgorithm,
            location,
            format!("unsupported algorithm \"{}\"", alg),
        )
    }

    pub(crate) fn invalid_state(location: &'static str, message: String) -> Self {
        Self::new(JoseErrorKind::InvalidState, location, message)
    }

    /// The class of this error
    pub fn kind(&self) -> JoseErrorKind {
        self.kind
    }

    /// The operation that raised this error
    pub fn location(&self) -> &'static str {
        self.location
    }

    /// The human readable error text
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

impl std::error::Error for JoseError {}
