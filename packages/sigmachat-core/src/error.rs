//! # Error Handling
//!
//! This module provides the error types for the SIGMA chat core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Authority Errors                                                  │
//! │  │   ├── UnregisteredIdentity  - No certificate under that name        │
//! │  │   └── CertificateExpired    - Certificate validity window ended     │
//! │  │                                                                      │
//! │  ├── Identity Errors                                                   │
//! │  │   ├── NilAuthority          - Registration without an authority     │
//! │  │   ├── AuthorityMismatch     - Parties trust different authorities   │
//! │  │   ├── CertificationFailed   - Authority refused to certify us       │
//! │  │   └── InvalidKey            - Malformed key material                │
//! │  │                                                                      │
//! │  ├── Handshake Errors                                                  │
//! │  │   ├── WrongState            - Method called out of sequence         │
//! │  │   ├── MalformedMessage      - Peer bytes failed to deserialize      │
//! │  │   ├── UntrustedCertificate  - Authority rejected peer certificate   │
//! │  │   ├── MacMismatch           - Certificate MAC did not verify        │
//! │  │   ├── SignatureInvalid      - Transcript signature did not verify   │
//! │  │   ├── KeyExchangeFailed     - Non-contributory DH output            │
//! │  │   └── NotCompleted          - Session key requested too early       │
//! │  │                                                                      │
//! │  ├── Chat Errors                                                       │
//! │  │   ├── EncryptionFailed      - AEAD seal failed                      │
//! │  │   └── DecryptionFailed      - AEAD open failed (tag mismatch)       │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      └── SerializationError    - In-memory value failed to encode      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Error messages may name which check failed, but never carry raw key,
//! MAC, nonce or signature bytes.

use thiserror::Error;

/// Result type alias for SIGMA chat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SIGMA chat core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Authority Errors (100-199)
    // ========================================================================

    /// No certificate is registered under the requested name
    #[error("Name '{0}' does not have a registered certificate")]
    UnregisteredIdentity(String),

    /// The registered certificate is past its validity window
    #[error("Certificate for '{0}' has expired")]
    CertificateExpired(String),

    // ========================================================================
    // Identity Errors (200-299)
    // ========================================================================

    /// Registration was attempted without a certificate authority
    #[error("Cannot register a client without a certificate authority")]
    NilAuthority,

    /// Initiator and challenger are registered with different authorities
    #[error("Both parties must be registered with the same certificate authority")]
    AuthorityMismatch,

    /// Our own authority refused to certify us
    #[error("Could not certify client with authority: {0}")]
    CertificationFailed(String),

    /// Invalid key format or length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // ========================================================================
    // Handshake Errors (300-399)
    // ========================================================================

    /// A handshake method was invoked out of sequence
    #[error("{role} must be in {expected} state, was in {actual} state")]
    WrongState {
        /// Protocol role ("initiator" or "challenger")
        role: &'static str,
        /// State the method requires
        expected: &'static str,
        /// State the role machine was actually in
        actual: &'static str,
    },

    /// Peer bytes could not be deserialized
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The authority did not vouch for the peer's certificate
    #[error("Could not verify certificate with the certificate authority")]
    UntrustedCertificate,

    /// The certificate MAC did not match the derived MAC key
    #[error("Certificate MAC did not verify")]
    MacMismatch,

    /// The transcript signature did not verify under the certified key
    #[error("Signature invalid")]
    SignatureInvalid,

    /// Diffie-Hellman produced a non-contributory shared secret
    #[error("Key exchange failed: {0}")]
    KeyExchangeFailed(String),

    /// Session key requested before the handshake completed
    #[error("Client is not in completed state")]
    NotCompleted,

    // ========================================================================
    // Chat Errors (400-499)
    // ========================================================================

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization of a well-formed in-memory value failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get a stable numeric code for this error
    ///
    /// Error codes are organized by category:
    /// - 100-199: Authority
    /// - 200-299: Identity
    /// - 300-399: Handshake
    /// - 400-499: Chat
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Authority (100-199)
            Error::UnregisteredIdentity(_) => 100,
            Error::CertificateExpired(_) => 101,

            // Identity (200-299)
            Error::NilAuthority => 200,
            Error::AuthorityMismatch => 201,
            Error::CertificationFailed(_) => 202,
            Error::InvalidKey(_) => 203,

            // Handshake (300-399)
            Error::WrongState { .. } => 300,
            Error::MalformedMessage(_) => 301,
            Error::UntrustedCertificate => 302,
            Error::MacMismatch => 303,
            Error::SignatureInvalid => 304,
            Error::KeyExchangeFailed(_) => 305,
            Error::NotCompleted => 306,

            // Chat (400-499)
            Error::EncryptionFailed(_) => 400,
            Error::DecryptionFailed(_) => 401,

            // Internal (900-999)
            Error::SerializationError(_) => 900,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Verification and sequencing failures leave the protocol state
    /// untouched, so the caller may retry with corrected input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::WrongState { .. }
                | Error::MalformedMessage(_)
                | Error::UntrustedCertificate
                | Error::MacMismatch
                | Error::SignatureInvalid
                | Error::KeyExchangeFailed(_)
                | Error::NotCompleted
                | Error::DecryptionFailed(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
