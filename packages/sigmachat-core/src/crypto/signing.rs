//! # Digital Signatures
//!
//! Ed25519 signatures for two purposes:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SIGNATURE USES                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. Certificate issuance                                               │
//! │     Authority private key  ──sign──►  canonical_bytes(certificate)     │
//! │                                                                         │
//! │  2. Handshake transcript                                               │
//! │     Party private key      ──sign──►  g^x ‖ g^y                        │
//! │                                                                         │
//! │  Verification never panics: a bad key or a bad signature both         │
//! │  surface as typed errors for the caller to map.                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ed25519_dalek::{Signature as Ed25519Signature, Signer, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::crypto::SigningKeyPair;
use crate::error::{Error, Result};

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// An Ed25519 digital signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "crate::encoding::base64_array")] pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Sign a message using Ed25519
///
/// Ed25519 signatures are deterministic: signing the same message
/// with the same key always produces the same signature.
pub fn sign(keypair: &SigningKeyPair, message: &[u8]) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature(sig.to_bytes())
}

/// Verify an Ed25519 signature
///
/// Returns `Err(InvalidKey)` if the public key does not decode to a curve
/// point, `Err(SignatureInvalid)` if the signature does not verify.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &Signature) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| Error::InvalidKey(format!("Invalid public key: {}", e)))?;

    verify_with_key(&verifying_key, message, signature)
}

/// Verify a signature using a VerifyingKey directly
pub fn verify_with_key(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature: &Signature,
) -> Result<()> {
    let sig = Ed25519Signature::from_bytes(&signature.0);
    verifying_key
        .verify(message, &sig)
        .map_err(|_| Error::SignatureInvalid)
}

// ============================================================================
// TESTS
// ============================================================================
