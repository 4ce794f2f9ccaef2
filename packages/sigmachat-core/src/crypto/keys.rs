//! # Key Management
//!
//! This module handles cryptographic key generation and management.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SigningKeyPair (Ed25519)                long-term              │   │
//! │  │  ─────────────────────────                                       │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Bound to a name by the certificate authority                 │   │
//! │  │  • Signing the handshake transcript g^x ‖ g^y                   │   │
//! │  │  • (Authority only) signing issued certificates                 │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  EphemeralKeyPair (X25519)               one per handshake      │   │
//! │  │  ──────────────────────────                                      │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Commitment g^x (initiator) or challenge g^y (challenger)     │   │
//! │  │  • Shared secret g^xy for MAC and session key derivation        │   │
//! │  │                                                                  │   │
//! │  │  Never reused across handshakes: this is where forward          │   │
//! │  │  secrecy comes from.                                            │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of an X25519 scalar or point in bytes
pub const DH_POINT_SIZE: usize = 32;

/// Ed25519 signing keypair
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    /// Private signing key (secret)
    #[zeroize(skip)] // ed25519_dalek::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Generate a new random signing keypair
    ///
    /// Panics only if the operating system RNG is unavailable.
    pub fn generate() -> Self {
        let secret = SigningKey::generate(&mut OsRng);
        Self { secret }
    }

    /// Create from raw secret bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            secret: SigningKey::from_bytes(bytes),
        }
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    /// Get reference to the signing key
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public", &hex::encode(self.public_bytes()))
            .finish_non_exhaustive()
    }
}

/// X25519 keypair used for exactly one handshake
///
/// The scalar is a `StaticSecret` rather than an `EphemeralSecret` because
/// the initiator has to keep it across two calls (`initiate` then
/// `respond`), and a failed `respond` must leave it usable for a retry.
#[derive(ZeroizeOnDrop)]
pub struct EphemeralKeyPair {
    #[zeroize(skip)] // x25519_dalek handles its own zeroization
    secret: StaticSecret,
    #[zeroize(skip)]
    public: X25519PublicKey,
}

impl EphemeralKeyPair {
    /// Draw a fresh uniformly random scalar and compute its public point
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the public point (g^x or g^y)
    pub fn public_bytes(&self) -> [u8; DH_POINT_SIZE] {
        self.public.to_bytes()
    }

    /// Perform Diffie-Hellman with the peer's public point
    ///
    /// Fails with `KeyExchangeFailed` if the peer sent a low-order point,
    /// which would force the shared secret to all zeroes.
    pub fn diffie_hellman(&self, their_public: &[u8; DH_POINT_SIZE]) -> Result<[u8; 32]> {
        let their_public = X25519PublicKey::from(*their_public);
        let shared = self.secret.diffie_hellman(&their_public);
        if !shared.was_contributory() {
            return Err(Error::KeyExchangeFailed(
                "peer point has low order".into(),
            ));
        }
        Ok(shared.to_bytes())
    }
}

/// Parse a DH point from untrusted bytes
pub fn dh_point_from_slice(bytes: &[u8]) -> Result<[u8; DH_POINT_SIZE]> {
    bytes.try_into().map_err(|_| {
        Error::MalformedMessage(format!(
            "DH point must be {} bytes, got {}",
            DH_POINT_SIZE,
            bytes.len()
        ))
    })
}

// ============================================================================
// TESTS
// ============================================================================
