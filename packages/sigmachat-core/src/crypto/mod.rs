//! # Cryptography Module
//!
//! This module provides the cryptographic primitives the SIGMA handshake
//! and the chat layer compose.
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Used by |
//! |-----------|---------|---------|
//! | Ed25519 | Signing | Certificate issuance, transcript signatures |
//! | X25519 | Ephemeral key exchange | Initiator/challenger DH |
//! | SHA-256 | Key derivation | `k_M`, `k_S` from `g^xy` |
//! | HMAC-SHA-256 | Key confirmation | MAC over each party's certificate |
//! | AES-256-GCM | Encryption | Chat messages |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: Secret keys are zeroized when dropped
//! 2. **Constant-Time Operations**: dalek for curve arithmetic, `subtle`
//!    and `hmac` for comparisons
//! 3. **Secure Random**: `rand::rngs::OsRng` for scalars, nonces and keys
//! 4. **No Key Reuse**: Fresh ephemeral scalar per handshake, fresh nonce
//!    per message

mod encryption;
mod kdf;
mod keys;
mod signing;

pub use encryption::{decrypt, encrypt, EncryptionKey, Nonce, KEY_SIZE, NONCE_SIZE};
pub use kdf::{
    compute_mac, derive_handshake_keys, fingerprint, verify_mac, HandshakeKeys, MacKey,
    MAC_KEY_LABEL, MAC_SIZE, SESSION_KEY_LABEL,
};
pub use keys::{dh_point_from_slice, EphemeralKeyPair, SigningKeyPair, DH_POINT_SIZE};
pub use signing::{sign, verify, verify_with_key, Signature, SIGNATURE_SIZE};

/// Size of Ed25519 public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;
