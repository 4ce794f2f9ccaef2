//! # Key Derivation
//!
//! Derives the two symmetric handshake keys from the X25519 shared secret,
//! and computes the certificate MACs that bind each party's identity into
//! the transcript.
//!
//! ## Derivation
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SIGMA KEY DERIVATION                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  g^xy (32 bytes, X25519 output)                                        │
//! │        │                                                                │
//! │        ├──► SHA-256(g^xy ‖ "MAC")      → k_M  (MAC key)                │
//! │        │                                                                │
//! │        └──► SHA-256(g^xy ‖ "session")  → k_S  (session key)            │
//! │                                                                         │
//! │  k_M is only ever used as an HMAC-SHA-256 key over a party's own       │
//! │  certificate bytes. k_S is only handed out once the handshake          │
//! │  has completed.                                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::EncryptionKey;
use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Label appended to the shared secret to derive the MAC key
pub const MAC_KEY_LABEL: &[u8] = b"MAC";

/// Label appended to the shared secret to derive the session key
pub const SESSION_KEY_LABEL: &[u8] = b"session";

/// Size of an HMAC-SHA-256 tag in bytes
pub const MAC_SIZE: usize = 32;

/// Key used to MAC certificates during the handshake
///
/// Zeroized when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct MacKey([u8; 32]);

impl std::fmt::Debug for MacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MacKey(..)")
    }
}

/// Both keys derived from one shared secret
pub struct HandshakeKeys {
    /// k_M
    pub mac_key: MacKey,
    /// k_S
    pub session_key: EncryptionKey,
}

fn labelled_hash(shared_secret: &[u8; 32], label: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(shared_secret);
    hasher.update(label);
    hasher.finalize().into()
}

/// Derive `(k_M, k_S)` from the raw X25519 output
pub fn derive_handshake_keys(shared_secret: &[u8; 32]) -> HandshakeKeys {
    let mut mac = labelled_hash(shared_secret, MAC_KEY_LABEL);
    let mut session = labelled_hash(shared_secret, SESSION_KEY_LABEL);

    let keys = HandshakeKeys {
        mac_key: MacKey(mac),
        session_key: EncryptionKey::from_bytes(session),
    };

    mac.zeroize();
    session.zeroize();
    keys
}

/// Compute HMAC-SHA-256 over `data` under the handshake MAC key
pub fn compute_mac(key: &MacKey, data: &[u8]) -> Result<[u8; MAC_SIZE]> {
    let mut mac = HmacSha256::new_from_slice(&key.0)
        .map_err(|e| Error::InvalidKey(format!("Invalid MAC key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Recompute the MAC over `data` and compare against `expected`
///
/// The comparison is constant-time. Fails with `MacMismatch`.
pub fn verify_mac(key: &MacKey, data: &[u8], expected: &[u8]) -> Result<()> {
    let mut mac = HmacSha256::new_from_slice(&key.0)
        .map_err(|e| Error::InvalidKey(format!("Invalid MAC key: {}", e)))?;
    mac.update(data);
    mac.verify_slice(expected).map_err(|_| Error::MacMismatch)
}

/// Short hex fingerprint of arbitrary bytes, for logs
///
/// First 8 bytes of SHA-256, so never enough to reconstruct anything.
pub fn fingerprint(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(&digest[..8])
}

// ============================================================================
// TESTS
// ============================================================================
