//! Certificate value types.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CERTIFICATE FORMAT                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Certificate (canonical JSON, these exact bytes are signed & MAC'd)    │
//! │  {                                                                      │
//! │    "name":       "alice",                                              │
//! │    "start":      "2025-01-01T09:30:00.123456789Z",                     │
//! │    "end":        "2025-07-01T09:30:00.123456789Z",                     │
//! │    "public_key": "<base64, 32 bytes>"                                  │
//! │  }                                                                      │
//! │                                                                         │
//! │  ValidatedCertificate                                                  │
//! │  { "cert": <Certificate>, "sig": "<base64, 64 bytes>" }                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field order is fixed by the struct definition and timestamps render at
//! full precision, so the same logical certificate always produces the
//! same bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{fingerprint, Signature, PUBLIC_KEY_SIZE};
use crate::error::{Error, Result};

/// A name bound to an Ed25519 public key for a validity window
///
/// Immutable once issued: there are no setters, and every accessor
/// returns either a shared reference or an owned copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    name: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(with = "crate::encoding::base64_array")]
    public_key: [u8; PUBLIC_KEY_SIZE],
}

impl Certificate {
    pub(crate) fn issue(
        name: &str,
        public_key: &[u8; PUBLIC_KEY_SIZE],
        start: DateTime<Utc>,
        validity_months: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            start,
            end: crate::time::add_months(start, validity_months),
            public_key: *public_key,
        }
    }

    /// Registered name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start of the validity window (time of registration)
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the validity window (exclusive)
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Copy of the certified Ed25519 public key
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public_key
    }

    /// True iff `at` falls strictly before `end`
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at < self.end
    }

    /// Canonical byte encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a certificate from its canonical bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| Error::MalformedMessage(format!("could not decode certificate: {}", e)))
    }

    /// Short fingerprint of the canonical bytes, for logs
    pub fn fingerprint(&self) -> String {
        match self.to_bytes() {
            Ok(bytes) => fingerprint(&bytes),
            Err(_) => String::from("unencodable"),
        }
    }

    #[cfg(test)]
    pub(crate) fn shifted(&self, by: chrono::Duration) -> Self {
        Self {
            name: self.name.clone(),
            start: self.start + by,
            end: self.end + by,
            public_key: self.public_key,
        }
    }

    #[cfg(test)]
    pub(crate) fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{} .. {}] {}",
            self.name,
            self.start.to_rfc3339(),
            self.end.to_rfc3339(),
            self.fingerprint()
        )
    }
}

/// A certificate together with the authority's signature over its
/// canonical bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedCertificate {
    #[serde(rename = "cert")]
    certificate: Certificate,
    #[serde(rename = "sig")]
    signature: Signature,
}

impl ValidatedCertificate {
    pub(crate) fn new(certificate: Certificate, signature: Signature) -> Self {
        Self {
            certificate,
            signature,
        }
    }

    /// The certified data
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// The authority's signature over `certificate().to_bytes()`
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[cfg(test)]
    pub(crate) fn with_certificate(&self, certificate: Certificate) -> Self {
        Self {
            certificate,
            signature: self.signature,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
