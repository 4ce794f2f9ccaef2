//! # Certificate Authority
//!
//! A single flat trust domain: the authority binds names to Ed25519 public
//! keys, signs certificates on request, and answers "is this certificate
//! one of mine and still good?" for peers mid-handshake.
//!
//! ## Operations
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       AUTHORITY OPERATIONS                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  register(name, pk)      write lock                                    │
//! │    ├── same name, same key, unexpired  → existing certificate          │
//! │    └── otherwise                       → fresh [now, now + 6 months)   │
//! │                                          (replaces any prior entry)    │
//! │                                                                         │
//! │  certify(name)           read lock                                     │
//! │    ├── not registered    → UnregisteredIdentity                        │
//! │    ├── now >= end        → CertificateExpired                          │
//! │    └── otherwise         → { cert, Sign(ca_sk, bytes(cert)) }          │
//! │                                                                         │
//! │  verify_certificate(vc)  read lock, never errors                       │
//! │    registered ∧ equal to stored ∧ now < end ∧ signature verifies       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Instance Identity
//!
//! `CertificateAuthority` is a cheap cloneable handle. Two handles are the
//! same authority only if they point at the same instance; two separately
//! created authorities never vouch for each other's certificates.

mod certificate;

pub use certificate::{Certificate, ValidatedCertificate};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::crypto::{sign, verify_with_key, SigningKeyPair, PUBLIC_KEY_SIZE};
use crate::error::{Error, Result};

/// Default certificate lifetime
pub const DEFAULT_VALIDITY_MONTHS: u32 = 6;

/// Configuration for a certificate authority
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// How long an issued certificate stays valid, in calendar months
    pub validity_months: u32,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            validity_months: DEFAULT_VALIDITY_MONTHS,
        }
    }
}

/// The three operations a trust domain exposes
///
/// The authority's private key never leaves the implementation.
pub trait Authority {
    /// Bind `name` to `public_key` and return the certificate
    fn register(&self, name: &str, public_key: &[u8; PUBLIC_KEY_SIZE]) -> Certificate;

    /// Sign the certificate registered under `name`
    fn certify(&self, name: &str) -> Result<ValidatedCertificate>;

    /// Total, side-effect-free validity check
    fn verify_certificate(&self, certificate: &ValidatedCertificate) -> bool;
}

struct AuthorityInner {
    registry: RwLock<HashMap<String, Certificate>>,
    keypair: SigningKeyPair,
    config: AuthorityConfig,
}

/// Shared handle to a certificate authority
#[derive(Clone)]
pub struct CertificateAuthority {
    inner: Arc<AuthorityInner>,
}

impl CertificateAuthority {
    /// Create an authority with a fresh keypair and default configuration
    pub fn new() -> Self {
        Self::with_config(AuthorityConfig::default())
    }

    /// Create an authority with a fresh keypair
    pub fn with_config(mut config: AuthorityConfig) -> Self {
        if config.validity_months == 0 {
            tracing::warn!("Certificate validity of 0 months requested, using 1 month");
            config.validity_months = 1;
        }

        let keypair = SigningKeyPair::generate();
        tracing::info!(
            "Certificate authority created (key {})",
            &hex::encode(keypair.public_bytes())[..16]
        );

        Self {
            inner: Arc::new(AuthorityInner {
                registry: RwLock::new(HashMap::new()),
                keypair,
                config,
            }),
        }
    }

    /// The authority's Ed25519 verifying key
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.inner.keypair.public_bytes()
    }

    /// Configuration this authority was created with
    pub fn config(&self) -> &AuthorityConfig {
        &self.inner.config
    }

    /// Number of names currently registered
    pub fn registered_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// True iff both handles refer to the same authority instance
    pub fn same_authority(&self, other: &CertificateAuthority) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[cfg(test)]
    pub(crate) fn replace_stored(&self, certificate: Certificate) {
        self.inner
            .registry
            .write()
            .insert(certificate.name().to_string(), certificate);
    }
}

impl Default for CertificateAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CertificateAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateAuthority")
            .field("public_key", &hex::encode(self.public_key()))
            .field("registered", &self.registered_count())
            .finish()
    }
}

impl Authority for CertificateAuthority {
    fn register(&self, name: &str, public_key: &[u8; PUBLIC_KEY_SIZE]) -> Certificate {
        let now = crate::time::now();
        let mut registry = self.inner.registry.write();

        if let Some(existing) = registry.get(name) {
            if existing.public_key() == *public_key && existing.is_valid_at(now) {
                tracing::debug!("Re-registration of {} is idempotent", name);
                return existing.clone();
            }
            if existing.public_key() != *public_key {
                tracing::warn!(
                    "Replacing certificate {} for {} with a different public key",
                    existing.fingerprint(),
                    name
                );
            }
        }

        let certificate =
            Certificate::issue(name, public_key, now, self.inner.config.validity_months);
        registry.insert(name.to_string(), certificate.clone());

        tracing::info!(
            "Registered {} until {} ({})",
            name,
            certificate.end().to_rfc3339(),
            certificate.fingerprint()
        );
        certificate
    }

    fn certify(&self, name: &str) -> Result<ValidatedCertificate> {
        let certificate = self
            .inner
            .registry
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnregisteredIdentity(name.to_string()))?;

        if !certificate.is_valid_at(crate::time::now()) {
            tracing::warn!("Refusing to certify {}: certificate expired", name);
            return Err(Error::CertificateExpired(name.to_string()));
        }

        let signature = sign(&self.inner.keypair, &certificate.to_bytes()?);
        tracing::debug!("Certified {} ({})", name, certificate.fingerprint());

        Ok(ValidatedCertificate::new(certificate, signature))
    }

    fn verify_certificate(&self, validated: &ValidatedCertificate) -> bool {
        let presented = validated.certificate();

        let matches_registry = self
            .inner
            .registry
            .read()
            .get(presented.name())
            .map_or(false, |stored| stored == presented);
        if !matches_registry {
            tracing::debug!("Certificate for {} does not match the registry", presented.name());
            return false;
        }

        if !presented.is_valid_at(crate::time::now()) {
            tracing::debug!("Certificate for {} has expired", presented.name());
            return false;
        }

        let Ok(bytes) = presented.to_bytes() else {
            return false;
        };

        verify_with_key(
            &self.inner.keypair.verifying_key(),
            &bytes,
            validated.signature(),
        )
        .is_ok()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Signature;
    use std::thread;

    fn months(n: i64) -> chrono::Duration {
        chrono::Duration::days(31 * n)
    }

    #[test]
    fn test_new_authority_is_empty() {
        let ca = CertificateAuthority::new();
        assert_eq!(ca.registered_count(), 0);
    }

    #[test]
    fn test_register_certificates() {
        let ca = CertificateAuthority::new();
        ca.register("alice", &[0u8; 32]);
        ca.register("bob", &[0u8; 32]);

        assert_eq!(ca.registered_count(), 2);
    }

    #[test]
    fn test_register_sets_six_month_window() {
        let ca = CertificateAuthority::new();
        let cert = ca.register("alice", &[1u8; 32]);

        assert_eq!(cert.end(), crate::time::add_months(cert.start(), 6));
    }

    #[test]
    fn test_reregister_same_key_is_idempotent() {
        let ca = CertificateAuthority::new();
        let c1 = ca.register("alice", &[1u8; 32]);
        let c2 = ca.register("alice", &[1u8; 32]);

        assert_eq!(ca.registered_count(), 1);
        assert_eq!(c1.start(), c2.start());
        assert_eq!(c1.end(), c2.end());
    }

    #[test]
    fn test_reregister_different_key_replaces() {
        let ca = CertificateAuthority::new();
        let c1 = ca.register("alice", &[1u8; 32]);
        let c2 = ca.register("alice", &[2u8; 32]);

        assert_eq!(ca.registered_count(), 1);
        assert_eq!(c2.public_key(), [2u8; 32]);
        assert!(c2.start() >= c1.start());
        assert_ne!(c1, c2);

        // The registry now holds the new window, and the old certificate is dead
        let vc = ca.certify("alice").unwrap();
        assert_eq!(vc.certificate(), &c2);
        assert_eq!(vc.certificate().end(), c2.end());

        let old = ValidatedCertificate::new(c1.clone(), *vc.signature());
        assert!(!ca.verify_certificate(&old));
    }

    #[test]
    fn test_reregister_after_expiry_issues_fresh() {
        let ca = CertificateAuthority::new();
        let c1 = ca.register("alice", &[1u8; 32]);
        ca.replace_stored(c1.shifted(-months(12)));

        let c2 = ca.register("alice", &[1u8; 32]);
        assert!(c2.is_valid_at(crate::time::now()));
        assert!(c2.start() >= c1.start());
    }

    #[test]
    fn test_returned_certificate_is_a_copy() {
        let ca = CertificateAuthority::new();
        let mut key = [0u8; 32];
        ca.register("alice", &key);
        key[0] = 255;

        let stored = ca.certify("alice").unwrap();
        assert_eq!(stored.certificate().public_key(), [0u8; 32]);
    }

    #[test]
    fn test_certify_verify_works() {
        let ca = CertificateAuthority::new();
        let pk = SigningKeyPair::generate().public_bytes();
        ca.register("alice", &pk);

        let vc = ca.certify("alice").unwrap();
        assert!(ca.verify_certificate(&vc));
    }

    #[test]
    fn test_certify_without_registering() {
        let ca = CertificateAuthority::new();
        let result = ca.certify("alice");

        assert!(matches!(result, Err(Error::UnregisteredIdentity(name)) if name == "alice"));
    }

    #[test]
    fn test_expired_certificate() {
        let ca = CertificateAuthority::new();
        let cert = ca.register("alice", &[0u8; 32]);
        ca.replace_stored(cert.shifted(-months(12)));

        let result = ca.certify("alice");
        assert!(matches!(result, Err(Error::CertificateExpired(_))));
    }

    #[test]
    fn test_verify_rejects_renamed_certificate() {
        let ca = CertificateAuthority::new();
        ca.register("alice", &[0u8; 32]);
        ca.register("alicia", &[0u8; 32]);

        let vc = ca.certify("alice").unwrap();
        let renamed = vc.with_certificate(vc.certificate().renamed("alicia"));

        assert!(!ca.verify_certificate(&renamed));
    }

    #[test]
    fn test_verify_rejects_shifted_window() {
        let ca = CertificateAuthority::new();
        ca.register("alice", &[0u8; 32]);
        let vc = ca.certify("alice").unwrap();

        let shifted = vc.with_certificate(vc.certificate().shifted(-months(5)));
        assert!(!ca.verify_certificate(&shifted));
    }

    #[test]
    fn test_verify_rejects_bad_signature() {
        let ca = CertificateAuthority::new();
        ca.register("alice", &[0u8; 32]);
        let vc = ca.certify("alice").unwrap();

        let mut sig = *vc.signature().as_bytes();
        sig[10] ^= 0x01;
        let forged = ValidatedCertificate::new(vc.certificate().clone(), Signature::from_bytes(sig));

        assert!(!ca.verify_certificate(&forged));
    }

    #[test]
    fn test_verify_rejects_after_stored_expiry() {
        let ca = CertificateAuthority::new();
        ca.register("alice", &[0u8; 32]);
        let vc = ca.certify("alice").unwrap();

        // Registry now holds a back-dated copy, so the presented one no longer matches
        ca.replace_stored(vc.certificate().shifted(-months(12)));
        assert!(!ca.verify_certificate(&vc));
    }

    #[test]
    fn test_verify_rejects_unregistered_name() {
        let ca = CertificateAuthority::new();
        ca.register("alice", &[0u8; 32]);
        let vc = ca.certify("alice").unwrap();

        let other = CertificateAuthority::new();
        assert!(!other.verify_certificate(&vc));
    }

    #[test]
    fn test_authorities_are_not_interchangeable() {
        let ca1 = CertificateAuthority::new();
        let ca2 = CertificateAuthority::new();

        // Same name and key in both registries
        ca1.register("alice", &[5u8; 32]);
        ca2.replace_stored(ca1.certify("alice").unwrap().certificate().clone());

        let vc = ca1.certify("alice").unwrap();
        assert!(ca1.verify_certificate(&vc));
        assert!(!ca2.verify_certificate(&vc));
        assert!(!ca1.same_authority(&ca2));
        assert!(ca1.same_authority(&ca1.clone()));
    }

    #[test]
    fn test_zero_validity_is_clamped() {
        let ca = CertificateAuthority::with_config(AuthorityConfig { validity_months: 0 });
        assert_eq!(ca.config().validity_months, 1);

        ca.register("alice", &[0u8; 32]);
        assert!(ca.certify("alice").is_ok());
    }

    #[test]
    fn test_concurrent_registration() {
        let ca = CertificateAuthority::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ca = ca.clone();
                thread::spawn(move || {
                    let name = format!("client-{}", i);
                    ca.register(&name, &[i as u8; 32]);
                    let vc = ca.certify(&name).unwrap();
                    assert!(ca.verify_certificate(&vc));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ca.registered_count(), 8);
    }
}
