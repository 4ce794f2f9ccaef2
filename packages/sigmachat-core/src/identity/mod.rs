//! # Identity Module
//!
//! A client is a name plus a long-term Ed25519 keypair. Registering it with
//! a certificate authority binds the two, after which the client can be
//! promoted into either handshake role.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CLIENT LIFECYCLE                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Client::new("alice")                                                  │
//! │        │  fresh Ed25519 keypair                                        │
//! │        ▼                                                                │
//! │  client.register(Some(&ca))  ──► ca.register("alice", pk)              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  RegisteredClient { client, authority, certificate }                   │
//! │        │                                                                │
//! │        ├──► as_initiator()   → Initiator  (Base)                       │
//! │        └──► as_challenger()  → Challenger (Base)                       │
//! │                                                                         │
//! │  Each promotion is an independent state machine; the same registered   │
//! │  client may be promoted any number of times.                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The private key is shared between promotions through an `Arc` and is
//! never serialized or exposed outside the crate.

use std::sync::Arc;

use crate::authority::{Authority, Certificate, CertificateAuthority, ValidatedCertificate};
use crate::crypto::{sign, Signature, SigningKeyPair, PUBLIC_KEY_SIZE};
use crate::error::{Error, Result};
use crate::sigma::{Challenger, Initiator};

/// A named holder of a long-term signing keypair
#[derive(Clone)]
pub struct Client {
    name: String,
    keypair: Arc<SigningKeyPair>,
}

impl Client {
    /// Create a client with a freshly generated keypair
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let keypair = SigningKeyPair::generate();
        tracing::debug!("Created client {}", name);

        Self {
            name,
            keypair: Arc::new(keypair),
        }
    }

    /// The client's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ed25519 public key bytes
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.keypair.public_bytes()
    }

    /// Register with a certificate authority
    ///
    /// ## Errors
    ///
    /// - `NilAuthority` if no authority is given
    pub fn register(&self, authority: Option<&CertificateAuthority>) -> Result<RegisteredClient> {
        let authority = authority.ok_or(Error::NilAuthority)?;
        let certificate = authority.register(&self.name, &self.public_key());

        tracing::info!("Client {} registered ({})", self.name, certificate.fingerprint());

        Ok(RegisteredClient {
            client: self.clone(),
            authority: authority.clone(),
            certificate,
        })
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name)
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

/// A client bound to exactly one certificate authority
#[derive(Clone, Debug)]
pub struct RegisteredClient {
    pub(crate) client: Client,
    pub(crate) authority: CertificateAuthority,
    certificate: Certificate,
}

impl RegisteredClient {
    /// The client's name
    pub fn name(&self) -> &str {
        self.client.name()
    }

    /// The underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The authority this client is registered with
    pub fn authority(&self) -> &CertificateAuthority {
        &self.authority
    }

    /// Certificate issued at registration time
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Ask the bound authority to sign our current certificate
    pub fn certify(&self) -> Result<ValidatedCertificate> {
        self.authority
            .certify(self.name())
            .map_err(|e| Error::CertificationFailed(e.to_string()))
    }

    /// Sign `message` with the long-term key
    pub(crate) fn sign(&self, message: &[u8]) -> Signature {
        sign(&self.client.keypair, message)
    }

    /// Promote into a fresh initiator
    pub fn as_initiator(&self) -> Initiator {
        Initiator::new(self.clone())
    }

    /// Promote into a fresh challenger
    pub fn as_challenger(&self) -> Challenger {
        Challenger::new(self.clone())
    }
}
