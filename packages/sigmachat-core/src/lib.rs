//! # SigmaChat Core
//!
//! Certificate-backed SIGMA key exchange between two named parties,
//! followed by AES-256-GCM encrypted chat under the derived session key.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SIGMACHAT CORE MODULES                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   ┌────────────┐  │
//! │  │  Authority  │◄──│  Identity   │──►│    Sigma    │──►│    Chat    │  │
//! │  │             │   │             │   │             │   │            │  │
//! │  │ - Register  │   │ - Client    │   │ - Initiator │   │ - Session  │  │
//! │  │ - Certify   │   │ - Register  │   │ - Challenger│   │ - Send     │  │
//! │  │ - Verify    │   │ - Promote   │   │ - Messages  │   │ - Receive  │  │
//! │  └──────┬──────┘   └─────────────┘   └──────┬──────┘   └─────┬──────┘  │
//! │         │                                   │                │         │
//! │         └───────────────────┬───────────────┴────────────────┘         │
//! │                             ▼                                           │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │                            Crypto                                 │ │
//! │  │  Ed25519 · X25519 · SHA-256 · HMAC-SHA-256 · AES-256-GCM          │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Cryptographic primitives (keys, signing, derivation, encryption)
//! - [`authority`] - Certificate authority and certificate types
//! - [`identity`] - Clients and their registration
//! - [`sigma`] - The handshake state machines and wire messages
//! - [`chat`] - Encrypted messaging over an established session
//!
//! ## Quick Start
//!
//! ```rust
//! use sigmachat_core::{establish_secure_chat, CertificateAuthority, Client};
//!
//! let ca = CertificateAuthority::new();
//! let alice = Client::new("alice").register(Some(&ca))?;
//! let bob = Client::new("bob").register(Some(&ca))?;
//!
//! let (alice_chat, bob_chat) =
//!     establish_secure_chat(&mut alice.as_initiator(), &mut bob.as_challenger())?;
//!
//! let wire = alice_chat.send_message("Hey Bob!")?;
//! let message = bob_chat.receive_message(&wire)?;
//! assert_eq!(message.content, "Hey Bob!");
//! # Ok::<(), sigmachat_core::Error>(())
//! ```
//!
//! No transport is included: every protocol step consumes and returns
//! plain byte buffers, and moving them between parties is up to the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod authority;
pub mod chat;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod sigma;
pub mod time;

pub(crate) mod encoding;

pub use authority::{
    Authority, AuthorityConfig, Certificate, CertificateAuthority, ValidatedCertificate,
};
pub use chat::{establish_secure_chat, ChatMessage, ChatSession, EncryptedMessage};
pub use error::{Error, Result};
pub use identity::{Client, RegisteredClient};
pub use sigma::{check_authority_match, Challenger, Initiator, RoleState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
