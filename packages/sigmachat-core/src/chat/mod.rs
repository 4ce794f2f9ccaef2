//! # Secure Chat
//!
//! A thin AEAD layer over the session key a completed handshake produces.
//!
//! ## Envelope
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CHAT ENVELOPE                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ChatMessage (plaintext JSON)                                          │
//! │  { "sender": "alice", "recipient": "bob",                              │
//! │    "content": "Hey Bob!", "ts": "2025-01-01T09:30:00Z" }               │
//! │        │                                                                │
//! │        │  AES-256-GCM(k_S, fresh 12-byte nonce)                        │
//! │        ▼                                                                │
//! │  EncryptedMessage (wire JSON)                                          │
//! │  { "nonce": "<base64, 12 bytes>", "ciphertext": "<base64>" }           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{decrypt, encrypt, EncryptionKey, Nonce, NONCE_SIZE};
use crate::error::{Error, Result};
use crate::sigma::{check_authority_match, Challenger, Initiator};

/// A decrypted chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the sending party
    pub sender: String,
    /// Name of the receiving party
    pub recipient: String,
    /// Message text
    pub content: String,
    /// When the sender built the message
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} -> {}: {}",
            self.timestamp.format("%a %b %d %H:%M:%S"),
            self.sender,
            self.recipient,
            self.content
        )
    }
}

/// Nonce and ciphertext as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    /// AES-GCM nonce, fresh per message
    #[serde(with = "crate::encoding::base64_array")]
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the authentication tag appended
    #[serde(with = "crate::encoding::base64_vec")]
    pub ciphertext: Vec<u8>,
}

/// One party's end of an established chat
#[derive(Debug, Clone)]
pub struct ChatSession {
    local: String,
    remote: String,
    session_key: EncryptionKey,
}

impl ChatSession {
    pub(crate) fn new(local: &str, remote: &str, session_key: EncryptionKey) -> Self {
        Self {
            local: local.to_string(),
            remote: remote.to_string(),
            session_key,
        }
    }

    /// Our name
    pub fn local(&self) -> &str {
        &self.local
    }

    /// The peer's name
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// The shared AES-256-GCM key
    pub fn session_key(&self) -> &EncryptionKey {
        &self.session_key
    }

    /// Encrypt `content` for the remote party
    pub fn send_message(&self, content: &str) -> Result<Vec<u8>> {
        let message = ChatMessage {
            sender: self.local.clone(),
            recipient: self.remote.clone(),
            content: content.to_string(),
            timestamp: crate::time::now(),
        };
        let plaintext = serde_json::to_vec(&message)?;
        let (nonce, ciphertext) = encrypt(&self.session_key, &plaintext, b"")?;

        let envelope = EncryptedMessage {
            nonce: *nonce.as_bytes(),
            ciphertext,
        };
        let bytes = serde_json::to_vec(&envelope)?;

        tracing::debug!("{} sent {} byte message to {}", self.local, bytes.len(), self.remote);
        Ok(bytes)
    }

    /// Decrypt a message produced by the peer's `send_message`
    pub fn receive_message(&self, data: &[u8]) -> Result<ChatMessage> {
        let envelope: EncryptedMessage = serde_json::from_slice(data)
            .map_err(|e| Error::MalformedMessage(format!("could not decode envelope: {}", e)))?;

        let plaintext = decrypt(
            &self.session_key,
            &Nonce::from_bytes(envelope.nonce),
            &envelope.ciphertext,
            b"",
        )
        .map_err(|e| {
            tracing::warn!("{} could not decrypt message from {}", self.local, self.remote);
            e
        })?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| Error::MalformedMessage(format!("could not decode chat message: {}", e)))
    }
}

/// Run a full handshake and return `(initiator_session, challenger_session)`
///
/// Both roles must be registered with the same authority; that is checked
/// before any message is produced.
pub fn establish_secure_chat(
    initiator: &mut Initiator,
    challenger: &mut Challenger,
) -> Result<(ChatSession, ChatSession)> {
    if !check_authority_match(initiator, challenger) {
        return Err(Error::AuthorityMismatch);
    }

    let commitment = initiator.initiate()?;
    let challenge = challenger.challenge(&commitment)?;
    let response = initiator.respond(&challenge)?;
    challenger.finalise(&response)?;

    let local = initiator.client().name();
    let remote = challenger.client().name();
    tracing::info!("Secure chat established between {} and {}", local, remote);

    Ok((
        ChatSession::new(local, remote, initiator.session_key()?),
        ChatSession::new(remote, local, challenger.session_key()?),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
