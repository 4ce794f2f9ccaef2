//! # SIGMA Handshake
//!
//! Mutually authenticated Diffie-Hellman between two registered clients.
//! Each side proves possession of its certified key by signing the DH
//! transcript, and binds its identity to the exchange by MACing its own
//! certificate under a key only the two parties can derive.
//!
//! ## Message Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SIGMA MESSAGE FLOW                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   Initiator (A)                                    Challenger (B)      │
//! │   ─────────────                                    ──────────────      │
//! │                                                                         │
//! │   initiate()                                                           │
//! │     x ← random, g^x                                                    │
//! │                  ────────────── g^x ──────────────►                    │
//! │                                                    challenge(g^x)      │
//! │                                                      y ← random        │
//! │                                                      k_M, k_S ← g^xy   │
//! │                  ◄── { g^y, cert_B, sig_B, mac_B } ─                    │
//! │   respond(..)                                                          │
//! │     CA vouches for cert_B                                              │
//! │     k_M, k_S ← g^xy                                                    │
//! │     mac_B  = HMAC(k_M, cert_B)                                         │
//! │     sig_B  over g^x ‖ g^y                                              │
//! │                  ──── { cert_A, sig_A, mac_A } ────►                    │
//! │                                                    finalise(..)        │
//! │                                                      CA vouches cert_A │
//! │                                                      mac_A, sig_A      │
//! │                                                                         │
//! │   Completed (k_S)                                  Completed (k_S)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machines
//!
//! Both roles move `Base → Begun → Completed` and never back. A method
//! called from the wrong state fails with `WrongState`; a verification
//! failure leaves the state untouched so the caller can retry with a
//! corrected message.

mod challenger;
mod initiator;
mod messages;

pub use challenger::Challenger;
pub use initiator::Initiator;
pub use messages::{ChallengeMessage, ResponseMessage};

use crate::crypto::DH_POINT_SIZE;

/// Externally visible state of either role machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleState {
    /// Freshly promoted, nothing sent yet
    Base,
    /// First message handled, waiting for the peer
    Begun,
    /// Session key available
    Completed,
}

impl RoleState {
    /// Lowercase name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleState::Base => "base",
            RoleState::Begun => "begun",
            RoleState::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RoleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff both roles were registered against the same authority instance
pub fn check_authority_match(initiator: &Initiator, challenger: &Challenger) -> bool {
    initiator
        .client()
        .authority()
        .same_authority(challenger.client().authority())
}

/// The bytes both parties sign: `g^x ‖ g^y`
pub(crate) fn transcript(
    g_x: &[u8; DH_POINT_SIZE],
    g_y: &[u8; DH_POINT_SIZE],
) -> [u8; 2 * DH_POINT_SIZE] {
    let mut out = [0u8; 2 * DH_POINT_SIZE];
    out[..DH_POINT_SIZE].copy_from_slice(g_x);
    out[DH_POINT_SIZE..].copy_from_slice(g_y);
    out
}
