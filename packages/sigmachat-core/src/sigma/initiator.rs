//! Initiator role: sends the commitment, verifies the challenge, responds.

use crate::authority::Authority;
use crate::crypto::{
    compute_mac, derive_handshake_keys, verify, verify_mac, EncryptionKey, EphemeralKeyPair,
};
use crate::error::{Error, Result};
use crate::identity::RegisteredClient;

use super::messages::{ChallengeMessage, ResponseMessage};
use super::{transcript, RoleState};

enum InitiatorState {
    Base,
    Begun { ephemeral: EphemeralKeyPair },
    Completed { session_key: EncryptionKey },
}

/// The party that opens a handshake
pub struct Initiator {
    client: RegisteredClient,
    state: InitiatorState,
}

impl Initiator {
    pub(crate) fn new(client: RegisteredClient) -> Self {
        Self {
            client,
            state: InitiatorState::Base,
        }
    }

    /// The registered client this role acts for
    pub fn client(&self) -> &RegisteredClient {
        &self.client
    }

    /// Current state
    pub fn state(&self) -> RoleState {
        match self.state {
            InitiatorState::Base => RoleState::Base,
            InitiatorState::Begun { .. } => RoleState::Begun,
            InitiatorState::Completed { .. } => RoleState::Completed,
        }
    }

    fn wrong_state(&self, expected: RoleState) -> Error {
        Error::WrongState {
            role: "initiator",
            expected: expected.as_str(),
            actual: self.state().as_str(),
        }
    }

    /// Draw a fresh ephemeral scalar and return the commitment `g^x`
    pub fn initiate(&mut self) -> Result<Vec<u8>> {
        if !matches!(self.state, InitiatorState::Base) {
            return Err(self.wrong_state(RoleState::Base));
        }

        let ephemeral = EphemeralKeyPair::generate();
        let g_x = ephemeral.public_bytes();
        self.state = InitiatorState::Begun { ephemeral };

        tracing::debug!("Initiator {} moved to begun", self.client.name());
        Ok(g_x.to_vec())
    }

    /// Verify the challenger's message and produce our response
    ///
    /// Checks run in order: certificate, key exchange, MAC, signature.
    /// Any failure leaves the initiator in `Begun`.
    pub fn respond(&mut self, challenge: &[u8]) -> Result<Vec<u8>> {
        let InitiatorState::Begun { ephemeral } = &self.state else {
            return Err(self.wrong_state(RoleState::Begun));
        };

        let message = ChallengeMessage::from_bytes(challenge)?;
        let peer = message.certificate.certificate();

        if !self.client.authority().verify_certificate(&message.certificate) {
            tracing::warn!("Initiator rejected challenge: untrusted certificate for {}", peer.name());
            return Err(Error::UntrustedCertificate);
        }

        let shared = ephemeral.diffie_hellman(&message.challenge)?;
        let keys = derive_handshake_keys(&shared);

        if let Err(e) = verify_mac(&keys.mac_key, &peer.to_bytes()?, &message.mac) {
            tracing::warn!("Initiator rejected challenge: MAC mismatch for {}", peer.name());
            return Err(e);
        }

        let g_x = ephemeral.public_bytes();
        let transcript = transcript(&g_x, &message.challenge);
        if verify(&peer.public_key(), &transcript, &message.signature).is_err() {
            tracing::warn!("Initiator rejected challenge: bad signature from {}", peer.name());
            return Err(Error::SignatureInvalid);
        }

        let signature = self.client.sign(&transcript);
        let certificate = self.client.certify()?;
        let mac = compute_mac(&keys.mac_key, &certificate.certificate().to_bytes()?)?;
        let response = ResponseMessage {
            certificate,
            signature,
            mac,
        }
        .to_bytes()?;

        tracing::info!(
            "Initiator {} completed handshake with {}",
            self.client.name(),
            peer.name()
        );
        self.state = InitiatorState::Completed {
            session_key: keys.session_key,
        };

        Ok(response)
    }

    /// The shared session key, once completed
    pub fn session_key(&self) -> Result<EncryptionKey> {
        match &self.state {
            InitiatorState::Completed { session_key } => Ok(session_key.clone()),
            _ => Err(Error::NotCompleted),
        }
    }
}

impl std::fmt::Debug for Initiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Initiator")
            .field("name", &self.client.name())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::CertificateAuthority;
    use crate::identity::Client;
    use crate::sigma::Challenger;

    fn setup() -> (CertificateAuthority, Initiator, Challenger) {
        let ca = CertificateAuthority::new();
        let alice = Client::new("alice").register(Some(&ca)).unwrap();
        let bob = Client::new("bob").register(Some(&ca)).unwrap();
        (ca, alice.as_initiator(), bob.as_challenger())
    }

    fn reencode(bytes: &[u8], edit: impl FnOnce(&mut ChallengeMessage)) -> Vec<u8> {
        let mut msg = ChallengeMessage::from_bytes(bytes).unwrap();
        edit(&mut msg);
        msg.to_bytes().unwrap()
    }

    #[test]
    fn test_initiate_returns_point() {
        let (_ca, mut initiator, _) = setup();
        let g_x = initiator.initiate().unwrap();

        assert_eq!(g_x.len(), 32);
        assert_eq!(initiator.state(), RoleState::Begun);
    }

    #[test]
    fn test_initiate_twice() {
        let (_ca, mut initiator, _) = setup();
        initiator.initiate().unwrap();

        let err = initiator.initiate().unwrap_err();
        assert_eq!(err.to_string(), "initiator must be in base state, was in begun state");
    }

    #[test]
    fn test_respond_before_initiate() {
        let (_ca, mut initiator, _) = setup();
        let result = initiator.respond(b"{}");

        assert!(matches!(
            result,
            Err(Error::WrongState { expected: "begun", actual: "base", .. })
        ));
    }

    #[test]
    fn test_session_key_before_completion() {
        let (_ca, mut initiator, _) = setup();
        assert!(matches!(initiator.session_key(), Err(Error::NotCompleted)));

        initiator.initiate().unwrap();
        assert!(matches!(initiator.session_key(), Err(Error::NotCompleted)));
    }

    #[test]
    fn test_respond_malformed() {
        let (_ca, mut initiator, _) = setup();
        initiator.initiate().unwrap();

        let result = initiator.respond(b"not a challenge");
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
        assert_eq!(initiator.state(), RoleState::Begun);
    }

    #[test]
    fn test_respond_untrusted_certificate() {
        let (ca, mut initiator, mut challenger) = setup();
        let challenge = challenger.challenge(&initiator.initiate().unwrap()).unwrap();

        // Bob's registry entry changes after he certified
        ca.register("bob", &[9u8; 32]);

        let result = initiator.respond(&challenge);
        assert!(matches!(result, Err(Error::UntrustedCertificate)));
        assert_eq!(initiator.state(), RoleState::Begun);
    }

    #[test]
    fn test_respond_rejects_tampered_mac_then_retries() {
        let (_ca, mut initiator, mut challenger) = setup();
        let challenge = challenger.challenge(&initiator.initiate().unwrap()).unwrap();

        let tampered = reencode(&challenge, |m| m.mac[0] ^= 0x01);
        assert!(matches!(initiator.respond(&tampered), Err(Error::MacMismatch)));
        assert_eq!(initiator.state(), RoleState::Begun);

        let response = initiator.respond(&challenge).unwrap();
        challenger.finalise(&response).unwrap();
        assert_eq!(initiator.session_key().unwrap(), challenger.session_key().unwrap());
    }

    #[test]
    fn test_respond_rejects_tampered_signature() {
        let (_ca, mut initiator, mut challenger) = setup();
        let challenge = challenger.challenge(&initiator.initiate().unwrap()).unwrap();

        let tampered = reencode(&challenge, |m| m.signature.0[63] ^= 0x40);
        assert!(matches!(initiator.respond(&tampered), Err(Error::SignatureInvalid)));
        assert_eq!(initiator.state(), RoleState::Begun);
    }

    #[test]
    fn test_respond_rejects_challenge_for_other_commitment() {
        let (_ca, mut initiator, mut challenger) = setup();
        initiator.initiate().unwrap();

        // Challenger answered someone else's g^x, so the derived k_M differs
        let mut other = initiator.client().as_initiator();
        let challenge = challenger.challenge(&other.initiate().unwrap()).unwrap();

        assert!(matches!(initiator.respond(&challenge), Err(Error::MacMismatch)));
    }

    #[test]
    fn test_respond_rejects_low_order_point() {
        let (_ca, mut initiator, mut challenger) = setup();
        let challenge = challenger.challenge(&initiator.initiate().unwrap()).unwrap();

        let tampered = reencode(&challenge, |m| m.challenge = [0u8; 32]);
        assert!(matches!(
            initiator.respond(&tampered),
            Err(Error::KeyExchangeFailed(_))
        ));
    }

    #[test]
    fn test_completed_rejects_everything() {
        let (_ca, mut initiator, mut challenger) = setup();
        let challenge = challenger.challenge(&initiator.initiate().unwrap()).unwrap();
        initiator.respond(&challenge).unwrap();

        assert!(matches!(initiator.initiate(), Err(Error::WrongState { .. })));
        assert!(matches!(
            initiator.respond(&challenge),
            Err(Error::WrongState { actual: "completed", .. })
        ));
        assert!(initiator.session_key().is_ok());
    }
}
