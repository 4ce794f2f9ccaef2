//! Challenger role: answers a commitment, then checks the initiator's response.

use crate::authority::Authority;
use crate::crypto::{
    compute_mac, derive_handshake_keys, dh_point_from_slice, verify, verify_mac, EncryptionKey,
    EphemeralKeyPair, MacKey, DH_POINT_SIZE,
};
use crate::error::{Error, Result};
use crate::identity::RegisteredClient;

use super::messages::{ChallengeMessage, ResponseMessage};
use super::{transcript, RoleState};

enum ChallengerState {
    Base,
    Begun {
        g_x: [u8; DH_POINT_SIZE],
        g_y: [u8; DH_POINT_SIZE],
        mac_key: MacKey,
        session_key: EncryptionKey,
    },
    Completed {
        session_key: EncryptionKey,
    },
}

/// The party that answers a handshake
pub struct Challenger {
    client: RegisteredClient,
    state: ChallengerState,
}

impl Challenger {
    pub(crate) fn new(client: RegisteredClient) -> Self {
        Self {
            client,
            state: ChallengerState::Base,
        }
    }

    /// The registered client this role acts for
    pub fn client(&self) -> &RegisteredClient {
        &self.client
    }

    /// Current state
    pub fn state(&self) -> RoleState {
        match self.state {
            ChallengerState::Base => RoleState::Base,
            ChallengerState::Begun { .. } => RoleState::Begun,
            ChallengerState::Completed { .. } => RoleState::Completed,
        }
    }

    fn wrong_state(&self, expected: RoleState) -> Error {
        Error::WrongState {
            role: "challenger",
            expected: expected.as_str(),
            actual: self.state().as_str(),
        }
    }

    /// Answer the initiator's commitment `g^x`
    ///
    /// Derives both handshake keys, signs `g^x ‖ g^y`, certifies ourselves
    /// and MACs our own certificate. The ephemeral scalar `y` is dropped
    /// before returning.
    pub fn challenge(&mut self, commitment: &[u8]) -> Result<Vec<u8>> {
        if !matches!(self.state, ChallengerState::Base) {
            return Err(self.wrong_state(RoleState::Base));
        }

        let g_x = dh_point_from_slice(commitment)?;
        let ephemeral = EphemeralKeyPair::generate();
        let g_y = ephemeral.public_bytes();
        let keys = derive_handshake_keys(&ephemeral.diffie_hellman(&g_x)?);

        let signature = self.client.sign(&transcript(&g_x, &g_y));
        let certificate = self.client.certify()?;
        let mac = compute_mac(&keys.mac_key, &certificate.certificate().to_bytes()?)?;

        let challenge = ChallengeMessage {
            challenge: g_y,
            certificate,
            signature,
            mac,
        }
        .to_bytes()?;

        self.state = ChallengerState::Begun {
            g_x,
            g_y,
            mac_key: keys.mac_key,
            session_key: keys.session_key,
        };
        tracing::debug!(
            "Challenger {} moved to begun ({} byte challenge)",
            self.client.name(),
            challenge.len()
        );

        Ok(challenge)
    }

    /// Verify the initiator's response and complete
    ///
    /// Checks run in order: certificate, MAC, signature. Any failure leaves
    /// the challenger in `Begun`.
    pub fn finalise(&mut self, response: &[u8]) -> Result<()> {
        let ChallengerState::Begun {
            g_x,
            g_y,
            mac_key,
            session_key,
        } = &self.state
        else {
            return Err(self.wrong_state(RoleState::Begun));
        };

        let message = ResponseMessage::from_bytes(response)?;
        let peer = message.certificate.certificate();

        if !self.client.authority().verify_certificate(&message.certificate) {
            tracing::warn!("Challenger rejected response: untrusted certificate for {}", peer.name());
            return Err(Error::UntrustedCertificate);
        }

        if let Err(e) = verify_mac(mac_key, &peer.to_bytes()?, &message.mac) {
            tracing::warn!("Challenger rejected response: MAC mismatch for {}", peer.name());
            return Err(e);
        }

        if verify(&peer.public_key(), &transcript(g_x, g_y), &message.signature).is_err() {
            tracing::warn!("Challenger rejected response: bad signature from {}", peer.name());
            return Err(Error::SignatureInvalid);
        }

        tracing::info!(
            "Challenger {} completed handshake with {}",
            self.client.name(),
            peer.name()
        );
        let session_key = session_key.clone();
        self.state = ChallengerState::Completed { session_key };

        Ok(())
    }

    /// The shared session key, once completed
    pub fn session_key(&self) -> Result<EncryptionKey> {
        match &self.state {
            ChallengerState::Completed { session_key } => Ok(session_key.clone()),
            _ => Err(Error::NotCompleted),
        }
    }
}

impl std::fmt::Debug for Challenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Challenger")
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
    use crate::sigma::Initiator;

    fn setup() -> (CertificateAuthority, Initiator, Challenger) {
        let ca = CertificateAuthority::new();
        let alice = Client::new("alice").register(Some(&ca)).unwrap();
        let bob = Client::new("bob").register(Some(&ca)).unwrap();
        (ca, alice.as_initiator(), bob.as_challenger())
    }

    /// Runs the first three steps and returns the initiator's response
    fn response(initiator: &mut Initiator, challenger: &mut Challenger) -> Vec<u8> {
        let challenge = challenger.challenge(&initiator.initiate().unwrap()).unwrap();
        initiator.respond(&challenge).unwrap()
    }

    fn reencode(bytes: &[u8], edit: impl FnOnce(&mut ResponseMessage)) -> Vec<u8> {
        let mut msg = ResponseMessage::from_bytes(bytes).unwrap();
        edit(&mut msg);
        msg.to_bytes().unwrap()
    }

    #[test]
    fn test_finalise_before_challenge() {
        let (_ca, _, mut challenger) = setup();
        let err = challenger.finalise(b"{}").unwrap_err();

        assert_eq!(
            err.to_string(),
            "challenger must be in begun state, was in base state"
        );
    }

    #[test]
    fn test_challenge_twice() {
        let (_ca, mut initiator, mut challenger) = setup();
        let g_x = initiator.initiate().unwrap();
        challenger.challenge(&g_x).unwrap();

        assert!(matches!(
            challenger.challenge(&g_x),
            Err(Error::WrongState { expected: "base", actual: "begun", .. })
        ));
    }

    #[test]
    fn test_challenge_wrong_length() {
        let (_ca, _, mut challenger) = setup();

        let result = challenger.challenge(&[1u8; 31]);
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
        assert_eq!(challenger.state(), RoleState::Base);
    }

    #[test]
    fn test_challenge_low_order_point() {
        let (_ca, _, mut challenger) = setup();

        let result = challenger.challenge(&[0u8; 32]);
        assert!(matches!(result, Err(Error::KeyExchangeFailed(_))));
        assert_eq!(challenger.state(), RoleState::Base);
    }

    #[test]
    fn test_challenge_expired_certificate() {
        let (ca, mut initiator, mut challenger) = setup();
        let stale = challenger
            .client()
            .certificate()
            .shifted(-chrono::Duration::days(400));
        ca.replace_stored(stale);

        let result = challenger.challenge(&initiator.initiate().unwrap());
        assert!(matches!(result, Err(Error::CertificationFailed(_))));
        assert_eq!(challenger.state(), RoleState::Base);
    }

    #[test]
    fn test_finalise_malformed() {
        let (_ca, mut initiator, mut challenger) = setup();
        challenger.challenge(&initiator.initiate().unwrap()).unwrap();

        assert!(matches!(
            challenger.finalise(b"[1, 2, 3]"),
            Err(Error::MalformedMessage(_))
        ));
        assert_eq!(challenger.state(), RoleState::Begun);
    }

    #[test]
    fn test_finalise_untrusted_certificate() {
        let (ca, mut initiator, mut challenger) = setup();
        let resp = response(&mut initiator, &mut challenger);

        ca.register("alice", &[9u8; 32]);

        assert!(matches!(
            challenger.finalise(&resp),
            Err(Error::UntrustedCertificate)
        ));
        assert_eq!(challenger.state(), RoleState::Begun);
    }

    #[test]
    fn test_finalise_rejects_tampered_mac_then_retries() {
        let (_ca, mut initiator, mut challenger) = setup();
        let resp = response(&mut initiator, &mut challenger);

        let tampered = reencode(&resp, |m| m.mac[31] ^= 0xFF);
        assert!(matches!(challenger.finalise(&tampered), Err(Error::MacMismatch)));
        assert_eq!(challenger.state(), RoleState::Begun);

        challenger.finalise(&resp).unwrap();
        assert_eq!(challenger.state(), RoleState::Completed);
    }

    #[test]
    fn test_finalise_rejects_tampered_signature() {
        let (_ca, mut initiator, mut challenger) = setup();
        let resp = response(&mut initiator, &mut challenger);

        let tampered = reencode(&resp, |m| m.signature.0[0] ^= 0x01);
        assert!(matches!(
            challenger.finalise(&tampered),
            Err(Error::SignatureInvalid)
        ));
        assert!(matches!(challenger.session_key(), Err(Error::NotCompleted)));
    }

    #[test]
    fn test_completed_rejects_everything() {
        let (_ca, mut initiator, mut challenger) = setup();
        let resp = response(&mut initiator, &mut challenger);
        challenger.finalise(&resp).unwrap();

        assert!(matches!(
            challenger.challenge(&[5u8; 32]),
            Err(Error::WrongState { actual: "completed", .. })
        ));
        assert!(matches!(
            challenger.finalise(&resp),
            Err(Error::WrongState { .. })
        ));
        assert_eq!(initiator.session_key().unwrap(), challenger.session_key().unwrap());
    }
}
