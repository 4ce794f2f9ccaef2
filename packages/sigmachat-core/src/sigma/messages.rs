//! Handshake wire messages.
//!
//! ```text
//! ChallengeMessage  { "challenge": b64(g^y), "cert": {..}, "sig": b64, "mac": b64 }
//! ResponseMessage   {                        "cert": {..}, "sig": b64, "mac": b64 }
//! ```
//!
//! The commitment `g^x` travels as the bare 32 point bytes.

use serde::{Deserialize, Serialize};

use crate::authority::ValidatedCertificate;
use crate::crypto::{Signature, DH_POINT_SIZE, MAC_SIZE};
use crate::error::{Error, Result};

/// Challenger → initiator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeMessage {
    /// Challenger's ephemeral point g^y
    #[serde(with = "crate::encoding::base64_array")]
    pub challenge: [u8; DH_POINT_SIZE],

    /// Challenger's freshly certified certificate
    #[serde(rename = "cert")]
    pub certificate: ValidatedCertificate,

    /// Challenger's signature over g^x ‖ g^y
    #[serde(rename = "sig")]
    pub signature: Signature,

    /// HMAC(k_M, challenger certificate bytes)
    #[serde(with = "crate::encoding::base64_array")]
    pub mac: [u8; MAC_SIZE],
}

/// Initiator → challenger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Initiator's freshly certified certificate
    #[serde(rename = "cert")]
    pub certificate: ValidatedCertificate,

    /// Initiator's signature over g^x ‖ g^y
    #[serde(rename = "sig")]
    pub signature: Signature,

    /// HMAC(k_M, initiator certificate bytes)
    #[serde(with = "crate::encoding::base64_array")]
    pub mac: [u8; MAC_SIZE],
}

impl ChallengeMessage {
    /// Serialize for the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse untrusted bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| Error::MalformedMessage(format!("could not decode challenge: {}", e)))
    }
}

impl ResponseMessage {
    /// Serialize for the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse untrusted bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| Error::MalformedMessage(format!("could not decode response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{Authority, CertificateAuthority};

    fn certified() -> ValidatedCertificate {
        let ca = CertificateAuthority::new();
        ca.register("bob", &[4u8; 32]);
        ca.certify("bob").unwrap()
    }

    #[test]
    fn test_challenge_field_names() {
        let msg = ChallengeMessage {
            challenge: [1u8; 32],
            certificate: certified(),
            signature: Signature::from_bytes([2u8; 64]),
            mac: [3u8; 32],
        };
        let json: serde_json::Value = serde_json::from_slice(&msg.to_bytes().unwrap()).unwrap();

        for field in ["challenge", "cert", "sig", "mac"] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert!(json["cert"].get("sig").is_some());
    }

    #[test]
    fn test_response_round_trip() {
        let msg = ResponseMessage {
            certificate: certified(),
            signature: Signature::from_bytes([7u8; 64]),
            mac: [8u8; 32],
        };
        let decoded = ResponseMessage::from_bytes(&msg.to_bytes().unwrap()).unwrap();

        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            ChallengeMessage::from_bytes(b"\x00\x01not json"),
            Err(Error::MalformedMessage(_))
        ));
        assert!(matches!(
            ResponseMessage::from_bytes(b"{}"),
            Err(Error::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_short_mac_is_malformed() {
        let msg = ResponseMessage {
            certificate: certified(),
            signature: Signature::from_bytes([7u8; 64]),
            mac: [8u8; 32],
        };
        let mut json: serde_json::Value = serde_json::from_slice(&msg.to_bytes().unwrap()).unwrap();
        json["mac"] = serde_json::Value::String("AAAA".into());

        let result = ResponseMessage::from_bytes(&serde_json::to_vec(&json).unwrap());
        assert!(matches!(result, Err(Error::MalformedMessage(_))));
    }
}
