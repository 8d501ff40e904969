//! Signature validation against a batch digest
//!
//! Recovers or checks a signature against its claimed signer and the
//! digest it was produced for. Nothing downstream may treat a signature
//! as accepted before it has passed through `validate`; a recovery
//! mismatch means a dishonest or broken signer, never a retryable fault.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::batch::Digest;
use crate::crypto::hash::personal_message_hash;
use crate::crypto::keys::{is_low_s, recover_address};
use crate::crypto::Address;
use crate::signature::{Signature, SignatureScheme, ETH_SIGN_V_OFFSET, SIGNATURE_LEN};

/// Errors raised while validating a signature
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed signature: expected 65 bytes, got {0}")]
    MalformedSignature(usize),
    #[error("Invalid signature for claimed signer {0}")]
    InvalidSignature(Address),
}

/// Validate a signature against a digest and its claimed signer.
///
/// For the two ECDSA schemes the signer address is recovered from the
/// signature and must equal the claim; s must sit in the lower half-order
/// and v must carry the scheme's marker. Recovery runs against the raw
/// digest only for the non-prefixed scheme; the `EthSign` scheme recovers
/// against the personal-message hash with the v offset removed.
///
/// `ContractPrevalidated` signatures carry no cryptographic content: they
/// are valid iff the claimed signer is a member of `approved`, the
/// caller-supplied set of addresses known to have approved this digest
/// on-chain.
pub fn validate(
    digest: &Digest,
    signature: &Signature,
    approved: &BTreeSet<Address>,
) -> Result<Address, ValidationError> {
    if signature.bytes.len() != SIGNATURE_LEN {
        return Err(ValidationError::MalformedSignature(signature.bytes.len()));
    }
    let invalid = || ValidationError::InvalidSignature(signature.signer);

    let v = signature.v().ok_or_else(invalid)?;
    // The encoded v must agree with the tagged scheme; a mismatch means
    // the signature was produced for a different convention.
    if SignatureScheme::from_v(v) != Some(signature.scheme) {
        return Err(invalid());
    }

    match signature.scheme {
        SignatureScheme::ContractPrevalidated => {
            let sentinel = Signature::prevalidated(signature.signer);
            if signature.bytes != sentinel.bytes {
                return Err(invalid());
            }
            if !approved.contains(&signature.signer) {
                return Err(invalid());
            }
            Ok(signature.signer)
        }
        SignatureScheme::EoaEcdsa | SignatureScheme::EthSign => {
            let s = signature.s().ok_or_else(invalid)?;
            if !is_low_s(&s) {
                return Err(invalid());
            }

            let (message, plain_v) = match signature.scheme {
                SignatureScheme::EoaEcdsa => (*digest, v),
                SignatureScheme::EthSign => {
                    (personal_message_hash(digest), v - ETH_SIGN_V_OFFSET)
                }
                SignatureScheme::ContractPrevalidated => unreachable!(),
            };
            debug_assert!(plain_v == 27 || plain_v == 28);

            let compact = signature.compact().ok_or_else(invalid)?;
            let recovered =
                recover_address(&message, &compact, plain_v - 27).map_err(|_| invalid())?;
            if recovered != signature.signer {
                return Err(invalid());
            }
            Ok(recovered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::keccak256;
    use crate::crypto::KeyPair;

    fn digest() -> Digest {
        keccak256(b"batch under test")
    }

    fn no_approvals() -> BTreeSet<Address> {
        BTreeSet::new()
    }

    #[test]
    fn test_eoa_round_trip() {
        let kp = KeyPair::generate();
        let d = digest();
        let (compact, rec_id) = kp.sign_digest(&d).unwrap();
        let sig = Signature::eoa(kp.address(), &compact, rec_id);

        assert_eq!(validate(&d, &sig, &no_approvals()), Ok(kp.address()));
    }

    #[test]
    fn test_eth_sign_round_trip() {
        let kp = KeyPair::generate();
        let d = digest();
        let prefixed = personal_message_hash(&d);
        let (compact, rec_id) = kp.sign_digest(&prefixed).unwrap();
        let sig = Signature::eth_sign(kp.address(), &compact, rec_id);

        assert_eq!(validate(&d, &sig, &no_approvals()), Ok(kp.address()));
    }

    #[test]
    fn test_eth_sign_bytes_fail_as_raw_scheme() {
        // A prefixed-scheme signature must never validate against the raw
        // digest, and relabeling the scheme without fixing v must fail.
        let kp = KeyPair::generate();
        let d = digest();
        let prefixed = personal_message_hash(&d);
        let (compact, rec_id) = kp.sign_digest(&prefixed).unwrap();

        let mut sig = Signature::eth_sign(kp.address(), &compact, rec_id);
        sig.scheme = SignatureScheme::EoaEcdsa;
        assert!(validate(&d, &sig, &no_approvals()).is_err());
    }

    #[test]
    fn test_wrong_claimed_signer_rejected() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let d = digest();
        let (compact, rec_id) = kp.sign_digest(&d).unwrap();
        let sig = Signature::eoa(other.address(), &compact, rec_id);

        assert_eq!(
            validate(&d, &sig, &no_approvals()),
            Err(ValidationError::InvalidSignature(other.address()))
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let kp = KeyPair::generate();
        let d = digest();
        let (compact, rec_id) = kp.sign_digest(&d).unwrap();
        let good = Signature::eoa(kp.address(), &compact, rec_id);

        // Flip one bit anywhere in the r‖s body: never a false Ok
        for byte in [0usize, 17, 33, 63] {
            let mut sig = good.clone();
            sig.bytes[byte] ^= 0x01;
            assert!(validate(&d, &sig, &no_approvals()).is_err());
        }
    }

    #[test]
    fn test_malformed_length_rejected() {
        let kp = KeyPair::generate();
        let d = digest();
        let (compact, rec_id) = kp.sign_digest(&d).unwrap();
        let mut sig = Signature::eoa(kp.address(), &compact, rec_id);
        sig.bytes.push(0);

        assert_eq!(
            validate(&d, &sig, &no_approvals()),
            Err(ValidationError::MalformedSignature(66))
        );
    }

    #[test]
    fn test_high_s_rejected() {
        let kp = KeyPair::generate();
        let d = digest();
        let (compact, rec_id) = kp.sign_digest(&d).unwrap();
        let mut sig = Signature::eoa(kp.address(), &compact, rec_id);
        // Force s above the half-order
        for byte in &mut sig.bytes[32..64] {
            *byte = 0xFF;
        }
        assert!(validate(&d, &sig, &no_approvals()).is_err());
    }

    #[test]
    fn test_bad_v_rejected() {
        let kp = KeyPair::generate();
        let d = digest();
        let (compact, rec_id) = kp.sign_digest(&d).unwrap();
        let mut sig = Signature::eoa(kp.address(), &compact, rec_id);
        sig.bytes[64] = 29;

        assert!(validate(&d, &sig, &no_approvals()).is_err());
    }

    #[test]
    fn test_prevalidated_requires_allow_set() {
        let signer: Address = "0x00000000219ab540356cbb839cbe05303d7705fa".parse().unwrap();
        let sig = Signature::prevalidated(signer);
        let d = digest();

        assert!(validate(&d, &sig, &no_approvals()).is_err());

        let mut approved = BTreeSet::new();
        approved.insert(signer);
        assert_eq!(validate(&d, &sig, &approved), Ok(signer));
    }

    #[test]
    fn test_prevalidated_sentinel_must_be_intact() {
        let signer: Address = "0x00000000219ab540356cbb839cbe05303d7705fa".parse().unwrap();
        let mut approved = BTreeSet::new();
        approved.insert(signer);

        let mut sig = Signature::prevalidated(signer);
        sig.bytes[40] = 0x7F; // corrupt the zero s body
        assert!(validate(&digest(), &sig, &approved).is_err());
    }
}
