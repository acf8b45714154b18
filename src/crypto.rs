//! Signature verification for transaction inputs

use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, Verification};
use sha2::{Digest, Sha256};

/// Verify an ECDSA signature over `message` for the SEC1-encoded `address`.
///
/// The message is hashed with SHA-256 before verification. Signatures may be
/// DER encoded or in the 64-byte compact form. Malformed keys or signatures
/// verify as false.
pub fn verify_signature(address: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let secp = Secp256k1::verification_only();
    verify_signature_with(&secp, address, message, signature)
}

/// Same as [`verify_signature`], using a caller-owned context so that many
/// verifications can share one.
pub fn verify_signature_with<C: Verification>(
    secp: &Secp256k1<C>,
    address: &[u8],
    message: &[u8],
    signature: &[u8],
) -> bool {
    let pubkey = match PublicKey::from_slice(address) {
        Ok(pk) => pk,
        Err(_) => return false,
    };

    let signature = match parse_signature(signature) {
        Some(sig) => sig,
        None => return false,
    };

    let digest = signing_digest(message);
    let message = match Message::from_digest_slice(&digest) {
        Ok(msg) => msg,
        Err(_) => return false,
    };

    secp.verify_ecdsa(&message, &signature, &pubkey).is_ok()
}

/// SHA-256 digest that input signatures commit to
pub fn signing_digest(message: &[u8]) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(message));
    digest
}

fn parse_signature(bytes: &[u8]) -> Option<Signature> {
    if bytes.len() == 64 {
        return Signature::from_compact(bytes).ok();
    }
    Signature::from_der(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::SecretKey;

    fn keypair(seed: u8) -> (SecretKey, PublicKey) {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[seed; 32]).unwrap();
        let pk = PublicKey::from_secret_key(&secp, &sk);
        (sk, pk)
    }

    fn sign(sk: &SecretKey, message: &[u8]) -> Signature {
        let secp = Secp256k1::new();
        let msg = Message::from_digest_slice(&signing_digest(message)).unwrap();
        secp.sign_ecdsa(&msg, sk)
    }

    #[test]
    fn test_verify_der_signature() {
        let (sk, pk) = keypair(1);
        let sig = sign(&sk, b"spend");
        assert!(verify_signature(&pk.serialize(), b"spend", &sig.serialize_der()));
    }

    #[test]
    fn test_verify_compact_signature() {
        let (sk, pk) = keypair(2);
        let sig = sign(&sk, b"spend");
        assert!(verify_signature(&pk.serialize(), b"spend", &sig.serialize_compact()));
    }

    #[test]
    fn test_verify_wrong_message() {
        let (sk, pk) = keypair(3);
        let sig = sign(&sk, b"spend");
        assert!(!verify_signature(&pk.serialize(), b"other", &sig.serialize_der()));
    }

    #[test]
    fn test_verify_wrong_key() {
        let (sk, _) = keypair(4);
        let (_, other) = keypair(5);
        let sig = sign(&sk, b"spend");
        assert!(!verify_signature(&other.serialize(), b"spend", &sig.serialize_der()));
    }

    #[test]
    fn test_shared_context_matches_fresh_context() {
        let secp = Secp256k1::verification_only();
        let (sk, pk) = keypair(7);
        let sig = sign(&sk, b"spend").serialize_der();
        for message in [&b"spend"[..], b"other"] {
            assert_eq!(
                verify_signature_with(&secp, &pk.serialize(), message, &sig),
                verify_signature(&pk.serialize(), message, &sig)
            );
        }
    }

    #[test]
    fn test_verify_malformed_inputs() {
        let (sk, pk) = keypair(6);
        let sig = sign(&sk, b"spend");
        assert!(!verify_signature(&[0x02; 5], b"spend", &sig.serialize_der()));
        assert!(!verify_signature(&pk.serialize(), b"spend", &[0x30, 0x01]));
        assert!(!verify_signature(&pk.serialize(), b"spend", &[]));
    }
}
