use crate::transaction::PublicKey;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Checks that `signature` over `message` was produced by the holder of `public_key`.
///
/// Implementations must be deterministic and free of side effects: the
/// handler may call them any number of times for the same input.
pub trait SignatureVerifier {
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool;
}

/// Ed25519 verification. Keys that are not valid curve points and signatures
/// of the wrong length verify as `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };

        key.verify(message, &signature).is_ok()
    }
}
