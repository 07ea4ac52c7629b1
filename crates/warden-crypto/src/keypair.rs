//! Ed25519 signing keys for the audit log's optional chain signature.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

/// An Ed25519 keypair used to sign audit entries or minted tokens.
#[derive(ZeroizeOnDrop)]
pub struct KeyPair {
    signing_key: SigningKey,
    #[zeroize(skip)]
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a fresh random keypair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Rebuild a keypair from a raw 32-byte secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not exactly 32 bytes.
    pub fn from_secret_key(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 32] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: 32,
                    actual: bytes.len(),
                })?;
        let signing_key = SigningKey::from_bytes(&array);
        let verifying_key = signing_key.verifying_key();
        Ok(Self {
            signing_key,
            verifying_key,
        })
    }

    /// The public key bytes.
    #[must_use]
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Sign a message.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig_bytes: [u8; 64] =
            signature
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: 64,
                    actual: signature.len(),
                })?;
        let signature = Signature::from_bytes(&sig_bytes);
        self.verifying_key
            .verify(message, &signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trips() {
        let pair = KeyPair::generate();
        let sig = pair.sign(b"payload");
        assert!(pair.verify(b"payload", &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let pair = KeyPair::generate();
        let sig = pair.sign(b"payload");
        assert!(pair.verify(b"not the payload", &sig).is_err());
    }

    #[test]
    fn rejects_wrong_length_secret_key() {
        let err = KeyPair::from_secret_key(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { .. }));
    }
}
