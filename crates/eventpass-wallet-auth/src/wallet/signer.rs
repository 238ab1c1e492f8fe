/*
[INPUT]:  Aptos full-message text and optional secret key bytes
[OUTPUT]: `0x`-hex Ed25519 signatures, public keys and local wallet addresses
[POS]:    Wallet layer - key material behind the local keystore wallet
[UPDATE]: When changing signing algorithm or key format
*/

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand::rngs::OsRng;

/// Ed25519 key pair held by a local keystore wallet.
///
/// Signatures and keys are rendered the way browser Aptos wallets return
/// them: lowercase hex with a `0x` prefix.
#[derive(Debug)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Restore the key persisted by the keystore
    pub fn from_secret_key(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Sign the wallet's full message text, hex-encoded
    pub fn sign_hex(&self, full_message: &str) -> String {
        let signature = self.signing_key.sign(full_message.as_bytes());
        to_hex(&signature.to_bytes())
    }

    /// Check a hex signature (with or without `0x`) over `full_message`
    pub fn verify_hex(&self, full_message: &str, signature: &str) -> bool {
        let Ok(bytes) = hex::decode(strip_prefix(signature)) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&bytes) else {
            return false;
        };
        self.signing_key
            .verifying_key()
            .verify(full_message.as_bytes(), &signature)
            .is_ok()
    }

    pub fn public_key_hex(&self) -> String {
        to_hex(self.signing_key.verifying_key().as_bytes())
    }

    /// Local wallet address.
    ///
    /// The hex public key, not an on-chain authentication key; it only has
    /// to identify the wallet to the backend consistently.
    pub fn address(&self) -> String {
        self.public_key_hex()
    }

    /// Raw secret for the keystore file
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn strip_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_MESSAGE: &str = "APTOS\nmessage: Sign in to EventPass\nnonce: n-1";

    #[test]
    fn test_signature_round_trips_through_hex() {
        let signer = Ed25519Signer::generate();
        let signature = signer.sign_hex(FULL_MESSAGE);

        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 128);
        assert!(signer.verify_hex(FULL_MESSAGE, &signature));
        assert!(signer.verify_hex(FULL_MESSAGE, signature.trim_start_matches("0x")));
    }

    #[test]
    fn test_signature_is_bound_to_message_and_key() {
        let signer = Ed25519Signer::from_secret_key(&[1u8; 32]);
        let other = Ed25519Signer::from_secret_key(&[2u8; 32]);
        let signature = signer.sign_hex(FULL_MESSAGE);

        assert!(!signer.verify_hex("APTOS\nmessage: Sign in to EventPass\nnonce: n-2", &signature));
        assert!(!other.verify_hex(FULL_MESSAGE, &signature));
        assert!(!signer.verify_hex(FULL_MESSAGE, "0xnot-hex"));
        assert!(!signer.verify_hex(FULL_MESSAGE, "0xabcd"));
    }

    #[test]
    fn test_address_is_stable_for_a_restored_key() {
        let signer = Ed25519Signer::from_secret_key(&[7u8; 32]);
        let restored = Ed25519Signer::from_secret_key(&signer.secret_key_bytes());

        let address = signer.address();
        assert_eq!(address, restored.address());
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 66);
    }
}
