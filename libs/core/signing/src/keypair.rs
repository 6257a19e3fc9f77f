// [libs/core/signing/src/keypair.rs]
//! Ephemeral secp256k1 keypair generation for the Stage 3 device-guard
//! exchange. Grounded on `original_source/register_logic.py`'s
//! `generate_delta_keypair()` (public key shipped base64, private key kept
//! hex-encoded) and reuses the `secp256k1` crate already in the stack.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use secp256k1::{PublicKey, Secp256k1, SecretKey};

/// An ephemeral keypair minted once per registration attempt and discarded
/// after the handshake completes or fails.
pub struct Keypair {
    secret: SecretKey,
    public: PublicKey,
}

impl Keypair {
    /// Generates a fresh keypair using the global signing context and the
    /// thread-local CSPRNG.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let mut rng = rand::thread_rng();
        let (secret, public) = secp.generate_keypair(&mut rng);
        Self { secret, public }
    }

    /// Compressed public key, base64-encoded — the form the device-guard
    /// server expects in the Stage 3 request body.
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public.serialize())
    }

    /// Private key, hex-encoded, stored alongside the provisioned device so
    /// later signing rounds can use the same ephemeral identity.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret.secret_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_keys() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_ne!(a.private_key_hex(), b.private_key_hex());
        assert_ne!(a.public_key_base64(), b.public_key_base64());
    }

    #[test]
    fn public_key_is_33_bytes_compressed() {
        let k = Keypair::generate();
        let raw = BASE64.decode(k.public_key_base64()).unwrap();
        assert_eq!(raw.len(), 33);
    }

    #[test]
    fn private_key_hex_is_64_chars() {
        let k = Keypair::generate();
        assert_eq!(k.private_key_hex().len(), 64);
    }
}
