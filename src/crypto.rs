//! Envelope encryption for payment-processor secrets and one-way helpers.
//!
//! Each purpose ("asaas-api-key", "asaas-webhook-token", ...) gets its own
//! AES-256-GCM key derived from the master key with HKDF-SHA256, so a leaked
//! derived key cannot decrypt values stored for another purpose. Stored values
//! are `base64(nonce || ciphertext)`.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const HKDF_SALT: &[u8] = b"vitrine-master-key-v1";

pub const PURPOSE_ASAAS_API_KEY: &str = "asaas-api-key";
pub const PURPOSE_ASAAS_WEBHOOK_TOKEN: &str = "asaas-webhook-token";
const PURPOSE_CARD_FINGERPRINT: &str = "card-fingerprint-v1";

#[derive(Clone)]
pub struct MasterKey([u8; 32]);

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

impl MasterKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|_| AppError::Internal("MASTER_KEY is not valid hex".into()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AppError::Internal("MASTER_KEY must be 32 bytes (64 hex chars)".into()))?;
        Ok(Self(bytes))
    }

    /// Deterministic key for local development. Never use in production.
    pub fn dev() -> Self {
        Self(Sha256::digest(b"vitrine-insecure-dev-master-key").into())
    }

    /// Generate a fresh random key, returned hex-encoded.
    pub fn generate_hex() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn derive(&self, purpose: &str) -> Result<[u8; 32]> {
        let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), &self.0);
        let mut okm = [0u8; 32];
        hk.expand(purpose.as_bytes(), &mut okm)
            .map_err(|_| AppError::Internal("Key derivation failed".into()))?;
        Ok(okm)
    }

    pub fn encrypt(&self, purpose: &str, plaintext: &str) -> Result<String> {
        let key = self.derive(purpose)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| AppError::Internal("Invalid derived key length".into()))?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| AppError::Internal("Encryption failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, purpose: &str, stored: &str) -> Result<String> {
        let raw = BASE64
            .decode(stored)
            .map_err(|_| AppError::Internal("Stored secret is not valid base64".into()))?;
        if raw.len() <= NONCE_LEN {
            return Err(AppError::Internal("Stored secret is truncated".into()));
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);

        let key = self.derive(purpose)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| AppError::Internal("Invalid derived key length".into()))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AppError::Internal("Decryption failed (wrong master key?)".into()))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Internal("Decrypted secret is not UTF-8".into()))
    }

    /// Keyed fingerprint of a card number. Lets identical cards be correlated
    /// without keeping the number itself.
    pub fn card_fingerprint(&self, card_number: &str) -> Result<String> {
        let key = self.derive(PURPOSE_CARD_FINGERPRINT)?;
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&key)
            .map_err(|_| AppError::Internal("Invalid fingerprint key".into()))?;
        mac.update(card_number.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// SHA-256 of a secret, hex-encoded.
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Compare two secrets without leaking where they differ.
///
/// Both sides are hashed first so the comparison is also length-independent.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.ct_eq(&b).into()
}

/// Mask a secret for display: keep a short prefix and suffix.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len().max(4));
    }
    let prefix: String = chars[..8].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
