//! AES-256-GCM sealing for backup payloads
//!
//! Each sealed payload gets a fresh random 256-bit key and a fresh nonce.
//! The key lives only for the duration of the call and is zeroized on
//! drop; it is never persisted or returned, so sealed backups cannot be
//! opened again. Tamper detection still works through the GCM tag.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{FinReportError, FinReportResult};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the AES-256 key in bytes
const KEY_SIZE: usize = 32;

/// A sealed payload: nonce and ciphertext, both base64
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedPayload {
    pub nonce: String,
    pub ciphertext: String,
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    1
}

/// Seal a payload under a single-use random key
///
/// The key is generated, used once, and destroyed. Callers get back an
/// authenticated blob they can store but never decrypt.
pub fn seal_ephemeral(plaintext: &[u8]) -> FinReportResult<SealedPayload> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    OsRng.fill_bytes(key.as_mut());

    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| FinReportError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| FinReportError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(SealedPayload {
        nonce: STANDARD.encode(nonce_bytes),
        ciphertext: STANDARD.encode(&ciphertext),
        version: 1,
    })
}
