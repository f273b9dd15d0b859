//! AES-256-GCM encryption for tokens persisted at rest.
//!
//! The key is 32 bytes supplied as a 64 character hex string. Ciphertexts are
//! `base64(nonce || ciphertext)` so they fit a text column.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::error::{Error, ErrorKind, StorageErrorKind};

/// 12-byte nonce size for AES-GCM
const NONCE_SIZE: usize = 12;

fn storage_err(kind: StorageErrorKind) -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Storage(kind),
    }
}

/// Cipher for sealing tokens before they are written to the database.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl TokenCipher {
    /// Build a cipher from a hex-encoded 32-byte key.
    pub fn from_hex(key_hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(key_hex).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::EncryptionFailed),
        })?;
        let cipher = Aes256Gcm::new_from_slice(&bytes)
            .map_err(|_| storage_err(StorageErrorKind::EncryptionFailed))?;
        Ok(Self { cipher })
    }

    /// Encrypt with a random nonce; two calls on the same input differ.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|_| storage_err(StorageErrorKind::EncryptionFailed))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| storage_err(StorageErrorKind::EncryptionFailed))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64.encode(combined))
    }

    /// Decrypt a value produced by [`TokenCipher::encrypt`].
    pub fn decrypt(&self, sealed: &str) -> Result<String, Error> {
        let combined = BASE64.decode(sealed).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })?;

        if combined.len() < NONCE_SIZE {
            return Err(storage_err(StorageErrorKind::DecryptionFailed));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| storage_err(StorageErrorKind::DecryptionFailed))?;

        String::from_utf8(plaintext).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })
    }
}
