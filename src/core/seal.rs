//! Sealed-box encryption of secret values.
//!
//! The platform decrypts with a private key only it holds, so values are
//! sealed anonymously (X25519 + XSalsa20-Poly1305) under the target's
//! public key. Each call uses a fresh ephemeral keypair.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crypto_box::aead::OsRng;
use tracing::trace;

use crate::core::constants::PUBLIC_KEY_LEN;
use crate::core::types::SealedValue;
use crate::error::{Result, SealError};

/// A recipient public key, checked to be exactly 32 bytes.
#[derive(Clone)]
pub struct RecipientKey(crypto_box::PublicKey);

impl RecipientKey {
    /// Decode a base64 public key as returned by the platform.
    ///
    /// # Errors
    ///
    /// Returns `SealError::InvalidBase64` if the text is not base64, or
    /// `SealError::InvalidKeyLength` if it does not decode to 32 bytes.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64.decode(encoded.trim()).map_err(SealError::from)?;
        let bytes: [u8; PUBLIC_KEY_LEN] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| SealError::InvalidKeyLength(b.len()))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(crypto_box::PublicKey::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecipientKey({})", BASE64.encode(self.as_bytes()))
    }
}

/// Seal `plaintext` for `key` and base64-encode the ciphertext.
///
/// # Errors
///
/// Returns `SealError::EncryptionFailed` if the sealed box cannot be built.
pub fn seal(key: &RecipientKey, plaintext: &[u8]) -> Result<SealedValue> {
    trace!(plaintext_len = plaintext.len(), "sealing");

    let ciphertext = key
        .0
        .seal(&mut OsRng, plaintext)
        .map_err(|_| SealError::EncryptionFailed)?;

    trace!(ciphertext_len = ciphertext.len(), "sealed");

    Ok(BASE64.encode(ciphertext))
}
