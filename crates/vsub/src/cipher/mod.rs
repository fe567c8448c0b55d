// Manifest cipher: turns the `file` blob of the player API into playlist text.
//
// Layout of the blob once base64-decoded: a 16-byte IV followed by AES-CBC
// ciphertext. The key is the SHA-256 digest of a site secret. The plaintext
// is a raw DEFLATE stream whose inflated form is a quoted string literal.

mod unquote;

use std::io::Read;

use aes::Aes256;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
use flate2::read::DeflateDecoder;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use unquote::unquote;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size, also the length of the IV prefix.
pub const BLOCK_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("manifest is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("manifest decryption failed: {0}")]
    Crypto(String),
    #[error("malformed manifest: {0}")]
    Format(String),
}

/// Decrypts encrypted manifests with a key derived from the site secret.
///
/// The cipher holds no state besides the derived key, so one instance can be
/// shared by every resolver and request handler.
#[derive(Clone)]
pub struct ManifestCipher {
    key: [u8; 32],
}

impl ManifestCipher {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Decodes a base64 manifest blob into the playlist text.
    ///
    /// Each stage (base64, AES-CBC, inflate, unquote) must succeed; the first
    /// failure aborts the whole decode.
    pub fn decode(&self, encoded: &str) -> Result<String, CipherError> {
        let data = STANDARD.decode(encoded.trim())?;
        if data.len() < BLOCK_SIZE {
            return Err(CipherError::Format(format!(
                "decoded manifest is {} bytes, shorter than one {BLOCK_SIZE}-byte block",
                data.len()
            )));
        }

        let (iv, ciphertext) = data.split_at(BLOCK_SIZE);
        let mut buffer = ciphertext.to_vec();
        let decryptor = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|e| CipherError::Crypto(format!("failed to initialize AES decryptor: {e}")))?;
        // The stream carries its own terminator, so any pad bytes are left in place.
        let plaintext = decryptor
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|e| {
                CipherError::Crypto(format!(
                    "ciphertext of {} bytes is not block aligned: {e}",
                    ciphertext.len()
                ))
            })?;

        let inflated = inflate(plaintext)?;
        let literal = String::from_utf8(inflated)
            .map_err(|e| CipherError::Format(format!("inflated manifest is not UTF-8: {e}")))?;

        unquote(&literal)
    }
}

impl std::fmt::Debug for ManifestCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestCipher").finish_non_exhaustive()
    }
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CipherError::Crypto(format!("decrypted manifest is not a DEFLATE stream: {e}")))?;
    Ok(out)
}
