//! AEAD factory (component D): turns an algorithm tag and a derived key
//! into a primitive exposing the small capability set the stream codec
//! needs — nonce size, tag overhead, `seal`, `open`.

use aead::generic_array::GenericArray;
use aead::{Aead as _, KeyInit as _};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;

use crate::error::{Error, Result};

/// Both supported algorithms use a 96-bit nonce.
pub const NONCE_SIZE: usize = 12;
/// Both supported algorithms append a 128-bit authentication tag.
pub const TAG_OVERHEAD: usize = 16;
/// The key derivation function always produces a 256-bit key.
pub const KEY_SIZE: usize = 32;

const TAG_AES256GCM: u8 = b'A';
const TAG_CHACHA20POLY1305: u8 = b'C';

/// The algorithm tag recorded in the container header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Algorithm {
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl Algorithm {
    /// Maps a header octet to an algorithm, or `None` if the octet names
    /// neither supported family.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            TAG_AES256GCM => Some(Self::Aes256Gcm),
            TAG_CHACHA20POLY1305 => Some(Self::ChaCha20Poly1305),
            _ => None,
        }
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Aes256Gcm => TAG_AES256GCM,
            Self::ChaCha20Poly1305 => TAG_CHACHA20POLY1305,
        }
    }
}

/// The capability set the stream codec (component A) drives a chunk
/// through. Two concrete implementations, selected by [`Algorithm`] at
/// pipeline construction.
pub trait AeadPrimitive {
    fn nonce_size(&self) -> usize {
        NONCE_SIZE
    }

    fn overhead(&self) -> usize {
        TAG_OVERHEAD
    }

    /// Seals `plaintext` under `nonce`, returning `ciphertext ‖ tag`.
    ///
    /// # Errors
    ///
    /// Errors if the underlying cipher rejects the input (practically
    /// unreachable for chunk-sized inputs).
    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Opens `ciphertext ‖ tag` under `nonce`, returning the plaintext.
    ///
    /// # Errors
    ///
    /// Errors with [`Error::AuthFailed`] if the tag does not verify.
    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;
}

struct Aes256GcmPrimitive(Aes256Gcm);
struct ChaCha20Poly1305Primitive(ChaCha20Poly1305);

impl AeadPrimitive for Aes256GcmPrimitive {
    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .encrypt(GenericArray::from_slice(nonce), plaintext)
            .map_err(|e| Error::SealFailed(e.to_string()))
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| Error::AuthFailed)
    }
}

impl AeadPrimitive for ChaCha20Poly1305Primitive {
    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .encrypt(GenericArray::from_slice(nonce), plaintext)
            .map_err(|e| Error::SealFailed(e.to_string()))
    }

    fn open(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| Error::AuthFailed)
    }
}

/// Builds the AEAD primitive for `algo`, keyed with `key`.
///
/// # Errors
///
/// Errors with [`Error::AeadInitFailed`] if `key` is not
/// [`KEY_SIZE`] bytes.
pub fn build(algo: Algorithm, key: &[u8]) -> Result<Box<dyn AeadPrimitive>> {
    if key.len() != KEY_SIZE {
        return Err(Error::AeadInitFailed(format!(
            "key must be {KEY_SIZE} bytes, got {}",
            key.len()
        )));
    }

    let key = GenericArray::from_slice(key);
    Ok(match algo {
        Algorithm::Aes256Gcm => Box::new(Aes256GcmPrimitive(Aes256Gcm::new(key))),
        Algorithm::ChaCha20Poly1305 => {
            Box::new(ChaCha20Poly1305Primitive(ChaCha20Poly1305::new(key)))
        }
    })
}
