//! Key derivation wrapper (component C).
//!
//! Applies scrypt, a memory-hard password-based KDF, to turn a passphrase
//! and a per-file salt into the 32-byte key the AEAD factory consumes. The
//! derived key is wrapped in [`SecretBox`] so it is zeroized once dropped.

use scrypt::Params;
use secrecy::SecretBox;

use crate::crypto::aead::KEY_SIZE;
use crate::error::{Error, Result};

/// Derives a [`KEY_SIZE`]-byte key from `passphrase` and `salt` using
/// scrypt with cost parameters `N` (iteration count `1 << n`), `r`
/// (memory factor), and `p` (parallelism factor).
///
/// # Errors
///
/// Errors with [`Error::KdfFailed`] if the parameters are rejected by
/// scrypt (e.g. `n`, `r`, or `p` combine to exceed scrypt's internal
/// memory limit) or if the derivation itself fails.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    n: u8,
    r: u8,
    p: u8,
) -> Result<SecretBox<[u8; KEY_SIZE]>> {
    let params = Params::new(n, u32::from(r), u32::from(p), KEY_SIZE)
        .map_err(|e| Error::KdfFailed(e.to_string()))?;

    let mut key = [0u8; KEY_SIZE];
    scrypt::scrypt(passphrase, salt, &params, &mut key)
        .map_err(|e| Error::KdfFailed(e.to_string()))?;

    Ok(SecretBox::new(Box::new(key)))
}
