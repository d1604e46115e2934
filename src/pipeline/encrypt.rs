//! Encrypt pipeline (component E): passphrase + plaintext source → header +
//! chunked ciphertext sink.

use std::io::{Read, Write};

use aead::rand_core::{OsRng, RngCore};
use secrecy::ExposeSecret;

use crate::container::header::{Header, SALT_SIZE};
use crate::crypto::aead::{build, Algorithm, NONCE_SIZE};
use crate::crypto::{kdf, stream};
use crate::error::{Error, Result};

/// Cost parameters and algorithm selection for one encryption.
#[derive(Clone, Copy, Debug)]
pub struct EncryptOptions {
    pub algo: Algorithm,
    pub n: u8,
    pub r: u8,
    pub p: u8,
}

/// Runs the full encrypt pipeline, writing the header followed by the
/// chunked ciphertext to `writer`. Returns the total number of bytes
/// written (header plus ciphertext).
///
/// # Errors
///
/// Errors with [`Error::RandomFailed`] if the CSPRNG fails, and otherwise
/// propagates whatever [`kdf::derive_key`], [`aead::build`], or
/// [`stream::stream_encrypt`] return, each tagged with its own stage.
pub fn encrypt(
    passphrase: &[u8],
    opts: &EncryptOptions,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<u64> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| Error::RandomFailed(e.to_string()))?;

    let key = kdf::derive_key(passphrase, &salt, opts.n, opts.r, opts.p)?;

    let mut nonce_seed = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce_seed)
        .map_err(|e| Error::RandomFailed(e.to_string()))?;

    let header = Header::new(salt, nonce_seed, opts.n, opts.r, opts.p, opts.algo);
    header.write(writer)?;

    let cipher = build(opts.algo, key.expose_secret())?;

    let written = stream::stream_encrypt(
        &*cipher,
        writer,
        reader,
        &nonce_seed,
        stream::CHUNK_SIZE,
    )?;

    Ok(crate::container::header::HEADER_SIZE as u64 + written)
}
