//! Chunked AEAD stream codec (component A).
//!
//! Turns a single-shot [`AeadPrimitive`] into a forward-only encrypt/decrypt
//! stream with deterministic per-chunk nonce derivation. Plaintext is never
//! written to the sink on decrypt until the chunk covering it has
//! authenticated.

use std::io::{self, Read, Write};

use crate::crypto::aead::AeadPrimitive;
use crate::error::{Error, Result};

/// Plaintext octets sealed per chunk on encrypt. Ciphertext chunks are this
/// many bytes plus the AEAD's tag overhead.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// `nonce ^= counter`, then increments `counter` by one as a little-endian
/// integer (byte 0 is the low byte).
///
/// This folds the *running* counter into the nonce before advancing it, so
/// the effective nonce sequence is `seed, seed ^ 1, seed ^ 3, seed, …` — the
/// cumulative XOR of 0, 1, 2, 3, … returns to zero every four steps, so the
/// nonce revisits the seed every four chunks. Reproduce this exact
/// derivation; it is part of the wire contract, inherited unchanged from the
/// reference implementation.
///
/// # Errors
///
/// Errors with [`Error::CounterOverflow`] if incrementing the counter
/// carries past its final byte.
fn derive_nonce(nonce: &mut [u8], counter: &mut [u8]) -> Result<()> {
    for (n, c) in nonce.iter_mut().zip(counter.iter()) {
        *n ^= c;
    }
    for byte in counter.iter_mut() {
        let (next, carried) = byte.overflowing_add(1);
        *byte = next;
        if !carried {
            return Ok(());
        }
    }
    Err(Error::CounterOverflow)
}

/// Reads until `buf` is full or the source is exhausted, like Go's
/// `io.ReadFull`. Returns the number of bytes actually read, which may be
/// anywhere from `0` (clean EOF) to `buf.len()` (full read).
fn read_full(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Encrypts `reader` chunk-by-chunk into `writer`, returning the number of
/// ciphertext bytes written.
///
/// `nonce_seed` must be exactly `aead.nonce_size()` bytes.
///
/// # Errors
///
/// Errors with [`Error::NonceSeedSize`] if the seed is the wrong length,
/// [`Error::CounterOverflow`] if the stream runs past `2^(8 * nonce_size)`
/// chunks, [`Error::SealFailed`] if the cipher rejects a chunk, or
/// [`Error::Io`] on source/sink failure.
pub fn stream_encrypt(
    aead: &dyn AeadPrimitive,
    writer: &mut dyn Write,
    reader: &mut dyn Read,
    nonce_seed: &[u8],
    chunk_size: usize,
) -> Result<u64> {
    if nonce_seed.len() != aead.nonce_size() {
        return Err(Error::NonceSeedSize);
    }

    let mut nonce = nonce_seed.to_vec();
    let mut counter = vec![0u8; aead.nonce_size()];
    let mut buf = vec![0u8; chunk_size];
    let mut written: u64 = 0;

    loop {
        let n = read_full(reader, &mut buf).map_err(|e| Error::Io(e.to_string()))?;
        if n == 0 {
            // Source exhausted exactly at the boundary: no empty final
            // chunk is ever emitted.
            return Ok(written);
        }

        derive_nonce(&mut nonce, &mut counter)?;
        let sealed = aead.seal(&nonce, &buf[..n])?;

        writer
            .write_all(&sealed)
            .map_err(|e| Error::Io(e.to_string()))?;
        written += sealed.len() as u64;

        if n < chunk_size {
            // Short read: the source is exhausted, this was the final chunk.
            return Ok(written);
        }
    }
}

/// Decrypts `reader` chunk-by-chunk into `writer`, returning the number of
/// plaintext bytes written.
///
/// # Errors
///
/// Errors with [`Error::NonceSeedSize`] if the seed is the wrong length,
/// [`Error::AuthFailed`] if any chunk's tag does not verify (no plaintext
/// from that chunk, or any chunk after it, is ever written), or
/// [`Error::Io`] on source/sink failure.
pub fn stream_decrypt(
    aead: &dyn AeadPrimitive,
    writer: &mut dyn Write,
    reader: &mut dyn Read,
    nonce_seed: &[u8],
    chunk_size: usize,
) -> Result<u64> {
    if nonce_seed.len() != aead.nonce_size() {
        return Err(Error::NonceSeedSize);
    }

    let overhead = aead.overhead();
    let mut nonce = nonce_seed.to_vec();
    let mut counter = vec![0u8; aead.nonce_size()];
    let mut buf = vec![0u8; chunk_size + overhead];
    let mut written: u64 = 0;

    loop {
        let n = read_full(reader, &mut buf).map_err(|e| Error::Io(e.to_string()))?;
        if n == 0 {
            return Ok(written);
        }
        if n < overhead + 1 {
            // Cannot contain even an empty authenticated chunk.
            return Err(Error::AuthFailed);
        }

        derive_nonce(&mut nonce, &mut counter)?;
        let plaintext = aead.open(&nonce, &buf[..n])?;

        writer
            .write_all(&plaintext)
            .map_err(|e| Error::Io(e.to_string()))?;
        written += plaintext.len() as u64;

        if n < buf.len() {
            return Ok(written);
        }
    }
}
