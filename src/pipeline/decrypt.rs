//! Decrypt pipeline (component F): passphrase + ciphertext source → header
//! validation + chunked plaintext sink.

use std::io::{Read, Write};

use secrecy::ExposeSecret;

use crate::container::header::{Header, HeaderWarning};
use crate::crypto::{aead, kdf, stream};
use crate::error::Result;

/// Decrypt-only knobs.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecryptOptions {
    /// Bypass the `SuspiciousParams` refusal for headers with cost
    /// parameters past the soft bounds.
    pub stubborn: bool,
}

/// Runs the full decrypt pipeline: parse the header, enforce parameter
/// sanity, derive the key, and stream-decrypt the remainder of `reader`
/// into `writer`. Returns the number of plaintext bytes written.
///
/// `on_warning` is invoked once, before key derivation, if the header's
/// cost parameters are outside the soft bounds — whether or not the
/// pipeline goes on to refuse the file.
///
/// # Errors
///
/// Errors with [`crate::error::Error::BadMagic`] or
/// [`crate::error::Error::BadParams`] from the header parser,
/// [`crate::error::Error::SuspiciousParams`] if the header is suspicious
/// and `opts.stubborn` is false, and otherwise propagates whatever
/// [`kdf::derive_key`], [`aead::build`], or [`stream::stream_decrypt`]
/// return.
pub fn decrypt(
    passphrase: &[u8],
    opts: &DecryptOptions,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    on_warning: &mut dyn FnMut(&Header),
) -> Result<u64> {
    let (header, warning) = Header::parse(reader)?;

    if warning == HeaderWarning::SuspiciousParams {
        on_warning(&header);
        if !opts.stubborn {
            return Err(crate::error::Error::SuspiciousParams);
        }
    }

    let key = kdf::derive_key(passphrase, &header.salt, header.n, header.r, header.p)?;
    let cipher = aead::build(header.algo, key.expose_secret())?;

    stream::stream_decrypt(
        &*cipher,
        writer,
        reader,
        &header.nonce_seed,
        stream::CHUNK_SIZE,
    )
}
