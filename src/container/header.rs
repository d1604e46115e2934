//! Container header codec (component B).
//!
//! ```text
//! magic (7) ‖ salt (16) ‖ nonce_seed (12) ‖ N (1) ‖ r (1) ‖ p (1) ‖ algo (1)
//! ```
//!
//! 39 octets, no padding. The magic is verified byte-for-byte before any
//! other field is consulted.

use std::io::{Read, Write};

use crate::crypto::aead::{Algorithm, NONCE_SIZE};
use crate::error::{Error, Result};

pub const SALT_SIZE: usize = 16;
pub const HEADER_SIZE: usize = MAGIC.len() + SALT_SIZE + NONCE_SIZE + 3 + 1;

pub const MAGIC: [u8; 7] = *b"EaE\xea\xe0\x17\xef";

/// Soft bounds past which header parameters are valid but suspicious.
const MAX_SANE_N: u8 = 20;
const MAX_SANE_R: u8 = 12;
const MAX_SANE_P: u8 = 8;

/// Whether a successfully parsed header looked like it came from this
/// program with reasonable cost parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeaderWarning {
    None,
    /// N, r, or p exceeds the soft bound. Syntactically valid, but either
    /// an unusually expensive encryption or a foreign file.
    SuspiciousParams,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub salt: [u8; SALT_SIZE],
    pub nonce_seed: [u8; NONCE_SIZE],
    pub n: u8,
    pub r: u8,
    pub p: u8,
    pub algo: Algorithm,
}

impl Header {
    #[must_use]
    pub fn new(
        salt: [u8; SALT_SIZE],
        nonce_seed: [u8; NONCE_SIZE],
        n: u8,
        r: u8,
        p: u8,
        algo: Algorithm,
    ) -> Self {
        Self {
            salt,
            nonce_seed,
            n,
            r,
            p,
            algo,
        }
    }

    #[must_use]
    pub fn is_suspicious(&self) -> bool {
        self.n > MAX_SANE_N || self.r > MAX_SANE_R || self.p > MAX_SANE_P
    }

    /// Writes the 39-octet header to `writer`.
    ///
    /// # Errors
    ///
    /// Errors with [`Error::Io`] on write failure.
    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce_seed);
        buf.push(self.n);
        buf.push(self.r);
        buf.push(self.p);
        buf.push(self.algo.tag());
        debug_assert_eq!(buf.len(), HEADER_SIZE);
        writer.write_all(&buf).map_err(|e| Error::Io(e.to_string()))
    }

    /// Reads and validates a 39-octet header from `reader`.
    ///
    /// # Errors
    ///
    /// Errors with [`Error::BadMagic`] if the first seven octets do not
    /// match [`MAGIC`], [`Error::BadParams`] if N, r, or p is zero or the
    /// algorithm tag is unrecognized, or [`Error::Io`] on read failure.
    pub fn parse(reader: &mut dyn Read) -> Result<(Self, HeaderWarning)> {
        let mut buf = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut buf)
            .map_err(|e| Error::Io(e.to_string()))?;

        if buf[..MAGIC.len()] != MAGIC {
            return Err(Error::BadMagic);
        }

        let mut offset = MAGIC.len();
        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&buf[offset..offset + SALT_SIZE]);
        offset += SALT_SIZE;

        let mut nonce_seed = [0u8; NONCE_SIZE];
        nonce_seed.copy_from_slice(&buf[offset..offset + NONCE_SIZE]);
        offset += NONCE_SIZE;

        let n = buf[offset];
        let r = buf[offset + 1];
        let p = buf[offset + 2];
        let algo_tag = buf[offset + 3];

        let algo = Algorithm::from_tag(algo_tag).ok_or(Error::BadParams)?;
        if n == 0 || r == 0 || p == 0 {
            return Err(Error::BadParams);
        }

        let header = Self::new(salt, nonce_seed, n, r, p, algo);
        let warning = if header.is_suspicious() {
            HeaderWarning::SuspiciousParams
        } else {
            HeaderWarning::None
        };

        Ok((header, warning))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sample_header() -> Header {
        Header::new([1u8; SALT_SIZE], [2u8; NONCE_SIZE], 4, 2, 1, Algorithm::ChaCha20Poly1305)
    }

    #[test]
    fn header_size_is_39_bytes() {
        assert_eq!(HEADER_SIZE, 39);
    }

    #[test]
    fn write_then_parse_round_trips() {
        let header = sample_header();
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);

        let (parsed, warning) = Header::parse(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(warning, HeaderWarning::None);
    }

    #[test]
    fn magic_matches_fixed_bytes() {
        assert_eq!(MAGIC, [0x45, 0x61, 0x45, 0xea, 0xe0, 0x17, 0xef]);
    }

    #[test]
    fn flipped_magic_byte_is_rejected() {
        let header = sample_header();
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        buf[0] ^= 0xff;

        let err = Header::parse(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err, Error::BadMagic);
    }

    #[test]
    fn zero_n_is_rejected() {
        let mut header = sample_header();
        header.n = 0;
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();

        let err = Header::parse(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err, Error::BadParams);
    }

    #[test]
    fn zero_r_is_rejected() {
        let mut header = sample_header();
        header.r = 0;
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(Header::parse(&mut Cursor::new(buf)).unwrap_err(), Error::BadParams);
    }

    #[test]
    fn zero_p_is_rejected() {
        let mut header = sample_header();
        header.p = 0;
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        assert_eq!(Header::parse(&mut Cursor::new(buf)).unwrap_err(), Error::BadParams);
    }

    #[test]
    fn unknown_algo_tag_is_rejected() {
        let header = sample_header();
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        *buf.last_mut().unwrap() = b'Z';
        assert_eq!(Header::parse(&mut Cursor::new(buf)).unwrap_err(), Error::BadParams);
    }

    #[test]
    fn suspicious_n_is_flagged_but_not_a_hard_error() {
        let mut header = sample_header();
        header.n = 21;
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();

        let (parsed, warning) = Header::parse(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed.n, 21);
        assert_eq!(warning, HeaderWarning::SuspiciousParams);
    }

    #[test]
    fn suspicious_r_and_p_are_flagged() {
        let mut header = sample_header();
        header.r = 13;
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        let (_, warning) = Header::parse(&mut Cursor::new(buf)).unwrap();
        assert_eq!(warning, HeaderWarning::SuspiciousParams);

        let mut header = sample_header();
        header.p = 9;
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        let (_, warning) = Header::parse(&mut Cursor::new(buf)).unwrap();
        assert_eq!(warning, HeaderWarning::SuspiciousParams);
    }

    #[test]
    fn in_bounds_params_are_not_suspicious() {
        let header = Header::new([0u8; SALT_SIZE], [0u8; NONCE_SIZE], 20, 12, 8, Algorithm::Aes256Gcm);
        assert!(!header.is_suspicious());
    }

    #[test]
    fn truncated_header_is_an_io_error() {
        let err = Header::parse(&mut Cursor::new(vec![0u8; 10])).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
