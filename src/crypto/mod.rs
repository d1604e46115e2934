//! Cryptographic primitives: the AEAD factory, the chunked stream codec,
//! and the key derivation wrapper. Everything container-format-shaped
//! (header layout, parameter bounds) lives in [`crate::container`]; this
//! module only knows about keys, nonces, and bytes.

pub mod aead;
pub mod kdf;
pub mod stream;

pub use aead::Algorithm;
