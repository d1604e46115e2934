//! End-to-end encrypt/decrypt pipelines (components E and F), composing
//! the container header codec, key derivation wrapper, AEAD factory, and
//! stream codec into the two operations the CLI exposes.

pub mod decrypt;
pub mod encrypt;

pub use decrypt::{decrypt, DecryptOptions};
pub use encrypt::{encrypt, EncryptOptions};
