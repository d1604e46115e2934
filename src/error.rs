//! Crate-wide error type.
//!
//! Every variant corresponds to a failure kind raised by a specific stage
//! of the encrypt/decrypt pipelines. [`Display`](fmt::Display) renders the
//! stage alongside the cause, the same way the pipelines themselves are
//! composed, so a bubbled-up error reads like a small stack trace even
//! without `RUST_BACKTRACE`.

use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The first seven octets of the header did not match the fixed magic.
    BadMagic,
    /// N, r, or p was zero, or the algorithm tag was not recognized.
    BadParams,
    /// Header parameters are valid but exceed the soft bounds, and the
    /// caller did not pass `--stubborn`.
    SuspiciousParams,
    /// The key derivation function itself returned an error.
    KdfFailed(String),
    /// The AEAD primitive rejected the key or nonce size at construction.
    AeadInitFailed(String),
    /// A nonce seed was provided but its length did not match the AEAD's
    /// nonce size.
    NonceSeedSize,
    /// The per-chunk counter wrapped around before the stream ended.
    CounterOverflow,
    /// A ciphertext chunk failed to authenticate.
    AuthFailed,
    /// Sealing a chunk failed for a reason other than the ones above
    /// (practically unreachable for bounded chunk sizes).
    SealFailed(String),
    /// The OS CSPRNG failed to produce random bytes.
    RandomFailed(String),
    /// Reading from the source or writing to the sink failed.
    Io(String),
    /// Command-line arguments were malformed or referenced an unknown
    /// algorithm token.
    BadCliArgs(String),
    /// No passphrase source was available, or it was empty.
    PassphraseUnavailable(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic => write!(f, "parse header: not a valid streamlock container"),
            Self::BadParams => write!(f, "parse header: invalid parameters"),
            Self::SuspiciousParams => write!(
                f,
                "\
decrypt: the file was encrypted with an uncommon set of parameters.
Or it is not encrypted by this application at all. This file is
likely not what you want to decrypt. Re-run with --stubborn if you
insist on decrypting it."
            ),
            Self::KdfFailed(reason) => write!(f, "key derivation: {reason}"),
            Self::AeadInitFailed(reason) => write!(f, "create aead: {reason}"),
            Self::NonceSeedSize => write!(f, "stream: wrong size of nonce seed"),
            Self::CounterOverflow => write!(f, "stream: counter overflow"),
            Self::AuthFailed => write!(
                f,
                "decrypt: authentication failed (likely wrong passphrase!)"
            ),
            Self::SealFailed(reason) => write!(f, "encrypt: {reason}"),
            Self::RandomFailed(reason) => write!(f, "generate random bytes: {reason}"),
            Self::Io(reason) => write!(f, "i/o: {reason}"),
            Self::BadCliArgs(reason) => write!(f, "{reason}"),
            Self::PassphraseUnavailable(reason) => write!(f, "read passphrase: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Maps to the process exit code the CLI surfaces for this error.
    ///
    /// `2` is reserved for user-input mistakes: bad flags, an unknown
    /// algorithm token, or no usable passphrase source at all (no
    /// `--passphrase`/`--passphrase-file`, and stdin isn't a terminal to
    /// prompt on, or a non-interactive source resolved to an empty
    /// passphrase). Everything else is an operational failure (`1`).
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BadCliArgs(_) | Self::PassphraseUnavailable(_) => 2,
            _ => 1,
        }
    }
}
