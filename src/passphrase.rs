//! Passphrase acquisition (component G/H): resolves the passphrase bytes
//! from a flag, a file, or an interactive TTY prompt, in that priority
//! order.

use std::fs;
use std::io::IsTerminal;

use secrecy::{ExposeSecret, SecretSlice};

use crate::error::{Error, Result};

/// Where the passphrase came from, in priority order.
pub enum PassphraseSource {
    Flag(String),
    File(String),
    Prompt,
}

/// Resolves `source` to passphrase bytes.
///
/// On encrypt (`confirm` is `true`), an interactive prompt is entered
/// twice and the two entries are compared in constant time; on mismatch
/// it re-prompts, up to [`MAX_PROMPT_ATTEMPTS`] times. An empty entry is
/// always re-prompted, on encrypt and decrypt alike, since only an
/// interactive prompt gets the chance to try again.
///
/// # Errors
///
/// Errors with [`Error::PassphraseUnavailable`] if the file cannot be
/// read, the TTY prompt fails, a non-interactive source (flag or file)
/// resolves to an empty passphrase, or a prompt is required but stdin is
/// not a terminal.
pub fn resolve(source: &PassphraseSource, confirm: bool) -> Result<SecretSlice<u8>> {
    let passphrase = match source {
        PassphraseSource::Flag(value) => SecretSlice::from(value.clone().into_bytes()),
        PassphraseSource::File(path) => read_from_file(path)?,
        PassphraseSource::Prompt => prompt(confirm)?,
    };

    if passphrase.expose_secret().is_empty() {
        return Err(Error::PassphraseUnavailable("passphrase is empty".into()));
    }

    Ok(passphrase)
}

const MAX_PROMPT_ATTEMPTS: u32 = 3;

fn read_from_file(path: &str) -> Result<SecretSlice<u8>> {
    let mut contents = fs::read_to_string(path)
        .map_err(|e| Error::PassphraseUnavailable(format!("{path}: {e}")))?;
    while contents.ends_with('\n') || contents.ends_with('\r') {
        contents.pop();
    }
    Ok(SecretSlice::from(contents.into_bytes()))
}

fn prompt(confirm: bool) -> Result<SecretSlice<u8>> {
    if !std::io::stdin().is_terminal() {
        return Err(Error::PassphraseUnavailable(
            "no passphrase source and stdin is not a terminal".into(),
        ));
    }

    for attempt in 1..=MAX_PROMPT_ATTEMPTS {
        let first = rpassword::prompt_password("Passphrase: ")
            .map_err(|e| Error::PassphraseUnavailable(e.to_string()))?;

        if first.is_empty() {
            if attempt < MAX_PROMPT_ATTEMPTS {
                eprintln!("Passphrase cannot be empty, try again.");
            }
            continue;
        }

        if !confirm {
            return Ok(SecretSlice::from(first.into_bytes()));
        }

        let second = rpassword::prompt_password("Confirm passphrase: ")
            .map_err(|e| Error::PassphraseUnavailable(e.to_string()))?;

        if constant_time_eq(first.as_bytes(), second.as_bytes()) {
            return Ok(SecretSlice::from(first.into_bytes()));
        }

        if attempt < MAX_PROMPT_ATTEMPTS {
            eprintln!("Passphrases did not match, try again.");
        }
    }

    Err(Error::PassphraseUnavailable(
        "no usable passphrase after repeated attempts".into(),
    ))
}

/// Compares two byte strings in constant time with respect to their
/// content (length is not hidden).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
