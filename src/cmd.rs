//! Wires the CLI surface (component G) to the encrypt/decrypt pipelines
//! (E/F): resolves input/output streams and the passphrase, runs the
//! pipeline, and renders diagnostics.

pub mod cli;
pub mod ui;

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use secrecy::ExposeSecret;

use cli::{DecryptArgs, EncryptArgs};
use ui::color::Color;

use streamlock::container::header::Header;
use streamlock::error::Error;
use streamlock::passphrase::{self, PassphraseSource};
use streamlock::pipeline::{self, DecryptOptions, EncryptOptions};

#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o600;

fn open_input(path: &str) -> io::Result<Box<dyn Read>> {
    if path == "-" {
        Ok(Box::new(io::stdin()))
    } else {
        Ok(Box::new(File::open(path)?))
    }
}

fn open_output(path: &str) -> io::Result<Box<dyn Write>> {
    if path == "-" {
        return Ok(Box::new(io::stdout()));
    }

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    opts.mode(OUTPUT_MODE);

    Ok(Box::new(opts.open(path)?))
}

/// Whether `input` and `output` name the same file on disk.
///
/// Opening the output path with `O_TRUNC` zeroes it immediately, as an
/// effect of the `open(2)` call itself, regardless of any fd already open
/// for reading on the same file — so this must be checked before
/// `open_output` ever runs, not worked around after the fact. Streaming
/// in place isn't supported: the pipeline never seeks and never buffers a
/// whole file, so there's nothing to read back once the output is open.
#[cfg(unix)]
fn names_same_file(input: &str, output: &str) -> bool {
    use std::os::unix::fs::MetadataExt;

    if input == "-" || output == "-" {
        return false;
    }
    match (std::fs::metadata(input), std::fs::metadata(output)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn names_same_file(input: &str, output: &str) -> bool {
    if input == "-" || output == "-" {
        return false;
    }
    match (std::fs::canonicalize(input), std::fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn refuse_in_place(input: &str, output: &str) -> Result<(), i32> {
    if names_same_file(input, output) {
        return Err(report_error(&Error::BadCliArgs(format!(
            "input and output both name '{input}'; in-place encryption/decryption is not supported"
        ))));
    }
    Ok(())
}

fn passphrase_source(
    passphrase: &Option<String>,
    passphrase_file: &Option<String>,
) -> PassphraseSource {
    if let Some(value) = passphrase {
        PassphraseSource::Flag(value.clone())
    } else if let Some(path) = passphrase_file {
        PassphraseSource::File(path.clone())
    } else {
        PassphraseSource::Prompt
    }
}

fn report_error(err: &Error) -> i32 {
    eprintln!("{}", Color::error(&format!("error: {err}")));
    err.exit_code()
}

/// Runs the `encrypt` subcommand end to end.
///
/// # Errors
///
/// Returns the process exit code for any failure: bad arguments, an
/// unavailable passphrase, or a pipeline error.
pub fn encrypt(args: EncryptArgs) -> Result<(), i32> {
    let passphrase = passphrase::resolve(
        &passphrase_source(&args.passphrase, &args.passphrase_file),
        true,
    )
    .map_err(|e| report_error(&e))?;

    let output = args.output.as_deref().unwrap_or("-");
    refuse_in_place(&args.input, output)?;

    let mut reader = open_input(&args.input)
        .map_err(|e| report_error(&Error::Io(format!("{}: {e}", args.input))))?;
    let mut writer = open_output(output)
        .map_err(|e| report_error(&Error::Io(format!("{output}: {e}"))))?;

    let opts = EncryptOptions {
        algo: args.algorithm.resolve(),
        n: args.kd_n,
        r: args.kd_r,
        p: args.kd_p,
    };

    pipeline::encrypt(passphrase.expose_secret(), &opts, &mut reader, &mut writer)
        .map(|_| ())
        .map_err(|e| report_error(&e))
}

/// Runs the `decrypt` subcommand end to end.
///
/// # Errors
///
/// Returns the process exit code for any failure: bad arguments, an
/// unavailable passphrase, a refused suspicious header, or a pipeline
/// error (most commonly a wrong passphrase).
pub fn decrypt(args: DecryptArgs) -> Result<(), i32> {
    let passphrase = passphrase::resolve(
        &passphrase_source(&args.passphrase, &args.passphrase_file),
        false,
    )
    .map_err(|e| report_error(&e))?;

    let output = args.output.as_deref().unwrap_or("-");
    refuse_in_place(&args.input, output)?;

    let mut reader = open_input(&args.input)
        .map_err(|e| report_error(&Error::Io(format!("{}: {e}", args.input))))?;
    let mut writer = open_output(output)
        .map_err(|e| report_error(&Error::Io(format!("{output}: {e}"))))?;

    let opts = DecryptOptions {
        stubborn: args.stubborn,
    };

    pipeline::decrypt(
        passphrase.expose_secret(),
        &opts,
        &mut reader,
        &mut writer,
        &mut warn_suspicious,
    )
    .map(|_| ())
    .map_err(|e| report_error(&e))
}

fn warn_suspicious(header: &Header) {
    eprintln!(
        "{}",
        Color::warning(&format!(
            "warning: unusual key-derivation parameters (N={}, r={}, p={}); \
re-run with --stubborn if you are sure this file is yours",
            header.n, header.r, header.p
        ))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdin_and_stdout_are_never_the_same_file() {
        assert!(!names_same_file("-", "-"));
    }

    #[test]
    fn same_path_is_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"x").unwrap();
        let path = path.to_str().unwrap();

        assert!(names_same_file(path, path));
    }

    #[test]
    fn different_existing_files_are_not_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, b"x").unwrap();
        std::fs::write(&b, b"y").unwrap();

        assert!(!names_same_file(a.to_str().unwrap(), b.to_str().unwrap()));
    }

    #[test]
    fn nonexistent_output_is_not_flagged_as_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::write(&input, b"x").unwrap();
        let output = dir.path().join("does-not-exist-yet");

        assert!(!names_same_file(
            input.to_str().unwrap(),
            output.to_str().unwrap()
        ));
    }

    #[test]
    fn refuse_in_place_rejects_same_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, b"x").unwrap();
        let path = path.to_str().unwrap();

        assert_eq!(refuse_in_place(path, path), Err(2));
    }

    #[test]
    fn refuse_in_place_allows_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        std::fs::write(&a, b"x").unwrap();
        let b = dir.path().join("b");

        assert_eq!(refuse_in_place(a.to_str().unwrap(), b.to_str().unwrap()), Ok(()));
    }

    #[test]
    fn passphrase_source_priority_flag_over_file() {
        let source = passphrase_source(&Some("a".into()), &Some("b".into()));
        assert!(matches!(source, PassphraseSource::Flag(v) if v == "a"));
    }

    #[test]
    fn passphrase_source_falls_back_to_file() {
        let source = passphrase_source(&None, &Some("b".into()));
        assert!(matches!(source, PassphraseSource::File(v) if v == "b"));
    }

    #[test]
    fn passphrase_source_falls_back_to_prompt() {
        let source = passphrase_source(&None, &None);
        assert!(matches!(source, PassphraseSource::Prompt));
    }
}
