//! Hand-rolled argument parser. No external CLI framework: arguments are
//! walked once, left to right, same as the rest of this program's ethos of
//! depending only on what the job strictly needs.

use std::thread;

use streamlock::crypto::aead::Algorithm;

/// Default scrypt iteration exponent (`N`): `1 << 18` iterations.
pub const DEFAULT_KD_N: u8 = 18;
/// Default scrypt memory factor (`r`).
pub const DEFAULT_KD_R: u8 = 8;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AlgorithmArg {
    Aes256Gcm,
    ChaCha20Poly1305,
    Auto,
}

impl AlgorithmArg {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "aes256gcm" => Some(Self::Aes256Gcm),
            "chacha20poly1305" => Some(Self::ChaCha20Poly1305),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    /// Resolves `auto` to the algorithm tag recorded in the container.
    ///
    /// Advisory only: hardware-accelerated AES is assumed on `x86_64` and
    /// `aarch64`, ChaCha20-Poly1305 elsewhere. The recorded tag is what
    /// actually governs decryption, not this heuristic.
    #[must_use]
    pub fn resolve(self) -> Algorithm {
        match self {
            Self::Aes256Gcm => Algorithm::Aes256Gcm,
            Self::ChaCha20Poly1305 => Algorithm::ChaCha20Poly1305,
            Self::Auto => {
                if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
                    Algorithm::Aes256Gcm
                } else {
                    Algorithm::ChaCha20Poly1305
                }
            }
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub struct EncryptArgs {
    pub input: String,
    pub output: Option<String>,
    pub passphrase: Option<String>,
    pub passphrase_file: Option<String>,
    pub algorithm: AlgorithmArg,
    pub kd_n: u8,
    pub kd_r: u8,
    pub kd_p: u8,
}

#[derive(Debug, Eq, PartialEq)]
pub struct DecryptArgs {
    pub input: String,
    pub output: Option<String>,
    pub passphrase: Option<String>,
    pub passphrase_file: Option<String>,
    pub stubborn: bool,
}

#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    Encrypt(EncryptArgs),
    Decrypt(DecryptArgs),
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Args {
    pub command: Option<Command>,
    pub short_help: bool,
    pub long_help: bool,
    pub version: bool,
}

/// Cost parameter `p` clamped to what the platform actually reports, for
/// use as the default `--kd-p`.
fn default_kd_p() -> u8 {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(u8::MAX as usize) as u8
}

enum Kind {
    Encrypt,
    Decrypt,
}

struct Builder {
    kind: Kind,
    input: Option<String>,
    output: Option<String>,
    passphrase: Option<String>,
    passphrase_file: Option<String>,
    algorithm: AlgorithmArg,
    kd_n: u8,
    kd_r: u8,
    kd_p: u8,
    stubborn: bool,
}

impl Builder {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            input: None,
            output: None,
            passphrase: None,
            passphrase_file: None,
            algorithm: AlgorithmArg::Auto,
            kd_n: DEFAULT_KD_N,
            kd_r: DEFAULT_KD_R,
            kd_p: default_kd_p(),
            stubborn: false,
        }
    }

    fn finish(self) -> Command {
        let input = self.input.unwrap_or_else(|| "-".to_string());
        match self.kind {
            Kind::Encrypt => Command::Encrypt(EncryptArgs {
                input,
                output: self.output,
                passphrase: self.passphrase,
                passphrase_file: self.passphrase_file,
                algorithm: self.algorithm,
                kd_n: self.kd_n,
                kd_r: self.kd_r,
                kd_p: self.kd_p,
            }),
            Kind::Decrypt => Command::Decrypt(DecryptArgs {
                input,
                output: self.output,
                passphrase: self.passphrase,
                passphrase_file: self.passphrase_file,
                stubborn: self.stubborn,
            }),
        }
    }
}

impl Args {
    pub fn build_from_args<I>(mut cli_args: I) -> Result<Self, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut args = Self::default();
        let mut builder: Option<Builder> = None;

        while let Some(arg) = cli_args.next() {
            let arg = arg.as_ref();

            match arg {
                "-h" => {
                    args.short_help = true;
                    continue;
                }
                "--help" => {
                    args.long_help = true;
                    continue;
                }
                "-V" | "--version" => {
                    args.version = true;
                    continue;
                }
                _ => {}
            }

            let Some(b) = &mut builder else {
                match arg {
                    "encrypt" if args.command.is_none() => {
                        builder = Some(Builder::new(Kind::Encrypt));
                    }
                    "decrypt" if args.command.is_none() => {
                        builder = Some(Builder::new(Kind::Decrypt));
                    }
                    "encrypt" | "decrypt" => {
                        return Err(format!("only one command allowed, got '{arg}' twice"));
                    }
                    other => {
                        return Err(format!("unknown argument: '{other}'"));
                    }
                }
                continue;
            };

            match arg {
                "-o" | "--output" => {
                    b.output = Some(require_value(&mut cli_args, arg)?);
                }
                "-P" | "--passphrase" => {
                    b.passphrase = Some(require_value(&mut cli_args, arg)?);
                }
                "--passphrase-file" => {
                    b.passphrase_file = Some(require_value(&mut cli_args, arg)?);
                }
                "-a" | "--algorithm" => {
                    if matches!(b.kind, Kind::Decrypt) {
                        return Err(format!("'{arg}' is only valid with 'encrypt'"));
                    }
                    let value = require_value(&mut cli_args, arg)?;
                    b.algorithm = AlgorithmArg::parse(&value)
                        .ok_or_else(|| format!("unknown algorithm: '{value}'"))?;
                }
                "--kd-n" => b.kd_n = require_u8(&mut cli_args, arg)?,
                "--kd-r" => b.kd_r = require_u8(&mut cli_args, arg)?,
                "--kd-p" => b.kd_p = require_u8(&mut cli_args, arg)?,
                "--stubborn" => {
                    if matches!(b.kind, Kind::Encrypt) {
                        return Err("'--stubborn' is only valid with 'decrypt'".to_string());
                    }
                    b.stubborn = true;
                }
                "encrypt" | "decrypt" => {
                    return Err(format!("only one command allowed, got '{arg}' twice"));
                }
                positional if !positional.starts_with('-') && b.input.is_none() => {
                    b.input = Some(positional.to_string());
                }
                unknown => {
                    return Err(format!("unknown argument: '{unknown}'"));
                }
            }
        }

        args.command = builder.map(Builder::finish);
        Ok(args)
    }
}

fn require_value<I>(cli_args: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item: AsRef<str> + ToString>,
{
    cli_args
        .next()
        .map(|v| v.to_string())
        .ok_or_else(|| format!("'{flag}' requires a value"))
}

fn require_u8<I>(cli_args: &mut I, flag: &str) -> Result<u8, String>
where
    I: Iterator<Item: AsRef<str> + ToString>,
{
    let value = require_value(cli_args, flag)?;
    value
        .parse::<u8>()
        .map_err(|_| format!("'{flag}' expects an integer in 0..=255, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_yields_no_command() {
        let args = Args::build_from_args(std::iter::empty::<String>()).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn encrypt_with_defaults() {
        let args = Args::build_from_args(["encrypt", "in.txt"].iter()).unwrap();
        let Some(Command::Encrypt(e)) = args.command else {
            panic!("expected encrypt command");
        };
        assert_eq!(e.input, "in.txt");
        assert_eq!(e.output, None);
        assert_eq!(e.algorithm, AlgorithmArg::Auto);
        assert_eq!(e.kd_n, DEFAULT_KD_N);
        assert_eq!(e.kd_r, DEFAULT_KD_R);
    }

    #[test]
    fn encrypt_without_positional_defaults_input_to_stdin() {
        let args = Args::build_from_args(["encrypt"].iter()).unwrap();
        let Some(Command::Encrypt(e)) = args.command else {
            panic!("expected encrypt command");
        };
        assert_eq!(e.input, "-");
    }

    #[test]
    fn decrypt_with_all_flags() {
        let args = Args::build_from_args(
            [
                "decrypt",
                "in.bin",
                "-o",
                "out.txt",
                "-P",
                "hunter2",
                "--stubborn",
            ]
            .iter(),
        )
        .unwrap();
        let Some(Command::Decrypt(d)) = args.command else {
            panic!("expected decrypt command");
        };
        assert_eq!(d.input, "in.bin");
        assert_eq!(d.output.as_deref(), Some("out.txt"));
        assert_eq!(d.passphrase.as_deref(), Some("hunter2"));
        assert!(d.stubborn);
    }

    #[test]
    fn encrypt_algorithm_is_case_insensitive() {
        let args = Args::build_from_args(["encrypt", "in.txt", "-a", "ChaCha20Poly1305"].iter())
            .unwrap();
        let Some(Command::Encrypt(e)) = args.command else {
            panic!("expected encrypt command");
        };
        assert_eq!(e.algorithm, AlgorithmArg::ChaCha20Poly1305);
    }

    #[test]
    fn unknown_algorithm_is_an_error() {
        let err = Args::build_from_args(["encrypt", "in.txt", "-a", "rot13"].iter()).unwrap_err();
        assert!(err.contains("rot13"));
    }

    #[test]
    fn algorithm_flag_rejected_on_decrypt() {
        let err = Args::build_from_args(["decrypt", "in.bin", "-a", "auto"].iter()).unwrap_err();
        assert!(err.contains("only valid with 'encrypt'"));
    }

    #[test]
    fn stubborn_flag_rejected_on_encrypt() {
        let err = Args::build_from_args(["encrypt", "in.txt", "--stubborn"].iter()).unwrap_err();
        assert!(err.contains("only valid with 'decrypt'"));
    }

    #[test]
    fn kd_params_parse_as_u8() {
        let args = Args::build_from_args(
            ["encrypt", "in.txt", "--kd-n", "10", "--kd-r", "4", "--kd-p", "2"].iter(),
        )
        .unwrap();
        let Some(Command::Encrypt(e)) = args.command else {
            panic!("expected encrypt command");
        };
        assert_eq!((e.kd_n, e.kd_r, e.kd_p), (10, 4, 2));
    }

    #[test]
    fn kd_n_out_of_u8_range_is_an_error() {
        let err =
            Args::build_from_args(["encrypt", "in.txt", "--kd-n", "999"].iter()).unwrap_err();
        assert!(err.contains("--kd-n"));
    }

    #[test]
    fn second_command_is_rejected() {
        let err = Args::build_from_args(["encrypt", "in.txt", "decrypt"].iter()).unwrap_err();
        assert!(err.contains("only one command"));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = Args::build_from_args(["encrypt", "in.txt", "--bogus"].iter()).unwrap_err();
        assert!(err.contains("--bogus"));
    }

    #[test]
    fn missing_flag_value_is_rejected() {
        let err = Args::build_from_args(["encrypt", "in.txt", "-o"].iter()).unwrap_err();
        assert!(err.contains("requires a value"));
    }

    #[test]
    fn help_and_version_flags() {
        let args = Args::build_from_args(["-h"].iter()).unwrap();
        assert!(args.short_help);

        let args = Args::build_from_args(["--help"].iter()).unwrap();
        assert!(args.long_help);

        let args = Args::build_from_args(["-V"].iter()).unwrap();
        assert!(args.version);

        let args = Args::build_from_args(["--version"].iter()).unwrap();
        assert!(args.version);
    }
}
