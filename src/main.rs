mod cmd;

use std::env;
use std::process;

use lessify::Pager;

use cmd::cli;

fn main() {
    let args = match cli::Args::build_from_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("fatal: {err}.");
            println!("Try '{bin} -h' for help.", bin = env!("CARGO_BIN_NAME"));
            process::exit(2);
        }
    };

    if args.long_help {
        long_help();
    } else if args.short_help {
        short_help();
    } else if args.version {
        version();
    } else if let Some(command) = args.command {
        let result = match command {
            cli::Command::Encrypt(encrypt_args) => cmd::encrypt(encrypt_args),
            cli::Command::Decrypt(decrypt_args) => cmd::decrypt(decrypt_args),
        };
        if let Err(code) = result {
            process::exit(code);
        }
    } else {
        // No arguments.
        short_help();
    }
}

fn short_help() {
    println!("{}", short_help_message());
    println!(
        "For full help, see `{bin} --help`.",
        bin = env!("CARGO_BIN_NAME")
    );
}

fn short_help_message() -> String {
    format!(
        "\
{description}

Usage: {bin} <command> [<options>] [<input>]

Commands:
  encrypt                Encrypt a file or stream
  decrypt                Decrypt a file or stream

Options:
  -h, --help             Show this message and exit
  -V, --version          Show the version and exit
",
        description = env!("CARGO_PKG_DESCRIPTION"),
        bin = env!("CARGO_BIN_NAME"),
    )
}

fn long_help() {
    Pager::page_or_print(&format!(
        "\
{help}
Arguments:
  <input>                  Input file, or '-'/omitted for stdin

Common options:
  -o, --output <file>      Output file ('-'/omitted for stdout)
  -P, --passphrase <text>  Passphrase, given directly on the command line
      --passphrase-file <file>
                           Read the passphrase from a file
                           (priority: --passphrase > --passphrase-file > TTY prompt)

Encrypt-only options:
  -a, --algorithm <name>   aes256gcm, chacha20poly1305, or auto (default: auto)
      --kd-n <n>           scrypt iteration exponent, 2^n iterations (default: {default_n})
      --kd-r <n>           scrypt memory factor (default: {default_r})
      --kd-p <n>           scrypt parallelism factor (default: available parallelism)

Decrypt-only options:
      --stubborn           Proceed even if the header's cost parameters look unusual

Exit codes:
  0  success
  1  operational failure (I/O, key derivation, authentication, suspicious parameters)
  2  invalid arguments
",
        help = short_help_message(),
        default_n = cli::DEFAULT_KD_N,
        default_r = cli::DEFAULT_KD_R,
    ));
}

fn version() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}
