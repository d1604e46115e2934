#![allow(dead_code)]

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const STREAMLOCK: &str = env!("CARGO_BIN_EXE_streamlock");
const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");

/// Cheap KDF cost parameters so integration tests don't pay scrypt's real
/// cost. Never used as defaults outside tests.
pub const FAST_KD_ARGS: &[&str] = &["--kd-n", "2", "--kd-r", "1", "--kd-p", "1"];

#[derive(Debug)]
pub struct Output {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

pub fn run(args: &[&str]) -> Output {
    let mut command = Command::new(STREAMLOCK);
    command.env("NO_COLOR", "1");
    command.env_remove("PAGER");

    for arg in args {
        command.arg(arg);
    }

    let output = command.output().unwrap();

    Output {
        exit_code: output.status.code().unwrap(),
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Writes `contents` to a fresh file under the test binary's tmpdir and
/// returns its path.
pub fn write_tmp_file(name: &str, contents: &[u8]) -> PathBuf {
    let path = Path::new(TMP_DIR).join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn read_file(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap()
}

pub fn checksum(payload: &[u8]) -> String {
    blake3::hash(payload).to_hex().to_string()
}

/// Deterministic pseudo-random plaintext, long enough to span multiple
/// 256 KiB chunks.
pub fn multi_chunk_plaintext() -> Vec<u8> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..300 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state & 0xff) as u8
        })
        .collect()
}
