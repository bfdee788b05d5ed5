//! Artifact digest extraction

use repro_platform::CommandOutput;

/// Length of a hex-encoded SHA-256 digest
pub const SHA256_HEX_LEN: usize = 64;

/// Digest from `sha256sum` output: the first whitespace-delimited token, if
/// the command succeeded and the token is a SHA-256 hex string. Otherwise
/// empty.
#[must_use]
pub fn parse_digest(output: &CommandOutput) -> String {
    if !output.success() {
        return String::new();
    }

    let stdout = output.stdout_lossy();
    match stdout.split_whitespace().next() {
        Some(token) if is_sha256_hex(token) => token.to_ascii_lowercase(),
        _ => String::new(),
    }
}

#[must_use]
pub fn is_sha256_hex(token: &str) -> bool {
    token.len() == SHA256_HEX_LEN && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Round to millisecond precision
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
