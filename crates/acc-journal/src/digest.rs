use sha2::{Digest, Sha256};

/// SHA-256 of the empty byte sequence, uppercase hex.
pub const EMPTY_SHA256: &str = "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855";

/// SHA-256 over `bytes`, rendered as 64 uppercase hex characters.
///
/// Uppercase is the fixed convention for parity reports. Baseline comparison
/// ignores hex case, so lowercase baselines still match.
pub fn sha256_hex_upper(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode_upper(hasher.finalize())
}
