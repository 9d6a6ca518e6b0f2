//! Loggable identifier for the active session key.
//!
//! Every replica must share one key or sessions issued by one instance fail
//! to decrypt on another. Comparing the fingerprint logged at startup across
//! replicas shows whether they agree without revealing the key.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Digest bytes kept; hex encoding doubles this.
const FINGERPRINT_BYTES: usize = 8;

/// Hex prefix of the SHA-256 digest over the key's signing half.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use guardian_vision::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let key = Key::derive_from(&[7; 64]);
/// let fp = key_fingerprint(&key);
/// assert_eq!(fp.len(), 16);
/// assert_eq!(fp, key_fingerprint(&Key::derive_from(&[7; 64])));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    digest
        .iter()
        .take(FINGERPRINT_BYTES)
        .map(|byte| hex::encode([*byte]))
        .collect()
}
