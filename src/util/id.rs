//! ID generation for projects and issues.
//!
//! Identifiers are 24-character lowercase hex tokens derived from a SHA-256
//! seed over the record content, creation time, and a nonce. The API only
//! promises the `\w{24}` shape; hex keeps ids URL- and filter-safe.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Length of every generated identifier.
pub const ID_LENGTH: usize = 24;

static ID_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w{24}$").expect("static regex"));

/// Check whether a caller-supplied id has the required shape
/// (exactly 24 word characters).
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    ID_SHAPE.is_match(id)
}

/// Build the hash seed for a candidate id.
fn id_seed(content: &str, created_at: DateTime<Utc>, nonce: u32) -> String {
    format!("{content}\x00{}\x00{nonce}", created_at.to_rfc3339())
}

/// Generate a candidate id for the given content and nonce.
#[must_use]
pub fn generate_candidate(content: &str, created_at: DateTime<Utc>, nonce: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id_seed(content, created_at, nonce).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_LENGTH].to_string()
}

/// Generate an id, checking for collisions with the provided checker.
///
/// The checker returns `true` if the id already exists. Nonces are tried in
/// order; with a 96-bit id space the loop terminates almost immediately.
#[must_use]
pub fn generate<F>(content: &str, created_at: DateTime<Utc>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut nonce = 0u32;
    loop {
        let id = generate_candidate(content, created_at, nonce);
        if !exists(&id) {
            return id;
        }
        nonce = nonce.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_valid_shape() {
        let id = generate_candidate("some title", Utc::now(), 0);
        assert_eq!(id.len(), ID_LENGTH);
        assert!(is_valid_id(&id));
    }

    #[test]
    fn shape_check_rejects_wrong_lengths() {
        assert!(!is_valid_id("not-a-proper-id"));
        assert!(!is_valid_id("629064e8ab553f784ae421")); // 23 chars
        assert!(!is_valid_id("629064e8ab553f784ae42abc1")); // 25 chars
        assert!(is_valid_id("629064e8ab553f784ae42abc"));
    }

    #[test]
    fn shape_check_accepts_underscores() {
        assert!(is_valid_id("629064e8ab553f784ae42ab_"));
    }

    #[test]
    fn nonce_changes_candidate() {
        let now = Utc::now();
        let a = generate_candidate("title", now, 0);
        let b = generate_candidate("title", now, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn generate_skips_collisions() {
        let now = Utc::now();
        let taken = generate_candidate("title", now, 0);
        let id = generate("title", now, |candidate| candidate == taken);
        assert_ne!(id, taken);
        assert!(is_valid_id(&id));
    }
}
