//! Legacy credential formats
//!
//! Stored password hashes are unsalted SHA-1 hex digests of the trimmed
//! plaintext, and the remember-me cookie carries an MD5 digest of the
//! username followed by that stored hash. Both formats are kept so existing
//! accounts and cookies stay valid.

use std::fmt;

use chrono::Utc;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use scuttle_core::UserId;
use sha1::{Digest, Sha1};
use uuid::Uuid;

/// Length of passwords produced by [`generate_password`]
pub const GENERATED_PASSWORD_LEN: usize = 12;

/// Hash a plaintext password for storage
///
/// Surrounding whitespace is ignored, so `" secret "` and `"secret"` hash
/// to the same value.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha1::digest(password.trim().as_bytes()))
}

/// Check a plaintext password against a stored hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

/// Credential hash carried by the remember-me cookie
pub fn login_cookie_hash(username: &str, stored_hash: &str) -> String {
    format!("{:x}", md5::compute(format!("{username}{stored_hash}")))
}

/// Generate a random password with the OS CSPRNG
pub fn generate_password() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Produce a fresh 32 character lowercase hex private key.
///
/// Uniqueness against stored keys is the caller's job.
pub fn generate_private_key_candidate() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:x}", md5::compute(format!("{}{nanos}", Uuid::new_v4())))
}

/// Parsed remember-me cookie value, `"<id>:<hash>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCookie {
    pub user_id: UserId,
    pub hash: String,
}

impl LoginCookie {
    /// Build the cookie for a user from their stored password hash
    pub fn issue(user_id: UserId, username: &str, stored_hash: &str) -> Self {
        Self {
            user_id,
            hash: login_cookie_hash(username, stored_hash),
        }
    }

    /// Parse a cookie value; anything malformed yields `None`
    pub fn parse(value: &str) -> Option<Self> {
        let (id, hash) = value.split_once(':')?;
        let user_id = UserId::parse(id).ok()?;
        if hash.is_empty() {
            return None;
        }
        Some(Self {
            user_id,
            hash: hash.to_string(),
        })
    }

    /// Check the cookie against the user's current username and hash
    pub fn matches(&self, username: &str, stored_hash: &str) -> bool {
        self.hash == login_cookie_hash(username, stored_hash)
    }
}

impl fmt::Display for LoginCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user_id, self.hash)
    }
}
