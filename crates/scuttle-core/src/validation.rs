//! Input validation rules for account data
//!
//! Pure functions with no storage access. Account creation does not call
//! these itself; callers validate before creating or updating a user.

use validator::ValidateEmail;

/// Shortest accepted username
pub const USERNAME_MIN_LEN: usize = 4;

/// Longest accepted username; longer names would be cut by the column width
pub const USERNAME_MAX_LEN: usize = 24;

/// Check a username: 4 to 24 characters from `[A-Za-z0-9_]`
pub fn is_valid_username(username: &str) -> bool {
    (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.len())
        && username
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Check that an email address is well formed
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}
