//! Request DTOs for account forms
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Username rule shared by the request DTOs
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if scuttle_core::is_valid_username(username) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username");
        err.message = Some("Username must be 4-24 letters, digits or underscores".into());
        Err(err)
    }
}

// ============================================================================
// Auth Requests
// ============================================================================

/// Account registration form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Turn on private key login and issue a key right away
    #[serde(default)]
    pub enable_private_key: bool,
}

/// Username and password login form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Issue the long-lived login cookie
    #[serde(default)]
    pub remember: bool,
}

// ============================================================================
// User Requests
// ============================================================================

/// Profile form; every field except the password replaces the stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New password; empty or absent keeps the current one
    pub password: Option<String>,

    #[validate(length(max = 50, message = "Name must be at most 50 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(url(message = "Homepage must be a URL"))]
    pub homepage: Option<String>,

    pub content: Option<String>,

    #[validate(length(equal = 32, message = "Private key must be 32 characters"))]
    pub private_key: Option<String>,

    #[serde(default)]
    pub enable_private_key: bool,
}

impl UpdateUserRequest {
    /// Password to store, if one was actually given
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.trim().is_empty())
    }
}
