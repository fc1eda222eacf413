//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the users table.
///
/// Columns are selected under these aliases whatever their physical names,
/// see [`crate::Schema::user_select`].
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub uid: i64,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub homepage: Option<String>,
    pub content: Option<String>,
    pub private_key: Option<String>,
    pub enable_private_key: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
