//! User ID - storage-generated integer primary key

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a user row.
///
/// Ids are assigned by the database on insert and are always positive;
/// `0` and negative values never identify a stored user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Check whether the id could belong to a stored user
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }

    /// Parse from a decimal string (e.g. a query parameter or cookie segment)
    pub fn parse(s: &str) -> Result<Self, UserIdParseError> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|_| UserIdParseError::NotNumeric(s.to_string()))?;

        if id <= 0 {
            return Err(UserIdParseError::OutOfRange(id));
        }

        Ok(Self(id))
    }
}

/// Error when parsing a UserId from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdParseError {
    #[error("user id is not numeric: {0:?}")]
    NotNumeric(String),

    #[error("user id must be positive, got {0}")]
    OutOfRange(i64),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::str::FromStr for UserId {
    type Err = UserIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserId::parse(s)
    }
}
