//! Logical to physical column mapping for the users table

use std::fmt;
use std::str::FromStr;

/// Logical user fields whose physical column name can vary per installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Primary,
    Username,
    Password,
    PrivateKey,
}

impl Field {
    /// All mappable fields
    pub const ALL: [Field; 4] = [
        Field::Primary,
        Field::Username,
        Field::Password,
        Field::PrivateKey,
    ];

    /// Logical name of the field
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Username => "username",
            Self::Password => "password",
            Self::PrivateKey => "privatekey",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown logical field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user field: {0:?}")]
pub struct FieldParseError(pub String);

impl FromStr for Field {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "username" => Ok(Self::Username),
            "password" => Ok(Self::Password),
            "privatekey" => Ok(Self::PrivateKey),
            other => Err(FieldParseError(other.to_string())),
        }
    }
}

/// Column names backing each logical field.
///
/// Setting a column is not validated; a wrong name only surfaces as a
/// database error on the next query that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    primary: String,
    username: String,
    password: String,
    private_key: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            primary: "uid".to_string(),
            username: "username".to_string(),
            password: "password".to_string(),
            private_key: "private_key".to_string(),
        }
    }
}

impl FieldMap {
    /// Physical column name for a logical field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Primary => &self.primary,
            Field::Username => &self.username,
            Field::Password => &self.password,
            Field::PrivateKey => &self.private_key,
        }
    }

    /// Point a logical field at another physical column
    pub fn set(&mut self, field: Field, column: impl Into<String>) {
        let column = column.into();
        match field {
            Field::Primary => self.primary = column,
            Field::Username => self.username = column,
            Field::Password => self.password = column,
            Field::PrivateKey => self.private_key = column,
        }
    }
}
