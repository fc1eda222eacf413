//! Table names and the logical to physical column mapping
//!
//! Every query interpolates identifiers from here. Identifiers are always
//! double-quoted so a remapped column can never inject SQL.

use std::sync::Arc;

use parking_lot::RwLock;
use scuttle_core::value_objects::{Field, FieldMap};

/// Quote a PostgreSQL identifier, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Naming for the account tables, shared by the user and watch repositories
#[derive(Debug)]
pub struct Schema {
    users: String,
    watched: String,
    fields: RwLock<FieldMap>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new("")
    }
}

impl Schema {
    /// Schema whose table names carry `prefix`
    pub fn new(prefix: &str) -> Self {
        Self {
            users: quote_ident(&format!("{prefix}users")),
            watched: quote_ident(&format!("{prefix}watched")),
            fields: RwLock::new(FieldMap::default()),
        }
    }

    /// Shared schema, for handing the same mapping to several repositories
    pub fn shared(prefix: &str) -> Arc<Self> {
        Arc::new(Self::new(prefix))
    }

    /// Quoted users table name
    pub fn users(&self) -> &str {
        &self.users
    }

    /// Quoted watched table name
    pub fn watched(&self) -> &str {
        &self.watched
    }

    /// Quoted physical column for a logical field
    pub fn column(&self, field: Field) -> String {
        quote_ident(self.fields.read().get(field))
    }

    pub fn field_map(&self) -> FieldMap {
        self.fields.read().clone()
    }

    pub fn set_field(&self, field: Field, column: String) {
        self.fields.write().set(field, column);
    }

    /// `SELECT ... FROM users` with every column aliased to its [`crate::models::UserModel`] name
    pub fn user_select(&self) -> String {
        let fields = self.fields.read();
        format!(
            "SELECT {pk} AS uid, {username} AS username, email, name, homepage, content, \
             {private_key} AS private_key, enable_private_key, created_at, modified_at \
             FROM {users}",
            pk = quote_ident(fields.get(Field::Primary)),
            username = quote_ident(fields.get(Field::Username)),
            private_key = quote_ident(fields.get(Field::PrivateKey)),
            users = self.users,
        )
    }
}
