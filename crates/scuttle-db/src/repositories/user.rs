//! PostgreSQL implementation of UserRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use scuttle_core::entities::{NewUser, User, UserChanges};
use scuttle_core::error::DomainError;
use scuttle_core::traits::{RepoResult, UserRepository};
use scuttle_core::value_objects::{Field, FieldMap, UserId};

use crate::models::UserModel;
use crate::schema::Schema;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
    schema: Arc<Schema>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository over the unprefixed tables
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, Arc::new(Schema::default()))
    }

    /// Create a repository sharing table naming with other repositories
    pub fn with_schema(pool: PgPool, schema: Arc<Schema>) -> Self {
        Self { pool, schema }
    }

    /// Schema used to build queries
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    async fn fetch_user_where(&self, field: Field, value: &str) -> RepoResult<Option<User>> {
        let sql = format!(
            "{} WHERE {} = $1",
            self.schema.user_select(),
            self.schema.column(field)
        );

        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    async fn find_id_where(
        &self,
        username: &str,
        field: Field,
        value: &str,
    ) -> RepoResult<Option<UserId>> {
        let sql = format!(
            "SELECT {pk} FROM {users} WHERE {username} = $1 AND {field} = $2",
            pk = self.schema.column(Field::Primary),
            users = self.schema.users(),
            username = self.schema.column(Field::Username),
            field = self.schema.column(field),
        );

        let result = sqlx::query_scalar::<_, i64>(&sql)
            .bind(username)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(UserId::new))
    }
}

fn unique_violation(constraint: Option<&str>) -> DomainError {
    if constraint.is_some_and(|c| c.contains("private_key")) {
        DomainError::PrivateKeyAlreadyExists
    } else {
        DomainError::UsernameAlreadyExists
    }
}

/// Stored keys are NULL rather than empty so the unique constraint ignores them
fn stored_private_key(key: Option<&String>) -> Option<&str> {
    key.map(String::as_str).filter(|k| !k.is_empty())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    fn field_map(&self) -> FieldMap {
        self.schema.field_map()
    }

    fn set_field_name(&self, field: Field, column: String) {
        self.schema.set_field(field, column);
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let sql = format!(
            "{} WHERE {} = $1",
            self.schema.user_select(),
            self.schema.column(Field::Primary)
        );

        let result = sqlx::query_as::<_, UserModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.fetch_user_where(Field::Username, username).await
    }

    #[instrument(skip(self, private_key))]
    async fn find_by_private_key(&self, private_key: &str) -> RepoResult<Option<User>> {
        self.fetch_user_where(Field::PrivateKey, private_key).await
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: Option<i64>) -> RepoResult<Vec<User>> {
        // LIMIT NULL is no limit
        let sql = format!(
            "{} ORDER BY {} DESC LIMIT $1",
            self.schema.user_select(),
            self.schema.column(Field::Primary)
        );

        let rows = sqlx::query_as::<_, UserModel>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self, password_hash))]
    async fn find_id_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> RepoResult<Option<UserId>> {
        self.find_id_where(username, Field::Password, password_hash)
            .await
    }

    #[instrument(skip(self, private_key))]
    async fn find_id_by_private_key(
        &self,
        username: &str,
        private_key: &str,
    ) -> RepoResult<Option<UserId>> {
        self.find_id_where(username, Field::PrivateKey, private_key)
            .await
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        let sql = format!(
            "SELECT {password} FROM {users} WHERE {pk} = $1",
            password = self.schema.column(Field::Password),
            users = self.schema.users(),
            pk = self.schema.column(Field::Primary),
        );

        let result = sqlx::query_scalar::<_, String>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, private_key))]
    async fn private_key_exists(&self, private_key: &str) -> RepoResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {users} WHERE {key} = $1)",
            users = self.schema.users(),
            key = self.schema.column(Field::PrivateKey),
        );

        let result = sqlx::query_scalar::<_, bool>(&sql)
            .bind(private_key)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create(&self, user: &NewUser) -> RepoResult<UserId> {
        let sql = format!(
            "INSERT INTO {users} ({username}, {password}, email, {key}, enable_private_key, \
             created_at, modified_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING {pk}",
            users = self.schema.users(),
            username = self.schema.column(Field::Username),
            password = self.schema.column(Field::Password),
            key = self.schema.column(Field::PrivateKey),
            pk = self.schema.column(Field::Primary),
        );

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let id = sqlx::query_scalar::<_, i64>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(stored_private_key(user.private_key.as_ref()))
            .bind(user.enable_private_key)
            .bind(user.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, unique_violation))?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(UserId::new(id))
    }

    #[instrument(skip(self, changes, password_hash))]
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
        password_hash: Option<&str>,
        modified_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut sql = format!(
            "UPDATE {users} SET name = $2, email = $3, homepage = $4, content = $5, \
             {key} = $6, enable_private_key = $7, modified_at = $8",
            users = self.schema.users(),
            key = self.schema.column(Field::PrivateKey),
        );
        if password_hash.is_some() {
            sql.push_str(&format!(", {} = $9", self.schema.column(Field::Password)));
        }
        sql.push_str(&format!(" WHERE {} = $1", self.schema.column(Field::Primary)));

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut query = sqlx::query(&sql)
            .bind(id.into_inner())
            .bind(&changes.name)
            .bind(&changes.email)
            .bind(&changes.homepage)
            .bind(&changes.content)
            .bind(stored_private_key(changes.private_key.as_ref()))
            .bind(changes.enable_private_key)
            .bind(modified_at);
        if let Some(hash) = password_hash {
            query = query.bind(hash);
        }

        let result = query
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, unique_violation))?;

        tx.commit().await.map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            debug!(user_id = %id, "Update matched no user");
        }

        Ok(())
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
        modified_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let sql = format!(
            "UPDATE {users} SET {password} = $2, modified_at = $3 WHERE {pk} = $1",
            users = self.schema.users(),
            password = self.schema.column(Field::Password),
            pk = self.schema.column(Field::Primary),
        );

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(&sql)
            .bind(id.into_inner())
            .bind(password_hash)
            .bind(modified_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: UserId) -> RepoResult<()> {
        let sql = format!(
            "DELETE FROM {users} WHERE {pk} = $1",
            users = self.schema.users(),
            pk = self.schema.column(Field::Primary),
        );

        let result = sqlx::query(&sql)
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            debug!(user_id = %id, "Delete matched no user");
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> RepoResult<()> {
        let sql = format!("TRUNCATE TABLE {} RESTART IDENTITY", self.schema.users());

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
