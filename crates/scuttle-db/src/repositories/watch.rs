//! PostgreSQL implementation of WatchRepository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use scuttle_core::entities::WatchDirection;
use scuttle_core::traits::{RepoResult, WatchRepository};
use scuttle_core::value_objects::{Field, UserId};

use crate::schema::Schema;

use super::error::map_db_error;

/// PostgreSQL implementation of WatchRepository.
///
/// Rows are `(uid, watched)`: `uid` watches `watched`.
#[derive(Clone)]
pub struct PgWatchRepository {
    pool: PgPool,
    schema: Arc<Schema>,
}

impl PgWatchRepository {
    /// Create a new PgWatchRepository over the unprefixed tables
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, Arc::new(Schema::default()))
    }

    /// Create a repository sharing table naming with other repositories
    pub fn with_schema(pool: PgPool, schema: Arc<Schema>) -> Self {
        Self { pool, schema }
    }

    fn names_query(&self, direction: WatchDirection) -> String {
        // a is the watched user, b the watcher
        let (select, filter) = match direction {
            WatchDirection::Watching => ("a", "b"),
            WatchDirection::WatchedBy => ("b", "a"),
        };
        let pk = self.schema.column(Field::Primary);
        let username = self.schema.column(Field::Username);

        format!(
            "SELECT {select}.{username} FROM {watched} AS w \
             JOIN {users} AS a ON w.watched = a.{pk} \
             JOIN {users} AS b ON w.uid = b.{pk} \
             WHERE {filter}.{pk} = $1 \
             ORDER BY {select}.{username}",
            watched = self.schema.watched(),
            users = self.schema.users(),
        )
    }
}

#[async_trait]
impl WatchRepository for PgWatchRepository {
    #[instrument(skip(self))]
    async fn find_watched_ids(&self, watcher: UserId) -> RepoResult<Vec<UserId>> {
        let sql = format!(
            "SELECT watched FROM {} WHERE uid = $1 ORDER BY watched",
            self.schema.watched()
        );

        let ids = sqlx::query_scalar::<_, i64>(&sql)
            .bind(watcher.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }

    #[instrument(skip(self))]
    async fn find_names(&self, user: UserId, direction: WatchDirection) -> RepoResult<Vec<String>> {
        let sql = self.names_query(direction);

        let names = sqlx::query_scalar::<_, String>(&sql)
            .bind(user.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(names)
    }

    #[instrument(skip(self))]
    async fn exists(&self, watcher: UserId, watched: UserId) -> RepoResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE uid = $1 AND watched = $2)",
            self.schema.watched()
        );

        let result = sqlx::query_scalar::<_, bool>(&sql)
            .bind(watcher.into_inner())
            .bind(watched.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn toggle(&self, watcher: UserId, watched: UserId) -> RepoResult<bool> {
        let table = self.schema.watched();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let removed = sqlx::query(&format!(
            "DELETE FROM {table} WHERE uid = $1 AND watched = $2"
        ))
        .bind(watcher.into_inner())
        .bind(watched.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if removed == 0 {
            // A concurrent toggle may have inserted the pair already
            sqlx::query(&format!(
                "INSERT INTO {table} (uid, watched) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            ))
            .bind(watcher.into_inner())
            .bind(watched.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(removed == 0)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> RepoResult<()> {
        sqlx::query(&format!("TRUNCATE TABLE {}", self.schema.watched()))
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgWatchRepository>();
    }

    #[tokio::test]
    async fn test_names_query_swaps_sides() {
        // connect_lazy never touches the network
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let repo = PgWatchRepository::new(pool);

        let watching = repo.names_query(WatchDirection::Watching);
        assert!(watching.starts_with("SELECT a.\"username\""));
        assert!(watching.contains("WHERE b.\"uid\" = $1"));

        let watched_by = repo.names_query(WatchDirection::WatchedBy);
        assert!(watched_by.starts_with("SELECT b.\"username\""));
        assert!(watched_by.contains("WHERE a.\"uid\" = $1"));
        assert!(watched_by.ends_with("ORDER BY b.\"username\""));
    }
}
