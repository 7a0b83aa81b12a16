//! PostgreSQL Cache Store
//!
//! Key-value entries with millisecond expiry plus unexpiring string sets.
//! Expired rows are invisible to every read and are removed lazily by
//! [`PgCacheStore::cleanup_expired`].

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use crate::domain::repository::{CacheStore, CompareAndDelete};
use crate::error::AuthResult;

/// PostgreSQL-backed cache store
#[derive(Clone)]
pub struct PgCacheStore {
    pool: PgPool,
}

impl PgCacheStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete expired entries
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM cache_entries WHERE expires_at_ms IS NOT NULL AND expires_at_ms <= $1",
        )
        .bind(now_ms())
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(entries_deleted = deleted, "Cleaned up expired cache entries");

        Ok(deleted)
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn expires_at_ms(ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|ttl| {
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_ms().saturating_add(millis)
    })
}

impl CacheStore for PgCacheStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value FROM cache_entries
            WHERE key = $1 AND (expires_at_ms IS NULL OR expires_at_ms > $2)
            "#,
        )
        .bind(key)
        .bind(now_ms())
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at_ms(ttl))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn del(&self, key: &str) -> AuthResult<bool> {
        let live = sqlx::query_scalar::<_, bool>(
            r#"
            DELETE FROM cache_entries WHERE key = $1
            RETURNING (expires_at_ms IS NULL OR expires_at_ms > $2)
            "#,
        )
        .bind(key)
        .bind(now_ms())
        .fetch_optional(&self.pool)
        .await?;

        Ok(live.unwrap_or(false))
    }

    async fn exists(&self, key: &str) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM cache_entries
                WHERE key = $1 AND (expires_at_ms IS NULL OR expires_at_ms > $2)
            )
            "#,
        )
        .bind(key)
        .bind(now_ms())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AuthResult<CompareAndDelete> {
        let now = now_ms();

        let deleted = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM cache_entries
            WHERE key = $1 AND value = $2
              AND (expires_at_ms IS NULL OR expires_at_ms > $3)
            RETURNING key
            "#,
        )
        .bind(key)
        .bind(expected)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if deleted.is_some() {
            return Ok(CompareAndDelete::Deleted);
        }

        if self.exists(key).await? {
            Ok(CompareAndDelete::Mismatch)
        } else {
            Ok(CompareAndDelete::Missing)
        }
    }

    async fn incr(&self, key: &str) -> AuthResult<i64> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO cache_entries AS e (key, value, expires_at_ms)
            VALUES ($1, '1', NULL)
            ON CONFLICT (key) DO UPDATE SET
                value = CASE
                    WHEN e.expires_at_ms IS NOT NULL AND e.expires_at_ms <= $2 THEN '1'
                    ELSE (e.value::BIGINT + 1)::TEXT
                END,
                expires_at_ms = CASE
                    WHEN e.expires_at_ms IS NOT NULL AND e.expires_at_ms <= $2 THEN NULL
                    ELSE e.expires_at_ms
                END
            RETURNING value::BIGINT
            "#,
        )
        .bind(key)
        .bind(now_ms())
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }

    async fn sadd(&self, key: &str, member: &str) -> AuthResult<bool> {
        let inserted = sqlx::query(
            "INSERT INTO cache_set_members (key, member) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(key)
        .bind(member)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted == 1)
    }

    async fn smembers(&self, key: &str) -> AuthResult<Vec<String>> {
        let members = sqlx::query_scalar::<_, String>(
            "SELECT member FROM cache_set_members WHERE key = $1 ORDER BY member",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
