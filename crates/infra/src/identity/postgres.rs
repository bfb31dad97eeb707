//! Postgres-backed identity store (`users` table, see `migrations/`).
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` (email owned by another id) |
//! | Database (other) | any | `Unavailable` |
//! | PoolTimedOut / PoolClosed / Io / Tls | n/a | `Unavailable` |
//! | ColumnDecode / Decode | n/a | `Decode` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use starter_auth::{IdentityClaims, IdentityRecord};
use starter_core::UserId;

use super::{IdentityStore, StoreError};

const RECORD_COLUMNS: &str =
    "id, email, name, google_id, avatar_url, is_active, created_at, updated_at";

/// Identity store over a shared `sqlx` pool.
///
/// The upsert is a single `INSERT … ON CONFLICT (id) DO UPDATE … RETURNING`
/// statement, so concurrent first sightings of the same subject resolve in
/// the database without duplicate-key errors.
#[derive(Debug, Clone)]
pub struct PostgresIdentityStore {
    pool: Arc<PgPool>,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    #[instrument(skip(self, claims), fields(user_id = %claims.sub), err)]
    async fn upsert_from_claims(
        &self,
        claims: &IdentityClaims,
    ) -> Result<IdentityRecord, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, name, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                name = EXCLUDED.name,
                updated_at = NOW()
            RETURNING {RECORD_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(claims.sub.as_uuid())
            .bind(&claims.email)
            .bind(&claims.name)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("upsert_user", e))?;

        decode(&row)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find(&self, id: UserId) -> Result<Option<IdentityRecord>, StoreError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;

        row.as_ref().map(decode).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn set_active(&self, id: UserId, active: bool) -> Result<bool, StoreError> {
        let sql = "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1";
        let result = sqlx::query(sql)
            .bind(id.as_uuid())
            .bind(active)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_user_active", e))?;

        Ok(result.rows_affected() > 0)
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    google_id: Option<String>,
    avatar_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            google_id: row.try_get("google_id")?,
            avatar_url: row.try_get("avatar_url")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<UserRow> for IdentityRecord {
    fn from(row: UserRow) -> Self {
        IdentityRecord {
            id: UserId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            google_id: row.google_id,
            avatar_url: row.avatar_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode(row: &sqlx::postgres::PgRow) -> Result<IdentityRecord, StoreError> {
    UserRow::from_row(row)
        .map(IdentityRecord::from)
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Decode(format!("{} in {}", err, operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
