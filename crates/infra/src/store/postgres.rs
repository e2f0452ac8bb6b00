//! Postgres-backed user store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / Io / Tls / timeouts | N/A | `Unavailable` |
//!
//! Absence is reported by row counts and `fetch_optional`, never by
//! `RowNotFound`, so `NotFound` only ever means "no such nickname".

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::instrument;

use nickbase_core::{Nickname, User};

use super::{StoreError, UserStore};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        user_nickname TEXT PRIMARY KEY,
        name          TEXT NOT NULL,
        user_age      INTEGER NULL,
        password_hash TEXT NULL
    )
"#;

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the `users` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT user_nickname, name, user_age, password_hash FROM users",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.into_iter().map(User::try_from).collect()
    }

    #[instrument(skip(self, nickname), fields(nickname = %nickname), err)]
    async fn get(&self, nickname: &Nickname) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_nickname, name, user_age, password_hash FROM users WHERE user_nickname = $1",
        )
        .bind(nickname.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    #[instrument(skip(self, user), fields(nickname = %user.user_nickname), err)]
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (user_nickname, name, user_age, password_hash) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.user_nickname.as_str())
        .bind(&user.name)
        .bind(user.user_age)
        .bind(&user.password_hash)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert", e) {
            StoreError::Conflict(_) => StoreError::Conflict(user.user_nickname.to_string()),
            other => other,
        })?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(nickname = %user.user_nickname), err)]
    async fn update(&self, user: User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, user_age = $3, password_hash = $4 WHERE user_nickname = $1",
        )
        .bind(user.user_nickname.as_str())
        .bind(&user.name)
        .bind(user.user_age)
        .bind(&user.password_hash)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, nickname), fields(nickname = %nickname), err)]
    async fn delete(&self, nickname: &Nickname) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE user_nickname = $1")
            .bind(nickname.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    user_nickname: String,
    name: String,
    user_age: Option<i32>,
    password_hash: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            user_nickname: row.try_get("user_nickname")?,
            name: row.try_get("name")?,
            user_age: row.try_get("user_age")?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let user_nickname = Nickname::parse(&row.user_nickname).map_err(|e| {
            StoreError::Unavailable(format!("stored nickname '{}' is invalid: {}", row.user_nickname, e))
        })?;
        Ok(User {
            user_nickname,
            name: row.name,
            user_age: row.user_age,
            password_hash: row.password_hash,
        })
    }
}
