use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use super::models::{NewUser, Todo, User};
use super::store::{HealthCheck, StoreError, TodoStore, UserStore};
use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        name          VARCHAR(128) NOT NULL,
        email         VARCHAR(255) NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)",
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id         UUID PRIMARY KEY,
        text       VARCHAR(255) NOT NULL,
        done       BOOLEAN NOT NULL DEFAULT FALSE,
        user_id    UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS todos_user_id_idx ON todos (user_id)",
];

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const TODO_COLUMNS: &str = "id, text, done, user_id, created_at, updated_at";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect using the configured URL and pool settings
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected Postgres pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn map_not_found(what: String) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| match err {
        sqlx::Error::RowNotFound => StoreError::NotFound(what),
        other => StoreError::Sqlx(other),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(user.email.to_lowercase())
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("email '{}' already registered", user.email))
                }
                other => StoreError::Sqlx(other),
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_not_found(format!("user {}", id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        let email = email.to_lowercase();
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(&email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_not_found(format!("user with email '{}'", email)))
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn create(&self, user_id: Uuid, text: &str) -> Result<Todo, StoreError> {
        let query = format!(
            "INSERT INTO todos (id, text, done, user_id) VALUES ($1, $2, FALSE, $3) RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&query)
            .bind(Uuid::new_v4())
            .bind(text)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Todo, StoreError> {
        let query = format!("SELECT {} FROM todos WHERE id = $1 AND user_id = $2", TODO_COLUMNS);
        sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_not_found(format!("todo {}", id)))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let query = format!(
            "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at",
            TODO_COLUMNS
        );
        let todos = sqlx::query_as::<_, Todo>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn mark_complete(&self, id: Uuid, user_id: Uuid) -> Result<Todo, StoreError> {
        let query = format!(
            "UPDATE todos SET done = TRUE, updated_at = now() WHERE id = $1 AND user_id = $2 RETURNING {}",
            TODO_COLUMNS
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_not_found(format!("todo {}", id)))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
