use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{NewUser, Todo, User};

/// Errors from the credential and todo stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::Sqlx(sqlx::Error::RowNotFound))
    }
}

/// Credential store: user records keyed by id and by unique, lower-cased email
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;
}

/// Todo items, always scoped to their owner
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create(&self, user_id: Uuid, text: &str) -> Result<Todo, StoreError>;

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Todo, StoreError>;

    async fn list(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError>;

    /// Sets `done`; `NotFound` when the todo does not exist or is not owned by `user_id`
    async fn mark_complete(&self, id: Uuid, user_id: Uuid) -> Result<Todo, StoreError>;

    /// Returns `false` when nothing was deleted
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}

/// Backend health probe, used by `/health`
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Handles to the concrete store, shared by services and handlers
#[derive(Clone)]
pub struct Datastore {
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub health: Arc<dyn HealthCheck>,
}

impl Datastore {
    /// Wrap one backend that implements every store trait
    pub fn from_backend<S>(backend: S) -> Self
    where
        S: UserStore + TodoStore + HealthCheck + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            users: backend.clone(),
            todos: backend.clone(),
            health: backend,
        }
    }
}
