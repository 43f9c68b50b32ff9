use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Todo as returned to clients, with its owner embedded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoView {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
    pub user: UserSummary,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl TodoView {
    pub fn new(todo: Todo, user: UserSummary) -> Self {
        Self {
            id: todo.id,
            text: todo.text,
            done: todo.done,
            user,
            created: todo.created_at,
            updated: todo.updated_at,
        }
    }
}
