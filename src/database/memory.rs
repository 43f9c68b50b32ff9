use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{NewUser, Todo, User};
use super::store::{HealthCheck, StoreError, TodoStore, UserStore};

/// Process-local store used when no `DATABASE_URL` is configured, and by tests
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    todos: RwLock<HashMap<Uuid, Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let email = user.email.to_lowercase();
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!("email '{}' already registered", email)));
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        let email = email.to_lowercase();
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user with email '{}'", email)))
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, user_id: Uuid, text: &str) -> Result<Todo, StoreError> {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            text: text.to_string(),
            done: false,
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.todos.write().await.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Todo, StoreError> {
        self.todos
            .read()
            .await
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("todo {}", id)))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let mut todos: Vec<Todo> = self
            .todos
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        todos.sort_by_key(|t| t.created_at);
        Ok(todos)
    }

    async fn mark_complete(&self, id: Uuid, user_id: Uuid) -> Result<Todo, StoreError> {
        let mut todos = self.todos.write().await;
        match todos.get_mut(&id) {
            Some(todo) if todo.user_id == user_id => {
                todo.done = true;
                todo.updated_at = Utc::now();
                Ok(todo.clone())
            }
            _ => Err(StoreError::NotFound(format!("todo {}", id))),
        }
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut todos = self.todos.write().await;
        let owned = todos.get(&id).is_some_and(|t| t.user_id == user_id);
        if owned {
            todos.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
