use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{Todo, TodoView, UserSummary};
use crate::database::{StoreError, TodoStore, UserStore};
use crate::graph::GraphError;

const TODO_TEXT_MAX_LEN: usize = 255;

/// Todo use cases; every call is scoped to the owner's subject id
pub struct TodoService {
    todos: Arc<dyn TodoStore>,
    users: Arc<dyn UserStore>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoStore>, users: Arc<dyn UserStore>) -> Self {
        Self { todos, users }
    }

    pub async fn create(&self, owner: Uuid, text: &str) -> Result<TodoView, GraphError> {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > TODO_TEXT_MAX_LEN {
            return Err(GraphError::Validation { field: "Text" });
        }
        let todo = self.todos.create(owner, text).await?;
        self.view(todo).await
    }

    pub async fn mark_complete(&self, id: Uuid, owner: Uuid) -> Result<TodoView, GraphError> {
        let todo = self.todos.mark_complete(id, owner).await.map_err(not_found)?;
        self.view(todo).await
    }

    pub async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, GraphError> {
        Ok(self.todos.delete(id, owner).await?)
    }

    pub async fn get(&self, id: Uuid, owner: Uuid) -> Result<TodoView, GraphError> {
        let todo = self.todos.find(id, owner).await.map_err(not_found)?;
        self.view(todo).await
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<TodoView>, GraphError> {
        let todos = self.todos.list(owner).await?;
        if todos.is_empty() {
            return Ok(Vec::new());
        }
        let summary = self.owner_summary(owner).await?;
        Ok(todos
            .into_iter()
            .map(|todo| TodoView::new(todo, summary.clone()))
            .collect())
    }

    async fn view(&self, todo: Todo) -> Result<TodoView, GraphError> {
        let summary = self.owner_summary(todo.user_id).await?;
        Ok(TodoView::new(todo, summary))
    }

    async fn owner_summary(&self, owner: Uuid) -> Result<UserSummary, GraphError> {
        match self.users.find_by_id(owner).await {
            Ok(user) => Ok(UserSummary::from(&user)),
            // Token outlived its user
            Err(err) if err.is_not_found() => Err(GraphError::NotFound("user")),
            Err(err) => Err(err.into()),
        }
    }
}

fn not_found(err: StoreError) -> GraphError {
    if err.is_not_found() {
        GraphError::NotFound("todo")
    } else {
        err.into()
    }
}
