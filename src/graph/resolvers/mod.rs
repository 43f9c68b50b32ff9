//! Root field resolvers and their registration.
//!
//! Public fields: `signUp`, `signIn`, `refreshSession`.
//! Guarded fields (anonymous callers get `Access Denied`): `me`, `todos`, `todo`,
//! `createTodo`, `markCompleteTodo`, `deleteTodo`.

pub mod auth;
pub mod todo;
pub mod user;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::interceptor::{AuthGuard, InterceptorBox};
use super::{GraphError, Schema};
use crate::database::UserStore;
use crate::services::{AuthService, TodoService};

pub(crate) fn encode<T: Serialize>(value: T) -> Result<Value, GraphError> {
    serde_json::to_value(value).map_err(|e| GraphError::internal(e.to_string()))
}

/// Wire every root field to its resolver and interceptor chain
pub fn build_schema(auth: Arc<AuthService>, todos: Arc<TodoService>, users: Arc<dyn UserStore>) -> Schema {
    let guard: InterceptorBox = Arc::new(AuthGuard);
    let mut schema = Schema::new();

    // Public
    schema.mutation("signUp", auth::SignUp(auth.clone()));
    schema.mutation("signIn", auth::SignIn(auth.clone()));
    schema.mutation("refreshSession", auth::RefreshSession(auth));

    // Guarded
    schema.query("me", user::Me(users)).intercept(guard.clone());
    schema.query("todos", todo::Todos(todos.clone())).intercept(guard.clone());
    schema.query("todo", todo::TodoById(todos.clone())).intercept(guard.clone());
    schema.mutation("createTodo", todo::CreateTodo(todos.clone())).intercept(guard.clone());
    schema
        .mutation("markCompleteTodo", todo::MarkCompleteTodo(todos.clone()))
        .intercept(guard.clone());
    schema.mutation("deleteTodo", todo::DeleteTodo(todos)).intercept(guard);

    schema
}
