use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::encode;
use crate::graph::request::parse_args;
use crate::graph::{GraphError, RequestContext, Resolver};
use crate::services::TodoService;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoIdArgs {
    #[serde(alias = "todoID", alias = "id")]
    todo_id: Uuid,
}

#[derive(Deserialize)]
struct NewTodo {
    text: String,
}

#[derive(Deserialize)]
struct CreateTodoArgs {
    input: NewTodo,
}

pub struct Todos(pub Arc<TodoService>);

#[async_trait]
impl Resolver for Todos {
    async fn resolve(&self, ctx: &RequestContext, _args: Value) -> Result<Value, GraphError> {
        let owner = ctx.require_identity()?.subject_id;
        encode(self.0.list(owner).await?)
    }
}

pub struct TodoById(pub Arc<TodoService>);

#[async_trait]
impl Resolver for TodoById {
    async fn resolve(&self, ctx: &RequestContext, args: Value) -> Result<Value, GraphError> {
        let owner = ctx.require_identity()?.subject_id;
        let TodoIdArgs { todo_id } = parse_args(args)?;
        encode(self.0.get(todo_id, owner).await?)
    }
}

pub struct CreateTodo(pub Arc<TodoService>);

#[async_trait]
impl Resolver for CreateTodo {
    async fn resolve(&self, ctx: &RequestContext, args: Value) -> Result<Value, GraphError> {
        let owner = ctx.require_identity()?.subject_id;
        let CreateTodoArgs { input } = parse_args(args)?;
        encode(self.0.create(owner, &input.text).await?)
    }
}

pub struct MarkCompleteTodo(pub Arc<TodoService>);

#[async_trait]
impl Resolver for MarkCompleteTodo {
    async fn resolve(&self, ctx: &RequestContext, args: Value) -> Result<Value, GraphError> {
        let owner = ctx.require_identity()?.subject_id;
        let TodoIdArgs { todo_id } = parse_args(args)?;
        encode(self.0.mark_complete(todo_id, owner).await?)
    }
}

pub struct DeleteTodo(pub Arc<TodoService>);

#[async_trait]
impl Resolver for DeleteTodo {
    async fn resolve(&self, ctx: &RequestContext, args: Value) -> Result<Value, GraphError> {
        let owner = ctx.require_identity()?.subject_id;
        let TodoIdArgs { todo_id } = parse_args(args)?;
        Ok(Value::Bool(self.0.delete(todo_id, owner).await?))
    }
}
