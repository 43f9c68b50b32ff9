use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use super::context::RequestContext;
use super::error::GraphError;
use super::interceptor::{run_chain, InterceptorBox};
use super::request::{FieldSelection, OperationKind, QueryRequest, QueryResponse};

/// Business logic behind one root field
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, ctx: &RequestContext, args: Value) -> Result<Value, GraphError>;
}

pub type ResolverBox = Arc<dyn Resolver>;

/// A registered field: its interceptor chain and resolver
pub struct FieldEntry {
    resolver: ResolverBox,
    interceptors: Vec<InterceptorBox>,
}

impl FieldEntry {
    /// Attach an interceptor; the chain stays ordered by priority
    pub fn intercept(&mut self, interceptor: InterceptorBox) -> &mut Self {
        self.interceptors.push(interceptor);
        self.interceptors.sort_by_key(|i| i.priority());
        self
    }
}

/// Field registry keyed by (operation kind, field name)
#[derive(Default)]
pub struct Schema {
    fields: HashMap<(OperationKind, String), FieldEntry>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field, replacing any previous registration under the same name
    pub fn register<R>(&mut self, kind: OperationKind, name: &str, resolver: R) -> &mut FieldEntry
    where
        R: Resolver + 'static,
    {
        tracing::debug!("Registered {:?} field '{}'", kind, name);
        let entry = FieldEntry {
            resolver: Arc::new(resolver),
            interceptors: Vec::new(),
        };
        match self.fields.entry((kind, name.to_string())) {
            Entry::Occupied(mut slot) => {
                tracing::warn!("Field '{}' registered twice; keeping the latest", name);
                slot.insert(entry);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(entry),
        }
    }

    pub fn query<R: Resolver + 'static>(&mut self, name: &str, resolver: R) -> &mut FieldEntry {
        self.register(OperationKind::Query, name, resolver)
    }

    pub fn mutation<R: Resolver + 'static>(&mut self, name: &str, resolver: R) -> &mut FieldEntry {
        self.register(OperationKind::Mutation, name, resolver)
    }

    /// Names of the interceptors guarding a field, in execution order
    pub fn interceptors_of(&self, kind: OperationKind, name: &str) -> Option<Vec<&'static str>> {
        self.fields
            .get(&(kind, name.to_string()))
            .map(|entry| entry.interceptors.iter().map(|i| i.name()).collect())
    }

    pub fn field_names(&self, kind: OperationKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .fields
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Execute every selected field. Query fields resolve concurrently, mutation
    /// fields strictly in request order. A failing field never aborts its siblings.
    pub async fn execute(&self, ctx: &RequestContext, request: QueryRequest) -> QueryResponse {
        let mut response = QueryResponse::default();

        match request.kind {
            OperationKind::Query => {
                let outcomes = join_all(
                    request
                        .fields
                        .iter()
                        .map(|selection| self.resolve_field(ctx, request.kind, selection)),
                )
                .await;
                for (selection, outcome) in request.fields.iter().zip(outcomes) {
                    response.push(selection.response_key(), outcome);
                }
            }
            OperationKind::Mutation => {
                for selection in &request.fields {
                    let outcome = self.resolve_field(ctx, request.kind, selection).await;
                    response.push(selection.response_key(), outcome);
                }
            }
        }

        response
    }

    async fn resolve_field(
        &self,
        ctx: &RequestContext,
        kind: OperationKind,
        selection: &FieldSelection,
    ) -> Result<Value, GraphError> {
        let entry = self
            .fields
            .get(&(kind, selection.name.clone()))
            .ok_or_else(|| GraphError::UnknownField(selection.name.clone()))?;

        run_chain(&entry.interceptors, ctx, &selection.name)?;

        let result = entry.resolver.resolve(ctx, selection.args.clone()).await;
        if let Err(err) = &result {
            tracing::debug!("Field '{}' failed: {}", selection.name, err);
        }
        result
    }
}
