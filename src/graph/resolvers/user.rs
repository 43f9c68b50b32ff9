use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::encode;
use crate::database::UserStore;
use crate::graph::{GraphError, RequestContext, Resolver};

/// `me`: the caller's own user record
pub struct Me(pub Arc<dyn UserStore>);

#[async_trait]
impl Resolver for Me {
    async fn resolve(&self, ctx: &RequestContext, _args: Value) -> Result<Value, GraphError> {
        let identity = ctx.require_identity()?;
        match self.0.find_by_id(identity.subject_id).await {
            Ok(user) => encode(user),
            Err(err) if err.is_not_found() => Err(GraphError::NotFound("user")),
            Err(err) => Err(err.into()),
        }
    }
}
