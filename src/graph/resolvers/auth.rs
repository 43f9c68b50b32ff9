use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::encode;
use crate::graph::request::parse_args;
use crate::graph::{GraphError, RequestContext, Resolver};
use crate::services::{AuthService, SignUpInput};

/// `signUp(input: { name, email, password })`
pub struct SignUp(pub Arc<AuthService>);

#[derive(Deserialize)]
struct SignUpArgs {
    input: SignUpInput,
}

#[async_trait]
impl Resolver for SignUp {
    async fn resolve(&self, _ctx: &RequestContext, args: Value) -> Result<Value, GraphError> {
        let SignUpArgs { input } = parse_args(args)?;
        encode(self.0.sign_up(input).await?)
    }
}

/// `signIn(email, password)`
pub struct SignIn(pub Arc<AuthService>);

#[derive(Deserialize)]
struct SignInArgs {
    email: String,
    password: String,
}

#[async_trait]
impl Resolver for SignIn {
    async fn resolve(&self, _ctx: &RequestContext, args: Value) -> Result<Value, GraphError> {
        let SignInArgs { email, password } = parse_args(args)?;
        encode(self.0.sign_in(&email, &password).await?)
    }
}

/// `refreshSession(refreshToken)`
pub struct RefreshSession(pub Arc<AuthService>);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshArgs {
    refresh_token: String,
}

#[async_trait]
impl Resolver for RefreshSession {
    async fn resolve(&self, _ctx: &RequestContext, args: Value) -> Result<Value, GraphError> {
        let RefreshArgs { refresh_token } = parse_args(args)?;
        encode(self.0.refresh_session(&refresh_token)?)
    }
}
