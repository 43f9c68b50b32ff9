use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthError, KeyPair, TokenAuthority};
use crate::config::AppConfig;
use crate::database::Datastore;
use crate::error::ApiError;
use crate::graph::{build_schema, Schema};
use crate::handlers;
use crate::middleware::session_middleware;
use crate::services::{AuthService, TodoService};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<TokenAuthority>,
    pub schema: Arc<Schema>,
    pub store: Datastore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire services and the field registry around an already loaded key pair.
    /// Fails when the configured token lifetimes are out of range.
    pub fn new(config: AppConfig, keys: KeyPair, store: Datastore) -> Result<Self, AuthError> {
        let lifetimes = config.jwt.token_lifetimes()?;
        let authority = Arc::new(TokenAuthority::new(keys, lifetimes));

        let auth = Arc::new(AuthService::new(store.users.clone(), authority.clone()));
        let todos = Arc::new(TodoService::new(store.todos.clone(), store.users.clone()));
        let schema = Arc::new(build_schema(auth, todos, store.users.clone()));

        Ok(Self {
            authority,
            schema,
            store,
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/v1/health-check", get(handlers::health_check))
        // Query endpoint; guarded fields enforced per field
        .route("/api/v1/query", post(handlers::query))
        .fallback(not_found)
        // Every request passes through the session middleware
        .layer(middleware::from_fn_with_state(state.authority.clone(), session_middleware))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
