//! Minimal query engine: one endpoint, a registry of named root fields, and an
//! ordered interceptor chain per field.

pub mod context;
pub mod error;
pub mod interceptor;
pub mod request;
pub mod resolvers;
pub mod schema;

pub use context::RequestContext;
pub use error::GraphError;
pub use interceptor::{AuthGuard, Interceptor, InterceptorBox, Verdict};
pub use request::{FieldError, FieldSelection, OperationKind, QueryRequest, QueryResponse};
pub use resolvers::build_schema;
pub use schema::{Resolver, Schema};
