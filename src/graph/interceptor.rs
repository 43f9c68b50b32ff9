use std::sync::Arc;

use crate::auth::current_identity;

use super::context::RequestContext;
use super::error::GraphError;

/// Outcome of one interceptor
#[derive(Debug)]
pub enum Verdict {
    Proceed,
    Reject(GraphError),
}

/// Per-field hook run before the resolver. Interceptors registered on a field
/// run in ascending `priority()` order; the first rejection wins and the
/// resolver is never called.
pub trait Interceptor: Send + Sync {
    /// Interceptor name for logging and debugging
    fn name(&self) -> &'static str;

    /// Lower numbers run first
    fn priority(&self) -> u8 {
        50
    }

    fn intercept(&self, ctx: &RequestContext, field: &str) -> Verdict;
}

pub type InterceptorBox = Arc<dyn Interceptor>;

/// Field Authorization Guard: rejects the field when no identity is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthGuard;

impl Interceptor for AuthGuard {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn intercept(&self, ctx: &RequestContext, field: &str) -> Verdict {
        match current_identity(ctx) {
            Some(_) => Verdict::Proceed,
            None => {
                tracing::debug!("Access denied to field '{}' for anonymous request", field);
                Verdict::Reject(GraphError::AccessDenied)
            }
        }
    }
}

/// Run `chain` in order, stopping at the first rejection
pub fn run_chain(chain: &[InterceptorBox], ctx: &RequestContext, field: &str) -> Result<(), GraphError> {
    for interceptor in chain {
        if let Verdict::Reject(err) = interceptor.intercept(ctx, field) {
            tracing::debug!("Field '{}' rejected by interceptor '{}'", field, interceptor.name());
            return Err(err);
        }
    }
    Ok(())
}
