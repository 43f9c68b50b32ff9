use crate::auth::{RequestIdentity, ResolvedIdentity};

use super::error::GraphError;

/// Everything a resolver or interceptor may know about the current request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: RequestIdentity,
}

impl RequestContext {
    pub fn new(identity: RequestIdentity) -> Self {
        Self { identity }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Identity for resolvers that sit behind the auth guard. Reaching this
    /// anonymously means a guard is missing from the field registration.
    pub fn require_identity(&self) -> Result<&ResolvedIdentity, GraphError> {
        crate::auth::current_identity(self).ok_or_else(|| {
            tracing::error!("Guarded resolver reached without identity; check field registration");
            GraphError::internal("identity missing behind auth guard")
        })
    }
}

impl AsRef<RequestIdentity> for RequestContext {
    fn as_ref(&self) -> &RequestIdentity {
        &self.identity
    }
}
