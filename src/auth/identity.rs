use serde::Serialize;
use uuid::Uuid;

use super::token::Claims;

/// Who is asking, as established by a validated access token.
/// Lives only as long as the request that carried the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub subject_id: Uuid,
    pub expires_at: i64,
}

impl From<Claims> for ResolvedIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.subject_id,
            expires_at: claims.expires_at,
        }
    }
}

/// Per-request session state: `Anonymous` until a valid bearer token is seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestIdentity {
    #[default]
    Anonymous,
    Identified(ResolvedIdentity),
}

impl RequestIdentity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, RequestIdentity::Anonymous)
    }
}

impl AsRef<RequestIdentity> for RequestIdentity {
    fn as_ref(&self) -> &RequestIdentity {
        self
    }
}

/// Recover the resolved identity from any request-scoped value that carries one.
/// Absence is a normal outcome; callers decide what it means.
pub fn current_identity<C: AsRef<RequestIdentity> + ?Sized>(ctx: &C) -> Option<&ResolvedIdentity> {
    match ctx.as_ref() {
        RequestIdentity::Identified(identity) => Some(identity),
        RequestIdentity::Anonymous => None,
    }
}
