use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::auth::{AuthError, RequestIdentity, TokenAuthority, TokenKind};
use crate::error::ApiError;

const BEARER_SCHEME: &str = "Bearer";

/// Resolve the caller's identity from the raw `Authorization` header value.
///
/// - no header, or a blank one: `Anonymous`
/// - anything other than exactly `Bearer <token>`: `MalformedAuthHeader`
/// - a token that fails validation, or is not an access token: `InvalidToken`
pub fn resolve_identity(
    authority: &TokenAuthority,
    header: Option<&HeaderValue>,
    now: DateTime<Utc>,
) -> Result<RequestIdentity, AuthError> {
    let Some(header) = header else {
        return Ok(RequestIdentity::Anonymous);
    };
    let raw = header.to_str().map_err(|_| AuthError::MalformedAuthHeader)?;
    if raw.trim().is_empty() {
        return Ok(RequestIdentity::Anonymous);
    }
    let token = bearer_token(raw)?;
    let claims = authority.validate_kind_at(token, TokenKind::Access, now)?;
    Ok(RequestIdentity::Identified(claims.into()))
}

/// Split on single spaces; exactly two parts, the first being the scheme
fn bearer_token(raw: &str) -> Result<&str, AuthError> {
    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// Session middleware: attaches a `RequestIdentity` to every request it admits.
/// Requests without credentials pass through as anonymous.
pub async fn session_middleware(
    State(authority): State<Arc<TokenAuthority>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match resolve_identity(&authority, request.headers().get(AUTHORIZATION), Utc::now()) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), err);
            return ApiError::from(err).into_response();
        }
    };

    if let RequestIdentity::Identified(resolved) = &identity {
        tracing::debug!("Request identified as {}", resolved.subject_id);
    }
    request.extensions_mut().insert(identity);

    next.run(request).await
}
