use thiserror::Error;

/// Why a presented token was refused. Never shown to clients, only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Not a three-part token, bad base64, or a payload that is not our claims shape
    Malformed,
    /// Header names an algorithm outside the RSA family (HMAC, `none`, EC, ...)
    AlgorithmMismatch,
    /// Signature does not verify against the public key
    BadSignature,
    /// `now >= exp`
    Expired,
    /// A refresh token presented where an access token is required, or vice versa
    WrongKind,
}

impl std::fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            TokenRejection::Malformed => "malformed token",
            TokenRejection::AlgorithmMismatch => "signing algorithm mismatch",
            TokenRejection::BadSignature => "signature verification failed",
            TokenRejection::Expired => "token expired",
            TokenRejection::WrongKind => "wrong token kind",
        };
        f.write_str(reason)
    }
}

/// Errors raised by the session/authorization subsystem
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header must be of the form 'Bearer <token>'")]
    MalformedAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(TokenRejection),

    #[error("Token signing failed: {0}")]
    InternalSigningFailure(String),

    #[error("Failed to load signing key '{path}': {reason}")]
    KeyLoad { path: String, reason: String },

    #[error("Invalid token lifetime: {0}")]
    InvalidLifetime(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// HTTP status when this error terminates a request at the transport boundary
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedAuthHeader | AuthError::InvalidToken(_) => 401,
            AuthError::InternalSigningFailure(_)
            | AuthError::KeyLoad { .. }
            | AuthError::InvalidLifetime(_)
            | AuthError::PasswordHash(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedAuthHeader => "MALFORMED_AUTH_HEADER",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::InternalSigningFailure(_) => "INTERNAL_SIGNING_FAILURE",
            AuthError::KeyLoad { .. } => "KEY_LOAD_FAILURE",
            AuthError::InvalidLifetime(_) => "INVALID_TOKEN_LIFETIME",
            AuthError::PasswordHash(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Client-safe message; internal details stay in the logs
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MalformedAuthHeader => "Malformed Authorization header.",
            AuthError::InvalidToken(_) => "Failed to validate access token.",
            _ => "Internal Server Error",
        }
    }
}
