//! Token Authority: issues and validates RSA-signed access/refresh token pairs.
//!
//! Tokens are compact JWTs (`header.payload.signature`). The private key only ever
//! signs and the public key only ever verifies; validity is a pure function of the
//! signature and the embedded expiry, so no store is consulted and nothing can be
//! revoked early.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, TokenRejection};

/// Algorithm used for every token this authority issues
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Algorithms accepted on verification. Anything outside the RSA PKCS#1 family is
/// refused before the signature is even looked at.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Asymmetric signing key pair, loaded once at startup and never mutated
#[derive(Clone)]
pub struct KeyPair {
    signer: EncodingKey,
    verifier: DecodingKey,
}

impl KeyPair {
    /// Build from PEM-encoded RSA keys (PKCS#1 or PKCS#8 private, SPKI or PKCS#1 public)
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, AuthError> {
        let signer = EncodingKey::from_rsa_pem(private_pem).map_err(|e| AuthError::KeyLoad {
            path: "<private key>".to_string(),
            reason: e.to_string(),
        })?;
        let verifier = DecodingKey::from_rsa_pem(public_pem).map_err(|e| AuthError::KeyLoad {
            path: "<public key>".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { signer, verifier })
    }

    /// Read both PEM files from disk
    pub fn load(private_path: &Path, public_path: &Path) -> Result<Self, AuthError> {
        let private_pem = read_pem(private_path)?;
        let public_pem = read_pem(public_path)?;

        Self::from_pem(&private_pem, &public_pem).map_err(|e| match e {
            AuthError::KeyLoad { path, reason } => {
                let path = if path == "<private key>" { private_path } else { public_path };
                AuthError::KeyLoad { path: path.display().to_string(), reason }
            }
            other => other,
        })
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, AuthError> {
    std::fs::read(path).map_err(|e| AuthError::KeyLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Which half of a pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signed token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token was issued to
    #[serde(rename = "sub")]
    pub subject_id: Uuid,
    /// Unix seconds after which the token is no longer valid
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "typ")]
    pub kind: TokenKind,
}

/// Access + refresh token issued together at sign-in. Not stored anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: i64,
    pub refresh_expires_at: i64,
}

/// Longest lifetime either half of a pair may be given
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 366 * 24 * 3600;

/// Fixed token lifetimes, taken from configuration. Both are at least one second
/// and at most `MAX_TOKEN_LIFETIME_SECS`, so every issued token expires in the future.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    access: Duration,
    refresh: Duration,
}

impl TokenLifetimes {
    pub fn new(access: Duration, refresh: Duration) -> Result<Self, AuthError> {
        check_lifetime("access", access)?;
        check_lifetime("refresh", refresh)?;
        if access >= refresh {
            tracing::warn!(
                "Access token lifetime ({}s) is not shorter than refresh lifetime ({}s)",
                access.num_seconds(),
                refresh.num_seconds()
            );
        }
        Ok(Self { access, refresh })
    }

    /// Build from raw seconds as found in configuration
    pub fn from_secs(access_secs: i64, refresh_secs: i64) -> Result<Self, AuthError> {
        Self::new(seconds("access", access_secs)?, seconds("refresh", refresh_secs)?)
    }

    pub fn access(&self) -> Duration {
        self.access
    }

    pub fn refresh(&self) -> Duration {
        self.refresh
    }
}

fn seconds(kind: &str, secs: i64) -> Result<Duration, AuthError> {
    Duration::try_seconds(secs)
        .ok_or_else(|| AuthError::InvalidLifetime(format!("{} lifetime of {}s is out of range", kind, secs)))
}

fn check_lifetime(kind: &str, lifetime: Duration) -> Result<(), AuthError> {
    let secs = lifetime.num_seconds();
    if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&secs) {
        return Err(AuthError::InvalidLifetime(format!(
            "{} lifetime must be between 1s and {}s, got {}s",
            kind, MAX_TOKEN_LIFETIME_SECS, secs
        )));
    }
    Ok(())
}

/// Issues and validates token pairs. Cheap to share behind an `Arc`; every
/// operation is CPU-bound and needs no locking.
#[derive(Debug)]
pub struct TokenAuthority {
    keys: KeyPair,
    lifetimes: TokenLifetimes,
    validation: Validation,
}

impl TokenAuthority {
    pub fn new(keys: KeyPair, lifetimes: TokenLifetimes) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked against a caller-supplied instant below, with no leeway
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self { keys, lifetimes, validation }
    }

    /// Sign a fresh access/refresh pair for `subject_id`, both expiring relative to `now`
    pub fn issue_token_pair(&self, subject_id: Uuid, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let access_expires_at = expiry(now, self.lifetimes.access)?;
        let refresh_expires_at = expiry(now, self.lifetimes.refresh)?;

        let access_token = self.sign(&Claims {
            subject_id,
            expires_at: access_expires_at,
            issued_at: now.timestamp(),
            kind: TokenKind::Access,
        })?;
        let refresh_token = self.sign(&Claims {
            subject_id,
            expires_at: refresh_expires_at,
            issued_at: now.timestamp(),
            kind: TokenKind::Refresh,
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.keys.signer).map_err(|e| {
            tracing::error!("Failed to sign token for {}: {}", claims.subject_id, e);
            AuthError::InternalSigningFailure(e.to_string())
        })
    }

    /// Validate against the current clock
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Verify algorithm family, signature and expiry of `token` as of `now`
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| reject(TokenRejection::Malformed, &e))?;
        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            tracing::debug!("Token rejected: algorithm {:?} is not RSA", header.alg);
            return Err(AuthError::InvalidToken(TokenRejection::AlgorithmMismatch));
        }

        let data = decode::<Claims>(token, &self.keys.verifier, &self.validation).map_err(|e| {
            let rejection = match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => TokenRejection::AlgorithmMismatch,
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Malformed,
            };
            reject(rejection, &e)
        })?;

        if now.timestamp() >= data.claims.expires_at {
            tracing::debug!(
                "Token rejected: expired at {} (now {})",
                data.claims.expires_at,
                now.timestamp()
            );
            return Err(AuthError::InvalidToken(TokenRejection::Expired));
        }

        Ok(data.claims)
    }

    /// Validate and additionally require a specific token kind
    pub fn validate_kind_at(&self, token: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = self.validate_token_at(token, now)?;
        if claims.kind != kind {
            tracing::debug!("Token rejected: expected {:?} token, got {:?}", kind, claims.kind);
            return Err(AuthError::InvalidToken(TokenRejection::WrongKind));
        }
        Ok(claims)
    }

    /// Exchange a valid refresh token for a brand new pair
    pub fn refresh(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let claims = self.validate_kind_at(refresh_token, TokenKind::Refresh, now)?;
        self.issue_token_pair(claims.subject_id, now)
    }
}

/// `now + lifetime` as unix seconds; an instant past the calendar range is a signing failure
fn expiry(now: DateTime<Utc>, lifetime: Duration) -> Result<i64, AuthError> {
    now.checked_add_signed(lifetime).map(|at| at.timestamp()).ok_or_else(|| {
        tracing::error!("Token expiry overflows: {} + {}s", now, lifetime.num_seconds());
        AuthError::InternalSigningFailure("token expiry out of range".to_string())
    })
}

fn reject(rejection: TokenRejection, cause: &jsonwebtoken::errors::Error) -> AuthError {
    tracing::debug!("Token rejected ({}): {}", rejection, cause);
    AuthError::InvalidToken(rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PRIVATE_PEM: &[u8] = include_bytes!("../../tests/fixtures/keys/private_key.pem");
    const PUBLIC_PEM: &[u8] = include_bytes!("../../tests/fixtures/keys/public_key.pem");
    const OTHER_PRIVATE_PEM: &[u8] = include_bytes!("../../tests/fixtures/keys/other_private_key.pem");
    const OTHER_PUBLIC_PEM: &[u8] = include_bytes!("../../tests/fixtures/keys/other_public_key.pem");

    fn authority() -> TokenAuthority {
        let keys = KeyPair::from_pem(PRIVATE_PEM, PUBLIC_PEM).expect("fixture keys");
        TokenAuthority::new(keys, TokenLifetimes::new(Duration::minutes(15), Duration::days(7)).unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn assert_rejected(result: Result<Claims, AuthError>, expected: TokenRejection) {
        match result {
            Err(AuthError::InvalidToken(rejection)) => assert_eq!(rejection, expected),
            other => panic!("expected InvalidToken({expected:?}), got {other:?}"),
        }
    }

    #[test]
    fn issued_pair_carries_subject_and_expiries() {
        let authority = authority();
        let subject = Uuid::new_v4();
        let pair = authority.issue_token_pair(subject, t0()).unwrap();

        assert_eq!(pair.access_expires_at, t0().timestamp() + 15 * 60);
        assert_eq!(pair.refresh_expires_at, t0().timestamp() + 7 * 24 * 3600);
        assert_ne!(pair.access_token, pair.refresh_token);

        let access = authority.validate_token_at(&pair.access_token, t0()).unwrap();
        assert_eq!(access.subject_id, subject);
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.expires_at, pair.access_expires_at);

        let refresh = authority.validate_token_at(&pair.refresh_token, t0()).unwrap();
        assert_eq!(refresh.subject_id, subject);
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }

    #[test]
    fn access_token_valid_until_lifetime_elapses() {
        let authority = authority();
        let subject = Uuid::new_v4();
        let pair = authority.issue_token_pair(subject, t0()).unwrap();

        let just_before = t0() + Duration::minutes(14) + Duration::seconds(59);
        let claims = authority.validate_token_at(&pair.access_token, just_before).unwrap();
        assert_eq!(claims.subject_id, subject);

        let at_expiry = t0() + Duration::minutes(15);
        assert_rejected(authority.validate_token_at(&pair.access_token, at_expiry), TokenRejection::Expired);

        let just_after = t0() + Duration::minutes(15) + Duration::seconds(1);
        assert_rejected(authority.validate_token_at(&pair.access_token, just_after), TokenRejection::Expired);

        // Refresh half of the same pair outlives the access half
        assert!(authority.validate_token_at(&pair.refresh_token, just_after).is_ok());
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let foreign_keys = KeyPair::from_pem(OTHER_PRIVATE_PEM, OTHER_PUBLIC_PEM).unwrap();
        let foreign = TokenAuthority::new(foreign_keys, TokenLifetimes::new(Duration::minutes(15), Duration::days(7)).unwrap());
        let pair = foreign.issue_token_pair(Uuid::new_v4(), t0()).unwrap();

        assert_rejected(authority().validate_token_at(&pair.access_token, t0()), TokenRejection::BadSignature);
    }

    #[test]
    fn flipped_payload_byte_is_rejected() {
        let authority = authority();
        let pair = authority.issue_token_pair(Uuid::new_v4(), t0()).unwrap();

        let parts: Vec<&str> = pair.access_token.split('.').collect();
        let mut payload = parts[1].as_bytes().to_vec();
        let idx = payload.len() / 2;
        payload[idx] = if payload[idx] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{}.{}.{}", parts[0], String::from_utf8(payload).unwrap(), parts[2]);

        match authority.validate_token_at(&tampered, t0()) {
            Err(AuthError::InvalidToken(_)) => {}
            other => panic!("tampered token accepted: {other:?}"),
        }
    }

    #[test]
    fn hmac_substitution_is_rejected() {
        let authority = authority();
        let claims = Claims {
            subject_id: Uuid::new_v4(),
            expires_at: t0().timestamp() + 600,
            issued_at: t0().timestamp(),
            kind: TokenKind::Access,
        };
        // Classic forgery: sign with HS256 using the public key as the shared secret
        let forged = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(PUBLIC_PEM)).unwrap();

        assert_rejected(authority.validate_token_at(&forged, t0()), TokenRejection::AlgorithmMismatch);
    }

    #[test]
    fn none_algorithm_is_rejected() {
        let authority = authority();
        let pair = authority.issue_token_pair(Uuid::new_v4(), t0()).unwrap();
        let payload = pair.access_token.split('.').nth(1).unwrap();
        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{payload}.");

        match authority.validate_token_at(&unsigned, t0()) {
            Err(AuthError::InvalidToken(rejection)) => assert_ne!(rejection, TokenRejection::Expired),
            other => panic!("unsigned token accepted: {other:?}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let authority = authority();
        assert_rejected(authority.validate_token_at("abc", t0()), TokenRejection::Malformed);
        assert_rejected(authority.validate_token_at("", t0()), TokenRejection::Malformed);
    }

    #[test]
    fn refresh_requires_refresh_kind() {
        let authority = authority();
        let subject = Uuid::new_v4();
        let pair = authority.issue_token_pair(subject, t0()).unwrap();

        let later = t0() + Duration::hours(1);
        let renewed = authority.refresh(&pair.refresh_token, later).unwrap();
        let claims = authority.validate_token_at(&renewed.access_token, later).unwrap();
        assert_eq!(claims.subject_id, subject);
        assert_eq!(renewed.access_expires_at, later.timestamp() + 15 * 60);

        match authority.refresh(&pair.access_token, t0()) {
            Err(AuthError::InvalidToken(TokenRejection::WrongKind)) => {}
            other => panic!("access token accepted as refresh token: {other:?}"),
        }
    }

    #[test]
    fn fresh_token_validates_against_clock() {
        let authority = authority();
        let subject = Uuid::new_v4();
        let pair = authority.issue_token_pair(subject, Utc::now()).unwrap();

        let claims = authority.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.subject_id, subject);
        assert_eq!(claims.kind, TokenKind::Access);

        // Issued long ago, so already expired by the real clock
        let stale = authority.issue_token_pair(subject, t0()).unwrap();
        assert_rejected(authority.validate_token(&stale.access_token), TokenRejection::Expired);
    }

    #[test]
    fn non_positive_lifetimes_rejected() {
        for (access, refresh) in [
            (Duration::zero(), Duration::days(7)),
            (Duration::minutes(15), Duration::zero()),
            (Duration::seconds(-60), Duration::days(7)),
            (Duration::milliseconds(500), Duration::days(7)),
        ] {
            assert!(matches!(
                TokenLifetimes::new(access, refresh),
                Err(AuthError::InvalidLifetime(_))
            ));
        }
    }

    #[test]
    fn oversized_lifetimes_rejected_without_panic() {
        assert!(matches!(
            TokenLifetimes::new(Duration::minutes(15), Duration::seconds(MAX_TOKEN_LIFETIME_SECS + 1)),
            Err(AuthError::InvalidLifetime(_))
        ));
        assert!(matches!(
            TokenLifetimes::from_secs(900, 10_000_000_000_000),
            Err(AuthError::InvalidLifetime(_))
        ));
        assert!(matches!(
            TokenLifetimes::from_secs(i64::MAX, 900),
            Err(AuthError::InvalidLifetime(_))
        ));

        let longest = TokenLifetimes::from_secs(1, MAX_TOKEN_LIFETIME_SECS).unwrap();
        assert_eq!(longest.access(), Duration::seconds(1));
        assert_eq!(longest.refresh(), Duration::seconds(MAX_TOKEN_LIFETIME_SECS));
    }

    #[test]
    fn shortest_lifetime_still_valid_at_issuance() {
        let keys = KeyPair::from_pem(PRIVATE_PEM, PUBLIC_PEM).unwrap();
        let authority = TokenAuthority::new(keys, TokenLifetimes::from_secs(1, 2).unwrap());
        let pair = authority.issue_token_pair(Uuid::new_v4(), t0()).unwrap();

        assert!(pair.access_expires_at > t0().timestamp());
        assert!(authority.validate_token_at(&pair.access_token, t0()).is_ok());
    }

    #[test]
    fn expiry_overflow_is_signing_failure() {
        let result = authority().issue_token_pair(Uuid::new_v4(), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(AuthError::InternalSigningFailure(_))));
    }

    #[test]
    fn garbage_pem_fails_to_load() {
        let result = KeyPair::from_pem(b"not a pem file", PUBLIC_PEM);
        assert!(matches!(result, Err(AuthError::KeyLoad { .. })));
    }

    #[test]
    fn missing_key_file_reports_path() {
        let result = KeyPair::load(Path::new("does/not/exist.pem"), Path::new("nope.pem"));
        match result {
            Err(AuthError::KeyLoad { path, .. }) => assert_eq!(path, "does/not/exist.pem"),
            other => panic!("expected KeyLoad, got {other:?}"),
        }
    }
}
