use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password, TokenAuthority, TokenPair};
use crate::database::models::NewUser;
use crate::database::{StoreError, UserStore};
use crate::graph::GraphError;

const NAME_LEN: (usize, usize) = (2, 128);
const EMAIL_MAX_LEN: usize = 255;
const PASSWORD_LEN: (usize, usize) = (6, 64);

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpInput {
    /// Field checks run in declaration order; the first failure is reported
    pub fn validate(&self) -> Result<(), GraphError> {
        if !within(&self.name, NAME_LEN) {
            return Err(GraphError::Validation { field: "Name" });
        }
        if !is_valid_email(&self.email) {
            return Err(GraphError::Validation { field: "Email" });
        }
        if !within(&self.password, PASSWORD_LEN) {
            return Err(GraphError::Validation { field: "Password" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResult {
    pub is_created: bool,
}

fn within(value: &str, (min, max): (usize, usize)) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Single `@`, non-empty local part, dotted domain without empty labels
fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Sign-up, sign-in and session refresh
pub struct AuthService {
    users: Arc<dyn UserStore>,
    authority: Arc<TokenAuthority>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, authority: Arc<TokenAuthority>) -> Self {
        Self { users, authority }
    }

    pub async fn sign_up(&self, input: SignUpInput) -> Result<SignUpResult, GraphError> {
        input.validate()?;

        let email = input.email.to_lowercase();
        match self.users.find_by_email(&email).await {
            Ok(_) => return Err(GraphError::EmailAlreadyExists),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }

        let password_hash = hash_password(&input.password)?;
        let created = self
            .users
            .create(NewUser {
                name: input.name,
                email,
                password_hash,
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!("User {} signed up", user.id);
                Ok(SignUpResult { is_created: true })
            }
            // Lost a race with a concurrent sign-up for the same email
            Err(StoreError::Conflict(_)) => Err(GraphError::EmailAlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair, GraphError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(err) if err.is_not_found() => {
                tracing::warn!("Sign-in failed: unknown email");
                return Err(GraphError::EmailNotFound);
            }
            Err(err) => return Err(err.into()),
        };

        if !verify_password(&user.password_hash, password) {
            tracing::warn!("Sign-in failed: bad password for user {}", user.id);
            return Err(GraphError::InvalidPassword);
        }

        let pair = self.authority.issue_token_pair(user.id, Utc::now())?;
        tracing::info!("User {} signed in", user.id);
        Ok(pair)
    }

    /// Trade a refresh token for a new pair. The subject is not re-checked
    /// against the store, matching access-token validation.
    pub fn refresh_session(&self, refresh_token: &str) -> Result<TokenPair, GraphError> {
        Ok(self.authority.refresh(refresh_token, Utc::now())?)
    }
}
