use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use clap::Subcommand;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{Claims, KeyPair, TokenAuthority, TokenPair};
use crate::cli::utils::{output_error, output_fields, output_success};
use crate::cli::{KeyPaths, OutputFormat};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue an access/refresh token pair for a user id")]
    Issue {
        #[arg(help = "Subject (user id) to issue the pair for")]
        subject: Uuid,
    },

    #[command(about = "Validate a token and show its claims")]
    Inspect {
        #[arg(help = "Encoded token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, keys: &KeyPaths, output_format: OutputFormat) -> anyhow::Result<()> {
    let authority = load_authority(keys)?;
    let now = Utc::now();

    match cmd {
        TokenCommands::Issue { subject } => {
            let pair = authority
                .issue_token_pair(subject, now)
                .context("failed to sign token pair")?;

            match output_format {
                OutputFormat::Json => output_success(&output_format, "Token pair issued", Some(pair_json(subject, &pair))),
                OutputFormat::Text => {
                    output_fields(&[
                        ("subject", subject.to_string()),
                        ("access_token", pair.access_token.clone()),
                        ("access_expires_at", timestamp(pair.access_expires_at)),
                        ("refresh_token", pair.refresh_token.clone()),
                        ("refresh_expires_at", timestamp(pair.refresh_expires_at)),
                    ]);
                    Ok(())
                }
            }
        }
        TokenCommands::Inspect { token } => match authority.validate_token_at(&token, now) {
            Ok(claims) => match output_format {
                OutputFormat::Json => output_success(&output_format, "Token is valid", Some(claims_json(&claims))),
                OutputFormat::Text => {
                    output_fields(&[
                        ("subject", claims.subject_id.to_string()),
                        ("kind", format!("{:?}", claims.kind).to_lowercase()),
                        ("issued_at", timestamp(claims.issued_at)),
                        ("expires_at", timestamp(claims.expires_at)),
                    ]);
                    Ok(())
                }
            },
            Err(err) => {
                output_error(&output_format, &err.to_string(), Some(err.error_code()))?;
                anyhow::bail!("token rejected")
            }
        },
    }
}

fn load_authority(keys: &KeyPaths) -> anyhow::Result<TokenAuthority> {
    let pair = KeyPair::load(&keys.private_key, &keys.public_key).context("failed to load RSA key pair")?;
    let lifetimes = crate::config::config()
        .jwt
        .token_lifetimes()
        .context("invalid token lifetime configuration")?;
    Ok(TokenAuthority::new(pair, lifetimes))
}

fn pair_json(subject: Uuid, pair: &TokenPair) -> Value {
    json!({
        "subject": subject,
        "accessToken": pair.access_token,
        "accessExpiresAt": pair.access_expires_at,
        "refreshToken": pair.refresh_token,
        "refreshExpiresAt": pair.refresh_expires_at,
    })
}

fn claims_json(claims: &Claims) -> Value {
    json!({ "claims": claims })
}

fn timestamp(secs: i64) -> String {
    match Utc.timestamp_opt(secs, 0).single() {
        Some(at) => format!("{} ({})", at.to_rfc3339(), relative(at)),
        None => secs.to_string(),
    }
}

fn relative(at: DateTime<Utc>) -> String {
    let delta = at.signed_duration_since(Utc::now()).num_seconds();
    if delta >= 0 {
        format!("in {}s", delta)
    } else {
        format!("{}s ago", -delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenKind, TokenLifetimes};
    use chrono::Duration;

    fn authority() -> TokenAuthority {
        let keys = KeyPair::from_pem(
            include_bytes!("../../../tests/fixtures/keys/private_key.pem"),
            include_bytes!("../../../tests/fixtures/keys/public_key.pem"),
        )
        .unwrap();
        TokenAuthority::new(keys, TokenLifetimes::new(Duration::minutes(15), Duration::days(7)).unwrap())
    }

    #[test]
    fn issued_pair_json_uses_wire_names() {
        let subject = Uuid::new_v4();
        let pair = authority().issue_token_pair(subject, Utc::now()).unwrap();
        let body = pair_json(subject, &pair);
        assert_eq!(body["subject"], json!(subject));
        assert_eq!(body["accessToken"], json!(pair.access_token));
        assert!(body["refreshExpiresAt"].as_i64().unwrap() > body["accessExpiresAt"].as_i64().unwrap());
    }

    #[test]
    fn inspected_claims_use_token_names() {
        let authority = authority();
        let now = Utc::now();
        let subject = Uuid::new_v4();
        let pair = authority.issue_token_pair(subject, now).unwrap();
        let claims = authority.validate_token_at(&pair.refresh_token, now).unwrap();
        assert_eq!(claims.kind, TokenKind::Refresh);

        let body = claims_json(&claims);
        assert_eq!(body["claims"]["sub"], json!(subject));
        assert_eq!(body["claims"]["typ"], "refresh");
    }

    #[test]
    fn out_of_range_timestamp_falls_back_to_raw() {
        assert_eq!(timestamp(i64::MAX), i64::MAX.to_string());
    }
}
