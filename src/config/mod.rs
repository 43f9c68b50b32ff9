use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::auth::{AuthError, TokenLifetimes};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub server_name: String,
    pub current_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string; `None` selects the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub access_token_lifetime_secs: i64,
    pub refresh_token_lifetime_secs: i64,
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
}

pub const DEFAULT_PRIVATE_KEY_PATH: &str = "rsa_keys/private_key.pem";
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "rsa_keys/public_key.pem";

impl JwtConfig {
    /// Checked lifetimes; out-of-range values from the environment are an error, not a panic
    pub fn token_lifetimes(&self) -> Result<TokenLifetimes, AuthError> {
        TokenLifetimes::from_secs(self.access_token_lifetime_secs, self.refresh_token_lifetime_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("TODO_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_NAME") {
            self.server.server_name = v;
        }
        if let Ok(v) = env::var("CURRENT_DOMAIN") {
            self.server.current_domain = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // JWT overrides
        if let Ok(v) = env::var("JWT_ACCESS_TOKEN_LIFETIME_SECS") {
            self.jwt.access_token_lifetime_secs = v.parse().unwrap_or(self.jwt.access_token_lifetime_secs);
        }
        if let Ok(v) = env::var("JWT_REFRESH_TOKEN_LIFETIME_SECS") {
            self.jwt.refresh_token_lifetime_secs = v.parse().unwrap_or(self.jwt.refresh_token_lifetime_secs);
        }
        if let Ok(v) = env::var("JWT_PRIVATE_KEY_PATH") {
            if !v.is_empty() {
                self.jwt.private_key_path = PathBuf::from(v);
            }
        }
        if let Ok(v) = env::var("JWT_PUBLIC_KEY_PATH") {
            if !v.is_empty() {
                self.jwt.public_key_path = PathBuf::from(v);
            }
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        self
    }

    fn default_jwt(access_secs: i64, refresh_secs: i64) -> JwtConfig {
        JwtConfig {
            access_token_lifetime_secs: access_secs,
            refresh_token_lifetime_secs: refresh_secs,
            private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
            public_key_path: PathBuf::from(DEFAULT_PUBLIC_KEY_PATH),
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8080,
                server_name: "todo-service".to_string(),
                current_domain: "localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            jwt: Self::default_jwt(15 * 60, 7 * 24 * 3600),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig { enable_cors: true },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 8080,
                server_name: "todo-service-staging".to_string(),
                current_domain: "staging.example.com".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            jwt: Self::default_jwt(15 * 60, 3 * 24 * 3600),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 512 * 1024,
            },
            security: SecurityConfig { enable_cors: true },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                server_name: "todo-service".to_string(),
                current_domain: "api.example.com".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            jwt: Self::default_jwt(5 * 60, 24 * 3600),
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig { enable_cors: true },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
