use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
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
    /// Base directory uploaded attachments are written to and served from
    pub upload_dir: PathBuf,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared HS256 secret used on the verified session path
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    /// When set, Recruiter and Super Admin tokens are accepted on their
    /// unverified claims. Turning this off verifies every role.
    pub trust_privileged_claims: bool,
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
        if let Some(v) = env::var("TALENT_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_TRUST_PRIVILEGED_CLAIMS") {
            self.security.trust_privileged_claims = v.parse().unwrap_or(self.security.trust_privileged_claims);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                upload_dir: PathBuf::from("uploads"),
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                trust_privileged_claims: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 5000,
                upload_dir: PathBuf::from("uploads"),
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                cors_origins: vec!["https://staging.example.com".to_string()],
                trust_privileged_claims: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5000,
                upload_dir: PathBuf::from("uploads"),
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                cors_origins: vec!["https://app.example.com".to_string()],
                trust_privileged_claims: true,
            },
        }
    }

    /// Development defaults with a fixed secret and upload directory.
    /// Used by tests that build a router without touching the environment.
    pub fn for_testing(upload_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::development();
        config.server.upload_dir = upload_dir.into();
        config.security.jwt_secret = "test-secret".to_string();
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.upload_dir, PathBuf::from("uploads"));
        assert!(config.security.trust_privileged_claims);
        assert!(config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.security.cors_origins, vec!["https://app.example.com".to_string()]);
    }

    #[test]
    fn test_testing_config_has_secret() {
        let config = AppConfig::for_testing("/tmp/uploads");
        assert_eq!(config.security.jwt_secret, "test-secret");
        assert_eq!(config.server.upload_dir, PathBuf::from("/tmp/uploads"));
    }
}
