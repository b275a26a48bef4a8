//! Application settings loaded from environment variables.

use std::env;

use common::{
    AppError, AppResult, CacheConfig, DatabaseConfig, JwtConfig, ServiceConfig, SmtpConfig,
};

use super::constants::{
    DEFAULT_APP_NAME, DEFAULT_APP_URL, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_DATABASE_URL,
    DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SMTP_FROM, DEFAULT_SMTP_PORT, MIN_JWT_SECRET_LENGTH,
};

/// How notification emails leave the API process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailDelivery {
    /// Send (or log) inline from the request
    Direct,
    /// Push onto the job queue for `jobs work`
    Queue,
}

impl From<&str> for EmailDelivery {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "queue" => EmailDelivery::Queue,
            _ => EmailDelivery::Direct,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub email_delivery: EmailDelivery,
    /// Public URL linked from emails
    pub app_url: String,
    /// Product name shown in emails
    pub app_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in release builds or is too short.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let service = ServiceConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ..ServiceConfig::default()
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            ..DatabaseConfig::default()
        };

        let cache = CacheConfig {
            url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            default_ttl_seconds: parse_var("CACHE_TTL_SECONDS").unwrap_or(DEFAULT_CACHE_TTL_SECONDS),
        };

        let jwt = JwtConfig {
            secret,
            expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
        };

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            port: parse_var("SMTP_PORT").unwrap_or(DEFAULT_SMTP_PORT),
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            from_email: env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| DEFAULT_SMTP_FROM.to_string()),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string()),
            use_tls: env::var("SMTP_USE_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        };

        Ok(Self {
            service,
            database,
            cache,
            jwt,
            smtp,
            email_delivery: env::var("EMAIL_DELIVERY")
                .map(|v| EmailDelivery::from(v.as_str()))
                .unwrap_or(EmailDelivery::Direct),
            app_url: env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string()),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string()),
        })
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt.secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
impl Config {
    /// Configuration for unit tests, no environment involved.
    pub fn for_tests() -> Self {
        Self {
            service: ServiceConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            jwt: JwtConfig {
                secret: "test-secret-key-for-testing-only-32chars".to_string(),
                expiration_hours: 1,
            },
            smtp: SmtpConfig::default(),
            email_delivery: EmailDelivery::Direct,
            app_url: DEFAULT_APP_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_delivery_parsing() {
        assert_eq!(EmailDelivery::from("queue"), EmailDelivery::Queue);
        assert_eq!(EmailDelivery::from("QUEUE"), EmailDelivery::Queue);
        assert_eq!(EmailDelivery::from("direct"), EmailDelivery::Direct);
        assert_eq!(EmailDelivery::from(""), EmailDelivery::Direct);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::for_tests();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("test-secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(Config::for_tests().server_addr(), "0.0.0.0:3000");
    }
}
