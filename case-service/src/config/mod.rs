use secrecy::{ExposeSecret, Secret};
use service_core::config::{self as core_config, get_env, parse_env, Environment};
use service_core::error::AppError;

const DEV_TOKEN_SECRET: &str = "dev-only-token-secret-change-me";
const MIN_PROD_SECRET_LEN: usize = 32;
const MAX_EXPIRY_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct CaseServiceConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub token: TokenConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub bootstrap_admin: BootstrapAdminConfig,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret; rotating it invalidates every issued token.
    pub secret: Secret<String>,
    pub expiry_hours: i64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_attempts: u32,
    pub login_window_seconds: u64,
}

/// Account seeded into the user directory at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: Secret<String>,
    pub name: String,
}

impl CaseServiceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let environment: Environment = get_env("ENVIRONMENT", Some("dev"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = CaseServiceConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("case-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: std::env::var("OTLP_ENDPOINT")
                .ok()
                .filter(|endpoint| !endpoint.trim().is_empty()),
            token: TokenConfig {
                secret: Secret::new(get_env("TOKEN_SECRET", Some(DEV_TOKEN_SECRET), is_prod)?),
                expiry_hours: parse_env("TOKEN_EXPIRY_HOURS", Some("168"), is_prod)?,
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:5173"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
            rate_limit: RateLimitConfig {
                login_attempts: parse_env("RATE_LIMIT_LOGIN_ATTEMPTS", Some("5"), is_prod)?,
                login_window_seconds: parse_env(
                    "RATE_LIMIT_LOGIN_WINDOW_SECONDS",
                    Some("900"),
                    is_prod,
                )?,
            },
            bootstrap_admin: BootstrapAdminConfig {
                email: get_env("BOOTSTRAP_ADMIN_EMAIL", Some("admin@lbm.com.br"), is_prod)?,
                password: Secret::new(get_env(
                    "BOOTSTRAP_ADMIN_PASSWORD",
                    Some("admin123"),
                    is_prod,
                )?),
                name: get_env("BOOTSTRAP_ADMIN_NAME", Some("Dr. Carlos Silva"), is_prod)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.token.expiry_hours <= 0 || self.token.expiry_hours > MAX_EXPIRY_HOURS {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "TOKEN_EXPIRY_HOURS must be between 1 and {}",
                MAX_EXPIRY_HOURS
            )));
        }

        if self.token.secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "TOKEN_SECRET must not be empty"
            )));
        }

        if self.environment == Environment::Prod {
            if self.token.secret.expose_secret().len() < MIN_PROD_SECRET_LEN {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "TOKEN_SECRET must be at least {} characters in production",
                    MIN_PROD_SECRET_LEN
                )));
            }

            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }
        }

        Ok(())
    }

    /// Configuration for tests and local tooling; never reads the environment.
    pub fn for_tests(secret: &str) -> Self {
        CaseServiceConfig {
            common: core_config::Config {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            environment: Environment::Dev,
            service_name: "case-service-test".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "error".to_string(),
            otlp_endpoint: None,
            token: TokenConfig {
                secret: Secret::new(secret.to_string()),
                expiry_hours: 1,
            },
            security: SecurityConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
            rate_limit: RateLimitConfig {
                login_attempts: 100,
                login_window_seconds: 60,
            },
            bootstrap_admin: BootstrapAdminConfig {
                email: "admin@lbm.com.br".to_string(),
                password: Secret::new("admin123".to_string()),
                name: "Dr. Carlos Silva".to_string(),
            },
        }
    }
}
