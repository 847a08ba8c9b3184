use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "case-portal";

#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    /// Base URL of the case service API, without a trailing slash.
    pub api_base_url: String,
    /// Applies to every API round-trip; an elapsed timeout counts as a
    /// transport failure.
    pub request_timeout_ms: u64,
    pub session_file: PathBuf,
    pub login_path: String,
    pub home_path: String,
}

impl PortalConfig {
    /// Load from `case-portal.yaml` (optional) and `PORTAL__*` variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load with an explicit config file, which must then exist.
    pub fn load_from(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("api_base_url", "http://localhost:3000")?
            .set_default("request_timeout_ms", 10_000)?
            .set_default("session_file", ".case-portal/session.json")?
            .set_default("login_path", "/login")?
            .set_default("home_path", "/dashboard")?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("PORTAL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut config = settings.try_deserialize::<PortalConfig>()?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
