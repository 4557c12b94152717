use std::{path::Path, time::Duration};

use api::{ClientOptions, DEFAULT_BASE_URL};
use serde::Deserialize;
use tracing::debug;

const ENV_PREFIX: &str = "CHANTIER";

/// Runtime settings: built-in defaults, then `config.json5` / `config.toml`
/// from the config directory, then `CHANTIER_*` environment variables.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// Ticks per second (spinner, banner refresh).
    pub tick_rate: f64,
    /// Frames per second.
    pub frame_rate: f64,
    /// `EnvFilter` directive for the log file, e.g. `chantier=debug`.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 15,
            tick_rate: 4.0,
            frame_rate: 30.0,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn load(config_dir: &Path) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("tick_rate", defaults.tick_rate)?
            .set_default("frame_rate", defaults.frame_rate)?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                debug!(?path, "reading configuration file");
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        builder.build()?.try_deserialize()
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        if std::env::var_os("CHANTIER_API_URL").is_none() {
            assert_eq!(config.api_url, DEFAULT_BASE_URL);
        }
        assert_eq!(config.client_options().timeout, Duration::from_secs(15));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "request_timeout_secs = 3\ntick_rate = 8.0\nlog_filter = \"debug\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.tick_rate, 8.0);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }
}
