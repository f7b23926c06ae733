//! Configuration loading: defaults, file, environment.

use anyhow::{Context, Result};
use config::{Config, Environment, File};

use super::types::AppdockConfig;

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    config_file: Option<String>,
    load_env: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_file: None,
            load_env: false,
        }
    }

    /// Load configuration from an explicit file instead of the standard
    /// locations
    pub fn load_from_file(mut self, path: Option<&str>) -> Self {
        self.config_file = path.map(String::from);
        self
    }

    /// Layer `APPDOCK_`-prefixed environment variables on top
    pub fn load_from_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<AppdockConfig> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&AppdockConfig::default())?);

        if let Some(config_path) = &self.config_file {
            builder = builder.add_source(File::with_name(config_path));
        } else {
            builder = builder
                .add_source(File::with_name("appdock").required(false))
                .add_source(File::with_name("config/appdock").required(false));
        }

        if self.load_env {
            builder = builder.add_source(
                Environment::with_prefix("APPDOCK")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let config: AppdockConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .validate()
            .map_err(|reason| anyhow::anyhow!("Invalid configuration: {}", reason))?;

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_with_defaults() {
        let config = ConfigLoader::new().build().unwrap();
        assert_eq!(config.server.name, "appdock");
        assert_eq!(config.listeners.len(), 1);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
            [server]
            name = "edge"

            [[listeners]]
            id = "http-9090"
            host = "0.0.0.0"
            port = 9090
            "#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .load_from_file(file.path().to_str())
            .build()
            .unwrap();

        assert_eq!(config.server.name, "edge");
        assert_eq!(config.listeners.len(), 1);
        assert_eq!(config.listeners[0].id, "http-9090");
        // scheme falls back to the serde default
        assert_eq!(config.listeners[0].scheme, "http");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
            [server]
            name = "edge"

            [[listeners]]
            id = "ftp-21"
            scheme = "ftp"
            host = "0.0.0.0"
            port = 21
            "#
        )
        .unwrap();

        let result = ConfigLoader::new()
            .load_from_file(file.path().to_str())
            .build();
        assert!(result.is_err());
    }
}
