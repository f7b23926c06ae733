//! Configuration Types
//!
//! serde-backed configuration for the appdock host.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppdockConfig {
    /// Server-wide settings
    pub server: ServerConfig,

    /// HTTP listeners brought up at startup
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,

    /// Web apps mounted at startup
    #[serde(default)]
    pub apps: Vec<AppMountConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported in startup logs
    pub name: String,
}

/// One HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Stable listener id, unique across the configuration
    pub id: String,

    /// "http" or "https"
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Bind host
    pub host: String,

    /// Bind port; 0 lets the OS pick one (useful in tests)
    pub port: u16,
}

/// A web app mounted at startup, served by the built-in status handler.
/// Hosts embedding appdock as a library register their own handlers
/// instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMountConfig {
    pub name: String,
    pub context_path: String,
}

/// Logging section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log to stderr
    pub console: bool,

    /// Log to a rolling file under `dir`
    pub file: bool,

    /// Directory for file logs
    pub dir: String,
}

fn default_scheme() -> String {
    "http".to_string()
}

impl Default for AppdockConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "appdock".to_string(),
            },
            listeners: vec![ListenerConfig {
                id: "http-8080".to_string(),
                scheme: "http".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8080,
            }],
            apps: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            file: false,
            dir: "logs".to_string(),
        }
    }
}

impl AppdockConfig {
    /// Check cross-field invariants the type system cannot express.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for listener in &self.listeners {
            if listener.id.is_empty() {
                return Err("listener id must not be empty".to_string());
            }
            if !seen.insert(&listener.id) {
                return Err(format!("duplicate listener id '{}'", listener.id));
            }
            if !listener.scheme.eq_ignore_ascii_case("http")
                && !listener.scheme.eq_ignore_ascii_case("https")
            {
                return Err(format!(
                    "listener '{}' has unsupported scheme '{}'",
                    listener.id, listener.scheme
                ));
            }
        }

        for app in &self.apps {
            if app.name.is_empty() {
                return Err("app name must not be empty".to_string());
            }
            if !app.context_path.starts_with('/') {
                return Err(format!(
                    "app '{}' context path '{}' must start with '/'",
                    app.name, app.context_path
                ));
            }
        }
        Ok(())
    }

    /// Render a commented sample configuration file.
    pub fn sample() -> String {
        let mut config = Self::default();
        config.listeners.push(ListenerConfig {
            id: "https-8443".to_string(),
            scheme: "https".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8443,
        });
        config.apps.push(AppMountConfig {
            name: "shop".to_string(),
            context_path: "/shop".to_string(),
        });

        let toml_content = toml::to_string_pretty(&config)
            .expect("default configuration always serializes");
        format!(
            "# appdock configuration file\n\
             #\n\
             # Save as appdock.toml next to the binary, or pass --config.\n\
             # Every value can be overridden with APPDOCK_-prefixed\n\
             # environment variables (e.g. APPDOCK_LOGGING__LEVEL=debug).\n\n\
             {}",
            toml_content
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppdockConfig::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_listener_ids_are_rejected() {
        let mut config = AppdockConfig::default();
        config.listeners.push(config.listeners[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        let mut config = AppdockConfig::default();
        config.listeners[0].scheme = "ftp".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_context_path_must_be_absolute() {
        let mut config = AppdockConfig::default();
        config.apps.push(AppMountConfig {
            name: "shop".to_string(),
            context_path: "shop".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_round_trips() {
        let sample = AppdockConfig::sample();
        let parsed: AppdockConfig = toml::from_str(&sample).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.listeners.len(), 2);
        assert_eq!(parsed.apps[0].name, "shop");
    }
}
