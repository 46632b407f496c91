//! Configuration loading and resolution
//!
//! Each service resolves its settings with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`dlens/config.toml` in the platform config dir,
//!    with one section per service)
//! 4. Compiled default (fallback)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Per-service settings after resolution
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Port the service binds on 127.0.0.1
    pub port: u16,
    /// Base URL of the external backend this service talks to
    pub backend_url: String,
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.port)
    }
}

/// One service section of the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
struct TomlSection {
    port: Option<u16>,
    backend_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    explorer: TomlSection,
    #[serde(default)]
    annotate: TomlSection,
}

/// Resolver for one service's configuration
pub struct ConfigResolver {
    /// Section name in the TOML file ("explorer" or "annotate")
    section: &'static str,
    /// Environment variable prefix (e.g. "DLENS_EX")
    env_prefix: &'static str,
    /// Compiled default port
    default_port: u16,
    /// Compiled default backend URL
    default_backend: &'static str,
}

impl ConfigResolver {
    pub fn new(
        section: &'static str,
        env_prefix: &'static str,
        default_port: u16,
        default_backend: &'static str,
    ) -> Self {
        Self {
            section,
            env_prefix,
            default_port,
            default_backend,
        }
    }

    /// Resolve the service configuration.
    ///
    /// CLI values win over environment variables, which win over the
    /// TOML config file, which wins over compiled defaults. A missing
    /// or unreadable config file is not an error.
    pub fn resolve(&self, cli_port: Option<u16>, cli_backend: Option<String>) -> ServiceConfig {
        let section = self.load_toml_section();

        let port = cli_port
            .or_else(|| {
                std::env::var(format!("{}_PORT", self.env_prefix))
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .or(section.port)
            .unwrap_or(self.default_port);

        let backend_url = cli_backend
            .or_else(|| std::env::var(format!("{}_BACKEND_URL", self.env_prefix)).ok())
            .or(section.backend_url)
            .unwrap_or_else(|| self.default_backend.to_string());

        ServiceConfig { port, backend_url }
    }

    fn load_toml_section(&self) -> TomlSection {
        let Ok(path) = config_file_path() else {
            return TomlSection::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return TomlSection::default();
        };
        match toml::from_str::<TomlConfig>(&content) {
            Ok(config) => {
                debug!("Loaded config file {}", path.display());
                match self.section {
                    "annotate" => config.annotate,
                    _ => config.explorer,
                }
            }
            Err(e) => {
                debug!("Ignoring malformed config file {}: {}", path.display(), e);
                TomlSection::default()
            }
        }
    }
}

/// Locate the configuration file for the platform.
///
/// Linux additionally falls back to /etc/dlens/config.toml when no
/// user-level file exists.
pub fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("dlens").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/dlens/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment-variable tests live in tests/config_tests.rs behind
    // serial_test; these only cover pure precedence logic.

    #[test]
    fn test_cli_wins_over_default() {
        let resolver = ConfigResolver::new("explorer", "DLENS_TEST_NOENV", 5740, "http://localhost:8000");
        let config = resolver.resolve(Some(9000), Some("http://example.com".to_string()));
        assert_eq!(config.port, 9000);
        assert_eq!(config.backend_url, "http://example.com");
    }

    #[test]
    fn test_defaults_apply_when_nothing_set() {
        let resolver =
            ConfigResolver::new("explorer", "DLENS_TEST_NOENV2", 5740, "http://localhost:8000");
        let config = resolver.resolve(None, None);
        assert_eq!(config.port, 5740);
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:5740");
    }
}
