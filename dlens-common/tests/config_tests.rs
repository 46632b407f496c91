//! Environment and config-file precedence tests.
//!
//! These mutate process environment variables, so they run serially.
//! The config file is placed under a temporary XDG_CONFIG_HOME.

use serial_test::serial;
use tempfile::TempDir;

use dlens_common::config::ConfigResolver;

struct EnvGuard {
    keys: Vec<String>,
}

impl EnvGuard {
    fn set(pairs: &[(&str, &str)]) -> Self {
        for (key, value) in pairs {
            std::env::set_var(key, value);
        }
        Self {
            keys: pairs.iter().map(|(k, _)| k.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.keys {
            std::env::remove_var(key);
        }
    }
}

fn config_home_with(content: &str) -> TempDir {
    let dir = TempDir::new().expect("Should create temp dir");
    let dlens_dir = dir.path().join("dlens");
    std::fs::create_dir_all(&dlens_dir).expect("Should create config dir");
    std::fs::write(dlens_dir.join("config.toml"), content).expect("Should write config file");
    dir
}

#[test]
#[serial]
fn test_env_wins_over_default() {
    // an empty config home keeps a developer's real config file out
    let dir = TempDir::new().expect("Should create temp dir");
    let _guard = EnvGuard::set(&[
        ("XDG_CONFIG_HOME", dir.path().to_str().unwrap()),
        ("DLENS_T1_PORT", "6100"),
        ("DLENS_T1_BACKEND_URL", "http://env.example"),
    ]);
    let resolver = ConfigResolver::new("explorer", "DLENS_T1", 5740, "http://localhost:8000");
    let config = resolver.resolve(None, None);
    assert_eq!(config.port, 6100);
    assert_eq!(config.backend_url, "http://env.example");
}

#[test]
#[serial]
fn test_cli_wins_over_env() {
    let _guard = EnvGuard::set(&[("DLENS_T2_PORT", "6100")]);
    let resolver = ConfigResolver::new("explorer", "DLENS_T2", 5740, "http://localhost:8000");
    let config = resolver.resolve(Some(6200), None);
    assert_eq!(config.port, 6200);
}

#[test]
#[serial]
fn test_malformed_env_port_is_ignored() {
    let _guard = EnvGuard::set(&[("DLENS_T3_PORT", "not-a-port")]);
    let resolver = ConfigResolver::new("explorer", "DLENS_T3", 5740, "http://localhost:8000");
    let config = resolver.resolve(None, None);
    assert_eq!(config.port, 5740);
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_config_file_section_applies() {
    let dir = config_home_with(
        "[explorer]\nport = 6300\n\n[annotate]\nbackend_url = \"http://file.example\"\n",
    );
    let _guard = EnvGuard::set(&[("XDG_CONFIG_HOME", dir.path().to_str().unwrap())]);

    let explorer = ConfigResolver::new("explorer", "DLENS_T4", 5740, "http://localhost:8000");
    let config = explorer.resolve(None, None);
    assert_eq!(config.port, 6300);
    assert_eq!(config.backend_url, "http://localhost:8000");

    let annotate = ConfigResolver::new("annotate", "DLENS_T4", 5741, "http://localhost:5000");
    let config = annotate.resolve(None, None);
    assert_eq!(config.port, 5741);
    assert_eq!(config.backend_url, "http://file.example");
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_env_wins_over_config_file() {
    let dir = config_home_with("[explorer]\nport = 6300\n");
    let _guard = EnvGuard::set(&[
        ("XDG_CONFIG_HOME", dir.path().to_str().unwrap()),
        ("DLENS_T5_PORT", "6400"),
    ]);
    let resolver = ConfigResolver::new("explorer", "DLENS_T5", 5740, "http://localhost:8000");
    let config = resolver.resolve(None, None);
    assert_eq!(config.port, 6400);
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_malformed_config_file_is_ignored() {
    let dir = config_home_with("this is not toml [");
    let _guard = EnvGuard::set(&[("XDG_CONFIG_HOME", dir.path().to_str().unwrap())]);
    let resolver = ConfigResolver::new("explorer", "DLENS_T6", 5740, "http://localhost:8000");
    let config = resolver.resolve(None, None);
    assert_eq!(config.port, 5740);
}
