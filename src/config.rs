//! Credential configuration.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SUBFEED_CLIENT_ID, SUBFEED_API_KEY)
//! 2. Config file (.subfeed/config.yaml)
//! 3. Nothing; missing or placeholder values leave the sign-in
//!    affordance disabled instead of attempting a doomed network call
//!
//! Config file discovery:
//! - Searches current directory and parents for .subfeed/config.yaml
//! - Falls back to ~/.subfeed/config.yaml

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::CATALOG_SCOPE;

/// Global cached configuration (stores Result to handle load errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Values that mark a credential as "not filled in yet".
const PLACEHOLDER_MARKERS: &[&str] = &["YOUR_", "CHANGE_ME", "PLACEHOLDER", "REPLACE"];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configuration unavailable: {0}")]
    Unavailable(String),
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    /// OAuth client identifier
    pub client_id: Option<String>,
    /// Catalog API key
    pub api_key: Option<String>,
}

/// The two required secrets plus the fixed read-only scope.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub api_key: String,
    pub scope: String,
}

impl Credentials {
    /// Whether both secrets look like real values. Empty or placeholder
    /// values disable sign-in instead of failing later on the network.
    pub fn is_configured(&self) -> bool {
        usable(&self.client_id) && usable(&self.api_key)
    }
}

fn usable(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    let upper = value.to_uppercase();
    !PLACEHOLDER_MARKERS.iter().any(|m| upper.contains(m))
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents, then
/// the home directory.
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".subfeed").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                break;
            }
        }
    }

    let home_config = dirs::home_dir()?.join(".subfeed").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig, ConfigError> {
    let config_file = find_config_file();

    let file_credentials = if let Some(ref path) = config_file {
        load_config_file(path)?.credentials
    } else {
        CredentialsConfig::default()
    };

    let client_id = std::env::var("SUBFEED_CLIENT_ID")
        .ok()
        .or(file_credentials.client_id)
        .unwrap_or_default();

    let api_key = std::env::var("SUBFEED_API_KEY")
        .ok()
        .or(file_credentials.api_key)
        .unwrap_or_default();

    Ok(ResolvedConfig {
        credentials: Credentials {
            client_id,
            api_key,
            scope: CATALOG_SCOPE.to_string(),
        },
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig, ConfigError> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => Err(ConfigError::Unavailable(e.clone())),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig, ConfigError> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn credentials(client_id: &str, api_key: &str) -> Credentials {
        Credentials {
            client_id: client_id.to_string(),
            api_key: api_key.to_string(),
            scope: CATALOG_SCOPE.to_string(),
        }
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let subfeed_dir = temp.path().join(".subfeed");
        std::fs::create_dir_all(&subfeed_dir).unwrap();

        let config_path = subfeed_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
credentials:
  client_id: 1234567890-abc123.apps.googleusercontent.com
  api_key: AIzaExampleKey
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(
            config.credentials.client_id.as_deref(),
            Some("1234567890-abc123.apps.googleusercontent.com")
        );
        assert_eq!(config.credentials.api_key.as_deref(), Some("AIzaExampleKey"));
    }

    #[test]
    fn test_config_file_without_credentials_section() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "version: \"1.0\"\n").unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert!(config.credentials.client_id.is_none());
        assert!(config.credentials.api_key.is_none());
    }

    #[test]
    fn test_malformed_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "version: [not\n").unwrap();

        assert!(matches!(
            load_config_file(&config_path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_placeholder_credentials_disable_sign_in() {
        assert!(!credentials("", "").is_configured());
        assert!(!credentials("YOUR_CLIENT_ID", "AIzaReal").is_configured());
        assert!(!credentials("123-abc.apps.googleusercontent.com", "REPLACE_ME").is_configured());
        assert!(!credentials("   ", "AIzaReal").is_configured());
    }

    #[test]
    fn test_real_looking_credentials_enable_sign_in() {
        assert!(credentials("123-abc.apps.googleusercontent.com", "AIzaExampleKey").is_configured());
    }
}
