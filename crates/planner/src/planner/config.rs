/// Configuration for the planner server
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::Result;

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Organized schedule JSON document
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// SQLite catalog store; used instead of `catalog_path` when set
    #[serde(default)]
    pub catalog_db: Option<PathBuf>,

    /// Term whose rows are loaded from `catalog_db`
    #[serde(default = "default_term")]
    pub term: String,

    /// How long an untouched planning session is kept
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("static/Time_Schedules.json")
}

fn default_term() -> String {
    "current".to_string()
}

fn default_session_ttl_secs() -> u64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    1024
}

impl PlannerConfig {
    /// Loads the configuration from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the config file
    ///
    /// # Returns
    /// * `Ok(PlannerConfig)` - Loaded configuration, with defaults for missing fields
    /// * `Err` - If the file can't be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PlannerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            address: default_address(),
            port: default_port(),
            catalog_path: default_catalog_path(),
            catalog_db: None,
            term: default_term(),
            session_ttl_secs: default_session_ttl_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 8080, "catalog_db": "catalog.db"}}"#).unwrap();

        let config = PlannerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.catalog_db, Some(PathBuf::from("catalog.db")));
        assert_eq!(config.session_ttl(), Duration::from_secs(1800));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(PlannerConfig::load_from_file(Path::new("/nonexistent/planner.json")).is_err());
    }
}
