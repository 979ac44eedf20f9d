// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI configuration
//!
//! Read from `config.toml` in the platform config directory, or from the
//! file given with `--config`. Every key is optional.
//!
//! ```toml
//! db_path = "/home/me/.local/share/arbor/workspace.db"
//! loader = "demo"
//! load_timeout_ms = 5000
//! static_listings = "listings.json"
//!
//! [demo]
//! latency_ms = 300
//! fanout = 3
//! ```

use arbor_providers::DemoConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::commands::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot database; platform data dir when unset
    pub db_path: Option<PathBuf>,
    /// Lazy loader used by `expand`
    pub loader: String,
    /// Abandon a lazy load after this many milliseconds
    pub load_timeout_ms: Option<u64>,
    /// JSON listings served by the `static` loader
    pub static_listings: Option<PathBuf>,
    pub demo: DemoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            loader: "demo".to_string(),
            load_timeout_ms: Some(10_000),
            static_listings: None,
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "arbor", "arbor")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Load `path`, or the default location when `None`. A missing default
    /// file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&text).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.loader, "demo");
        assert_eq!(config.load_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.demo.fanout, 3);
        assert!(config.db_path.is_none());
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            r#"
            loader = "static"
            db_path = "/tmp/arbor.db"
            static_listings = "listings.json"

            [demo]
            latency_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.loader, "static");
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/arbor.db")));
        assert_eq!(config.demo.latency_ms, 0);
        assert_eq!(config.demo.fanout, 3);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Config::parse("load_timeout_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "load_timeout_ms = 250\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.load_timeout(), Some(Duration::from_millis(250)));
    }
}
