//! Configuration for scaffold-plugins
//!
//! Read from a TOML file. Every field has a default so an empty file, or no
//! file at all, is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::design::DesignError;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub design: DesignConfig,
    pub kit: KitConfig,
    pub logger: LoggerConfig,
}

/// Where the design document lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// Design document, overridden by `--design` on the command line
    pub path: Option<PathBuf>,
}

/// Settings of the toolkit adapter plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    /// Endpoint type emitted by the framework
    pub framework_endpoint: String,
    /// Toolkit endpoint type replacing it
    pub endpoint_type: String,
    pub endpoint_import: String,
    pub logger_import: String,
    pub http_transport_import: String,
    /// Import alias of the HTTP transport package
    pub http_transport_alias: String,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            framework_endpoint: "goa.Endpoint".to_string(),
            endpoint_type: "endpoint.Endpoint".to_string(),
            endpoint_import: "github.com/go-kit/kit/endpoint".to_string(),
            logger_import: "github.com/go-kit/kit/log".to_string(),
            http_transport_import: "github.com/go-kit/kit/transport/http".to_string(),
            http_transport_alias: "kithttp".to_string(),
        }
    }
}

/// Settings of the structured logger plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Package name of the generated logger adapter, also its directory under the gen package
    pub package: String,
    /// File name of the generated adapter
    pub file_name: String,
    /// Import path of the structured logging library the adapter wraps. The
    /// adapter calls the zap API, so this must be zap or a fork of it.
    pub library_import: String,
    /// Package name the library is referenced by in the adapter
    pub library_alias: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            package: "log".to_string(),
            file_name: "logger.go".to_string(),
            library_import: "go.uber.org/zap".to_string(),
            library_alias: "zap".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, DesignError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file
    pub async fn load(path: &Path) -> Result<Self, DesignError> {
        debug!(path = %path.display(), "Loading configuration");
        let content = fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    /// Design document to load, preferring the command line over the file
    pub fn design_path(&self, cli: Option<&Path>) -> Option<PathBuf> {
        cli.map(Path::to_path_buf).or_else(|| self.design.path.clone())
    }
}
