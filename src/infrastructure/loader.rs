//! File-based design loader
//!
//! The format is chosen from the file extension: `.json` is parsed as JSON,
//! `.yaml` and `.yml` as YAML. Anything else is tried as JSON, then YAML.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::design::{DesignError, DesignRoot};
use crate::infrastructure::DesignDocument;

/// Loads design documents
#[async_trait]
pub trait DesignLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<DesignRoot, DesignError>;
}

/// Serialization format of a design document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Format named by the file extension, if any
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Some(DocumentFormat::Json),
            Some("yaml" | "yml") => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// Parse document text in the given format, or sniff it when unknown
pub fn parse_document(
    content: &str,
    format: Option<DocumentFormat>,
) -> Result<DesignDocument, DesignError> {
    let doc: DesignDocument = match format {
        Some(DocumentFormat::Json) => serde_json::from_str(content)?,
        Some(DocumentFormat::Yaml) => serde_yaml::from_str(content)?,
        None => match serde_json::from_str(content) {
            Ok(doc) => doc,
            Err(_) => serde_yaml::from_str(content)?,
        },
    };
    Ok(doc)
}

/// Loads design documents from local files
#[derive(Debug, Default)]
pub struct FileDesignLoader;

impl FileDesignLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DesignLoader for FileDesignLoader {
    async fn load(&self, path: &Path) -> Result<DesignRoot, DesignError> {
        debug!(path = %path.display(), "Loading design document");
        let content = fs::read_to_string(path).await?;
        let doc = parse_document(&content, DocumentFormat::from_path(path))?;
        doc.into_root()
    }
}
