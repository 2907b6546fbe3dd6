//! Error types for the source-rewriting plugins

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while a plugin processes generated files
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Section {section:?} of {}: {message}", path.display())]
    Section {
        path: PathBuf,
        section: String,
        message: String,
    },
}

impl PluginError {
    pub fn section(
        path: impl Into<PathBuf>,
        section: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Section {
            path: path.into(),
            section: section.into(),
            message: message.into(),
        }
    }
}
