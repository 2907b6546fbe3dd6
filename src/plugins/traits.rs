//! Port interfaces for the plugins

use async_trait::async_trait;
use std::fmt;

use crate::design::DesignRoot;
use crate::plugins::{GeneratedFile, PluginError};

/// Generator stage a plugin runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Generation of the `gen` package
    Gen,
    /// Generation of the example server and client
    Example,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Gen => write!(f, "gen"),
            Stage::Example => write!(f, "example"),
        }
    }
}

/// Whether a plugin runs before or after the other plugins of its stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Order {
    First,
    Last,
}

/// Rewrites or extends the files produced by a generator stage
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn stage(&self) -> Stage;

    fn order(&self) -> Order;

    /// Process the files generated so far and return the updated set
    async fn process(
        &self,
        genpkg: &str,
        root: &DesignRoot,
        files: Vec<GeneratedFile>,
    ) -> Result<Vec<GeneratedFile>, PluginError>;
}
