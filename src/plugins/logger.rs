//! Structured logger plugin
//!
//! Adds the adapter that lets the generated middlewares log through a
//! structured logging library.

use std::path::PathBuf;

use async_trait::async_trait;
use tera::Context;
use tracing::info;

use crate::config::LoggerConfig;
use crate::design::DesignRoot;
use crate::plugins::templates::{self, STRUCTURED_LOGGER};
use crate::plugins::{GeneratedFile, ImportSpec, Order, Plugin, PluginError, Section, Stage};

/// Adds the structured logger adapter to the gen package
pub struct LoggerPlugin {
    config: LoggerConfig,
}

impl LoggerPlugin {
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    /// Path of the adapter relative to the output directory
    pub fn file_path(&self, genpkg: &str) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in genpkg.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.join(&self.config.package).join(&self.config.file_name)
    }

    fn library_import(&self) -> ImportSpec {
        let import = &self.config.library_import;
        let default_name = import.rsplit('/').next().unwrap_or(import);
        if default_name == self.config.library_alias {
            ImportSpec::new(import)
        } else {
            ImportSpec::named(&self.config.library_alias, import)
        }
    }

    fn logger_file(&self, genpkg: &str, root: &DesignRoot) -> Result<GeneratedFile, PluginError> {
        let mut context = Context::new();
        context.insert("api", &root.api.name);
        context.insert("lib", &self.config.library_alias);
        let source = templates::render("logger", STRUCTURED_LOGGER, &context)?;

        Ok(GeneratedFile::new(
            self.file_path(genpkg),
            vec![
                Section::header(
                    format!("{} structured logger", root.api.name),
                    &self.config.package,
                    vec![self.library_import()],
                ),
                Section::new("logger", source),
            ],
        ))
    }
}

#[async_trait]
impl Plugin for LoggerPlugin {
    fn name(&self) -> &str {
        "structured-logger"
    }

    fn stage(&self) -> Stage {
        Stage::Gen
    }

    fn order(&self) -> Order {
        Order::Last
    }

    async fn process(
        &self,
        genpkg: &str,
        root: &DesignRoot,
        mut files: Vec<GeneratedFile>,
    ) -> Result<Vec<GeneratedFile>, PluginError> {
        if files.is_empty() {
            return Ok(files);
        }
        let file = self.logger_file(genpkg, root)?;
        info!(
            plugin = %self.name(),
            path = %file.path.display(),
            "Adding structured logger"
        );
        files.push(file);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ApiExpr;

    fn generated() -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new("gen/calc/service.go", vec![Section::header("calc", "calc", vec![])]),
            GeneratedFile::new("gen/http/calc/server/server.go", vec![]),
        ]
    }

    #[tokio::test]
    async fn test_adds_exactly_one_file() {
        let plugin = LoggerPlugin::new(LoggerConfig::default());
        let root = DesignRoot::new(ApiExpr::new("calc"));
        let files = generated();
        let before = files.len();

        let files = plugin.process("calc/gen", &root, files).await.unwrap();
        assert_eq!(files.len() - before, 1);

        let logger = files.last().unwrap();
        assert_eq!(logger.path, PathBuf::from("calc/gen/log/logger.go"));
        assert!(logger.has_import("go.uber.org/zap"));
        let content = logger.render();
        assert!(content.contains("package log\n"));
        assert!(content.contains("structured logger of calc"));
        assert!(content.contains("func (logger *Logger) Log(keyvals ...interface{}) error"));
    }

    #[tokio::test]
    async fn test_adapter_uses_configured_library_alias() {
        let plugin = LoggerPlugin::new(LoggerConfig {
            library_import: "example.com/forks/zap".to_string(),
            library_alias: "forkzap".to_string(),
            ..Default::default()
        });
        let root = DesignRoot::new(ApiExpr::new("calc"));

        let files = plugin.process("calc/gen", &root, generated()).await.unwrap();
        let logger = files.last().unwrap();
        let imports = logger.imports().unwrap();
        assert!(imports.contains(&ImportSpec::named("forkzap", "example.com/forks/zap")));

        let content = logger.render();
        assert!(content.contains("\t*forkzap.SugaredLogger\n"));
        assert!(content.contains("l, _ = forkzap.NewProduction()"));
        assert!(!content.contains(" zap."));
        assert!(!content.contains("*zap."));
    }

    #[tokio::test]
    async fn test_no_input_files_adds_nothing() {
        let plugin = LoggerPlugin::new(LoggerConfig::default());
        let root = DesignRoot::new(ApiExpr::new("calc"));
        let files = plugin.process("calc/gen", &root, Vec::new()).await.unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_file_path_follows_config() {
        let plugin = LoggerPlugin::new(LoggerConfig {
            package: "zaplog".to_string(),
            file_name: "zap.go".to_string(),
            ..Default::default()
        });
        assert_eq!(plugin.file_path(""), PathBuf::from("zaplog/zap.go"));
        assert_eq!(plugin.file_path("/gen/"), PathBuf::from("gen/zaplog/zap.go"));
    }
}
