//! Plugin registry

use tracing::{debug, info};

use crate::config::Config;
use crate::design::DesignRoot;
use crate::plugins::{GeneratedFile, KitPlugin, LoggerPlugin, Order, Plugin, PluginError, Stage};

/// Registered plugins, run per stage in registration order
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the toolkit and structured logger plugins
    pub fn with_defaults(config: &Config) -> Result<Self, PluginError> {
        let mut registry = Self::new();
        registry.register(Box::new(KitPlugin::gen_stage(config.kit.clone())?));
        registry.register(Box::new(KitPlugin::example_stage(config.kit.clone())?));
        registry.register(Box::new(LoggerPlugin::new(config.logger.clone())));
        Ok(registry)
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        debug!(
            plugin = %plugin.name(),
            stage = %plugin.stage(),
            order = ?plugin.order(),
            "Registering plugin"
        );
        self.plugins.push(plugin);
    }

    /// Names of the plugins of a stage in the order they run
    pub fn names(&self, stage: Stage) -> Vec<&str> {
        [Order::First, Order::Last]
            .into_iter()
            .flat_map(|order| self.matching(stage, order))
            .map(|p| p.name())
            .collect()
    }

    fn matching(&self, stage: Stage, order: Order) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins
            .iter()
            .map(|p| &**p)
            .filter(move |p| p.stage() == stage && p.order() == order)
    }

    /// Run the plugins of a stage registered with the given order
    pub async fn run_order(
        &self,
        stage: Stage,
        order: Order,
        genpkg: &str,
        root: &DesignRoot,
        mut files: Vec<GeneratedFile>,
    ) -> Result<Vec<GeneratedFile>, PluginError> {
        for plugin in self.matching(stage, order) {
            files = plugin.process(genpkg, root, files).await?;
        }
        Ok(files)
    }

    /// Run every plugin of a stage, `First` plugins before `Last` ones
    pub async fn run(
        &self,
        stage: Stage,
        genpkg: &str,
        root: &DesignRoot,
        files: Vec<GeneratedFile>,
    ) -> Result<Vec<GeneratedFile>, PluginError> {
        let files = self.run_order(stage, Order::First, genpkg, root, files).await?;
        let files = self.run_order(stage, Order::Last, genpkg, root, files).await?;
        info!(stage = %stage, files = files.len(), "Plugins completed");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::ApiExpr;
    use crate::plugins::Section;
    use async_trait::async_trait;

    /// Appends a marker section to every file
    struct Marker {
        name: &'static str,
        order: Order,
    }

    #[async_trait]
    impl Plugin for Marker {
        fn name(&self) -> &str {
            self.name
        }

        fn stage(&self) -> Stage {
            Stage::Gen
        }

        fn order(&self) -> Order {
            self.order
        }

        async fn process(
            &self,
            _genpkg: &str,
            _root: &DesignRoot,
            mut files: Vec<GeneratedFile>,
        ) -> Result<Vec<GeneratedFile>, PluginError> {
            for file in &mut files {
                file.sections.push(Section::new(self.name, ""));
            }
            Ok(files)
        }
    }

    #[tokio::test]
    async fn test_first_plugins_run_before_last() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(Marker { name: "late", order: Order::Last }));
        registry.register(Box::new(Marker { name: "early", order: Order::First }));
        registry.register(Box::new(Marker { name: "later", order: Order::Last }));

        let root = DesignRoot::new(ApiExpr::new("calc"));
        let files = vec![GeneratedFile::new("gen/calc/service.go", vec![])];
        let files = registry.run(Stage::Gen, "calc/gen", &root, files).await.unwrap();

        let names: Vec<_> = files[0].sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["early", "late", "later"]);
        assert!(registry.run(Stage::Example, "calc/gen", &root, files).await.is_ok());
    }

    #[test]
    fn test_default_plugins_per_stage() {
        let registry = PluginRegistry::with_defaults(&Config::default()).unwrap();
        assert_eq!(registry.names(Stage::Gen), vec!["kit", "structured-logger"]);
        assert_eq!(registry.names(Stage::Example), vec!["kit-example"]);
    }

    #[tokio::test]
    async fn test_defaults_add_logger_and_rewrite_endpoints() {
        let registry = PluginRegistry::with_defaults(&Config::default()).unwrap();
        let root = DesignRoot::new(ApiExpr::new("calc"));
        let files = vec![GeneratedFile::new(
            "gen/calc/endpoints.go",
            vec![
                Section::header("calc endpoints", "calc", vec![]),
                Section::new("endpoints-struct", "type Endpoints struct {\n\tAdd goa.Endpoint\n}\n"),
            ],
        )];

        let files = registry.run(Stage::Gen, "calc/gen", &root, files).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].sections[1].source.contains("Add endpoint.Endpoint"));
    }
}
