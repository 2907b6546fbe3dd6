//! Toolkit adapter plugin
//!
//! Rewrites the generator output so the services run on the toolkit: the
//! framework endpoint type becomes the toolkit endpoint type everywhere, the
//! gRPC server package stops emitting initializers that the toolkit server
//! package provides, and the example server is rewired to the toolkit
//! logger and HTTP transport.

use async_trait::async_trait;
use regex::{Captures, Regex};
use tera::Context;
use tracing::{debug, info};

use crate::config::KitConfig;
use crate::design::DesignRoot;
use crate::plugins::naming::{join_import, to_snake_case};
use crate::plugins::templates::{self, KIT_HTTP_SERVER_INIT, KIT_LOGGER};
use crate::plugins::{
    GeneratedFile, ImportSpec, Order, Plugin, PluginError, SectionData, ServiceData, Stage,
};

/// Rewrites generated files to integrate the toolkit
pub struct KitPlugin {
    stage: Stage,
    config: KitConfig,
    endpoint: Regex,
    logger_call: Regex,
}

impl KitPlugin {
    /// Plugin rewriting the gen package
    pub fn gen_stage(config: KitConfig) -> Result<Self, PluginError> {
        Self::new(Stage::Gen, config)
    }

    /// Plugin rewriting the example server
    pub fn example_stage(config: KitConfig) -> Result<Self, PluginError> {
        Self::new(Stage::Example, config)
    }

    fn new(stage: Stage, config: KitConfig) -> Result<Self, PluginError> {
        let endpoint = Regex::new(&regex::escape(&config.framework_endpoint))?;
        let logger_call = Regex::new(r"logger\.(\w+)\((.*)\)")?;
        Ok(Self {
            stage,
            config,
            endpoint,
            logger_call,
        })
    }

    /// Replace standalone occurrences of the framework endpoint type in every
    /// section and import the toolkit endpoint package when one was found.
    fn replace_endpoints(&self, file: &mut GeneratedFile) -> usize {
        let mut replaced = 0;
        for section in &mut file.sections {
            let source = &section.source;
            let rewritten = self.endpoint.replace_all(source, |caps: &Captures<'_>| {
                let Some(m) = caps.get(0) else {
                    return String::new();
                };
                let standalone = source[..m.start()].chars().next_back().is_some_and(is_boundary)
                    && source[m.end()..].chars().next().is_some_and(is_boundary);
                if standalone {
                    replaced += 1;
                    self.config.endpoint_type.clone()
                } else {
                    m.as_str().to_string()
                }
            });
            let rewritten = rewritten.into_owned();
            section.source = rewritten;
        }
        if replaced > 0 {
            file.add_import(ImportSpec::new(&self.config.endpoint_import));
            debug!(file = %file.path.display(), replaced, "Replaced framework endpoint type");
        }
        replaced
    }

    /// Blank the gRPC initializers generated again by the toolkit server package
    fn blank_grpc_initializers(file: &mut GeneratedFile) {
        for section in &mut file.sections {
            let blank = match (section.name.as_str(), &section.data) {
                ("server-init", SectionData::GrpcService(_)) => true,
                ("handler-init", SectionData::GrpcEndpoint(_)) => true,
                _ => false,
            };
            if blank {
                section.source.clear();
            }
        }
    }

    fn process_gen(&self, file: &mut GeneratedFile) {
        self.replace_endpoints(file);
        Self::blank_grpc_initializers(file);
    }

    fn process_example(&self, genpkg: &str, file: &mut GeneratedFile) -> Result<(), PluginError> {
        self.replace_endpoints(file);

        let mut imports = Vec::new();
        let mut has_logger = false;
        let mut has_logger_call = false;

        for section in &mut file.sections {
            if section.source.contains("*log.Logger") {
                has_logger = true;
                section.source = section.source.replace("*log.Logger", "log.Logger");
            }
            let rewritten = self.logger_call.replace_all(&section.source, |caps: &Captures<'_>| {
                if &caps[1] == "Log" {
                    return caps[0].to_string();
                }
                has_logger_call = true;
                format!("logger.Log(\"info\", fmt.Sprintf({}))", &caps[2])
            });
            section.source = rewritten.into_owned();

            match section.name.as_str() {
                "server-main-logger" => {
                    imports.push(ImportSpec::new(&self.config.logger_import));
                    let mut context = Context::new();
                    context.insert("toolkit", "gokit");
                    section.source = templates::render(&section.name, KIT_LOGGER, &context)?;
                }
                "server-http-logger" | "server-grpc-logger" => section.source.clear(),
                "server-http-middleware" | "server-grpc-register" => {
                    section.source = section.source.replace("adapter", "logger");
                }
                "server-http-init" => {
                    let SectionData::HttpServices(services) = &section.data else {
                        return Err(PluginError::section(
                            &file.path,
                            &section.name,
                            "expected the HTTP services of the example server",
                        ));
                    };
                    imports.push(ImportSpec::named(
                        &self.config.http_transport_alias,
                        &self.config.http_transport_import,
                    ));
                    imports.push(ImportSpec::new(&self.config.endpoint_import));
                    imports.extend(kit_server_imports(genpkg, "http", services));

                    let mut context = Context::new();
                    context.insert("services", services);
                    context.insert("transport", &self.config.http_transport_alias);
                    context.insert("endpoint_type", &self.config.endpoint_type);
                    section.source =
                        templates::render(&section.name, KIT_HTTP_SERVER_INIT, &context)?;
                }
                "server-grpc-init" => {
                    let SectionData::GrpcServices(services) = &section.data else {
                        return Err(PluginError::section(
                            &file.path,
                            &section.name,
                            "expected the gRPC services of the example server",
                        ));
                    };
                    imports.extend(kit_server_imports(genpkg, "grpc", services));
                    section.source = section.source.replace("svr.New", "kitsvr.New");
                }
                _ => {}
            }
        }

        if has_logger_call {
            file.add_import(ImportSpec::new("fmt"));
        }
        for spec in imports {
            file.add_import(spec);
        }
        if has_logger {
            file.replace_import("log", &self.config.logger_import);
        }
        Ok(())
    }
}

fn is_boundary(c: char) -> bool {
    !(c.is_alphabetic() || c == '_')
}

/// Imports of the toolkit server package of every service for a transport
fn kit_server_imports<'a>(
    genpkg: &'a str,
    transport: &'a str,
    services: &'a [ServiceData],
) -> impl Iterator<Item = ImportSpec> + 'a {
    services.iter().map(move |svc| {
        ImportSpec::named(
            format!("{}kitsvr", svc.pkg_name),
            join_import(&[genpkg, transport, &to_snake_case(&svc.var_name), "kitserver"]),
        )
    })
}

#[async_trait]
impl Plugin for KitPlugin {
    fn name(&self) -> &str {
        match self.stage {
            Stage::Gen => "kit",
            Stage::Example => "kit-example",
        }
    }

    fn stage(&self) -> Stage {
        self.stage
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
        info!(
            plugin = %self.name(),
            api = %root.api.name,
            files = files.len(),
            "Integrating toolkit"
        );
        for file in &mut files {
            match self.stage {
                Stage::Gen => self.process_gen(file),
                Stage::Example => self.process_example(genpkg, file)?,
            }
        }
        Ok(files)
    }
}
