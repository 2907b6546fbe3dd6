//! Running the default plugin set over generator output

use scaffold_plugins::Config;
use scaffold_plugins::design::{ApiExpr, DesignRoot};
use scaffold_plugins::plugins::{
    EndpointData, GeneratedFile, ImportSpec, PluginRegistry, Section, SectionData, ServiceData,
    Stage,
};

fn root() -> DesignRoot {
    DesignRoot::new(ApiExpr::new("calc"))
}

fn gen_files() -> Vec<GeneratedFile> {
    vec![
        GeneratedFile::new(
            "gen/calc/endpoints.go",
            vec![
                Section::header("calc endpoints", "calc", vec![ImportSpec::new("goa.design/goa")]),
                Section::new(
                    "endpoints-struct",
                    "type Endpoints struct {\n\tAdd goa.Endpoint\n}\n",
                ),
            ],
        ),
        GeneratedFile::new(
            "gen/grpc/calc/server/server.go",
            vec![
                Section::header("calc gRPC server", "server", vec![]),
                Section::new("server-init", "func New(e *calc.Endpoints) *Server {}\n")
                    .with_data(SectionData::GrpcService(ServiceData::new("calc", "calc", "calc"))),
            ],
        ),
    ]
}

#[tokio::test]
async fn test_gen_stage_adds_one_file_and_rewrites_endpoints() {
    let registry = PluginRegistry::with_defaults(&Config::default()).unwrap();
    let files = gen_files();
    let before = files.len();

    let files = registry.run(Stage::Gen, "calc/gen", &root(), files).await.unwrap();
    assert_eq!(files.len() - before, 1);

    let endpoints = files[0].render();
    assert!(endpoints.contains("\t\"github.com/go-kit/kit/endpoint\"\n"));
    assert!(endpoints.contains("Add endpoint.Endpoint"));
    assert!(files[1].section("server-init").unwrap().source.is_empty());
    assert!(files[2].path.ends_with("log/logger.go"));
}

#[tokio::test]
async fn test_example_stage_rewires_server() {
    let registry = PluginRegistry::with_defaults(&Config::default()).unwrap();
    let services = vec![
        ServiceData::new("calc", "calc", "calc")
            .with_endpoint(EndpointData::new("Add", true))
            .with_endpoint(EndpointData::new("Health", false)),
    ];
    let files = vec![GeneratedFile::new(
        "cmd/calc/http.go",
        vec![
            Section::header("calc example", "main", vec![ImportSpec::new("log")]),
            Section::new("server-http-logger", "adapter = middleware.NewLogger(logger)\n"),
            Section::new("server-http-init", "").with_data(SectionData::HttpServices(services)),
            Section::new("server-http-start", "func handleHTTPServer(logger *log.Logger) {\n\tlogger.Printf(\"listening\")\n}\n"),
        ],
    )];

    let files = registry.run(Stage::Example, "calc/gen", &root(), files).await.unwrap();
    assert_eq!(files.len(), 1);

    let file = &files[0];
    assert!(file.section("server-http-logger").unwrap().source.is_empty());
    let init = &file.section("server-http-init").unwrap().source;
    assert!(init.contains("calcAddHandler = kithttp.NewServer("));
    assert!(init.contains("calckitsvr.MountHealthHandler(mux, calcHealthHandler)"));
    assert_eq!(
        file.section("server-http-start").unwrap().source,
        "func handleHTTPServer(logger log.Logger) {\n\tlogger.Log(\"info\", fmt.Sprintf(\"listening\"))\n}\n"
    );

    let imports = file.imports().unwrap();
    assert!(imports.contains(&ImportSpec::new("github.com/go-kit/kit/log")));
    assert!(imports.contains(&ImportSpec::named("calckitsvr", "calc/gen/http/calc/kitserver")));
    assert!(imports.contains(&ImportSpec::new("fmt")));
    assert!(!file.has_import("log"));
}

#[tokio::test]
async fn test_custom_import_paths_from_config() {
    let config = Config::from_toml_str(
        r#"
[kit]
endpoint_import = "example.com/kit/endpoint"

[logger]
package = "zaplog"
"#,
    )
    .unwrap();
    let registry = PluginRegistry::with_defaults(&config).unwrap();

    let files = registry.run(Stage::Gen, "calc/gen", &root(), gen_files()).await.unwrap();
    assert!(files[0].has_import("example.com/kit/endpoint"));
    assert!(files[2].path.ends_with("zaplog/logger.go"));
}
