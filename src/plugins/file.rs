//! Model of the files produced by the generator
//!
//! A generated file is an ordered list of sections. The first section is the
//! file header: it carries the package clause and the import list that
//! plugins extend. Every other section holds a fragment of source and, for
//! the sections plugins care about, the data the fragment was rendered from.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Name of the header section
pub const HEADER_SECTION: &str = "source-header";

/// A single import of a generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSpec {
    /// Optional alias
    pub name: Option<String>,
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: path.into(),
        }
    }

    pub fn named(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            path: path.into(),
        }
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} {:?}", self.path),
            None => write!(f, "{:?}", self.path),
        }
    }
}

/// An endpoint of a generated service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndpointData {
    pub method_var_name: String,
    /// Name of the request decoder, empty when the method has no payload
    pub request_decoder: String,
    pub response_encoder: String,
    pub mount_handler: String,
}

impl EndpointData {
    /// Endpoint data following the generator's naming conventions
    pub fn new(method_var_name: impl Into<String>, has_payload: bool) -> Self {
        let method = method_var_name.into();
        Self {
            request_decoder: if has_payload {
                format!("Decode{method}Request")
            } else {
                String::new()
            },
            response_encoder: format!("Encode{method}Response"),
            mount_handler: format!("Mount{method}Handler"),
            method_var_name: method,
        }
    }
}

/// A generated service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceData {
    pub name: String,
    pub var_name: String,
    pub pkg_name: String,
    pub endpoints: Vec<EndpointData>,
}

impl ServiceData {
    pub fn new(
        name: impl Into<String>,
        var_name: impl Into<String>,
        pkg_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            var_name: var_name.into(),
            pkg_name: pkg_name.into(),
            endpoints: Vec::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: EndpointData) -> Self {
        self.endpoints.push(endpoint);
        self
    }
}

/// Data a section was rendered from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SectionData {
    #[default]
    None,
    /// File header
    Header {
        title: String,
        package: String,
        imports: Vec<ImportSpec>,
    },
    /// Services mounted by the example HTTP server
    HttpServices(Vec<ServiceData>),
    /// Services registered by the example gRPC server
    GrpcServices(Vec<ServiceData>),
    /// A service of the gRPC server package
    GrpcService(ServiceData),
    /// An endpoint of the gRPC server package
    GrpcEndpoint(EndpointData),
}

/// A named fragment of a generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub source: String,
    pub data: SectionData,
}

impl Section {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            data: SectionData::None,
        }
    }

    pub fn header(
        title: impl Into<String>,
        package: impl Into<String>,
        imports: Vec<ImportSpec>,
    ) -> Self {
        Self {
            name: HEADER_SECTION.to_string(),
            source: String::new(),
            data: SectionData::Header {
                title: title.into(),
                package: package.into(),
                imports,
            },
        }
    }

    pub fn with_data(mut self, data: SectionData) -> Self {
        self.data = data;
        self
    }
}

/// A file produced by the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub sections: Vec<Section>,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, sections: Vec<Section>) -> Self {
        Self {
            path: path.into(),
            sections,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Imports of the header section, if the file has one
    pub fn imports(&self) -> Option<&[ImportSpec]> {
        match self.sections.first().map(|s| &s.data) {
            Some(SectionData::Header { imports, .. }) => Some(imports),
            _ => None,
        }
    }

    fn imports_mut(&mut self) -> Option<&mut Vec<ImportSpec>> {
        match self.sections.first_mut().map(|s| &mut s.data) {
            Some(SectionData::Header { imports, .. }) => Some(imports),
            _ => None,
        }
    }

    pub fn has_import(&self, path: &str) -> bool {
        self.imports()
            .is_some_and(|imports| imports.iter().any(|i| i.path == path))
    }

    /// Add an import to the header unless one with the same path exists.
    /// Returns whether the import was added.
    pub fn add_import(&mut self, spec: ImportSpec) -> bool {
        let file = self.path.display().to_string();
        let Some(imports) = self.imports_mut() else {
            tracing::debug!(file = %file, import = %spec.path, "File has no header, import skipped");
            return false;
        };
        if imports.iter().any(|i| i.path == spec.path) {
            return false;
        }
        imports.push(spec);
        true
    }

    /// Point the import of `from` at `to`, dropping it when `to` is already imported
    pub fn replace_import(&mut self, from: &str, to: &str) {
        let Some(imports) = self.imports_mut() else {
            return;
        };
        if imports.iter().any(|i| i.path == to) {
            imports.retain(|i| i.path != from);
        } else {
            for spec in imports.iter_mut().filter(|i| i.path == from) {
                spec.path = to.to_string();
            }
        }
    }

    /// Concatenate the sections into the final file content
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            match &section.data {
                SectionData::Header {
                    title,
                    package,
                    imports,
                } => {
                    if !title.is_empty() {
                        out.push_str(&format!("// {title}\n\n"));
                    }
                    out.push_str(&format!("package {package}\n"));
                    if !imports.is_empty() {
                        out.push_str("\nimport (\n");
                        for spec in imports {
                            out.push_str(&format!("\t{spec}\n"));
                        }
                        out.push_str(")\n");
                    }
                }
                _ => {
                    if !section.source.is_empty() {
                        out.push('\n');
                        out.push_str(&section.source);
                    }
                }
            }
        }
        out
    }
}
