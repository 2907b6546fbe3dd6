//! Design root - the context object every validator and resolver reads from
//!
//! A `DesignRoot` is built once per generation run, either through the
//! builder methods below or by loading a design document, and owns the
//! services, the security schemes and the requirement sets attached to the
//! API, to services and to individual methods.

use serde::Serialize;
use url::Url;

use crate::design::{
    AttributeExpr, DesignError, EndpointSecurityExpr, RequirementResolver, SchemeExpr, SchemeId,
    SchemeRef, SecurityExpr, ServiceSecurityExpr,
};

/// A server the API is reachable at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerExpr {
    pub name: String,
    pub url: String,
}

/// API level description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiExpr {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub servers: Vec<ServerExpr>,
}

impl ApiExpr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_server(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.servers.push(ServerExpr {
            name: name.into(),
            url: url.into(),
        });
        self
    }
}

/// A service method and its request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodExpr {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub payload: AttributeExpr,
}

impl MethodExpr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            payload: AttributeExpr::empty(),
        }
    }

    pub fn with_payload(mut self, payload: AttributeExpr) -> Self {
        self.payload = payload;
        self
    }
}

/// A service grouping methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceExpr {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub methods: Vec<MethodExpr>,
}

impl ServiceExpr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodExpr) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method(&self, name: &str) -> Option<&MethodExpr> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Root of a design: API, services, schemes and security requirements
#[derive(Debug, Clone, Default)]
pub struct DesignRoot {
    pub api: ApiExpr,
    services: Vec<ServiceExpr>,
    schemes: Vec<SchemeExpr>,
    api_security: Vec<SecurityExpr>,
    service_security: Vec<ServiceSecurityExpr>,
    endpoint_security: Vec<EndpointSecurityExpr>,
}

impl DesignRoot {
    pub fn new(api: ApiExpr) -> Self {
        Self {
            api,
            ..Default::default()
        }
    }

    pub fn add_service(&mut self, service: ServiceExpr) {
        self.services.push(service);
    }

    pub fn services(&self) -> &[ServiceExpr] {
        &self.services
    }

    pub fn service(&self, name: &str) -> Option<&ServiceExpr> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Register a scheme and return its handle
    pub fn add_scheme(&mut self, scheme: SchemeExpr) -> SchemeId {
        self.schemes.push(scheme);
        SchemeId(self.schemes.len() - 1)
    }

    pub fn scheme(&self, id: SchemeId) -> Option<&SchemeExpr> {
        self.schemes.get(id.0)
    }

    pub(crate) fn scheme_mut(&mut self, id: SchemeId) -> Option<&mut SchemeExpr> {
        self.schemes.get_mut(id.0)
    }

    /// All schemes in declaration order
    pub fn schemes(&self) -> impl Iterator<Item = (SchemeId, &SchemeExpr)> {
        self.schemes.iter().enumerate().map(|(i, s)| (SchemeId(i), s))
    }

    /// Handle of the first scheme declared with the given name
    pub fn scheme_id(&self, scheme_name: &str) -> Option<SchemeId> {
        self.schemes
            .iter()
            .position(|s| s.scheme_name == scheme_name)
            .map(SchemeId)
    }

    /// Build a requirement over the given schemes
    pub fn security<I, S>(&self, schemes: &[SchemeId], scopes: I) -> Result<SecurityExpr, DesignError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schemes = schemes
            .iter()
            .map(|&id| {
                self.scheme(id)
                    .map(|scheme| SchemeRef {
                        id,
                        kind: scheme.kind,
                        name: scheme.scheme_name.clone(),
                    })
                    .ok_or_else(|| DesignError::UnknownScheme(format!("#{}", id.0)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SecurityExpr {
            schemes,
            scopes: scopes.into_iter().map(Into::into).collect(),
        })
    }

    /// Add an API level default requirement
    pub fn add_api_security(&mut self, security: SecurityExpr) {
        self.api_security.push(security);
    }

    /// Attach a requirement to every method of a service
    pub fn add_service_security(
        &mut self,
        service: &str,
        security: SecurityExpr,
    ) -> Result<(), DesignError> {
        if self.service(service).is_none() {
            return Err(DesignError::UnknownService(service.to_string()));
        }
        self.service_security.push(ServiceSecurityExpr {
            service: service.to_string(),
            security,
        });
        Ok(())
    }

    /// Attach a requirement to a single method
    pub fn add_endpoint_security(
        &mut self,
        service: &str,
        method: &str,
        security: SecurityExpr,
    ) -> Result<(), DesignError> {
        let svc = self
            .service(service)
            .ok_or_else(|| DesignError::UnknownService(service.to_string()))?;
        if svc.method(method).is_none() {
            return Err(DesignError::UnknownMethod {
                service: service.to_string(),
                method: method.to_string(),
            });
        }
        self.endpoint_security.push(EndpointSecurityExpr {
            service: service.to_string(),
            method: method.to_string(),
            security,
        });
        Ok(())
    }

    pub fn api_security(&self) -> &[SecurityExpr] {
        &self.api_security
    }

    pub fn service_security(&self) -> &[ServiceSecurityExpr] {
        &self.service_security
    }

    pub fn endpoint_security(&self) -> &[EndpointSecurityExpr] {
        &self.endpoint_security
    }

    /// Resolver over this design's requirement sets
    pub fn resolver(&self) -> RequirementResolver<'_> {
        RequirementResolver::new(self)
    }

    /// URL of the first declared server, used to complete relative flow URLs
    pub fn base_server_url(&self) -> Option<Url> {
        let server = self.api.servers.first()?;
        match Url::parse(&server.url) {
            Ok(url) if url.has_host() => Some(url),
            Ok(_) => {
                tracing::warn!(
                    server = %server.name,
                    url = %server.url,
                    "Server URL has no host, relative flow URLs cannot be completed"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    server = %server.name,
                    url = %server.url,
                    error = %e,
                    "Invalid server URL, relative flow URLs cannot be completed"
                );
                None
            }
        }
    }
}
