//! Requirement resolution
//!
//! The effective requirements of a method come from exactly one tier:
//! requirements declared on the method itself, else those declared on its
//! service, else the API defaults. A tier wins as soon as it has any
//! declaration for the method, even one that opts out of security.

use crate::design::{DesignRoot, MethodExpr, SchemeId, SecurityExpr, ServiceExpr};

/// Resolves the effective security requirements of service methods
#[derive(Debug, Clone, Copy)]
pub struct RequirementResolver<'a> {
    root: &'a DesignRoot,
}

/// A method together with its resolved requirements
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint<'a> {
    pub service: &'a ServiceExpr,
    pub method: &'a MethodExpr,
    pub requirements: Vec<&'a SecurityExpr>,
}

impl<'a> RequirementResolver<'a> {
    pub fn new(root: &'a DesignRoot) -> Self {
        Self { root }
    }

    /// Effective requirements of `method` of `service`, in declaration order.
    ///
    /// An empty list means the method is not secured.
    pub fn requirements(&self, service: &str, method: &str) -> Vec<&'a SecurityExpr> {
        let mut found = false;
        let mut resolved = Vec::new();
        for es in self.root.endpoint_security() {
            if es.service != service || es.method != method {
                continue;
            }
            found = true;
            if es.security.is_no_security() {
                tracing::trace!(service, method, "Endpoint opts out of security");
                resolved.clear();
                break;
            }
            resolved.push(&es.security);
        }
        if found {
            return resolved;
        }

        for ss in self.root.service_security() {
            if ss.service == service {
                found = true;
                resolved.push(&ss.security);
            }
        }
        if found {
            return resolved;
        }

        self.root.api_security().iter().collect()
    }

    /// Whether the effective requirements of the method use the given scheme
    pub fn uses_scheme(&self, service: &str, method: &str, id: SchemeId) -> bool {
        self.requirements(service, method)
            .iter()
            .any(|req| req.references(id))
    }

    /// Every method of every service with its resolved requirements
    pub fn endpoints(&self) -> impl Iterator<Item = ResolvedEndpoint<'a>> + 'a {
        let resolver = *self;
        self.root.services().iter().flat_map(move |service| {
            service.methods.iter().map(move |method| ResolvedEndpoint {
                service,
                method,
                requirements: resolver.requirements(&service.name, &method.name),
            })
        })
    }
}
