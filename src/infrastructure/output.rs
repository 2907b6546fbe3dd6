//! Rendering of resolved requirements for downstream tools

use serde::Serialize;

use crate::design::{DesignRoot, SchemeExpr, SecurityExpr};

/// A requirement with its schemes expanded
#[derive(Debug, Clone, Serialize)]
pub struct RequirementReport<'a> {
    pub schemes: Vec<&'a SchemeExpr>,
    pub scopes: &'a [String],
}

/// Effective requirements of one method
#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport<'a> {
    pub service: &'a str,
    pub method: &'a str,
    /// Empty when the method is not secured
    pub requirements: Vec<RequirementReport<'a>>,
}

/// Effective requirements of every method of a design
#[derive(Debug, Clone, Serialize)]
pub struct RequirementsReport<'a> {
    pub api: &'a str,
    pub endpoints: Vec<EndpointReport<'a>>,
}

impl<'a> RequirementsReport<'a> {
    /// Report on every method, or on the methods of one service
    pub fn new(root: &'a DesignRoot, service: Option<&str>) -> Self {
        let endpoints = root
            .resolver()
            .endpoints()
            .filter(|ep| service.is_none_or(|s| ep.service.name == s))
            .map(|ep| EndpointReport {
                service: &ep.service.name,
                method: &ep.method.name,
                requirements: ep
                    .requirements
                    .into_iter()
                    .map(|req| requirement(root, req))
                    .collect(),
            })
            .collect();
        Self {
            api: &root.api.name,
            endpoints,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn requirement<'a>(root: &'a DesignRoot, security: &'a SecurityExpr) -> RequirementReport<'a> {
    RequirementReport {
        schemes: security
            .schemes
            .iter()
            .filter_map(|r| root.scheme(r.id))
            .collect(),
        scopes: &security.scopes,
    }
}
