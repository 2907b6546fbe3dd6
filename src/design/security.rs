//! Security scheme catalog
//!
//! Typed definitions of the security scheme kinds, OAuth2 flow kinds and the
//! requirement expressions that attach schemes to the API, a service or a
//! single endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::design::DesignError;

/// Credential name given to OAuth2 and JWT schemes that do not set one
pub const DEFAULT_CREDENTIAL_NAME: &str = "Authorization";

/// Kind of security scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeKind {
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "basic_auth")]
    BasicAuth,
    #[serde(rename = "api_key")]
    ApiKey,
    #[serde(rename = "jwt")]
    Jwt,
    /// Marks an endpoint as unsecured; never composes with other schemes
    #[serde(rename = "none")]
    NoKind,
}

impl SchemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeKind::OAuth2 => "oauth2",
            SchemeKind::BasicAuth => "basic_auth",
            SchemeKind::ApiKey => "api_key",
            SchemeKind::Jwt => "jwt",
            SchemeKind::NoKind => "none",
        }
    }

    /// Whether the credential travels as a token in the `Authorization` carrier by default
    pub fn is_token_based(&self) -> bool {
        matches!(self, SchemeKind::OAuth2 | SchemeKind::Jwt)
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeKind {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "oauth2" => Ok(SchemeKind::OAuth2),
            "basic_auth" | "basic" => Ok(SchemeKind::BasicAuth),
            "api_key" | "apikey" => Ok(SchemeKind::ApiKey),
            "jwt" => Ok(SchemeKind::Jwt),
            "none" => Ok(SchemeKind::NoKind),
            _ => Err(DesignError::InvalidDocument(format!(
                "unknown security scheme kind {s:?}"
            ))),
        }
    }
}

/// Kind of OAuth2 flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    AuthorizationCode,
    Implicit,
    Password,
    ClientCredentials,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::AuthorizationCode => "authorization_code",
            FlowKind::Implicit => "implicit",
            FlowKind::Password => "password",
            FlowKind::ClientCredentials => "client_credentials",
        }
    }

    /// Flows that send the resource owner to an authorization endpoint
    pub fn uses_authorization_url(&self) -> bool {
        matches!(self, FlowKind::AuthorizationCode | FlowKind::Implicit)
    }

    /// Flows that exchange a grant at a token endpoint
    pub fn uses_token_url(&self) -> bool {
        !matches!(self, FlowKind::Implicit)
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a credential is carried on the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialLocation {
    Header,
    Query,
}

/// An OAuth2 or JWT scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeExpr {
    pub name: String,
    pub description: String,
}

/// One OAuth2 flow and its endpoint URLs. Empty strings mean "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowExpr {
    pub kind: FlowKind,
    pub authorization_url: String,
    pub token_url: String,
    pub refresh_url: String,
}

impl FlowExpr {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            authorization_url: String::new(),
            token_url: String::new(),
            refresh_url: String::new(),
        }
    }

    pub fn authorization_code(
        authorization_url: impl Into<String>,
        token_url: impl Into<String>,
        refresh_url: impl Into<String>,
    ) -> Self {
        Self {
            authorization_url: authorization_url.into(),
            token_url: token_url.into(),
            refresh_url: refresh_url.into(),
            ..Self::new(FlowKind::AuthorizationCode)
        }
    }

    pub fn implicit(authorization_url: impl Into<String>, refresh_url: impl Into<String>) -> Self {
        Self {
            authorization_url: authorization_url.into(),
            refresh_url: refresh_url.into(),
            ..Self::new(FlowKind::Implicit)
        }
    }

    pub fn password(token_url: impl Into<String>, refresh_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            refresh_url: refresh_url.into(),
            ..Self::new(FlowKind::Password)
        }
    }

    pub fn client_credentials(token_url: impl Into<String>, refresh_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            refresh_url: refresh_url.into(),
            ..Self::new(FlowKind::ClientCredentials)
        }
    }
}

/// A named method of authenticating requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeExpr {
    pub kind: SchemeKind,
    /// Name of the scheme, e.g. "api_key" or "jwt"
    pub scheme_name: String,
    pub description: String,
    /// Location of the credential
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<CredentialLocation>,
    /// Header or query parameter name carrying the credential
    pub name: String,
    pub scopes: Vec<ScopeExpr>,
    pub flows: Vec<FlowExpr>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Vec<String>>,
}

impl SchemeExpr {
    pub fn new(kind: SchemeKind, scheme_name: impl Into<String>) -> Self {
        Self {
            kind,
            scheme_name: scheme_name.into(),
            description: String::new(),
            location: None,
            name: String::new(),
            scopes: Vec::new(),
            flows: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn basic_auth(scheme_name: impl Into<String>) -> Self {
        Self::new(SchemeKind::BasicAuth, scheme_name)
    }

    pub fn api_key(scheme_name: impl Into<String>) -> Self {
        Self::new(SchemeKind::ApiKey, scheme_name)
    }

    pub fn jwt(scheme_name: impl Into<String>) -> Self {
        Self::new(SchemeKind::Jwt, scheme_name)
    }

    pub fn oauth2(scheme_name: impl Into<String>) -> Self {
        Self::new(SchemeKind::OAuth2, scheme_name)
    }

    /// The scheme used to opt an endpoint out of security
    pub fn no_security() -> Self {
        Self::new(SchemeKind::NoKind, "NoSecurity")
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn in_header(mut self, name: impl Into<String>) -> Self {
        self.location = Some(CredentialLocation::Header);
        self.name = name.into();
        self
    }

    pub fn in_query(mut self, name: impl Into<String>) -> Self {
        self.location = Some(CredentialLocation::Query);
        self.name = name.into();
        self
    }

    pub fn with_scope(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.push(ScopeExpr {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    pub fn with_flow(mut self, flow: FlowExpr) -> Self {
        self.flows.push(flow);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }
}

/// Handle on a scheme registered with a [`DesignRoot`](crate::design::DesignRoot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SchemeId(pub(crate) usize);

impl SchemeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A reference from a requirement to a scheme.
///
/// Carries a copy of the scheme fields needed for resolution and error
/// messages so that requirements never point back into the scheme arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeRef {
    pub id: SchemeId,
    pub kind: SchemeKind,
    pub name: String,
}

/// A security requirement: all listed schemes must be satisfied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityExpr {
    pub schemes: Vec<SchemeRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl SecurityExpr {
    /// Whether the requirement uses the given scheme
    pub fn references(&self, id: SchemeId) -> bool {
        self.schemes.iter().any(|s| s.id == id)
    }

    /// Whether the requirement opts out of security
    pub fn is_no_security(&self) -> bool {
        self.schemes.iter().any(|s| s.kind == SchemeKind::NoKind)
    }
}

/// A requirement that applies to every method of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSecurityExpr {
    pub service: String,
    pub security: SecurityExpr,
}

/// A requirement that applies to a single method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSecurityExpr {
    pub service: String,
    pub method: String,
    pub security: SecurityExpr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_kind_from_str() {
        assert_eq!(SchemeKind::from_str("oauth2").unwrap(), SchemeKind::OAuth2);
        assert_eq!(SchemeKind::from_str("Basic").unwrap(), SchemeKind::BasicAuth);
        assert_eq!(SchemeKind::from_str("apikey").unwrap(), SchemeKind::ApiKey);
        assert_eq!(SchemeKind::from_str("JWT").unwrap(), SchemeKind::Jwt);
        assert_eq!(SchemeKind::from_str("none").unwrap(), SchemeKind::NoKind);
        assert!(SchemeKind::from_str("digest").is_err());
    }

    #[test]
    fn test_scheme_kind_serde_names() {
        let kinds: Vec<SchemeKind> =
            serde_json::from_str(r#"["oauth2","basic_auth","api_key","jwt","none"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                SchemeKind::OAuth2,
                SchemeKind::BasicAuth,
                SchemeKind::ApiKey,
                SchemeKind::Jwt,
                SchemeKind::NoKind
            ]
        );
    }

    #[test]
    fn test_flow_kind_url_usage() {
        assert!(FlowKind::AuthorizationCode.uses_authorization_url());
        assert!(FlowKind::AuthorizationCode.uses_token_url());
        assert!(FlowKind::Implicit.uses_authorization_url());
        assert!(!FlowKind::Implicit.uses_token_url());
        assert!(!FlowKind::Password.uses_authorization_url());
        assert!(!FlowKind::ClientCredentials.uses_authorization_url());
    }

    #[test]
    fn test_scheme_builders() {
        let scheme = SchemeExpr::oauth2("oauth")
            .with_description("Google OAuth2")
            .with_scope("api:read", "Read access")
            .with_flow(FlowExpr::client_credentials("/token", ""))
            .with_metadata("swagger:extension", "x-provider");

        assert_eq!(scheme.kind, SchemeKind::OAuth2);
        assert_eq!(scheme.scopes.len(), 1);
        assert_eq!(scheme.flows[0].kind, FlowKind::ClientCredentials);
        assert_eq!(scheme.flows[0].token_url, "/token");
        assert!(scheme.name.is_empty());
        assert_eq!(scheme.metadata["swagger:extension"], vec!["x-provider"]);

        let key = SchemeExpr::api_key("api_key").in_query("k");
        assert_eq!(key.location, Some(CredentialLocation::Query));
        assert_eq!(key.name, "k");
    }

    #[test]
    fn test_security_expr_no_security() {
        let secured = SecurityExpr {
            schemes: vec![SchemeRef {
                id: SchemeId(0),
                kind: SchemeKind::Jwt,
                name: "jwt".to_string(),
            }],
            scopes: vec![],
        };
        assert!(!secured.is_no_security());
        assert!(secured.references(SchemeId(0)));
        assert!(!secured.references(SchemeId(1)));

        let open = SecurityExpr {
            schemes: vec![SchemeRef {
                id: SchemeId(1),
                kind: SchemeKind::NoKind,
                name: "NoSecurity".to_string(),
            }],
            scopes: vec![],
        };
        assert!(open.is_no_security());
    }
}
