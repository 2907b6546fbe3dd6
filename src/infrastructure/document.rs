//! Design document format
//!
//! A design document is the serialized form of a [`DesignRoot`]. Schemes are
//! declared once and referenced by name from the requirement lists of the
//! API, of services and of methods.
//!
//! ```yaml
//! api:
//!   name: secured
//!   servers:
//!     - url: https://api.example.com
//! schemes:
//!   - name: jwt
//!     kind: jwt
//!     flows:
//!       - kind: client_credentials
//!         token_url: /token
//! services:
//!   - name: secured_service
//!     security:
//!       - schemes: [jwt]
//!         scopes: ["api:read"]
//!     methods:
//!       - name: secure
//!         payload:
//!           type: object
//!           attributes:
//!             - name: token
//!               type: string
//!               security: token
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::design::{
    ApiExpr, AttributeExpr, AttributeType, CredentialLocation, DesignError, DesignRoot, FlowExpr,
    FlowKind, MethodExpr, NamedAttribute, SchemeExpr, SchemeId, SchemeKind, SecurityExpr,
    ServiceExpr,
};

/// Scheme name that opts an endpoint out of security without declaring a scheme
pub const NO_SECURITY: &str = "NoSecurity";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignDocument {
    pub api: ApiDoc,
    #[serde(default)]
    pub schemes: Vec<SchemeDoc>,
    #[serde(default)]
    pub services: Vec<ServiceDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub servers: Vec<ServerDoc>,
    /// Default requirements of every method
    #[serde(default)]
    pub security: Vec<RequirementDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerDoc {
    #[serde(default = "default_server_name")]
    pub name: String,
    pub url: String,
}

fn default_server_name() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeDoc {
    pub name: String,
    pub kind: SchemeKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "in")]
    pub location: Option<CredentialLocation>,
    /// Header or query parameter carrying the credential
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub scopes: Vec<ScopeDoc>,
    #[serde(default)]
    pub flows: Vec<FlowDoc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeDoc {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowDoc {
    pub kind: FlowKind,
    #[serde(default)]
    pub authorization_url: String,
    #[serde(default)]
    pub token_url: String,
    #[serde(default)]
    pub refresh_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementDoc {
    pub schemes: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub security: Vec<RequirementDoc>,
    #[serde(default)]
    pub methods: Vec<MethodDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payload: Option<AttributeDoc>,
    #[serde(default)]
    pub security: Vec<RequirementDoc>,
}

/// An attribute. `type` is a primitive name, `array`, `map`, `object` or
/// `user_type`; it defaults to `object` when attributes are listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeDoc {
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Credential carried by the attribute: `username`, `password`, `token`,
    /// `accesstoken` or `apikey:<scheme>`
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, Vec<String>>,
    /// Element type of arrays and maps
    #[serde(default)]
    pub elem: Option<Box<AttributeDoc>>,
    /// Key type of maps
    #[serde(default)]
    pub key: Option<Box<AttributeDoc>>,
    /// Type name of user types
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub attributes: Vec<FieldDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    #[serde(flatten)]
    pub attribute: AttributeDoc,
}

impl AttributeDoc {
    fn into_expr(self, path: &str) -> Result<AttributeExpr, DesignError> {
        let ty = match self.ty.as_deref() {
            Some(ty) => ty.to_string(),
            None if !self.attributes.is_empty() => "object".to_string(),
            None => "empty".to_string(),
        };

        let kind = match ty.as_str() {
            "object" => AttributeType::Object {
                attributes: fields(self.attributes, path)?,
            },
            "array" => AttributeType::Array {
                elem: Box::new(required(self.elem, path, "elem")?.into_expr(&format!("{path}[]"))?),
            },
            "map" => AttributeType::Map {
                key: Box::new(required(self.key, path, "key")?.into_expr(&format!("{path}{{key}}"))?),
                elem: Box::new(
                    required(self.elem, path, "elem")?.into_expr(&format!("{path}{{elem}}"))?,
                ),
            },
            "user_type" => {
                let name = self.type_name.ok_or_else(|| {
                    DesignError::InvalidDocument(format!("{path}: user_type requires type_name"))
                })?;
                AttributeType::UserType {
                    name,
                    attribute: Box::new(AttributeExpr::object(fields(self.attributes, path)?)),
                }
            }
            other => AttributeType::primitive(other).ok_or_else(|| {
                DesignError::InvalidDocument(format!("{path}: unknown attribute type {other:?}"))
            })?,
        };

        let mut meta = self.meta;
        if let Some(credential) = self.security {
            meta.entry(format!("security:{credential}")).or_default();
        }

        Ok(AttributeExpr {
            kind,
            description: self.description,
            meta,
        })
    }
}

fn required(
    doc: Option<Box<AttributeDoc>>,
    path: &str,
    field: &str,
) -> Result<AttributeDoc, DesignError> {
    doc.map(|d| *d)
        .ok_or_else(|| DesignError::InvalidDocument(format!("{path}: missing {field}")))
}

fn fields(docs: Vec<FieldDoc>, path: &str) -> Result<Vec<NamedAttribute>, DesignError> {
    docs.into_iter()
        .map(|f| {
            let attribute = f.attribute.into_expr(&format!("{path}.{}", f.name))?;
            Ok(NamedAttribute::new(f.name, attribute))
        })
        .collect()
}

impl SchemeDoc {
    fn into_expr(self) -> SchemeExpr {
        let mut scheme = SchemeExpr::new(self.kind, self.name).with_description(self.description);
        scheme.location = self.location;
        scheme.name = self.credential.unwrap_or_default();
        for scope in self.scopes {
            scheme = scheme.with_scope(scope.name, scope.description);
        }
        for flow in self.flows {
            scheme = scheme.with_flow(FlowExpr {
                kind: flow.kind,
                authorization_url: flow.authorization_url,
                token_url: flow.token_url,
                refresh_url: flow.refresh_url,
            });
        }
        scheme.metadata = self.metadata;
        scheme
    }
}

impl DesignDocument {
    /// Build the design root described by the document
    pub fn into_root(self) -> Result<DesignRoot, DesignError> {
        let mut api = ApiExpr::new(self.api.name);
        api.description = self.api.description;
        for server in self.api.servers {
            api = api.with_server(server.name, server.url);
        }
        let mut root = DesignRoot::new(api);

        for scheme in self.schemes {
            if root.scheme_id(&scheme.name).is_some() {
                return Err(DesignError::InvalidDocument(format!(
                    "security scheme {:?} is declared twice",
                    scheme.name
                )));
            }
            root.add_scheme(scheme.into_expr());
        }

        let mut requirements = Vec::new();
        for svc in self.services {
            let mut service = ServiceExpr::new(&svc.name);
            service.description = svc.description;
            for m in svc.methods {
                let mut method = MethodExpr::new(&m.name);
                method.description = m.description;
                if let Some(payload) = m.payload {
                    method = method
                        .with_payload(payload.into_expr(&format!("{}.{}", svc.name, m.name))?);
                }
                service = service.with_method(method);
                for req in m.security {
                    requirements.push((svc.name.clone(), Some(m.name.clone()), req));
                }
            }
            root.add_service(service);
            for req in svc.security {
                requirements.push((svc.name.clone(), None, req));
            }
        }

        for req in self.api.security {
            let security = requirement(&mut root, req)?;
            root.add_api_security(security);
        }
        for (service, method, req) in requirements {
            let security = requirement(&mut root, req)?;
            match method {
                Some(method) => root.add_endpoint_security(&service, &method, security)?,
                None => root.add_service_security(&service, security)?,
            }
        }

        debug!(
            api = %root.api.name,
            services = root.services().len(),
            schemes = root.schemes().count(),
            "Built design from document"
        );
        Ok(root)
    }
}

fn requirement(root: &mut DesignRoot, doc: RequirementDoc) -> Result<SecurityExpr, DesignError> {
    let ids = doc
        .schemes
        .iter()
        .map(|name| scheme_by_name(root, name))
        .collect::<Result<Vec<SchemeId>, _>>()?;
    root.security(&ids, doc.scopes)
}

fn scheme_by_name(root: &mut DesignRoot, name: &str) -> Result<SchemeId, DesignError> {
    if let Some(id) = root.scheme_id(name) {
        return Ok(id);
    }
    if name == NO_SECURITY {
        return Ok(root.add_scheme(SchemeExpr::no_security()));
    }
    Err(DesignError::UnknownScheme(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{ACCESS_TOKEN_TAG, USERNAME_TAG, api_key_tag};

    const DESIGN: &str = r#"
api:
  name: secured
  servers:
    - url: https://api.example.com
  security:
    - schemes: [jwt]
schemes:
  - name: basic
    kind: basic_auth
    description: Basic authentication
  - name: api_key
    kind: api_key
    in: query
    credential: k
  - name: jwt
    kind: jwt
    scopes:
      - name: "api:read"
        description: Read-only access
  - name: oauth2
    kind: oauth2
    flows:
      - kind: authorization_code
        authorization_url: /authorization
        token_url: /token
services:
  - name: secured_service
    methods:
      - name: signin
        security:
          - schemes: [basic]
        payload:
          attributes:
            - name: username
              type: string
              security: username
            - name: password
              type: string
              security: password
      - name: unsecure
        security:
          - schemes: [NoSecurity]
      - name: secure
        payload:
          type: object
          attributes:
            - name: token
              type: string
              security: token
            - name: key
              type: string
              security: "apikey:api_key"
            - name: tags
              type: array
              elem:
                type: string
"#;

    fn load() -> DesignRoot {
        let doc: DesignDocument = serde_yaml::from_str(DESIGN).unwrap();
        doc.into_root().unwrap()
    }

    #[test]
    fn test_document_builds_root() {
        let root = load();
        assert_eq!(root.api.name, "secured");
        assert_eq!(root.api.servers[0].name, "default");
        assert_eq!(root.services()[0].methods.len(), 3);
        assert_eq!(root.api_security().len(), 1);
        assert_eq!(root.endpoint_security().len(), 2);

        let key = root.scheme(root.scheme_id("api_key").unwrap()).unwrap();
        assert_eq!(key.location, Some(CredentialLocation::Query));
        assert_eq!(key.name, "k");

        let oauth = root.scheme(root.scheme_id("oauth2").unwrap()).unwrap();
        assert_eq!(oauth.flows[0].kind, FlowKind::AuthorizationCode);
        assert_eq!(oauth.flows[0].token_url, "/token");
    }

    #[test]
    fn test_document_payload_tags() {
        let root = load();
        let svc = root.service("secured_service").unwrap();
        assert!(svc.method("signin").unwrap().payload.has_tagged_field(USERNAME_TAG));
        let secure = &svc.method("secure").unwrap().payload;
        assert!(secure.has_tagged_field(&api_key_tag("api_key")));
        assert!(!secure.has_tagged_field(ACCESS_TOKEN_TAG));
        assert!(matches!(
            secure.as_object().unwrap()[2].attribute.kind,
            AttributeType::Array { .. }
        ));
    }

    #[test]
    fn test_no_security_needs_no_declaration() {
        let root = load();
        let resolver = root.resolver();
        assert!(resolver.requirements("secured_service", "unsecure").is_empty());
        assert_eq!(resolver.requirements("secured_service", "secure").len(), 1);
    }

    #[test]
    fn test_unknown_scheme_reference() {
        let yaml = r#"
api:
  name: broken
services:
  - name: svc
    security:
      - schemes: [missing]
"#;
        let doc: DesignDocument = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(doc.into_root(), Err(DesignError::UnknownScheme(name)) if name == "missing"));
    }

    #[test]
    fn test_invalid_attribute_type() {
        let yaml = r#"
api:
  name: broken
services:
  - name: svc
    methods:
      - name: m
        payload:
          attributes:
            - name: when
              type: datetime
"#;
        let doc: DesignDocument = serde_yaml::from_str(yaml).unwrap();
        let err = doc.into_root().unwrap_err();
        assert!(err.to_string().contains("svc.m.when: unknown attribute type \"datetime\""));
    }

    #[test]
    fn test_duplicate_scheme_is_rejected() {
        let yaml = r#"
api:
  name: broken
schemes:
  - name: jwt
    kind: jwt
  - name: jwt
    kind: oauth2
"#;
        let doc: DesignDocument = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(doc.into_root(), Err(DesignError::InvalidDocument(_))));
    }
}
