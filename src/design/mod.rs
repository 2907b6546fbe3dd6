//! Design domain module - the security requirements expression model
//!
//! A design declares security schemes (OAuth2, basic auth, API key, JWT) and
//! attaches requirements over those schemes to the API, to services or to
//! single methods. Before code generation consumes it, the design goes
//! through two passes:
//!
//! 1. **validate** - every method secured by a scheme must declare the payload
//!    attribute carrying the scheme's credential, and every flow URL must
//!    parse. All failures are collected.
//! 2. **finalize** - relative flow URLs are completed against the API's
//!    first server and token based schemes get a default credential name.
//!
//! ```
//! use scaffold_plugins::design::{
//!     eval, ApiExpr, AttributeExpr, DesignRoot, FlowExpr, MethodExpr, NamedAttribute,
//!     SchemeExpr, ServiceExpr,
//! };
//!
//! let mut root = DesignRoot::new(ApiExpr::new("calc").with_server("default", "https://api.example.com"));
//! root.add_service(ServiceExpr::new("calc").with_method(
//!     MethodExpr::new("add")
//!         .with_payload(AttributeExpr::object(vec![NamedAttribute::access_token("token")])),
//! ));
//! let oauth = root.add_scheme(
//!     SchemeExpr::oauth2("oauth2").with_flow(FlowExpr::client_credentials("/token", "")),
//! );
//! let security = root.security(&[oauth], ["calc:write"]).unwrap();
//! root.add_service_security("calc", security).unwrap();
//!
//! eval::run(&mut root).unwrap();
//! assert_eq!(root.scheme(oauth).unwrap().flows[0].token_url, "https://api.example.com/token");
//! ```

pub mod attribute;
pub mod diagnostics;
pub mod errors;
pub mod eval;
pub mod flow;
pub mod requirements;
pub mod root;
pub mod scheme;
pub mod security;

pub use attribute::*;
pub use diagnostics::*;
pub use errors::*;
pub use flow::*;
pub use requirements::*;
pub use root::*;
pub use scheme::*;
pub use security::*;

#[cfg(test)]
mod tests {
    use super::*;

    /// The multi-auth service: basic auth signin, JWT secured methods and an
    /// API key required alongside the JWT on the doubly secured ones.
    fn multi_auth() -> (DesignRoot, SchemeId, SchemeId, SchemeId, SchemeId) {
        let mut root = DesignRoot::new(
            ApiExpr::new("multi_auth").with_server("default", "http://localhost:8088"),
        );
        root.add_service(
            ServiceExpr::new("secured_service")
                .with_method(MethodExpr::new("signin").with_payload(AttributeExpr::object(vec![
                    NamedAttribute::username("username"),
                    NamedAttribute::password("password"),
                ])))
                .with_method(MethodExpr::new("secure").with_payload(AttributeExpr::object(vec![
                    NamedAttribute::token("token"),
                    NamedAttribute::new("fail", AttributeExpr::new(AttributeType::Boolean)),
                ])))
                .with_method(MethodExpr::new("doubly_secure").with_payload(
                    AttributeExpr::object(vec![
                        NamedAttribute::token("token"),
                        NamedAttribute::api_key("api_key", "key"),
                    ]),
                ))
                .with_method(MethodExpr::new("also_doubly_secure").with_payload(
                    AttributeExpr::object(vec![
                        NamedAttribute::username("username"),
                        NamedAttribute::password("password"),
                        NamedAttribute::token("token"),
                        NamedAttribute::access_token("oauth_token"),
                        NamedAttribute::api_key("api_key", "key"),
                    ]),
                )),
        );

        let basic = root.add_scheme(SchemeExpr::basic_auth("basic").with_description("Basic authentication"));
        let jwt = root.add_scheme(
            SchemeExpr::jwt("jwt")
                .with_scope("api:read", "Read-only access")
                .with_scope("api:write", "Read and write access"),
        );
        let key = root.add_scheme(SchemeExpr::api_key("api_key").in_query("k"));
        let oauth = root.add_scheme(
            SchemeExpr::oauth2("oauth2")
                .with_flow(FlowExpr::authorization_code("/authorization", "/token", "/refresh"))
                .with_scope("api:read", "Read-only access"),
        );
        (root, basic, jwt, key, oauth)
    }

    #[test]
    fn test_multi_auth_design_evaluates() {
        let (mut root, basic, jwt, key, oauth) = multi_auth();

        let svc = root.security(&[jwt], ["api:read"]).unwrap();
        root.add_service_security("secured_service", svc).unwrap();
        let signin = root.security(&[basic], Vec::<String>::new()).unwrap();
        root.add_endpoint_security("secured_service", "signin", signin).unwrap();
        let doubly = root.security(&[jwt, key], ["api:read", "api:write"]).unwrap();
        root.add_endpoint_security("secured_service", "doubly_secure", doubly).unwrap();
        let also_jwt = root.security(&[jwt, key], ["api:read"]).unwrap();
        let also_oauth = root.security(&[oauth, basic], ["api:read"]).unwrap();
        root.add_endpoint_security("secured_service", "also_doubly_secure", also_jwt).unwrap();
        root.add_endpoint_security("secured_service", "also_doubly_secure", also_oauth).unwrap();

        eval::run(&mut root).unwrap();

        let oauth = root.scheme(oauth).unwrap();
        assert_eq!(oauth.name, "Authorization");
        assert_eq!(oauth.flows[0].authorization_url, "http://localhost:8088/authorization");
        assert_eq!(oauth.flows[0].token_url, "http://localhost:8088/token");
        assert_eq!(oauth.flows[0].refresh_url, "http://localhost:8088/refresh");
        assert_eq!(root.scheme(key).unwrap().name, "k");

        let resolver = root.resolver();
        assert_eq!(resolver.requirements("secured_service", "secure").len(), 1);
        assert_eq!(resolver.requirements("secured_service", "also_doubly_secure").len(), 2);
        assert_eq!(
            resolver.requirements("secured_service", "signin")[0].eval_name(),
            "Security scheme basic"
        );
    }

    #[test]
    fn test_multi_auth_missing_carrier_is_reported() {
        let (mut root, _, jwt, key, _) = multi_auth();
        let secure = root.security(&[jwt, key], Vec::<String>::new()).unwrap();
        root.add_endpoint_security("secured_service", "secure", secure).unwrap();

        let errors = eval::validate(&root).unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.node, "APIKeySecurity");
        assert!(error.message.contains("method \"secure\""));
    }
}
