//! Names used to identify expressions in validation messages

use crate::design::{
    EndpointSecurityExpr, FlowExpr, SchemeExpr, SchemeKind, SecurityExpr, ServiceSecurityExpr,
};

/// Expressions that can name themselves in error messages
pub trait EvalName {
    /// Stable, human readable name of the expression
    fn eval_name(&self) -> String;
}

impl SchemeKind {
    /// Name of the security scheme kind as shown in messages
    pub fn security_name(&self) -> &'static str {
        match self {
            SchemeKind::OAuth2 => "OAuth2Security",
            SchemeKind::BasicAuth => "BasicAuthSecurity",
            SchemeKind::ApiKey => "APIKeySecurity",
            SchemeKind::Jwt => "JWTSecurity",
            SchemeKind::NoKind => "[unknown]",
        }
    }
}

impl EvalName for SchemeExpr {
    fn eval_name(&self) -> String {
        self.kind.security_name().to_string()
    }
}

impl EvalName for FlowExpr {
    fn eval_name(&self) -> String {
        if !self.token_url.is_empty() {
            return format!("flow with token URL {:?}", self.token_url);
        }
        format!("flow with refresh URL {:?}", self.refresh_url)
    }
}

impl EvalName for SecurityExpr {
    fn eval_name(&self) -> String {
        match self.schemes.iter().find(|s| !s.name.is_empty()) {
            Some(scheme) => format!("Security scheme {}", scheme.name),
            None => "Security".to_string(),
        }
    }
}

impl EvalName for ServiceSecurityExpr {
    fn eval_name(&self) -> String {
        self.security.eval_name()
    }
}

impl EvalName for EndpointSecurityExpr {
    fn eval_name(&self) -> String {
        self.security.eval_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{SchemeId, SchemeRef};

    #[test]
    fn test_scheme_names_by_kind() {
        assert_eq!(SchemeExpr::oauth2("o").eval_name(), "OAuth2Security");
        assert_eq!(SchemeExpr::basic_auth("b").eval_name(), "BasicAuthSecurity");
        assert_eq!(SchemeExpr::api_key("k").eval_name(), "APIKeySecurity");
        assert_eq!(SchemeExpr::jwt("j").eval_name(), "JWTSecurity");
        assert_eq!(SchemeExpr::no_security().eval_name(), "[unknown]");
    }

    #[test]
    fn test_flow_name_prefers_token_url() {
        let flow = FlowExpr::authorization_code("/auth", "/token", "/refresh");
        assert_eq!(flow.eval_name(), "flow with token URL \"/token\"");

        let flow = FlowExpr::implicit("/auth", "/refresh");
        assert_eq!(flow.eval_name(), "flow with refresh URL \"/refresh\"");
    }

    #[test]
    fn test_security_name() {
        assert_eq!(SecurityExpr::default().eval_name(), "Security");

        let security = SecurityExpr {
            schemes: vec![
                SchemeRef {
                    id: SchemeId(0),
                    kind: SchemeKind::Jwt,
                    name: String::new(),
                },
                SchemeRef {
                    id: SchemeId(1),
                    kind: SchemeKind::ApiKey,
                    name: "api_key".to_string(),
                },
            ],
            scopes: vec![],
        };
        assert_eq!(security.eval_name(), "Security scheme api_key");
    }
}
