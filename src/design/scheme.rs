//! Security scheme validation and finalization

use url::Url;

use crate::design::{
    ACCESS_TOKEN_TAG, AttributeExpr, DEFAULT_CREDENTIAL_NAME, DesignError, DesignRoot, FlowUrls, PASSWORD_TAG,
    SchemeExpr, SchemeId, SchemeKind, TOKEN_TAG, USERNAME_TAG, ValidationErrors, api_key_tag,
};

/// A payload attribute a scheme needs to read its credential from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialCarrier {
    /// Metadata tag the payload attribute must carry
    pub tag: String,
    /// What the attribute holds, as phrased in messages
    pub holds: &'static str,
    /// Name of the design helper that declares such an attribute
    pub helper: &'static str,
}

impl CredentialCarrier {
    fn new(tag: impl Into<String>, holds: &'static str, helper: &'static str) -> Self {
        Self {
            tag: tag.into(),
            holds,
            helper,
        }
    }
}

/// Payload attributes required by the given scheme
pub fn credential_carriers(scheme: &SchemeExpr) -> Vec<CredentialCarrier> {
    match scheme.kind {
        SchemeKind::BasicAuth => vec![
            CredentialCarrier::new(USERNAME_TAG, "a username", "Username"),
            CredentialCarrier::new(PASSWORD_TAG, "a password", "Password"),
        ],
        SchemeKind::ApiKey => vec![CredentialCarrier::new(
            api_key_tag(&scheme.scheme_name),
            "an API key",
            "APIKey",
        )],
        SchemeKind::Jwt => vec![CredentialCarrier::new(TOKEN_TAG, "a JWT", "Token")],
        SchemeKind::OAuth2 => vec![CredentialCarrier::new(
            ACCESS_TOKEN_TAG,
            "an OAuth2 access token",
            "AccessToken",
        )],
        SchemeKind::NoKind => Vec::new(),
    }
}

/// Output of a successful scheme validation, required to finalize it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedScheme {
    pub id: SchemeId,
    pub scheme_name: String,
    pub flows: Vec<FlowUrls>,
}

impl ValidatedScheme {
    /// Whether this result was produced by validating `scheme`
    pub fn matches(&self, scheme: &SchemeExpr) -> bool {
        self.scheme_name == scheme.scheme_name && self.flows.len() == scheme.flows.len()
    }
}

impl SchemeExpr {
    /// Check the payloads of every method secured by this scheme and the
    /// URLs of its flows.
    pub fn validate(&self, id: SchemeId, root: &DesignRoot) -> Result<ValidatedScheme, ValidationErrors> {
        let mut verr = ValidationErrors::new();

        let carriers = credential_carriers(self);
        if !carriers.is_empty() {
            for (location, payload) in secured_payloads(id, root) {
                for carrier in &carriers {
                    if !payload.has_tagged_field(&carrier.tag) {
                        verr.add(
                            self,
                            format!(
                                "payload of {location} does not define {} attribute, use {} to define one.",
                                carrier.holds, carrier.helper
                            ),
                        );
                    }
                }
            }
        }

        let mut flows = Vec::with_capacity(self.flows.len());
        for flow in &self.flows {
            match flow.validate() {
                Ok(urls) => flows.push(urls),
                Err(e) => verr.merge(e),
            }
        }

        if verr.is_empty() {
            Ok(ValidatedScheme {
                id,
                scheme_name: self.scheme_name.clone(),
                flows,
            })
        } else {
            Err(verr)
        }
    }

    /// Finalize owned flows, then default the credential name of token based schemes
    ///
    /// Fails without touching the scheme when `validated` came from another scheme.
    pub fn finalize(
        &mut self,
        validated: ValidatedScheme,
        server: Option<&Url>,
    ) -> Result<(), DesignError> {
        if !validated.matches(self) {
            return Err(DesignError::StaleValidation(self.scheme_name.clone()));
        }
        for (flow, urls) in self.flows.iter_mut().zip(validated.flows) {
            flow.finalize(urls, server);
        }
        if self.kind.is_token_based() && self.name.is_empty() {
            self.name = DEFAULT_CREDENTIAL_NAME.to_string();
        }
        Ok(())
    }
}

/// Location and payload of every method whose effective requirements use the
/// scheme, deduplicated by location, in declaration order.
fn secured_payloads(id: SchemeId, root: &DesignRoot) -> Vec<(String, &AttributeExpr)> {
    let resolver = root.resolver();
    let mut payloads: Vec<(String, &AttributeExpr)> = Vec::new();
    for svc in root.services() {
        for m in &svc.methods {
            if !resolver.uses_scheme(&svc.name, &m.name, id) {
                continue;
            }
            let location = format!("method {:?} of service {:?}", m.name, svc.name);
            if payloads.iter().all(|(loc, _)| *loc != location) {
                payloads.push((location, &m.payload));
            }
        }
    }
    payloads
}
