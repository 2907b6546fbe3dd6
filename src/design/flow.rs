//! OAuth2 flow validation and finalization
//!
//! Validation parses every URL of a flow once and hands the parsed form to
//! finalization, which completes relative URLs against the API's first
//! server. Finalization can only be reached with the output of validation.

use once_cell::sync::Lazy;
use url::{ParseError, Position, Url};

use crate::design::{EvalName, FlowExpr, ValidationErrors};

// Placeholder base used to check the grammar of relative references.
static RELATIVE_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://relative.invalid/").expect("static base URL is valid"));

/// A flow URL field after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowUrl {
    /// The field is empty
    Unset,
    /// The field already names a scheme and host
    Absolute(Url),
    /// Path, query and fragment of a relative reference as declared, starting
    /// with `/`, `?` or `#`
    Relative(String),
}

impl FlowUrl {
    /// Parse a raw field value
    pub fn parse(raw: &str) -> Result<Self, String> {
        if raw.is_empty() {
            return Ok(FlowUrl::Unset);
        }
        match Url::parse(raw) {
            Ok(url) if url.has_host() => Ok(FlowUrl::Absolute(url)),
            Ok(_) => Err("URL has a scheme but no host".to_string()),
            Err(ParseError::RelativeUrlWithoutBase) => {
                RELATIVE_BASE.join(raw).map_err(|e| e.to_string())?;
                Ok(FlowUrl::Relative(relative_suffix(raw)))
            }
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, FlowUrl::Relative(_))
    }
}

// Path, query and fragment text of a relative reference. A network-path
// reference loses its authority, and a non-empty path gains a leading `/`.
fn relative_suffix(raw: &str) -> String {
    let rest = match raw.strip_prefix("//") {
        Some(authority) => authority
            .find(['/', '?', '#'])
            .map_or("", |i| &authority[i..]),
        None => raw,
    };
    if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
        rest.to_string()
    } else {
        format!("/{rest}")
    }
}

/// Parsed URLs of a validated flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowUrls {
    pub authorization: FlowUrl,
    pub token: FlowUrl,
    pub refresh: FlowUrl,
}

impl FlowUrls {
    /// No field needs completing
    pub fn is_complete(&self) -> bool {
        !(self.authorization.is_relative() || self.token.is_relative() || self.refresh.is_relative())
    }
}

impl FlowExpr {
    /// Check that every URL field parses. All fields are checked.
    pub fn validate(&self) -> Result<FlowUrls, ValidationErrors> {
        let mut verr = ValidationErrors::new();
        let token = self.check_url("token", &self.token_url, &mut verr);
        let authorization = self.check_url("authorization", &self.authorization_url, &mut verr);
        let refresh = self.check_url("refresh", &self.refresh_url, &mut verr);

        if !self.kind.uses_authorization_url() && !self.authorization_url.is_empty() {
            tracing::debug!(
                flow = %self.eval_name(),
                kind = %self.kind,
                "Authorization URL is not used by this flow kind"
            );
        }
        if !self.kind.uses_token_url() && !self.token_url.is_empty() {
            tracing::debug!(
                flow = %self.eval_name(),
                kind = %self.kind,
                "Token URL is not used by this flow kind"
            );
        }

        match (authorization, token, refresh) {
            (Some(authorization), Some(token), Some(refresh)) if verr.is_empty() => Ok(FlowUrls {
                authorization,
                token,
                refresh,
            }),
            _ => Err(verr),
        }
    }

    fn check_url(&self, field: &str, raw: &str, verr: &mut ValidationErrors) -> Option<FlowUrl> {
        match FlowUrl::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                verr.add(self, format!("invalid {field} URL {raw:?}: {e}"));
                None
            }
        }
    }

    /// Complete relative URLs with the scheme and host of `server`.
    ///
    /// Absolute and empty fields are left untouched. Without a server the
    /// relative fields stay as declared.
    pub fn finalize(&mut self, urls: FlowUrls, server: Option<&Url>) {
        if urls.is_complete() {
            return;
        }
        let Some(server) = server else {
            tracing::warn!(
                flow = %self.eval_name(),
                "API declares no usable server, relative flow URLs left unresolved"
            );
            return;
        };

        let name = self.eval_name();
        resolve(&name, &mut self.token_url, urls.token, server);
        resolve(&name, &mut self.authorization_url, urls.authorization, server);
        resolve(&name, &mut self.refresh_url, urls.refresh, server);
    }
}

fn resolve(flow: &str, field: &mut String, url: FlowUrl, server: &Url) {
    let FlowUrl::Relative(reference) = url else {
        return;
    };
    let absolute = format!(
        "{}://{}{reference}",
        server.scheme(),
        &server[Position::BeforeHost..Position::BeforePath]
    );
    tracing::debug!(flow, from = %field, to = %absolute, "Completed relative flow URL");
    *field = absolute;
}
