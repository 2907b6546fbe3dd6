//! Two-phase evaluation of the security expressions
//!
//! Every scheme is validated (its flows first) and all failures are
//! collected before anything is finalized. Finalization consumes the output
//! of validation, so it cannot run on a design that was not validated.

use crate::design::{DesignError, DesignRoot, ValidatedScheme, ValidationErrors};

/// Proof that every scheme of a design passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    schemes: Vec<ValidatedScheme>,
}

impl Validated {
    pub fn schemes(&self) -> &[ValidatedScheme] {
        &self.schemes
    }
}

/// Validate every scheme of the design, collecting all failures
pub fn validate(root: &DesignRoot) -> Result<Validated, ValidationErrors> {
    let mut verr = ValidationErrors::new();
    let mut schemes = Vec::new();

    for (id, scheme) in root.schemes() {
        tracing::debug!(
            scheme = %scheme.scheme_name,
            kind = %scheme.kind,
            flows = scheme.flows.len(),
            "Validating security scheme"
        );
        match scheme.validate(id, root) {
            Ok(validated) => schemes.push(validated),
            Err(e) => verr.merge(e),
        }
    }

    if verr.is_empty() {
        Ok(Validated { schemes })
    } else {
        tracing::debug!(errors = verr.len(), "Security validation failed");
        Err(verr)
    }
}

/// Finalize every validated scheme
///
/// `validated` must come from validating this same design. A result that does
/// not line up with the design's schemes is rejected before anything changes.
pub fn finalize(root: &mut DesignRoot, validated: Validated) -> Result<(), DesignError> {
    for scheme in &validated.schemes {
        match root.scheme(scheme.id) {
            Some(expr) if scheme.matches(expr) => {}
            Some(expr) => return Err(DesignError::StaleValidation(expr.scheme_name.clone())),
            None => return Err(DesignError::StaleValidation(scheme.scheme_name.clone())),
        }
    }

    let server = root.base_server_url();
    for scheme in validated.schemes {
        if let Some(expr) = root.scheme_mut(scheme.id) {
            expr.finalize(scheme, server.as_ref())?;
            tracing::debug!(scheme = %expr.scheme_name, "Finalized security scheme");
        }
    }
    Ok(())
}

/// Validate then finalize the design
pub fn run(root: &mut DesignRoot) -> Result<(), DesignError> {
    let validated = validate(root)?;
    finalize(root, validated)?;
    tracing::info!(
        api = %root.api.name,
        schemes = root.schemes().count(),
        "Security design evaluated"
    );
    Ok(())
}
