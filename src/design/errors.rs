//! Error types for the design domain

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::design::EvalName;

/// A single validation failure attached to the expression that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Diagnostic name of the offending expression, e.g. `BasicAuthSecurity`
    pub node: String,
    /// Human readable description of the problem
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.node, self.message)
    }
}

/// Validation failures accumulated across a validation pass.
///
/// Validation never stops at the first problem: every check adds to the
/// collection and the caller decides what to do once the whole pass is over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against the given expression
    pub fn add<E: EvalName + ?Sized>(&mut self, node: &E, message: impl Into<String>) {
        self.add_named(node.eval_name(), message);
    }

    /// Record a failure against an already rendered node name
    pub fn add_named(&mut self, node: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError {
            node: node.into(),
            message: message.into(),
        });
    }

    /// Move all failures of `other` into this collection
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Errors raised while building, loading or evaluating a design
#[derive(Error, Debug)]
pub enum DesignError {
    #[error("Validation failed:\n{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Unknown method {method:?} of service {service:?}")]
    UnknownMethod { service: String, method: String },

    #[error("Unknown security scheme: {0}")]
    UnknownScheme(String),

    #[error("Validation result does not belong to security scheme {0:?}")]
    StaleValidation(String),

    #[error("Invalid design document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}
