//! scaffold-plugins library
//!
//! Plugins for a service scaffolding generator:
//!
//! - [`design`] extends the generator's expression model with security
//!   schemes and requirements, validated and finalized in two passes.
//! - [`plugins`] rewrites generated sources to integrate a toolkit and a
//!   structured logger.
//! - [`infrastructure`] loads design documents and renders resolved
//!   requirements.
#![deny(unsafe_code)]

pub mod config;
pub mod design;
pub mod infrastructure;
pub mod plugins;

pub use config::Config;
pub use design::{DesignError, DesignRoot, ValidationErrors};
