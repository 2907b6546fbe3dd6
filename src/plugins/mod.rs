//! Source-rewriting plugins
//!
//! Plugins run after a generator stage and receive every file it produced.
//! They can rewrite sections, extend import lists and add new files.

pub mod errors;
pub mod file;
pub mod kit;
pub mod logger;
pub mod naming;
pub mod registry;
pub mod templates;
pub mod traits;

pub use errors::*;
pub use file::*;
pub use kit::*;
pub use logger::*;
pub use registry::*;
pub use traits::*;
