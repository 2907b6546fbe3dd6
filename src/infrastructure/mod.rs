//! Infrastructure layer - design document loading and report output

pub mod document;
pub mod loader;
pub mod output;

pub use document::*;
pub use loader::*;
pub use output::*;
