//! Domain types and models

pub mod analytics;
pub mod preferences;

pub use analytics::*;
pub use preferences::*;
