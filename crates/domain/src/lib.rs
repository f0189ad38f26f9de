//! # DashSync Domain
//!
//! Domain types for the dashboard's analytics cache and preference sync.
//!
//! This crate contains:
//! - Preference and analytics data types
//! - The domain error type and `Result` alias
//! - Configuration structures
//! - Storage keys and other constants
//!
//! ## Architecture
//! - No dependencies on other DashSync crates
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
