//! # DashSync App
//!
//! Application layer - context wiring and the command surface.
//!
//! This crate contains:
//! - Commands (UI → services bridge)
//! - Application context (dependency injection)
//! - Logging bootstrap
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Exposes a `watch` subscription for analytics loading state

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
