//! # DashSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Key-value backends for client preferences (memory, JSON file)
//! - HTTP clients for the hosted analytics and preference APIs
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Implements traits defined in `dashsync-core`
//! - Contains all "impure" code (filesystem, network)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use api::{BackendClient, HttpAnalyticsClient, HttpPreferencesClient};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use storage::{FileKeyValueStore, MemoryKeyValueStore, UnavailableKeyValueStore};
