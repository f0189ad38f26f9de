//! Clients for the hosted dashboard backend.
//!
//! Both clients share one [`BackendClient`]: base URL, bearer token and the
//! retrying [`HttpClient`](crate::http::HttpClient).

pub mod analytics;
pub mod client;
pub mod preferences;

pub use analytics::HttpAnalyticsClient;
pub use client::BackendClient;
pub use preferences::HttpPreferencesClient;
