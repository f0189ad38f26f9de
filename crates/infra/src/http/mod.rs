//! Retrying HTTP transport shared by the backend clients.

mod client;

pub use client::{HttpClient, HttpClientBuilder};
