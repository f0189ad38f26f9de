//! Shared test helpers for `dashsync-core` integration tests.
//!
//! In-memory and failure-injecting implementations of the core ports so the
//! suites can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod analytics;
pub mod stores;
