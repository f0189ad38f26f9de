#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use dashsync_infra::{BackendClient, HttpClient};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-token";

static TRACING: Once = Once::new();

/// Route adapter logs to the test harness output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dashsync_infra=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Backend client pointed at `server` with fast retries and a bearer token.
pub fn backend_for(server: &MockServer) -> BackendClient {
    init_tracing();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {TEST_TOKEN}")).expect("header value"),
    );

    let http = HttpClient::builder()
        .timeout(Duration::from_secs(5))
        .max_attempts(2)
        .base_backoff(Duration::from_millis(5))
        .default_headers(headers)
        .build()
        .expect("http client");

    BackendClient::new(&server.uri(), http).expect("backend client")
}
