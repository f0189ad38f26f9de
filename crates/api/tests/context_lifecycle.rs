//! AppContext construction from configuration.

use dashsync_app::{commands, AppContext};
use dashsync_domain::{
    AnalyticsConfig, Config, Language, StorageBackend, StorageConfig, Theme,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn file_config(dir: &TempDir) -> Config {
    Config {
        storage: StorageConfig {
            backend: StorageBackend::File,
            path: dir.path().join("prefs.json").to_string_lossy().into_owned(),
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn test_file_backed_context_survives_restart() {
    let dir = TempDir::new().unwrap();

    let ctx = AppContext::new(file_config(&dir)).expect("context");
    commands::set_theme(&ctx, "dark".into()).await.unwrap();
    drop(ctx);

    let reopened = AppContext::new(file_config(&dir)).expect("context");
    let prefs = commands::get_client_preferences(&reopened).await.unwrap();
    assert_eq!(prefs.theme, Theme::Dark);
}

#[tokio::test]
async fn test_unreadable_preference_file_fails_construction() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("prefs.json"), "{ not json").unwrap();

    assert!(AppContext::new(file_config(&dir)).is_err());
}

#[tokio::test]
async fn test_configured_backend_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "language": "es" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/user/preferences"))
        .and(body_json(json!({ "language": "zh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "language": "zh" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/billing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mrr": 1200 })))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        analytics: AnalyticsConfig {
            base_url: server.uri(),
            api_token: Some("token".into()),
            ..AnalyticsConfig::default()
        },
        ..Config::default()
    };
    let ctx = AppContext::new(config).expect("context");
    assert!(ctx.analytics.is_configured());

    let merged = commands::pull_preferences(&ctx).await.unwrap();
    assert_eq!(merged.client.language, Some(Language::Es));

    assert!(commands::set_language(&ctx, "zh".into()).await.unwrap());

    let snapshot = commands::get_analytics(&ctx, "billing".into(), Default::default())
        .await
        .unwrap();
    assert_eq!(snapshot.data, json!({ "mrr": 1200 }));
    // second read is served from cache; the mock expects one call
    commands::get_analytics(&ctx, "billing".into(), Default::default()).await.unwrap();
}
