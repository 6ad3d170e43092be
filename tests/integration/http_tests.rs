//! HTTP-level tests for the HTTP engine and the PageSpeed client

use sitewarden::audit::{PageSpeedEngine, PerformanceAuditEngine};
use sitewarden::browser::{BrowserPage, BrowserService, HttpBrowser};
use sitewarden::config::AuditConfig;
use sitewarden::BrowserError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn started_service() -> Arc<BrowserService> {
    let engine = Arc::new(HttpBrowser::with_user_agent("TestBot/1.0 (+https://bot.test)"));
    let service = Arc::new(BrowserService::new(engine));
    service.start().await.unwrap();
    service
}

#[tokio::test]
async fn test_navigate_reports_status_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accueil"))
        .and(header("user-agent", "TestBot/1.0 (+https://bot.test)"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Powered-By", "PHP/8.2")
                .insert_header("Set-Cookie", "PHPSESSID=abc; Path=/")
                .set_body_raw("<html><title>Accueil</title></html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let service = started_service().await;
    let mut page = service.page().await.unwrap();
    let response = page
        .navigate(&format!("{}/accueil", server.uri()), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_html());
    assert_eq!(response.header("x-powered-by"), Some("PHP/8.2"));
    assert!(response.headers.iter().all(|(name, _)| name == &name.to_lowercase()));
    assert_eq!(response.cookie_names(), vec!["PHPSESSID"]);
    assert!(response.html.contains("<title>Accueil</title>"));
}

#[tokio::test]
async fn test_error_statuses_are_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/absent"))
        .respond_with(ResponseTemplate::new(404).set_body_string("introuvable"))
        .mount(&server)
        .await;

    let service = started_service().await;
    let mut page = service.page().await.unwrap();
    let response = page
        .navigate(&format!("{}/absent", server.uri()), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_redirects_report_final_url() {
    let server = MockServer::start().await;
    let target = format!("{}/nouveau", server.uri());
    Mock::given(method("GET"))
        .and(path("/ancien"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", target.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nouveau"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let service = started_service().await;
    let mut page = service.page().await.unwrap();
    let response = page
        .navigate(&format!("{}/ancien", server.uri()), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_html());
    assert_eq!(response.final_url, target);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(1_500))
                .set_body_string("<html></html>"),
        )
        .mount(&server)
        .await;

    let service = started_service().await;
    let mut page = service.page().await.unwrap();
    let result = page
        .navigate(&format!("{}/lent", server.uri()), Duration::from_millis(200))
        .await;

    match result {
        Err(BrowserError::Timeout { timeout_ms, .. }) => assert_eq!(timeout_ms, 200),
        other => panic!("expected a timeout, got {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn test_scripts_and_screenshots_are_unsupported() {
    let service = started_service().await;
    let mut page = service.page().await.unwrap();

    assert!(matches!(
        page.evaluate("document.title").await,
        Err(BrowserError::Unsupported(_))
    ));
    assert!(matches!(page.screenshot().await, Err(BrowserError::Unsupported(_))));
}

#[tokio::test]
async fn test_pages_unavailable_after_close() {
    let service = started_service().await;
    service.close().await.unwrap();
    assert!(matches!(service.page().await, Err(BrowserError::Closed)));
}

fn pagespeed_config(server: &MockServer) -> AuditConfig {
    AuditConfig {
        pagespeed_endpoint: format!("{}/runPagespeed", server.uri()),
        pagespeed_api_key: Some("cle-test".to_string()),
        performance_timeout_ms: 5_000,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_pagespeed_scores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .and(query_param("url", "https://mairie.test/"))
        .and(query_param("strategy", "mobile"))
        .and(query_param("key", "cle-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lighthouseResult": {
                "categories": {
                    "performance": {"score": 0.37},
                    "accessibility": {"score": 0.81},
                    "best-practices": {"score": 0.92},
                    "seo": {"score": 1.0}
                }
            }
        })))
        .mount(&server)
        .await;

    let engine = PageSpeedEngine::new(&pagespeed_config(&server)).unwrap();
    let scores = engine.audit("https://mairie.test/").await.unwrap();

    assert_eq!(scores.performance, Some(0.37));
    assert_eq!(scores.accessibility, Some(0.81));
    assert_eq!(scores.best_practices, Some(0.92));
    assert_eq!(scores.seo, Some(1.0));
    assert!(scores.error.is_none());
}

#[tokio::test]
async fn test_pagespeed_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let engine = PageSpeedEngine::new(&pagespeed_config(&server)).unwrap();
    let error = engine.audit("https://mairie.test/").await.unwrap_err();

    assert!(error.to_string().contains("HTTP 429"));
}

#[tokio::test]
async fn test_pagespeed_report_without_scores() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"kind": "pagespeedonline#result"})))
        .mount(&server)
        .await;

    let engine = PageSpeedEngine::new(&pagespeed_config(&server)).unwrap();
    assert!(engine.audit("https://mairie.test/").await.is_err());
}
