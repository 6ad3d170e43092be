//! Integration tests for the crawler
//!
//! Most tests crawl an in-memory site with a known link graph. The last ones
//! use wiremock to run the full crawl cycle over HTTP.

mod common;

use common::{Resource, StaticSite, SITE};
use sitewarden::browser::{BrowserService, HttpBrowser};
use sitewarden::classify::Category;
use sitewarden::config::CrawlerConfig;
use sitewarden::crawler::Crawler;
use sitewarden::output::{format_markdown_summary, generate_summary};
use sitewarden::state::CrawlStatus;
use sitewarden::storage::{SqliteStorage, Storage};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(max_depth: u32, max_pages: u32) -> CrawlerConfig {
    CrawlerConfig {
        max_depth,
        max_pages,
        delay_ms: 0,
        page_timeout_ms: 2_000,
        ..Default::default()
    }
}

fn url(path: &str) -> String {
    format!("{}{}", SITE, path)
}

fn crawled_urls(outcome: &sitewarden::CrawlOutcome) -> Vec<String> {
    outcome.pages.iter().map(|p| p.url.clone()).collect()
}

#[tokio::test]
async fn test_two_page_cycle_at_depth_one() {
    let (browser, _) = StaticSite::new()
        .with_page("/", &["/b"])
        .with_page("/b", &["/"])
        .into_service();

    let outcome = Crawler::new(test_config(1, 50), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(outcome.job.status, CrawlStatus::Completed);
    assert_eq!(crawled_urls(&outcome), vec![url("/"), url("/b")]);
    assert_eq!(outcome.pages[0].depth, 0);
    assert_eq!(outcome.pages[1].depth, 1);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_cyclic_graph_terminates_with_unique_urls() {
    let (browser, stats) = StaticSite::new()
        .with_page("/", &["/a", "/b", "/"])
        .with_page("/a", &["/b", "/A/", "/a?utm_source=newsletter", "/"])
        .with_page("/b", &["/c", "/a#top"])
        .with_page("/c", &["/", "/a", "/b"])
        .into_service();

    let outcome = Crawler::new(test_config(10, 100), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(outcome.job.status, CrawlStatus::Completed);
    assert_eq!(outcome.pages.len(), 4);

    let unique: HashSet<&str> = outcome
        .pages
        .iter()
        .map(|p| p.normalized_url.as_str())
        .collect();
    assert_eq!(unique.len(), outcome.pages.len());
    assert_eq!(outcome.job.crawled, 4);
    assert_eq!(outcome.job.discovered, 4);

    let page_fetches = stats
        .navigations()
        .into_iter()
        .filter(|u| !u.ends_with("/robots.txt"))
        .count();
    assert_eq!(page_fetches, 4);
}

#[tokio::test]
async fn test_links_are_fetched_with_their_original_case() {
    let (browser, stats) = StaticSite::new()
        .with_page(
            "/",
            &[
                "/Actualites/Conseil?id=AbC",
                "/actualites/conseil?id=abc",
                "http://site.test/Plan",
                "https://www.site.test/Plan#haut",
            ],
        )
        .with_page("/Actualites/Conseil?id=AbC", &[])
        .with_page("/Plan", &[])
        .into_service();

    let outcome = Crawler::new(test_config(2, 100), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(
        crawled_urls(&outcome),
        vec![url("/"), url("/Actualites/Conseil?id=AbC"), url("/Plan")]
    );
    assert_eq!(
        outcome.pages[1].normalized_url,
        url("/actualites/conseil?id=abc")
    );
    assert_eq!(outcome.job.discovered, 3);

    let navigations = stats.navigations();
    assert!(navigations.contains(&url("/Actualites/Conseil?id=AbC")));
    assert!(!navigations.iter().any(|u| u.starts_with("http://")));
    assert!(!navigations.iter().any(|u| u.contains("www.")));
}

#[tokio::test]
async fn test_depth_limit() {
    let (browser, stats) = StaticSite::new()
        .with_page("/", &["/one"])
        .with_page("/one", &["/two"])
        .with_page("/two", &["/three"])
        .with_page("/three", &[])
        .into_service();

    let outcome = Crawler::new(test_config(2, 100), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(crawled_urls(&outcome), vec![url("/"), url("/one"), url("/two")]);
    assert!(outcome.pages.iter().all(|p| p.depth <= 2));
    assert!(!stats.navigations().contains(&url("/three")));
}

#[tokio::test]
async fn test_page_limit() {
    let children: Vec<String> = (0..10).map(|i| format!("/child-{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    let mut site = StaticSite::new().with_page("/", &child_refs);
    for child in &children {
        site = site.with_page(child, &["/"]);
    }
    let (browser, _) = site.into_service();

    let outcome = Crawler::new(test_config(3, 4), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(outcome.job.status, CrawlStatus::Completed);
    assert_eq!(outcome.pages.len(), 4);
    assert_eq!(outcome.job.crawled, 4);
    assert_eq!(outcome.job.discovered, 11);
}

#[tokio::test]
async fn test_fetch_failures_are_recorded_and_skipped() {
    let (browser, _) = StaticSite::new()
        .with_page("/", &["/missing", "/down", "/brochure", "/ok"])
        .with_unreachable("/down")
        .with(
            "/brochure",
            Resource::html("%PDF-1.4").with_content_type("application/pdf"),
        )
        .with_page("/ok", &[])
        .into_service();

    let outcome = Crawler::new(test_config(2, 100), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(outcome.job.status, CrawlStatus::Completed);
    assert_eq!(crawled_urls(&outcome), vec![url("/"), url("/ok")]);

    let failed: Vec<(&str, &str)> = outcome
        .errors
        .iter()
        .map(|e| (e.url.as_str(), e.message.as_str()))
        .collect();
    assert_eq!(failed.len(), 3);
    assert_eq!(failed[0], (url("/missing").as_str(), "HTTP 404"));
    assert!(failed[1].1.contains("Connection refused"));
    assert!(failed[2].1.contains("application/pdf"));
    assert!(outcome.errors.iter().all(|e| e.depth == 1));
}

#[tokio::test]
async fn test_skip_rules_and_external_links() {
    let (browser, stats) = StaticSite::new()
        .with_page(
            "/",
            &[
                "/logo.png",
                "/admin/login",
                "https://other.test/",
                "mailto:mairie@site.test",
                "/contact",
            ],
        )
        .with_page("/contact", &[])
        .with_page("/admin/login", &[])
        .into_service();

    let config = CrawlerConfig {
        exclude_paths: vec!["/admin/*".to_string()],
        ..test_config(2, 100)
    };
    let outcome = Crawler::new(config, "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(crawled_urls(&outcome), vec![url("/"), url("/contact")]);
    let navigations = stats.navigations();
    assert!(!navigations.iter().any(|u| u.contains("logo.png")));
    assert!(!navigations.iter().any(|u| u.contains("/admin")));
    assert!(!navigations.iter().any(|u| u.contains("other.test")));
}

#[tokio::test]
async fn test_robots_txt_is_honored() {
    let (browser, stats) = StaticSite::new()
        .with(
            "/robots.txt",
            Resource::html("User-agent: *\nDisallow: /prive\n").with_content_type("text/plain"),
        )
        .with_page("/", &["/prive/dossiers", "/public"])
        .with_page("/prive/dossiers", &[])
        .with_page("/public", &[])
        .into_service();

    let outcome = Crawler::new(test_config(2, 100), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(crawled_urls(&outcome), vec![url("/"), url("/public")]);
    assert!(!stats.navigations().contains(&url("/prive/dossiers")));
}

#[tokio::test]
async fn test_browser_closed_once_after_crawl() {
    let (browser, stats) = StaticSite::new().with_page("/", &[]).into_service();

    Crawler::new(test_config(1, 10), "TestBot", browser.clone())
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(stats.starts(), 1);
    assert_eq!(stats.closes(), 1);
    assert!(!browser.is_running().await);

    // closing again is a no-op
    browser.close().await.unwrap();
    assert_eq!(stats.closes(), 1);
}

#[tokio::test]
async fn test_engine_start_failure_fails_job() {
    let (browser, stats) = StaticSite::new()
        .with_page("/", &[])
        .failing_start()
        .into_service();

    let outcome = Crawler::new(test_config(1, 10), "TestBot", browser.clone())
        .crawl(&url("/"))
        .await
        .unwrap();

    assert_eq!(outcome.job.status, CrawlStatus::Failed);
    assert!(outcome.job.error.as_deref().unwrap().contains("no display"));
    assert!(outcome.job.finished_at.is_some());
    assert!(outcome.pages.is_empty());
    assert_eq!(stats.closes(), 0);
    assert!(!browser.is_running().await);
}

#[tokio::test]
async fn test_pages_are_classified_and_selected() {
    let (browser, _) = StaticSite::new()
        .with_page("/", &["/contact", "/mentions-legales", "/divers", "/nous-contacter"])
        .with_page("/contact", &[])
        .with_page("/mentions-legales", &[])
        .with_page("/divers", &[])
        .with_page("/nous-contacter", &[])
        .into_service();

    let outcome = Crawler::new(test_config(1, 100), "TestBot", browser)
        .crawl(&url("/"))
        .await
        .unwrap();

    let home = &outcome.pages[0];
    assert_eq!(home.category, Category::Homepage);
    assert!(home.selected_for_audit);

    let selected: Vec<Category> = outcome.selected_pages().map(|p| p.category).collect();
    assert_eq!(
        selected,
        vec![Category::Homepage, Category::Contact, Category::LegalNotices]
    );
}

#[tokio::test]
async fn test_crawl_persists_to_database() {
    let dir = TempDir::new().unwrap();
    let storage = SqliteStorage::new(&dir.path().join("crawl.db")).unwrap();
    let storage = Arc::new(Mutex::new(storage));

    let (browser, _) = StaticSite::new()
        .with_page("/", &["/a", "/gone"])
        .with_page("/a", &[])
        .into_service();

    let outcome = Crawler::new(test_config(2, 100), "TestBot", browser)
        .with_storage(storage.clone())
        .with_config_hash("cafebabe")
        .crawl(&url("/"))
        .await
        .unwrap();

    let job_id = outcome.job.id.unwrap();
    let storage = storage.lock().unwrap();
    let record = storage.get_job(job_id).unwrap();
    assert_eq!(record.status, CrawlStatus::Completed);
    assert_eq!(record.crawled, 2);
    assert_eq!(storage.get_pages(job_id).unwrap().len(), 2);
    assert_eq!(storage.get_errors(job_id).unwrap().len(), 1);

    let summary = generate_summary(&*storage, Some(job_id)).unwrap();
    assert_eq!(summary.config_hash, "cafebabe");
    let markdown = format_markdown_summary(&summary);
    assert!(markdown.contains("- **Pages Crawled**: 2"));
    assert!(markdown.contains("HTTP 404"));
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html><head><title>Accueil</title></head><body>
                    <a href="/contact">Contact</a>
                    <a href="/plan-du-site">Plan du site</a>
                    <a href="https://elsewhere.test/">Ailleurs</a>
                    </body></html>"#,
                "text/html",
            ),
        )
        .mount(&mock_server)
        .await;

    for (route, title) in [("/contact", "Contact"), ("/plan-du-site", "Plan du site")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    format!(
                        "<html><head><title>{}</title></head><body><a href=\"/\">Accueil</a></body></html>",
                        title
                    ),
                    "text/html",
                ),
            )
            .mount(&mock_server)
            .await;
    }

    let engine = Arc::new(HttpBrowser::with_user_agent("TestBot/1.0"));
    let browser = Arc::new(BrowserService::new(engine));

    let outcome = Crawler::new(test_config(2, 100), "TestBot", browser.clone())
        .crawl(&format!("{}/", base_url))
        .await
        .unwrap();

    assert_eq!(outcome.job.status, CrawlStatus::Completed);
    assert_eq!(outcome.pages.len(), 3);
    assert!(outcome.pages.iter().all(|p| p.http_status == 200));

    let categories: Vec<Category> = outcome.pages.iter().map(|p| p.category).collect();
    assert_eq!(
        categories,
        vec![Category::Homepage, Category::Contact, Category::Sitemap]
    );
    assert_eq!(outcome.pages[1].title.as_deref(), Some("Contact"));
    assert!(!browser.is_running().await);
}
