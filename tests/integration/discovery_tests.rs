//! Integration tests for the discovery pipeline
//!
//! These tests use wiremock to stand in for the target site and the curation
//! service, and a stub curator where deterministic curation is needed.

use async_trait::async_trait;
use audit_scout::config::{Config, DiscoveryConfig};
use audit_scout::sitemap::SitemapResolver;
use audit_scout::{
    ChatCurator, CuratedUrl, CurationError, CurationStage, Curator, Discoverer, DiscoveryError,
    HeadFragments,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::Client;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Curator that echoes its input back with a fixed category
#[derive(Default)]
struct EchoCurator {
    category: String,
    narrow_limit: Option<usize>,
    fail_narrow: bool,
    extra: Vec<CuratedUrl>,
    candidates: Mutex<Vec<String>>,
    heads: Mutex<HeadFragments>,
    calls: AtomicUsize,
}

impl EchoCurator {
    fn with_category(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Curator for EchoCurator {
    async fn narrow_down(
        &self,
        urls: &[String],
        _category: &str,
    ) -> Result<Vec<String>, CurationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.candidates.lock().unwrap() = urls.to_vec();

        if self.fail_narrow {
            return Err(CurationError::Llm("service unavailable".to_string()));
        }

        let limit = self.narrow_limit.unwrap_or(urls.len());
        Ok(urls.iter().take(limit).cloned().collect())
    }

    async fn select_and_categorize(
        &self,
        urls: &[String],
        heads: &HeadFragments,
        _category: &str,
    ) -> Result<Vec<CuratedUrl>, CurationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.heads.lock().unwrap() = heads.clone();

        Ok(urls
            .iter()
            .map(|url| CuratedUrl {
                url: url.clone(),
                category: self.category.clone(),
            })
            .chain(self.extra.iter().cloned())
            .collect())
    }
}

fn fast_config() -> DiscoveryConfig {
    DiscoveryConfig {
        head_delay_ms: 0,
        ..DiscoveryConfig::default()
    }
}

fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{}</loc></url>", u))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|u| format!("<sitemap><loc>{}</loc></sitemap>", u))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

async fn mount_body(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts a catch-all page handler; must be mounted after specific routes
async fn mount_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Page</title><script>track()</script></head><body></body></html>",
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_three_urls() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages: Vec<String> = (1..=3).map(|i| format!("{}/page{}", base, i)).collect();

    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_pages(&server).await;

    let curator = Arc::new(EchoCurator::with_category("test"));
    let discoverer = Discoverer::new(Client::new(), curator.clone(), fast_config());

    let results = discoverer.discover(&base, "news").await.unwrap();

    assert_eq!(results.len(), 3);
    for (result, page) in results.iter().zip(&pages) {
        assert_eq!(&result.url, page);
        assert_eq!(result.category, "test");
        assert_eq!(result.status, "200 OK");
    }

    let heads = curator.heads.lock().unwrap();
    assert_eq!(heads.len(), 3);
    assert!(heads.values().all(|h| h == "<title>Page</title>"));
    assert_eq!(curator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_index_with_unreachable_child_returns_remaining_urls() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_body(
        &server,
        "/sitemap.xml",
        sitemap_index(&[
            format!("{}/sitemap-a.xml", base),
            format!("{}/sitemap-missing.xml", base),
            format!("{}/sitemap-b.xml", base),
        ]),
    )
    .await;
    mount_body(&server, "/sitemap-a.xml", urlset(&[format!("{}/a", base)])).await;
    mount_body(
        &server,
        "/sitemap-b.xml",
        urlset(&[format!("{}/b1", base), format!("{}/b2", base)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/sitemap-missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = Client::new();
    let urls = SitemapResolver::new(&client, 3).resolve(&base).await.unwrap();

    assert_eq!(
        urls,
        vec![
            format!("{}/a", base),
            format!("{}/b1", base),
            format!("{}/b2", base),
        ]
    );
}

#[tokio::test]
async fn test_gz_sitemap_parses_like_plain() {
    let plain_server = MockServer::start().await;
    let gz_server = MockServer::start().await;
    let urls: Vec<String> = (0..5).map(|i| format!("https://example.com/p{}", i)).collect();
    let xml = urlset(&urls);

    mount_body(&plain_server, "/sitemap.xml", xml.clone()).await;

    mount_body(
        &gz_server,
        "/sitemap.xml",
        sitemap_index(&[format!("{}/sitemap-pages.xml.gz", gz_server.uri())]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/sitemap-pages.xml.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(&xml)))
        .mount(&gz_server)
        .await;

    let client = Client::builder().gzip(true).build().unwrap();
    let resolver = SitemapResolver::new(&client, 3);

    let plain = resolver.resolve(&plain_server.uri()).await.unwrap();
    let compressed = resolver.resolve(&gz_server.uri()).await.unwrap();

    assert_eq!(plain, urls);
    assert_eq!(compressed, plain);
}

#[tokio::test]
async fn test_content_encoded_sitemap_parses_like_plain() {
    let server = MockServer::start().await;
    let urls: Vec<String> = (0..4).map(|i| format!("https://example.com/e{}", i)).collect();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .insert_header("content-type", "application/xml")
                .set_body_bytes(gzip(&urlset(&urls))),
        )
        .mount(&server)
        .await;

    let client = Client::builder().gzip(true).build().unwrap();
    let resolved = SitemapResolver::new(&client, 3)
        .resolve(&server.uri())
        .await
        .unwrap();

    assert_eq!(resolved, urls);
}

#[tokio::test]
async fn test_large_sitemap_is_sampled_before_curation() {
    let server = MockServer::start().await;
    let base = server.uri();

    let shortest: Vec<String> = (0..20).map(|i| format!("{}/s{}", base, i)).collect();
    let mut all = shortest.clone();
    all.extend((0..230).map(|i| format!("{}/catalog/products/item-{}", base, i)));

    mount_body(&server, "/sitemap.xml", urlset(&all)).await;
    mount_pages(&server).await;

    let curator = Arc::new(EchoCurator {
        category: "page".to_string(),
        narrow_limit: Some(5),
        ..EchoCurator::default()
    });
    let discoverer = Discoverer::new(Client::new(), curator.clone(), fast_config());

    let results = discoverer.discover(&base, "").await.unwrap();
    assert_eq!(results.len(), 5);

    let candidates = curator.candidates.lock().unwrap();
    assert_eq!(candidates.len(), 200);
    for url in &shortest {
        assert!(candidates.contains(url), "missing short URL {}", url);
    }
    assert!(candidates.iter().all(|url| all.contains(url)));
}

#[tokio::test]
async fn test_results_are_bounded_by_final_size() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages: Vec<String> = (0..12).map(|i| format!("{}/page{}", base, i)).collect();

    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_pages(&server).await;

    let curator = Arc::new(EchoCurator::with_category("test"));
    let discoverer = Discoverer::new(Client::new(), curator, fast_config());

    let results = discoverer.discover(&base, "").await.unwrap();

    assert_eq!(results.len(), 10);
    assert_eq!(results[0].url, pages[0]);
}

#[tokio::test]
async fn test_unreachable_selected_url_gets_error_status() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages = vec![format!("{}/home", base)];

    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;
    mount_pages(&server).await;

    let curator = Arc::new(EchoCurator {
        category: "test".to_string(),
        extra: vec![CuratedUrl {
            url: "http://127.0.0.1:1/offline".to_string(),
            category: "test".to_string(),
        }],
        ..EchoCurator::default()
    });
    let discoverer = Discoverer::new(Client::new(), curator, fast_config());

    let results = discoverer.discover(&base, "").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, "200 OK");
    assert!(results[1].status.starts_with("Error: "));
}

#[tokio::test]
async fn test_missing_sitemap_aborts_before_curation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let curator = Arc::new(EchoCurator::with_category("test"));
    let discoverer = Discoverer::new(Client::new(), curator.clone(), fast_config());

    let err = discoverer.discover(&server.uri(), "").await.unwrap_err();

    assert!(matches!(err, DiscoveryError::Fetch { .. }));
    assert_eq!(curator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_sitemap_skips_curation() {
    let server = MockServer::start().await;
    mount_body(&server, "/sitemap.xml", urlset(&[])).await;

    let curator = Arc::new(EchoCurator::with_category("test"));
    let discoverer = Discoverer::new(Client::new(), curator.clone(), fast_config());

    let results = discoverer.discover(&server.uri(), "").await.unwrap();

    assert!(results.is_empty());
    assert_eq!(curator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_narrow_down_failure_aborts_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_body(&server, "/sitemap.xml", urlset(&[format!("{}/a", base)])).await;

    let curator = Arc::new(EchoCurator {
        fail_narrow: true,
        ..EchoCurator::default()
    });
    let discoverer = Discoverer::new(Client::new(), curator.clone(), fast_config());

    let err = discoverer.discover(&base, "").await.unwrap_err();

    match err {
        DiscoveryError::Curation { stage, source } => {
            assert_eq!(stage, CurationStage::NarrowDown);
            assert!(matches!(source, CurationError::Llm(_)));
        }
        other => panic!("expected curation error, got {:?}", other),
    }
    assert_eq!(curator.calls.load(Ordering::SeqCst), 1);
}

fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

fn chat_discoverer(server: &MockServer) -> Discoverer {
    let mut config = Config::default();
    config.curation.base_url = format!("{}/v1", server.uri());
    config.discovery = fast_config();

    let client = Client::new();
    let curator = ChatCurator::new(client.clone(), "test-key", &config);
    Discoverer::new(client, Arc::new(curator), config.discovery)
}

#[tokio::test]
async fn test_malformed_narrow_down_response_is_format_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_body(&server, "/sitemap.xml", urlset(&[format!("{}/a", base)])).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_completion("[\"unterminated")),
        )
        .mount(&server)
        .await;

    let err = chat_discoverer(&server).discover(&base, "").await.unwrap_err();

    assert!(err.is_format_error());
    assert!(matches!(
        err,
        DiscoveryError::Curation {
            stage: CurationStage::NarrowDown,
            ..
        }
    ));
}

#[tokio::test]
async fn test_chat_curated_run_with_fenced_responses() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages = vec![format!("{}/", base), format!("{}/contact", base)];

    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("HTML head sections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(&format!(
            "```json\n[{{\"url\": \"{}\", \"category\": \"contact\"}}]\n```",
            pages[1]
        ))))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(&format!(
            "```json\n[\"{}\", \"{}\"]\n```",
            pages[0], pages[1]
        ))))
        .mount(&server)
        .await;

    mount_pages(&server).await;

    let results = chat_discoverer(&server).discover(&base, "support").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, pages[1]);
    assert_eq!(results[0].category, "contact");
    assert_eq!(results[0].status, "200 OK");
}

#[tokio::test]
async fn test_malformed_categorize_response_is_format_error() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages = vec![format!("{}/a", base)];

    mount_body(&server, "/sitemap.xml", urlset(&pages)).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("HTML head sections"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_completion("I picked /a as home.")),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_completion(&format!("[\"{}\"]", pages[0]))),
        )
        .mount(&server)
        .await;

    mount_pages(&server).await;

    let err = chat_discoverer(&server).discover(&base, "").await.unwrap_err();

    assert!(err.is_format_error());
    assert!(matches!(
        err,
        DiscoveryError::Curation {
            stage: CurationStage::Categorize,
            ..
        }
    ));
}

#[tokio::test]
async fn test_run_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(urlset(&[]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = DiscoveryConfig {
        run_timeout_secs: Some(1),
        ..fast_config()
    };
    let discoverer = Discoverer::new(
        Client::new(),
        Arc::new(EchoCurator::with_category("test")),
        config,
    );

    let err = discoverer.discover(&server.uri(), "").await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Timeout(_)));
}

#[tokio::test]
async fn test_invalid_site_url_is_rejected() {
    let discoverer = Discoverer::new(
        Client::new(),
        Arc::new(EchoCurator::with_category("test")),
        fast_config(),
    );

    let err = discoverer.discover("not a url", "").await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Fetch { .. }));
}
