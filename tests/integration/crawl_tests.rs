//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end, from a TOML config file to the page records,
//! metrics log and database on disk.

use canopy_crawl::config::{load_config_with_hash, Config};
use canopy_crawl::crawler::run_crawl;
use canopy_crawl::output::{load_statistics, METRICS_COLUMNS};
use canopy_crawl::state::PageStatus;
use canopy_crawl::storage::{RunStatus, SqliteStorage, Storage};
use canopy_crawl::{CanopyError, Page};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config for a crawl of `base_url` into `dir` and loads it
fn write_config(dir: &TempDir, base_url: &str, crawler_extra: &str) -> (Config, String) {
    let config = format!(
        r#"
[crawler]
seeds = ["{base}/"]
max-concurrent-fetches = 1
request-timeout-secs = 5
max-retries = 0
retry-delay-ms = 10
{extra}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
pages-path = "{dir}/pages.jsonl"
metrics-path = "{dir}/metrics.csv"
database-path = "{dir}/crawl.db"

[policy]
allowed-domains = ["127.0.0.1"]
deny-substrings = ["/logout"]
"#,
        base = base_url,
        extra = crawler_extra,
        dir = dir.path().display()
    );

    let config_path = dir.path().join("crawl.toml");
    std::fs::write(&config_path, config).expect("Failed to write config");
    load_config_with_hash(&config_path).expect("Failed to load config")
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

fn read_pages(dir: &TempDir) -> Vec<Page> {
    std::fs::read_to_string(dir.path().join("pages.jsonl"))
        .expect("Failed to read page records")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid page record"))
        .collect()
}

fn read_metrics(dir: &TempDir) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(dir.path().join("metrics.csv"))
        .expect("Failed to open metrics log");
    let headers = reader.headers().expect("Missing header").clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), METRICS_COLUMNS.to_vec());
    reader
        .records()
        .map(|record| record.expect("Invalid metrics row"))
        .collect()
}

fn column(row: &csv::StringRecord, name: &str) -> String {
    let index = METRICS_COLUMNS
        .iter()
        .position(|c| *c == name)
        .expect("Unknown column");
    row[index].to_string()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;

    mount_html(
        &server,
        "/",
        r#"<html><head>
            <title>Research Home</title>
            <meta name="description" content="Computing research at the institute">
        </head><body>
            <main><p>Robotics research and machine learning research groups.</p></main>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="/private">Private</a>
            <a href="/report.pdf">Report</a>
            <a href="https://www.example.org/">Elsewhere</a>
        </body></html>"#,
    )
    .await;

    mount_html(
        &server,
        "/page1",
        r#"<html><head><title>Page One</title></head><body>
            <p>Robotics laboratory</p>
            <a href="/">Home</a>
            <a href="/page2#people">Page 2</a>
            <a href="/logout">Log out</a>
        </body></html>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (config, hash) = write_config(&dir, &base, "");
    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_crawled, 2);
    assert_eq!(report.fetch_failures, 2);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.frontier.crawled, 2);

    let pages = read_pages(&dir);
    assert_eq!(pages.len(), 2);

    let home = &pages[0];
    assert_eq!(home.url, format!("{}/", base));
    assert_eq!(home.title, "Research Home");
    assert_eq!(home.description, "Computing research at the institute");
    assert_eq!(home.keywords.first().map(String::as_str), Some("research"));
    assert_eq!(home.out_links.len(), 5);
    assert!(home.out_links.contains(&format!("{}/page1", base)));

    assert_eq!(pages[1].url, format!("{}/page1", base));
    assert_eq!(pages[1].title, "Page One");

    let rows = read_metrics(&dir);
    assert_eq!(rows.len(), 2);
    assert_eq!(column(&rows[0], "page_number"), "1");
    assert_eq!(column(&rows[0], "page_urls"), "5");
    // seed + page1 + page2 + private
    assert_eq!(column(&rows[0], "urls_able_to_crawl"), "4");
    assert_eq!(column(&rows[0], "urls_crawled"), "1");
    assert_eq!(column(&rows[0], "urls_remaining"), "3");
    assert_eq!(column(&rows[0], "encountered_urls_total"), "5");

    assert_eq!(column(&rows[1], "page_number"), "2");
    assert_eq!(column(&rows[1], "encountered_urls_total"), "8");
    // The fragment link to page2 repeats an earlier link
    assert_eq!(column(&rows[1], "encountered_urls_unique"), "7");
    assert_eq!(column(&rows[1], "urls_able_to_crawl"), "4");
    assert_eq!(column(&rows[1], "urls_crawled"), "2");
    assert_eq!(column(&rows[1], "urls_remaining"), "2");

    let storage = SqliteStorage::new(&dir.path().join("crawl.db")).unwrap();
    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.total_pages, 2);
    assert_eq!(stats.pages_by_status.get(&PageStatus::Crawled), Some(&2));
    assert_eq!(stats.failure_summary.get("robots_denied"), Some(&1));
    assert_eq!(stats.failure_summary.get("http_status"), Some(&1));

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, hash);
    assert_eq!(
        storage.get_outgoing_links(&format!("{}/", base)).unwrap().len(),
        5
    );
}

#[tokio::test]
async fn test_page_budget_limits_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_html(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
    )
    .await;
    mount_html(&server, "/a", "<p>Alpha</p>").await;
    mount_html(&server, "/b", "<p>Bravo</p>").await;
    mount_html(&server, "/c", "<p>Charlie</p>").await;

    let (config, hash) = write_config(&dir, &base, "max-pages = 2\nrespect-robots = false");
    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_crawled, 2);
    assert_eq!(report.frontier.remaining, 2);
    assert_eq!(read_pages(&dir).len(), 2);
    assert_eq!(read_metrics(&dir).len(), 2);
}

#[tokio::test]
async fn test_non_html_response_recorded_empty() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"ok\":true}", "application/json"))
        .mount(&server)
        .await;

    let (config, hash) = write_config(&dir, &base, "respect-robots = false");
    let report = run_crawl(&config, &hash, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_crawled, 1);

    let pages = read_pages(&dir);
    assert_eq!(pages.len(), 1);
    assert!(pages[0].is_contentless());

    let storage = SqliteStorage::new(&dir.path().join("crawl.db")).unwrap();
    assert_eq!(
        storage
            .count_pages_by_status(PageStatus::Contentless)
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_cancelled_crawl_is_interrupted() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_html(&server, "/", "<p>Home</p>").await;

    let (config, hash) = write_config(&dir, &base, "respect-robots = false");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = run_crawl(&config, &hash, cancel)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_crawled, 0);
    assert_eq!(report.status, RunStatus::Interrupted);
    assert!(read_pages(&dir).is_empty());
    assert!(read_metrics(&dir).is_empty());

    let storage = SqliteStorage::new(&dir.path().join("crawl.db")).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Interrupted);
}

#[tokio::test]
async fn test_unwritable_output_fails_before_fetching() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>Home</p>", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let (mut config, hash) = write_config(&dir, &base, "respect-robots = false");
    config.output.pages_path = dir
        .path()
        .join("missing")
        .join("pages.jsonl")
        .display()
        .to_string();

    let result = run_crawl(&config, &hash, CancellationToken::new()).await;
    assert!(matches!(result, Err(CanopyError::Output(_))));
}
