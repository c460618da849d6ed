use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tempfile::TempDir;

use xkcd_archive::config::DownloadConfig;
use xkcd_archive::download::{self, Acquire, HttpFetcher};
use xkcd_archive::models::Outcome;
use xkcd_archive::search::{self, SearchQuery};
use xkcd_archive::storage::LocalStore;

/// Scripted upstream: per-id queue of (status, body); unscripted ids are 404.
#[derive(Default)]
struct Upstream {
    script: Mutex<HashMap<u32, VecDeque<(StatusCode, Vec<u8>)>>>,
    hits: Mutex<Vec<u32>>,
}

impl Upstream {
    fn respond(&self, id: u32, status: StatusCode, body: impl Into<Vec<u8>>) {
        self.script
            .lock()
            .unwrap()
            .entry(id)
            .or_default()
            .push_back((status, body.into()));
    }

    fn comic(&self, id: u32, title: &str) {
        let body = format!(
            r#"{{"num": {}, "title": "{}", "safe_title": "{}", "transcript": "", "alt": "alt text {}"}}"#,
            id, title, title, id
        );
        self.respond(id, StatusCode::OK, body);
    }

    fn hits(&self) -> Vec<u32> {
        self.hits.lock().unwrap().clone()
    }
}

async fn info_handler(State(upstream): State<Arc<Upstream>>, Path(id): Path<u32>) -> Response {
    upstream.hits.lock().unwrap().push(id);
    let next = upstream
        .script
        .lock()
        .unwrap()
        .get_mut(&id)
        .and_then(|queue| queue.pop_front());
    match next {
        Some((status, body)) => (status, body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve(upstream: Arc<Upstream>) -> SocketAddr {
    let app = Router::new()
        .route("/:id/info.0.json", get(info_handler))
        .with_state(upstream);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config_for(addr: SocketAddr, max_failures: u32) -> DownloadConfig {
    DownloadConfig {
        base_url: format!("http://{}", addr),
        max_failures,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_body_stored_byte_for_byte() {
    let upstream = Arc::new(Upstream::default());
    let body = "{\n  \"num\": 1,   \"title\": \"Caf\u{e9} \u{2603}\",\n\"alt\":\"x\" }\n";
    upstream.respond(1, StatusCode::OK, body);
    let addr = serve(upstream.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    let fetcher = HttpFetcher::new(config_for(addr, 1)).unwrap();

    let outcome = fetcher.acquire(1, &store).await;
    assert_eq!(outcome, Outcome::Success(body.as_bytes().to_vec().into()));
    assert_eq!(std::fs::read(dir.path().join("0001.json")).unwrap(), body.as_bytes());
}

#[tokio::test]
async fn test_status_classification() {
    let upstream = Arc::new(Upstream::default());
    upstream.respond(1, StatusCode::INTERNAL_SERVER_ERROR, "oops");
    upstream.respond(2, StatusCode::MOVED_PERMANENTLY, "");
    upstream.respond(3, StatusCode::NO_CONTENT, "");
    let addr = serve(upstream.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    let fetcher = HttpFetcher::new(config_for(addr, 1)).unwrap();

    for id in 1..=3 {
        let outcome = fetcher.acquire(id, &store).await;
        assert!(matches!(outcome, Outcome::TransientFailure(_)), "id {}: {:?}", id, outcome);
    }
    assert_eq!(fetcher.acquire(4, &store).await, Outcome::NotFound);
    assert_eq!(store.list().count(), 0);
}

#[tokio::test]
async fn test_connection_error_is_transient() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    let fetcher = HttpFetcher::with_client(reqwest::Client::new(), config_for(addr, 1));

    let outcome = fetcher.acquire(1, &store).await;
    assert!(matches!(outcome, Outcome::TransientFailure(_)));
    assert!(!store.path_for(1).exists());
}

#[tokio::test]
async fn test_write_failure_is_transient() {
    let upstream = Arc::new(Upstream::default());
    upstream.comic(1, "Barrel");
    let addr = serve(upstream.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path().join("not-created"));
    let fetcher = HttpFetcher::new(config_for(addr, 1)).unwrap();

    let outcome = fetcher.acquire(1, &store).await;
    assert!(matches!(outcome, Outcome::TransientFailure(_)));
    assert!(!store.path_for(1).exists());
}

#[tokio::test]
async fn test_retry_then_success_over_http() {
    let upstream = Arc::new(Upstream::default());
    for id in 1..=6 {
        upstream.comic(id, "filler");
    }
    upstream.respond(7, StatusCode::SERVICE_UNAVAILABLE, "");
    upstream.respond(7, StatusCode::BAD_GATEWAY, "");
    upstream.comic(7, "Seven");
    upstream.comic(8, "Eight");
    let addr = serve(upstream.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    let config = config_for(addr, 5);
    let fetcher = HttpFetcher::new(config.clone()).unwrap();

    let report = download::run(&fetcher, &store, &config).await;

    let hits = upstream.hits();
    assert_eq!(hits.iter().filter(|&&id| id == 7).count(), 3);
    assert_eq!(&hits[..10], &[1, 2, 3, 4, 5, 6, 7, 7, 7, 8]);
    assert_eq!(&hits[10..], &[9, 10, 11, 12, 13]);
    assert_eq!(report.stored, 8);
    assert_eq!(report.retried, 2);
    assert_eq!(report.skipped, 5);
    assert_eq!(store.list().count(), 8);
}

#[tokio::test]
async fn test_consecutive_not_found_stops_without_writes() {
    let upstream = Arc::new(Upstream::default());
    upstream.comic(1, "Only");
    let addr = serve(upstream.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    let config = config_for(addr, 5);
    let fetcher = HttpFetcher::new(config.clone()).unwrap();

    let report = download::run(&fetcher, &store, &config).await;

    assert_eq!(upstream.hits(), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(report.consecutive_failures, 5);
    assert_eq!(report.last_id, 6);
    for id in 2..=6 {
        assert!(!store.path_for(id).exists());
    }
}

#[tokio::test]
async fn test_rerun_overwrites_existing_records() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());

    for title in ["First", "Second"] {
        let upstream = Arc::new(Upstream::default());
        upstream.comic(1, title);
        let addr = serve(upstream.clone()).await;
        let config = config_for(addr, 1);
        let fetcher = HttpFetcher::new(config.clone()).unwrap();

        download::run(&fetcher, &store, &config).await;
        assert_eq!(upstream.hits(), vec![1, 2]);
    }

    let stored = std::fs::read_to_string(store.path_for(1)).unwrap();
    assert!(stored.contains("Second"));
    assert!(!stored.contains("First"));
}

#[tokio::test]
async fn test_download_then_search() {
    let upstream = Arc::new(Upstream::default());
    upstream.comic(1, "Barrel - Part 1");
    upstream.comic(2, "Petit Trees (sketch)");
    upstream.comic(3, "Island (sketch)");
    let addr = serve(upstream.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = LocalStore::new(dir.path());
    let config = config_for(addr, 2);
    let fetcher = HttpFetcher::new(config.clone()).unwrap();
    download::run(&fetcher, &store, &config).await;

    let mut found = Vec::new();
    search::search(&store, &SearchQuery::new(["SKETCH"]), |num| found.push(num)).unwrap();
    assert_eq!(found, vec![2, 3]);

    found.clear();
    search::search(&store, &SearchQuery::new(["sketch", "alt text 3"]), |num| found.push(num)).unwrap();
    assert_eq!(found, vec![3]);
}
