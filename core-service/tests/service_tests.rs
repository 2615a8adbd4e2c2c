//! End-to-end tests for the sync service
//!
//! Two Kodi instances are simulated at the HTTP layer so the whole stack
//! (connector, coordinator, cache, change log) runs as in production.

use async_trait::async_trait;
use bridge_desktop::TokioFileSystem;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::network::{HostProbe, NetworkStatus};
use bridge_traits::time::FixedClock;
use bytes::Bytes;
use chrono::{NaiveDate, TimeZone, Utc};
use core_runtime::config::{LibraryEndpoint, SyncConfig};
use core_service::{ServiceError, SyncDependencies, SyncService};
use core_sync::{ChangeLog, LaneState};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

const DEN_URL: &str = "http://10.0.0.2:8080/jsonrpc";
const ATTIC_URL: &str = "http://10.0.0.3:8080/jsonrpc";

/// Answers JSON-RPC calls for several Kodi instances keyed by URL
#[derive(Default)]
struct KodiStub {
    movies: HashMap<String, Value>,
    episodes: HashMap<String, Value>,
    posted: Mutex<Vec<(String, Value)>>,
}

impl KodiStub {
    fn library(mut self, url: &str, movies: Value, episodes: Value) -> Self {
        self.movies.insert(url.to_string(), movies);
        self.episodes.insert(url.to_string(), episodes);
        self
    }

    fn updates_to(&self, url: &str) -> Vec<Value> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, body)| {
                target == url
                    && body["method"]
                        .as_str()
                        .is_some_and(|m| m.starts_with("VideoLibrary.Set"))
            })
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn ok(body: Value) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }
}

#[async_trait]
impl HttpClient for KodiStub {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        if !self.movies.contains_key(&request.url) {
            return Err(BridgeError::OperationFailed(format!(
                "connection refused: {}",
                request.url
            )));
        }
        if request.method == HttpMethod::Head {
            return Ok(Self::ok(Value::Null));
        }

        let body: Value = serde_json::from_slice(request.body.as_deref().unwrap_or_default())
            .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;
        self.posted
            .lock()
            .unwrap()
            .push((request.url.clone(), body.clone()));

        let result = match body["method"].as_str() {
            Some("VideoLibrary.GetMovies") => json!({ "movies": self.movies[&request.url] }),
            Some("VideoLibrary.GetEpisodes") => json!({ "episodes": self.episodes[&request.url] }),
            _ => json!("OK"),
        };
        Ok(Self::ok(json!({ "id": body["id"], "jsonrpc": "2.0", "result": result })))
    }
}

struct FakeProbe {
    reachable: HashSet<String>,
}

#[async_trait]
impl HostProbe for FakeProbe {
    async fn probe(&self, address: &str) -> NetworkStatus {
        if self.reachable.contains(address) {
            NetworkStatus::Connected
        } else {
            NetworkStatus::Disconnected
        }
    }
}

fn config(dir: &tempfile::TempDir) -> SyncConfig {
    SyncConfig::builder()
        .primary(LibraryEndpoint::new("Den", "10.0.0.2", DEN_URL).with_credentials("kodi", "kodi"))
        .secondary(LibraryEndpoint::new("Attic", "10.0.0.3", ATTIC_URL))
        .data_dir(dir.path())
        .build()
        .unwrap()
}

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap()))
}

fn service(dir: &tempfile::TempDir, http: Arc<KodiStub>, reachable: &[&str]) -> SyncService {
    let deps = SyncDependencies::new(
        http,
        Arc::new(FakeProbe {
            reachable: reachable.iter().map(|a| a.to_string()).collect(),
        }),
        Arc::new(TokioFileSystem::with_data_directory(dir.path().to_path_buf())),
        clock(),
    );
    SyncService::new(config(dir), deps).unwrap()
}

fn dune(id: u64, playcount: u32) -> Value {
    json!({
        "movieid": id,
        "label": "Dune",
        "year": 2021,
        "imdbnumber": "tt1160419",
        "playcount": playcount,
        "resume": { "position": 0.0, "total": 0.0 }
    })
}

fn pilot(id: u64, position: f64) -> Value {
    json!({
        "episodeid": id,
        "label": "Pilot",
        "title": "Pilot",
        "showtitle": "Show",
        "playcount": 0,
        "resume": { "position": position, "total": 2400.0 }
    })
}

#[tokio::test]
async fn test_full_run_pushes_updates_both_ways() {
    let dir = tempfile::tempdir().unwrap();
    let http = Arc::new(
        KodiStub::default()
            .library(DEN_URL, json!([dune(1, 0)]), json!([pilot(7, 1200.0)]))
            .library(ATTIC_URL, json!([dune(9, 2)]), json!([pilot(70, 300.5)])),
    );

    let service = service(&dir, http.clone(), &["10.0.0.2:8080", "10.0.0.3:8080"]);
    let report = service.run().await;

    assert_eq!(report.primary.state, LaneState::Online);
    assert_eq!(report.secondary.state, LaneState::Online);
    assert_eq!(report.updates_attempted(), 2);
    assert_eq!(report.updates_failed(), 0);

    let den = http.updates_to(DEN_URL);
    assert_eq!(den.len(), 1);
    assert_eq!(den[0]["method"], "VideoLibrary.SetMovieDetails");
    assert_eq!(den[0]["params"], json!({ "movieid": 1, "playcount": 2 }));

    let attic = http.updates_to(ATTIC_URL);
    assert_eq!(attic.len(), 1);
    assert_eq!(attic[0]["method"], "VideoLibrary.SetEpisodeDetails");
    assert_eq!(
        attic[0]["params"],
        json!({ "episodeid": 70, "resume": { "position": 1200 } })
    );

    // Snapshots were cached and the change log written
    assert!(dir.path().join("10_0_0_2.json").exists());
    assert!(dir.path().join("10_0_0_3.json").exists());
    let log = ChangeLog::new(
        Arc::new(TokioFileSystem::with_data_directory(dir.path().to_path_buf())),
        clock(),
    );
    let entries = log
        .read_day(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        .await
        .unwrap();
    let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["Dune 2021 updated", "Show Pilot updated"]);
}

#[tokio::test]
async fn test_unreachable_hosts_are_never_queried() {
    let dir = tempfile::tempdir().unwrap();
    let http = Arc::new(
        KodiStub::default()
            .library(DEN_URL, json!([dune(1, 0)]), json!([]))
            .library(ATTIC_URL, json!([dune(9, 1)]), json!([])),
    );

    let report = service(&dir, http.clone(), &[]).run().await;

    assert_eq!(report.primary.state, LaneState::Offline);
    assert_eq!(report.secondary.state, LaneState::Offline);
    assert_eq!(report.updates_attempted(), 0);
    assert!(http.posted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_historic_snapshot_drives_updates_on_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let http = Arc::new(
        KodiStub::default()
            .library(DEN_URL, json!([dune(1, 0)]), json!([]))
            .library(ATTIC_URL, json!([dune(9, 1)]), json!([])),
    );

    // First run sees only the attic, which caches its state
    let first = service(&dir, http.clone(), &["10.0.0.3:8080"]).run().await;
    assert_eq!(first.primary.state, LaneState::Offline);
    assert_eq!(first.updates_attempted(), 0);

    // Second run sees only the den, which catches up from the attic's cache
    let second = service(&dir, http.clone(), &["10.0.0.2:8080"]).run().await;
    assert_eq!(second.secondary.state, LaneState::HistoricLoad);
    assert_eq!(second.primary.updates_attempted, 1);
    assert!(http.updates_to(ATTIC_URL).is_empty());
    assert_eq!(
        http.updates_to(DEN_URL)[0]["params"],
        json!({ "movieid": 1, "playcount": 1 })
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir);
    config.secondary.address = config.primary.address.clone();

    let deps = SyncDependencies::new(
        Arc::new(KodiStub::default()),
        Arc::new(FakeProbe {
            reachable: HashSet::new(),
        }),
        Arc::new(TokioFileSystem::with_data_directory(dir.path().to_path_buf())),
        clock(),
    );

    assert!(matches!(
        SyncService::new(config, deps),
        Err(ServiceError::Config(_))
    ));
}

#[tokio::test]
async fn test_data_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("state");
    let deps = SyncDependencies::new(
        Arc::new(KodiStub::default()),
        Arc::new(FakeProbe {
            reachable: HashSet::new(),
        }),
        Arc::new(TokioFileSystem::with_data_directory(nested.clone())),
        clock(),
    );
    let service = SyncService::new(config(&dir), deps).unwrap();

    assert_eq!(service.data_directory().await.unwrap(), nested);
    assert!(nested.is_dir());
}
