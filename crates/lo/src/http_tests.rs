use std::sync::Arc;

use eoc_core::FakeClock;
use eoc_engine::NoopCallbacks;

use super::*;

async fn spawn_test_server() -> (String, AppState<FakeClock>) {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::open(dir.path()).unwrap();
    let heartbeat = Arc::new(HeartbeatMonitor::new(FakeClock::new(), store.clone(), Arc::new(NoopCallbacks)));
    let state = AppState { store, site_id: SiteId::from("site1"), heartbeat };

    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (base, _state) = spawn_test_server().await;
    let resp = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_creates_host_and_returns_site_id() {
    let (base, state) = spawn_test_server().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/register"))
        .json(&serde_json::json!({"host_id": "hostA"}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let site_id: String = resp.json().await.unwrap();
    assert_eq!(site_id, "site1");

    let hosts = state.store.load_all_hosts().unwrap();
    assert_eq!(hosts.len(), 1);
    assert!(hosts[0].alive);
}

#[tokio::test]
async fn hosts_endpoint_lists_registered_hosts() {
    let (base, _state) = spawn_test_server().await;
    let client = reqwest::Client::new();
    client
        .post(format!("{base}/register"))
        .json(&serde_json::json!({"host_id": "hostA"}))
        .send()
        .await
        .unwrap();

    let resp = client.get(format!("{base}/hosts")).send().await.unwrap();
    let hosts: std::collections::BTreeMap<String, Host> = resp.json().await.unwrap();
    assert_eq!(hosts.len(), 1);
}

#[tokio::test]
async fn actual_endpoint_starts_empty() {
    let (base, _state) = spawn_test_server().await;
    let resp = reqwest::get(format!("{base}/actual")).await.unwrap();
    let actual: eoc_core::ActualState = resp.json().await.unwrap();
    assert!(actual.apps_by_host.is_empty());
}
