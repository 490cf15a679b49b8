use std::sync::Arc;

use eoc_bus::MockBus;
use eoc_core::{DeploymentId, FakeClock, SiteId};

use super::*;
use crate::actuator::{Actuator, NoopForwarder};
use crate::git::DeploymentChange;
use crate::reconciler::Reconciler;

fn open_temp_store() -> (tempfile::TempDir, StateStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = StateStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn sample_manifest_yaml() -> Vec<u8> {
    r#"
metadata:
  annotations:
    id: dep1
    applicationId: app1
    version: v1
spec:
  deploymentProfile:
    type: helm.v3
    components:
      - name: c1
        properties:
          repository: repo/c1
"#
    .as_bytes()
    .to_vec()
}

fn build_dispatcher(store: StateStore) -> Dispatcher<MockBus, FakeClock> {
    let bus = Arc::new(MockBus::new());
    let actuator = Arc::new(Actuator::new(
        SiteId::new(),
        bus,
        store.clone(),
        Arc::new(NoopForwarder),
    ));
    let reconciler = Arc::new(Reconciler::new(SiteId::new(), FakeClock::new(), store.clone(), actuator));
    Dispatcher::new(store, reconciler)
}

#[test]
fn parse_manifest_round_trips_an_app() {
    let bytes = sample_manifest_yaml();
    let app = parse_manifest(&bytes).unwrap();
    assert_eq!(app.id.as_str(), "app1");
    assert_eq!(app.components.len(), 1);
}

#[test]
fn parse_manifest_rejects_garbage() {
    let err = parse_manifest(b"not: [valid, yaml: at all :::").unwrap_err();
    assert!(matches!(err, EngineError::DeploymentRejected(_)));
}

#[tokio::test]
async fn git_change_event_persists_desired_state_and_triggers_reconcile() {
    let (_dir, store) = open_temp_store();
    let dispatcher = build_dispatcher(store.clone());
    let (tx, rx) = channel();
    let cancel = CancellationToken::new();

    let deployment_id = DeploymentId::from("dep1");
    tx.send(EngineEvent::GitChange(DeploymentChange {
        deployment_id: deployment_id.clone(),
        content_bytes: sample_manifest_yaml(),
    }));
    drop(tx);

    dispatcher.run(rx, cancel).await;

    let desired = store.get_desired(&deployment_id).unwrap();
    assert!(desired.is_some());
    assert_eq!(desired.unwrap().id.as_str(), "app1");
}

#[tokio::test]
async fn malformed_manifest_is_rejected_without_persisting() {
    let (_dir, store) = open_temp_store();
    let dispatcher = build_dispatcher(store.clone());
    let (tx, rx) = channel();
    let cancel = CancellationToken::new();

    let deployment_id = DeploymentId::from("dep-bad");
    tx.send(EngineEvent::GitChange(DeploymentChange {
        deployment_id: deployment_id.clone(),
        content_bytes: b"not: [valid, yaml: at all :::".to_vec(),
    }));
    drop(tx);

    dispatcher.run(rx, cancel).await;

    assert!(store.get_desired(&deployment_id).unwrap().is_none());
}

#[test]
fn event_sender_drops_when_channel_full() {
    let (tx, _rx) = channel_with_capacity(1);
    let deployment_id = DeploymentId::from("dep1");
    tx.send(EngineEvent::GitChange(DeploymentChange {
        deployment_id: deployment_id.clone(),
        content_bytes: Vec::new(),
    }));
    // Second send exceeds capacity 1 with no receiver draining; must not panic.
    tx.send(EngineEvent::GitChange(DeploymentChange { deployment_id, content_bytes: Vec::new() }));
}
