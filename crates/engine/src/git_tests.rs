use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use eoc_core::DeploymentId;

use super::*;
use crate::dispatcher::{channel, EngineEvent};

struct FakeFetcher {
    heads: Mutex<Vec<&'static str>>,
    snapshots: BTreeMap<&'static str, BTreeMap<DeploymentId, Vec<u8>>>,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ResourceFetcher for FakeFetcher {
    async fn head(&self) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut heads = self.heads.lock().unwrap();
        if heads.len() > 1 {
            Ok(heads.remove(0).to_string())
        } else {
            Ok(heads[0].to_string())
        }
    }

    async fn list_manifests(&self, head: &str) -> Result<BTreeMap<DeploymentId, Vec<u8>>, EngineError> {
        Ok(self.snapshots.get(head).cloned().unwrap_or_default())
    }
}

fn snapshot(entries: &[(&str, &[u8])]) -> BTreeMap<DeploymentId, Vec<u8>> {
    entries.iter().map(|(id, bytes)| (DeploymentId::from(*id), bytes.to_vec())).collect()
}

#[tokio::test]
async fn unchanged_head_emits_nothing() {
    let fetcher = FakeFetcher {
        heads: Mutex::new(vec!["abc"]),
        snapshots: [("abc", snapshot(&[("dep1", b"v1")]))].into_iter().collect(),
        calls: AtomicUsize::new(0),
    };
    let (tx, mut rx) = channel();
    let poller = GitPoller::new(fetcher, tx);

    let first = poller.poll_once(None, &BTreeMap::new()).await.unwrap();
    assert!(first.is_some());
    rx.try_recv().expect("change emitted on first poll");

    let (head, snap) = first.unwrap();
    let second = poller.poll_once(Some(&head), &snap).await.unwrap();
    assert!(second.is_none());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn changed_manifest_emits_git_change_event() {
    let fetcher = FakeFetcher {
        heads: Mutex::new(vec!["v1head"]),
        snapshots: [("v1head", snapshot(&[("dep1", b"content-a")]))].into_iter().collect(),
        calls: AtomicUsize::new(0),
    };
    let (tx, mut rx) = channel();
    let poller = GitPoller::new(fetcher, tx);

    poller.poll_once(None, &BTreeMap::new()).await.unwrap();

    let EngineEvent::GitChange(change) = rx.try_recv().expect("event") else {
        panic!("expected a GitChange event");
    };
    assert_eq!(change.deployment_id.as_str(), "dep1");
    assert_eq!(change.content_bytes, b"content-a");
}

#[tokio::test]
async fn unchanged_manifest_across_polls_emits_nothing() {
    let fetcher = FakeFetcher {
        heads: Mutex::new(vec!["h1", "h2"]),
        snapshots: [
            ("h1", snapshot(&[("dep1", b"same")])),
            ("h2", snapshot(&[("dep1", b"same")])),
        ]
        .into_iter()
        .collect(),
        calls: AtomicUsize::new(0),
    };
    let (tx, mut rx) = channel();
    let poller = GitPoller::new(fetcher, tx);

    let (head1, snap1) = poller.poll_once(None, &BTreeMap::new()).await.unwrap().unwrap();
    rx.try_recv().expect("first poll emits");

    let second = poller.poll_once(Some(&head1), &snap1).await.unwrap();
    assert!(second.is_some());
    assert!(rx.try_recv().is_err(), "content unchanged, no event expected");
}
