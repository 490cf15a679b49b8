use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Ping {
    n: u32,
}

#[tokio::test]
async fn publish_delivers_to_matching_subscriber() {
    let bus = MockBus::new();
    let received = Arc::new(AtomicUsize::new(0));
    let r = received.clone();
    bus.subscribe::<Ping, _>("health.site1.*", move |p: Ping| {
        r.store(p.n as usize, Ordering::SeqCst);
    })
    .await
    .unwrap();

    bus.publish("health.site1.hostA", &Ping { n: 7 }).await.unwrap();

    assert_eq!(received.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn publish_skips_non_matching_subject() {
    let bus = MockBus::new();
    let received = Arc::new(AtomicUsize::new(0));
    let r = received.clone();
    bus.subscribe::<Ping, _>("health.site1.*", move |p: Ping| {
        r.store(p.n as usize, Ordering::SeqCst);
    })
    .await
    .unwrap();

    bus.publish("health.site2.hostA", &Ping { n: 9 }).await.unwrap();

    assert_eq!(received.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn published_records_every_message_regardless_of_subscribers() {
    let bus = MockBus::new();
    bus.publish("status.site1.hostA", &Ping { n: 1 }).await.unwrap();
    bus.publish("status.site1.hostB", &Ping { n: 2 }).await.unwrap();

    let log = bus.published();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].0, "status.site1.hostA");
}

#[tokio::test]
async fn token_count_mismatch_does_not_match() {
    let bus = MockBus::new();
    let received = Arc::new(AtomicUsize::new(0));
    let r = received.clone();
    bus.subscribe::<Ping, _>("status.site1.*", move |p: Ping| {
        r.store(p.n as usize, Ordering::SeqCst);
    })
    .await
    .unwrap();

    // One extra token: must not match a fixed-arity pattern.
    bus.publish("status.site1.hostA.extra", &Ping { n: 5 }).await.unwrap();

    assert_eq!(received.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fail_next_publish_to_errors_once_then_recovers() {
    let bus = MockBus::new();
    bus.fail_next_publish_to("site.s1.deploy.hostA");

    let err = bus.publish("site.s1.deploy.hostA", &Ping { n: 1 }).await;
    assert!(err.is_err());

    // The injected failure is single-shot: the next publish to the same
    // subject goes through normally.
    bus.publish("site.s1.deploy.hostA", &Ping { n: 2 }).await.unwrap();
    assert_eq!(bus.published().len(), 1);
}

#[tokio::test]
async fn unsubscribe_is_a_noop_ok() {
    let bus = MockBus::new();
    let sub = bus.subscribe::<Ping, _>("status.site1.*", |_: Ping| {}).await.unwrap();
    sub.unsubscribe().await.unwrap();
}
