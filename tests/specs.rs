//! End-to-end reconciliation scenarios, driven entirely in-process against
//! `MockBus` and a real `sled`-backed `StateStore` — no external binaries
//! (this workspace has no `assert_cmd` dependency). Each scenario wires the
//! same three collaborators a real LO/ERA pair would: a `Reconciler` +
//! `Actuator` on the LO side, and a `LifecycleController` over
//! `eoc_runtime::MockBackend` standing in for the ERA side, connected
//! through the same subject conventions the real binaries use.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use eoc_bus::{deploy_subject, status_subject, MessageBus, MockBus};
use eoc_core::{App, AppId, Component, ComponentName, DeploymentId, FakeClock, Host, HostId, HostStatus, SiteId};
use eoc_engine::{Actuator, LifecycleController, NoopForwarder, Reconciler};
use eoc_runtime::MockBackend;
use eoc_store::StateStore;

struct Harness {
    _dir: tempfile::TempDir,
    store: StateStore,
    bus: Arc<MockBus>,
    reconciler: Arc<Reconciler<MockBus, FakeClock>>,
    backend: Arc<MockBackend>,
    site_id: SiteId,
    deployment_id: DeploymentId,
}

impl Harness {
    async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = StateStore::open(dir.path()).expect("open store");
        let bus = Arc::new(MockBus::new());
        let site_id = SiteId::new();

        let actuator = Arc::new(Actuator::new(site_id, bus.clone(), store.clone(), Arc::new(NoopForwarder)));
        let _status_sub = actuator.clone().run().await.expect("actuator run");

        let reconciler = Arc::new(Reconciler::new(site_id, FakeClock::new(), store.clone(), actuator));
        let backend = Arc::new(MockBackend::new());

        Self {
            _dir: dir,
            store,
            bus,
            reconciler,
            backend,
            site_id,
            deployment_id: DeploymentId::from("dep1"),
        }
    }

    /// Subscribe an ERA stand-in for a specific host. Each scenario
    /// subscribes every host it dispatches to; `new` doesn't pre-subscribe
    /// any host since hosts aren't known until `register_host`.
    fn wire_era_for(&self, host_id: HostId) {
        wire_era_host(self.bus.clone(), self.site_id, host_id, self.backend.clone());
    }

    async fn register_host(&self, host_id: HostId) {
        let host = Host::new(host_id, 0);
        self.store.add_or_update_host(&host).await.expect("register host");
        self.wire_era_for(host_id);
    }

    async fn mark_dead(&self, host_id: HostId) {
        let mut host = self.store.load_host(&host_id).expect("load").expect("exists");
        host.alive = false;
        host.status = HostStatus::Dead;
        self.store.add_or_update_host(&host).await.expect("mark dead");
    }

    async fn set_desired(&self, app: &App) {
        self.store.set_desired(&self.deployment_id, app).await.expect("set desired");
    }

    async fn reconcile(&self) -> usize {
        let n = self.reconciler.reconcile(&self.deployment_id).await.expect("reconcile");
        // Let the spawned status-apply and ERA-apply tasks settle.
        wait_until_quiet().await;
        n
    }

    fn actual_components(&self, host_id: HostId) -> BTreeMap<ComponentName, eoc_core::ActualComponent> {
        self.store
            .get_actual_app(&host_id, &AppId::from("app1"))
            .expect("get actual")
            .map(|app| app.components)
            .unwrap_or_default()
    }
}

fn wire_era_host(bus: Arc<MockBus>, site_id: SiteId, host_id: HostId, backend: Arc<MockBackend>) {
    let controller = Arc::new(LifecycleController::new(backend));
    let subject = deploy_subject(&site_id.to_string(), &host_id.to_string());
    let status_subject = status_subject(&site_id.to_string(), &host_id.to_string());

    let publish_bus = bus.clone();
    tokio::spawn(async move {
        let sub = bus
            .subscribe::<eoc_core::DiffOp, _>(&subject, move |op| {
                let controller = controller.clone();
                let bus = publish_bus.clone();
                let status_subject = status_subject.clone();
                tokio::spawn(async move {
                    let status = controller.apply(&op).await;
                    let _ = bus.publish(&status_subject, &status).await;
                });
            })
            .await
            .expect("subscribe");
        // Keep the subscription alive for the test's lifetime.
        std::mem::forget(sub);
    });
}

async fn wait_until_quiet() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn component(name: &str, version: &str) -> Component {
    Component {
        name: ComponentName::from(name),
        version: version.to_string(),
        repository: format!("repo/{name}"),
        package_url: String::new(),
        key_url: String::new(),
        content: None,
        node_selector: BTreeMap::new(),
    }
}

fn app(version: &str, components: &[(&str, &str)]) -> App {
    App {
        id: AppId::from("app1"),
        version: version.to_string(),
        dep_type: "helm.v3".to_string(),
        components: components
            .iter()
            .map(|(name, ver)| (ComponentName::from(*name), component(name, ver)))
            .collect(),
    }
}

#[tokio::test]
async fn fresh_deployment_installs_every_component_on_every_alive_host() {
    let h = Harness::new().await;
    let host = HostId::new();
    h.register_host(host).await;
    h.set_desired(&app("v1", &[("c1", "v1"), ("c2", "v1")])).await;

    let ops = h.reconcile().await;
    assert_eq!(ops, 1, "one add_app op for the single alive host");

    let actual = h.actual_components(host);
    assert_eq!(actual.len(), 2);
    assert!(h.backend.installed_names().contains(&"c1".to_string()));
    assert!(h.backend.installed_names().contains(&"c2".to_string()));
}

#[tokio::test]
async fn already_converged_deployment_reconciles_to_zero_ops() {
    let h = Harness::new().await;
    let host = HostId::new();
    h.register_host(host).await;
    h.set_desired(&app("v1", &[("c1", "v1")])).await;

    h.reconcile().await;
    let second_pass = h.reconcile().await;
    assert_eq!(second_pass, 0, "converged deployment is a no-op");
}

#[tokio::test]
async fn whole_app_version_bump_reinstalls_every_component() {
    let h = Harness::new().await;
    let host = HostId::new();
    h.register_host(host).await;
    h.set_desired(&app("v1", &[("c1", "v1")])).await;
    h.reconcile().await;

    h.set_desired(&app("v2", &[("c1", "v2")])).await;
    let ops = h.reconcile().await;
    assert_eq!(ops, 1, "one update_app op");

    let actual = h.actual_components(host);
    assert_eq!(actual.get(&ComponentName::from("c1")).unwrap().version, "v2");
}

#[tokio::test]
async fn single_component_version_change_only_updates_that_component() {
    let h = Harness::new().await;
    let host = HostId::new();
    h.register_host(host).await;
    h.set_desired(&app("v1", &[("c1", "v1"), ("c2", "v1")])).await;
    h.reconcile().await;

    h.set_desired(&app("v1", &[("c1", "v2"), ("c2", "v1")])).await;
    let ops = h.reconcile().await;
    assert_eq!(ops, 1, "one update_comp op for c1 only");

    let actual = h.actual_components(host);
    assert_eq!(actual.get(&ComponentName::from("c1")).unwrap().version, "v2");
    assert_eq!(actual.get(&ComponentName::from("c2")).unwrap().version, "v1");
}

#[tokio::test]
async fn dropping_a_component_from_desired_state_removes_it() {
    let h = Harness::new().await;
    let host = HostId::new();
    h.register_host(host).await;
    h.set_desired(&app("v1", &[("c1", "v1"), ("c2", "v1")])).await;
    h.reconcile().await;

    h.set_desired(&app("v1", &[("c1", "v1")])).await;
    let ops = h.reconcile().await;
    assert_eq!(ops, 1, "one remove_comp op for c2");

    let actual = h.actual_components(host);
    assert!(!actual.contains_key(&ComponentName::from("c2")));
    assert!(actual.contains_key(&ComponentName::from("c1")));
}

#[tokio::test]
async fn removal_marker_tears_down_the_whole_app() {
    let h = Harness::new().await;
    let host = HostId::new();
    h.register_host(host).await;
    h.set_desired(&app("v1", &[("c1", "v1")])).await;
    h.reconcile().await;
    assert!(!h.actual_components(host).is_empty());

    h.set_desired(&App::default()).await;
    h.reconcile().await;

    assert!(h.store.get_actual_app(&host, &AppId::from("app1")).unwrap().is_none());
}

#[tokio::test]
async fn a_dead_host_is_skipped_until_it_recovers() {
    let h = Harness::new().await;
    let host = HostId::new();
    h.register_host(host).await;
    h.mark_dead(host).await;
    h.set_desired(&app("v1", &[("c1", "v1")])).await;

    let ops = h.reconcile().await;
    assert_eq!(ops, 0, "dead hosts are excluded from the diff");
    assert!(h.actual_components(host).is_empty());

    let mut revived = h.store.load_host(&host).unwrap().unwrap();
    revived.alive = true;
    revived.status = eoc_core::HostStatus::Alive;
    h.store.add_or_update_host(&revived).await.unwrap();

    let ops = h.reconcile().await;
    assert_eq!(ops, 1, "recovered host picks up the pending deployment");
    assert!(!h.actual_components(host).is_empty());
}

#[tokio::test]
async fn heartbeat_monitor_flaps_a_host_dead_then_recovers_it() {
    use eoc_engine::{HeartbeatCallbacks, HeartbeatMonitor};

    struct Recorder {
        recovered: std::sync::Mutex<Vec<HostId>>,
        dead: std::sync::Mutex<Vec<HostId>>,
    }
    impl HeartbeatCallbacks for Recorder {
        fn on_recovery(&self, host_id: HostId) {
            self.recovered.lock().unwrap().push(host_id);
        }
        fn on_dead(&self, host_id: HostId) {
            self.dead.lock().unwrap().push(host_id);
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::open(dir.path()).unwrap();
    let clock = FakeClock::new();
    let recorder = Arc::new(Recorder { recovered: std::sync::Mutex::new(vec![]), dead: std::sync::Mutex::new(vec![]) });
    let monitor = HeartbeatMonitor::with_thresholds(
        clock.clone(),
        store.clone(),
        recorder.clone(),
        Duration::from_secs(10),
        3,
    );

    let host_id = HostId::new();
    monitor.record_heartbeat(host_id).await.unwrap();
    assert!(store.load_host(&host_id).unwrap().unwrap().alive);

    for _ in 0..3 {
        clock.advance(Duration::from_secs(11));
        monitor.scan().await.unwrap();
    }
    assert!(!store.load_host(&host_id).unwrap().unwrap().alive);
    assert_eq!(recorder.dead.lock().unwrap().len(), 1);

    monitor.record_heartbeat(host_id).await.unwrap();
    assert!(store.load_host(&host_id).unwrap().unwrap().alive);
    assert_eq!(recorder.recovered.lock().unwrap().len(), 1);
}
