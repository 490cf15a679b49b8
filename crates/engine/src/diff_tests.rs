use std::collections::BTreeMap;

use eoc_core::{
    canonical_hash, Action, ActualApp, ActualComponent, ActualState, App, AppId, Component,
    ComponentName, ComponentStatusKind, DeploymentId, Host, HostId, SiteId,
};

use super::*;

fn comp(name: &str, version: &str) -> Component {
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

fn app(id: &str, version: &str, components: &[(&str, &str)]) -> App {
    App {
        id: AppId::from(id),
        version: version.to_string(),
        dep_type: "helm.v3".to_string(),
        components: components.iter().map(|(n, v)| (ComponentName::from(*n), comp(n, v))).collect(),
    }
}

fn host(alive: bool) -> (HostId, Host) {
    let id = HostId::new();
    let mut h = Host::new(id, 0);
    h.alive = alive;
    (id, h)
}

fn converged_actual(host_id: HostId, desired: &App) -> ActualState {
    let components = desired
        .components
        .iter()
        .map(|(name, c)| {
            (
                name.clone(),
                ActualComponent {
                    name: name.clone(),
                    status: ComponentStatusKind::Success,
                    version: c.version.clone(),
                    last_updated: 0,
                    hash: canonical_hash(c),
                },
            )
        })
        .collect();
    let actual_app = ActualApp {
        id: desired.id.clone(),
        version: desired.version.clone(),
        components,
        hash: canonical_hash(desired),
    };
    let mut state = ActualState::default();
    state.apps_by_host.entry(host_id).or_default().insert(actual_app.id.clone(), actual_app);
    state
}

#[test]
fn fresh_add_emits_add_app() {
    let (hid, h) = host(true);
    let desired = app("app1", "v2", &[("c1", "v2"), ("c2", "v1")]);
    let actual = ActualState::default();
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops = compute_diff(&site_id, &deployment_id, &desired, &actual, &[&h], 1);

    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].action, Action::AddApp);
    assert_eq!(ops[0].host_id, hid);
}

#[test]
fn converged_app_is_a_noop() {
    let (hid, h) = host(true);
    let desired = app("app1", "v2", &[("c1", "v2")]);
    let actual = converged_actual(hid, &desired);
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops = compute_diff(&site_id, &deployment_id, &desired, &actual, &[&h], 1);

    assert!(ops.is_empty());
}

#[test]
fn version_bump_emits_update_app() {
    let (hid, h) = host(true);
    let desired_v2 = app("app1", "v2", &[("c1", "v2")]);
    let actual = converged_actual(hid, &desired_v2);
    let desired_v3 = app("app1", "v3", &[("c1", "v2")]);
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops = compute_diff(&site_id, &deployment_id, &desired_v3, &actual, &[&h], 1);

    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].action, Action::UpdateApp);
}

#[test]
fn single_component_update_emits_update_comp() {
    let (hid, h) = host(true);
    let desired_v1 = app("app1", "v2", &[("c1", "v1"), ("c2", "v1")]);
    let actual = converged_actual(hid, &desired_v1);
    let desired_v2 = app("app1", "v2", &[("c1", "v4"), ("c2", "v1")]);
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops = compute_diff(&site_id, &deployment_id, &desired_v2, &actual, &[&h], 1);

    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].action, Action::UpdateComp);
    assert_eq!(ops[0].comp_name.as_ref().unwrap().as_str(), "c1");
}

#[test]
fn removed_component_emits_remove_comp() {
    let (hid, h) = host(true);
    let full = app("app1", "v2", &[("c1", "v1"), ("c2", "v1")]);
    let actual = converged_actual(hid, &full);
    let trimmed = app("app1", "v2", &[("c1", "v1")]);
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops = compute_diff(&site_id, &deployment_id, &trimmed, &actual, &[&h], 1);

    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].action, Action::RemoveComp);
    assert_eq!(ops[0].comp_name.as_ref().unwrap().as_str(), "c2");
}

#[test]
fn removal_marker_emits_remove_app_for_every_actual_app() {
    let (hid, h) = host(true);
    let full = app("app1", "v2", &[("c1", "v1")]);
    let actual = converged_actual(hid, &full);
    let removal = App::default();
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops = compute_diff(&site_id, &deployment_id, &removal, &actual, &[&h], 1);

    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].action, Action::RemoveApp);
}

#[test]
fn dead_host_produces_no_ops() {
    let (_hid, mut h) = host(false);
    h.alive = false;
    let desired = app("app1", "v2", &[("c1", "v2")]);
    let actual = ActualState::default();
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    // Liveness gating happens upstream (the reconciler filters to alive
    // hosts before calling compute_diff) — passing no hosts models that.
    let ops = compute_diff(&site_id, &deployment_id, &desired, &actual, &[], 1);

    assert!(ops.is_empty());
    let _ = h;
}

#[test]
fn node_selector_gates_component_placement() {
    let (hid, mut h) = host(true);
    h.labels.insert("zone".to_string(), "east".to_string());
    let mut desired = app("app1", "v2", &[("c1", "v1")]);
    desired
        .components
        .get_mut(&ComponentName::from("c1"))
        .unwrap()
        .node_selector
        .insert("zone".to_string(), "west".to_string());
    let actual = converged_actual(hid, &app("app1", "v2", &[]));
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops = compute_diff(&site_id, &deployment_id, &desired, &actual, &[&h], 1);

    // c1's selector doesn't match this host's labels — skipped, not add_comp.
    assert!(ops.is_empty());
}

#[test]
fn determinism_same_inputs_same_output() {
    let (hid, h) = host(true);
    let desired = app("app1", "v2", &[("c1", "v2"), ("c2", "v1"), ("c3", "v5")]);
    let actual = ActualState::default();
    let deployment_id = DeploymentId::from("dep1");
    let site_id = SiteId::new();

    let ops_a = compute_diff(&site_id, &deployment_id, &desired, &actual, &[&h], 42);
    let ops_b = compute_diff(&site_id, &deployment_id, &desired, &actual, &[&h], 42);

    assert_eq!(
        serde_json::to_string(&ops_a).unwrap(),
        serde_json::to_string(&ops_b).unwrap()
    );
}
