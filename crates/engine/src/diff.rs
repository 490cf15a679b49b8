// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The diff engine (§4.6): a pure function from `(desired, actual,
//! alive_hosts)` to an ordered list of [`DiffOp`]. Grounded on
//! `original_source/internal/lo/reconcilier/LO_reconciler_diff_and_schema.go`'s
//! `diffMulti` for the per-host/per-component walk and `nodeMatches` gating,
//! generalized to the richer add/update/remove-app-and-component vocabulary
//! in this spec.
//!
//! Every map walked here is a `BTreeMap`, so two calls with identical inputs
//! produce byte-identical output (§4.6, "Determinism").

use eoc_core::{
    canonical_hash, Action, ActualApp, ActualState, App, DeploymentId, DiffOp, Host, HostId,
    SiteId,
};

/// Compute the ops required to converge every alive host in `alive_hosts`
/// toward `desired` (§4.6). `timestamp` is stamped onto every emitted op —
/// callers use a monotonic nanosecond clock reading taken once per
/// reconcile invocation, not per op, so that journal keys inside one
/// reconcile don't collide on `(deployment_id, timestamp)`.
#[allow(clippy::too_many_arguments)]
pub fn compute_diff(
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    desired: &App,
    actual: &ActualState,
    alive_hosts: &[&Host],
    timestamp: u128,
) -> Vec<DiffOp> {
    let desired_hash = canonical_hash(desired);
    let mut ops = Vec::new();

    for host in alive_hosts {
        diff_host(site_id, deployment_id, desired, &desired_hash, actual, host, timestamp, &mut ops);
    }
    ops
}

fn diff_host(
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    desired: &App,
    desired_hash: &str,
    actual: &ActualState,
    host: &Host,
    timestamp: u128,
    ops: &mut Vec<DiffOp>,
) {
    let actual_apps = actual.apps_for_host(&host.id);

    // Step 1: removal marker — tear down every ActualApp on this host.
    if desired.is_removal_marker() {
        if let Some(apps) = actual_apps {
            for actual_app in apps.values() {
                ops.push(remove_app_op(site_id, deployment_id, host.id, actual_app, timestamp));
            }
        }
        return;
    }

    let actual_app = actual_apps.and_then(|apps| apps.get(&desired.id));

    let Some(actual_app) = actual_app else {
        ops.push(add_app_op(site_id, deployment_id, host.id, desired, timestamp));
        remove_other_apps(site_id, deployment_id, host, desired, actual_apps, timestamp, ops);
        return;
    };

    // Step 3: already converged — no-op for this app, but still sweep other
    // apps on this host that no longer match the current desired id.
    if !actual_app.hash.is_empty() && actual_app.hash == desired_hash {
        remove_other_apps(site_id, deployment_id, host, desired, actual_apps, timestamp, ops);
        return;
    }

    // Step 4: whole-app version bump supersedes per-component diffing.
    if actual_app.version != desired.version {
        ops.push(update_app_op(site_id, deployment_id, host.id, desired, timestamp));
        remove_other_apps(site_id, deployment_id, host, desired, actual_apps, timestamp, ops);
        return;
    }

    // Step 5: per-component diff, gated by node_selector (SPEC_FULL §11).
    for (name, component) in &desired.components {
        if !host.matches_selector(&component.node_selector) {
            continue;
        }
        match actual_app.components.get(name) {
            None => ops.push(comp_op(
                Action::AddComp,
                site_id,
                deployment_id,
                host.id,
                desired,
                Some(name.clone()),
                timestamp,
            )),
            Some(actual_comp) => {
                let version_changed = actual_comp.version != component.version;
                let hash_changed = !actual_comp.hash.is_empty()
                    && actual_comp.hash != canonical_hash(component);
                if version_changed || hash_changed {
                    ops.push(comp_op(
                        Action::UpdateComp,
                        site_id,
                        deployment_id,
                        host.id,
                        desired,
                        Some(name.clone()),
                        timestamp,
                    ));
                }
            }
        }
    }

    // Step 6: components present in actual but no longer desired. The
    // removed component isn't in `desired.components`, so the op's app
    // snapshot carries a stub built from the actual record instead — the
    // Lifecycle Controller only needs the name to stop/delete it.
    for (name, actual_comp) in &actual_app.components {
        if !desired.components.contains_key(name) {
            ops.push(remove_comp_op(
                site_id,
                deployment_id,
                host.id,
                desired,
                name.clone(),
                &actual_comp.version,
                timestamp,
            ));
        }
    }

    remove_other_apps(site_id, deployment_id, host, desired, actual_apps, timestamp, ops);
}

/// Step 7: any ActualApp on this host whose id no longer matches the
/// current desired app id is torn down.
fn remove_other_apps(
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    host: &Host,
    desired: &App,
    actual_apps: Option<&std::collections::BTreeMap<eoc_core::AppId, ActualApp>>,
    timestamp: u128,
    ops: &mut Vec<DiffOp>,
) {
    let Some(apps) = actual_apps else { return };
    for (id, actual_app) in apps {
        if *id != desired.id {
            ops.push(remove_app_op(site_id, deployment_id, host.id, actual_app, timestamp));
        }
    }
}

fn add_app_op(
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    host_id: HostId,
    desired: &App,
    timestamp: u128,
) -> DiffOp {
    DiffOp {
        action: Action::AddApp,
        site_id: *site_id,
        host_id,
        app: desired.clone(),
        comp_name: None,
        deployment_id: deployment_id.clone(),
        status: None,
        timestamp,
    }
}

fn update_app_op(
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    host_id: HostId,
    desired: &App,
    timestamp: u128,
) -> DiffOp {
    DiffOp {
        action: Action::UpdateApp,
        site_id: *site_id,
        host_id,
        app: desired.clone(),
        comp_name: None,
        deployment_id: deployment_id.clone(),
        status: None,
        timestamp,
    }
}

fn remove_app_op(
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    host_id: HostId,
    actual_app: &ActualApp,
    timestamp: u128,
) -> DiffOp {
    // Components carry name/version only — enough for the Lifecycle
    // Controller to stop/delete by name without needing the original
    // artifact reference.
    let components = actual_app
        .components
        .iter()
        .map(|(name, c)| (name.clone(), stub_component(name.clone(), c.version.clone())))
        .collect();
    DiffOp {
        action: Action::RemoveApp,
        site_id: *site_id,
        host_id,
        app: App {
            id: actual_app.id.clone(),
            version: actual_app.version.clone(),
            dep_type: String::new(),
            components,
        },
        comp_name: None,
        deployment_id: deployment_id.clone(),
        status: None,
        timestamp,
    }
}

fn remove_comp_op(
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    host_id: HostId,
    desired: &App,
    name: eoc_core::ComponentName,
    version: &str,
    timestamp: u128,
) -> DiffOp {
    let mut components = std::collections::BTreeMap::new();
    components.insert(name.clone(), stub_component(name.clone(), version.to_string()));
    DiffOp {
        action: Action::RemoveComp,
        site_id: *site_id,
        host_id,
        app: App {
            id: desired.id.clone(),
            version: desired.version.clone(),
            dep_type: desired.dep_type.clone(),
            components,
        },
        comp_name: Some(name),
        deployment_id: deployment_id.clone(),
        status: None,
        timestamp,
    }
}

fn stub_component(name: eoc_core::ComponentName, version: String) -> eoc_core::Component {
    eoc_core::Component {
        name,
        version,
        repository: String::new(),
        package_url: String::new(),
        key_url: String::new(),
        content: None,
        node_selector: Default::default(),
    }
}

fn comp_op(
    action: Action,
    site_id: &SiteId,
    deployment_id: &DeploymentId,
    host_id: HostId,
    desired: &App,
    comp_name: Option<eoc_core::ComponentName>,
    timestamp: u128,
) -> DiffOp {
    DiffOp {
        action,
        site_id: *site_id,
        host_id,
        app: desired.clone(),
        comp_name,
        deployment_id: deployment_id.clone(),
        status: None,
        timestamp,
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
