// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Git-sourced wire format for a deployment manifest (§4.4, §6) and its
//! conversion to the canonical [`App`] model. The manifest annotates a
//! deployment id (the store key, carried separately by
//! [`crate::git::DeploymentChange`]) and an application id (`App.id`) —
//! they are deliberately distinct so one deployment slot can be retargeted
//! at a different application without changing its store path.

use std::collections::BTreeMap;

use eoc_core::{App, AppId, Component, ComponentName};
use serde::Deserialize;

use crate::error::EngineError;

/// Top-level Git deployment manifest, as committed to the deployments
/// repository (§6, "Git deployment manifest (YAML)").
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationDeployment {
    pub metadata: ManifestMetadata,
    pub spec: ManifestSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestMetadata {
    pub annotations: ManifestAnnotations,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestAnnotations {
    /// Deployment id — the store key. Carried redundantly here; the Git
    /// Poller also derives it per path/change so the Desired Intake never
    /// has to trust it, but it is validated against the poller's id.
    pub id: String,
    #[serde(rename = "applicationId")]
    pub application_id: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSpec {
    #[serde(rename = "deploymentProfile")]
    pub deployment_profile: DeploymentProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentProfile {
    #[serde(rename = "type")]
    pub dep_type: String,
    #[serde(default)]
    pub components: Vec<ManifestComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestComponent {
    pub name: String,
    #[serde(default)]
    pub properties: ManifestComponentProperties,
}

/// Per-component placement/artifact properties (§6). `wait`/`timeout`
/// govern the original's synchronous apply-and-wait semantics, which this
/// spec's asynchronous status-subject model (§4.8) supersedes — parsed for
/// manifest-format fidelity but not otherwise consulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestComponentProperties {
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default, rename = "packageLocation")]
    pub package_location: String,
    #[serde(default, rename = "keyLocation")]
    pub key_location: String,
    #[serde(default, rename = "nodeSelector")]
    pub node_selector: BTreeMap<String, String>,
    #[serde(default)]
    pub wait: bool,
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Parse raw manifest bytes (YAML) into an [`ApplicationDeployment`] (§4.4,
/// step 1).
pub fn parse_application_deployment(bytes: &[u8]) -> Result<ApplicationDeployment, EngineError> {
    serde_yaml::from_slice(bytes)
        .map_err(|e| EngineError::DeploymentRejected(format!("invalid manifest: {e}")))
}

/// Convert a parsed manifest into the canonical [`App`] (§4.4, step 2).
impl From<ApplicationDeployment> for App {
    fn from(doc: ApplicationDeployment) -> Self {
        let components = doc
            .spec
            .deployment_profile
            .components
            .into_iter()
            .map(|c| {
                let name = ComponentName::from(c.name.as_str());
                let component = Component {
                    name: name.clone(),
                    version: c.properties.revision,
                    repository: c.properties.repository,
                    package_url: c.properties.package_location,
                    key_url: c.properties.key_location,
                    content: None,
                    node_selector: c.properties.node_selector,
                };
                (name, component)
            })
            .collect();

        App {
            id: AppId::from(doc.metadata.annotations.application_id.as_str()),
            version: doc.metadata.annotations.version,
            dep_type: doc.spec.deployment_profile.dep_type,
            components,
        }
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
