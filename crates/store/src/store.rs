// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use eoc_core::{ActualApp, ActualState, AppId, App, DeploymentId, DiffOp, Host, HostId};

use crate::error::StoreError;
use crate::writer::WriteQueue;

const TREE_HOSTS: &str = "hosts";
const TREE_DESIRED: &str = "desired";
const TREE_ACTUAL: &str = "actual";
const TREE_OPERATIONS: &str = "operations";

/// Durable nested-bucket state store (§4.1). One `StateStore` owns one
/// `sled::Db`; construct one per LO process, rooted at
/// `$HOME/.lo/<site_id>/store` (§6).
#[derive(Clone)]
pub struct StateStore {
    db: Arc<sled::Db>,
    writer: WriteQueue,
}

impl StateStore {
    /// Open (creating if absent) the store at `path`, with a write queue of
    /// at least [`crate::writer::MIN_QUEUE_CAPACITY`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_capacity(path, crate::writer::MIN_QUEUE_CAPACITY)
    }

    pub fn open_with_capacity(
        path: impl AsRef<Path>,
        queue_capacity: usize,
    ) -> Result<Self, StoreError> {
        let db = Arc::new(sled::open(path)?);
        let writer = WriteQueue::spawn(db.clone(), queue_capacity);
        Ok(Self { db, writer })
    }

    fn tree(&self, name: &str) -> Result<sled::Tree, StoreError> {
        Ok(self.db.open_tree(name)?)
    }

    fn load<T: serde::de::DeserializeOwned>(
        &self,
        tree: &str,
        key: &str,
    ) -> Result<T, StoreError> {
        let tree = self.tree(tree)?;
        let bytes = tree
            .get(key.as_bytes())?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn try_load<T: serde::de::DeserializeOwned>(
        &self,
        tree: &str,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.load(tree, key) {
            Ok(v) => Ok(Some(v)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn load_all<T: serde::de::DeserializeOwned>(
        &self,
        tree: &str,
    ) -> Result<Vec<(String, T)>, StoreError> {
        let tree = self.tree(tree)?;
        let mut out = Vec::new();
        for entry in tree.iter() {
            let (key, value) = entry?;
            let key = String::from_utf8_lossy(&key).into_owned();
            let value: T = serde_json::from_slice(&value)?;
            out.push((key, value));
        }
        Ok(out)
    }

    async fn save<T: serde::Serialize + Send + 'static>(
        &self,
        tree: &'static str,
        key: String,
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.writer
            .submit(move |db| {
                let tree = db.open_tree(tree)?;
                tree.insert(key.as_bytes(), bytes)?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, tree: &'static str, key: String) -> Result<(), StoreError> {
        self.writer
            .submit(move |db| {
                let tree = db.open_tree(tree)?;
                tree.remove(key.as_bytes())?;
                Ok(())
            })
            .await
    }

    // -- Hosts -----------------------------------------------------------

    pub async fn add_or_update_host(&self, host: &Host) -> Result<(), StoreError> {
        self.save(TREE_HOSTS, host.id.as_str().to_string(), host).await
    }

    pub fn load_host(&self, host_id: &HostId) -> Result<Option<Host>, StoreError> {
        self.try_load(TREE_HOSTS, host_id.as_str())
    }

    pub fn load_all_hosts(&self) -> Result<Vec<Host>, StoreError> {
        Ok(self
            .load_all::<Host>(TREE_HOSTS)?
            .into_iter()
            .map(|(_, h)| h)
            .collect())
    }

    // -- Desired -----------------------------------------------------------

    pub async fn set_desired(&self, deployment_id: &DeploymentId, app: &App) -> Result<(), StoreError> {
        self.save(TREE_DESIRED, format!("{deployment_id}/app"), app).await
    }

    pub fn get_desired(&self, deployment_id: &DeploymentId) -> Result<Option<App>, StoreError> {
        self.try_load(TREE_DESIRED, &format!("{deployment_id}/app"))
    }

    // -- Actual ------------------------------------------------------------

    pub async fn set_actual(&self, host_id: &HostId, app: &ActualApp) -> Result<(), StoreError> {
        self.save(TREE_ACTUAL, format!("{host_id}/{}", app.id), app).await
    }

    pub fn get_actual_app(
        &self,
        host_id: &HostId,
        app_id: &AppId,
    ) -> Result<Option<ActualApp>, StoreError> {
        self.try_load(TREE_ACTUAL, &format!("{host_id}/{app_id}"))
    }

    pub async fn remove_actual_app(&self, host_id: &HostId, app_id: &AppId) -> Result<(), StoreError> {
        self.delete(TREE_ACTUAL, format!("{host_id}/{app_id}")).await
    }

    /// Aggregate every host's actual apps into one [`ActualState`] (§4.1,
    /// `GetActual`).
    pub fn get_actual(&self) -> Result<ActualState, StoreError> {
        let mut state = ActualState::default();
        for (key, app) in self.load_all::<ActualApp>(TREE_ACTUAL)? {
            let Some((host_id, _app_id)) = key.split_once('/') else {
                continue;
            };
            state
                .apps_by_host
                .entry(HostId::from_string(host_id))
                .or_default()
                .insert(app.id.clone(), app);
        }
        Ok(state)
    }

    // -- Operations journal --------------------------------------------------

    pub async fn set_operation(&self, op: &DiffOp) -> Result<(), StoreError> {
        self.save(TREE_OPERATIONS, op.journal_key(), op).await
    }

    pub fn get_operation(
        &self,
        deployment_id: &DeploymentId,
        timestamp: u128,
    ) -> Result<Option<DiffOp>, StoreError> {
        self.try_load(TREE_OPERATIONS, &format!("{deployment_id}-{timestamp}"))
    }

    pub fn load_all_operations(&self) -> Result<Vec<DiffOp>, StoreError> {
        Ok(self
            .load_all::<DiffOp>(TREE_OPERATIONS)?
            .into_iter()
            .map(|(_, op)| op)
            .collect())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
