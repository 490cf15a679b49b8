// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-writer queue, grounded on the original Go `boltstore`'s
//! `writeRequest{fn, resp chan error}` / `writerLoop` pair: one task owns
//! all mutation, serializing every write into one effective transaction per
//! request, while reads bypass the queue entirely.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::error::StoreError;

/// Bounded write-queue capacity floor from §4.1 ("MUST be bounded (≥1024)").
pub const MIN_QUEUE_CAPACITY: usize = 1024;

type WriteFn = Box<dyn FnOnce(&sled::Db) -> Result<(), StoreError> + Send>;

struct WriteRequest {
    run: WriteFn,
    resp: oneshot::Sender<Result<(), StoreError>>,
}

/// Handle used by `StateStore` to submit writes. Cloning is cheap (it just
/// clones the channel sender); every clone feeds the same single writer
/// task.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::Sender<WriteRequest>,
}

impl WriteQueue {
    /// Spawn the writer task and return a handle to submit work to it.
    /// `capacity` is clamped up to [`MIN_QUEUE_CAPACITY`].
    pub fn spawn(db: Arc<sled::Db>, capacity: usize) -> Self {
        let capacity = capacity.max(MIN_QUEUE_CAPACITY);
        let (tx, mut rx) = mpsc::channel::<WriteRequest>(capacity);

        tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                let result = (req.run)(&db);
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "state store write failed");
                }
                // Dropped receiver just means the caller stopped waiting;
                // the write itself already happened.
                let _ = req.resp.send(result);
            }
            tracing::debug!("state store writer task shut down");
        });

        Self { tx }
    }

    /// Submit a write and wait for it to complete. Backpressures the
    /// caller (via the bounded channel's `send`) when the queue is full,
    /// rather than rejecting the write outright, per §4.1.
    pub async fn submit(
        &self,
        run: impl FnOnce(&sled::Db) -> Result<(), StoreError> + Send + 'static,
    ) -> Result<(), StoreError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(WriteRequest { run: Box::new(run), resp: resp_tx })
            .await
            .map_err(|_| StoreError::WriterGone)?;
        resp_rx.await.map_err(|_| StoreError::ReplyDropped)?
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
