// src/services/store.rs
use chrono::{DateTime, Utc};
use log::{debug, error};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// No refresh has finished yet.
    Loading,
    Ready,
    /// The first load failed and there is nothing to show.
    Empty,
}

/// Point-in-time view of a store.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub data: Option<Arc<T>>,
    pub status: LoadStatus,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

struct Inner<T> {
    data: Option<Arc<T>>,
    committed: u64,
    status: LoadStatus,
    updated_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    last_error_at: Option<DateTime<Utc>>,
}

/// Latest value of one widget, swapped in whole on every successful refresh.
///
/// Refreshes take a ticket before fetching. A commit or failure carrying a
/// ticket older than the last committed one is stale and ignored.
pub struct SnapshotStore<T> {
    name: &'static str,
    inner: RwLock<Inner<T>>,
    tickets: AtomicU64,
}

impl<T> SnapshotStore<T> {
    pub fn new(name: &'static str) -> Self {
        SnapshotStore {
            name,
            inner: RwLock::new(Inner {
                data: None,
                committed: 0,
                status: LoadStatus::Loading,
                updated_at: None,
                last_error: None,
                last_error_at: None,
            }),
            tickets: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn commit(&self, ticket: u64, value: T) -> bool {
        let mut inner = self.inner.write().await;
        if ticket <= inner.committed {
            debug!(
                "{}: dropping stale refresh #{} (current #{})",
                self.name, ticket, inner.committed
            );
            return false;
        }
        inner.data = Some(Arc::new(value));
        inner.committed = ticket;
        inner.status = LoadStatus::Ready;
        inner.updated_at = Some(Utc::now());
        inner.last_error = None;
        true
    }

    /// Record a failed refresh. Existing data is kept.
    pub async fn fail(&self, ticket: u64, message: impl Into<String>) -> bool {
        let mut inner = self.inner.write().await;
        if ticket <= inner.committed {
            debug!("{}: ignoring failure of stale refresh #{}", self.name, ticket);
            return false;
        }
        if inner.data.is_none() {
            inner.status = LoadStatus::Empty;
        }
        inner.last_error = Some(message.into());
        inner.last_error_at = Some(Utc::now());
        true
    }

    /// Run one refresh: take a ticket, await `fetch`, commit or log the
    /// failure. Errors never propagate past this point.
    pub async fn refresh<F>(&self, fetch: F) -> bool
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        let ticket = self.ticket();
        match fetch.await {
            Ok(value) => self.commit(ticket, value).await,
            Err(err) => {
                error!("{}: refresh failed: {:#}", self.name, err);
                self.fail(ticket, err.to_string()).await;
                false
            }
        }
    }

    pub async fn current(&self) -> Option<Arc<T>> {
        self.inner.read().await.data.clone()
    }

    pub async fn status(&self) -> LoadStatus {
        self.inner.read().await.status
    }

    pub async fn snapshot(&self) -> Snapshot<T> {
        let inner = self.inner.read().await;
        Snapshot {
            data: inner.data.clone(),
            status: inner.status,
            updated_at: inner.updated_at,
            last_error: inner.last_error.clone(),
            last_error_at: inner.last_error_at,
        }
    }
}
