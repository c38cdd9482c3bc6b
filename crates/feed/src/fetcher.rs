use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::FeedClient;
use crate::filter::FilterSelection;
use crate::request::RequestToken;
use crate::snapshot::{LoadOutcome, Snapshot, SnapshotStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub token: RequestToken,
    pub outcome: LoadOutcome,
    pub elapsed: Duration,
}

/// Loads feed snapshots and publishes every state change.
///
/// Loads may overlap. Each one takes a fresh [`RequestToken`] and only the
/// latest issued token is allowed to replace the snapshot, so a slow older
/// response can never overwrite newer data. Errors never escape `load`; they
/// end up in [`Snapshot::error`].
pub struct DataFetcher<C> {
    client: Arc<C>,
    store: Arc<Mutex<SnapshotStore>>,
    tx: Arc<watch::Sender<Snapshot>>,
}

impl<C> Clone for DataFetcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            store: Arc::clone(&self.store),
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<C: FeedClient> DataFetcher<C> {
    pub fn new(client: C, filter: FilterSelection) -> Self {
        let store = SnapshotStore::new(filter);
        let (tx, _rx) = watch::channel(store.snapshot().clone());
        Self {
            client: Arc::new(client),
            store: Arc::new(Mutex::new(store)),
            tx: Arc::new(tx),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.lock().snapshot().clone()
    }

    /// Filter of the most recently issued request.
    pub fn filter(&self) -> FilterSelection {
        self.store.lock().requested_filter()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub async fn load(&self, filter: FilterSelection) -> LoadReport {
        let token = {
            let mut store = self.store.lock();
            let token = store.begin(filter);
            self.tx.send_replace(store.snapshot().clone());
            token
        };
        debug!(token = token.0, path = %filter.feed_path(), "feed request issued");

        let started = Instant::now();
        let result = self.client.fetch(filter).await;
        let elapsed = started.elapsed();

        let outcome = {
            let mut store = self.store.lock();
            let outcome = store.complete(token, result, Utc::now());
            if outcome != LoadOutcome::Superseded {
                self.tx.send_replace(store.snapshot().clone());
            }
            outcome
        };

        match &outcome {
            LoadOutcome::Replaced { features, rejected } => {
                info!(token = token.0, features, rejected, ?elapsed, "feed snapshot replaced");
            }
            LoadOutcome::Failed { message } => {
                warn!(token = token.0, %message, "feed request failed");
            }
            LoadOutcome::Superseded => {
                debug!(token = token.0, "feed response superseded by a newer request");
            }
        }
        LoadReport {
            token,
            outcome,
            elapsed,
        }
    }

    /// Reloads with the filter of the most recent request.
    pub async fn refresh(&self) -> LoadReport {
        let filter = self.filter();
        self.load(filter).await
    }
}

impl<C: FeedClient + 'static> DataFetcher<C> {
    /// Refreshes every `interval` until the returned handle is dropped. The
    /// first refresh happens one interval from now.
    pub fn spawn_auto_refresh(&self, interval: Duration) -> AutoRefresh {
        let fetcher = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                fetcher.refresh().await;
            }
        });
        AutoRefresh { task }
    }
}

/// Handle to the periodic refresh task. Dropping it cancels the timer.
#[derive(Debug)]
pub struct AutoRefresh {
    task: JoinHandle<()>,
}

impl AutoRefresh {
    /// Same as dropping the handle.
    pub fn cancel(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.task.abort();
    }
}
