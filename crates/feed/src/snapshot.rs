use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FeedError;
use crate::feature::EarthquakeFeature;
use crate::filter::FilterSelection;
use crate::protocol::FeatureBatch;
use crate::request::RequestToken;

/// The current set of known earthquakes plus fetch metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub features: Vec<EarthquakeFeature>,
    /// Filter that produced `features`.
    pub filter: FilterSelection,
    pub fetched_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub error: Option<String>,
    /// Features dropped during normalization of the last successful response.
    pub rejected: usize,
    /// Bumped every time `features` is replaced.
    pub revision: u64,
}

impl Snapshot {
    pub fn has_succeeded(&self) -> bool {
        self.fetched_at.is_some()
    }

    pub fn feature(&self, id: &str) -> Option<&EarthquakeFeature> {
        self.features.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LoadOutcome {
    Replaced { features: usize, rejected: usize },
    Failed { message: String },
    /// A newer request was issued before this one resolved; its result was
    /// discarded.
    Superseded,
}

/// Owns the snapshot and decides which responses may touch it.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Snapshot,
    /// Filter of the most recent request, applied to `snapshot.filter` once it
    /// succeeds.
    pending_filter: FilterSelection,
    latest: RequestToken,
}

impl SnapshotStore {
    pub fn new(filter: FilterSelection) -> Self {
        Self {
            snapshot: Snapshot {
                filter,
                ..Snapshot::default()
            },
            pending_filter: filter,
            latest: RequestToken::default(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn latest(&self) -> RequestToken {
        self.latest
    }

    /// Filter of the most recently issued request.
    pub fn requested_filter(&self) -> FilterSelection {
        self.pending_filter
    }

    /// Issues a token for a new request and marks the snapshot as loading.
    pub fn begin(&mut self, filter: FilterSelection) -> RequestToken {
        self.latest = self.latest.next();
        self.pending_filter = filter;
        self.snapshot.loading = true;
        self.snapshot.error = None;
        self.latest
    }

    /// Applies a response. Anything but the latest token is dropped without
    /// touching the snapshot. A failure leaves `features` and `fetched_at`
    /// as they were and only records the error.
    pub fn complete(
        &mut self,
        token: RequestToken,
        result: Result<FeatureBatch, FeedError>,
        fetched_at: DateTime<Utc>,
    ) -> LoadOutcome {
        if token != self.latest {
            return LoadOutcome::Superseded;
        }
        self.snapshot.loading = false;
        match result {
            Ok(batch) => {
                let outcome = LoadOutcome::Replaced {
                    features: batch.features.len(),
                    rejected: batch.rejected,
                };
                self.snapshot.features = batch.features;
                self.snapshot.rejected = batch.rejected;
                self.snapshot.filter = self.pending_filter;
                self.snapshot.fetched_at = Some(fetched_at);
                self.snapshot.error = None;
                self.snapshot.revision += 1;
                outcome
            }
            Err(err) => {
                let message = err.user_message();
                self.snapshot.error = Some(message.clone());
                LoadOutcome::Failed { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOutcome, SnapshotStore};
    use crate::error::FeedError;
    use crate::feature::sample;
    use crate::filter::{FilterSelection, MagnitudeThreshold, TimeRange};
    use crate::protocol::FeatureBatch;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn batch(ids: &[&str]) -> FeatureBatch {
        FeatureBatch {
            features: ids.iter().map(|id| sample(id, Some(3.0))).collect(),
            rejected: 0,
        }
    }

    #[test]
    fn success_replaces_features_atomically() {
        let mut store = SnapshotStore::default();
        let t = store.begin(FilterSelection::default());
        assert!(store.snapshot().loading);

        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let outcome = store.complete(t, Ok(batch(&["a", "b"])), at);
        assert_eq!(outcome, LoadOutcome::Replaced { features: 2, rejected: 0 });

        let t = store.begin(FilterSelection::default());
        store.complete(t, Ok(batch(&["c"])), at);
        let snap = store.snapshot();
        assert_eq!(snap.features.len(), 1);
        assert_eq!(snap.features[0].id, "c");
        assert_eq!(snap.revision, 2);
        assert!(!snap.loading);
    }

    #[test]
    fn failure_keeps_previous_features() {
        let mut store = SnapshotStore::default();
        let first = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let t = store.begin(FilterSelection::default());
        store.complete(t, Ok(batch(&["a"])), first);

        let t = store.begin(FilterSelection::default());
        let outcome = store.complete(
            t,
            Err(FeedError::Status { status: 500 }),
            Utc.timestamp_opt(1_700_000_300, 0).unwrap(),
        );
        assert_eq!(
            outcome,
            LoadOutcome::Failed {
                message: "Request failed with status code 500".to_string()
            }
        );
        let snap = store.snapshot();
        assert_eq!(snap.features[0].id, "a");
        assert_eq!(snap.fetched_at, Some(first));
        assert_eq!(snap.revision, 1);
        assert!(snap.error.is_some());
        assert!(!snap.loading);
    }

    #[test]
    fn stale_token_is_superseded() {
        let mut store = SnapshotStore::default();
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let week = FilterSelection::new(TimeRange::Week, MagnitudeThreshold::All);
        let hour = FilterSelection::new(TimeRange::Hour, MagnitudeThreshold::M4_5);

        let old = store.begin(week);
        let new = store.begin(hour);
        assert!(new > old);

        assert!(matches!(store.complete(new, Ok(batch(&["new"])), at), LoadOutcome::Replaced { .. }));
        assert_eq!(store.complete(old, Ok(batch(&["old"])), at), LoadOutcome::Superseded);

        let snap = store.snapshot();
        assert_eq!(snap.features[0].id, "new");
        assert_eq!(snap.filter, hour);
    }

    #[test]
    fn superseded_response_does_not_clear_loading() {
        let mut store = SnapshotStore::default();
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let old = store.begin(FilterSelection::default());
        let _new = store.begin(FilterSelection::default());
        store.complete(old, Err(FeedError::Transport("reset".into())), at);
        assert!(store.snapshot().loading);
        assert!(store.snapshot().error.is_none());
    }
}
