use feed::Snapshot;
use serde::Serialize;

/// What to show on top of (or instead of) the globe.
///
/// A failed refresh over data the user can still see is reported inline; the
/// full-screen error is reserved for the case where there is nothing to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatusBanner {
    Idle,
    Loading,
    InlineError { message: String },
    FullScreenError { message: String, retry_label: &'static str },
}

impl StatusBanner {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        if let Some(message) = &snapshot.error {
            let message = message.clone();
            if !snapshot.has_succeeded() && snapshot.features.is_empty() {
                return StatusBanner::FullScreenError {
                    message,
                    retry_label: "Retry",
                };
            }
            return StatusBanner::InlineError { message };
        }
        if snapshot.loading {
            StatusBanner::Loading
        } else {
            StatusBanner::Idle
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            StatusBanner::InlineError { .. } | StatusBanner::FullScreenError { .. }
        )
    }
}
