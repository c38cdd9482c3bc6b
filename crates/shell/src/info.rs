use chrono::{DateTime, Utc};
use compute::QuakeStats;
use feed::{EarthquakeFeature, Snapshot};
use serde::Serialize;

use crate::format;

pub const EMPTY_MESSAGE: &str = "No earthquakes detected";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Emerald,
    Yellow,
    Orange,
    Red,
}

impl BadgeTone {
    /// Unknown magnitudes share the lowest tone.
    pub fn for_magnitude(magnitude: Option<f64>) -> Self {
        match magnitude {
            Some(m) if m >= 6.0 => BadgeTone::Red,
            Some(m) if m >= 5.0 => BadgeTone::Orange,
            Some(m) if m >= 4.0 => BadgeTone::Yellow,
            _ => BadgeTone::Emerald,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoEntry {
    pub id: String,
    pub badge: String,
    pub tone: BadgeTone,
    pub place: String,
    pub time: String,
    pub time_ago: String,
    pub mag_type: String,
    /// Whether the feature has a marker on the globe.
    pub on_globe: bool,
}

impl InfoEntry {
    pub fn from_feature(feature: &EarthquakeFeature, now: DateTime<Utc>) -> Self {
        Self {
            id: feature.id.clone(),
            badge: match feature.magnitude {
                Some(m) => format!("{m:.1}"),
                None => "–".to_string(),
            },
            tone: BadgeTone::for_magnitude(feature.magnitude),
            place: feature.place_label().to_string(),
            time: format::event_time(feature.event_time()),
            time_ago: format::time_ago(feature.event_time(), now),
            mag_type: feature.mag_type_label().to_string(),
            on_globe: feature.magnitude.is_some(),
        }
    }
}

/// The scrollable earthquake list plus summary figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoPanel {
    pub title: &'static str,
    pub last_updated_at: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub entries: Vec<InfoEntry>,
    /// Shown only once loading has finished with nothing to list.
    pub empty_message: Option<&'static str>,
    pub stats: QuakeStats,
}

impl InfoPanel {
    pub fn build(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        let entries: Vec<_> = snapshot
            .features
            .iter()
            .map(|f| InfoEntry::from_feature(f, now))
            .collect();
        let empty_message = (!snapshot.loading && entries.is_empty()).then_some(EMPTY_MESSAGE);
        Self {
            title: "Live Earthquakes",
            last_updated_at: snapshot.fetched_at.map(format::clock_time),
            loading: snapshot.loading,
            error: snapshot.error.clone(),
            entries,
            empty_message,
            stats: QuakeStats::from_features(&snapshot.features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BadgeTone, EMPTY_MESSAGE, InfoEntry, InfoPanel};
    use chrono::{TimeZone, Utc};
    use feed::{EarthquakeFeature, Snapshot};
    use pretty_assertions::assert_eq;

    fn quake(id: &str, magnitude: Option<f64>) -> EarthquakeFeature {
        EarthquakeFeature {
            id: id.to_string(),
            longitude: 0.0,
            latitude: 0.0,
            depth_km: None,
            magnitude,
            place: None,
            time: 1_700_000_000_000,
            mag_type: None,
            url: None,
            detail: None,
            title: None,
        }
    }

    #[test]
    fn tones_by_magnitude() {
        assert_eq!(BadgeTone::for_magnitude(Some(6.0)), BadgeTone::Red);
        assert_eq!(BadgeTone::for_magnitude(Some(5.5)), BadgeTone::Orange);
        assert_eq!(BadgeTone::for_magnitude(Some(4.0)), BadgeTone::Yellow);
        assert_eq!(BadgeTone::for_magnitude(Some(3.9)), BadgeTone::Emerald);
        assert_eq!(BadgeTone::for_magnitude(None), BadgeTone::Emerald);
    }

    #[test]
    fn entry_falls_back_for_missing_fields() {
        let now = Utc.timestamp_opt(1_700_000_000 + 7_200, 0).unwrap();
        let entry = InfoEntry::from_feature(&quake("a", None), now);
        assert_eq!(
            entry,
            InfoEntry {
                id: "a".into(),
                badge: "–".into(),
                tone: BadgeTone::Emerald,
                place: "Unknown location".into(),
                time: "Nov 14, 2023 22:13:20".into(),
                time_ago: "2 hours ago".into(),
                mag_type: "N/A".into(),
                on_globe: false,
            }
        );
        let entry = InfoEntry::from_feature(&quake("b", Some(4.567)), now);
        assert_eq!(entry.badge, "4.6");
    }

    #[test]
    fn empty_message_waits_for_loading() {
        let now = Utc::now();
        let loading = Snapshot {
            loading: true,
            ..Snapshot::default()
        };
        assert_eq!(InfoPanel::build(&loading, now).empty_message, None);
        assert_eq!(
            InfoPanel::build(&Snapshot::default(), now).empty_message,
            Some(EMPTY_MESSAGE)
        );
    }

    #[test]
    fn stats_follow_snapshot() {
        let snap = Snapshot {
            features: vec![quake("a", Some(2.0)), quake("b", Some(6.2)), quake("c", None)],
            ..Snapshot::default()
        };
        let panel = InfoPanel::build(&snap, Utc::now());
        assert_eq!(panel.entries.len(), 3);
        assert_eq!(panel.stats.total, 3);
        assert_eq!(panel.stats.strongest.as_ref().map(|s| s.id.as_str()), Some("b"));
    }
}
