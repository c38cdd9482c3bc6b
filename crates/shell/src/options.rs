use chrono::{DateTime, Utc};
use feed::{FilterSelection, MagnitudeThreshold, Snapshot, TimeRange};
use layers::MagnitudeBucket;
use serde::Serialize;

use crate::format;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendRow {
    pub range: &'static str,
    pub label: &'static str,
    pub color: String,
}

/// Filter controls, refresh button state and the magnitude legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPanel {
    pub time_ranges: Vec<OptionItem>,
    pub magnitudes: Vec<OptionItem>,
    pub refresh_label: &'static str,
    /// Disabled while a request is outstanding.
    pub refresh_disabled: bool,
    pub total_count: usize,
    pub last_updated: String,
    pub legend: Vec<LegendRow>,
}

impl OptionsPanel {
    /// `selected` is the filter of the most recent request, which may differ
    /// from `snapshot.filter` while that request is in flight.
    pub fn build(snapshot: &Snapshot, selected: FilterSelection, now: DateTime<Utc>) -> Self {
        let time_ranges = TimeRange::ALL
            .into_iter()
            .map(|r| OptionItem {
                value: r.as_str(),
                label: r.label(),
                selected: r == selected.time_range,
            })
            .collect();
        let magnitudes = MagnitudeThreshold::ALL
            .into_iter()
            .map(|t| OptionItem {
                value: t.as_str(),
                label: t.label(),
                selected: t == selected.magnitude_threshold,
            })
            .collect();

        Self {
            time_ranges,
            magnitudes,
            refresh_label: if snapshot.loading { "Refreshing..." } else { "Refresh Data" },
            refresh_disabled: snapshot.loading,
            total_count: snapshot.features.len(),
            last_updated: format::last_updated(snapshot.fetched_at, now),
            legend: legend(),
        }
    }
}

pub fn legend() -> Vec<LegendRow> {
    MagnitudeBucket::ALL
        .into_iter()
        .map(|b| LegendRow {
            range: b.range_label(),
            label: b.label(),
            color: b.color().to_hex(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::OptionsPanel;
    use chrono::{Duration, Utc};
    use feed::{FilterSelection, MagnitudeThreshold, Snapshot, TimeRange};

    #[test]
    fn marks_selected_options() {
        let selected = FilterSelection::new(TimeRange::Week, MagnitudeThreshold::M4_5);
        let panel = OptionsPanel::build(&Snapshot::default(), selected, Utc::now());
        let picked: Vec<_> = panel
            .time_ranges
            .iter()
            .chain(&panel.magnitudes)
            .filter(|o| o.selected)
            .map(|o| o.label)
            .collect();
        assert_eq!(picked, vec!["Past Week", "M4.5+"]);
        assert_eq!(panel.last_updated, "Never");
        assert_eq!(panel.legend.len(), 5);
        assert_eq!(panel.legend[0].color, "#00ff00");
    }

    #[test]
    fn refresh_disabled_while_loading() {
        let now = Utc::now();
        let snap = Snapshot {
            loading: true,
            fetched_at: Some(now - Duration::seconds(90)),
            ..Snapshot::default()
        };
        let panel = OptionsPanel::build(&snap, FilterSelection::default(), now);
        assert!(panel.refresh_disabled);
        assert_eq!(panel.refresh_label, "Refreshing...");
        assert_eq!(panel.last_updated, "1m ago");
    }
}
