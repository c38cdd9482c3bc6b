use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownFilter {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Hour,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    /// Path segment used by the feed.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Hour => "hour",
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Hour => "Past Hour",
            TimeRange::Day => "Past Day",
            TimeRange::Week => "Past Week",
            TimeRange::Month => "Past Month",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownFilter {
                kind: "time range",
                value: s.to_string(),
            })
    }
}

/// Server-side magnitude pre-filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MagnitudeThreshold {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1.0")]
    M1,
    #[serde(rename = "2.5")]
    M2_5,
    #[serde(rename = "4.5")]
    M4_5,
    #[serde(rename = "significant")]
    Significant,
}

impl MagnitudeThreshold {
    pub const ALL: [MagnitudeThreshold; 5] = [
        MagnitudeThreshold::All,
        MagnitudeThreshold::M1,
        MagnitudeThreshold::M2_5,
        MagnitudeThreshold::M4_5,
        MagnitudeThreshold::Significant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MagnitudeThreshold::All => "all",
            MagnitudeThreshold::M1 => "1.0",
            MagnitudeThreshold::M2_5 => "2.5",
            MagnitudeThreshold::M4_5 => "4.5",
            MagnitudeThreshold::Significant => "significant",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MagnitudeThreshold::All => "All Magnitudes",
            MagnitudeThreshold::M1 => "M1.0+",
            MagnitudeThreshold::M2_5 => "M2.5+",
            MagnitudeThreshold::M4_5 => "M4.5+",
            MagnitudeThreshold::Significant => "Significant",
        }
    }
}

impl fmt::Display for MagnitudeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MagnitudeThreshold {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownFilter {
                kind: "magnitude threshold",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub time_range: TimeRange,
    pub magnitude_threshold: MagnitudeThreshold,
}

impl FilterSelection {
    pub fn new(time_range: TimeRange, magnitude_threshold: MagnitudeThreshold) -> Self {
        Self {
            time_range,
            magnitude_threshold,
        }
    }

    /// File name of the summary feed, e.g. `2.5_week.geojson`.
    pub fn feed_path(&self) -> String {
        format!(
            "{}_{}.geojson",
            self.magnitude_threshold.as_str(),
            self.time_range.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterSelection, MagnitudeThreshold, TimeRange};

    #[test]
    fn default_selection_is_all_day() {
        assert_eq!(FilterSelection::default().feed_path(), "all_day.geojson");
        let f = FilterSelection::new(TimeRange::Week, MagnitudeThreshold::M2_5);
        assert_eq!(f.feed_path(), "2.5_week.geojson");
    }

    #[test]
    fn parses_path_segments() {
        assert_eq!("month".parse::<TimeRange>(), Ok(TimeRange::Month));
        assert_eq!(
            "significant".parse::<MagnitudeThreshold>(),
            Ok(MagnitudeThreshold::Significant)
        );
        let err = "1".parse::<MagnitudeThreshold>().unwrap_err();
        assert_eq!(err.to_string(), "unknown magnitude threshold `1`");
    }

    #[test]
    fn serde_uses_feed_spelling() {
        let f = FilterSelection::new(TimeRange::Hour, MagnitudeThreshold::M4_5);
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, r#"{"timeRange":"hour","magnitudeThreshold":"4.5"}"#);
        let back: FilterSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
