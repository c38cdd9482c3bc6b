use std::time::Duration;

pub const USGS_SUMMARY_BASE_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Directory URL the `{threshold}_{range}.geojson` files live under.
    pub base_url: String,
    pub timeout: Duration,
    pub refresh_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: USGS_SUMMARY_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            refresh_interval: Duration::from_secs(300),
        }
    }
}
