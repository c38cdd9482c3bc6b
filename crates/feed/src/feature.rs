use foundation::math::GeoPoint;
use foundation::time::EpochMillis;
use serde::Serialize;

pub const UNKNOWN_PLACE: &str = "Unknown location";
pub const UNKNOWN_MAG_TYPE: &str = "N/A";

/// One earthquake event as held by a snapshot. Never mutated after
/// normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarthquakeFeature {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Kilometers. Not used for projection.
    pub depth_km: Option<f64>,
    pub magnitude: Option<f64>,
    pub place: Option<String>,
    /// Event time in epoch milliseconds.
    pub time: i64,
    pub mag_type: Option<String>,
    pub url: Option<String>,
    pub detail: Option<String>,
    pub title: Option<String>,
}

impl EarthquakeFeature {
    pub fn geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn event_time(&self) -> EpochMillis {
        EpochMillis(self.time)
    }

    pub fn place_label(&self) -> &str {
        self.place.as_deref().unwrap_or(UNKNOWN_PLACE)
    }

    pub fn mag_type_label(&self) -> &str {
        self.mag_type.as_deref().unwrap_or(UNKNOWN_MAG_TYPE)
    }
}

#[cfg(test)]
pub(crate) fn sample(id: &str, magnitude: Option<f64>) -> EarthquakeFeature {
    EarthquakeFeature {
        id: id.to_string(),
        longitude: -122.5,
        latitude: 37.7,
        depth_km: Some(8.0),
        magnitude,
        place: Some("10 km N of Somewhere, CA".to_string()),
        time: 1_700_000_000_000,
        mag_type: Some("ml".to_string()),
        url: None,
        detail: None,
        title: None,
    }
}
