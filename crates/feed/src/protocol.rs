//! GeoJSON wire format of the summary feed and its normalization into
//! [`EarthquakeFeature`]s.
//!
//! Parsing is lenient per feature: one bad feature is rejected and counted,
//! the rest of the collection still loads. Only a body that is not a JSON
//! object at all fails the whole request.

use serde::Deserialize;
use tracing::warn;

use crate::error::FeedError;
use crate::feature::EarthquakeFeature;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    /// Kept as raw values so each feature can fail on its own.
    #[serde(default)]
    pub features: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    pub generated: Option<i64>,
    pub title: Option<String>,
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFeature {
    pub id: Option<String>,
    pub geometry: Option<WireGeometry>,
    #[serde(default)]
    pub properties: WireProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub time: Option<i64>,
    pub mag_type: Option<String>,
    pub url: Option<String>,
    pub detail: Option<String>,
    pub title: Option<String>,
}

/// Features accepted from one response plus how many were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureBatch {
    pub features: Vec<EarthquakeFeature>,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotAFeature(String),
    MissingId,
    MissingCoordinates,
}

impl WireFeature {
    pub fn normalize(self) -> Result<EarthquakeFeature, Rejection> {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(Rejection::MissingId),
        };
        let coords = self.geometry.map(|g| g.coordinates).unwrap_or_default();
        let (longitude, latitude) = match coords.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => return Err(Rejection::MissingCoordinates),
        };
        let p = self.properties;
        Ok(EarthquakeFeature {
            id,
            longitude,
            latitude,
            depth_km: coords.get(2).copied(),
            magnitude: p.mag,
            place: p.place,
            time: p.time.unwrap_or_default(),
            mag_type: p.mag_type,
            url: p.url,
            detail: p.detail,
            title: p.title,
        })
    }
}

/// Parses a feed body. A missing `features` array means zero results.
pub fn parse_feature_collection(body: &[u8]) -> Result<FeatureBatch, FeedError> {
    let collection: FeatureCollection =
        serde_json::from_slice(body).map_err(|e| FeedError::Malformed(e.to_string()))?;

    let mut batch = FeatureBatch::default();
    for raw in collection.features.unwrap_or_default() {
        let id_hint = raw.get("id").and_then(|v| v.as_str()).map(str::to_owned);
        let normalized = serde_json::from_value::<WireFeature>(raw)
            .map_err(|e| Rejection::NotAFeature(e.to_string()))
            .and_then(WireFeature::normalize);
        match normalized {
            Ok(feature) => batch.features.push(feature),
            Err(reason) => {
                warn!(id = id_hint.as_deref().unwrap_or("<none>"), ?reason, "rejected feed feature");
                batch.rejected += 1;
            }
        }
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::parse_feature_collection;
    use crate::error::FeedError;
    use pretty_assertions::assert_eq;

    const BODY: &str = r#"{
        "type": "FeatureCollection",
        "metadata": { "generated": 1700000000000, "count": 3 },
        "features": [
            { "type": "Feature", "id": "us7000a",
              "properties": { "mag": 5.1, "place": "Off the coast", "time": 1699999000000, "magType": "mww" },
              "geometry": { "type": "Point", "coordinates": [142.3, 38.1, 24.0] } },
            { "type": "Feature", "id": "nc7300b",
              "properties": { "mag": null, "place": null, "time": 1699998000000 },
              "geometry": { "type": "Point", "coordinates": [-122.8, 38.8] } },
            { "type": "Feature",
              "properties": { "mag": 2.0 },
              "geometry": { "type": "Point", "coordinates": [0.0, 0.0, 1.0] } }
        ]
    }"#;

    #[test]
    fn keeps_null_magnitudes_and_rejects_missing_ids() {
        let batch = parse_feature_collection(BODY.as_bytes()).expect("parse");
        assert_eq!(batch.rejected, 1);
        let ids: Vec<_> = batch.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["us7000a", "nc7300b"]);

        let first = &batch.features[0];
        assert_eq!((first.longitude, first.latitude), (142.3, 38.1));
        assert_eq!(first.depth_km, Some(24.0));
        assert_eq!(first.mag_type.as_deref(), Some("mww"));

        let second = &batch.features[1];
        assert_eq!(second.magnitude, None);
        assert_eq!(second.depth_km, None);
        assert_eq!(second.place_label(), "Unknown location");
    }

    #[test]
    fn missing_features_array_is_empty_result() {
        let batch = parse_feature_collection(br#"{"type":"FeatureCollection"}"#).expect("parse");
        assert!(batch.features.is_empty());
        assert_eq!(batch.rejected, 0);
    }

    #[test]
    fn rejects_short_coordinates_and_non_objects() {
        let body = br#"{"features":[
            {"id":"a","geometry":{"coordinates":[1.0]}},
            {"id":"b"},
            "nonsense"
        ]}"#;
        let batch = parse_feature_collection(body).expect("parse");
        assert!(batch.features.is_empty());
        assert_eq!(batch.rejected, 3);
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_feature_collection(b"<html>busy</html>").unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }
}
