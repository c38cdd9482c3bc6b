use feed::EarthquakeFeature;
use layers::MagnitudeBucket;
use serde::Serialize;

pub struct Statistics;

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in values.iter().skip(1) {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub minor: usize,
    pub light: usize,
    pub moderate: usize,
    pub strong: usize,
    pub major: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: MagnitudeBucket) -> usize {
        match bucket {
            MagnitudeBucket::Minor => self.minor,
            MagnitudeBucket::Light => self.light,
            MagnitudeBucket::Moderate => self.moderate,
            MagnitudeBucket::Strong => self.strong,
            MagnitudeBucket::Major => self.major,
        }
    }

    fn bump(&mut self, bucket: MagnitudeBucket) {
        let slot = match bucket {
            MagnitudeBucket::Minor => &mut self.minor,
            MagnitudeBucket::Light => &mut self.light,
            MagnitudeBucket::Moderate => &mut self.moderate,
            MagnitudeBucket::Strong => &mut self.strong,
            MagnitudeBucket::Major => &mut self.major,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongestEvent {
    pub id: String,
    pub magnitude: f64,
    pub place: String,
}

/// Summary figures for the info panel, recomputed from a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuakeStats {
    /// Every feature, including those without a magnitude.
    pub total: usize,
    pub strongest: Option<StrongestEvent>,
    /// Mean over features that have a magnitude.
    pub average_magnitude: Option<f64>,
    pub magnitude_range: Option<(f64, f64)>,
    pub by_bucket: BucketCounts,
    /// Features without a magnitude.
    pub unknown: usize,
}

impl QuakeStats {
    pub fn from_features(features: &[EarthquakeFeature]) -> Self {
        let mut stats = QuakeStats {
            total: features.len(),
            ..QuakeStats::default()
        };
        let mut magnitudes = Vec::with_capacity(features.len());
        let mut strongest: Option<&EarthquakeFeature> = None;

        for feature in features {
            let Some(mag) = feature.magnitude else {
                stats.unknown += 1;
                continue;
            };
            magnitudes.push(mag);
            stats.by_bucket.bump(MagnitudeBucket::for_magnitude(mag));
            let stronger = match strongest.and_then(|s| s.magnitude) {
                Some(best) => mag > best,
                None => true,
            };
            if stronger {
                strongest = Some(feature);
            }
        }

        stats.average_magnitude = Statistics::mean(&magnitudes);
        stats.magnitude_range = Statistics::min_max(&magnitudes);
        stats.strongest = strongest.and_then(|f| {
            Some(StrongestEvent {
                id: f.id.clone(),
                magnitude: f.magnitude?,
                place: f.place_label().to_string(),
            })
        });
        stats
    }
}
