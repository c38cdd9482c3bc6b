use feed::{LoadOutcome, MagnitudeThreshold, TimeRange};
use serde::{Deserialize, Serialize};

/// User actions coming from the panels or the canvas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    SetTimeRange { range: TimeRange },
    SetMagnitudeThreshold { threshold: MagnitudeThreshold },
    Refresh,
    Select { id: String },
    /// Radians around the target; positive pitch tilts toward the north pole.
    Orbit {
        yaw: f64,
        #[serde(default)]
        pitch: f64,
    },
    /// Scales the camera distance. Values below 1 move closer.
    Zoom { factor: f64 },
    SetRotationRates { earth: f64, clouds: f64, stars: f64 },
    SetSunDirection { direction: [f64; 3] },
    SetMarkersVisible { visible: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IntentOutcome {
    Loaded { result: LoadOutcome },
    Focused { id: String, camera_position: [f64; 3] },
    Camera { position: [f64; 3] },
    Applied,
}
