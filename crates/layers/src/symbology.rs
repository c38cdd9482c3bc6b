use scene::components::Color;
use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    pub visible: bool,
    /// Height above the globe surface as a fraction of the globe radius.
    pub lift: f64,
}

impl LayerStyle {
    pub const fn new(visible: bool, lift: f64) -> Self {
        Self { visible, lift }
    }

    /// Radius of the shell markers sit on, clear of the cloud and glow shells.
    pub fn surface_radius(&self, globe_radius: f64) -> f64 {
        globe_radius * (1.0 + self.lift)
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            visible: true,
            lift: 0.02,
        }
    }
}

/// Severity category used for marker color and the legend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeBucket {
    Minor,
    Light,
    Moderate,
    Strong,
    Major,
}

impl MagnitudeBucket {
    pub const ALL: [MagnitudeBucket; 5] = [
        MagnitudeBucket::Minor,
        MagnitudeBucket::Light,
        MagnitudeBucket::Moderate,
        MagnitudeBucket::Strong,
        MagnitudeBucket::Major,
    ];

    /// Lower bounds are inclusive: 2.5 is Light, 2.4999 is Minor.
    pub fn for_magnitude(magnitude: f64) -> Self {
        if magnitude < 2.5 {
            MagnitudeBucket::Minor
        } else if magnitude < 4.5 {
            MagnitudeBucket::Light
        } else if magnitude < 6.0 {
            MagnitudeBucket::Moderate
        } else if magnitude < 7.0 {
            MagnitudeBucket::Strong
        } else {
            MagnitudeBucket::Major
        }
    }

    pub fn color(self) -> Color {
        match self {
            MagnitudeBucket::Minor => Color(0x00ff00),
            MagnitudeBucket::Light => Color(0xffff00),
            MagnitudeBucket::Moderate => Color(0xff9900),
            MagnitudeBucket::Strong => Color(0xff3300),
            MagnitudeBucket::Major => Color(0xff0000),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MagnitudeBucket::Minor => "Minor",
            MagnitudeBucket::Light => "Light",
            MagnitudeBucket::Moderate => "Moderate",
            MagnitudeBucket::Strong => "Strong",
            MagnitudeBucket::Major => "Major",
        }
    }

    /// Magnitude span as shown in the legend.
    pub fn range_label(self) -> &'static str {
        match self {
            MagnitudeBucket::Minor => "< M2.5",
            MagnitudeBucket::Light => "M2.5 - M4.5",
            MagnitudeBucket::Moderate => "M4.5 - M6.0",
            MagnitudeBucket::Strong => "M6.0 - M7.0",
            MagnitudeBucket::Major => "M7.0+",
        }
    }
}

pub fn color_for(magnitude: f64) -> Color {
    MagnitudeBucket::for_magnitude(magnitude).color()
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerSizing {
    /// Smallest radius ever produced; keeps M0 and negative events visible.
    pub floor: f64,
    pub scale: f64,
}

impl Default for MarkerSizing {
    fn default() -> Self {
        Self {
            floor: 0.01,
            scale: 0.015,
        }
    }
}

impl MarkerSizing {
    pub fn radius_for(&self, magnitude: f64) -> f64 {
        (magnitude * self.scale).max(self.floor)
    }
}
