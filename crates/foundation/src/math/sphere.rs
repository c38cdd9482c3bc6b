//! Latitude/longitude to scene-space projection onto a sphere.
//!
//! Convention: the sphere is centered on the origin with +Y through the north
//! pole. Longitude is phase-shifted by 180° and X is negated so that the seam of
//! an equirectangular texture (u = 0 at 180°W) lands where the sphere mesh
//! starts its UV wrap. Changing any sign here misaligns markers and texture.

use super::Vec3;

/// A point on the globe in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GeoPoint {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// True when latitude is in [-90, 90] and longitude in [-180, 180].
    ///
    /// Out-of-range points still project; they just don't mean anything.
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat_deg) && (-180.0..=180.0).contains(&self.lon_deg)
    }

    pub fn project(&self, radius: f64) -> Vec3 {
        project(self.lat_deg, self.lon_deg, radius)
    }
}

/// Projects a latitude/longitude pair onto the sphere of `radius`.
pub fn project(lat_deg: f64, lon_deg: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lon_deg + 180.0).to_radians();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vec3::new(
        -radius * sin_phi * cos_theta,
        radius * cos_phi,
        radius * sin_phi * sin_theta,
    )
}
