use foundation::math::Vec3;

use crate::picking::Ray;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Orbit controls keep the eye within this distance band of the target.
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 8.0),
            target: Vec3::ZERO,
            fov_y_deg: 50.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 2.0,
            max_distance: 20.0,
        }
    }
}

/// Perspective orbit camera. Panning is disabled: the target stays put and
/// only distance and direction change.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    pub aspect: f64,
    min_distance: f64,
    max_distance: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            position: config.position,
            target: config.target,
            fov_y_deg: config.fov_y_deg,
            near: config.near,
            far: config.far,
            aspect: 1.0,
            min_distance: config.min_distance.min(config.max_distance),
            max_distance: config.max_distance.max(config.min_distance),
        };
        camera.clamp_distance();
        camera
    }

    pub fn set_aspect(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn distance(&self) -> f64 {
        (self.position - self.target).length()
    }

    /// Moves the eye to `position` and aims it at `target`, subject to the
    /// orbit distance limits.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
        self.clamp_distance();
    }

    /// Multiplies the eye distance by `factor`, clamped to the orbit limits.
    pub fn zoom(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let Some(dir) = (self.position - self.target).normalize() else {
            return;
        };
        let d = (self.distance() * factor).clamp(self.min_distance, self.max_distance);
        self.position = self.target + dir.scale(d);
    }

    /// Rotates the eye around the target by `yaw` (about world Y) and `pitch`
    /// (about the camera's right axis), in radians.
    pub fn orbit(&mut self, yaw: f64, pitch: f64) {
        let offset = self.position - self.target;
        let d = offset.length();
        if d <= 0.0 {
            return;
        }
        let polar = (offset.y / d).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);

        let polar = (polar - pitch).clamp(1e-3, std::f64::consts::PI - 1e-3);
        let azimuth = azimuth + yaw;
        let offset = Vec3::new(
            d * polar.sin() * azimuth.sin(),
            d * polar.cos(),
            d * polar.sin() * azimuth.cos(),
        );
        self.position = self.target + offset;
    }

    /// World-space ray through normalized device coordinates in [-1, 1].
    pub fn ray_from_ndc(&self, ndc_x: f64, ndc_y: f64) -> Option<Ray> {
        let forward = (self.target - self.position).normalize()?;
        let world_up = if forward.cross(Vec3::new(0.0, 1.0, 0.0)).length() < 1e-9 {
            Vec3::new(0.0, 0.0, -1.0)
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
        let right = forward.cross(world_up).normalize()?;
        let up = right.cross(forward);

        let tan = (self.fov_y_deg.to_radians() * 0.5).tan();
        let dir = forward + right.scale(ndc_x * tan * self.aspect) + up.scale(ndc_y * tan);
        Some(Ray::new(self.position, dir))
    }

    fn clamp_distance(&mut self) {
        let d = self.distance();
        if d < self.min_distance || d > self.max_distance {
            self.zoom(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Camera, CameraConfig};
    use foundation::math::Vec3;

    #[test]
    fn zoom_is_clamped_to_orbit_limits() {
        let mut cam = Camera::default();
        cam.zoom(0.01);
        assert!((cam.distance() - 2.0).abs() < 1e-12);
        cam.zoom(1_000.0);
        assert!((cam.distance() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn look_at_respects_min_distance() {
        let mut cam = Camera::new(CameraConfig::default());
        cam.look_at(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO);
        assert!((cam.distance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = Camera::default();
        let ray = cam.ray_from_ndc(0.0, 0.0).expect("ray");
        let dir = ray.dir.normalize().expect("dir");
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = Camera::default();
        cam.orbit(0.7, 0.3);
        assert!((cam.distance() - 8.0).abs() < 1e-9);
    }
}
