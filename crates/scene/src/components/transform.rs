use foundation::math::Vec3;

/// Local transform relative to the parent entity.
///
/// Rotation is Euler angles in radians applied in XYZ order (Z first when
/// transforming a point), then uniform scale, then translation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn scaled(scale: f64) -> Self {
        Self {
            scale,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Maps a point from this transform's local space into its parent's space.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        let p = point
            .scale(self.scale)
            .rotate_z(self.rotation.z)
            .rotate_y(self.rotation.y)
            .rotate_x(self.rotation.x);
        p + self.position
    }
}

#[cfg(test)]
mod tests {
    use super::Transform;
    use foundation::math::Vec3;

    #[test]
    fn identity_is_origin() {
        let t = Transform::identity();
        assert_eq!(t.apply(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn applies_scale_rotation_then_translation() {
        let t = Transform {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Vec3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
            scale: 2.0,
        };
        let p = t.apply(Vec3::new(0.0, 0.0, 1.0));
        assert!((p - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-12);
    }
}
