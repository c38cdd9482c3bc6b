use super::material::Material;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    /// UV sphere with `segments` width and height subdivisions.
    Sphere { radius: f64, segments: u32 },
    /// Point cloud scattered on a shell between `inner` and `outer` radii.
    Points { count: u32, inner: f64, outer: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
    pub material: Material,
    /// Whether ray picking considers this drawable.
    pub pickable: bool,
}

impl Drawable3D {
    pub fn sphere(radius: f64, segments: u32, material: Material) -> Self {
        Self {
            shape: Shape3D::Sphere { radius, segments },
            material,
            pickable: false,
        }
    }

    pub fn points(count: u32, inner: f64, outer: f64, material: Material) -> Self {
        Self {
            shape: Shape3D::Points {
                count,
                inner,
                outer,
            },
            material,
            pickable: false,
        }
    }

    pub fn pickable(mut self) -> Self {
        self.pickable = true;
        self
    }

    pub fn sphere_radius(&self) -> Option<f64> {
        match self.shape {
            Shape3D::Sphere { radius, .. } => Some(radius),
            Shape3D::Points { .. } => None,
        }
    }
}
