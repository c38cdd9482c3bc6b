use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::World;
use crate::entity::EntityId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
    /// Extra radius added to every sphere so sub-pixel markers stay clickable.
    pub slop: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
            slop: 0.0,
        }
    }
}

/// Ray picking against visible, pickable sphere drawables.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - If multiple entities are hit at the same distance, the lower `EntityId::index()` wins.
///
/// Sphere centers and radii are resolved in world space, so markers parented
/// to the rotating globe group are hit where they are drawn this frame.
pub fn pick_ray(world: &World, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let dir = ray.dir.normalize()?;

    let mut best: Option<(f64, EntityId)> = None;
    for (entity, _transform, drawable) in world.drawables_3d() {
        if !drawable.pickable {
            continue;
        }
        let Some(radius) = drawable.sphere_radius() else {
            continue;
        };
        let (Some(center), Some(scale)) = (world.world_position(entity), world.world_scale(entity))
        else {
            continue;
        };

        let Some(t) = ray_sphere_hit_t(ray.origin, dir, center, radius * scale + opts.slop) else {
            continue;
        };
        if t > opts.max_distance {
            continue;
        }

        best = match best {
            None => Some((t, entity)),
            Some((bt, be)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| entity.index().cmp(&be.index()));
                if ord.is_lt() {
                    Some((t, entity))
                } else {
                    Some((bt, be))
                }
            }
        };
    }

    let (t, entity) = best?;
    Some(PickHit {
        entity,
        distance: t,
        point: ray.origin + dir.scale(t),
    })
}

/// Screen picking wrapper.
///
/// The caller supplies the screen->ray mapping via `make_ray`.
pub fn pick_screen<F>(
    world: &World,
    x_px: f64,
    y_px: f64,
    mut make_ray: F,
    opts: PickOptions,
) -> Option<PickHit>
where
    F: FnMut(f64, f64) -> Option<Ray>,
{
    let ray = make_ray(x_px, y_px)?;
    pick_ray(world, ray, opts)
}

/// Entry distance along a normalized ray, or 0 when the origin is inside.
fn ray_sphere_hit_t(origin: Vec3, dir: Vec3, center: Vec3, radius: f64) -> Option<f64> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t_near = -b - sq;
    let t_far = -b + sq;
    if t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}
