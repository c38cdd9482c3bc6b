use foundation::math::Vec3;
use foundation::time::Time;
use runtime::frame::Frame;

use crate::World;
use crate::camera::Camera;
use crate::components::{Color, Material};
use crate::entity::EntityId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FocusConfig {
    /// Eye distance from the orbit center after focusing. The eye ends up on
    /// the ray from the center through the marker.
    pub camera_distance: f64,
    pub highlight_color: Color,
    pub highlight_scale: f64,
    pub highlight_seconds: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            camera_distance: 2.5,
            highlight_color: Color::WHITE,
            highlight_scale: 2.5,
            highlight_seconds: 2.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FocusTarget {
    pub entity: EntityId,
    /// Marker position in world space at the moment of focusing.
    pub target: Vec3,
    pub camera_position: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Highlight {
    entity: EntityId,
    original_color: Color,
    original_scale: f64,
    until: Time,
}

/// Camera focus plus a timed highlight on the focused marker.
///
/// At most one marker is highlighted; focusing another restores the previous
/// one first so scales never compound.
#[derive(Debug, Default)]
pub struct Focus {
    config: FocusConfig,
    active: Option<Highlight>,
}

impl Focus {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn highlighted(&self) -> Option<EntityId> {
        self.active.map(|h| h.entity)
    }

    pub fn focus_on(
        &mut self,
        world: &mut World,
        camera: &mut Camera,
        entity: EntityId,
        now: Time,
    ) -> Option<FocusTarget> {
        let target = world.world_position(entity)?;
        let orbit_center = camera.target;
        let dir = (target - orbit_center).normalize()?;
        self.restore(world);

        let camera_position = orbit_center + dir.scale(self.config.camera_distance);
        camera.look_at(camera_position, orbit_center);

        let original_scale = world.transform(entity)?.scale;
        let drawable = world.drawable_3d_mut(entity)?;
        let Material::Basic { color } = &mut drawable.material else {
            return Some(FocusTarget {
                entity,
                target,
                camera_position,
            });
        };
        let original_color = *color;
        *color = self.config.highlight_color;
        if let Some(t) = world.transform_mut(entity) {
            t.scale = original_scale * self.config.highlight_scale;
        }

        self.active = Some(Highlight {
            entity,
            original_color,
            original_scale,
            until: now.after(self.config.highlight_seconds),
        });
        Some(FocusTarget {
            entity,
            target,
            camera_position,
        })
    }

    /// Ends the highlight once its time is up.
    pub fn tick(&mut self, world: &mut World, frame: Frame) {
        if let Some(h) = self.active {
            if frame.time >= h.until {
                self.restore(world);
            }
        }
    }

    /// Restores the highlighted marker immediately. A marker that has already
    /// been despawned is simply forgotten.
    pub fn restore(&mut self, world: &mut World) {
        let Some(h) = self.active.take() else {
            return;
        };
        if let Some(drawable) = world.drawable_3d_mut(h.entity) {
            if let Material::Basic { color } = &mut drawable.material {
                *color = h.original_color;
            }
        }
        if let Some(t) = world.transform_mut(h.entity) {
            t.scale = h.original_scale;
        }
    }
}
