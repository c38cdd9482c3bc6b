//! Earth scene assembly and per-frame animation.

use foundation::math::Vec3;

use crate::World;
use crate::components::Material;
use crate::entity::EntityId;
use crate::prefabs::{GlobeConfig, GlobeLayers, spawn_globe};
use crate::resources::{GpuResources, ResourceError};

/// Angular increments in radians applied once per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationRates {
    pub earth: f64,
    pub clouds: f64,
    /// Applied in the opposite sense so the sky drifts against the globe.
    pub stars: f64,
}

impl Default for RotationRates {
    fn default() -> Self {
        Self {
            earth: 0.001,
            clouds: 0.0005,
            stars: 0.0001,
        }
    }
}

#[derive(Debug)]
pub struct SceneComposer {
    layers: GlobeLayers,
    rates: RotationRates,
    frames: u64,
}

impl SceneComposer {
    pub fn compose(
        world: &mut World,
        resources: &mut GpuResources,
        config: &GlobeConfig,
        rates: RotationRates,
    ) -> Result<Self, ResourceError> {
        let layers = spawn_globe(world, resources, config)?;
        Ok(Self {
            layers,
            rates,
            frames: 0,
        })
    }

    pub fn layers(&self) -> &GlobeLayers {
        &self.layers
    }

    /// Entity that markers attach to. It carries the tilt and the Earth spin,
    /// so markers stay pinned to their projected surface point.
    pub fn marker_parent(&self) -> EntityId {
        self.layers.group
    }

    pub fn rates(&self) -> RotationRates {
        self.rates
    }

    pub fn set_rates(&mut self, rates: RotationRates) {
        self.rates = rates;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Direction the night-lights shader treats as the sun, in globe space.
    pub fn sun_direction(&self, world: &World) -> Option<Vec3> {
        match world.drawable_3d(self.layers.night_lights)?.material {
            Material::NightLights { sun_direction, .. } => {
                let [x, y, z] = sun_direction;
                Some(Vec3::new(x, y, z))
            }
            _ => None,
        }
    }

    /// Moves the day/night terminator. A zero vector is ignored.
    pub fn set_sun_direction(&mut self, world: &mut World, direction: Vec3) -> bool {
        if direction.normalize().is_none() {
            return false;
        }
        let Some(drawable) = world.drawable_3d_mut(self.layers.night_lights) else {
            return false;
        };
        match &mut drawable.material {
            Material::NightLights { sun_direction, .. } => {
                *sun_direction = direction.as_array();
                true
            }
            _ => false,
        }
    }

    /// Applies one frame of rotation. Rates are per display frame, not per
    /// second.
    pub fn advance(&mut self, world: &mut World) {
        let RotationRates {
            earth,
            clouds,
            stars,
        } = self.rates;
        spin_y(world, self.layers.group, earth);
        spin_y(world, self.layers.clouds, clouds);
        spin_y(world, self.layers.stars, -stars);
        self.frames += 1;
    }

    /// Despawns the layers. Markers parented to [`Self::marker_parent`] must
    /// already be released by their owner.
    pub fn teardown(self, world: &mut World, resources: &mut GpuResources) {
        self.layers.teardown(world, resources);
    }
}

fn spin_y(world: &mut World, entity: EntityId, delta: f64) {
    if let Some(t) = world.transform_mut(entity) {
        t.rotation.y = (t.rotation.y + delta).rem_euclid(std::f64::consts::TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::{RotationRates, SceneComposer};
    use crate::World;
    use crate::components::{Color, Drawable3D, Material, Transform};
    use crate::prefabs::GlobeConfig;
    use crate::resources::GpuResources;
    use foundation::math::Vec3;
    use foundation::math::sphere::project;

    fn run(composer: &mut SceneComposer, world: &mut World, frames: usize) {
        for _ in 0..frames {
            composer.advance(world);
        }
    }

    #[test]
    fn layers_rotate_at_independent_rates() {
        let mut world = World::new();
        let mut resources = GpuResources::new();
        let mut composer = SceneComposer::compose(
            &mut world,
            &mut resources,
            &GlobeConfig::default(),
            RotationRates::default(),
        )
        .expect("compose");
        run(&mut composer, &mut world, 100);

        let layers = composer.layers();
        let rot = |e| world.transform(e).expect("alive").rotation;
        assert!((rot(layers.group).y - 0.1).abs() < 1e-9);
        assert!((rot(layers.clouds).y - 0.05).abs() < 1e-9);
        let stars = rot(layers.stars).y;
        assert!((stars - (std::f64::consts::TAU - 0.01)).abs() < 1e-9);
        assert!((rot(layers.group).z + 23.4_f64.to_radians()).abs() < 1e-12);
        assert_eq!(composer.frames(), 100);
    }

    #[test]
    fn markers_follow_the_spinning_group() {
        let mut world = World::new();
        let mut resources = GpuResources::new();
        let mut composer = SceneComposer::compose(
            &mut world,
            &mut resources,
            &GlobeConfig::default(),
            RotationRates {
                earth: std::f64::consts::FRAC_PI_2,
                ..RotationRates::default()
            },
        )
        .expect("compose");

        let marker = world.spawn_child(composer.marker_parent());
        world.set_transform(marker, Transform::translate(project(0.0, 0.0, 1.02)));
        world.set_drawable_3d(
            marker,
            Drawable3D::sphere(0.02, 8, Material::Basic { color: Color::WHITE }).pickable(),
        );

        let before = world.world_position(marker).expect("alive");
        run(&mut composer, &mut world, 1);
        let after = world.world_position(marker).expect("alive");
        assert!((before.length() - after.length()).abs() < 1e-12);
        assert!((before - after).length() > 1.0);

        world.despawn(marker);
        composer.teardown(&mut world, &mut resources);
        assert!(world.is_empty());
        assert_eq!(resources.live(), 0);
    }

    #[test]
    fn configured_rates_replace_defaults() {
        let mut world = World::new();
        let mut resources = GpuResources::new();
        let rates = RotationRates {
            earth: 0.01,
            clouds: 0.0,
            stars: 0.002,
        };
        let mut composer =
            SceneComposer::compose(&mut world, &mut resources, &GlobeConfig::default(), rates)
                .expect("compose");
        assert_eq!(composer.rates(), rates);
        run(&mut composer, &mut world, 10);

        let spin = |world: &World, e| world.transform(e).expect("alive").rotation.y;
        let (group, clouds) = (composer.layers().group, composer.layers().clouds);
        assert!((spin(&world, group) - 0.1).abs() < 1e-9);
        assert_eq!(spin(&world, clouds), 0.0);

        composer.set_rates(RotationRates::default());
        run(&mut composer, &mut world, 10);
        assert!((spin(&world, group) - 0.11).abs() < 1e-9);
        assert!((spin(&world, clouds) - 0.005).abs() < 1e-9);
    }

    #[test]
    fn sun_direction_updates_night_lights() {
        let mut world = World::new();
        let mut resources = GpuResources::new();
        let mut composer = SceneComposer::compose(
            &mut world,
            &mut resources,
            &GlobeConfig::default(),
            RotationRates::default(),
        )
        .expect("compose");
        assert_eq!(
            composer.sun_direction(&world),
            Some(Vec3::new(-1.5, 1.5, 0.5))
        );

        assert!(composer.set_sun_direction(&mut world, Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(composer.sun_direction(&world), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!composer.set_sun_direction(&mut world, Vec3::ZERO));
        assert_eq!(composer.sun_direction(&world), Some(Vec3::new(1.0, 0.0, 0.0)));
    }
}
