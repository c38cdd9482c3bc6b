use foundation::math::Vec3;

use crate::World;
use crate::components::{Color, Drawable3D, Material, Transform};
use crate::entity::EntityId;
use crate::resources::{GpuResources, MeshResources, ResourceError};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlanetSpec {
    pub name: &'static str,
    /// Radius relative to Earth.
    pub size: f64,
    pub orbit_radius: f64,
    /// Orbital period in days.
    pub period_days: f64,
    pub color: Color,
    pub texture: &'static str,
    pub rings_texture: Option<&'static str>,
}

const fn planet(
    name: &'static str,
    size: f64,
    orbit_radius: f64,
    period_days: f64,
    color: u32,
    texture: &'static str,
) -> PlanetSpec {
    PlanetSpec {
        name,
        size,
        orbit_radius,
        period_days,
        color: Color(color),
        texture,
        rings_texture: None,
    }
}

pub const PLANETS: [PlanetSpec; 8] = [
    planet("Mercury", 0.38, 5.8, 88.0, 0xb1b1b1, "/textures/solarSystem/2k_mercury.jpg"),
    planet("Venus", 0.95, 10.8, 225.0, 0xe6c2a1, "/textures/solarSystem/2k_venus_surface.jpg"),
    planet("Earth", 1.0, 15.0, 365.0, 0x2a5cff, "/textures/earth-daymap.jpg"),
    planet("Mars", 0.53, 22.8, 687.0, 0xff6f40, "/textures/solarSystem/2k_mars.jpg"),
    planet("Jupiter", 11.2, 77.8, 4333.0, 0xd8ca9d, "/textures/solarSystem/2k_jupiter.jpg"),
    PlanetSpec {
        rings_texture: Some("/textures/solarSystem/2k_saturn_ring_alpha.png"),
        ..planet("Saturn", 9.45, 143.4, 10759.0, 0xf5deb3, "/textures/solarSystem/2k_saturn.jpg")
    },
    planet("Uranus", 4.0, 287.1, 30687.0, 0x7fffd4, "/textures/solarSystem/2k_uranus.jpg"),
    planet("Neptune", 3.88, 449.5, 60190.0, 0x4169e1, "/textures/solarSystem/2k_neptune.jpg"),
];

/// Position on the planet's circular orbit in the XZ plane after `days`.
pub fn orbit_position(planet: &PlanetSpec, days: f64) -> Vec3 {
    let angle = std::f64::consts::TAU * days / planet.period_days;
    Vec3::new(
        planet.orbit_radius * angle.cos(),
        0.0,
        planet.orbit_radius * angle.sin(),
    )
}

#[derive(Debug)]
pub struct SolarSystem {
    pub root: EntityId,
    planets: Vec<(PlanetSpec, EntityId)>,
    meshes: Vec<MeshResources>,
}

impl SolarSystem {
    pub fn planets(&self) -> impl Iterator<Item = (&PlanetSpec, EntityId)> + '_ {
        self.planets.iter().map(|(spec, e)| (spec, *e))
    }

    /// Moves every planet to where its orbit puts it after `days`.
    pub fn advance(&self, world: &mut World, days: f64) {
        for (spec, entity) in &self.planets {
            if let Some(t) = world.transform_mut(*entity) {
                t.position = orbit_position(spec, days);
            }
        }
    }

    pub fn teardown(self, world: &mut World, resources: &mut GpuResources) {
        world.despawn(self.root);
        for mesh in self.meshes {
            resources.release_mesh(mesh);
        }
    }
}

/// Spawns one sphere per planet at day zero. All-or-nothing like
/// [`super::spawn_globe`].
pub fn spawn_solar_system(
    world: &mut World,
    resources: &mut GpuResources,
    specs: &[PlanetSpec],
) -> Result<SolarSystem, ResourceError> {
    let root = world.spawn();
    let mut planets = Vec::with_capacity(specs.len());
    let mut meshes = Vec::with_capacity(specs.len());

    for spec in specs {
        let drawable = Drawable3D::sphere(spec.size, 32, Material::Basic { color: spec.color });
        let mesh = match resources.acquire_mesh(&drawable) {
            Ok(mesh) => mesh,
            Err(err) => {
                world.despawn(root);
                for mesh in meshes {
                    resources.release_mesh(mesh);
                }
                return Err(err);
            }
        };
        meshes.push(mesh);

        let entity = world.spawn_child(root);
        world.set_transform(entity, Transform::translate(orbit_position(spec, 0.0)));
        world.set_drawable_3d(entity, drawable);
        planets.push((*spec, entity));
    }

    Ok(SolarSystem {
        root,
        planets,
        meshes,
    })
}

#[cfg(test)]
mod tests {
    use super::{PLANETS, orbit_position, spawn_solar_system};
    use crate::World;
    use crate::resources::GpuResources;
    use foundation::math::Vec3;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn orbit_wraps_after_one_period() {
        let earth = &PLANETS[2];
        assert!(close(orbit_position(earth, 0.0), Vec3::new(15.0, 0.0, 0.0)));
        assert!(close(orbit_position(earth, 365.0), Vec3::new(15.0, 0.0, 0.0)));
        assert!(close(orbit_position(earth, 365.0 / 4.0), Vec3::new(0.0, 0.0, 15.0)));
    }

    #[test]
    fn only_saturn_has_rings() {
        let ringed: Vec<_> = PLANETS
            .iter()
            .filter(|p| p.rings_texture.is_some())
            .map(|p| p.name)
            .collect();
        assert_eq!(ringed, vec!["Saturn"]);
    }

    #[test]
    fn advance_moves_planets_and_teardown_releases() {
        let mut world = World::new();
        let mut resources = GpuResources::new();
        let system = spawn_solar_system(&mut world, &mut resources, &PLANETS).expect("spawn");
        assert_eq!(world.drawables_3d().len(), 8);

        system.advance(&mut world, 44.0);
        let (mercury, entity) = system.planets().next().expect("mercury");
        assert_eq!(mercury.name, "Mercury");
        assert!(close(
            world.world_position(entity).expect("alive"),
            Vec3::new(-5.8, 0.0, 0.0)
        ));

        system.teardown(&mut world, &mut resources);
        assert!(world.is_empty());
        assert_eq!(resources.live(), 0);
    }

    #[test]
    fn exhausted_ledger_leaves_nothing_behind() {
        let mut world = World::new();
        let mut resources = GpuResources::with_capacity(6);
        assert!(spawn_solar_system(&mut world, &mut resources, &PLANETS).is_err());
        assert!(world.is_empty());
        assert_eq!(resources.live(), 0);
    }
}
