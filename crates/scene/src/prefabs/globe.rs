use foundation::math::Vec3;
use tracing::{debug, warn};

use crate::World;
use crate::components::{Color, Drawable3D, Material, TextureSlot, Transform};
use crate::entity::EntityId;
use crate::resources::{GpuResources, MeshResources, ResourceError};

/// Static layout of the Earth layers. Radii are in globe units (Earth = 1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeConfig {
    pub axial_tilt_deg: f64,
    pub segments: u32,
    pub bump_scale: f32,
    pub sun_direction: Vec3,
    pub cloud_scale: f64,
    pub cloud_opacity: f32,
    pub glow_scale: f64,
    pub glow_color: Color,
    pub star_count: u32,
    pub star_inner_radius: f64,
    pub star_outer_radius: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            axial_tilt_deg: 23.4,
            segments: 64,
            bump_scale: 0.04,
            sun_direction: Vec3::new(-1.5, 1.5, 0.5),
            cloud_scale: 1.003,
            cloud_opacity: 0.95,
            glow_scale: 1.01,
            glow_color: Color(0x0088ff),
            star_count: 2000,
            star_inner_radius: 25.0,
            star_outer_radius: 75.0,
        }
    }
}

/// Entities making up the Earth scene.
///
/// `group` is tilted by the axial tilt and spun by the composer; the surface,
/// night lights, clouds, glow and markers hang off it. The starfield is a
/// sibling so it can counter-rotate independently.
#[derive(Debug)]
pub struct GlobeLayers {
    pub group: EntityId,
    pub earth: EntityId,
    pub night_lights: EntityId,
    pub clouds: EntityId,
    pub glow: EntityId,
    pub stars: EntityId,
    meshes: Vec<MeshResources>,
}

impl GlobeLayers {
    /// Despawns every layer and returns its buffers to the ledger.
    pub fn teardown(self, world: &mut World, resources: &mut GpuResources) {
        world.despawn(self.group);
        world.despawn(self.stars);
        for mesh in self.meshes {
            resources.release_mesh(mesh);
        }
    }
}

/// Spawns the Earth layers. On allocation failure everything spawned so far
/// is despawned and released before the error is returned.
pub fn spawn_globe(
    world: &mut World,
    resources: &mut GpuResources,
    config: &GlobeConfig,
) -> Result<GlobeLayers, ResourceError> {
    let mut builder = LayerBuilder {
        world,
        resources,
        meshes: Vec::new(),
        roots: Vec::new(),
    };
    match builder.build(config) {
        Ok(layers) => {
            debug!(meshes = layers.meshes.len(), "globe layers spawned");
            Ok(layers)
        }
        Err(err) => {
            warn!(
                %err,
                spawned = builder.meshes.len(),
                "globe layer allocation failed; rolling back"
            );
            builder.rollback();
            Err(err)
        }
    }
}

struct LayerBuilder<'a> {
    world: &'a mut World,
    resources: &'a mut GpuResources,
    meshes: Vec<MeshResources>,
    roots: Vec<EntityId>,
}

impl LayerBuilder<'_> {
    fn build(&mut self, config: &GlobeConfig) -> Result<GlobeLayers, ResourceError> {
        let group = self.world.spawn();
        self.roots.push(group);
        self.world.set_transform(
            group,
            Transform::identity()
                .with_rotation(Vec3::new(0.0, 0.0, -config.axial_tilt_deg.to_radians())),
        );

        let sphere = |material| Drawable3D::sphere(1.0, config.segments, material);

        let earth = self.layer(
            Some(group),
            1.0,
            sphere(Material::Phong {
                map: TextureSlot::DayMap,
                specular_map: TextureSlot::Specular,
                bump_map: TextureSlot::BumpMap,
                bump_scale: config.bump_scale,
            }),
        )?;
        let night_lights = self.layer(
            Some(group),
            1.0,
            sphere(Material::NightLights {
                day_map: TextureSlot::DayMap,
                night_map: TextureSlot::NightMap,
                sun_direction: config.sun_direction.as_array(),
            }),
        )?;
        let clouds = self.layer(
            Some(group),
            config.cloud_scale,
            sphere(Material::Clouds {
                map: TextureSlot::Clouds,
                alpha_map: TextureSlot::CloudAlpha,
                opacity: config.cloud_opacity,
            }),
        )?;
        let glow = self.layer(
            Some(group),
            config.glow_scale,
            sphere(Material::Fresnel {
                color: config.glow_color,
            }),
        )?;
        let stars = self.layer(
            None,
            1.0,
            Drawable3D::points(
                config.star_count,
                config.star_inner_radius,
                config.star_outer_radius,
                Material::Stars { size: 0.2 },
            ),
        )?;

        Ok(GlobeLayers {
            group,
            earth,
            night_lights,
            clouds,
            glow,
            stars,
            meshes: std::mem::take(&mut self.meshes),
        })
    }

    fn layer(
        &mut self,
        parent: Option<EntityId>,
        scale: f64,
        drawable: Drawable3D,
    ) -> Result<EntityId, ResourceError> {
        let mesh = self.resources.acquire_mesh(&drawable)?;
        self.meshes.push(mesh);
        let entity = match parent {
            Some(p) => self.world.spawn_child(p),
            None => {
                let e = self.world.spawn();
                self.roots.push(e);
                e
            }
        };
        self.world.set_transform(entity, Transform::scaled(scale));
        self.world.set_drawable_3d(entity, drawable);
        Ok(entity)
    }

    fn rollback(self) {
        for root in self.roots {
            self.world.despawn(root);
        }
        for mesh in self.meshes {
            self.resources.release_mesh(mesh);
        }
    }
}
