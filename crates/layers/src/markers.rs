//! The marker set: one pickable sphere per earthquake in the current snapshot.
//!
//! Markers are rebuilt wholesale on every snapshot. Every marker owns the
//! mesh resources it was created with and hands them back when it is
//! removed, so `GpuResources::live()` returns to its pre-snapshot value
//! after each rebuild.

use std::collections::HashMap;

use feed::EarthquakeFeature;
use foundation::math::Vec3;
use scene::World;
use scene::components::{Color, Drawable3D, Material, Transform, Visibility};
use scene::entity::EntityId;
use scene::registry::MeshRegistry;
use scene::resources::{GpuResources, MeshResources};
use tracing::{debug, info, warn};

use crate::layer::{Layer, LayerId};
use crate::symbology::{LayerStyle, MarkerSizing, color_for};

pub const MARKER_SEGMENTS: u32 = 8;

#[derive(Debug)]
pub struct Marker {
    pub feature_id: String,
    pub entity: EntityId,
    pub magnitude: f64,
    pub color: Color,
    pub radius: f64,
    /// Position relative to the marker root (globe-local).
    pub position: Vec3,
    mesh: MeshResources,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Markers removed from the previous snapshot.
    pub released: usize,
    pub created: usize,
    pub skipped_no_magnitude: usize,
    pub skipped_bad_coords: usize,
    pub skipped_duplicate: usize,
    /// Features whose mesh could not be allocated.
    pub failed: usize,
}

impl ApplyReport {
    pub fn skipped(&self) -> usize {
        self.skipped_no_magnitude + self.skipped_bad_coords + self.skipped_duplicate + self.failed
    }
}

#[derive(Debug)]
pub struct MarkerLayer {
    id: LayerId,
    style: LayerStyle,
    sizing: MarkerSizing,
    globe_radius: f64,
    parent: EntityId,
    /// Re-spawned on every clear, so the whole set goes in one despawn.
    root: EntityId,
    markers: Vec<Marker>,
    by_feature: HashMap<String, usize>,
    by_entity: HashMap<EntityId, usize>,
}

impl MarkerLayer {
    /// Creates an empty layer whose markers hang off `parent`.
    pub fn new(world: &mut World, parent: EntityId, id: u64) -> Self {
        let root = world.spawn_child(parent);
        Self {
            id: LayerId(id),
            style: LayerStyle::default(),
            sizing: MarkerSizing::default(),
            globe_radius: 1.0,
            parent,
            root,
            markers: Vec::new(),
            by_feature: HashMap::new(),
            by_entity: HashMap::new(),
        }
    }

    pub fn with_sizing(mut self, sizing: MarkerSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers in snapshot order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn marker(&self, feature_id: &str) -> Option<&Marker> {
        self.by_feature.get(feature_id).map(|&i| &self.markers[i])
    }

    pub fn feature_for_entity(&self, entity: EntityId) -> Option<&str> {
        self.by_entity
            .get(&entity)
            .map(|&i| self.markers[i].feature_id.as_str())
    }

    pub fn set_visible(&mut self, world: &mut World, visible: bool) {
        self.style.visible = visible;
        self.apply_visibility(world);
    }

    fn apply_visibility(&self, world: &mut World) {
        let v = if self.style.visible {
            Visibility::visible()
        } else {
            Visibility::hidden()
        };
        world.set_visibility(self.root, v);
    }

    /// Replaces every marker with one per renderable feature.
    ///
    /// Features without a magnitude, with non-finite coordinates or with an
    /// id already seen in this batch are skipped. A mesh allocation failure
    /// skips that feature only.
    pub fn apply_snapshot(
        &mut self,
        world: &mut World,
        resources: &mut GpuResources,
        registry: &mut MeshRegistry,
        features: &[EarthquakeFeature],
    ) -> ApplyReport {
        let mut report = ApplyReport {
            released: self.clear(world, resources, registry),
            ..ApplyReport::default()
        };
        let shell_radius = self.style.surface_radius(self.globe_radius);

        for feature in features {
            let Some(magnitude) = feature.magnitude else {
                report.skipped_no_magnitude += 1;
                continue;
            };
            let geo = feature.geo_point();
            if !(geo.lat_deg.is_finite() && geo.lon_deg.is_finite() && magnitude.is_finite()) {
                warn!(id = %feature.id, "skipping marker with non-finite values");
                report.skipped_bad_coords += 1;
                continue;
            }
            if !geo.in_range() {
                warn!(
                    id = %feature.id,
                    lat = geo.lat_deg,
                    lon = geo.lon_deg,
                    "coordinates out of range; projecting anyway"
                );
            }
            if self.by_feature.contains_key(&feature.id) {
                warn!(id = %feature.id, "duplicate feature id in snapshot");
                report.skipped_duplicate += 1;
                continue;
            }

            let color = color_for(magnitude);
            let radius = self.sizing.radius_for(magnitude);
            let drawable =
                Drawable3D::sphere(radius, MARKER_SEGMENTS, Material::Basic { color }).pickable();
            let mesh = match resources.acquire_mesh(&drawable) {
                Ok(mesh) => mesh,
                Err(err) => {
                    warn!(id = %feature.id, %err, "marker allocation failed");
                    report.failed += 1;
                    continue;
                }
            };

            let position = geo.project(shell_radius);
            let entity = world.spawn_child(self.root);
            world.set_transform(entity, Transform::translate(position));
            world.set_drawable_3d(entity, drawable);
            registry.register(feature.id.clone(), entity);

            let idx = self.markers.len();
            self.by_feature.insert(feature.id.clone(), idx);
            self.by_entity.insert(entity, idx);
            self.markers.push(Marker {
                feature_id: feature.id.clone(),
                entity,
                magnitude,
                color,
                radius,
                position,
                mesh,
            });
            report.created += 1;
        }

        info!(
            created = report.created,
            released = report.released,
            skipped = report.skipped(),
            "marker snapshot applied"
        );
        report
    }

    /// Removes every marker, returning how many there were.
    pub fn clear(
        &mut self,
        world: &mut World,
        resources: &mut GpuResources,
        registry: &mut MeshRegistry,
    ) -> usize {
        let count = self.markers.len();
        if count == 0 {
            return 0;
        }
        for marker in self.markers.drain(..) {
            resources.release_mesh(marker.mesh);
            registry.unregister(&marker.feature_id);
        }
        self.by_feature.clear();
        self.by_entity.clear();

        world.despawn(self.root);
        self.root = world.spawn_child(self.parent);
        self.apply_visibility(world);
        debug!(count, "released markers");
        count
    }

    pub fn teardown(
        mut self,
        world: &mut World,
        resources: &mut GpuResources,
        registry: &mut MeshRegistry,
    ) {
        self.clear(world, resources, registry);
        world.despawn(self.root);
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn style(&self) -> LayerStyle {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplyReport, MarkerLayer};
    use crate::symbology::MarkerSizing;
    use feed::EarthquakeFeature;
    use foundation::math::sphere::project;
    use pretty_assertions::assert_eq;
    use scene::World;
    use scene::components::Color;
    use scene::registry::MeshRegistry;
    use scene::resources::GpuResources;

    fn quake(id: &str, lat: f64, lon: f64, magnitude: Option<f64>) -> EarthquakeFeature {
        EarthquakeFeature {
            id: id.to_string(),
            longitude: lon,
            latitude: lat,
            depth_km: Some(10.0),
            magnitude,
            place: None,
            time: 0,
            mag_type: None,
            url: None,
            detail: None,
            title: None,
        }
    }

    struct Harness {
        world: World,
        resources: GpuResources,
        registry: MeshRegistry,
        layer: MarkerLayer,
    }

    impl Harness {
        fn new(resources: GpuResources) -> Self {
            let mut world = World::new();
            let globe = world.spawn();
            let layer = MarkerLayer::new(&mut world, globe, 1);
            Self {
                world,
                resources,
                registry: MeshRegistry::new(),
                layer,
            }
        }

        fn apply(&mut self, features: &[EarthquakeFeature]) -> ApplyReport {
            self.layer.apply_snapshot(
                &mut self.world,
                &mut self.resources,
                &mut self.registry,
                features,
            )
        }
    }

    #[test]
    fn null_magnitude_is_not_rendered() {
        let mut h = Harness::new(GpuResources::new());
        let report = h.apply(&[
            quake("a", 10.0, 20.0, Some(1.0)),
            quake("b", -5.0, 140.0, Some(5.0)),
            quake("c", 0.0, 0.0, None),
        ]);
        assert_eq!(report.created, 2);
        assert_eq!(report.skipped_no_magnitude, 1);

        let sizing = MarkerSizing::default();
        let a = h.layer.marker("a").expect("a");
        let b = h.layer.marker("b").expect("b");
        assert_eq!(a.radius, sizing.radius_for(1.0));
        assert_eq!(b.radius, sizing.radius_for(5.0));
        assert_eq!(a.color, Color(0x00ff00));
        assert_eq!(b.color, Color(0xff9900));
        assert!(h.layer.marker("c").is_none());
        assert!((a.position - project(10.0, 20.0, 1.02)).length() < 1e-12);
    }

    #[test]
    fn snapshots_never_leak_markers() {
        let mut h = Harness::new(GpuResources::new());
        h.apply(&[]);
        assert!(h.layer.is_empty());

        h.apply(&[quake("f1", 1.0, 1.0, Some(3.0)), quake("f2", 2.0, 2.0, Some(4.0))]);
        assert_eq!(h.layer.len(), 2);
        let first_entities: Vec<_> = h.layer.markers().map(|m| m.entity).collect();
        assert_eq!(h.registry.lookup("f1"), Some(first_entities[0]));

        let report = h.apply(&[quake("g1", 3.0, 3.0, Some(6.5))]);
        assert_eq!(report.released, 2);
        assert_eq!(h.layer.len(), 1);
        assert!(h.layer.marker("f1").is_none());
        assert!(h.registry.lookup("f2").is_none());
        assert!(first_entities.iter().all(|e| !h.world.is_alive(*e)));
        assert_eq!(h.resources.live(), 2);
        assert_eq!(h.world.drawables_3d().len(), 1);
    }

    #[test]
    fn markers_are_children_of_the_layer_root() {
        let mut h = Harness::new(GpuResources::new());
        h.apply(&[quake("a", 0.0, 0.0, Some(2.0))]);
        let m = h.layer.marker("a").expect("a");
        assert_eq!(h.world.parent(m.entity), Some(h.layer.root()));
        assert_eq!(h.layer.feature_for_entity(m.entity), Some("a"));

        h.layer.set_visible(&mut h.world, false);
        assert!(h.world.drawables_3d().is_empty());
    }

    #[test]
    fn rebuilds_keep_world_size_flat() {
        let mut h = Harness::new(GpuResources::new());
        h.layer.set_visible(&mut h.world, false);
        let batch: Vec<_> = (0..50)
            .map(|i| quake(&format!("q{i}"), i as f64, i as f64, Some(3.0)))
            .collect();
        h.apply(&batch);
        let size = h.world.len();
        let old_root = h.layer.root();

        for _ in 0..5 {
            h.apply(&batch);
            assert_eq!(h.world.len(), size);
        }
        assert!(!h.world.is_alive(old_root));
        let root = h.layer.root();
        assert_eq!(h.world.children(root).len(), 50);
        let m = h.layer.marker("q7").expect("q7");
        assert_eq!(h.world.parent(m.entity), Some(root));
        assert!(h.world.drawables_3d().is_empty());
    }

    #[test]
    fn allocation_failure_skips_only_that_feature() {
        let mut h = Harness::new(GpuResources::with_capacity(4));
        let report = h.apply(&[
            quake("a", 0.0, 0.0, Some(2.0)),
            quake("b", 0.0, 10.0, Some(2.0)),
            quake("c", 0.0, 20.0, Some(2.0)),
        ]);
        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 1);
        assert!(h.layer.marker("c").is_none());
        assert_eq!(h.resources.live(), 4);
    }

    #[test]
    fn duplicates_and_bad_coordinates_are_skipped() {
        let mut h = Harness::new(GpuResources::new());
        let report = h.apply(&[
            quake("a", 0.0, 0.0, Some(2.0)),
            quake("a", 5.0, 5.0, Some(7.0)),
            quake("nan", f64::NAN, 0.0, Some(3.0)),
            quake("far", 120.0, 200.0, Some(3.0)),
        ]);
        assert_eq!(report.skipped_duplicate, 1);
        assert_eq!(report.skipped_bad_coords, 1);
        assert_eq!(report.created, 2);
        assert_eq!(h.layer.marker("a").expect("a").magnitude, 2.0);
        let far = h.layer.marker("far").expect("projected anyway");
        assert!((far.position.length() - 1.02).abs() < 1e-12);
    }

    #[test]
    fn teardown_releases_everything() {
        let mut h = Harness::new(GpuResources::new());
        h.apply(&[quake("a", 0.0, 0.0, Some(2.0)), quake("b", 1.0, 1.0, Some(3.0))]);
        let root = h.layer.root();
        let Harness {
            mut world,
            mut resources,
            mut registry,
            layer,
        } = h;
        layer.teardown(&mut world, &mut resources, &mut registry);
        assert_eq!(resources.live(), 0);
        assert!(registry.is_empty());
        assert!(!world.is_alive(root));
        assert_eq!(world.len(), 1);
    }
}
