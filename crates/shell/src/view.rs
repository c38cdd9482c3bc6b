//! The mounted globe view.
//!
//! `GlobeView` owns everything one open globe needs: the data fetcher, the
//! scene graph with its resource ledger, the feature id registry, the marker
//! set, camera, focus state and the activity log. `unmount` releases all of
//! it; nothing here is process-global.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use compute::QuakeStats;
use feed::{AutoRefresh, DataFetcher, FeedClient, FilterSelection, LoadOutcome, LoadReport, Snapshot};
use foundation::math::Vec3;
use layers::{ApplyReport, Layer, MarkerLayer, MarkerSizing};
use parking_lot::Mutex;
use runtime::event_bus::{EventBus, EventKind};
use runtime::frame::Frame;
use runtime::metrics::{Metrics, names};
use scene::World;
use scene::camera::{Camera, CameraConfig};
use scene::components::TextureSlot;
use scene::composer::{RotationRates, SceneComposer};
use scene::focus::{Focus, FocusConfig, FocusTarget};
use scene::picking::{PickOptions, pick_ray};
use scene::prefabs::GlobeConfig;
use scene::registry::MeshRegistry;
use scene::resources::GpuResources;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ShellError;
use crate::info::InfoPanel;
use crate::intent::{Intent, IntentOutcome};
use crate::options::OptionsPanel;
use crate::status::StatusBanner;

const MARKER_LAYER_ID: u64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub globe: GlobeConfig,
    pub camera: CameraConfig,
    pub focus: FocusConfig,
    pub sizing: MarkerSizing,
    /// Extra pick radius so the smallest markers stay clickable.
    pub pick_slop: f64,
    /// Caps live graphics resources; `None` is unbounded.
    pub resource_capacity: Option<usize>,
    /// URL prefix the Earth textures are served from.
    pub texture_root: String,
    pub rates: RotationRates,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            globe: GlobeConfig::default(),
            camera: CameraConfig::default(),
            focus: FocusConfig::default(),
            sizing: MarkerSizing::default(),
            pick_slop: 0.01,
            resource_capacity: None,
            texture_root: "/textures".to_string(),
            rates: RotationRates::default(),
        }
    }
}

#[derive(Debug)]
struct SceneState {
    world: World,
    resources: GpuResources,
    registry: MeshRegistry,
    composer: SceneComposer,
    markers: MarkerLayer,
    focus: Focus,
    camera: Camera,
    frame: Frame,
    applied_revision: u64,
}

#[derive(Debug, Default)]
struct Telemetry {
    events: EventBus,
    metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerView {
    pub id: String,
    /// World-space center this frame.
    pub position: [f64; 3],
    pub radius: f64,
    pub color: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraView {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub fov_y_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRotation {
    pub globe: [f64; 3],
    pub clouds: f64,
    pub stars: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesView {
    pub earth: f64,
    pub clouds: f64,
    pub stars: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerView {
    pub id: u64,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureView {
    pub slot: &'static str,
    pub url: String,
}

/// Everything a renderer needs to draw the current frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneView {
    pub frame: u64,
    pub camera: CameraView,
    pub rotation: LayerRotation,
    pub rates: RatesView,
    pub sun_direction: Option<[f64; 3]>,
    pub textures: Vec<TextureView>,
    pub marker_layer: LayerView,
    pub markers: Vec<MarkerView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub frame: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsView {
    pub counters: BTreeMap<&'static str, u64>,
    pub gauges: BTreeMap<&'static str, i64>,
    /// Mean of each histogram.
    pub means: BTreeMap<&'static str, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmountReport {
    pub markers_released: usize,
    /// Resources still live after teardown. Anything but zero is a leak.
    pub resources_live: usize,
}

pub struct GlobeView<C> {
    fetcher: DataFetcher<C>,
    config: ViewConfig,
    scene: Mutex<Option<SceneState>>,
    telemetry: Mutex<Telemetry>,
    auto_refresh: Mutex<Option<AutoRefresh>>,
}

impl<C: FeedClient> GlobeView<C> {
    /// Builds the scene. No request is issued until `load` or `refresh`.
    pub fn mount(client: C, filter: FilterSelection, config: ViewConfig) -> Result<Self, ShellError> {
        let mut world = World::new();
        let mut resources = match config.resource_capacity {
            Some(capacity) => GpuResources::with_capacity(capacity),
            None => GpuResources::new(),
        };
        let composer =
            SceneComposer::compose(&mut world, &mut resources, &config.globe, config.rates)?;
        let markers = MarkerLayer::new(&mut world, composer.marker_parent(), MARKER_LAYER_ID)
            .with_sizing(config.sizing);

        let scene = SceneState {
            world,
            resources,
            registry: MeshRegistry::new(),
            composer,
            markers,
            focus: Focus::new(config.focus),
            camera: Camera::new(config.camera),
            frame: Frame::first(0.0),
            applied_revision: 0,
        };
        info!(filter = %filter.feed_path(), "globe view mounted");
        Ok(Self {
            fetcher: DataFetcher::new(client, filter),
            config,
            scene: Mutex::new(Some(scene)),
            telemetry: Mutex::new(Telemetry::default()),
            auto_refresh: Mutex::new(None),
        })
    }

    pub fn fetcher(&self) -> &DataFetcher<C> {
        &self.fetcher
    }

    pub fn snapshot(&self) -> Snapshot {
        self.fetcher.snapshot()
    }

    pub fn filter(&self) -> FilterSelection {
        self.fetcher.filter()
    }

    pub fn is_mounted(&self) -> bool {
        self.scene.lock().is_some()
    }

    pub async fn load(&self, filter: FilterSelection) -> LoadReport {
        self.emit(EventKind::FetchStarted, filter.feed_path());
        let report = self.fetcher.load(filter).await;
        self.record_load(&report);
        if let Err(err) = self.sync_snapshot() {
            debug!(%err, "snapshot not applied");
        }
        report
    }

    pub async fn refresh(&self) -> LoadReport {
        let filter = self.filter();
        self.load(filter).await
    }

    pub async fn dispatch(&self, intent: Intent) -> Result<IntentOutcome, ShellError> {
        let filter = self.filter();
        let report = match intent {
            Intent::SetTimeRange { range } => {
                self.load(FilterSelection {
                    time_range: range,
                    ..filter
                })
                .await
            }
            Intent::SetMagnitudeThreshold { threshold } => {
                self.load(FilterSelection {
                    magnitude_threshold: threshold,
                    ..filter
                })
                .await
            }
            Intent::Refresh => self.refresh().await,
            Intent::Select { id } => {
                let target = self.select(&id)?;
                return Ok(IntentOutcome::Focused {
                    id,
                    camera_position: target.camera_position.as_array(),
                });
            }
            Intent::Orbit { yaw, pitch } => {
                let position = self.orbit_camera(yaw, pitch)?;
                return Ok(IntentOutcome::Camera {
                    position: position.as_array(),
                });
            }
            Intent::Zoom { factor } => {
                let position = self.zoom_camera(factor)?;
                return Ok(IntentOutcome::Camera {
                    position: position.as_array(),
                });
            }
            Intent::SetRotationRates {
                earth,
                clouds,
                stars,
            } => {
                self.set_rotation_rates(RotationRates {
                    earth,
                    clouds,
                    stars,
                })?;
                return Ok(IntentOutcome::Applied);
            }
            Intent::SetSunDirection { direction: [x, y, z] } => {
                self.set_sun_direction(Vec3::new(x, y, z))?;
                return Ok(IntentOutcome::Applied);
            }
            Intent::SetMarkersVisible { visible } => {
                self.set_markers_visible(visible)?;
                return Ok(IntentOutcome::Applied);
            }
        };
        Ok(IntentOutcome::Loaded {
            result: report.outcome,
        })
    }

    /// Rebuilds the markers if the fetcher holds a newer snapshot than the
    /// one on screen.
    ///
    /// The snapshot is read under the scene lock, so concurrent callers
    /// apply revisions in order and an older one never replaces a newer one.
    pub fn sync_snapshot(&self) -> Result<Option<ApplyReport>, ShellError> {
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        let snapshot = self.fetcher.snapshot();
        let Some(report) = apply_if_newer(scene, &snapshot) else {
            return Ok(None);
        };
        let frame = scene.frame;
        let live_resources = scene.resources.live();
        let live_markers = scene.markers.len();
        drop(guard);

        let mut t = self.telemetry.lock();
        t.metrics.inc_counter(names::MARKERS_CREATED, report.created as u64);
        t.metrics.inc_counter(names::MARKERS_SKIPPED, report.skipped() as u64);
        t.metrics.set_gauge(names::MARKERS_LIVE, live_markers as i64);
        t.metrics.set_gauge(names::RESOURCES_LIVE, live_resources as i64);
        t.events.emit(
            frame,
            EventKind::SnapshotApplied,
            format!(
                "revision {}: {} markers, {} skipped",
                snapshot.revision,
                report.created,
                report.skipped()
            ),
        );
        Ok(Some(report))
    }

    /// Advances the animation by one display frame.
    pub fn tick(&self, dt_s: f64) -> Result<Frame, ShellError> {
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        scene.frame = scene.frame.next(dt_s);
        scene.composer.advance(&mut scene.world);
        scene.focus.tick(&mut scene.world, scene.frame);
        let frame = scene.frame;
        drop(guard);

        self.telemetry.lock().metrics.inc_counter(names::FRAMES, 1);
        Ok(frame)
    }

    pub fn set_viewport(&self, width: f64, height: f64) -> Result<(), ShellError> {
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        scene.camera.set_aspect(width, height);
        Ok(())
    }

    /// Swings the camera around its target. Returns the new position.
    pub fn orbit_camera(&self, yaw: f64, pitch: f64) -> Result<Vec3, ShellError> {
        if !(yaw.is_finite() && pitch.is_finite()) {
            return Err(ShellError::InvalidInput("orbit angles must be finite".into()));
        }
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        scene.camera.orbit(yaw, pitch);
        Ok(scene.camera.position)
    }

    /// Scales the camera distance, clamped to the configured range.
    pub fn zoom_camera(&self, factor: f64) -> Result<Vec3, ShellError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ShellError::InvalidInput("zoom factor must be positive".into()));
        }
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        scene.camera.zoom(factor);
        Ok(scene.camera.position)
    }

    pub fn set_rotation_rates(&self, rates: RotationRates) -> Result<(), ShellError> {
        if ![rates.earth, rates.clouds, rates.stars].iter().all(|r| r.is_finite()) {
            return Err(ShellError::InvalidInput("rotation rates must be finite".into()));
        }
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        scene.composer.set_rates(rates);
        debug!(
            earth = rates.earth,
            clouds = rates.clouds,
            stars = rates.stars,
            "rotation rates set"
        );
        Ok(())
    }

    pub fn set_sun_direction(&self, direction: Vec3) -> Result<(), ShellError> {
        let finite = direction.as_array().iter().all(|c| c.is_finite());
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        if !(finite && scene.composer.set_sun_direction(&mut scene.world, direction)) {
            return Err(ShellError::InvalidInput(
                "sun direction must be a finite non-zero vector".into(),
            ));
        }
        Ok(())
    }

    pub fn set_markers_visible(&self, visible: bool) -> Result<(), ShellError> {
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        scene.markers.set_visible(&mut scene.world, visible);
        Ok(())
    }

    /// Flies the camera to a feature's marker and highlights it.
    pub fn select(&self, id: &str) -> Result<FocusTarget, ShellError> {
        let mut guard = self.scene.lock();
        let scene = guard.as_mut().ok_or(ShellError::Unmounted)?;
        let Some(entity) = scene.registry.lookup(id) else {
            drop(guard);
            return Err(if self.fetcher.snapshot().feature(id).is_some() {
                ShellError::NotRendered(id.to_string())
            } else {
                ShellError::UnknownFeature(id.to_string())
            });
        };
        let now = scene.frame.time;
        let target = scene
            .focus
            .focus_on(&mut scene.world, &mut scene.camera, entity, now)
            .ok_or_else(|| ShellError::UnknownFeature(id.to_string()))?;
        let frame = scene.frame;
        drop(guard);

        self.emit_at(frame, EventKind::FeatureFocused, id);
        Ok(target)
    }

    /// Feature under normalized device coordinates, if any.
    pub fn pick(&self, ndc_x: f64, ndc_y: f64) -> Result<Option<String>, ShellError> {
        let guard = self.scene.lock();
        let scene = guard.as_ref().ok_or(ShellError::Unmounted)?;
        let Some(ray) = scene.camera.ray_from_ndc(ndc_x, ndc_y) else {
            return Ok(None);
        };
        let opts = PickOptions {
            slop: self.config.pick_slop,
            ..PickOptions::default()
        };
        Ok(pick_ray(&scene.world, ray, opts)
            .and_then(|hit| scene.markers.feature_for_entity(hit.entity))
            .map(str::to_owned))
    }

    pub fn status(&self) -> StatusBanner {
        StatusBanner::from_snapshot(&self.fetcher.snapshot())
    }

    pub fn options_panel(&self, now: DateTime<Utc>) -> OptionsPanel {
        OptionsPanel::build(&self.fetcher.snapshot(), self.filter(), now)
    }

    pub fn info_panel(&self, now: DateTime<Utc>) -> InfoPanel {
        InfoPanel::build(&self.fetcher.snapshot(), now)
    }

    pub fn stats(&self) -> QuakeStats {
        QuakeStats::from_features(&self.fetcher.snapshot().features)
    }

    pub fn scene_view(&self) -> Result<SceneView, ShellError> {
        let guard = self.scene.lock();
        let scene = guard.as_ref().ok_or(ShellError::Unmounted)?;
        let world = &scene.world;
        let layers = scene.composer.layers();
        let rotation_of = |e| world.transform(e).map(|t| t.rotation).unwrap_or_default();

        let rates = scene.composer.rates();
        let highlighted = scene.focus.highlighted();
        let markers = scene
            .markers
            .markers()
            .filter_map(|m| {
                let position = world.world_position(m.entity)?;
                let scale = world.world_scale(m.entity)?;
                let color = world.drawable_3d(m.entity)?.material.color()?;
                Some(MarkerView {
                    id: m.feature_id.clone(),
                    position: position.as_array(),
                    radius: m.radius * scale,
                    color: color.to_hex(),
                    highlighted: highlighted == Some(m.entity),
                })
            })
            .collect();

        let root = self.config.texture_root.trim_end_matches('/');
        let textures = TextureSlot::ALL
            .into_iter()
            .map(|slot| TextureView {
                slot: slot.file_name(),
                url: format!("{root}/{}", slot.file_name()),
            })
            .collect();

        Ok(SceneView {
            frame: scene.frame.index,
            camera: CameraView {
                position: scene.camera.position.as_array(),
                target: scene.camera.target.as_array(),
                fov_y_deg: scene.camera.fov_y_deg,
            },
            rotation: LayerRotation {
                globe: rotation_of(layers.group).as_array(),
                clouds: rotation_of(layers.clouds).y,
                stars: rotation_of(layers.stars).y,
            },
            rates: RatesView {
                earth: rates.earth,
                clouds: rates.clouds,
                stars: rates.stars,
            },
            sun_direction: scene
                .composer
                .sun_direction(world)
                .map(|d| d.as_array()),
            textures,
            marker_layer: LayerView {
                id: scene.markers.id().0,
                visible: scene.markers.style().visible,
            },
            markers,
        })
    }

    pub fn events(&self) -> Vec<EventView> {
        self.telemetry
            .lock()
            .events
            .events()
            .map(|e| EventView {
                frame: e.frame_index,
                kind: e.kind.as_str(),
                message: e.message.clone(),
            })
            .collect()
    }

    pub fn metrics(&self) -> MetricsView {
        let snap = self.telemetry.lock().metrics.snapshot();
        MetricsView {
            counters: snap.counters.into_iter().collect(),
            gauges: snap.gauges.into_iter().collect(),
            means: snap
                .histograms
                .into_iter()
                .filter_map(|(name, h)| Some((name, h.mean()?)))
                .collect(),
        }
    }

    /// Releases every marker and layer, clears the registry and stops the
    /// refresh timer. Safe to call twice.
    pub fn unmount(&self) -> Option<UnmountReport> {
        drop(self.auto_refresh.lock().take());
        let mut scene = self.scene.lock().take()?;

        scene.focus.restore(&mut scene.world);
        let markers_released = scene.markers.len();
        scene
            .markers
            .teardown(&mut scene.world, &mut scene.resources, &mut scene.registry);
        scene.composer.teardown(&mut scene.world, &mut scene.resources);
        scene.registry.clear();

        let report = UnmountReport {
            markers_released,
            resources_live: scene.resources.live(),
        };
        if report.resources_live > 0 {
            warn!(live = report.resources_live, "resources still live after unmount");
        }
        self.emit_at(scene.frame, EventKind::Unmounted, "globe view unmounted");
        info!(markers = markers_released, "globe view unmounted");
        Some(report)
    }

    fn record_load(&self, report: &LoadReport) {
        let frame = self.current_frame();
        let mut t = self.telemetry.lock();
        t.metrics
            .record_histogram(names::FETCH_LATENCY_MS, report.elapsed.as_millis() as i64);
        let (name, kind, message) = match &report.outcome {
            LoadOutcome::Replaced { features, rejected } => (
                names::FETCH_OK,
                None,
                format!("{features} features, {rejected} rejected"),
            ),
            LoadOutcome::Failed { message } => {
                (names::FETCH_FAILED, Some(EventKind::FetchFailed), message.clone())
            }
            LoadOutcome::Superseded => (
                names::FETCH_SUPERSEDED,
                Some(EventKind::FetchSuperseded),
                format!("request {} superseded", report.token.0),
            ),
        };
        t.metrics.inc_counter(name, 1);
        match kind {
            Some(kind) => t.events.emit(frame, kind, message),
            None => debug!(%message, "load recorded"),
        }
    }

    fn current_frame(&self) -> Frame {
        self.scene
            .lock()
            .as_ref()
            .map(|s| s.frame)
            .unwrap_or_else(|| Frame::first(0.0))
    }

    fn emit(&self, kind: EventKind, message: impl Into<String>) {
        let frame = self.current_frame();
        self.emit_at(frame, kind, message);
    }

    fn emit_at(&self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.telemetry.lock().events.emit(frame, kind, message);
    }
}

/// Rebuilds the markers from `snapshot` unless the scene already shows that
/// revision or a later one.
fn apply_if_newer(scene: &mut SceneState, snapshot: &Snapshot) -> Option<ApplyReport> {
    if snapshot.revision <= scene.applied_revision {
        return None;
    }
    scene.focus.restore(&mut scene.world);
    let report = scene.markers.apply_snapshot(
        &mut scene.world,
        &mut scene.resources,
        &mut scene.registry,
        &snapshot.features,
    );
    scene.applied_revision = snapshot.revision;
    Some(report)
}

impl<C: FeedClient + 'static> GlobeView<C> {
    /// Starts the periodic refresh. The previous timer, if any, is cancelled.
    ///
    /// The timer drives the fetcher only; markers catch up through
    /// [`GlobeView::sync_snapshot`], which the host calls when the fetcher
    /// publishes.
    pub fn start_auto_refresh(&self, interval: Duration) {
        let handle = self.fetcher.spawn_auto_refresh(interval);
        *self.auto_refresh.lock() = Some(handle);
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.auto_refresh
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}
