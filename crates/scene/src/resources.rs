//! Graphics-resource ledger.
//!
//! Every geometry/material buffer a mesh needs is acquired here and must be
//! handed back through [`GpuResources::release_mesh`]. `MeshResources` is
//! neither `Clone` nor `Copy`, so a bundle can only be released once; the
//! ledger's live count is how leaks are detected.

use foundation::handles::Handle;
use tracing::warn;

use crate::components::{Drawable3D, Material, Shape3D};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Geometry,
    Material,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Geometry => f.write_str("geometry"),
            ResourceKind::Material => f.write_str("material"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("{kind} allocation failed: {capacity} resources already live")]
    Exhausted { kind: ResourceKind, capacity: usize },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GeometryHandle(Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialHandle(Handle);

/// The buffers backing one mesh. Consumed by [`GpuResources::release_mesh`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "mesh resources leak unless released"]
pub struct MeshResources {
    geometry: GeometryHandle,
    material: MaterialHandle,
}

impl MeshResources {
    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Geometry(Shape3D),
    Material(Material),
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    payload: Option<Payload>,
}

#[derive(Debug, Default)]
pub struct GpuResources {
    capacity: Option<usize>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live_geometries: usize,
    live_materials: usize,
    released: u64,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that refuses allocations once `capacity` resources are live.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn live(&self) -> usize {
        self.live_geometries + self.live_materials
    }

    /// Total number of successful releases since creation.
    pub fn released(&self) -> u64 {
        self.released
    }

    /// Acquires geometry and material for `drawable`.
    ///
    /// All-or-nothing: if the material cannot be allocated the geometry is
    /// returned to the ledger before the error propagates.
    pub fn acquire_mesh(&mut self, drawable: &Drawable3D) -> Result<MeshResources, ResourceError> {
        let geometry = GeometryHandle(self.alloc(
            ResourceKind::Geometry,
            Payload::Geometry(drawable.shape),
        )?);
        let material = match self.alloc(
            ResourceKind::Material,
            Payload::Material(drawable.material),
        ) {
            Ok(h) => MaterialHandle(h),
            Err(err) => {
                self.free_slot(geometry.0);
                return Err(err);
            }
        };
        Ok(MeshResources { geometry, material })
    }

    pub fn release_mesh(&mut self, mesh: MeshResources) {
        let MeshResources { geometry, material } = mesh;
        if !self.free_slot(geometry.0) {
            warn!("geometry {:?} was already released", geometry);
        }
        if !self.free_slot(material.0) {
            warn!("material {:?} was already released", material);
        }
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<Shape3D> {
        match self.payload(handle.0)? {
            Payload::Geometry(shape) => Some(*shape),
            Payload::Material(_) => None,
        }
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<Material> {
        match self.payload(handle.0)? {
            Payload::Material(material) => Some(*material),
            Payload::Geometry(_) => None,
        }
    }

    fn payload(&self, handle: Handle) -> Option<&Payload> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.payload.as_ref()
    }

    fn alloc(&mut self, kind: ResourceKind, payload: Payload) -> Result<Handle, ResourceError> {
        if let Some(capacity) = self.capacity {
            if self.live() >= capacity {
                return Err(ResourceError::Exhausted { kind, capacity });
            }
        }

        let handle = match self.free.pop() {
            Some(idx) => Handle::new(idx, self.slots[idx as usize].generation),
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    payload: None,
                });
                Handle::new(self.slots.len() as u32 - 1, 0)
            }
        };
        self.slots[handle.index() as usize].payload = Some(payload);
        match kind {
            ResourceKind::Geometry => self.live_geometries += 1,
            ResourceKind::Material => self.live_materials += 1,
        }
        Ok(handle)
    }

    fn free_slot(&mut self, handle: Handle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index() as usize) else {
            return false;
        };
        if slot.generation != handle.generation() {
            return false;
        }
        let Some(payload) = slot.payload.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);
        match payload {
            Payload::Geometry(_) => self.live_geometries -= 1,
            Payload::Material(_) => self.live_materials -= 1,
        }
        self.free.push(handle.index());
        self.released += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{GpuResources, ResourceError, ResourceKind};
    use crate::components::{Color, Drawable3D, Material};

    fn marker() -> Drawable3D {
        Drawable3D::sphere(0.02, 8, Material::Basic { color: Color(0x00ff00) })
    }

    #[test]
    fn acquire_and_release_balance() {
        let mut res = GpuResources::new();
        let a = res.acquire_mesh(&marker()).expect("a");
        let b = res.acquire_mesh(&marker()).expect("b");
        assert_eq!(res.live(), 4);

        assert_eq!(
            res.material(a.material()),
            Some(Material::Basic { color: Color(0x00ff00) })
        );

        res.release_mesh(a);
        res.release_mesh(b);
        assert_eq!(res.live(), 0);
        assert_eq!(res.released(), 4);
    }

    #[test]
    fn stale_handles_stop_resolving() {
        let mut res = GpuResources::new();
        let a = res.acquire_mesh(&marker()).expect("a");
        let geometry = a.geometry();
        res.release_mesh(a);
        assert!(res.geometry(geometry).is_none());

        let b = res.acquire_mesh(&marker()).expect("b");
        assert_ne!(b.geometry(), geometry);
        res.release_mesh(b);
    }

    #[test]
    fn exhausted_ledger_rolls_back_partial_mesh() {
        let mut res = GpuResources::with_capacity(3);
        let a = res.acquire_mesh(&marker()).expect("a");
        let err = res.acquire_mesh(&marker()).unwrap_err();
        assert_eq!(
            err,
            ResourceError::Exhausted {
                kind: ResourceKind::Material,
                capacity: 3
            }
        );
        assert_eq!(res.live(), 2);
        res.release_mesh(a);
        assert_eq!(res.live(), 0);
    }
}
