use crate::components::{Drawable3D, Transform, Visibility};
use crate::entity::EntityId;
use foundation::handles::Handle;
use foundation::math::Vec3;

/// Scene graph storage.
///
/// Entities live in generational slots: despawning bumps the slot generation so
/// stale `EntityId`s stop resolving. Components are parallel `Vec<Option<_>>`
/// columns indexed by slot. Each slot also keeps its child list, so despawning
/// a subtree costs the size of the subtree, not the size of the world.
#[derive(Debug, Default)]
pub struct World {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    parents: Vec<Option<EntityId>>,
    children: Vec<Vec<EntityId>>,
    transforms: Vec<Option<Transform>>,
    visibility: Vec<Option<Visibility>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    live: usize,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = match self.free.pop() {
            Some(idx) => EntityId(Handle::new(idx, self.generations[idx as usize])),
            None => {
                let idx = self.generations.len() as u32;
                self.ensure_capacity(idx as usize);
                EntityId(Handle::new(idx, 0))
            }
        };
        let idx = id.index() as usize;
        self.alive[idx] = true;
        self.transforms[idx] = Some(Transform::identity());
        self.live += 1;
        id
    }

    /// Spawns an entity whose transform is relative to `parent`.
    pub fn spawn_child(&mut self, parent: EntityId) -> EntityId {
        let child = self.spawn();
        if let Some(p) = self.slot(parent) {
            self.parents[child.index() as usize] = Some(parent);
            self.children[p].push(child);
        }
        child
    }

    /// Removes `entity` and, recursively, its children.
    ///
    /// Returns `false` if the id was already stale.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        let Some(idx) = self.slot(entity) else {
            return false;
        };
        if let Some(p) = self.parents[idx].and_then(|p| self.slot(p)) {
            let siblings = &mut self.children[p];
            if let Some(pos) = siblings.iter().position(|c| *c == entity) {
                siblings.swap_remove(pos);
            }
        }
        self.despawn_subtree(entity);
        true
    }

    /// Frees `entity` and its descendants without touching the parent's
    /// child list.
    fn despawn_subtree(&mut self, entity: EntityId) {
        let idx = entity.index() as usize;
        for child in std::mem::take(&mut self.children[idx]) {
            self.despawn_subtree(child);
        }

        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.parents[idx] = None;
        self.transforms[idx] = None;
        self.visibility[idx] = None;
        self.drawables_3d[idx] = None;
        self.free.push(entity.index());
        self.live -= 1;
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        let idx = entity.index() as usize;
        self.alive.get(idx).copied().unwrap_or(false)
            && self.generations[idx] == entity.generation()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.slot(entity).and_then(|idx| self.parents[idx])
    }

    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        match self.slot(entity) {
            Some(idx) => &self.children[idx],
            None => &[],
        }
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        if let Some(idx) = self.slot(entity) {
            self.transforms[idx] = Some(transform);
        }
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.slot(entity).and_then(|idx| self.transforms[idx])
    }

    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        let idx = self.slot(entity)?;
        self.transforms[idx].as_mut()
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) {
        if let Some(idx) = self.slot(entity) {
            self.visibility[idx] = Some(visibility);
        }
    }

    /// Visible unless the entity or any ancestor is explicitly hidden.
    pub fn is_visible(&self, entity: EntityId) -> bool {
        let mut cur = Some(entity);
        while let Some(e) = cur {
            let Some(idx) = self.slot(e) else {
                return false;
            };
            if let Some(v) = self.visibility[idx] {
                if !v.visible {
                    return false;
                }
            }
            cur = self.parents[idx];
        }
        true
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        if let Some(idx) = self.slot(entity) {
            self.drawables_3d[idx] = Some(drawable);
        }
    }

    pub fn drawable_3d(&self, entity: EntityId) -> Option<Drawable3D> {
        self.slot(entity).and_then(|idx| self.drawables_3d[idx])
    }

    pub fn drawable_3d_mut(&mut self, entity: EntityId) -> Option<&mut Drawable3D> {
        let idx = self.slot(entity)?;
        self.drawables_3d[idx].as_mut()
    }

    /// Maps a point in `entity`'s local space to world space by walking the
    /// parent chain.
    pub fn local_to_world(&self, entity: EntityId, point: Vec3) -> Option<Vec3> {
        let mut p = point;
        let mut cur = Some(entity);
        while let Some(e) = cur {
            let idx = self.slot(e)?;
            if let Some(t) = self.transforms[idx] {
                p = t.apply(p);
            }
            cur = self.parents[idx];
        }
        Some(p)
    }

    pub fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        self.local_to_world(entity, Vec3::ZERO)
    }

    /// Product of uniform scales along the parent chain.
    pub fn world_scale(&self, entity: EntityId) -> Option<f64> {
        let mut s = 1.0;
        let mut cur = Some(entity);
        while let Some(e) = cur {
            let idx = self.slot(e)?;
            if let Some(t) = self.transforms[idx] {
                s *= t.scale;
            }
            cur = self.parents[idx];
        }
        Some(s)
    }

    /// Visible drawables in slot order.
    pub fn drawables_3d(&self) -> Vec<(EntityId, Transform, Drawable3D)> {
        let mut out = Vec::new();
        for (idx, drawable) in self.drawables_3d.iter().enumerate() {
            let Some(drawable) = drawable else { continue };
            let Some(transform) = self.transforms[idx] else {
                continue;
            };
            let entity = EntityId(Handle::new(idx as u32, self.generations[idx]));
            if !self.is_visible(entity) {
                continue;
            }
            out.push((entity, transform, *drawable));
        }
        out
    }

    fn slot(&self, entity: EntityId) -> Option<usize> {
        self.is_alive(entity).then_some(entity.index() as usize)
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.generations.len() <= idx {
            let new_len = idx + 1;
            self.generations.resize(new_len, 0);
            self.alive.resize(new_len, false);
            self.parents.resize(new_len, None);
            self.children.resize_with(new_len, Vec::new);
            self.transforms.resize(new_len, None);
            self.visibility.resize(new_len, None);
            self.drawables_3d.resize(new_len, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{Color, Drawable3D, Material, Transform, Visibility};
    use foundation::math::Vec3;

    fn dot() -> Drawable3D {
        Drawable3D::sphere(0.1, 8, Material::Basic { color: Color::WHITE })
    }

    #[test]
    fn spawn_and_collect_drawables() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_drawable_3d(entity, dot());

        let drawables = world.drawables_3d();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].0, entity);
    }

    #[test]
    fn despawn_invalidates_stale_ids_and_reuses_slots() {
        let mut world = World::new();
        let a = world.spawn();
        world.set_drawable_3d(a, dot());
        assert!(world.despawn(a));
        assert!(!world.despawn(a));
        assert!(!world.is_alive(a));
        assert!(world.drawable_3d(a).is_none());

        let b = world.spawn();
        assert_eq!(b.index(), a.index());
        assert_ne!(a, b);
        assert!(world.drawable_3d(b).is_none());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn despawn_removes_children() {
        let mut world = World::new();
        let group = world.spawn();
        let child = world.spawn_child(group);
        world.despawn(group);
        assert!(!world.is_alive(child));
        assert!(world.is_empty());
    }

    #[test]
    fn child_lists_follow_spawn_and_despawn() {
        let mut world = World::new();
        let root = world.spawn();
        let kids: Vec<_> = (0..4).map(|_| world.spawn_child(root)).collect();
        let grandchild = world.spawn_child(kids[1]);
        assert_eq!(world.children(root).len(), 4);

        assert!(world.despawn(kids[1]));
        assert!(!world.is_alive(grandchild));
        assert_eq!(world.children(root).len(), 3);
        assert!(!world.children(root).contains(&kids[1]));

        let reused = world.spawn();
        assert!(world.children(reused).is_empty());
        assert_eq!(world.parent(reused), None);

        world.despawn(root);
        assert_eq!(world.len(), 1);
        assert!(world.children(root).is_empty());
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut world = World::new();
        let group = world.spawn();
        let child = world.spawn_child(group);
        world.set_drawable_3d(child, dot());
        world.set_visibility(group, Visibility::hidden());
        assert!(world.drawables_3d().is_empty());
        world.set_visibility(group, Visibility::visible());
        assert_eq!(world.drawables_3d().len(), 1);
    }

    #[test]
    fn world_position_composes_parent_rotation() {
        let mut world = World::new();
        let group = world.spawn();
        world.set_transform(
            group,
            Transform::identity().with_rotation(Vec3::new(0.0, std::f64::consts::PI, 0.0)),
        );
        let child = world.spawn_child(group);
        world.set_transform(child, Transform::translate(Vec3::new(1.0, 0.0, 0.0)));

        let p = world.world_position(child).expect("alive");
        assert!((p - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-12);
    }
}
