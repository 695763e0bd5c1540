use std::collections::BTreeMap;

use log::debug;

use crate::{BodyTag, Entity, EntityDesc, EntityId, PhysicsWorld, SimError, SimResult, TickHook};

/// Owner of every live [`Entity`].
///
/// Iteration is in ascending id order, which is also spawn order, so anything driven off the
/// registry (drawing, teardown) is deterministic.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entity's body in `world` and take ownership of it.
    pub fn spawn<H: TickHook>(&mut self, world: &mut PhysicsWorld<H>, desc: EntityDesc) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;

        let entity = Entity::spawn(world, id, desc);
        debug!("spawned entity {} '{}' ({:?})", id, entity.name(), entity.kind());
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity, detaching and releasing its body.
    pub fn despawn<H: TickHook>(&mut self, world: &mut PhysicsWorld<H>, id: EntityId) -> SimResult<()> {
        let entity = self.entities.remove(&id).ok_or(SimError::UnknownEntity(id))?;
        world.remove_body(entity.body());
        debug!("despawned entity {} '{}'", id, entity.name());
        Ok(())
    }

    /// Remove every entity, newest first.
    pub fn clear<H: TickHook>(&mut self, world: &mut PhysicsWorld<H>) {
        while let Some((_, entity)) = self.entities.pop_last() {
            world.remove_body(entity.body());
        }
    }

    pub fn get(&self, id: EntityId) -> SimResult<&Entity> {
        self.entities.get(&id).ok_or(SimError::UnknownEntity(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Look up the entity a body tag points at.
    ///
    /// `None` if the entity is gone or its kind disagrees with the tag.
    pub fn resolve(&self, tag: BodyTag) -> Option<&Entity> {
        self.entities
            .get(&tag.entity)
            .filter(|entity| entity.kind() == tag.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nalgebra::{Point3, Vector3};

    use super::*;
    use crate::{BodyKind, MeshKind, SpawnTransform};

    fn world() -> PhysicsWorld<()> {
        PhysicsWorld::initialize(Vector3::zeros(), Duration::from_millis(16), ())
    }

    fn desc(kind: BodyKind, mesh: MeshKind, y: f32) -> EntityDesc {
        EntityDesc::new(
            format!("{kind:?}"),
            kind,
            mesh,
            0.0,
            [1.0; 4],
            SpawnTransform::at(Point3::new(0.0, y, 0.0)),
        )
    }

    #[test]
    fn ids_are_sequential_and_iteration_is_ordered() {
        let mut w = world();
        let mut reg = EntityRegistry::new();

        let a = reg.spawn(&mut w, desc(BodyKind::Ground, MeshKind::Plane, 0.0));
        let b = reg.spawn(&mut w, desc(BodyKind::Box, MeshKind::Box, 2.0));
        let c = reg.spawn(&mut w, desc(BodyKind::Sphere, MeshKind::Sphere, 4.0));

        assert_eq!((a, b, c), (0, 1, 2));
        let ids: Vec<_> = reg.iter().map(Entity::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(w.body_count(), 3);
    }

    #[test]
    fn despawn_detaches_body_and_tag_no_longer_resolves() {
        let mut w = world();
        let mut reg = EntityRegistry::new();

        reg.spawn(&mut w, desc(BodyKind::Ground, MeshKind::Plane, 0.0));
        let boxed = reg.spawn(&mut w, desc(BodyKind::Box, MeshKind::Box, 2.0));
        w.step(&mut ());

        let tag = reg.get(boxed).expect("live").tag();
        let hit = w
            .ray_test(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -50.0, 0.0), None)
            .expect("hit");
        assert_eq!(hit.tag, tag);
        assert!(reg.resolve(hit.tag).is_some());

        reg.despawn(&mut w, boxed).expect("despawn");
        w.step(&mut ());

        assert_eq!(w.body_count(), 1);
        assert!(reg.resolve(tag).is_none());
        let hit = w
            .ray_test(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -50.0, 0.0), None)
            .expect("ground hit");
        assert_ne!(hit.tag, tag);
        assert_eq!(hit.tag.kind, BodyKind::Ground);
    }

    #[test]
    fn despawn_twice_is_an_error() {
        let mut w = world();
        let mut reg = EntityRegistry::new();
        let id = reg.spawn(&mut w, desc(BodyKind::Box, MeshKind::Box, 2.0));

        assert!(reg.despawn(&mut w, id).is_ok());
        assert_eq!(reg.despawn(&mut w, id), Err(SimError::UnknownEntity(id)));
    }

    #[test]
    fn resolve_rejects_kind_mismatch() {
        let mut w = world();
        let mut reg = EntityRegistry::new();
        let id = reg.spawn(&mut w, desc(BodyKind::Box, MeshKind::Box, 2.0));

        assert!(reg.resolve(BodyTag::new(BodyKind::Box, id)).is_some());
        assert!(reg.resolve(BodyTag::new(BodyKind::Player, id)).is_none());
    }

    #[test]
    fn clear_empties_world_so_it_can_shut_down() {
        let mut w = world();
        let mut reg = EntityRegistry::new();
        reg.spawn(&mut w, desc(BodyKind::Ground, MeshKind::Plane, 0.0));
        reg.spawn(&mut w, desc(BodyKind::Box, MeshKind::Box, 2.0));

        reg.clear(&mut w);
        assert!(reg.is_empty());
        assert!(w.shutdown().is_ok());
    }
}
