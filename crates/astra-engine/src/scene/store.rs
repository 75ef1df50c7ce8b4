use super::entity::Entity;

/// Stable identifier of an entity inside its [`Scene`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(usize);

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Entity store with insertion-ordered, deterministic queries.
///
/// Entities live for the scene's lifetime; there is no removal, so ids stay
/// valid and query order never shifts under a running frame. Queries are
/// linear scans; scene sizes here are hundreds of entities, and the stable
/// order is what makes batched draw order reproducible.
#[derive(Default)]
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(entity);
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    /// All entities, in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i), e))
    }

    /// Entities carrying both `C1` and `C2`, in insertion order.
    pub fn query<C1: 'static, C2: 'static>(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities()
            .filter(|(_, e)| e.has::<C1>() && e.has::<C2>())
    }

    /// Disjoint mutable `(A, B)` component pairs of every entity carrying
    /// both, in insertion order.
    pub fn query_pair_mut<A: 'static, B: 'static>(
        &mut self,
    ) -> impl Iterator<Item = (&mut A, &mut B)> {
        self.entities
            .iter_mut()
            .filter_map(|e| e.get_pair_mut::<A, B>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag(&'static str);
    struct Extra;

    #[test]
    fn query_is_deterministic_and_ordered() {
        let mut scene = Scene::new();
        let a = scene.add(Entity::new().with(Tag("a")).with(Extra));
        let _b = scene.add(Entity::new().with(Tag("b")));
        let c = scene.add(Entity::new().with(Tag("c")).with(Extra));

        for _ in 0..3 {
            let hits: Vec<EntityId> = scene.query::<Tag, Extra>().map(|(id, _)| id).collect();
            assert_eq!(hits, vec![a, c]);
        }
    }

    #[test]
    fn query_requires_both_components() {
        let mut scene = Scene::new();
        scene.add(Entity::new().with(Tag("only tag")));
        scene.add(Entity::new().with(Extra));

        assert_eq!(scene.query::<Tag, Extra>().count(), 0);
    }

    #[test]
    fn pair_query_mutates_in_place() {
        let mut scene = Scene::new();
        scene.add(Entity::new().with(1u32).with(10.0f32));
        scene.add(Entity::new().with(2u32));
        scene.add(Entity::new().with(3u32).with(30.0f32));

        for (count, value) in scene.query_pair_mut::<u32, f32>() {
            *count += 100;
            *value += 0.5;
        }

        let sums: Vec<u32> = scene
            .entities()
            .filter_map(|(_, e)| e.get::<u32>().copied())
            .collect();
        assert_eq!(sums, vec![101, 2, 103]);
    }

    #[test]
    fn ids_resolve_back_to_entities() {
        let mut scene = Scene::new();
        let id = scene.add(Entity::new().with(Tag("x")));

        assert_eq!(scene.get(id).and_then(|e| e.get::<Tag>()).map(|t| t.0), Some("x"));
        assert_eq!(scene.len(), 1);
    }
}
