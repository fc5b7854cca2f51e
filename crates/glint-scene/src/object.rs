//! Scene objects and the store that owns them.

use glam::Vec3;

use crate::transform::Transform;

/// Identifier of a scene object, unique within its [`ObjectStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Handle to a GPU model owned by the model arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(u32);

impl ModelHandle {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A renderable entity: optional model, tint color, and transform.
///
/// Move-only by design; an object's identity is tied to the store that
/// spawned it.
#[derive(Debug)]
pub struct SceneObject {
    id: ObjectId,
    pub model: Option<ModelHandle>,
    pub color: Vec3,
    pub transform: Transform,
}

impl SceneObject {
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

/// Owns scene objects in creation order.
///
/// Ids increase monotonically per store; iteration yields objects in the
/// order they were spawned.
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: Vec<SceneObject>,
    next_id: u32,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new object and return a mutable reference for setup.
    pub fn spawn(&mut self) -> &mut SceneObject {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(SceneObject {
            id,
            model: None,
            color: Vec3::ONE,
            transform: Transform::default(),
        });
        // Just pushed, so the store is non-empty.
        self.objects.last_mut().unwrap()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut store = ObjectStore::new();
        let a = store.spawn().id();
        let b = store.spawn().id();
        let c = store.spawn().id();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn iteration_preserves_spawn_order() {
        let mut store = ObjectStore::new();
        let ids: Vec<ObjectId> = (0..5).map(|_| store.spawn().id()).collect();
        let iterated: Vec<ObjectId> = store.iter().map(|object| object.id()).collect();
        assert_eq!(ids, iterated);
    }

    #[test]
    fn get_finds_spawned_objects() {
        let mut store = ObjectStore::new();
        let id = {
            let object = store.spawn();
            object.color = Vec3::new(1.0, 0.0, 0.0);
            object.id()
        };
        let found = store.get(id).unwrap();
        assert_eq!(found.color, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn new_objects_have_no_model() {
        let mut store = ObjectStore::new();
        assert!(store.spawn().model.is_none());
    }

    #[test]
    fn independent_stores_reuse_id_space() {
        let mut a = ObjectStore::new();
        let mut b = ObjectStore::new();
        assert_eq!(a.spawn().id(), b.spawn().id());
    }
}
