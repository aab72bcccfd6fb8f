/// Display list and geometry pool
use std::collections::HashMap;

use crate::geometry::Mesh;
use crate::light::Lights;
use crate::material::{Color, Material};
use crate::transform::Transform;

/// Handle to a geometry in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

/// Handle to an object in the display list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Text,
    Decoration,
    /// Debug aids such as the axes
    Helper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub geometry: GeometryId,
    pub material: Material,
    pub transform: Transform,
    pub visible: bool,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind, geometry: GeometryId, material: Material) -> Self {
        Self {
            name: name.into(),
            kind,
            geometry,
            material,
            transform: Transform::default(),
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Objects drawn each frame, the geometries they reference, and the lights
#[derive(Debug)]
pub struct Scene {
    objects: Vec<(ObjectId, SceneObject)>,
    /// Display-list position of every attached object
    index: HashMap<ObjectId, usize>,
    geometries: HashMap<GeometryId, Mesh>,
    next_id: u64,
    pub lights: Lights,
    pub background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            index: HashMap::new(),
            geometries: HashMap::new(),
            next_id: 0,
            lights: Lights::default(),
            background: Color::BLACK,
        }
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Move a geometry into the pool
    pub fn insert_geometry(&mut self, mesh: Mesh) -> GeometryId {
        let id = GeometryId(self.next());
        self.geometries.insert(id, mesh);
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Mesh> {
        self.geometries.get(&id)
    }

    /// Release a geometry. Returns false if it was already gone.
    pub fn dispose_geometry(&mut self, id: GeometryId) -> bool {
        let released = self.geometries.remove(&id).is_some();
        if released {
            tracing::trace!(?id, live = self.geometries.len(), "geometry disposed");
        }
        released
    }

    /// Geometries currently held by the pool
    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    /// Attach an object at the end of the display list
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId(self.next());
        self.index.insert(id, self.objects.len());
        self.objects.push((id, object));
        id
    }

    /// Detach an object; its geometry stays in the pool
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let position = self.index.remove(&id)?;
        let (_, object) = self.objects.remove(position);
        for (shifted, (object_id, _)) in self.objects.iter().enumerate().skip(position) {
            self.index.insert(*object_id, shifted);
        }
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        let position = *self.index.get(&id)?;
        self.objects.get(position).map(|(_, object)| object)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        let position = *self.index.get(&id)?;
        self.objects.get_mut(position).map(|(_, object)| object)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    pub fn count_kind(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|(_, object)| object.kind == kind).count()
    }

    /// Visible objects paired with their geometry, in display order
    pub fn drawables(&self) -> impl Iterator<Item = (&SceneObject, &Mesh)> {
        self.objects
            .iter()
            .filter(|(_, object)| object.visible)
            .filter_map(|(_, object)| Some((object, self.geometries.get(&object.geometry)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_object(scene: &mut Scene) -> (ObjectId, GeometryId) {
        let geometry = scene.insert_geometry(Mesh::cube(1.0));
        let id = scene.add(SceneObject::new("text", ObjectKind::Text, geometry, Material::Normal));
        (id, geometry)
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = Scene::new();
        let (id, geometry) = text_object(&mut scene);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(id).map(|o| o.geometry), Some(geometry));

        let removed = scene.remove(id).unwrap();
        assert_eq!(removed.name, "text");
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_none());
        // Detaching does not release the geometry
        assert_eq!(scene.live_geometries(), 1);
    }

    #[test]
    fn test_dispose_is_reported_once() {
        let mut scene = Scene::new();
        let (_, geometry) = text_object(&mut scene);
        assert!(scene.dispose_geometry(geometry));
        assert!(!scene.dispose_geometry(geometry));
        assert_eq!(scene.live_geometries(), 0);
    }

    #[test]
    fn test_drawables_skip_hidden_and_disposed() {
        let mut scene = Scene::new();
        let (first, _) = text_object(&mut scene);
        let (_, second_geometry) = text_object(&mut scene);
        let shared = scene.insert_geometry(Mesh::octahedron(1.0));
        for _ in 0..3 {
            scene.add(SceneObject::new("decor", ObjectKind::Decoration, shared, Material::Normal));
        }
        assert_eq!(scene.drawables().count(), 5);

        scene.get_mut(first).unwrap().visible = false;
        scene.dispose_geometry(second_geometry);
        assert_eq!(scene.drawables().count(), 3);
        assert_eq!(scene.count_kind(ObjectKind::Decoration), 3);
        assert_eq!(scene.live_geometries(), 2);
    }

    #[test]
    fn test_lookup_after_removal_in_the_middle() {
        let mut scene = Scene::new();
        let ids: Vec<_> = (0..5).map(|_| text_object(&mut scene).0).collect();
        scene.remove(ids[1]);
        scene.remove(ids[3]);

        assert!(scene.get(ids[1]).is_none());
        for &id in [ids[0], ids[2], ids[4]].iter() {
            scene.get_mut(id).unwrap().name = format!("{id:?}");
        }
        for &id in [ids[0], ids[2], ids[4]].iter() {
            assert_eq!(scene.get(id).unwrap().name, format!("{id:?}"));
        }
        let order: Vec<_> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut scene = Scene::new();
        let (a, ga) = text_object(&mut scene);
        let (b, gb) = text_object(&mut scene);
        assert_ne!(a, b);
        assert_ne!(ga, gb);
    }
}
