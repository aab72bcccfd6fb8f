/// Randomly scattered decorative meshes sharing one geometry
use nalgebra::Point3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::geometry::Mesh;
use crate::material::Material;
use crate::scene::{GeometryId, ObjectId, ObjectKind, Scene, SceneObject};
use crate::transform::{RotationState, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorShape {
    #[default]
    Octahedron,
    Torus,
    Cube,
}

impl DecorShape {
    pub fn mesh(self) -> Mesh {
        match self {
            DecorShape::Octahedron => Mesh::octahedron(1.0),
            DecorShape::Torus => Mesh::torus(0.3, 0.2, 12, 24),
            DecorShape::Cube => Mesh::cube(1.0),
        }
    }

    /// Instance count used when none is configured
    pub fn default_count(self) -> usize {
        match self {
            DecorShape::Torus => 250,
            DecorShape::Octahedron | DecorShape::Cube => 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecorSettings {
    pub shape: DecorShape,
    /// Falls back to [`DecorShape::default_count`]
    pub count: Option<usize>,
    /// Edge length of the cube instances are scattered in
    pub spread: f32,
    /// Vertical oscillation amplitude
    pub amplitude: f32,
    /// Oscillation speed in radians per second
    pub speed: f32,
}

impl Default for DecorSettings {
    fn default() -> Self {
        Self {
            shape: DecorShape::default(),
            count: None,
            spread: 12.0,
            amplitude: 0.2,
            speed: 1.0,
        }
    }
}

impl DecorSettings {
    pub fn count(&self) -> usize {
        self.count.unwrap_or_else(|| self.shape.default_count())
    }
}

#[derive(Debug, Clone, Copy)]
struct Instance {
    object: ObjectId,
    base_y: f32,
}

/// A fixed set of decorations created once and animated every frame
#[derive(Debug)]
pub struct DecorField {
    geometry: GeometryId,
    instances: Vec<Instance>,
    amplitude: f32,
    speed: f32,
}

impl DecorField {
    /// Scatter the configured number of instances into `scene`
    pub fn spawn<R: Rng>(
        scene: &mut Scene,
        settings: &DecorSettings,
        material: Material,
        rng: &mut R,
    ) -> Self {
        let geometry = scene.insert_geometry(settings.shape.mesh());
        let count = settings.count();
        let mut instances = Vec::with_capacity(count);

        for index in 0..count {
            let mut coordinate = || (rng.gen::<f32>() - 0.5) * settings.spread;
            let position = Point3::new(coordinate(), coordinate(), coordinate());
            let rotation = RotationState::new(rng.gen::<f32>() * PI, rng.gen::<f32>() * PI, 0.0);
            let scale = rng.gen::<f32>();

            let transform = Transform::at(position)
                .with_rotation(rotation)
                .with_uniform_scale(scale);
            let object = scene.add(
                SceneObject::new(
                    format!("decor-{index}"),
                    ObjectKind::Decoration,
                    geometry,
                    material.clone(),
                )
                .with_transform(transform),
            );
            instances.push(Instance {
                object,
                base_y: position.y,
            });
        }

        tracing::debug!(shape = ?settings.shape, count, "decorations spawned");

        Self {
            geometry,
            instances,
            amplitude: settings.amplitude,
            speed: settings.speed,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The geometry every instance references
    pub fn geometry(&self) -> GeometryId {
        self.geometry
    }

    /// Give every instance `material`
    pub fn set_material(&self, scene: &mut Scene, material: &Material) {
        for instance in &self.instances {
            if let Some(object) = scene.get_mut(instance.object) {
                object.material = material.clone();
            }
        }
    }

    /// Move every instance to its height at `elapsed` seconds
    pub fn update(&self, scene: &mut Scene, elapsed: f32) {
        for instance in &self.instances {
            if let Some(object) = scene.get_mut(instance.object) {
                object.transform.position.y = instance.base_y
                    + (elapsed * self.speed + instance.base_y).sin() * self.amplitude;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spawn(settings: &DecorSettings) -> (Scene, DecorField) {
        let mut scene = Scene::new();
        let mut rng = StdRng::seed_from_u64(7);
        let field = DecorField::spawn(&mut scene, settings, Material::Normal, &mut rng);
        (scene, field)
    }

    #[test]
    fn test_default_count_and_shared_geometry() {
        let (scene, field) = spawn(&DecorSettings::default());
        assert_eq!(field.len(), 300);
        assert_eq!(scene.count_kind(ObjectKind::Decoration), 300);
        assert_eq!(scene.live_geometries(), 1);
        assert!(scene.iter().all(|(_, object)| object.geometry == field.geometry()));
    }

    #[test]
    fn test_torus_variant_count() {
        let settings = DecorSettings {
            shape: DecorShape::Torus,
            ..DecorSettings::default()
        };
        assert_eq!(settings.count(), 250);
        let (_, field) = spawn(&settings);
        assert_eq!(field.len(), 250);
    }

    #[test]
    fn test_instances_stay_within_spread() {
        let (scene, _) = spawn(&DecorSettings::default());
        for (_, object) in scene.iter() {
            let t = &object.transform;
            for axis in 0..3 {
                assert!(t.position[axis].abs() <= 6.0);
            }
            assert!(t.rotation.x >= 0.0 && t.rotation.x <= PI);
            assert!(t.scale.x >= 0.0 && t.scale.x < 1.0);
            assert_eq!(t.scale.x, t.scale.z);
        }
    }

    #[test]
    fn test_update_oscillates_around_base_height() {
        let settings = DecorSettings {
            count: Some(5),
            amplitude: 0.5,
            ..DecorSettings::default()
        };
        let (mut scene, field) = spawn(&settings);
        let before: Vec<f32> = scene.iter().map(|(_, o)| o.transform.position.y).collect();

        for elapsed in [0.0, 0.7, 3.1, 42.0] {
            field.update(&mut scene, elapsed);
            for ((_, object), base) in scene.iter().zip(&before) {
                assert!((object.transform.position.y - base).abs() <= 0.5 + 1e-5);
            }
        }
        assert_eq!(field.len(), 5);

        field.update(&mut scene, 0.0);
        let (_, first) = scene.iter().next().unwrap();
        assert_relative_eq!(
            first.transform.position.y,
            before[0] + before[0].sin() * 0.5,
            epsilon = 1e-5
        );
    }
}
