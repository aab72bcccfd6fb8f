/// Axis indicator drawn at the origin: red X, green Y, blue Z
use nalgebra::{Point3, Vector3};

use crate::geometry::Mesh;
use crate::material::{Color, Material};
use crate::scene::{GeometryId, ObjectId, ObjectKind, Scene, SceneObject};
use crate::transform::Transform;

/// Length of each axis in world units
pub const AXES_SIZE: f32 = 1.0;
/// Cross-section of the axis bars
const AXES_THICKNESS: f32 = 0.02;

const AXIS_COLORS: [u32; 3] = [0xff0000, 0x00ff00, 0x0000ff];

#[derive(Debug)]
pub struct AxesHelper {
    geometry: GeometryId,
    objects: [ObjectId; 3],
}

impl AxesHelper {
    /// Add three thin bars running from the origin along +X, +Y and +Z
    pub fn spawn(scene: &mut Scene, size: f32) -> Self {
        let geometry = scene.insert_geometry(Mesh::cube(1.0));
        let objects = [0usize, 1, 2].map(|axis| {
            let mut scale = Vector3::repeat(AXES_THICKNESS);
            scale[axis] = size;
            let mut position = Point3::origin();
            position[axis] = size / 2.0;

            scene.add(
                SceneObject::new(
                    ["axis-x", "axis-y", "axis-z"][axis],
                    ObjectKind::Helper,
                    geometry,
                    Material::Basic {
                        color: Color::from_hex(AXIS_COLORS[axis]),
                    },
                )
                .with_transform(Transform::at(position).with_scale(scale)),
            )
        });
        tracing::debug!(size, "axes helper added");
        Self { geometry, objects }
    }

    pub fn geometry(&self) -> GeometryId {
        self.geometry
    }

    pub fn objects(&self) -> &[ObjectId; 3] {
        &self.objects
    }
}
