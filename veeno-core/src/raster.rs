/// Projecting the visible scene into shaded screen-space triangles
use nalgebra::{Matrix3, Point3};

use crate::material::{Color, Fragment};
use crate::projection::{Camera, ScreenPoint};
use crate::scene::Scene;

/// A front-facing triangle in screen coordinates with its flat color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub points: [ScreenPoint; 3],
    pub color: Color,
}

impl ScreenTriangle {
    /// Mean NDC depth, used for back-to-front ordering
    pub fn depth(&self) -> f32 {
        self.points.iter().map(|p| p.depth).sum::<f32>() / 3.0
    }
}

/// Project every visible object of `scene` through `camera` into a
/// `width` x `height` screen.
///
/// Back faces and triangles with a vertex behind the camera are dropped.
/// The result is sorted far to near.
pub fn project_scene(scene: &Scene, camera: &Camera, width: f32, height: f32) -> Vec<ScreenTriangle> {
    let view = camera.view_matrix();
    let view_projection = camera.projection_matrix() * view;
    let mut triangles = Vec::new();

    for (object, mesh) in scene.drawables() {
        let model = object.transform.matrix();
        let Some(normal_matrix) = model
            .fixed_view::<3, 3>(0, 0)
            .into_owned()
            .try_inverse()
            .map(|m: Matrix3<f32>| m.transpose())
        else {
            // Zero scale collapses the object
            continue;
        };

        for triangle in &mesh.triangles {
            let world: [Point3<f32>; 3] = triangle
                .vertices
                .map(|vertex| model.transform_point(&vertex.position));
            let Some(normal) = (normal_matrix * triangle.calculate_normal()).try_normalize(f32::EPSILON)
            else {
                continue;
            };

            let centroid = mean_point(&world);
            if normal.dot(&(camera.position - centroid)) <= 0.0 {
                continue;
            }

            let projected = [
                Camera::project_to_screen(&view_projection, &world[0], width, height),
                Camera::project_to_screen(&view_projection, &world[1], width, height),
                Camera::project_to_screen(&view_projection, &world[2], width, height),
            ];
            let [Some(a), Some(b), Some(c)] = projected else {
                continue;
            };

            let fragment = Fragment {
                position: centroid,
                normal,
                local: mean_point(&triangle.vertices.map(|vertex| vertex.position)),
            };
            let color = object.material.shade(&fragment, &view, &scene.lights);
            triangles.push(ScreenTriangle {
                points: [a, b, c],
                color,
            });
        }
    }

    triangles.sort_by(|a, b| b.depth().total_cmp(&a.depth()));
    triangles
}

fn mean_point(points: &[Point3<f32>; 3]) -> Point3<f32> {
    Point3::from((points[0].coords + points[1].coords + points[2].coords) / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::material::Material;
    use crate::scene::{ObjectKind, SceneObject};
    use crate::transform::Transform;

    fn scene_with_cube(transform: Transform) -> Scene {
        let mut scene = Scene::new();
        let geometry = scene.insert_geometry(Mesh::cube(1.0));
        scene.add(
            SceneObject::new("cube", ObjectKind::Decoration, geometry, Material::Normal)
                .with_transform(transform),
        );
        scene
    }

    #[test]
    fn test_back_faces_are_culled() {
        let scene = scene_with_cube(Transform::default());
        let mut camera = Camera::new(1.0);
        camera.position = Point3::new(0.0, 0.0, 3.0);

        let triangles = project_scene(&scene, &camera, 100.0, 100.0);
        // Looking straight at one face shows only its two triangles
        assert_eq!(triangles.len(), 2);
        for triangle in &triangles {
            for point in &triangle.points {
                assert!(point.x > 0.0 && point.x < 100.0);
                assert!(point.y > 0.0 && point.y < 100.0);
            }
        }
    }

    #[test]
    fn test_objects_behind_camera_are_dropped() {
        let scene = scene_with_cube(Transform::at(Point3::new(0.0, 0.0, 10.0)));
        let mut camera = Camera::new(1.0);
        camera.position = Point3::new(0.0, 0.0, 3.0);
        assert!(project_scene(&scene, &camera, 100.0, 100.0).is_empty());
    }

    #[test]
    fn test_zero_scale_and_hidden_objects_are_skipped() {
        let mut scene = scene_with_cube(Transform::default().with_uniform_scale(0.0));
        let camera = Camera::default();
        assert!(project_scene(&scene, &camera, 80.0, 60.0).is_empty());

        let geometry = scene.insert_geometry(Mesh::cube(1.0));
        let id = scene.add(SceneObject::new("cube", ObjectKind::Text, geometry, Material::Normal));
        assert!(!project_scene(&scene, &camera, 80.0, 60.0).is_empty());
        scene.get_mut(id).unwrap().visible = false;
        assert!(project_scene(&scene, &camera, 80.0, 60.0).is_empty());
    }

    #[test]
    fn test_sorted_far_to_near() {
        let scene = scene_with_cube(Transform::default());
        let triangles = project_scene(&scene, &Camera::default(), 80.0, 60.0);
        assert!(triangles.windows(2).all(|w| w[0].depth() >= w[1].depth()));
    }
}
