/// Geometry primitives and triangle meshes
use nalgebra::{Point3, Vector3};
use std::f32::consts::TAU;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    pub fn from_parts(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Triangle with every vertex normal set to the face normal
    pub fn flat(p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>) -> Self {
        let normal = face_normal(&p0, &p1, &p2);
        Self::new(
            Vertex::from_parts(p0, normal),
            Vertex::from_parts(p1, normal),
            Vertex::from_parts(p2, normal),
        )
    }

    /// Face normal from the winding of the vertices; zero for degenerate faces
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [a, b, c] = &self.vertices;
        face_normal(&a.position, &b.position, &c.position)
    }
}

fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    (b - a)
        .cross(&(c - a))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Point3<f32> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn extend(&mut self, other: Mesh) {
        self.triangles.extend(other.triangles);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Vertices are not shared between triangles, so this is three per face
    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for vertex in self.triangles.iter().flat_map(|t| t.vertices.iter()) {
            bounds.expand(&vertex.position);
        }
        bounds
    }

    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for vertex in self.triangles.iter_mut().flat_map(|t| t.vertices.iter_mut()) {
            vertex.position += offset;
        }
    }

    /// Move the mesh so its bounding box is centred on the origin.
    /// Returns the applied offset.
    pub fn center(&mut self) -> Vector3<f32> {
        let offset = -self.bounding_box().center().coords;
        self.translate(&offset);
        offset
    }

    /// Axis-aligned cube centred on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);
        let axes = [Vector3::x(), Vector3::y(), Vector3::z()];

        for (i, normal_axis) in axes.iter().enumerate() {
            let u = axes[(i + 1) % 3];
            let v = axes[(i + 2) % 3];
            for sign in [1.0f32, -1.0] {
                let n = normal_axis * sign;
                let c = Point3::from(n * half);
                // Swap the in-plane axes on the negative side to keep the winding outward
                let (u, v) = if sign > 0.0 { (u, v) } else { (v, u) };
                let corner = |a: f32, b: f32| c + u * (a * half) + v * (b * half);
                let (p0, p1, p2, p3) = (
                    corner(-1.0, -1.0),
                    corner(1.0, -1.0),
                    corner(1.0, 1.0),
                    corner(-1.0, 1.0),
                );
                mesh.add_triangle(Triangle::flat(p0, p1, p2));
                mesh.add_triangle(Triangle::flat(p0, p2, p3));
            }
        }

        mesh
    }

    /// Regular octahedron with flat-shaded faces
    pub fn octahedron(radius: f32) -> Self {
        let mut mesh = Self::with_capacity(8);
        for sx in [1.0f32, -1.0] {
            for sy in [1.0f32, -1.0] {
                for sz in [1.0f32, -1.0] {
                    let x = Point3::new(sx * radius, 0.0, 0.0);
                    let y = Point3::new(0.0, sy * radius, 0.0);
                    let z = Point3::new(0.0, 0.0, sz * radius);
                    // Octants with an odd number of negative axes flip orientation
                    if sx * sy * sz > 0.0 {
                        mesh.add_triangle(Triangle::flat(x, y, z));
                    } else {
                        mesh.add_triangle(Triangle::flat(x, z, y));
                    }
                }
            }
        }
        mesh
    }

    /// Torus in the XY plane around the Z axis with smooth normals
    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial = radial_segments.max(2) as usize;
        let tubular = tubular_segments.max(3) as usize;

        let ring_vertex = |i: usize, j: usize| {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;
            let center = Point3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Point3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let normal = (position - center)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::z);
            Vertex::from_parts(position, normal)
        };

        let mut mesh = Self::with_capacity(radial * tubular * 2);
        for j in 0..radial {
            for i in 0..tubular {
                let a = ring_vertex(i, j);
                let b = ring_vertex(i + 1, j);
                let c = ring_vertex(i + 1, j + 1);
                let d = ring_vertex(i, j + 1);
                mesh.add_triangle(Triangle::new(a, b, d));
                mesh.add_triangle(Triangle::new(b, c, d));
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn outward(mesh: &Mesh) -> bool {
        mesh.triangles.iter().all(|t| {
            let centroid = (t.vertices[0].position.coords
                + t.vertices[1].position.coords
                + t.vertices[2].position.coords)
                / 3.0;
            t.calculate_normal().dot(&centroid) > 0.0
        })
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        assert!(outward(&cube));
        let bounds = cube.bounding_box();
        assert_relative_eq!(bounds.size(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_octahedron_faces_point_outward() {
        let octahedron = Mesh::octahedron(1.0);
        assert_eq!(octahedron.triangles.len(), 8);
        assert_eq!(octahedron.vertex_count(), 24);
        assert!(outward(&octahedron));
    }

    #[test]
    fn test_torus_triangle_count() {
        let torus = Mesh::torus(0.3, 0.2, 8, 12);
        assert_eq!(torus.triangles.len(), 8 * 12 * 2);
        let bounds = torus.bounding_box();
        assert_relative_eq!(bounds.max.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(bounds.max.z, 0.2, epsilon = 1e-2);
    }

    #[test]
    fn test_center_moves_bounds_to_origin() {
        let mut mesh = Mesh::cube(1.0);
        mesh.translate(&Vector3::new(3.0, -2.0, 0.5));
        mesh.center();
        let center = mesh.bounding_box().center();
        assert_relative_eq!(center, Point3::origin(), epsilon = 1e-6);
    }

    #[test]
    fn test_empty_mesh_bounds() {
        let mesh = Mesh::new();
        let bounds = mesh.bounding_box();
        assert!(bounds.is_empty());
        assert_eq!(bounds.center(), Point3::origin());
        assert_eq!(bounds.size(), Vector3::zeros());
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let triangle = Triangle::flat(p, p, p);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }
}
