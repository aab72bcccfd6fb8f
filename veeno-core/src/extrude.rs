/// Extrusion of 2D shapes into bevelled solids
use lyon_tessellation::math::point;
use lyon_tessellation::path::Path;
use lyon_tessellation::{BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers};
use nalgebra::{Point2, Point3, Vector2};
use std::f32::consts::{FRAC_PI_2, SQRT_2};

use crate::error::{Error, Result};
use crate::geometry::{Mesh, Triangle};
use crate::shape::Shape;

const EPSILON: f32 = 1e-7;

/// Extrusion and bevel settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeOptions {
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            depth: 1.0,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.2,
            bevel_size: 0.1,
            bevel_offset: 0.0,
            bevel_segments: 3,
        }
    }
}

/// One ring of the extrusion: every contour point pushed out by `offset`
/// along its bevel vector and placed at height `z`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layer {
    z: f32,
    offset: f32,
}

impl ExtrudeOptions {
    /// Layers from the front bevel through the body to the back bevel
    fn layers(&self) -> Vec<Layer> {
        let (thickness, size, offset, segments) = if self.bevel_enabled {
            (
                self.bevel_thickness,
                self.bevel_size,
                self.bevel_offset,
                self.bevel_segments,
            )
        } else {
            (0.0, 0.0, 0.0, 0)
        };

        let ring = |b: u32| {
            let t = b as f32 / segments as f32 * FRAC_PI_2;
            (thickness * t.cos(), size * t.sin() + offset)
        };

        let mut layers = Vec::with_capacity(segments as usize * 2 + 2);
        for b in 0..segments {
            let (z, offset) = ring(b);
            layers.push(Layer { z: -z, offset });
        }
        layers.push(Layer {
            z: 0.0,
            offset: size + offset,
        });
        layers.push(Layer {
            z: self.depth,
            offset: size + offset,
        });
        for b in (0..segments).rev() {
            let (z, offset) = ring(b);
            layers.push(Layer {
                z: self.depth + z,
                offset,
            });
        }
        layers
    }
}

fn outward_normal(direction: &Vector2<f32>) -> Vector2<f32> {
    Vector2::new(direction.y, -direction.x)
        .try_normalize(EPSILON)
        .unwrap_or_else(Vector2::zeros)
}

/// Direction a ring point moves when the outline grows by one unit. Sharp
/// corners are capped at a length of sqrt(2).
fn bevel_vector(prev: &Point2<f32>, pt: &Point2<f32>, next: &Point2<f32>) -> Vector2<f32> {
    let incoming = pt - prev;
    let outgoing = next - pt;
    let n0 = outward_normal(&incoming);
    let n1 = outward_normal(&outgoing);

    let turn = incoming.perp(&outgoing);
    if turn.abs() > EPSILON {
        let denom = 1.0 + n0.dot(&n1);
        if denom > EPSILON {
            let miter = (n0 + n1) / denom;
            if miter.norm_squared() <= 2.0 {
                return miter;
            }
            return miter.normalize() * SQRT_2;
        }
    }

    if incoming.dot(&outgoing) >= 0.0 {
        n0
    } else {
        // The outline doubles back on itself
        incoming.try_normalize(EPSILON).unwrap_or_else(Vector2::zeros) * SQRT_2
    }
}

fn bevel_vectors(ring: &[Point2<f32>]) -> Vec<Vector2<f32>> {
    let n = ring.len();
    (0..n)
        .map(|i| bevel_vector(&ring[(i + n - 1) % n], &ring[i], &ring[(i + 1) % n]))
        .collect()
}

fn offset_ring(ring: &[Point2<f32>], vectors: &[Vector2<f32>], amount: f32) -> Vec<Point2<f32>> {
    ring.iter()
        .zip(vectors)
        .map(|(p, v)| p + v * amount)
        .collect()
}

/// Extrude `shapes` along +z. The front face sits at `z = 0` (minus the
/// bevel thickness), the back at `z = depth` (plus the bevel thickness).
pub fn extrude_shapes(shapes: &[Shape], options: &ExtrudeOptions) -> Result<Mesh> {
    let layers = options.layers();
    let mut mesh = Mesh::new();

    for shape in shapes {
        let rings: Vec<&[Point2<f32>]> = shape.rings().filter(|r| r.len() >= 3).collect();
        if rings.is_empty() {
            continue;
        }
        let vectors: Vec<Vec<Vector2<f32>>> = rings.iter().map(|r| bevel_vectors(r)).collect();

        // Every ring at every layer
        let layered: Vec<Vec<Vec<Point2<f32>>>> = layers
            .iter()
            .map(|layer| {
                rings
                    .iter()
                    .zip(&vectors)
                    .map(|(ring, v)| offset_ring(ring, v, layer.offset))
                    .collect()
            })
            .collect();

        build_side_walls(&mut mesh, &layers, &layered);

        let (first, last) = (0, layers.len() - 1);
        build_cap(&mut mesh, &layered[first], layers[first].z, false)?;
        build_cap(&mut mesh, &layered[last], layers[last].z, true)?;
    }

    Ok(mesh)
}

fn build_side_walls(mesh: &mut Mesh, layers: &[Layer], layered: &[Vec<Vec<Point2<f32>>>]) {
    let at = |layer: usize, ring: usize, i: usize| {
        let p = layered[layer][ring][i];
        Point3::new(p.x, p.y, layers[layer].z)
    };

    let ring_count = layered[0].len();
    for ring in 0..ring_count {
        let n = layered[0][ring].len();
        for j in 0..n {
            let k = (j + n - 1) % n;
            for s in 0..layers.len() - 1 {
                let (a, b) = (at(s, ring, k), at(s, ring, j));
                let (c, d) = (at(s + 1, ring, j), at(s + 1, ring, k));
                push_face(mesh, a, b, c);
                push_face(mesh, a, c, d);
            }
        }
    }
}

fn push_face(mesh: &mut Mesh, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
    let triangle = Triangle::flat(a, b, c);
    // Collapsed bevel rings produce zero-area faces
    if triangle.calculate_normal().norm_squared() > 0.0 {
        mesh.add_triangle(triangle);
    }
}

/// Triangulate the rings of one layer into a flat cap facing -z or +z
fn build_cap(mesh: &mut Mesh, rings: &[Vec<Point2<f32>>], z: f32, facing_back: bool) -> Result<()> {
    let mut builder = Path::builder();
    for ring in rings {
        builder.begin(point(ring[0].x, ring[0].y));
        for p in &ring[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<Point2<f32>, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                let p = vertex.position();
                Point2::new(p.x, p.y)
            }),
        )
        .map_err(|e| Error::Tessellation(format!("{e:?}")))?;

    for tri in buffers.indices.chunks_exact(3) {
        let [p0, p1, p2] = [0, 1, 2].map(|i| buffers.vertices[tri[i] as usize]);
        let area = (p1 - p0).perp(&(p2 - p0));
        if area.abs() <= EPSILON {
            continue;
        }
        // Counter-clockwise seen from +z faces +z
        let (p1, p2) = if (area > 0.0) == facing_back { (p1, p2) } else { (p2, p1) };
        mesh.add_triangle(Triangle::flat(
            Point3::new(p0.x, p0.y, z),
            Point3::new(p1.x, p1.y, z),
            Point3::new(p2.x, p2.y, z),
        ));
    }
    Ok(())
}
