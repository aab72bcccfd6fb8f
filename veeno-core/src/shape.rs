/// Flattening glyph outlines into polygons with holes
use lyon_tessellation::geom::{CubicBezierSegment, QuadraticBezierSegment};
use lyon_tessellation::math::point;
use nalgebra::{Point2, Vector2};

use crate::font::OutlineCommand;

const MERGE_EPSILON: f32 = 1e-6;

/// A filled polygon with optional holes. The contour winds counter-clockwise,
/// holes wind clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub contour: Vec<Point2<f32>>,
    pub holes: Vec<Vec<Point2<f32>>>,
}

impl Shape {
    pub fn new(contour: Vec<Point2<f32>>) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    /// Total number of ring points (contour plus holes)
    pub fn point_count(&self) -> usize {
        self.contour.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }

    /// Contour first, then each hole
    pub fn rings(&self) -> impl Iterator<Item = &[Point2<f32>]> {
        std::iter::once(self.contour.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }
}

/// Positive for counter-clockwise rings (y up)
pub fn signed_area(ring: &[Point2<f32>]) -> f32 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice * 0.5
}

pub fn is_clockwise(ring: &[Point2<f32>]) -> bool {
    signed_area(ring) < 0.0
}

/// Even-odd ray crossing test
pub fn contains_point(ring: &[Point2<f32>], p: &Point2<f32>) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Sub-paths of one glyph, flattened and placed in layout space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePath {
    pub subpaths: Vec<Vec<Point2<f32>>>,
}

impl ShapePath {
    /// Flatten `outline` with `curve_segments` divisions per curve, mapping
    /// font units through `scale` and `offset`. Every move-to starts a new
    /// sub-path.
    pub fn from_outline(
        outline: &[OutlineCommand],
        scale: f32,
        offset: Vector2<f32>,
        curve_segments: u32,
    ) -> Self {
        let divisions = curve_segments.max(1);
        let place = |p: Point2<f32>| Point2::new(p.x * scale + offset.x, p.y * scale + offset.y);

        let mut path = Self::default();
        let mut current: Vec<Point2<f32>> = Vec::new();
        let mut cursor = Point2::origin();

        for command in outline {
            match *command {
                OutlineCommand::MoveTo(p) => {
                    path.finish(&mut current);
                    cursor = place(p);
                    current.push(cursor);
                }
                OutlineCommand::LineTo(p) => {
                    cursor = place(p);
                    push_point(&mut current, cursor);
                }
                OutlineCommand::QuadTo { ctrl, to } => {
                    let (ctrl, to) = (place(ctrl), place(to));
                    let segment = QuadraticBezierSegment {
                        from: point(cursor.x, cursor.y),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(to.x, to.y),
                    };
                    for i in 1..=divisions {
                        let p = segment.sample(i as f32 / divisions as f32);
                        push_point(&mut current, Point2::new(p.x, p.y));
                    }
                    cursor = to;
                }
                OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                    let (ctrl1, ctrl2, to) = (place(ctrl1), place(ctrl2), place(to));
                    let segment = CubicBezierSegment {
                        from: point(cursor.x, cursor.y),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(to.x, to.y),
                    };
                    for i in 1..=divisions {
                        let p = segment.sample(i as f32 / divisions as f32);
                        push_point(&mut current, Point2::new(p.x, p.y));
                    }
                    cursor = to;
                }
                OutlineCommand::Close => {}
            }
        }
        path.finish(&mut current);
        path
    }

    fn finish(&mut self, current: &mut Vec<Point2<f32>>) {
        let mut ring = std::mem::take(current);
        while ring.len() > 1 && (ring[0] - ring[ring.len() - 1]).norm() < MERGE_EPSILON {
            ring.pop();
        }
        if ring.len() >= 3 && signed_area(&ring).abs() > MERGE_EPSILON * MERGE_EPSILON {
            self.subpaths.push(ring);
        }
    }

    /// Group sub-paths into filled shapes. Sub-paths wound like the largest
    /// one are solids, the rest are holes of the solid that contains them.
    pub fn to_shapes(&self) -> Vec<Shape> {
        match self.subpaths.len() {
            0 => return Vec::new(),
            1 => return vec![Shape::new(counter_clockwise(self.subpaths[0].clone()))],
            _ => {}
        }

        let solid_clockwise = self
            .subpaths
            .iter()
            .max_by(|a, b| signed_area(a).abs().total_cmp(&signed_area(b).abs()))
            .map(|ring| is_clockwise(ring))
            .unwrap_or(true);

        let mut shapes: Vec<Shape> = Vec::new();
        let mut pending_holes: Vec<(usize, &Vec<Point2<f32>>)> = Vec::new();

        for ring in &self.subpaths {
            if is_clockwise(ring) == solid_clockwise {
                shapes.push(Shape::new(counter_clockwise(ring.clone())));
            } else {
                // Remember the latest solid as the default owner
                pending_holes.push((shapes.len().saturating_sub(1), ring));
            }
        }

        if shapes.is_empty() {
            return Vec::new();
        }

        for (default_owner, hole) in pending_holes {
            let owner = shapes
                .iter()
                .position(|shape| contains_point(&shape.contour, &hole[0]))
                .unwrap_or(default_owner);
            shapes[owner].holes.push(clockwise(hole.clone()));
        }

        shapes
    }
}

fn push_point(ring: &mut Vec<Point2<f32>>, p: Point2<f32>) {
    if let Some(last) = ring.last() {
        if (last - p).norm() < MERGE_EPSILON {
            return;
        }
    }
    ring.push(p);
}

fn counter_clockwise(mut ring: Vec<Point2<f32>>) -> Vec<Point2<f32>> {
    if is_clockwise(&ring) {
        ring.reverse();
    }
    ring
}

fn clockwise(mut ring: Vec<Point2<f32>>) -> Vec<Point2<f32>> {
    if !is_clockwise(&ring) {
        ring.reverse();
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::parse_outline;
    use approx::assert_relative_eq;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32, clockwise: bool) -> String {
        if clockwise {
            format!("m {x0} {y0} l {x0} {y1} l {x1} {y1} l {x1} {y0} z ")
        } else {
            format!("m {x0} {y0} l {x1} {y0} l {x1} {y1} l {x0} {y1} z ")
        }
    }

    fn path(source: &str, curve_segments: u32) -> ShapePath {
        let outline = parse_outline(source).unwrap();
        ShapePath::from_outline(&outline, 1.0, Vector2::zeros(), curve_segments)
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        assert_relative_eq!(signed_area(&ccw), 0.5);
        assert!(!is_clockwise(&ccw));
    }

    #[test]
    fn test_closing_point_is_dropped() {
        let p = path("m 0 0 l 10 0 l 10 10 l 0 0", 4);
        assert_eq!(p.subpaths.len(), 1);
        assert_eq!(p.subpaths[0].len(), 3);
    }

    #[test]
    fn test_curves_are_divided_by_curve_segments() {
        let p = path("m 0 0 l 10 0 q 0 0 10 10", 6);
        // move + line + six curve samples, the last one closing onto the start
        assert_eq!(p.subpaths[0].len(), 2 + 6 - 1);
        let p = path("m 0 0 l 10 0 b 0 0 10 5 5 10", 3);
        assert_eq!(p.subpaths[0].len(), 2 + 3 - 1);
    }

    #[test]
    fn test_scale_and_offset_are_applied() {
        let outline = parse_outline("m 0 0 l 100 0 l 100 100").unwrap();
        let p = ShapePath::from_outline(&outline, 0.01, Vector2::new(2.0, -1.0), 1);
        assert_relative_eq!(p.subpaths[0][1], Point2::new(3.0, -1.0));
    }

    #[test]
    fn test_hole_is_attached_to_containing_solid() {
        let source = format!(
            "{}{}{}",
            square(0.0, 0.0, 10.0, 10.0, true),
            square(20.0, 0.0, 30.0, 10.0, true),
            square(22.0, 2.0, 28.0, 8.0, false)
        );
        let shapes = path(&source, 1).to_shapes();
        assert_eq!(shapes.len(), 2);
        assert!(shapes[0].holes.is_empty());
        assert_eq!(shapes[1].holes.len(), 1);
        assert!(!is_clockwise(&shapes[1].contour));
        assert!(is_clockwise(&shapes[1].holes[0]));
        assert_eq!(shapes[1].point_count(), 8);
    }

    #[test]
    fn test_hole_listed_first_still_finds_owner() {
        let source = format!(
            "{}{}",
            square(2.0, 2.0, 8.0, 8.0, false),
            square(0.0, 0.0, 10.0, 10.0, true)
        );
        let shapes = path(&source, 1).to_shapes();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
    }

    #[test]
    fn test_single_subpath_is_solid_regardless_of_winding() {
        let shapes = path(&square(0.0, 0.0, 1.0, 1.0, false), 1).to_shapes();
        assert_eq!(shapes.len(), 1);
        assert!(!is_clockwise(&shapes[0].contour));
    }

    #[test]
    fn test_degenerate_subpaths_are_ignored() {
        let p = path("m 0 0 l 1 0 m 5 5 l 6 6 l 7 7", 1);
        assert!(p.subpaths.is_empty());
        assert!(p.to_shapes().is_empty());
    }
}
