/// Scene lights
use nalgebra::{Point3, Vector3};

use crate::material::Color;

/// Uniform light reaching every surface. Its position is editable like any
/// other object but does not affect shading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
}

/// Omnidirectional light at a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
}

impl PointLight {
    /// Lambert term for a surface at `position` with unit `normal`
    pub fn lambert(&self, position: &Point3<f32>, normal: &Vector3<f32>) -> f32 {
        match (self.position - position).try_normalize(f32::EPSILON) {
            Some(to_light) => normal.dot(&to_light).max(0.0),
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: AmbientLight,
    pub point: PointLight,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 1.4,
                position: Point3::origin(),
            },
            point: PointLight {
                color: Color::WHITE,
                intensity: 3.4,
                position: Point3::new(1.0, 2.0, 3.0),
            },
        }
    }
}
