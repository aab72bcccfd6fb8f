/// Object placement: position, Euler rotation and scale
use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation around the three axes in radians, applied in X, Y, Z order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));
        rx * ry * rz
    }
}

/// Placement of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: RotationState) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Model matrix: translate * rotate * scale
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position.coords)
            * self.rotation.matrix()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}
