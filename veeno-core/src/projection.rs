/// Perspective camera and screen projection
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Vertical field of view used by the scene camera
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;

/// A point projected to screen space; `depth` is NDC z in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Point3::new(1.0, 1.0, 3.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: DEFAULT_FOV_DEGREES.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world-space point through `view_projection` into a
    /// `width` x `height` screen. Points behind the camera or outside the
    /// depth range yield `None`; x/y are left unclipped for the rasterizer.
    pub fn project_to_screen(
        view_projection: &Matrix4<f32>,
        point: &Point3<f32>,
        width: f32,
        height: f32,
    ) -> Option<ScreenPoint> {
        let clip = view_projection * Vector4::new(point.x, point.y, point.z, 1.0);

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        Some(ScreenPoint {
            x: (ndc.x + 1.0) * 0.5 * width,
            y: (1.0 - ndc.y) * 0.5 * height,
            depth: ndc.z,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800.0 / 600.0)
    }
}
