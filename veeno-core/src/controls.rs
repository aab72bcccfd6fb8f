/// Camera rigs: damped orbit controls and pointer-driven orbit
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::projection::Camera;
use crate::viewport::Pointer;

/// Keeps the orbit polar angle away from the poles where `look_at` degenerates
const POLE_EPSILON: f32 = 1e-3;

/// Spherical coordinates around a target (radius, polar phi from +Y,
/// azimuth theta around +Y measured from +Z)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: &Vector3<f32>) -> Self {
        let radius = offset.norm();
        if radius < f32::EPSILON {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi = self.phi.sin();
        Vector3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit controls with inertia. Rotation requests accumulate as deltas and
/// are eased in by `damping_factor` on every `update`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 0.5,
            max_distance: 50.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Positive angles move the camera to the right around the target
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Positive angles move the camera up towards the pole
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Factors above 1 move the camera closer
    pub fn zoom(&mut self, factor: f32) {
        if factor > 0.0 {
            self.scale /= factor;
        }
    }

    /// Whether any rotation is still being eased in
    pub fn is_settling(&self) -> bool {
        self.delta_theta.abs() > 1e-5 || self.delta_phi.abs() > 1e-5
    }

    /// Re-derive the orbit from the camera's current position, apply pending
    /// deltas and write the new position back. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.position;
        let mut spherical = Spherical::from_offset(&(camera.position - self.target));

        if self.enable_damping {
            spherical.theta += self.delta_theta * self.damping_factor;
            spherical.phi += self.delta_phi * self.damping_factor;
        } else {
            spherical.theta += self.delta_theta;
            spherical.phi += self.delta_phi;
        }
        spherical.phi = spherical.phi.clamp(POLE_EPSILON, PI - POLE_EPSILON);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        (camera.position - before).norm_squared() > f32::EPSILON
    }
}

/// Camera orbit driven directly by the normalized pointer position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerOrbit {
    pub target: Point3<f32>,
    pub radius: f32,
    pub height: f32,
}

impl Default for PointerOrbit {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            radius: 3.0,
            height: 5.0,
        }
    }
}

impl PointerOrbit {
    /// Position the orbit would place the camera at for `pointer`
    pub fn position(&self, pointer: Pointer) -> Point3<f32> {
        let angle = pointer.x * TAU;
        self.target
            + Vector3::new(
                angle.sin() * self.radius,
                pointer.y * self.height,
                angle.cos() * self.radius,
            )
    }

    pub fn apply(&self, camera: &mut Camera, pointer: Pointer) {
        camera.position = self.position(pointer);
        camera.look_at(self.target);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Orbit,
    Pointer,
}

/// The active camera driver
#[derive(Debug, Clone, PartialEq)]
pub enum CameraRig {
    Orbit(OrbitControls),
    Pointer(PointerOrbit),
}

impl CameraRig {
    pub fn new(mode: CameraMode, target: Point3<f32>) -> Self {
        match mode {
            CameraMode::Orbit => Self::Orbit(OrbitControls::new(target)),
            CameraMode::Pointer => Self::Pointer(PointerOrbit {
                target,
                ..PointerOrbit::default()
            }),
        }
    }

    pub fn mode(&self) -> CameraMode {
        match self {
            Self::Orbit(_) => CameraMode::Orbit,
            Self::Pointer(_) => CameraMode::Pointer,
        }
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        match self {
            Self::Orbit(controls) => controls.target = target,
            Self::Pointer(orbit) => orbit.target = target,
        }
    }

    /// Per-frame camera update
    pub fn update(&mut self, camera: &mut Camera, pointer: Pointer) {
        match self {
            Self::Orbit(controls) => {
                controls.update(camera);
            }
            Self::Pointer(orbit) => orbit.apply(camera, pointer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pointer_center_gives_resting_position() {
        let orbit = PointerOrbit::default();
        let mut camera = Camera::default();
        orbit.apply(&mut camera, Pointer::default());
        assert_relative_eq!(camera.position, Point3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.target, Point3::origin());
    }

    #[test]
    fn test_pointer_quarter_turn() {
        let orbit = PointerOrbit::default();
        let position = orbit.position(Pointer { x: 0.25, y: 0.5 });
        assert_relative_eq!(position, Point3::new(3.0, 2.5, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_update_without_input_keeps_position() {
        let mut controls = OrbitControls::default();
        let mut camera = Camera::default();
        let start = camera.position;
        let moved = controls.update(&mut camera);
        assert!(!moved);
        assert_relative_eq!(camera.position, start, epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_damping_eases_rotation() {
        let mut controls = OrbitControls::default();
        let mut camera = Camera::default();
        let radius = (camera.position - controls.target).norm();

        controls.rotate_left(0.5);
        assert!(controls.update(&mut camera));
        assert!(controls.is_settling());
        for _ in 0..400 {
            controls.update(&mut camera);
        }
        assert!(!controls.is_settling());
        // Rotation around the target preserves the distance
        assert_relative_eq!((camera.position - controls.target).norm(), radius, epsilon = 1e-4);
    }

    #[test]
    fn test_orbit_rotation_without_damping_is_immediate() {
        let mut controls = OrbitControls {
            enable_damping: false,
            ..OrbitControls::default()
        };
        let mut camera = Camera::default();
        camera.position = Point3::new(0.0, 0.0, 3.0);

        controls.rotate_left(-std::f32::consts::FRAC_PI_2);
        controls.update(&mut camera);

        assert_relative_eq!(camera.position, Point3::new(3.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_orbit_zoom_respects_limits() {
        let mut controls = OrbitControls::default();
        let mut camera = Camera::default();
        controls.zoom(1000.0);
        controls.update(&mut camera);
        assert_relative_eq!(
            (camera.position - controls.target).norm(),
            controls.min_distance,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_orbit_never_reaches_pole() {
        let mut controls = OrbitControls {
            enable_damping: false,
            ..OrbitControls::default()
        };
        let mut camera = Camera::default();
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        let offset = camera.position - controls.target;
        assert!(offset.x.abs() + offset.z.abs() > 0.0);
    }
}
