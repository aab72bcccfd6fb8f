/// Viewport sizing and pointer normalization
use crate::error::{Error, Result};
use crate::projection::Camera;

/// Device pixel ratios above this are clamped to keep fill cost bounded
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Visible size of the drawing surface in logical units (CSS pixels or
/// terminal cells) plus the ratio used for the backing resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Result<Self> {
        let mut viewport = Self {
            width: 1,
            height: 1,
            pixel_ratio: 1.0,
        };
        viewport.set_size(width, height, device_pixel_ratio)?;
        Ok(viewport)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Backing resolution: `floor(size * min(device_pixel_ratio, 2))`
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width as f32 * self.pixel_ratio).floor() as u32,
            (self.height as f32 * self.pixel_ratio).floor() as u32,
        )
    }

    fn set_size(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidViewport { width, height });
        }
        self.width = width;
        self.height = height;
        self.pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Ok(())
    }

    /// Apply a new window size and immediately update the camera aspect.
    /// Zero-sized surfaces are rejected and leave both untouched.
    pub fn resize(
        &mut self,
        camera: &mut Camera,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    ) -> Result<()> {
        self.set_size(width, height, device_pixel_ratio)?;
        camera.set_aspect(self.aspect());
        tracing::debug!(
            width,
            height,
            pixel_ratio = self.pixel_ratio,
            "viewport resized"
        );
        Ok(())
    }
}

/// Pointer position normalized to [-0.5, 0.5] on both axes, y pointing up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Pointer {
    pub fn normalize(x: f32, y: f32, viewport: &Viewport) -> Self {
        let nx = x / viewport.width as f32 - 0.5;
        let ny = -(y / viewport.height as f32 - 0.5);
        Self {
            x: nx.clamp(-0.5, 0.5),
            y: ny.clamp(-0.5, 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resize_updates_aspect_and_backing() {
        let mut camera = Camera::default();
        let mut viewport = Viewport::new(800, 600, 1.0).unwrap();

        viewport.resize(&mut camera, 1280, 720, 3.0).unwrap();

        assert_eq!(camera.aspect, 1280.0 / 720.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.backing_size(), (2560, 1440));
    }

    #[test]
    fn test_fractional_ratio_floors_backing() {
        let mut camera = Camera::default();
        let mut viewport = Viewport::new(800, 600, 1.0).unwrap();

        viewport.resize(&mut camera, 333, 101, 1.5).unwrap();

        assert_eq!(viewport.backing_size(), (499, 151));
    }

    #[test]
    fn test_zero_resize_is_rejected() {
        let mut camera = Camera::default();
        let mut viewport = Viewport::new(800, 600, 1.0).unwrap();
        let aspect = camera.aspect;

        let result = viewport.resize(&mut camera, 0, 600, 1.0);

        assert!(matches!(
            result,
            Err(Error::InvalidViewport { width: 0, height: 600 })
        ));
        assert_eq!(camera.aspect, aspect);
        assert_eq!(viewport.width, 800);
    }

    #[test]
    fn test_pointer_center_is_origin() {
        let viewport = Viewport::new(800, 600, 1.0).unwrap();
        let pointer = Pointer::normalize(400.0, 300.0, &viewport);
        assert_eq!(pointer, Pointer { x: 0.0, y: 0.0 });
    }

    #[test]
    fn test_pointer_corners_and_inverted_y() {
        let viewport = Viewport::new(800, 600, 1.0).unwrap();
        let top_left = Pointer::normalize(0.0, 0.0, &viewport);
        assert_relative_eq!(top_left.x, -0.5);
        assert_relative_eq!(top_left.y, 0.5);

        let bottom_right = Pointer::normalize(800.0, 600.0, &viewport);
        assert_relative_eq!(bottom_right.x, 0.5);
        assert_relative_eq!(bottom_right.y, -0.5);
    }
}
