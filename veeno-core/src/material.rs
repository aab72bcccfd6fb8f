/// Surface materials and per-face shading
use image::RgbImage;
use nalgebra::{Matrix4, Point3, Vector3};
use std::f32::consts::{PI, TAU};
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::light::Lights;

/// Linear RGB color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn modulate(self, other: Color) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn add(self, other: Color) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// Perceived brightness in [0, 1]
    pub fn luminance(&self) -> f32 {
        (0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b).clamp(0.0, 1.0)
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }
}

/// Decoded RGB image sampled by texture coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_image(image::load_from_memory(bytes)?.to_rgb8()))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_image(image::open(path)?.to_rgb8()))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Nearest texel at `(u, v)`; `v = 1` is the top row
    pub fn sample_uv(&self, u: f32, v: f32) -> Color {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return Color::BLACK;
        }
        let px = (u * (w - 1) as f32).round().clamp(0.0, (w - 1) as f32) as u32;
        let py = ((1.0 - v) * (h - 1) as f32).round().clamp(0.0, (h - 1) as f32) as u32;
        let [r, g, b] = self.image.get_pixel(px, py).0;
        Color::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Spherical projection around the object origin, the mapping
    /// polyhedra get their texture coordinates from
    pub fn sample_direction(&self, direction: &Vector3<f32>) -> Color {
        let d = direction.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z);
        let u = d.z.atan2(-d.x) / TAU + 0.5;
        let v = d.y.clamp(-1.0, 1.0).asin() / PI + 0.5;
        self.sample_uv(u, v)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MatcapSource {
    Image(Texture),
    Studio,
}

/// Lighting baked into a sphere image, looked up by view-space normal
#[derive(Debug, Clone, PartialEq)]
pub struct Matcap {
    source: MatcapSource,
}

impl Matcap {
    /// Built-in soft key light used when no texture is available
    pub fn studio() -> Self {
        Self {
            source: MatcapSource::Studio,
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self {
            source: MatcapSource::Image(Texture::from_image(image)),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            source: MatcapSource::Image(Texture::from_bytes(bytes)?),
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            source: MatcapSource::Image(Texture::open(path)?),
        })
    }

    pub fn is_studio(&self) -> bool {
        matches!(self.source, MatcapSource::Studio)
    }

    pub fn sample(&self, view_normal: &Vector3<f32>) -> Color {
        let n = view_normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z);
        match &self.source {
            MatcapSource::Image(texture) => texture.sample_uv(n.x * 0.495 + 0.5, n.y * 0.495 + 0.5),
            MatcapSource::Studio => {
                let key = Vector3::new(-0.4, 0.6, 0.7).normalize();
                let diffuse = n.dot(&key).max(0.0);
                let rim = (1.0 - n.z.max(0.0)).powi(3);
                let highlight = diffuse.powi(24);
                let base = Color::from_hex(0xc8c2d8);
                base.scale(0.18 + 0.62 * diffuse + 0.25 * rim)
                    .add(Color::WHITE.scale(0.5 * highlight))
                    .clamped()
            }
        }
    }
}

/// The point of a face being shaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// World-space position
    pub position: Point3<f32>,
    /// World-space unit normal
    pub normal: Vector3<f32>,
    /// Position in the object's own space, used for texture lookup
    pub local: Point3<f32>,
}

/// Brightness bands of the toon ramp
const TOON_BANDS: [f32; 3] = [0.35, 0.7, 1.0];
const AMBIENT_WEIGHT: f32 = 0.15;
const POINT_WEIGHT: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Unlit; color comes from the matcap
    Matcap(Arc<Matcap>),
    /// Lit by the scene lights, diffuse term quantized into bands. The
    /// optional map tints the base color.
    Toon {
        color: Color,
        map: Option<Arc<Texture>>,
    },
    /// View-space normal mapped to RGB
    Normal,
    /// Unlit flat color
    Basic { color: Color },
}

impl Material {
    /// Untextured toon material
    pub fn toon(color: Color) -> Self {
        Material::Toon { color, map: None }
    }

    pub fn shade(&self, fragment: &Fragment, view: &Matrix4<f32>, lights: &Lights) -> Color {
        let normal = &fragment.normal;
        match self {
            Material::Matcap(matcap) => matcap.sample(&view.transform_vector(normal)),
            Material::Toon { color, map } => {
                let base = match map {
                    Some(texture) => color.modulate(texture.sample_direction(&fragment.local.coords)),
                    None => *color,
                };
                let lambert = lights.point.lambert(&fragment.position, normal);
                let band = TOON_BANDS
                    .iter()
                    .copied()
                    .find(|band| lambert <= *band)
                    .unwrap_or(1.0);
                let ambient = lights
                    .ambient
                    .color
                    .scale(lights.ambient.intensity * AMBIENT_WEIGHT);
                let direct = lights
                    .point
                    .color
                    .scale(lights.point.intensity * POINT_WEIGHT * band);
                base.modulate(ambient.add(direct)).clamped()
            }
            Material::Normal => {
                let n = view
                    .transform_vector(normal)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3::z);
                Color::new(n.x * 0.5 + 0.5, n.y * 0.5 + 0.5, n.z * 0.5 + 0.5)
            }
            Material::Basic { color } => *color,
        }
    }
}
