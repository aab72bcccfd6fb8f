/// Laying out a string with a typeface and extruding it
use nalgebra::Vector2;

use crate::error::Result;
use crate::extrude::extrude_shapes;
use crate::font::Font;
use crate::geometry::Mesh;
use crate::params::TextParams;
use crate::shape::{Shape, ShapePath};

/// Distance between baselines for `size`, in layout units
pub fn line_height(font: &Font, size: f32) -> f32 {
    let bounds = &font.bounding_box;
    (bounds.y_max - bounds.y_min + font.underline_thickness) * size / font.resolution
}

/// Glyph outlines of `text` at `size`, one path per visible character.
/// `\n` starts a new line below the previous one.
pub fn layout_paths(font: &Font, text: &str, size: f32, curve_segments: u32) -> Vec<ShapePath> {
    let scale = size / font.resolution;
    let line_height = line_height(font, size);
    let mut offset = Vector2::zeros();
    let mut paths = Vec::new();

    for ch in text.chars() {
        if ch == '\n' {
            offset.x = 0.0;
            offset.y -= line_height;
            continue;
        }
        let Some(glyph) = font.glyph_or_fallback(ch) else {
            tracing::warn!(character = %ch.escape_debug(), family = %font.family_name, "no glyph and no fallback");
            continue;
        };
        if font.glyph(ch).is_none() {
            tracing::debug!(character = %ch.escape_debug(), "using fallback glyph");
        }
        paths.push(ShapePath::from_outline(&glyph.outline, scale, offset, curve_segments));
        offset.x += glyph.advance * scale;
    }

    paths
}

pub fn layout_shapes(font: &Font, text: &str, size: f32, curve_segments: u32) -> Vec<Shape> {
    layout_paths(font, text, size, curve_segments)
        .iter()
        .flat_map(ShapePath::to_shapes)
        .collect()
}

/// Extruded geometry for the text described by `params`, not yet centred
pub fn text_geometry(font: &Font, params: &TextParams) -> Result<Mesh> {
    let shapes = layout_shapes(font, &params.text, params.size, params.curve_segments);
    extrude_shapes(&shapes, &params.extrude_options())
}
