/// Canvas 2D drawing of projected triangles
use veeno_core::{Color, ScreenTriangle};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

pub fn css_color(color: Color) -> String {
    let [r, g, b] = color.to_rgb8();
    format!("rgb({r},{g},{b})")
}

pub struct Painter {
    context: CanvasRenderingContext2d,
}

impl Painter {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Self { context }
    }

    /// Map CSS pixels onto the backing store
    pub fn set_pixel_ratio(&self, ratio: f32) -> Result<(), JsValue> {
        let ratio = ratio as f64;
        self.context.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
    }

    /// Clear to `background` and fill `triangles` in order. Triangles arrive
    /// sorted far to near, so later ones cover earlier ones.
    pub fn paint(&self, triangles: &[ScreenTriangle], background: Color, width: f32, height: f32) {
        let ctx = &self.context;
        ctx.set_fill_style(&JsValue::from_str(&css_color(background)));
        ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
        ctx.set_line_width(0.5);

        for triangle in triangles {
            let [a, b, c] = triangle.points;
            let style = JsValue::from_str(&css_color(triangle.color));
            ctx.begin_path();
            ctx.move_to(a.x as f64, a.y as f64);
            ctx.line_to(b.x as f64, b.y as f64);
            ctx.line_to(c.x as f64, c.y as f64);
            ctx.close_path();
            ctx.set_fill_style(&style);
            ctx.fill();
            // Hairline stroke hides the seams between adjacent triangles
            ctx.set_stroke_style(&style);
            ctx.stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(Color::BLACK), "rgb(0,0,0)");
        assert_eq!(css_color(Color::WHITE), "rgb(255,255,255)");
        assert_eq!(css_color(Color::from_hex(0x8f7cf2)), "rgb(143,124,242)");
    }
}
