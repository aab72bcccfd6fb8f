/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use veeno_core::{ScreenPoint, ScreenTriangle};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: [u8; 3],
}

const BLANK: Cell = Cell {
    character: ' ',
    color: [0, 0, 0],
};

/// Depth-buffered character grid that shaded triangles are drawn into
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![BLANK; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(BLANK);
    }

    /// Character shown at a cell, for inspection
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x].character)
    }

    pub fn render(&mut self, triangles: &[ScreenTriangle]) {
        for triangle in triangles {
            let luminance = triangle.color.luminance();
            let char_index = (luminance * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
            // Lit faces never vanish into blank cells
            let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
            let cell = Cell {
                character: LUMINOSITY_RAMP[char_index],
                color: triangle.color.to_rgb8(),
            };
            self.rasterize_triangle(&triangle.points, cell);
        }
    }

    fn rasterize_triangle(&mut self, points: &[ScreenPoint; 3], cell: Cell) {
        let [v0, v1, v2] = points;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;

                    let idx = y as usize * self.width + x as usize;
                    if depth < self.depth_buffer[idx] {
                        self.depth_buffer[idx] = depth;
                        self.cells[idx] = cell;
                    }
                }
            }
        }
    }

    /// Queue the grid starting at the top-left corner, switching colors only
    /// when they change.
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            let row = &self.cells[y * self.width..(y + 1) * self.width];
            for cell in row {
                if current != Some(cell.color) {
                    let [r, g, b] = cell.color;
                    writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
