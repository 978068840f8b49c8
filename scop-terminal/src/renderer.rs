/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector3;
use scop_core::{Face, FaceColors, FrameMatrices, Model, RenderMode, Transform};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character used for wireframe edges
const EDGE_CHAR: char = '*';

/// Checker cells per texture unit in texture mode
const CHECKER_CELLS: f32 = 8.0;

/// Brightness of faces that turn away from the light
const AMBIENT: f32 = 0.25;

/// A projected face corner: screen x, y, depth, texture u, v
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    u: f32,
    v: f32,
}

/// ASCII renderer that converts 3D models to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    light_dir: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            light_dir: Vector3::new(0.3, 0.5, 1.0).normalize(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Draw every face of the model. Corners whose vertex index is out of
    /// range are skipped; faces left with fewer than three corners are not
    /// drawn.
    pub fn render_model(
        &mut self,
        model: &Model,
        colors: &FaceColors,
        mode: RenderMode,
        frame: &FrameMatrices,
    ) {
        let mvp = frame.mvp();
        for (index, face) in model.faces.iter().enumerate() {
            let Some(corners) = self.project_face(model, face, &mvp) else {
                continue;
            };
            if corners.len() < 3 {
                continue;
            }

            if mode == RenderMode::Wireframe {
                self.draw_outline(&corners);
                continue;
            }

            let lambert = model
                .face_normal(face)
                .map(|n| {
                    let world = frame.model.transform_vector(&n).normalize();
                    world.dot(&self.light_dir).max(0.0)
                })
                .unwrap_or(0.0);
            let light = AMBIENT + (1.0 - AMBIENT) * lambert;
            let rgb = colors.color_for(mode, index);

            // Polygons are fanned around their first corner
            for i in 1..corners.len() - 1 {
                let triangle = [corners[0], corners[i], corners[i + 1]];
                self.rasterize_triangle(&triangle, mode, rgb, light);
            }
        }
    }

    /// Project the valid corners of a face, or `None` if any of them falls
    /// outside the view volume.
    fn project_face(
        &self,
        model: &Model,
        face: &Face,
        mvp: &nalgebra::Matrix4<f32>,
    ) -> Option<Vec<ScreenVertex>> {
        let mut corners = Vec::with_capacity(face.len());
        for corner in &face.vertices {
            let Some(position) = model.vertex_position(corner) else {
                continue;
            };
            let (x, y, depth) =
                Transform::project_to_screen(mvp, position, self.width as u32, self.height as u32)?;
            let [u, v] = model.texture_uv(corner).unwrap_or([0.0, 0.0]);
            corners.push(ScreenVertex { x, y, depth, u, v });
        }
        Some(corners)
    }

    fn rasterize_triangle(
        &mut self,
        tri: &[ScreenVertex; 3],
        mode: RenderMode,
        rgb: [f32; 3],
        light: f32,
    ) {
        let [v0, v1, v2] = *tri;

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

        let luminance = (0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]) / 0.7;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let weights = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py));
                let Some((w0, w1, w2)) = weights else {
                    continue;
                };
                // Accept both windings; back faces are hidden by the depth test
                let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                    || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                if !inside {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                let (intensity, color) = match mode {
                    RenderMode::Texture => {
                        let u = w0 * v0.u + w1 * v1.u + w2 * v2.u;
                        let v = w0 * v0.v + w1 * v1.v + w2 * v2.v;
                        let intensity = checker(u, v) * light;
                        (intensity, ramp_color(intensity))
                    }
                    RenderMode::RandomColor => {
                        let intensity = (luminance * light).min(1.0);
                        (intensity, rgb_color(rgb, light))
                    }
                    _ => {
                        let intensity = (luminance * light).min(1.0);
                        (intensity, ramp_color(intensity))
                    }
                };

                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = shade_char(intensity);
                self.color_buffer[idx] = color;
            }
        }
    }

    fn draw_outline(&mut self, corners: &[ScreenVertex]) {
        for (i, start) in corners.iter().enumerate() {
            let end = corners[(i + 1) % corners.len()];
            self.draw_line(*start, end);
        }
    }

    fn draw_line(&mut self, start: ScreenVertex, end: ScreenVertex) {
        let steps = (end.x - start.x).abs().max((end.y - start.y).abs()).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = start.x + (end.x - start.x) * t;
            let y = start.y + (end.y - start.y) * t;
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }

            let depth = start.depth + (end.depth - start.depth) * t;
            let idx = y as usize * self.width + x as usize;
            if depth < self.depth_buffer[idx] {
                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = EDGE_CHAR;
                self.color_buffer[idx] = Color::White;
            }
        }
    }

    /// The character buffer as text rows
    pub fn rows(&self) -> Vec<String> {
        if self.width == 0 {
            return Vec::new();
        }
        self.char_buffer
            .chunks(self.width)
            .map(|row| row.iter().collect())
            .collect()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn shade_char(intensity: f32) -> char {
    let char_index = (intensity.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    // Keep covered cells visible
    LUMINOSITY_RAMP[char_index.clamp(1, LUMINOSITY_RAMP.len() - 1)]
}

fn ramp_color(intensity: f32) -> Color {
    match intensity {
        i if i < 0.3 => Color::DarkGrey,
        i if i < 0.5 => Color::Grey,
        i if i < 0.8 => Color::White,
        _ => Color::Cyan,
    }
}

fn rgb_color(rgb: [f32; 3], light: f32) -> Color {
    let channel = |c: f32| ((c / 0.7) * light * 255.0).clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: channel(rgb[0]),
        g: channel(rgb[1]),
        b: channel(rgb[2]),
    }
}

/// Procedural checkerboard standing in for the texture image
fn checker(u: f32, v: f32) -> f32 {
    let cell = (u * CHECKER_CELLS).floor() as i64 + (v * CHECKER_CELLS).floor() as i64;
    if cell.rem_euclid(2) == 0 {
        1.0
    } else {
        0.4
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
