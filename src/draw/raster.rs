use crate::draw::model::{Color, Point};
use anyhow::{anyhow, Context, Result};
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Pixel coordinates are kept well inside `i32` so extents never overflow.
const COORD_LIMIT: f32 = (1 << 24) as f32;

fn to_pixel(value: f32) -> i32 {
    value.clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

impl DirtyRect {
    pub fn from_points(a: Point, b: Point, pad: f32) -> Self {
        let min_x = to_pixel((a.x.min(b.x) - pad).floor());
        let max_x = to_pixel((a.x.max(b.x) + pad).ceil());
        let min_y = to_pixel((a.y.min(b.y) - pad).floor());
        let max_y = to_pixel((a.y.max(b.y) + pad).ceil());
        Self {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).saturating_add(1).max(1),
            height: max_y.saturating_sub(min_y).saturating_add(1).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = width as i32;
        let max_h = height as i32;
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.x.saturating_add(self.width).clamp(0, max_w);
        let y1 = self.y.saturating_add(self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Straight RGBA8 pixel store, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut buffer = Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        };
        buffer.fill(fill);
        buffer
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_array();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 4) as usize;
        Color {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    pub fn is_filled_with(&self, color: Color) -> bool {
        let rgba = color.to_array();
        self.pixels.chunks_exact(4).all(|px| px == rgba)
    }

    /// Copies the overlapping top-left region of `src` into `self`, pixel for
    /// pixel, without any scaling.
    pub fn blit_from(&mut self, src: &RgbaBuffer) {
        let cols = self.width.min(src.width) as usize;
        let rows = self.height.min(src.height) as usize;
        for row in 0..rows {
            let dst_start = row * self.width as usize * 4;
            let src_start = row * src.width as usize * 4;
            self.pixels[dst_start..dst_start + cols * 4]
                .copy_from_slice(&src.pixels[src_start..src_start + cols * 4]);
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| anyhow!("raster size {}x{} does not match its pixel data", self.width, self.height))?;
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .context("encode raster as png")?;
        Ok(bytes)
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }
}

/// Paints a filled disc, which is what a zero-length round-capped segment
/// looks like.
pub fn paint_dot(buffer: &mut RgbaBuffer, center: Point, width: f32, color: Color) -> Option<DirtyRect> {
    paint_segment(buffer, center, center, width, color)
}

/// Paints a round-capped segment by filling every pixel whose center lies
/// within `width / 2` of the segment. Returns the touched area, or `None`
/// when no pixel was written.
pub fn paint_segment(
    buffer: &mut RgbaBuffer,
    start: Point,
    end: Point,
    width: f32,
    color: Color,
) -> Option<DirtyRect> {
    let radius = (width * 0.5).max(0.5);
    let bounds = DirtyRect::from_points(start, end, radius + 1.0).clamp(buffer.width, buffer.height)?;

    let radius_sq = radius * radius;
    let mut painted = false;
    for y in bounds.y..(bounds.y + bounds.height) {
        for x in bounds.x..(bounds.x + bounds.width) {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if point_segment_distance_sq(center, start, end) <= radius_sq {
                buffer.set_pixel(x, y, color);
                painted = true;
            }
        }
    }
    painted.then_some(bounds)
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let wx = point.x - start.x;
    let wy = point.y - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = point.x - (start.x + vx * t);
    let dy = point.y - (start.y + vy * t);
    dx * dx + dy * dy
}
