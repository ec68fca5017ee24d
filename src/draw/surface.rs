use crate::draw::input::PointerPhase;
use crate::draw::model::{Point, PAPER, PEN};
use crate::draw::raster::{paint_dot, paint_segment, RgbaBuffer};
use crate::draw::state::StrokeState;
use anyhow::Result;

/// Encoded surface contents at the moment of export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSnapshot {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Whether any ink is on the canvas, i.e. a stroke since the last clear
    /// left pixels that are still inside the backing store.
    pub inked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    /// The surface was never attached to a render target.
    Empty,
    Image(SurfaceSnapshot),
}

impl Snapshot {
    pub fn has_ink(&self) -> bool {
        matches!(self, Snapshot::Image(image) if image.inked)
    }
}

#[derive(Debug)]
struct RenderTarget {
    buffer: RgbaBuffer,
    logical_size: (f32, f32),
    pixels_per_point: f32,
}

/// Freehand raster canvas. Strokes are painted the moment they are extended
/// and are not kept as vector data.
#[derive(Debug, Default)]
pub struct DrawingSurface {
    target: Option<RenderTarget>,
    stroke: StrokeState,
    inked: bool,
    revision: u64,
}

impl DrawingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    pub fn stroke_state(&self) -> StrokeState {
        self.stroke
    }

    pub fn has_ink(&self) -> bool {
        self.inked
    }

    /// Bumped on every pixel change so views know when to re-upload.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pixels_per_point(&self) -> Option<f32> {
        self.target.as_ref().map(|t| t.pixels_per_point)
    }

    pub fn buffer(&self) -> Option<&RgbaBuffer> {
        self.target.as_ref().map(|t| &t.buffer)
    }

    /// Tracks the displayed size (in logical points) and display density.
    ///
    /// The first call attaches the surface. Later calls reallocate the
    /// backing store only when size or density changed, keeping painted
    /// pixels at the top-left. Returns `true` when the store was (re)built.
    pub fn resize(&mut self, logical_size: (f32, f32), pixels_per_point: f32) -> bool {
        let pixels_per_point = if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            pixels_per_point
        } else {
            1.0
        };
        let logical_size = (logical_size.0.max(1.0), logical_size.1.max(1.0));

        if let Some(target) = &self.target {
            if target.logical_size == logical_size && target.pixels_per_point == pixels_per_point {
                return false;
            }
        }

        let width = ((logical_size.0 * pixels_per_point).round() as u32).max(1);
        let height = ((logical_size.1 * pixels_per_point).round() as u32).max(1);
        let mut buffer = RgbaBuffer::new(width, height, PAPER);
        if let Some(previous) = &self.target {
            buffer.blit_from(&previous.buffer);
        }
        // Shrinking can crop every stroke away.
        self.inked = self.inked && !buffer.is_filled_with(PAPER);
        tracing::debug!(width, height, pixels_per_point, "drawing surface backing store resized");

        self.target = Some(RenderTarget {
            buffer,
            logical_size,
            pixels_per_point,
        });
        self.revision += 1;
        true
    }

    pub fn start_stroke(&mut self, at: Point) {
        self.stroke = StrokeState::Drawing { last: at };
        if let Some(target) = self.target.as_mut() {
            let scale = target.pixels_per_point;
            if paint_dot(&mut target.buffer, at.scaled(scale), PEN.width * scale, PEN.color).is_some() {
                self.inked = true;
                self.revision += 1;
            }
        }
    }

    /// Paints a segment from the last point to `to`. No effect while idle.
    pub fn extend_stroke(&mut self, to: Point) {
        let Some(last) = self.stroke.last_point() else {
            return;
        };
        self.stroke = StrokeState::Drawing { last: to };
        if let Some(target) = self.target.as_mut() {
            let scale = target.pixels_per_point;
            let painted = paint_segment(
                &mut target.buffer,
                last.scaled(scale),
                to.scaled(scale),
                PEN.width * scale,
                PEN.color,
            );
            if painted.is_some() {
                self.inked = true;
                self.revision += 1;
            }
        }
    }

    pub fn end_stroke(&mut self) {
        self.stroke = StrokeState::Idle;
    }

    /// Routes a normalized pointer action to the stroke operations.
    pub fn apply(&mut self, phase: PointerPhase, point: Option<Point>) {
        match (phase, point) {
            (PointerPhase::Down, Some(point)) => self.start_stroke(point),
            (PointerPhase::Move, Some(point)) => self.extend_stroke(point),
            (PointerPhase::Up, _) => self.end_stroke(),
            (PointerPhase::Down | PointerPhase::Move, None) => {}
        }
    }

    /// Wipes the whole backing store, regardless of density.
    pub fn clear(&mut self) {
        if let Some(target) = self.target.as_mut() {
            if !target.buffer.is_filled_with(PAPER) {
                target.buffer.fill(PAPER);
                self.revision += 1;
            }
        }
        self.inked = false;
    }

    pub fn export_snapshot(&self) -> Result<Snapshot> {
        let Some(target) = &self.target else {
            return Ok(Snapshot::Empty);
        };
        let png = target.buffer.encode_png()?;
        Ok(Snapshot::Image(SurfaceSnapshot {
            png,
            width: target.buffer.width,
            height: target.buffer.height,
            inked: self.inked,
        }))
    }
}
