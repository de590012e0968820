//! Ripple field: a two-buffer damped wave simulation, excited by loud frames.
//!
//! Loud frames drop a disturbance at a random interior cell; the wave
//! equation spreads it outward while damping bleeds the energy away.

use super::{FrameCtx, Sketch};
use crate::canvas::Canvas;
use crate::color::Rgba;

const DAMPING: f32 = 0.9;
const SEED_RMS: f32 = 0.08;
const SEED_VALUE: f32 = 255.0;

pub struct RippleField {
    width: usize,
    height: usize,
    current: Vec<f32>,
    previous: Vec<f32>,
}

impl RippleField {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            current: Vec::new(),
            previous: Vec::new(),
        }
    }

    /// Drop a disturbance at an interior cell.
    pub fn excite(&mut self, x: usize, y: usize) {
        if self.width < 3 || self.height < 3 {
            return;
        }
        if x >= 1 && y >= 1 && x < self.width - 1 && y < self.height - 1 {
            self.previous[y * self.width + x] = SEED_VALUE;
        }
    }

    /// Total absolute field energy; decays toward zero without excitation.
    pub fn energy(&self) -> f32 {
        self.current.iter().map(|v| v.abs()).sum()
    }

    /// One wave step: neighbors average minus the cell's own past, damped.
    pub fn step(&mut self) {
        if self.width < 3 || self.height < 3 {
            return;
        }
        std::mem::swap(&mut self.current, &mut self.previous);
        let w = self.width;
        for y in 1..self.height - 1 {
            for x in 1..w - 1 {
                let sum = self.previous[y * w + x - 1]
                    + self.previous[y * w + x + 1]
                    + self.previous[(y - 1) * w + x]
                    + self.previous[(y + 1) * w + x];
                let i = y * w + x;
                self.current[i] = (sum / 2.0 - self.current[i]) * DAMPING;
            }
        }
    }
}

impl Default for RippleField {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch for RippleField {
    fn name(&self) -> &'static str {
        "ripple field"
    }

    fn update(&mut self, ctx: &FrameCtx<'_>) {
        if self.width < 3 || self.height < 3 {
            return;
        }
        if ctx.audio.rms > SEED_RMS {
            let x = 1 + fastrand::usize(..self.width - 2);
            let y = 1 + fastrand::usize(..self.height - 2);
            self.excite(x, y);
        }
        self.step();
    }

    fn paint(&self, _ctx: &FrameCtx<'_>, canvas: &mut Canvas) {
        canvas.clear(Rgba::BLACK);
        let w = self.width.min(canvas.width());
        let h = self.height.min(canvas.height());
        for y in 0..h {
            for x in 0..w {
                let v = self.current[y * self.width + x].clamp(0.0, 255.0) as u8;
                if v > 0 {
                    canvas.set_pixel(x, y, Rgba::new(v, v, v, 255));
                }
            }
        }
    }

    fn on_resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.current = vec![0.0; width * height];
            self.previous = vec![0.0; width * height];
        }
    }
}
