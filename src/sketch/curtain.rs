//! Spectrum curtain: a translucent polyline over every 10th frequency bin.

use super::{FrameCtx, Sketch};
use crate::audio::SPECTRUM_BINS;
use crate::canvas::Canvas;
use crate::color::Rgba;

const BIN_STEP: usize = 10;
const STROKE: Rgba = Rgba::new(255, 255, 255, 120);

pub struct SpectrumCurtain;

impl SpectrumCurtain {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpectrumCurtain {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch for SpectrumCurtain {
    fn name(&self) -> &'static str {
        "spectrum curtain"
    }

    fn update(&mut self, _ctx: &FrameCtx<'_>) {}

    fn paint(&self, ctx: &FrameCtx<'_>, canvas: &mut Canvas) {
        canvas.clear(Rgba::BLACK);
        let w = canvas.width() as f32;
        let h = canvas.height() as f32;
        if w < 2.0 || h < 2.0 {
            return;
        }

        let points: Vec<(f32, f32)> = ctx
            .audio
            .spectrum
            .iter()
            .step_by(BIN_STEP)
            .enumerate()
            .map(|(i, &mag)| {
                let x = (i * BIN_STEP) as f32 / SPECTRUM_BINS as f32 * w;
                // Loud bins rise toward the top of the frame.
                let y = h - mag.clamp(0.0, 255.0) / 255.0 * h;
                (x, y)
            })
            .collect();

        canvas.set_stroke(Some(STROKE));
        canvas.polyline(&points);
    }
}
