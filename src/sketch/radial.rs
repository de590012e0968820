//! Radial loudness plot: the last 360 RMS readings as one vertex per degree.

use super::{virtual_scale, FrameCtx, Sketch, VIRTUAL_H, VIRTUAL_W};
use crate::canvas::Canvas;
use crate::color::Rgba;
use std::collections::VecDeque;

pub const HISTORY_LEN: usize = 360;

const RADIUS_MIN: f32 = 100.0;
const RADIUS_MAX: f32 = 220.0;
const STROKE: Rgba = Rgba::new(255, 204, 0, 255);

pub struct RadialLoudness {
    history: VecDeque<f32>,
}

impl RadialLoudness {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for RadialLoudness {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch for RadialLoudness {
    fn name(&self) -> &'static str {
        "radial loudness"
    }

    fn update(&mut self, ctx: &FrameCtx<'_>) {
        self.history.push_back(ctx.audio.rms.clamp(0.0, 1.0));
        while self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    fn paint(&self, _ctx: &FrameCtx<'_>, canvas: &mut Canvas) {
        canvas.clear(Rgba::BLACK);
        if self.history.len() < 2 {
            return;
        }
        let (sx, sy) = virtual_scale(canvas);
        let cx = VIRTUAL_W / 2.0;
        let cy = VIRTUAL_H / 2.0;

        let points: Vec<(f32, f32)> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, &vol)| {
                let r = RADIUS_MIN + vol * (RADIUS_MAX - RADIUS_MIN);
                let a = (i as f32).to_radians();
                ((cx + r * a.cos()) * sx, (cy + r * a.sin()) * sy)
            })
            .collect();

        canvas.set_stroke(Some(STROKE));
        canvas.polyline(&points);
        // Close the ring once a full revolution of history exists.
        if self.history.len() == HISTORY_LEN {
            canvas.line(
                points[points.len() - 1].0,
                points[points.len() - 1].1,
                points[0].0,
                points[0].1,
            );
        }
    }
}
