mod circles;
mod curtain;
mod radial;
mod ripple;

pub use circles::{Circle, CircleField, CirclePopulation, SpawnShape, DECAY_RATE, SIZE_LIMIT};
pub use curtain::SpectrumCurtain;
pub use radial::{RadialLoudness, HISTORY_LEN};
pub use ripple::RippleField;

use crate::audio::AudioFrame;
use crate::canvas::Canvas;

/// Virtual canvas the sketches lay themselves out on; painting scales to the
/// real pixel buffer per axis.
pub const VIRTUAL_W: f32 = 710.0;
pub const VIRTUAL_H: f32 = 500.0;

/// Per-frame input handed to every sketch.
pub struct FrameCtx<'a> {
    pub t: f32,
    pub dt: f32,
    pub audio: &'a AudioFrame,
}

pub trait Sketch {
    fn name(&self) -> &'static str;
    /// Advance internal state for one frame.
    fn update(&mut self, ctx: &FrameCtx<'_>);
    /// Paint the current state. Must not mutate sketch state.
    fn paint(&self, ctx: &FrameCtx<'_>, canvas: &mut Canvas);
    fn on_resize(&mut self, _width: usize, _height: usize) {}
}

pub fn make_sketches(chunks: usize, max_circles: usize) -> Vec<Box<dyn Sketch>> {
    vec![
        Box::new(CircleField::new(chunks, max_circles)),
        Box::new(RadialLoudness::new()),
        Box::new(SpectrumCurtain::new()),
        Box::new(RippleField::new()),
    ]
}

/// Resolve a `--sketch` query: an index, or a case-insensitive name fragment.
pub fn select_sketch(query: &Option<String>, sketches: &[Box<dyn Sketch>]) -> Option<usize> {
    let q = query.as_deref()?.trim();
    if q.is_empty() {
        return None;
    }
    if let Ok(i) = q.parse::<usize>() {
        return (i < sketches.len()).then_some(i);
    }
    let q_l = q.to_lowercase();
    sketches
        .iter()
        .position(|s| s.name().to_lowercase().contains(&q_l))
}

/// Per-axis scale from virtual coordinates to canvas pixels.
pub(crate) fn virtual_scale(canvas: &Canvas) -> (f32, f32) {
    (
        canvas.width() as f32 / VIRTUAL_W,
        canvas.height() as f32 / VIRTUAL_H,
    )
}
