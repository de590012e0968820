//! Circle grid: the main sketch.
//!
//! Each frame, the spectrum collapses into chunk peaks. Every peak paints a
//! lattice of ellipses sized and colored by its magnitude, and seeds the
//! circle population with one growing, fading circle per lattice point. The
//! population advances every frame and sheds circles once they outgrow the
//! size limit.

use super::{virtual_scale, FrameCtx, Sketch, VIRTUAL_H, VIRTUAL_W};
use crate::canvas::Canvas;
use crate::color::{HueFamily, Rgba};
use crate::spectrum::chunk_peaks;

/// A circle stops being drawn (and is removed) once its size reaches this.
pub const SIZE_LIMIT: f32 = 150.0;

/// Multiplicative fade applied to every live circle per tick.
pub const DECAY_RATE: f32 = 0.75;

const GRID_COLS: i32 = 3; // dx in -3..=3 -> 7 columns
const GRID_ROWS: i32 = 2; // dy in -2..=2 -> 5 rows
const GRID_SPACING: f32 = 150.0;

const DRIFT: f32 = 2.0;
const DRIFT_MARGIN: f32 = 40.0;

/// Spawn-time geometry shared by the immediate lattice draw and the
/// population. The gain term shrinks with the chunk index and the falloff
/// can push it negative for high chunks, so diameters clamp at zero.
#[derive(Clone, Copy, Debug)]
pub struct SpawnShape {
    pub base_diameter: f32,
    pub gain: f32,
    pub gain_falloff: f32,
    pub growth: f32,
    pub growth_spread: f32,
}

impl Default for SpawnShape {
    fn default() -> Self {
        Self {
            base_diameter: 20.0,
            gain: 0.5,
            gain_falloff: 1.0 / 24.0,
            growth: 20.0,
            growth_spread: 1.0 / 500.0,
        }
    }
}

impl SpawnShape {
    fn chunk_gain(&self, chunk: usize) -> f32 {
        self.gain - chunk as f32 * self.gain_falloff
    }

    /// Diameter of a fresh circle for peak `p` in chunk `i`. Never negative.
    pub fn diameter(&self, peak: f32, chunk: usize) -> f32 {
        (self.base_diameter + peak * self.chunk_gain(chunk)).max(0.0)
    }

    /// Per-tick growth of a circle spawned from chunk `i`. Never negative.
    pub fn velocity(&self, chunk: usize) -> f32 {
        (self.growth + chunk as f32 * self.chunk_gain(chunk) * self.growth_spread).max(0.0)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Circle {
    pub size: f32,
    pub velocity: f32,
    pub color_seed: f32,
    pub family: HueFamily,
    /// Lattice offset from the drifting origin, in virtual units.
    pub offset: (f32, f32),
    pub decay: f32,
}

/// The bounded population of growing, fading circles.
pub struct CirclePopulation {
    circles: Vec<Circle>,
    cap: usize,
}

impl CirclePopulation {
    pub fn new(cap: usize) -> Self {
        Self {
            circles: Vec::new(),
            cap: cap.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Append one circle per lattice offset, derived from the chunk's peak.
    pub fn spawn(&mut self, peak: f32, chunk: usize, shape: &SpawnShape, offsets: &[(f32, f32)]) {
        let family = HueFamily::for_chunk(chunk);
        let size = shape.diameter(peak, chunk);
        let velocity = shape.velocity(chunk);
        for &offset in offsets {
            self.circles.push(Circle {
                size,
                velocity,
                color_seed: peak,
                family,
                offset,
                decay: 1.0,
            });
        }
    }

    /// Advance every circle one frame, then drop the ones that crossed the
    /// size limit and evict the oldest beyond the cap.
    pub fn tick(&mut self) {
        for c in &mut self.circles {
            c.decay *= DECAY_RATE;
            c.size += c.velocity;
        }
        self.circles.retain(|c| c.size < SIZE_LIMIT);
        if self.circles.len() > self.cap {
            let excess = self.circles.len() - self.cap;
            self.circles.drain(..excess);
        }
    }

    /// Invoke `draw(x, y, diameter, fill, stroke)` for every live circle,
    /// positioned around `origin` in virtual units.
    pub fn render(&self, origin: (f32, f32), mut draw: impl FnMut(f32, f32, f32, Rgba, Rgba)) {
        for c in &self.circles {
            let fill = c.family.fill(c.color_seed, c.decay);
            let stroke = c.family.stroke(c.color_seed, c.decay);
            draw(
                origin.0 + c.offset.0,
                origin.1 + c.offset.1,
                c.size,
                fill,
                stroke,
            );
        }
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }
}

fn lattice() -> Vec<(f32, f32)> {
    let mut offsets =
        Vec::with_capacity(((GRID_COLS * 2 + 1) * (GRID_ROWS * 2 + 1)) as usize);
    for dy in -GRID_ROWS..=GRID_ROWS {
        for dx in -GRID_COLS..=GRID_COLS {
            offsets.push((dx as f32 * GRID_SPACING, dy as f32 * GRID_SPACING));
        }
    }
    offsets
}

pub struct CircleField {
    chunks: usize,
    shape: SpawnShape,
    population: CirclePopulation,
    offsets: Vec<(f32, f32)>,
    origin: (f32, f32),
    peaks: Vec<f32>,
}

impl CircleField {
    pub fn new(chunks: usize, max_circles: usize) -> Self {
        Self {
            chunks: chunks.max(1),
            shape: SpawnShape::default(),
            population: CirclePopulation::new(max_circles),
            offsets: lattice(),
            origin: (VIRTUAL_W / 2.0, VIRTUAL_H / 2.0),
            peaks: Vec::new(),
        }
    }

    pub fn population(&self) -> &CirclePopulation {
        &self.population
    }

    /// Random walk of the lattice origin, kept inside the frame.
    fn drift(&mut self) {
        let jx = (fastrand::f32() - 0.5) * 2.0 * DRIFT;
        let jy = (fastrand::f32() - 0.5) * 2.0 * DRIFT;
        self.origin.0 = (self.origin.0 + jx).clamp(DRIFT_MARGIN, VIRTUAL_W - DRIFT_MARGIN);
        self.origin.1 = (self.origin.1 + jy).clamp(DRIFT_MARGIN, VIRTUAL_H - DRIFT_MARGIN);
    }
}

impl Sketch for CircleField {
    fn name(&self) -> &'static str {
        "circle grid"
    }

    fn update(&mut self, ctx: &FrameCtx<'_>) {
        self.peaks = chunk_peaks(&ctx.audio.spectrum, self.chunks);
        for (i, &peak) in self.peaks.iter().enumerate() {
            self.population.spawn(peak, i, &self.shape, &self.offsets);
        }
        self.population.tick();
        self.drift();
    }

    fn paint(&self, _ctx: &FrameCtx<'_>, canvas: &mut Canvas) {
        canvas.clear(Rgba::BLACK);
        let (sx, sy) = virtual_scale(canvas);

        // This frame's peaks: one lattice of ellipses per chunk.
        for (i, &peak) in self.peaks.iter().enumerate() {
            let family = HueFamily::for_chunk(i);
            canvas.set_fill(Some(family.fill(peak, 1.0)));
            canvas.set_stroke(Some(family.stroke(peak, 1.0)));
            let d = self.shape.diameter(peak, i);
            for &(dx, dy) in &self.offsets {
                canvas.ellipse(
                    (self.origin.0 + dx) * sx,
                    (self.origin.1 + dy) * sy,
                    d * sx,
                    d * sy,
                );
            }
        }

        // Earlier frames' circles, still growing and fading.
        self.population.render(self.origin, |x, y, d, fill, stroke| {
            canvas.set_fill(Some(fill));
            canvas.set_stroke(Some(stroke));
            canvas.ellipse(x * sx, y * sy, d * sx, d * sy);
        });
    }
}
