use crate::audio::AudioSystem;
use crate::canvas::Canvas;
use crate::config::{Config, RendererMode};
use crate::render::{AsciiRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::sketch::{make_sketches, select_sketch, FrameCtx, Sketch};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = match cfg.renderer {
        RendererMode::HalfBlock => (1usize, 2usize),
        RendererMode::Ascii => (1usize, 1usize),
    };

    let audio = AudioSystem::new(cfg.device.as_deref()).context("start audio capture")?;
    let frames = audio.frames();

    let mut sketches = make_sketches(cfg.chunks, cfg.max_circles);
    let mut active = select_sketch(&cfg.sketch, &sketches).unwrap_or(0);

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut show_hud = true;
    let mut hud_rows: u16 = 1;
    let mut canvas = Canvas::new(0, 0);
    resize_all(
        &mut canvas,
        &mut sketches,
        last_size,
        px_w_mul,
        px_h_mul,
        hud_rows,
    );

    let start = Instant::now();
    let mut last_frame = start;
    let mut fps = FpsCounter::new();

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let old_hud = show_hud;
                    if handle_key(
                        k.code,
                        k.modifiers,
                        &mut active,
                        sketches.len(),
                        &mut show_hud,
                    ) {
                        return Ok(());
                    }
                    if show_hud != old_hud {
                        hud_rows = if show_hud { 1 } else { 0 };
                        resize_all(
                            &mut canvas,
                            &mut sketches,
                            last_size,
                            px_w_mul,
                            px_h_mul,
                            hud_rows,
                        );
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    resize_all(
                        &mut canvas,
                        &mut sketches,
                        last_size,
                        px_w_mul,
                        px_h_mul,
                        hud_rows,
                    );
                }
                _ => {}
            }
        }

        // Resize events can be missed in some terminals; check once per frame.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
            resize_all(
                &mut canvas,
                &mut sketches,
                last_size,
                px_w_mul,
                px_h_mul,
                hud_rows,
            );
        }

        let dt = now.duration_since(last_frame).as_secs_f32().max(1e-6);
        last_frame = now;

        let audio_frame = frames.load();
        let ctx = FrameCtx {
            t: now.duration_since(start).as_secs_f32(),
            dt,
            audio: &audio_frame,
        };

        let sketch = &mut sketches[active];
        sketch.update(&ctx);
        sketch.paint(&ctx, &mut canvas);

        let hud = if show_hud {
            format!(
                "{} | {:5.1} fps | rms {:.3} | {} | \u{2190}/\u{2192} sketch  i hud  q quit",
                sketch.name(),
                fps.fps(),
                audio_frame.rms,
                renderer.name()
            )
        } else {
            String::new()
        };

        let (term_cols, term_rows) = last_size;
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: canvas.width(),
            pixel_height: canvas.height(),
            pixels_rgba: canvas.pixels(),
            hud: &hud,
            hud_rows,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn resize_all(
    canvas: &mut Canvas,
    sketches: &mut [Box<dyn Sketch>],
    size: (u16, u16),
    px_w_mul: usize,
    px_h_mul: usize,
    hud_rows: u16,
) {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    let w = (cols as usize).saturating_mul(px_w_mul);
    let h = (visual_rows as usize).saturating_mul(px_h_mul);
    canvas.resize(w, h);
    for s in sketches.iter_mut() {
        s.on_resize(w, h);
    }
}

/// Returns true when the app should quit.
fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    active: &mut usize,
    sketch_count: usize,
    show_hud: &mut bool,
) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Left => {
            *active = (*active + sketch_count - 1) % sketch_count;
            false
        }
        KeyCode::Right => {
            *active = (*active + 1) % sketch_count;
            false
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            *show_hud = !*show_hud;
            false
        }
        _ => false,
    }
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
