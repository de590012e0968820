use audio_sketches::audio::{AudioFrame, SPECTRUM_BINS};
use audio_sketches::canvas::Canvas;
use audio_sketches::render::{AsciiRenderer, Frame, HalfBlockRenderer, Renderer};
use audio_sketches::sketch::{
    make_sketches, select_sketch, FrameCtx, RadialLoudness, RippleField, Sketch, HISTORY_LEN,
};

fn audio_with(rms: f32, bin_value: f32) -> AudioFrame {
    AudioFrame {
        rms,
        spectrum: [bin_value; SPECTRUM_BINS],
    }
}

fn ctx(audio: &AudioFrame) -> FrameCtx<'_> {
    FrameCtx {
        t: 1.0,
        dt: 1.0 / 60.0,
        audio,
    }
}

// ── Registry ────────────────────────────────────────────────────────────────

#[test]
fn registry_lists_all_four_sketches() {
    let sketches = make_sketches(10, 1024);
    let names: Vec<&str> = sketches.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        vec![
            "circle grid",
            "radial loudness",
            "spectrum curtain",
            "ripple field"
        ]
    );
}

#[test]
fn sketch_selection_by_index_and_name_fragment() {
    let sketches = make_sketches(10, 1024);
    assert_eq!(select_sketch(&Some("2".into()), &sketches), Some(2));
    assert_eq!(select_sketch(&Some("RADIAL".into()), &sketches), Some(1));
    assert_eq!(select_sketch(&Some("ripple".into()), &sketches), Some(3));
    assert_eq!(select_sketch(&Some("nope".into()), &sketches), None);
    assert_eq!(select_sketch(&Some("99".into()), &sketches), None);
    assert_eq!(select_sketch(&None, &sketches), None);
}

// ── Circle grid, end to end ────────────────────────────────────────────────

#[test]
fn circle_grid_paints_something_for_a_loud_spectrum() {
    let mut sketches = make_sketches(10, 1024);
    let audio = audio_with(0.5, 100.0);
    let mut canvas = Canvas::new(64, 32);

    for s in sketches.iter_mut() {
        s.on_resize(64, 32);
    }
    let sketch = &mut sketches[0];
    sketch.update(&ctx(&audio));
    sketch.paint(&ctx(&audio), &mut canvas);

    let lit = canvas.pixels().chunks_exact(4).any(|p| p[0] > 0 || p[1] > 0);
    assert!(lit, "a loud uniform spectrum should light up the canvas");
}

#[test]
fn circle_grid_survives_a_silent_spectrum() {
    let mut sketches = make_sketches(10, 64);
    let audio = audio_with(0.0, 0.0);
    let mut canvas = Canvas::new(32, 16);

    let sketch = &mut sketches[0];
    for _ in 0..30 {
        sketch.update(&ctx(&audio));
        sketch.paint(&ctx(&audio), &mut canvas);
    }
}

// ── Radial loudness ─────────────────────────────────────────────────────────

#[test]
fn radial_history_is_bounded_at_one_revolution() {
    let mut radial = RadialLoudness::new();
    let audio = audio_with(0.5, 0.0);
    for _ in 0..HISTORY_LEN + 40 {
        radial.update(&ctx(&audio));
    }
    assert_eq!(radial.history_len(), HISTORY_LEN);
}

#[test]
fn radial_paints_its_stroke_color() {
    let mut radial = RadialLoudness::new();
    let audio = audio_with(0.5, 0.0);
    for _ in 0..90 {
        radial.update(&ctx(&audio));
    }
    let mut canvas = Canvas::new(71, 50);
    radial.paint(&ctx(&audio), &mut canvas);

    let lit = canvas
        .pixels()
        .chunks_exact(4)
        .any(|p| p[0] == 255 && p[1] == 204);
    assert!(lit, "the loudness ring should be painted");
}

// ── Ripple field ────────────────────────────────────────────────────────────

#[test]
fn ripple_energy_decays_without_excitation() {
    let mut ripple = RippleField::new();
    ripple.on_resize(32, 32);
    ripple.excite(16, 16);
    ripple.step();
    let early = ripple.energy();
    assert!(early > 0.0, "excitation should inject energy");

    for _ in 0..200 {
        ripple.step();
    }
    assert!(
        ripple.energy() < early * 0.01,
        "damping should bleed the field dry"
    );
}

#[test]
fn ripple_ignores_updates_before_resize() {
    let mut ripple = RippleField::new();
    let audio = audio_with(0.9, 0.0);
    // No on_resize yet: must be a no-op, not an index panic.
    ripple.update(&ctx(&audio));
    assert_eq!(ripple.energy(), 0.0);
}

// ── Renderers ───────────────────────────────────────────────────────────────

fn frame<'a>(cols: u16, visual_rows: u16, pw: usize, ph: usize, pixels: &'a [u8]) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 1,
        visual_rows,
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        hud: "circle grid |  60.0 fps | rms 0.420",
        hud_rows: 1,
        sync_updates: true,
    }
}

fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
    buf
}

#[test]
fn halfblock_emits_truecolor_and_hud() {
    let pixels = solid_pixels(8, 8, 200, 100, 50);
    let f = frame(8, 4, 8, 8, &pixels);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\u{2580}"), "missing half-block glyph");
    assert!(s.contains("38;2;200;100;50"), "missing FG color");
    assert!(s.contains("48;2;200;100;50"), "missing BG color");
    assert!(s.contains("rms 0.420"), "missing HUD");
    assert!(s.contains("\x1b[?2026h") && s.contains("\x1b[?2026l"), "missing sync updates");
}

#[test]
fn ascii_emits_ramp_characters() {
    let pixels = solid_pixels(6, 3, 255, 255, 255);
    let f = frame(6, 3, 6, 3, &pixels);
    let mut out = Vec::new();
    AsciiRenderer::new().render(&f, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains('@'), "white pixels should map to the bright end");
}

#[test]
fn renderers_skip_degenerate_frames() {
    let pixels = solid_pixels(1, 1, 0, 0, 0);
    // Zero-size frame.
    let f = frame(0, 0, 0, 0, &pixels);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).unwrap();
    assert!(out.is_empty());

    // Pixel grid not matching the cell grid.
    let pixels = solid_pixels(4, 4, 0, 0, 0);
    let f = frame(4, 4, 4, 4, &pixels);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&f, &mut out).unwrap();
    assert!(out.is_empty(), "halfblock needs two pixel rows per cell");
}
