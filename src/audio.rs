use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::HeapRb;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f32::consts::PI;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Magnitude bins published per analysis window (half the FFT size).
pub const SPECTRUM_BINS: usize = 512;

/// One analyzer result: instantaneous loudness plus a magnitude spectrum in
/// the conventional 0..255 range, low frequencies first.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame {
    pub rms: f32,
    pub spectrum: [f32; SPECTRUM_BINS],
}

impl Default for AudioFrame {
    fn default() -> Self {
        Self {
            rms: 0.0,
            spectrum: [0.0; SPECTRUM_BINS],
        }
    }
}

/// Seqlock-published `AudioFrame`: the analyzer thread stores, the frame
/// loop loads, no locking on either side.
pub struct AtomicAudioFrame {
    seq: AtomicU64,
    rms: AtomicU32,
    spectrum: [AtomicU32; SPECTRUM_BINS],
}

impl AtomicAudioFrame {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            rms: AtomicU32::new(0),
            spectrum: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    pub fn store(&self, f: &AudioFrame) {
        self.seq.fetch_add(1, Ordering::Release); // odd => write in progress
        self.rms.store(f.rms.to_bits(), Ordering::Relaxed);
        for (dst, src) in self.spectrum.iter().zip(f.spectrum) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        self.seq.fetch_add(1, Ordering::Release); // even => stable
    }

    pub fn load(&self) -> AudioFrame {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                continue;
            }

            let rms = f32::from_bits(self.rms.load(Ordering::Relaxed));
            let mut spectrum = [0.0f32; SPECTRUM_BINS];
            for (dst, src) in spectrum.iter_mut().zip(self.spectrum.iter()) {
                *dst = f32::from_bits(src.load(Ordering::Relaxed));
            }

            let v2 = self.seq.load(Ordering::Acquire);
            if v1 == v2 {
                return AudioFrame { rms, spectrum };
            }
        }
    }
}

impl Default for AtomicAudioFrame {
    fn default() -> Self {
        Self::new()
    }
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

pub struct AudioSystem {
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    frame: Arc<AtomicAudioFrame>,
    pub sample_rate_hz: u32,
}

impl AudioSystem {
    pub fn new(device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb_capacity = (sample_rate_hz as usize).saturating_mul(4);
        let rb = HeapRb::<f32>::new(rb_capacity);
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let frame = Arc::new(AtomicAudioFrame::new());
        let frame_for_thread = Arc::clone(&frame);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| eprintln!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };

        stream.play().context("start input stream")?;

        let analyzer_handle = thread::spawn(move || {
            analyze_loop(&mut cons, &stop_for_thread, &frame_for_thread)
        });

        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            frame,
            sample_rate_hz,
        })
    }

    pub fn frames(&self) -> Arc<AtomicAudioFrame> {
        Arc::clone(&self.frame)
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyzer_handle.take() {
            let _ = h.join();
        }
    }
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> anyhow::Result<cpal::Device> {
    let devices = host
        .input_devices()
        .context("enumerate input devices")?
        .collect::<Vec<_>>();

    let want = device_query.map(|s| s.to_lowercase());
    if let Some(want) = want.as_deref() {
        if let Some(dev) = devices.iter().find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(want))
                .unwrap_or(false)
        }) {
            return Ok(dev.clone());
        }
        return Err(anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    for frame in data.chunks(channels) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = acc / channels as f32;
        let _ = prod.try_push(mono);
    }
}

fn analyze_loop(
    cons: &mut ringbuf::HeapCons<f32>,
    stop: &AtomicBool,
    frame: &AtomicAudioFrame,
) {
    let n = SPECTRUM_BINS * 2;
    let hop = n / 4;

    let mut scratch = vec![0.0f32; n];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;

    let hann = (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (n as f32)).cos())
        .collect::<Vec<_>>();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut fft_buf = vec![Complex { re: 0.0, im: 0.0 }; n];

    let mut rms_s = 0.0f32;
    let mut spectrum_s = [0.0f32; SPECTRUM_BINS];

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            scratch[write_pos] = s;
            write_pos = (write_pos + 1) % n;
            if filled < n {
                filled += 1;
            }
            since_last += 1;
            if filled == n && since_last >= hop {
                since_last = 0;

                let mut rms_acc = 0.0f32;
                for i in 0..n {
                    let s = scratch[(write_pos + i) % n];
                    rms_acc += s * s;
                    fft_buf[i].re = s * hann[i];
                    fft_buf[i].im = 0.0;
                }
                let rms = (rms_acc / n as f32).sqrt().clamp(0.0, 1.0);

                fft.process(&mut fft_buf);

                // Compress magnitudes into the 0..255 convention and smooth
                // across windows so the visuals don't flicker bin-to-bin.
                for (i, c) in fft_buf.iter().take(SPECTRUM_BINS).enumerate() {
                    let m = (c.re * c.re + c.im * c.im).sqrt();
                    let v = 255.0 * (m * 0.02).tanh();
                    spectrum_s[i] = spectrum_s[i] * 0.4 + v * 0.6;
                }
                rms_s = rms_s * 0.85 + rms * 0.15;

                frame.store(&AudioFrame {
                    rms: rms_s,
                    spectrum: spectrum_s,
                });
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
