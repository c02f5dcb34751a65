use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

/// Samples per analysis window.
pub const WINDOW: usize = 1024;
/// Mean absolute level (16-bit scale) below which input counts as silence.
pub const NOISE_GATE: f32 = 300.0;
/// Mean absolute level (16-bit scale) that maps to full intensity.
pub const FULL_SCALE: f32 = 2000.0;

/// Single-float mailbox between the analyzer thread and the frame loop.
pub struct AtomicIntensity {
    bits: AtomicU32,
}

impl AtomicIntensity {
    pub fn new() -> Self {
        Self {
            bits: AtomicU32::new(0.0f32.to_bits()),
        }
    }

    pub fn store(&self, v: f32) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for AtomicIntensity {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps one window of mono samples in [-1,1] to intensity in [0,1].
pub fn window_intensity(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples
        .iter()
        .filter(|s| s.is_finite())
        .map(|s| s.abs().min(1.0) * 32768.0)
        .sum();
    let level = sum / samples.len() as f32;
    if level <= NOISE_GATE {
        0.0
    } else {
        (level / FULL_SCALE).min(1.0)
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

/// Microphone capture publishing one intensity scalar.
pub struct AudioInput {
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    intensity: Arc<AtomicIntensity>,
    pub device_name: String,
    pub sample_rate_hz: u32,
}

impl AudioInput {
    pub fn new(device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let device_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = (supported.channels() as usize).max(1);
        let config: cpal::StreamConfig = supported.clone().into();

        let rb = HeapRb::<f32>::new((sample_rate_hz as usize).saturating_mul(2).max(WINDOW * 4));
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let intensity = Arc::new(AtomicIntensity::new());
        let intensity_for_thread = Arc::clone(&intensity);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| error!("audio stream error: {err}");

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
        info!(device = %device_name, sample_rate_hz, channels, "audio capture started");

        let analyzer_handle = thread::Builder::new()
            .name("audio-analyzer".to_string())
            .spawn(move || analyze_loop(&mut cons, &stop_for_thread, &intensity_for_thread))
            .context("spawn audio analyzer thread")?;

        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            intensity,
            device_name,
            sample_rate_hz,
        })
    }

    pub fn intensity(&self) -> Arc<AtomicIntensity> {
        Arc::clone(&self.intensity)
    }
}

impl Drop for AudioInput {
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

    if let Some(want) = device_query.map(|s| s.to_lowercase()) {
        if let Some(dev) = devices.iter().find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(&want))
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
        let acc: f32 = frame.iter().map(|s| s.to_float_sample()).sum();
        let _ = prod.try_push(acc / frame.len() as f32);
    }
}

fn analyze_loop(cons: &mut ringbuf::HeapCons<f32>, stop: &AtomicBool, out: &AtomicIntensity) {
    let mut window = Vec::with_capacity(WINDOW);
    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            window.push(s);
            if window.len() == WINDOW {
                out.store(window_intensity(&window));
                window.clear();
            }
        }
        if !got_any {
            thread::sleep(Duration::from_millis(2));
        }
    }
}
