pub mod attractor;
pub mod canvas;
pub mod curves;
pub mod effect;
pub mod fractal;
pub mod geometric;
pub mod kaleidoscope;
pub mod particles;
pub mod random;
pub mod voronoi;

use thiserror::Error;
use tracing::debug;

use attractor::AttractorSimulator;
use curves::CurveField;
use fractal::FractalRenderer;
use geometric::GeometricChaosField;
use kaleidoscope::Compositor;
use particles::ParticleSystem;
use voronoi::VoronoiField;

pub use canvas::{Canvas, Color, Surface};
pub use effect::OverlayEffect;
pub use random::{Bounds, RandomSource};

/// Largest accepted canvas side, in pixels.
pub const MAX_CANVAS_SIDE: usize = 8192;
/// Longest step simulated in one update; longer gaps are treated as a hitch.
pub const MAX_DT: f32 = 0.25;

pub const DRIVE_DECAY_PER_SEC: f32 = 3.0;
pub const BASE_EMISSION_PER_SEC: f32 = 12.0;
pub const DRIVE_EMISSION_PER_SEC: f32 = 240.0;
pub const DRIVE_SPEEDUP: f32 = 1.5;
pub const BURST_THRESHOLD: f32 = 0.6;
pub const BURST_SIZE: usize = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas { width: usize, height: usize },
    #[error("canvas {width}x{height} exceeds the {max}px side limit")]
    CanvasTooLarge { width: usize, height: usize, max: usize },
}

/// Discrete input delivered to the engine once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Regenerate,
    SpawnParticles(i32),
    SetKaleidoscopeSegments(i32),
    SetFractalDepth(i32),
    CycleOverlay,
    SetOverlay(OverlayEffect),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub segments: u32,
    pub fractal_depth: u32,
    pub particle_cap: usize,
    pub voronoi_seeds: usize,
    pub voronoi_cell: usize,
    pub trail_len: usize,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            segments: 6,
            fractal_depth: 5,
            particle_cap: 1000,
            voronoi_seeds: 24,
            voronoi_cell: 6,
            trail_len: 1000,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Clamps every tunable into its supported range. Size is validated
    /// separately by `ChaosEngine::new`.
    pub fn sanitized(mut self) -> Self {
        self.segments = self.segments.clamp(kaleidoscope::MIN_SEGMENTS, kaleidoscope::MAX_SEGMENTS);
        self.fractal_depth = self.fractal_depth.clamp(fractal::MIN_DEPTH, fractal::MAX_DEPTH);
        self.particle_cap = self.particle_cap.min(100_000);
        self.voronoi_seeds = self.voronoi_seeds.min(512);
        self.voronoi_cell = self.voronoi_cell.clamp(1, 64);
        self.trail_len = self.trail_len.clamp(2, 100_000);
        self
    }

    fn validate(&self) -> Result<(), EngineError> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyCanvas { width, height });
        }
        if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            return Err(EngineError::CanvasTooLarge {
                width,
                height,
                max: MAX_CANVAS_SIDE,
            });
        }
        Ok(())
    }
}

/// Read-only snapshot for HUDs and benchmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStats {
    pub particles: usize,
    pub seeds: usize,
    pub trail: usize,
    pub segments: u32,
    pub fractal_depth: u32,
    pub overlay: OverlayEffect,
    pub intensity: f32,
}

/// What a host needs from an engine: one update and one render per tick.
pub trait VisualEngine {
    fn update(&mut self, dt: f32, events: &[ControlEvent]);
    fn render(&mut self) -> &Canvas;
    fn set_intensity(&mut self, x: f32);
    fn stats(&self) -> EngineStats;
    fn size(&self) -> (usize, usize);
}

pub struct ChaosEngine {
    cfg: EngineConfig,
    rng: RandomSource,
    voronoi: VoronoiField,
    particles: ParticleSystem,
    attractor: AttractorSimulator,
    fractal: FractalRenderer,
    curves: CurveField,
    geometric: GeometricChaosField,
    compositor: Compositor,
    canvas: Canvas,
    overlay: OverlayEffect,
    phase: f32,
    drive: f32,
    emit_accum: f32,
}

impl ChaosEngine {
    pub fn new(cfg: EngineConfig) -> Result<Self, EngineError> {
        let cfg = cfg.sanitized();
        cfg.validate()?;
        let (w, h) = (cfg.width, cfg.height);
        let mut rng = RandomSource::new(cfg.seed);
        let voronoi = VoronoiField::new(cfg.voronoi_seeds, cfg.voronoi_cell, w, h, &mut rng);
        debug!(width = w, height = h, seed = rng.seed(), "engine created");
        Ok(Self {
            rng,
            voronoi,
            particles: ParticleSystem::new(cfg.particle_cap, w, h),
            attractor: AttractorSimulator::new(cfg.trail_len),
            fractal: FractalRenderer,
            curves: CurveField,
            geometric: GeometricChaosField,
            compositor: Compositor::new(w, h, cfg.segments),
            canvas: Canvas::new(w, h),
            overlay: OverlayEffect::None,
            phase: 0.0,
            drive: 0.0,
            emit_accum: 0.0,
            cfg,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn apply(&mut self, ev: &ControlEvent) {
        debug!(event = ?ev, "control event");
        match *ev {
            ControlEvent::Regenerate => self.voronoi.regenerate(&mut self.rng),
            ControlEvent::SpawnParticles(n) => {
                let n = n.max(0) as usize;
                self.particles.spawn(n, &mut self.rng);
            }
            ControlEvent::SetKaleidoscopeSegments(n) => {
                let n = n.clamp(kaleidoscope::MIN_SEGMENTS as i32, kaleidoscope::MAX_SEGMENTS as i32);
                self.compositor.set_segments(n as u32);
                self.cfg.segments = self.compositor.segments();
            }
            ControlEvent::SetFractalDepth(n) => {
                let n = n.clamp(fractal::MIN_DEPTH as i32, fractal::MAX_DEPTH as i32);
                self.cfg.fractal_depth = n as u32;
            }
            ControlEvent::CycleOverlay | ControlEvent::SetOverlay(_) => {
                self.overlay = self.overlay.transition(ev);
            }
        }
    }

    pub fn update(&mut self, dt: f32, events: &[ControlEvent]) {
        for ev in events {
            self.apply(ev);
        }
        let dt = sanitize_dt(dt);
        if dt == 0.0 {
            return;
        }

        self.phase += dt * (1.0 + DRIVE_SPEEDUP * self.drive);
        self.emit_accum += dt * (BASE_EMISSION_PER_SEC + DRIVE_EMISSION_PER_SEC * self.drive);
        let n = self.emit_accum.floor();
        self.emit_accum -= n;
        self.particles.spawn(n as usize, &mut self.rng);
        self.drive = (self.drive - DRIVE_DECAY_PER_SEC * dt).max(0.0);

        self.voronoi.advance(dt);
        self.particles.advance(dt);
        self.attractor.advance(dt);
    }

    pub fn render(&mut self) -> &Canvas {
        self.compositor.begin_frame();
        let layer = self.compositor.layer_mut();
        self.voronoi.render(layer);
        self.particles.render(layer);
        self.attractor.render(layer);
        self.fractal.render(layer, self.cfg.fractal_depth, self.phase);
        self.curves.render(layer, self.phase);
        self.geometric.render(layer, self.phase);
        self.compositor.compose(&mut self.canvas);
        self.overlay.apply(&mut self.canvas, self.phase);
        &self.canvas
    }

    /// Feeds host intensity in [0,1]. Raises the decaying drive level and
    /// fires a centre burst when it crosses the burst threshold upward.
    pub fn set_intensity(&mut self, x: f32) {
        let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 };
        let prev = self.drive;
        self.drive = self.drive.max(x);
        if prev < BURST_THRESHOLD && self.drive >= BURST_THRESHOLD {
            let (cx, cy) = (self.cfg.width as f32 * 0.5, self.cfg.height as f32 * 0.5);
            let n = self.particles.burst(cx, cy, BURST_SIZE, &mut self.rng);
            debug!(spawned = n, "intensity burst");
        }
    }

    pub fn intensity(&self) -> f32 {
        self.drive
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn seed_count(&self) -> usize {
        self.voronoi.len()
    }

    pub fn trail_len(&self) -> usize {
        self.attractor.len()
    }

    pub fn segments(&self) -> u32 {
        self.compositor.segments()
    }

    pub fn fractal_depth(&self) -> u32 {
        self.cfg.fractal_depth
    }

    pub fn overlay(&self) -> OverlayEffect {
        self.overlay
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn voronoi(&self) -> &VoronoiField {
        &self.voronoi
    }

    pub fn attractor(&self) -> &AttractorSimulator {
        &self.attractor
    }

    /// Pre-overlay layer from the last `render`.
    pub fn layer(&self) -> &Canvas {
        self.compositor.layer()
    }
}

impl VisualEngine for ChaosEngine {
    fn update(&mut self, dt: f32, events: &[ControlEvent]) {
        ChaosEngine::update(self, dt, events)
    }

    fn render(&mut self) -> &Canvas {
        ChaosEngine::render(self)
    }

    fn set_intensity(&mut self, x: f32) {
        ChaosEngine::set_intensity(self, x)
    }

    fn stats(&self) -> EngineStats {
        EngineStats {
            particles: self.particle_count(),
            seeds: self.seed_count(),
            trail: self.trail_len(),
            segments: self.segments(),
            fractal_depth: self.fractal_depth(),
            overlay: self.overlay,
            intensity: self.drive,
        }
    }

    fn size(&self) -> (usize, usize) {
        (self.cfg.width, self.cfg.height)
    }
}

fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt.min(MAX_DT) } else { 0.0 }
}
