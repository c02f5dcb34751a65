use crate::audio::{AtomicIntensity, AudioInput};
use crate::config::{Config, RendererMode};
use crate::engine::{ChaosEngine, ControlEvent, EngineStats, OverlayEffect, VisualEngine};
use crate::prefs::{prefs_storage_path, AppPrefs};
use crate::render::{AsciiRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::terminal::{canvas_size, TerminalGuard};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const HUD_ROWS: u16 = 1;
const SPAWN_ON_SPACE: i32 = 50;

/// What a key press asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Quit,
    ToggleFps,
    ToggleInfo,
    /// Relative fractal depth change, resolved against the current depth.
    DepthStep(i32),
    Engine(ControlEvent),
}

pub fn map_key(code: KeyCode, mods: KeyModifiers) -> Option<KeyAction> {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Some(KeyAction::Quit);
    }
    let action = match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('f') | KeyCode::Char('F') => KeyAction::ToggleFps,
        KeyCode::Char('i') | KeyCode::Char('I') => KeyAction::ToggleInfo,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Engine(ControlEvent::Regenerate),
        KeyCode::Char(' ') => KeyAction::Engine(ControlEvent::SpawnParticles(SPAWN_ON_SPACE)),
        KeyCode::Char('e') | KeyCode::Char('E') => KeyAction::Engine(ControlEvent::CycleOverlay),
        KeyCode::Char('0') => KeyAction::Engine(ControlEvent::SetOverlay(OverlayEffect::None)),
        KeyCode::Char(c @ '1'..='9') => {
            KeyAction::Engine(ControlEvent::SetKaleidoscopeSegments(c as i32 - '0' as i32))
        }
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => KeyAction::DepthStep(1),
        KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Down => KeyAction::DepthStep(-1),
        _ => return None,
    };
    Some(action)
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let prefs_path = prefs_storage_path();
    let mut prefs = match AppPrefs::load(prefs_path.as_deref()) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable prefs");
            AppPrefs::default()
        }
    };
    if let Some(s) = cfg.segments {
        prefs.segments = s.clamp(1, 9);
    }
    if let Some(d) = cfg.fractal_depth {
        prefs.fractal_depth = d.clamp(1, 7);
    }

    // Held for the whole session; dropping it stops capture.
    let audio = if cfg.no_audio {
        None
    } else {
        match AudioInput::new(cfg.device.as_deref()) {
            Ok(a) => Some(a),
            Err(err) => {
                warn!(error = %err, "audio unavailable, running without microphone");
                None
            }
        }
    };
    let intensity = audio
        .as_ref()
        .map(|a| a.intensity())
        .unwrap_or_else(|| Arc::new(AtomicIntensity::new()));

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
    };
    let per_cell = cfg.renderer.pixels_per_cell();

    let mut last_size = TerminalGuard::size()?;
    let mut engine = build_engine(&cfg, last_size, per_cell, prefs.segments, prefs.fractal_depth)?;
    info!(
        renderer = renderer.name(),
        seed = engine.seed(),
        audio = audio.is_some(),
        "chaos viewer started"
    );

    let mut show_fps = prefs.show_fps;
    let mut show_info = prefs.show_info;
    let mut fps = FpsCounter::new();
    let mut last_frame = Instant::now();
    let mut events: Vec<ControlEvent> = Vec::new();

    'frames: loop {
        let now = Instant::now();
        events.clear();

        while event::poll(Duration::from_millis(0)).context("poll terminal events")? {
            match event::read().context("read terminal event")? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match map_key(k.code, k.modifiers) {
                        Some(KeyAction::Quit) => break 'frames,
                        Some(KeyAction::ToggleFps) => show_fps = !show_fps,
                        Some(KeyAction::ToggleInfo) => show_info = !show_info,
                        Some(KeyAction::DepthStep(d)) => {
                            let depth = engine.fractal_depth() as i32 + d;
                            events.push(ControlEvent::SetFractalDepth(depth));
                        }
                        Some(KeyAction::Engine(ev)) => events.push(ev),
                        None => {}
                    }
                }
                Event::Resize(c, r) => {
                    if (c, r) != last_size {
                        last_size = (c, r);
                        engine = rebuild_engine(&cfg, &engine, last_size, per_cell)?;
                    }
                }
                _ => {}
            }
        }

        // Resize events can be missed by some terminals.
        let sz = crossterm::terminal::size().context("get terminal size")?;
        if sz != last_size {
            last_size = sz;
            engine = rebuild_engine(&cfg, &engine, last_size, per_cell)?;
        }

        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        let level = intensity.load();
        engine.set_intensity(level);
        engine.update(dt, &events);
        let stats = VisualEngine::stats(&engine);
        let (pw, ph) = VisualEngine::size(&engine);

        let (term_cols, term_rows) = last_size;
        let hud = build_hud(term_cols as usize, show_fps.then(|| fps.fps()), &stats, level);
        let info_text = show_info.then(|| info_popup_text(&stats, engine.seed()));
        let visual_rows = term_rows.saturating_sub(HUD_ROWS).max(1);

        let canvas = engine.render();
        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: pw,
            pixel_height: ph,
            pixels_rgba: canvas.as_rgba(),
            hud: &hud,
            hud_rows: HUD_ROWS.min(term_rows.saturating_sub(1)),
            overlay: info_text.as_deref(),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out).context("write frame")?;
        fps.tick();

        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }

    let prefs = AppPrefs {
        segments: engine.segments(),
        fractal_depth: engine.fractal_depth(),
        show_fps,
        show_info,
    };
    if let Err(err) = prefs.save(prefs_path.as_deref()) {
        warn!(error = %err, "failed to save prefs");
    }
    info!("chaos viewer stopped");
    Ok(())
}

fn build_engine(
    cfg: &Config,
    size: (u16, u16),
    per_cell: (usize, usize),
    segments: u32,
    fractal_depth: u32,
) -> anyhow::Result<ChaosEngine> {
    let (w, h) = canvas_size(size.0, size.1, HUD_ROWS, per_cell);
    ChaosEngine::new(cfg.to_engine_config(w, h, segments, fractal_depth))
        .with_context(|| format!("create engine for {w}x{h} canvas"))
}

/// New engine at the new size, carrying the runtime settings.
fn rebuild_engine(
    cfg: &Config,
    old: &ChaosEngine,
    size: (u16, u16),
    per_cell: (usize, usize),
) -> anyhow::Result<ChaosEngine> {
    let mut engine = build_engine(cfg, size, per_cell, old.segments(), old.fractal_depth())?;
    engine.update(0.0, &[ControlEvent::SetOverlay(old.overlay())]);
    debug!(cols = size.0, rows = size.1, "engine rebuilt after resize");
    Ok(engine)
}

pub fn build_hud(cols: usize, fps: Option<f32>, stats: &EngineStats, mic: f32) -> String {
    let mut parts = Vec::with_capacity(8);
    if let Some(fps) = fps {
        parts.push(format!("{fps:>5.1} fps"));
    }
    parts.push(format!("particles {}", stats.particles));
    parts.push(format!("attractor {}", stats.trail));
    parts.push(format!("segments {}", stats.segments));
    parts.push(format!("depth {}", stats.fractal_depth));
    parts.push(format!("overlay {}", stats.overlay.label()));
    parts.push(format!("mic {}", level_bar(mic, 8)));
    let line = parts.join(" | ");
    line.chars().take(cols).collect()
}

fn level_bar(v: f32, width: usize) -> String {
    let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (v * width as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn info_popup_text(stats: &EngineStats, seed: u64) -> String {
    format!(
        "Chaos Viewer\n\
         particles: {}\n\
         attractor points: {}\n\
         voronoi seeds: {}\n\
         kaleidoscope segments: {}\n\
         fractal depth: {}\n\
         overlay: {}\n\
         drive: {:.2}\n\
         seed: {seed}\n\
         \n\
         r regenerate | space spawn | 1-9 segments | +/- depth\n\
         e overlay | 0 clear | f fps | i info | q quit",
        stats.particles,
        stats.trail,
        stats.seeds,
        stats.segments,
        stats.fractal_depth,
        stats.overlay.label(),
        stats.intensity,
    )
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
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
