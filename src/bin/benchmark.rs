use std::time::{Duration, Instant};

use anyhow::Result;
use chaos_viewer::engine::{ChaosEngine, ControlEvent, EngineConfig, OverlayEffect};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "benchmark", about = "Per-frame cost of the chaos engine")]
struct Args {
    #[arg(long, default_value_t = 300)]
    frames: usize,

    #[arg(long = "w", default_value_t = 800)]
    w: usize,

    #[arg(long = "h", default_value_t = 600)]
    h: usize,

    #[arg(long, default_value_t = 6)]
    segments: u32,

    #[arg(long, default_value_t = 5)]
    fractal_depth: u32,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Fail when any section exceeds `--max-ms` per frame or renders black.
    #[arg(long, default_value_t = false)]
    ci_smoke: bool,

    #[arg(long, default_value_t = 16.0)]
    max_ms: f64,
}

/// Intensity curve with regular peaks so bursts and decay are exercised.
fn synth_intensity(step: usize) -> f32 {
    let t = step as f32 / 60.0;
    let pulse = if step % 90 < 6 { 0.9 } else { 0.0 };
    (0.25 + 0.2 * (t * 1.7).sin()).max(pulse)
}

struct Section {
    name: String,
    update: Duration,
    render: Duration,
    lit: usize,
}

fn bench_section(args: &Args, name: &str, segments: u32, overlay: OverlayEffect) -> Result<Section> {
    let mut engine = ChaosEngine::new(EngineConfig {
        width: args.w,
        height: args.h,
        segments,
        fractal_depth: args.fractal_depth,
        seed: Some(args.seed),
        ..EngineConfig::default()
    })?;
    engine.update(0.0, &[ControlEvent::SetOverlay(overlay), ControlEvent::SpawnParticles(200)]);

    let mut update = Duration::ZERO;
    let mut render = Duration::ZERO;
    let mut lit = 0usize;
    for f in 0..args.frames {
        let t0 = Instant::now();
        engine.set_intensity(synth_intensity(f));
        let events: &[ControlEvent] = if f % 120 == 119 { &[ControlEvent::Regenerate] } else { &[] };
        engine.update(1.0 / 60.0, events);
        let t1 = Instant::now();
        let canvas = engine.render();
        let t2 = Instant::now();
        if canvas.lit_pixels() > 0 {
            lit += 1;
        }
        update += t1 - t0;
        render += t2 - t1;
    }
    Ok(Section {
        name: name.to_string(),
        update,
        render,
        lit,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let frames = args.frames.max(1);

    println!(
        "chaos benchmark: frames={} size={}x{} depth={} seed={}",
        frames, args.w, args.h, args.fractal_depth, args.seed
    );

    let sections = [
        ("identity", 1, OverlayEffect::None),
        ("kaleidoscope", args.segments, OverlayEffect::None),
        ("rage", args.segments, OverlayEffect::Rage),
        ("emoji-party", args.segments, OverlayEffect::EmojiParty),
        ("psychedelic", args.segments, OverlayEffect::Psychedelic),
    ];

    let mut failures = Vec::new();
    for (name, segments, overlay) in sections {
        let s = bench_section(&args, name, segments, overlay)?;
        let update_ms = s.update.as_secs_f64() * 1000.0 / frames as f64;
        let render_ms = s.render.as_secs_f64() * 1000.0 / frames as f64;
        let total = update_ms + render_ms;
        println!(
            "{:<14} update {:>7.3} ms  render {:>7.3} ms  total {:>7.3} ms  lit={}/{}",
            s.name, update_ms, render_ms, total, s.lit, frames
        );
        if s.lit == 0 {
            failures.push(format!("{}: every frame black", s.name));
        }
        if args.ci_smoke && total > args.max_ms {
            failures.push(format!("{}: {:.3} ms/frame > {:.3}", s.name, total, args.max_ms));
        }
    }

    if args.ci_smoke {
        if !failures.is_empty() {
            eprintln!("CI smoke: FAIL");
            for f in &failures {
                eprintln!("  {f}");
            }
            anyhow::bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }
    Ok(())
}
