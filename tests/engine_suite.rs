use chaos_viewer::engine::{
    ChaosEngine, ControlEvent, EngineConfig, EngineError, OverlayEffect, VisualEngine, BURST_SIZE,
    MAX_CANVAS_SIDE,
};

fn engine(w: usize, h: usize, segments: u32) -> ChaosEngine {
    ChaosEngine::new(EngineConfig {
        width: w,
        height: h,
        segments,
        seed: Some(42),
        ..EngineConfig::default()
    })
    .expect("engine should build")
}

#[test]
fn rejects_empty_and_oversized_canvases() {
    let err = ChaosEngine::new(EngineConfig::with_size(0, 600)).err();
    assert_eq!(err, Some(EngineError::EmptyCanvas { width: 0, height: 600 }));

    let err = ChaosEngine::new(EngineConfig::with_size(640, MAX_CANVAS_SIDE + 1)).err();
    assert!(matches!(err, Some(EngineError::CanvasTooLarge { .. })));
}

#[test]
fn first_frame_is_lit_and_opaque() {
    let mut e = engine(800, 600, 1);
    e.update(1.0 / 60.0, &[]);
    let canvas = e.render();
    assert!(canvas.lit_pixels() > 0, "frame should not be blank");
    assert!(canvas.as_rgba().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn spawn_events_respect_capacity() {
    let mut e = engine(320, 240, 6);
    e.update(0.0, &[ControlEvent::SpawnParticles(50)]);
    assert_eq!(e.particle_count(), 50);
    e.update(0.0, &[ControlEvent::SpawnParticles(2000)]);
    assert_eq!(e.particle_count(), 1000);
    e.update(0.0, &[ControlEvent::SpawnParticles(-5)]);
    assert_eq!(e.particle_count(), 1000);
}

#[test]
fn negative_spawn_is_a_no_op() {
    let mut e = engine(320, 240, 6);
    e.update(0.0, &[ControlEvent::SpawnParticles(-50)]);
    assert_eq!(e.particle_count(), 0);
}

#[test]
fn segments_and_depth_are_clamped() {
    let mut e = engine(320, 240, 6);
    e.update(0.0, &[ControlEvent::SetKaleidoscopeSegments(0)]);
    assert_eq!(e.segments(), 1);
    e.update(0.0, &[ControlEvent::SetKaleidoscopeSegments(42)]);
    assert_eq!(e.segments(), 9);
    e.update(0.0, &[ControlEvent::SetFractalDepth(-3)]);
    assert_eq!(e.fractal_depth(), 1);
    e.update(0.0, &[ControlEvent::SetFractalDepth(99)]);
    assert_eq!(e.fractal_depth(), 7);
}

#[test]
fn config_is_sanitized_on_construction() {
    let e = ChaosEngine::new(EngineConfig {
        width: 64,
        height: 64,
        segments: 40,
        fractal_depth: 0,
        ..EngineConfig::default()
    })
    .expect("engine should build");
    assert_eq!(e.segments(), 9);
    assert_eq!(e.fractal_depth(), 1);
}

#[test]
fn bad_dt_leaves_state_untouched() {
    let mut e = engine(320, 240, 6);
    let before = e.voronoi().seeds().to_vec();
    e.update(f32::NAN, &[]);
    e.update(-1.0, &[]);
    e.update(f32::INFINITY, &[]);
    assert_eq!(e.trail_len(), 0);
    assert_eq!(e.particle_count(), 0);
    assert_eq!(e.voronoi().seeds(), &before[..]);
}

#[test]
fn long_hitch_is_simulated_as_one_clamped_step() {
    let mut e = engine(320, 240, 6);
    e.update(10.0, &[]);
    assert_eq!(e.trail_len(), 1);
    assert!((e.phase() - 0.25).abs() < 1e-6);
}

#[test]
fn intensity_crossing_fires_one_burst() {
    let mut e = engine(320, 240, 6);
    e.set_intensity(0.3);
    assert_eq!(e.particle_count(), 0);
    e.set_intensity(0.7);
    assert_eq!(e.particle_count(), BURST_SIZE);
    e.set_intensity(0.95);
    assert_eq!(e.particle_count(), BURST_SIZE);
}

#[test]
fn intensity_is_clamped_and_decays() {
    let mut e = engine(320, 240, 6);
    e.set_intensity(f32::NAN);
    assert_eq!(e.intensity(), 0.0);
    e.set_intensity(5.0);
    assert_eq!(e.intensity(), 1.0);
    e.update(0.1, &[]);
    assert!((e.intensity() - 0.7).abs() < 1e-4, "{}", e.intensity());
    e.update(0.25, &[]);
    assert_eq!(e.intensity(), 0.0);
}

#[test]
fn ambient_emission_follows_drive() {
    let mut calm = engine(320, 240, 6);
    let mut loud = engine(320, 240, 6);
    for _ in 0..30 {
        loud.set_intensity(0.5);
        calm.update(1.0 / 60.0, &[]);
        loud.update(1.0 / 60.0, &[]);
    }
    assert!(calm.particle_count() > 0);
    assert!(loud.particle_count() > calm.particle_count());
}

#[test]
fn regenerate_replaces_seeds() {
    let mut e = engine(320, 240, 6);
    let before = e.voronoi().seeds().to_vec();
    e.update(0.0, &[ControlEvent::Regenerate]);
    assert_eq!(e.seed_count(), before.len());
    assert_ne!(e.voronoi().seeds(), &before[..]);
}

#[test]
fn overlay_events_follow_transition() {
    let mut e = engine(320, 240, 6);
    assert_eq!(e.overlay(), OverlayEffect::None);
    e.update(0.0, &[ControlEvent::CycleOverlay, ControlEvent::CycleOverlay]);
    assert_eq!(e.overlay(), OverlayEffect::EmojiParty);
    e.update(0.0, &[ControlEvent::SetOverlay(OverlayEffect::None)]);
    assert_eq!(e.overlay(), OverlayEffect::None);
}

#[test]
fn no_overlay_single_segment_shows_layer_unchanged() {
    let mut e = engine(200, 150, 1);
    e.update(1.0 / 60.0, &[]);
    let shown = e.render().clone();
    assert_eq!(&shown, e.layer());
}

#[test]
fn rage_overlay_tints_red() {
    let mut e = engine(200, 150, 1);
    e.update(1.0 / 60.0, &[ControlEvent::SetOverlay(OverlayEffect::Rage)]);
    let shown = e.render().clone();
    let layer = e.layer();
    let mut redder = 0usize;
    for y in 0..150 {
        for x in 0..200 {
            let (a, b) = (layer.pixel(x, y), shown.pixel(x, y));
            assert!(b[0] >= a[0].saturating_sub(1));
            if b[0] > a[0] {
                redder += 1;
            }
        }
    }
    assert!(redder > 0);
}

#[test]
fn stats_mirror_getters() {
    let mut e = engine(320, 240, 4);
    e.update(0.0, &[ControlEvent::SpawnParticles(10)]);
    e.update(1.0 / 60.0, &[]);
    let s = e.stats();
    assert_eq!(s.particles, e.particle_count());
    assert_eq!(s.seeds, 24);
    assert_eq!(s.trail, 1);
    assert_eq!(s.segments, 4);
    assert_eq!(s.fractal_depth, 5);
    assert_eq!(e.size(), (320, 240));
}
