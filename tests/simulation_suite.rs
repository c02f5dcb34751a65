use chaos_viewer::engine::attractor::AttractorSimulator;
use chaos_viewer::engine::curves::{CurveField, RATIOS, SAMPLES_PER_CURVE};
use chaos_viewer::engine::fractal::{FractalRenderer, MAX_DEPTH};
use chaos_viewer::engine::geometric::GeometricChaosField;
use chaos_viewer::engine::particles::{Particle, ParticleSystem};
use chaos_viewer::engine::voronoi::{VoronoiField, VoronoiPhase};
use chaos_viewer::engine::{Canvas, Color, RandomSource};

fn still_particle(x: f32, y: f32, life: f32) -> Particle {
    Particle {
        x,
        y,
        vx: 0.0,
        vy: 0.0,
        life,
        max_life: life,
        color: Color::WHITE,
        size: 3.0,
    }
}

// ── particles ───────────────────────────────────────────────────────────────

#[test]
fn spawn_truncates_to_capacity() {
    let mut rng = RandomSource::with_seed(1);
    let mut ps = ParticleSystem::new(1000, 640, 480);
    assert_eq!(ps.spawn(50, &mut rng), 50);
    assert_eq!(ps.len(), 50);

    let mut ps = ParticleSystem::new(1000, 640, 480);
    assert_eq!(ps.spawn(2000, &mut rng), 1000);
    assert_eq!(ps.len(), 1000);
    assert_eq!(ps.spawn(1, &mut rng), 0);
}

#[test]
fn full_pool_rejects_emit() {
    let mut ps = ParticleSystem::new(2, 64, 64);
    assert!(ps.emit(still_particle(1.0, 1.0, 1.0)));
    assert!(ps.emit(still_particle(2.0, 2.0, 1.0)));
    assert!(!ps.emit(still_particle(3.0, 3.0, 1.0)));
    assert_eq!(ps.len(), 2);
}

#[test]
fn expired_particle_is_not_drawn() {
    let mut ps = ParticleSystem::new(10, 64, 64);
    ps.emit(still_particle(32.0, 10.0, 0.5));
    ps.advance(0.5 + 1e-3);
    assert!(ps.is_empty());

    let mut canvas = Canvas::new(64, 64);
    ps.render(&mut canvas);
    assert_eq!(canvas.lit_pixels(), 0);
}

#[test]
fn particles_fade_with_life() {
    let mut ps = ParticleSystem::new(10, 64, 64);
    ps.emit(still_particle(32.0, 32.0, 1.0));
    let mut fresh = Canvas::new(64, 64);
    ps.render(&mut fresh);
    ps.advance(0.5);
    let mut faded = Canvas::new(64, 64);
    ps.render(&mut faded);
    let (x, y) = (ps.particles()[0].x as usize, ps.particles()[0].y as usize);
    assert!(faded.pixel(x, y)[0] < fresh.pixel(32, 32)[0]);
    assert!(faded.pixel(x, y)[0] > 0);
}

#[test]
fn particles_far_outside_are_culled() {
    let mut ps = ParticleSystem::new(10, 100, 100);
    let mut p = still_particle(50.0, 50.0, 10.0);
    p.vx = 10_000.0;
    ps.emit(p);
    ps.advance(0.1);
    assert!(ps.is_empty());
}

#[test]
fn particles_survive_non_finite_dt() {
    let mut ps = ParticleSystem::new(10, 64, 64);
    ps.emit(still_particle(32.0, 32.0, 2.0));
    for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -0.1, 0.0] {
        ps.advance(dt);
    }
    assert_eq!(ps.len(), 1);
    assert_eq!(ps.particles()[0], still_particle(32.0, 32.0, 2.0));
}

// ── attractor ───────────────────────────────────────────────────────────────

#[test]
fn trail_stays_bounded_and_finite() {
    let mut a = AttractorSimulator::new(1000);
    for _ in 0..100_000 {
        a.advance(0.01);
        assert!(a.len() <= a.capacity());
    }
    assert_eq!(a.len(), 1000);
    assert!(a.trail().all(|p| p.iter().all(|v| v.is_finite())));
    assert!(a.state().iter().all(|v| v.is_finite()));
    assert_eq!(a.resets(), 0);
}

#[test]
fn trail_evicts_oldest() {
    let mut a = AttractorSimulator::new(3);
    for _ in 0..3 {
        a.advance(0.01);
    }
    let second = *a.trail().nth(1).expect("three points");
    a.advance(0.01);
    assert_eq!(a.len(), 3);
    assert_eq!(*a.trail().next().expect("three points"), second);
}

#[test]
fn huge_step_is_clamped_to_a_short_integration() {
    let mut a = AttractorSimulator::new(8);
    a.advance(1.0e6);
    assert_eq!(a.len(), 1);
    assert!(a.state().iter().all(|v| v.is_finite()));
    assert_eq!(a.resets(), 0);

    let mut b = AttractorSimulator::new(8);
    b.advance(0.25);
    assert_eq!(a.state(), b.state());
}

#[test]
fn attractor_draws_after_two_points() {
    let mut a = AttractorSimulator::new(100);
    let mut canvas = Canvas::new(200, 200);
    a.advance(0.01);
    a.render(&mut canvas);
    assert_eq!(canvas.lit_pixels(), 0);
    for _ in 0..50 {
        a.advance(0.02);
    }
    a.render(&mut canvas);
    assert!(canvas.lit_pixels() > 0);
}

// ── voronoi ─────────────────────────────────────────────────────────────────

#[test]
fn seeds_start_strictly_inside_and_stay_inside() {
    let mut rng = RandomSource::with_seed(9);
    let mut v = VoronoiField::new(24, 6, 300, 200, &mut rng);
    for _ in 0..5 {
        v.regenerate(&mut rng);
        assert_eq!(v.phase(), VoronoiPhase::Seeded);
        assert_eq!(v.len(), 24);
        assert!(v.seeds().iter().all(|s| v.bounds().contains_strict(s.x, s.y)));
        for step in 0..600 {
            let dt = if step % 50 == 0 { 0.25 } else { 1.0 / 60.0 };
            v.advance(dt);
            assert!(v.seeds().iter().all(|s| v.bounds().contains(s.x, s.y)));
        }
        assert_eq!(v.phase(), VoronoiPhase::Evolving);
    }
}

#[test]
fn voronoi_ignores_non_finite_dt() {
    let mut rng = RandomSource::with_seed(21);
    let mut v = VoronoiField::new(12, 6, 120, 90, &mut rng);
    let before = v.seeds().to_vec();
    for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -1.0] {
        v.advance(dt);
    }
    assert_eq!(v.seeds(), &before[..]);
    assert_eq!(v.phase(), VoronoiPhase::Seeded);
}

#[test]
fn zero_seed_field_draws_nothing() {
    let mut rng = RandomSource::with_seed(2);
    let v = VoronoiField::new(0, 6, 64, 64, &mut rng);
    let mut canvas = Canvas::new(64, 64);
    v.render(&mut canvas);
    assert_eq!(canvas.lit_pixels(), 0);
    assert!(v.nearest(3.0, 3.0).is_none());
}

#[test]
fn voronoi_covers_the_canvas() {
    let mut rng = RandomSource::with_seed(5);
    let v = VoronoiField::new(8, 4, 64, 48, &mut rng);
    let mut canvas = Canvas::new(64, 48);
    v.render(&mut canvas);
    assert_eq!(canvas.lit_pixels(), 64 * 48);
}

// ── fractal ─────────────────────────────────────────────────────────────────

#[test]
fn leaf_count_is_three_to_the_depth() {
    for depth in 1..=5u32 {
        let leaves: Vec<_> = FractalRenderer.primitives(depth, 0.7, 800, 600).collect();
        assert_eq!(leaves.len(), 3usize.pow(depth));
        assert!(leaves.iter().all(|n| n.depth == depth));
    }
}

#[test]
fn size_floor_cuts_recursion_on_small_canvas() {
    let leaves: Vec<_> = FractalRenderer.primitives(MAX_DEPTH, 0.0, 16, 16).collect();
    assert!(!leaves.is_empty());
    assert!(leaves.len() < 3usize.pow(MAX_DEPTH));
    assert!(leaves.iter().all(|n| n.depth <= MAX_DEPTH));
}

#[test]
fn depth_request_is_clamped() {
    let n = FractalRenderer.primitives(40, 0.0, 800, 600).count();
    assert_eq!(n, 3usize.pow(MAX_DEPTH));
    let n = FractalRenderer.primitives(0, 0.0, 800, 600).count();
    assert_eq!(n, 3);
}

// ── curves & geometry ───────────────────────────────────────────────────────

#[test]
fn curves_are_a_pure_function_of_phase() {
    let a = CurveField.samples(1.5, 320, 240);
    let b = CurveField.samples(1.5, 320, 240);
    assert_eq!(a, b);
    assert_eq!(a.len(), RATIOS.len());
    assert!(a.iter().all(|c| c.points.len() == SAMPLES_PER_CURVE));
    assert_ne!(a, CurveField.samples(1.6, 320, 240));
}

#[test]
fn curves_stay_on_canvas() {
    for c in CurveField.samples(3.0, 320, 240) {
        for &(x, y) in &c.points {
            assert!((0.0..=320.0).contains(&x) && (0.0..=240.0).contains(&y));
        }
    }
}

#[test]
fn polygons_rotate_with_phase() {
    let a = GeometricChaosField::polygon(1, 4, 0.0, 200, 200);
    let b = GeometricChaosField::polygon(1, 4, 1.0, 200, 200);
    assert_eq!(a.len(), 4);
    assert_ne!(a, b);

    let mut canvas = Canvas::new(200, 200);
    GeometricChaosField.render(&mut canvas, 0.5);
    assert!(canvas.lit_pixels() > 0);
}
