use std::f32::consts::TAU;

use super::canvas::{Color, Surface};
use super::random::{Bounds, RandomSource};

const GRAVITY: f32 = 18.0;
const DRAG: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub max_life: f32,
    pub color: Color,
    pub size: f32,
}

impl Particle {
    pub fn alive(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life fraction, clamped to [0,1].
    pub fn fade(&self) -> f32 {
        if self.max_life > 0.0 && self.max_life.is_finite() {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Fixed-capacity particle pool. Full pool rejects new particles instead of
/// evicting old ones.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    cap: usize,
    bounds: Bounds,
    margin: f32,
}

impl ParticleSystem {
    pub fn new(cap: usize, w: usize, h: usize) -> Self {
        let bounds = Bounds::new(w, h);
        Self {
            particles: Vec::with_capacity(cap.min(4096)),
            cap,
            margin: 0.25 * bounds.width().max(bounds.height()),
            bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Adds a particle unless the pool is full.
    pub fn emit(&mut self, p: Particle) -> bool {
        if self.particles.len() >= self.cap {
            return false;
        }
        self.particles.push(p);
        true
    }

    /// Spawns up to `n` particles at random positions; returns how many fit.
    pub fn spawn(&mut self, n: usize, rng: &mut RandomSource) -> usize {
        let n = n.min(self.cap.saturating_sub(self.particles.len()));
        for _ in 0..n {
            let (x, y) = rng.next_point(self.bounds);
            let p = random_particle(x, y, 20.0, 120.0, rng);
            self.particles.push(p);
        }
        n
    }

    /// Radial burst of up to `n` faster particles from one point.
    pub fn burst(&mut self, cx: f32, cy: f32, n: usize, rng: &mut RandomSource) -> usize {
        let n = n.min(self.cap.saturating_sub(self.particles.len()));
        for _ in 0..n {
            let p = random_particle(cx, cy, 120.0, 320.0, rng);
            self.particles.push(p);
        }
        n
    }

    pub fn advance(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let damp = (1.0 - DRAG * dt).max(0.0);
        for p in &mut self.particles {
            p.vy += GRAVITY * dt;
            p.vx *= damp;
            p.vy *= damp;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.life -= dt;
        }
        let b = self.bounds.expand(self.margin);
        self.particles.retain(|p| {
            p.alive() && p.x.is_finite() && p.y.is_finite() && b.contains(p.x, p.y)
        });
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        for p in &self.particles {
            let a = p.fade() * p.color.a as f32 / 255.0;
            surface.fill_circle(p.x, p.y, p.size, p.color.with_alpha(a));
        }
    }
}

fn random_particle(x: f32, y: f32, min_speed: f32, max_speed: f32, rng: &mut RandomSource) -> Particle {
    let angle = rng.next_float(0.0, TAU);
    let speed = rng.next_float(min_speed, max_speed);
    let life = rng.next_float(1.5, 4.0);
    Particle {
        x,
        y,
        vx: angle.cos() * speed,
        vy: angle.sin() * speed,
        life,
        max_life: life,
        color: Color::from_hsv(rng.next_float(0.0, 1.0), 0.85, 1.0),
        size: rng.next_float(1.5, 4.0),
    }
}
