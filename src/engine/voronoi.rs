use super::canvas::{Color, Surface};
use super::random::{Bounds, RandomSource};

const MAX_SEED_SPEED: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoronoiPhase {
    Seeded,
    Evolving,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoronoiSeed {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub hue: f32,
}

/// Drifting seed points rendered as a nearest-seed tessellation.
///
/// The tessellation is approximate: one nearest-seed lookup per `cell` x `cell`
/// block rather than per pixel.
pub struct VoronoiField {
    seeds: Vec<VoronoiSeed>,
    count: usize,
    cell: usize,
    w: f32,
    h: f32,
    phase: VoronoiPhase,
}

impl VoronoiField {
    pub fn new(count: usize, cell: usize, w: usize, h: usize, rng: &mut RandomSource) -> Self {
        let mut field = Self {
            seeds: Vec::with_capacity(count),
            count,
            cell: cell.max(1),
            w: w as f32,
            h: h as f32,
            phase: VoronoiPhase::Seeded,
        };
        field.regenerate(rng);
        field
    }

    pub fn regenerate(&mut self, rng: &mut RandomSource) {
        let inner = Bounds {
            x0: 0.0,
            y0: 0.0,
            x1: self.w,
            y1: self.h,
        }
        .inset(1.0);
        self.seeds.clear();
        for _ in 0..self.count {
            let (x, y) = rng.next_point(inner);
            self.seeds.push(VoronoiSeed {
                x,
                y,
                vx: rng.next_float(-MAX_SEED_SPEED, MAX_SEED_SPEED),
                vy: rng.next_float(-MAX_SEED_SPEED, MAX_SEED_SPEED),
                hue: rng.next_float(0.0, 1.0),
            });
        }
        self.phase = VoronoiPhase::Seeded;
    }

    pub fn advance(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        for s in &mut self.seeds {
            (s.x, s.vx) = bounce(s.x + s.vx * dt, s.vx, self.w);
            (s.y, s.vy) = bounce(s.y + s.vy * dt, s.vy, self.h);
        }
        self.phase = VoronoiPhase::Evolving;
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.seeds.is_empty() {
            return;
        }
        let c = self.cell;
        let (w, h) = (surface.width(), surface.height());
        for gy in (0..h).step_by(c) {
            let cy = gy as f32 + c as f32 * 0.5;
            for gx in (0..w).step_by(c) {
                let cx = gx as f32 + c as f32 * 0.5;
                if let Some(seed) = self.nearest(cx, cy) {
                    let color = Color::from_hsv(seed.hue, 0.65, 0.28);
                    surface.fill_rect(gx as i32, gy as i32, c, c, color);
                }
            }
        }
        for s in &self.seeds {
            surface.fill_circle(s.x, s.y, 1.5, Color::from_hsv(s.hue, 0.3, 1.0));
        }
    }

    pub fn nearest(&self, x: f32, y: f32) -> Option<&VoronoiSeed> {
        self.seeds.iter().min_by(|a, b| {
            let da = (a.x - x).powi(2) + (a.y - y).powi(2);
            let db = (b.x - x).powi(2) + (b.y - y).powi(2);
            da.total_cmp(&db)
        })
    }

    pub fn seeds(&self) -> &[VoronoiSeed] {
        &self.seeds
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn phase(&self) -> VoronoiPhase {
        self.phase
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            x0: 0.0,
            y0: 0.0,
            x1: self.w,
            y1: self.h,
        }
    }
}

/// Reflects `pos` back into `[0, limit]`, flipping velocity on contact.
fn bounce(pos: f32, vel: f32, limit: f32) -> (f32, f32) {
    if !pos.is_finite() {
        return (limit * 0.5, -vel);
    }
    if pos < 0.0 {
        ((-pos).min(limit), vel.abs())
    } else if pos > limit {
        ((2.0 * limit - pos).max(0.0), -vel.abs())
    } else {
        (pos, vel)
    }
}
