use std::collections::VecDeque;

use tracing::warn;

use super::canvas::{Color, Surface};

pub const SIGMA: f64 = 10.0;
pub const RHO: f64 = 28.0;
pub const BETA: f64 = 8.0 / 3.0;

/// Largest single RK4 step; longer `advance` calls are split.
pub const MAX_SUBSTEP: f64 = 0.005;
/// State magnitude past which the integration is treated as diverged.
pub const DIVERGENCE_BOUND: f64 = 1.0e3;
/// Longest span integrated by one `advance`; anything past it is dropped.
pub const MAX_ADVANCE: f64 = 0.25;

const START: [f64; 3] = [0.1, 0.0, 0.0];

/// Lorenz system integrated with RK4, keeping a fixed-capacity trail.
pub struct AttractorSimulator {
    state: [f64; 3],
    trail: VecDeque<[f32; 3]>,
    capacity: usize,
    resets: u64,
}

impl AttractorSimulator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: START,
            trail: VecDeque::with_capacity(capacity),
            capacity,
            resets: 0,
        }
    }

    pub fn state(&self) -> [f64; 3] {
        self.state
    }

    pub fn trail(&self) -> impl ExactSizeIterator<Item = &[f32; 3]> {
        self.trail.iter()
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Overwrites the integrator state; used to inject a perturbation.
    pub fn set_state(&mut self, s: [f64; 3]) {
        self.state = s;
    }

    pub fn advance(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        let dt = (dt as f64).min(MAX_ADVANCE);
        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as usize;
        let h = dt / steps as f64;
        for _ in 0..steps {
            self.state = rk4(self.state, h);
            if diverged(self.state) {
                warn!(state = ?self.state, "lorenz state diverged, resetting");
                self.state = START;
                self.resets += 1;
                break;
            }
        }
        if self.trail.len() == self.capacity {
            self.trail.pop_front();
        }
        let [x, y, z] = self.state;
        self.trail.push_back([x as f32, y as f32, z as f32]);
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let n = self.trail.len();
        if n < 2 {
            return;
        }
        let w = surface.width() as f32;
        let h = surface.height() as f32;
        let scale = w.min(h) / 60.0;
        let (cx, cy) = (w * 0.5, h * 0.5);
        let project = |p: &[f32; 3]| (cx + p[0] * scale, cy - (p[2] - 25.0) * scale);

        let mut prev = project(&self.trail[0]);
        for (i, p) in self.trail.iter().enumerate().skip(1) {
            let next = project(p);
            let t = i as f32 / (n - 1) as f32;
            let color = Color::from_hsv(0.55 + 0.45 * t, 0.8, 0.35 + 0.65 * t);
            surface.line(prev.0, prev.1, next.0, next.1, color);
            prev = next;
        }
    }
}

fn lorenz([x, y, z]: [f64; 3]) -> [f64; 3] {
    [SIGMA * (y - x), x * (RHO - z) - y, x * y - BETA * z]
}

fn rk4(s: [f64; 3], h: f64) -> [f64; 3] {
    let add = |a: [f64; 3], b: [f64; 3], k: f64| [a[0] + b[0] * k, a[1] + b[1] * k, a[2] + b[2] * k];
    let k1 = lorenz(s);
    let k2 = lorenz(add(s, k1, h * 0.5));
    let k3 = lorenz(add(s, k2, h * 0.5));
    let k4 = lorenz(add(s, k3, h));
    [
        s[0] + h / 6.0 * (k1[0] + 2.0 * k2[0] + 2.0 * k3[0] + k4[0]),
        s[1] + h / 6.0 * (k1[1] + 2.0 * k2[1] + 2.0 * k3[1] + k4[1]),
        s[2] + h / 6.0 * (k1[2] + 2.0 * k2[2] + 2.0 * k3[2] + k4[2]),
    ]
}

fn diverged(s: [f64; 3]) -> bool {
    s.iter().any(|v| !v.is_finite() || v.abs() > DIVERGENCE_BOUND)
}
