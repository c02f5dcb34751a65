use std::time::{SystemTime, UNIX_EPOCH};

/// Axis-aligned rectangle in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Bounds {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            x1: w as f32,
            y1: h as f32,
        }
    }

    /// Shrinks every edge by `m`, never past the center.
    pub fn inset(self, m: f32) -> Self {
        let mx = m.min((self.x1 - self.x0) * 0.5).max(0.0);
        let my = m.min((self.y1 - self.y0) * 0.5).max(0.0);
        Self {
            x0: self.x0 + mx,
            y0: self.y0 + my,
            x1: self.x1 - mx,
            y1: self.y1 - my,
        }
    }

    pub fn expand(self, m: f32) -> Self {
        let m = m.max(0.0);
        Self {
            x0: self.x0 - m,
            y0: self.y0 - m,
            x1: self.x1 + m,
            y1: self.y1 + m,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    pub fn contains_strict(&self, x: f32, y: f32) -> bool {
        x > self.x0 && x < self.x1 && y > self.y0 && y < self.y1
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// Seedable scalar/point generator shared by every simulation.
pub struct RandomSource {
    rng: fastrand::Rng,
    seed: u64,
}

impl RandomSource {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            seed,
        }
    }

    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED_CA05);
        Self::with_seed(splitmix64(nanos))
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::with_seed(s),
            None => Self::from_time(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform in `[lo, hi)`. A degenerate or inverted range yields `lo`.
    pub fn next_float(&mut self, lo: f32, hi: f32) -> f32 {
        if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
            return lo;
        }
        let v = lo + self.rng.f32() * (hi - lo);
        // f32 rounding can land exactly on `hi`.
        if v >= hi { lo } else { v }
    }

    pub fn next_point(&mut self, bounds: Bounds) -> (f32, f32) {
        (
            self.next_float(bounds.x0, bounds.x1),
            self.next_float(bounds.y0, bounds.y1),
        )
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
