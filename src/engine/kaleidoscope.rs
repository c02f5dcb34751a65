use std::f32::consts::TAU;

use super::canvas::{Canvas, Color, Surface};

pub const MIN_SEGMENTS: u32 = 1;
pub const MAX_SEGMENTS: u32 = 9;

/// Layer pixel that feeds output pixel `(x, y)` under `n`-fold mirroring about
/// the canvas centre. Wedge 0 maps to itself; wedge k>0 samples wedge 0 at the
/// same radius, mirrored for odd k.
pub fn kaleidoscope_source(x: usize, y: usize, w: usize, h: usize, n: u32) -> (usize, usize) {
    let n = n.clamp(MIN_SEGMENTS, MAX_SEGMENTS);
    if n == 1 || w == 0 || h == 0 {
        return (x, y);
    }
    let (cx, cy) = (w as f32 * 0.5, h as f32 * 0.5);
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    let wedge = TAU / n as f32;
    let theta = dy.atan2(dx).rem_euclid(TAU);
    let k = ((theta / wedge).floor() as u32).min(n - 1);
    if k == 0 {
        return (x, y);
    }
    let mut local = theta - k as f32 * wedge;
    if k % 2 == 1 {
        local = wedge - local;
    }
    let local = local.clamp(0.0, wedge);
    let r = (dx * dx + dy * dy).sqrt();
    let sx = (cx + r * local.cos()).floor().clamp(0.0, (w - 1) as f32) as usize;
    let sy = (cy + r * local.sin()).floor().clamp(0.0, (h - 1) as f32) as usize;
    (sx, sy)
}

/// Owns the off-screen layer every generator draws into, and mirrors it onto
/// the visible canvas.
pub struct Compositor {
    layer: Canvas,
    segments: u32,
    map: Vec<u32>,
    map_key: Option<(usize, usize, u32)>,
}

impl Compositor {
    pub fn new(w: usize, h: usize, segments: u32) -> Self {
        Self {
            layer: Canvas::new(w, h),
            segments: segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS),
            map: Vec::new(),
            map_key: None,
        }
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Picked up by the next `compose`.
    pub fn set_segments(&mut self, n: u32) {
        self.segments = n.clamp(MIN_SEGMENTS, MAX_SEGMENTS);
    }

    pub fn layer(&self) -> &Canvas {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut Canvas {
        &mut self.layer
    }

    pub fn begin_frame(&mut self) {
        self.layer.clear(Color::BLACK);
    }

    pub fn compose(&mut self, out: &mut Canvas) {
        let (w, h) = (self.layer.width(), self.layer.height());
        if out.width() != w || out.height() != h {
            return;
        }
        if self.segments == 1 {
            out.copy_from(&self.layer);
            return;
        }
        self.ensure_map(w, h);
        let src = self.layer.as_rgba();
        let dst = out.as_rgba_mut();
        for (i, &s) in self.map.iter().enumerate() {
            let (d, s) = (i * 4, s as usize * 4);
            dst[d..d + 4].copy_from_slice(&src[s..s + 4]);
        }
    }

    fn ensure_map(&mut self, w: usize, h: usize) {
        let key = (w, h, self.segments);
        if self.map_key == Some(key) {
            return;
        }
        self.map.clear();
        self.map.reserve(w * h);
        for y in 0..h {
            for x in 0..w {
                let (sx, sy) = kaleidoscope_source(x, y, w, h, self.segments);
                self.map.push((sy * w + sx) as u32);
            }
        }
        self.map_key = Some(key);
    }
}
