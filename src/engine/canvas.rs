#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Hue wraps; saturation/value are clamped to [0,1].
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let [r, g, b] = hsv_to_rgb(h, s, v);
        Self::rgb(r, g, b)
    }

    /// Replaces alpha with `a` in [0,1]; non-finite alpha is treated as transparent.
    pub fn with_alpha(self, a: f32) -> Self {
        let a = if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            a: (a * 255.0).round() as u8,
            ..self
        }
    }
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    if !h.is_finite() || !s.is_finite() || !v.is_finite() {
        return [0, 0, 0];
    }
    let h = fract01(h) * 6.0;
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [
        (r.clamp(0.0, 1.0) * 255.0) as u8,
        (g.clamp(0.0, 1.0) * 255.0) as u8,
        (b.clamp(0.0, 1.0) * 255.0) as u8,
    ]
}

pub fn fract01(x: f32) -> f32 {
    let f = x - x.floor();
    if f < 0.0 { f + 1.0 } else { f }
}

/// Drawing target for every generator.
///
/// Implementors only provide size and a single blended pixel write; the
/// primitives are built on top and silently drop non-finite geometry so a bad
/// float never turns into a garbage frame.
pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn blend_pixel(&mut self, x: i32, y: i32, c: Color);

    fn plot(&mut self, x: f32, y: f32, c: Color) {
        if x.is_finite() && y.is_finite() {
            self.blend_pixel(x.floor() as i32, y.floor() as i32, c);
        }
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, c: Color) {
        let w = self.width() as f32;
        let h = self.height() as f32;
        let Some(((x0, y0), (x1, y1))) = clip_segment((x0, y0), (x1, y1), (-1.0, -1.0), (w + 1.0, h + 1.0))
        else {
            return;
        };
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        let sx = dx / steps as f32;
        let sy = dy / steps as f32;
        let mut x = x0;
        let mut y = y0;
        for _ in 0..=steps {
            self.blend_pixel(x.floor() as i32, y.floor() as i32, c);
            x += sx;
            y += sy;
        }
    }

    fn polyline(&mut self, pts: &[(f32, f32)], c: Color) {
        for seg in pts.windows(2) {
            self.line(seg[0].0, seg[0].1, seg[1].0, seg[1].1, c);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, c: Color) {
        let x_end = (x.saturating_add(w as i32)).min(self.width() as i32);
        let y_end = (y.saturating_add(h as i32)).min(self.height() as i32);
        for yy in y.max(0)..y_end {
            for xx in x.max(0)..x_end {
                self.blend_pixel(xx, yy, c);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, c: Color) {
        if !cx.is_finite() || !cy.is_finite() || !r.is_finite() {
            return;
        }
        if r < 0.75 {
            self.plot(cx, cy, c);
            return;
        }
        let w = self.width() as i32;
        let h = self.height() as i32;
        let y_lo = ((cy - r).floor() as i32).max(0);
        let y_hi = ((cy + r).ceil() as i32).min(h - 1);
        let x_lo = ((cx - r).floor() as i32).max(0);
        let x_hi = ((cx + r).ceil() as i32).min(w - 1);
        let r2 = r * r;
        for y in y_lo..=y_hi {
            let dy = y as f32 + 0.5 - cy;
            for x in x_lo..=x_hi {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, c);
                }
            }
        }
    }

    /// Even-odd scanline fill sampled at pixel centers.
    fn fill_polygon(&mut self, pts: &[(f32, f32)], c: Color) {
        if pts.len() < 3 || pts.iter().any(|p| !p.0.is_finite() || !p.1.is_finite()) {
            return;
        }
        let h = self.height() as i32;
        let w = self.width() as i32;
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for p in pts {
            min_y = min_y.min(p.1);
            max_y = max_y.max(p.1);
        }
        let y_lo = (min_y.floor() as i32).max(0);
        let y_hi = (max_y.ceil() as i32).min(h - 1);
        let mut xs: Vec<f32> = Vec::with_capacity(pts.len());
        for y in y_lo..=y_hi {
            let sy = y as f32 + 0.5;
            xs.clear();
            for i in 0..pts.len() {
                let (ax, ay) = pts[i];
                let (bx, by) = pts[(i + 1) % pts.len()];
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    xs.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
            xs.sort_by(f32::total_cmp);
            for span in xs.chunks_exact(2) {
                let x_lo = ((span[0] - 0.5).ceil() as i32).max(0);
                let x_hi = ((span[1] - 0.5).floor() as i32).min(w - 1);
                for x in x_lo..=x_hi {
                    self.blend_pixel(x, y, c);
                }
            }
        }
    }
}

/// Liang-Barsky clip of `a`-`b` against the box `lo`..`hi`; `None` when the
/// segment misses the box or is non-finite. Worked in f64 so far-off endpoints
/// still land on the right pixel.
fn clip_segment(
    a: (f32, f32),
    b: (f32, f32),
    lo: (f32, f32),
    hi: (f32, f32),
) -> Option<((f32, f32), (f32, f32))> {
    if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
        return None;
    }
    let (x0, y0) = (a.0 as f64, a.1 as f64);
    let dx = b.0 as f64 - x0;
    let dy = b.1 as f64 - y0;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, x0 - lo.0 as f64),
        (dx, hi.0 as f64 - x0),
        (-dy, y0 - lo.1 as f64),
        (dy, hi.1 as f64 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        ((x0 + t0 * dx) as f32, (y0 + t0 * dy) as f32),
        ((x0 + t1 * dx) as f32, (y0 + t1 * dy) as f32),
    ))
}

/// Opaque RGBA8 frame buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    w: usize,
    h: usize,
    data: Vec<u8>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        let mut c = Self {
            w,
            h,
            data: vec![0; w.saturating_mul(h).saturating_mul(4)],
        };
        c.clear(Color::BLACK);
        c
    }

    pub fn clear(&mut self, c: Color) {
        for px in self.data.chunks_exact_mut(4) {
            px[0] = c.r;
            px[1] = c.g;
            px[2] = c.b;
            px[3] = 255;
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        if x >= self.w || y >= self.h {
            return [0, 0, 0, 0];
        }
        let i = (y * self.w + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn copy_from(&mut self, other: &Canvas) {
        if self.data.len() == other.data.len() {
            self.data.copy_from_slice(&other.data);
        }
    }

    /// Pixels with any non-zero color channel.
    pub fn lit_pixels(&self) -> usize {
        self.data
            .chunks_exact(4)
            .filter(|px| px[0] != 0 || px[1] != 0 || px[2] != 0)
            .count()
    }
}

impl Surface for Canvas {
    fn width(&self) -> usize {
        self.w
    }

    fn height(&self) -> usize {
        self.h
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: Color) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h || c.a == 0 {
            return;
        }
        let i = (y as usize * self.w + x as usize) * 4;
        if c.a == 255 {
            self.data[i] = c.r;
            self.data[i + 1] = c.g;
            self.data[i + 2] = c.b;
        } else {
            let a = c.a as u16;
            let ia = 255 - a;
            self.data[i] = ((c.r as u16 * a + self.data[i] as u16 * ia) / 255) as u8;
            self.data[i + 1] = ((c.g as u16 * a + self.data[i + 1] as u16 * ia) / 255) as u8;
            self.data[i + 2] = ((c.b as u16 * a + self.data[i + 2] as u16 * ia) / 255) as u8;
        }
        self.data[i + 3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_is_clipped_to_canvas() {
        let mut c = Canvas::new(8, 8);
        c.fill_circle(0.0, 0.0, 5.0, Color::WHITE);
        assert_eq!(c.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(c.pixel(7, 7), [0, 0, 0, 255]);
    }

    #[test]
    fn non_finite_geometry_is_ignored() {
        let mut c = Canvas::new(8, 8);
        c.line(f32::NAN, 0.0, 4.0, 4.0, Color::WHITE);
        c.fill_circle(4.0, f32::INFINITY, 2.0, Color::WHITE);
        c.fill_polygon(&[(0.0, 0.0), (f32::NAN, 3.0), (5.0, 5.0)], Color::WHITE);
        assert_eq!(c.lit_pixels(), 0);
    }

    #[test]
    fn line_far_outside_is_clipped_cheaply() {
        let mut c = Canvas::new(16, 16);
        c.line(-1.0e9, 8.0, 1.0e9, 8.0, Color::WHITE);
        assert_eq!(c.pixel(0, 8)[0], 255);
        assert_eq!(c.pixel(15, 8)[0], 255);
    }

    #[test]
    fn polygon_fills_interior() {
        let mut c = Canvas::new(10, 10);
        c.fill_polygon(&[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)], Color::WHITE);
        assert_eq!(c.pixel(5, 5)[0], 255);
        assert_eq!(c.pixel(0, 0)[0], 0);
    }

    #[test]
    fn half_alpha_blends() {
        let mut c = Canvas::new(1, 1);
        c.blend_pixel(0, 0, Color::WHITE.with_alpha(0.5));
        let px = c.pixel(0, 0);
        assert!((126..=129).contains(&px[0]), "{px:?}");
        assert_eq!(px[3], 255);
    }
}
