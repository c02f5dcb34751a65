use super::canvas::{Color, Surface};

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 7;
/// Subdivision stops once a child's edge would be shorter than this.
pub const MIN_EDGE_PX: f32 = 2.0;

type Pt = (f32, f32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractalNode {
    pub a: Pt,
    pub b: Pt,
    pub c: Pt,
    pub depth: u32,
}

impl FractalNode {
    pub fn edge(&self) -> f32 {
        let (dx, dy) = (self.b.0 - self.a.0, self.b.1 - self.a.1);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn centroid(&self) -> Pt {
        (
            (self.a.0 + self.b.0 + self.c.0) / 3.0,
            (self.a.1 + self.b.1 + self.c.1) / 3.0,
        )
    }

    fn rotated(self, angle: f32) -> Self {
        let (cx, cy) = self.centroid();
        let (s, c) = angle.sin_cos();
        let rot = |(x, y): Pt| {
            let (dx, dy) = (x - cx, y - cy);
            (cx + dx * c - dy * s, cy + dx * s + dy * c)
        };
        Self {
            a: rot(self.a),
            b: rot(self.b),
            c: rot(self.c),
            depth: self.depth,
        }
    }

    fn children(&self, phase: f32) -> [FractalNode; 3] {
        let mid = |p: Pt, q: Pt| ((p.0 + q.0) * 0.5, (p.1 + q.1) * 0.5);
        let ab = mid(self.a, self.b);
        let bc = mid(self.b, self.c);
        let ca = mid(self.c, self.a);
        let depth = self.depth + 1;
        let twist = (phase + depth as f32).sin() * 0.25;
        [
            FractalNode { a: self.a, b: ab, c: ca, depth },
            FractalNode { a: ab, b: self.b, c: bc, depth },
            FractalNode { a: ca, b: bc, c: self.c, depth },
        ]
        .map(|n| n.rotated(twist))
    }
}

/// Lazy depth-first walk yielding only leaf triangles.
#[derive(Debug, Clone)]
pub struct FractalPrimitives {
    stack: Vec<FractalNode>,
    max_depth: u32,
    phase: f32,
}

impl Iterator for FractalPrimitives {
    type Item = FractalNode;

    fn next(&mut self) -> Option<FractalNode> {
        while let Some(node) = self.stack.pop() {
            if node.depth >= self.max_depth || node.edge() * 0.5 < MIN_EDGE_PX {
                return Some(node);
            }
            // Reverse push keeps output order a, b, c.
            let kids = node.children(self.phase);
            self.stack.extend(kids.into_iter().rev());
        }
        None
    }
}

/// Sierpinski-style triangle whose sub-triangles twist with phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct FractalRenderer;

impl FractalRenderer {
    pub fn root(phase: f32, w: usize, h: usize) -> Option<FractalNode> {
        let (w, h) = (w as f32, h as f32);
        let r = w.min(h) * 0.42;
        if !(r > 0.0) || !phase.is_finite() {
            return None;
        }
        let (cx, cy) = (w * 0.5, h * 0.5);
        let spin = phase * 0.1;
        let vertex = |k: f32| {
            let t = spin - std::f32::consts::FRAC_PI_2 + k * std::f32::consts::TAU / 3.0;
            (cx + r * t.cos(), cy + r * t.sin())
        };
        Some(FractalNode {
            a: vertex(0.0),
            b: vertex(1.0),
            c: vertex(2.0),
            depth: 0,
        })
    }

    pub fn primitives(&self, depth: u32, phase: f32, w: usize, h: usize) -> FractalPrimitives {
        FractalPrimitives {
            stack: Self::root(phase, w, h).into_iter().collect(),
            max_depth: depth.clamp(MIN_DEPTH, MAX_DEPTH),
            phase,
        }
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, depth: u32, phase: f32) {
        let (w, h) = (surface.width(), surface.height());
        for node in self.primitives(depth, phase, w, h) {
            let hue = 0.08 * node.depth as f32 + phase * 0.03;
            let tri = [node.a, node.b, node.c];
            surface.fill_polygon(&tri, Color::from_hsv(hue, 0.7, 0.9).with_alpha(0.22));
            surface.polyline(&[node.a, node.b, node.c, node.a], Color::from_hsv(hue, 0.5, 1.0).with_alpha(0.6));
        }
    }
}
