use std::f32::consts::TAU;

use super::canvas::{Color, Surface};

const SPOKES: usize = 12;

/// Rotating polygons and spokes; every vertex is recomputed from phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricChaosField;

impl GeometricChaosField {
    /// Vertices of the `sides`-gon ring, `ring` counting outward from 0.
    pub fn polygon(ring: usize, sides: usize, phase: f32, w: usize, h: usize) -> Vec<(f32, f32)> {
        let (w, h) = (w as f32, h as f32);
        let (cx, cy) = (w * 0.5, h * 0.5);
        let base = w.min(h) * (0.12 + 0.09 * ring as f32);
        let wobble = 1.0 + 0.15 * (phase * 1.3 + ring as f32).sin();
        let dir = if ring % 2 == 0 { 1.0 } else { -1.0 };
        let spin = dir * phase * (0.4 + 0.2 * ring as f32);
        (0..sides)
            .map(|k| {
                let t = spin + k as f32 * TAU / sides as f32;
                (cx + base * wobble * t.cos(), cy + base * wobble * t.sin())
            })
            .collect()
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, phase: f32) {
        let (w, h) = (surface.width(), surface.height());
        for (ring, sides) in (3..=6).enumerate() {
            let mut pts = Self::polygon(ring, sides, phase, w, h);
            if let Some(&first) = pts.first() {
                pts.push(first);
            }
            let hue = 0.12 + 0.2 * ring as f32 + phase * 0.05;
            surface.polyline(&pts, Color::from_hsv(hue, 0.9, 1.0).with_alpha(0.8));
        }

        let (cx, cy) = (w as f32 * 0.5, h as f32 * 0.5);
        let reach = w.min(h) as f32 * 0.5;
        for k in 0..SPOKES {
            let t = phase * 0.25 + k as f32 * TAU / SPOKES as f32;
            let len = reach * (0.55 + 0.35 * (phase * 2.0 + k as f32).sin());
            let hue = k as f32 / SPOKES as f32;
            surface.line(cx, cy, cx + len * t.cos(), cy + len * t.sin(), Color::from_hsv(hue, 0.5, 0.8).with_alpha(0.35));
        }
    }
}
