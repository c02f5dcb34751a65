use std::f32::consts::TAU;

use super::canvas::{Color, Surface};

/// Frequency ratios (a, b) of each Lissajous curve.
pub const RATIOS: [(f32, f32); 3] = [(3.0, 2.0), (5.0, 4.0), (3.0, 4.0)];
pub const SAMPLES_PER_CURVE: usize = 400;

#[derive(Debug, Clone, PartialEq)]
pub struct CurveSample {
    pub points: Vec<(f32, f32)>,
    pub hue: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CurveField;

impl CurveField {
    /// Pure function of phase and canvas size.
    pub fn samples(&self, phase: f32, w: usize, h: usize) -> Vec<CurveSample> {
        let (w, h) = (w as f32, h as f32);
        let (cx, cy) = (w * 0.5, h * 0.5);
        RATIOS
            .iter()
            .enumerate()
            .map(|(i, &(a, b))| {
                let k = i as f32;
                let amp_x = w * (0.40 - 0.07 * k);
                let amp_y = h * (0.40 - 0.07 * k);
                let delta = phase * (0.3 + 0.15 * k);
                let points = (0..SAMPLES_PER_CURVE)
                    .map(|s| {
                        let t = s as f32 / (SAMPLES_PER_CURVE - 1) as f32 * TAU;
                        (cx + amp_x * (a * t + delta).sin(), cy + amp_y * (b * t).sin())
                    })
                    .collect();
                CurveSample {
                    points,
                    hue: 0.3 * k + phase * 0.02,
                }
            })
            .collect()
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, phase: f32) {
        for curve in self.samples(phase, surface.width(), surface.height()) {
            surface.polyline(&curve.points, Color::from_hsv(curve.hue, 0.6, 1.0).with_alpha(0.75));
        }
    }
}
