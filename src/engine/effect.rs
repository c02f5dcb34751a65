use super::ControlEvent;
use super::canvas::{Canvas, Color, Surface};

const SMILEYS: usize = 6;

/// Full-frame post effect drawn over the mirrored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayEffect {
    #[default]
    None,
    Rage,
    EmojiParty,
    Psychedelic,
}

impl OverlayEffect {
    pub const ALL: [Self; 4] = [Self::None, Self::Rage, Self::EmojiParty, Self::Psychedelic];

    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Rage,
            Self::Rage => Self::EmojiParty,
            Self::EmojiParty => Self::Psychedelic,
            Self::Psychedelic => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rage => "rage",
            Self::EmojiParty => "emoji-party",
            Self::Psychedelic => "psychedelic",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == s)
    }

    /// Transition on a control event; unrelated events keep the current state.
    pub fn transition(self, ev: &ControlEvent) -> Self {
        match ev {
            ControlEvent::CycleOverlay => self.next(),
            ControlEvent::SetOverlay(e) => *e,
            _ => self,
        }
    }

    pub fn apply(self, canvas: &mut Canvas, phase: f32) {
        match self {
            Self::None => {}
            Self::Rage => rage(canvas, phase),
            Self::EmojiParty => emoji_party(canvas, phase),
            Self::Psychedelic => hue_rotate(canvas, phase * 0.8),
        }
    }
}

fn rage(canvas: &mut Canvas, phase: f32) {
    let pulse = 0.3 + 0.15 * (phase * 6.0).sin();
    let a = (pulse * 256.0) as u16;
    let ia = 256 - a;
    for px in canvas.as_rgba_mut().chunks_exact_mut(4) {
        px[0] = ((px[0] as u16 * ia + 255 * a) >> 8) as u8;
        px[1] = ((px[1] as u16 * ia) >> 8) as u8;
        px[2] = ((px[2] as u16 * ia) >> 8) as u8;
    }
}

/// Triangle wave in [0,1].
fn ping_pong(t: f32) -> f32 {
    let f = t.rem_euclid(2.0);
    if f > 1.0 { 2.0 - f } else { f }
}

fn emoji_party(canvas: &mut Canvas, phase: f32) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let r = (w.min(h) * 0.06).max(2.0);
    for i in 0..SMILEYS {
        let k = i as f32;
        let x = r + ping_pong(phase * (0.21 + 0.04 * k) + k * 0.37) * (w - 2.0 * r).max(0.0);
        let y = r + ping_pong(phase * (0.33 + 0.05 * k) + k * 0.61) * (h - 2.0 * r).max(0.0);
        smiley(canvas, x, y, r);
    }
}

fn smiley(canvas: &mut Canvas, x: f32, y: f32, r: f32) {
    let ink = Color::rgb(40, 20, 0);
    canvas.fill_circle(x, y, r, Color::rgb(255, 214, 0));
    canvas.fill_circle(x - r * 0.35, y - r * 0.25, r * 0.14, ink);
    canvas.fill_circle(x + r * 0.35, y - r * 0.25, r * 0.14, ink);
    let mouth: Vec<(f32, f32)> = (0..=12)
        .map(|s| {
            let t = 0.2 * std::f32::consts::PI + s as f32 / 12.0 * 0.6 * std::f32::consts::PI;
            (x + r * 0.55 * t.cos(), y + r * 0.55 * t.sin())
        })
        .collect();
    canvas.polyline(&mouth, ink);
}

fn hue_rotate(canvas: &mut Canvas, angle: f32) {
    let (s, c) = angle.sin_cos();
    let third: f32 = 1.0 / 3.0;
    let sq = third.sqrt();
    let m0 = c + (1.0 - c) * third;
    let m1 = third * (1.0 - c) - sq * s;
    let m2 = third * (1.0 - c) + sq * s;
    for px in canvas.as_rgba_mut().chunks_exact_mut(4) {
        let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
        px[0] = (r * m0 + g * m1 + b * m2).clamp(0.0, 255.0) as u8;
        px[1] = (r * m2 + g * m0 + b * m1).clamp(0.0, 255.0) as u8;
        px[2] = (r * m1 + g * m2 + b * m0).clamp(0.0, 255.0) as u8;
    }
}
