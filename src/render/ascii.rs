use crate::render::{luma_u8, text_frame_begin, text_frame_end, write_fg_rgb, Frame, Renderer};
use std::io::Write;

// Dark to bright.
const RAMP: &[u8] = b" .,:;irsXA253hMHGS#9B&@";

/// One pixel per cell, coloured glyph picked by luminance.
pub struct AsciiRenderer {
    last_fg: Option<(u8, u8, u8)>,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self { last_fg: None }
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ramp_glyph(r: u8, g: u8, b: u8) -> u8 {
    let l = luma_u8(r, g, b) as usize;
    RAMP[l * (RAMP.len() - 1) / 255]
}

impl Renderer for AsciiRenderer {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !text_frame_begin(frame, out)? {
            return Ok(());
        }
        let cols = frame.term_cols as usize;
        let rows = frame.visual_rows as usize;
        self.last_fg = None;

        for y in 0..rows {
            for x in 0..cols {
                let (r, g, b) = frame.sample(x, y, cols, rows);
                if self.last_fg != Some((r, g, b)) {
                    write_fg_rgb(out, r, g, b)?;
                    self.last_fg = Some((r, g, b));
                }
                out.write_all(&[ramp_glyph(r, g, b)])?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, out)
    }
}
