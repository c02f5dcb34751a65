use crate::render::{text_frame_begin, text_frame_end, Frame, Renderer};
use std::io::Write;

const HALF_BLOCK: &str = "\u{2580}";

/// Two vertical pixels per cell: upper in the foreground, lower in the background.
pub struct HalfBlockRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "half-block"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        if !text_frame_begin(frame, out)? {
            return Ok(());
        }
        let cols = frame.term_cols as usize;
        let rows = frame.visual_rows as usize;
        let grid_h = rows * 2;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..rows {
            for x in 0..cols {
                let top = frame.sample(x, row * 2, cols, grid_h);
                let bot = frame.sample(x, row * 2 + 1, cols, grid_h);
                if self.last_fg != Some(top) {
                    write!(out, "\x1b[38;2;{};{};{}m", top.0, top.1, top.2)?;
                    self.last_fg = Some(top);
                }
                if self.last_bg != Some(bot) {
                    write!(out, "\x1b[48;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    self.last_bg = Some(bot);
                }
                out.write_all(HALF_BLOCK.as_bytes())?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, out)
    }
}
