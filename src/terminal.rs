use anyhow::Context;
use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Stdout, Write};
use tracing::debug;

/// Raw mode + alternate screen for the lifetime of the guard.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Guard exists before the remaining steps so a failure still restores the tty.
        let guard = Self { _private: () };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?;
        out.execute(terminal::Clear(ClearType::All))
            .context("clear screen")?;
        out.execute(cursor::Hide).context("hide cursor")?;
        debug!("terminal entered alternate screen");

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }

    /// Current size in cells, rejecting terminals too small to draw into.
    pub fn size() -> anyhow::Result<(u16, u16)> {
        let (cols, rows) = terminal::size().context("get terminal size")?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            anyhow::bail!("terminal too small (need at least {MIN_COLS}x{MIN_ROWS}, got {cols}x{rows})");
        }
        Ok((cols, rows))
    }
}

pub const MIN_COLS: u16 = 8;
pub const MIN_ROWS: u16 = 4;

/// Canvas size for the visual area above `hud_rows` HUD lines.
pub fn canvas_size(cols: u16, rows: u16, hud_rows: u16, per_cell: (usize, usize)) -> (usize, usize) {
    let visual_rows = rows.saturating_sub(hud_rows).max(1) as usize;
    (
        (cols.max(1) as usize).saturating_mul(per_cell.0),
        visual_rows.saturating_mul(per_cell.1),
    )
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = out.flush();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
    }
}
