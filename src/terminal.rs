//! Truecolor terminal surface: two pixels per cell using the upper half block.

use crate::texture::{Pixmap, Rgba};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use tracing::debug;

const HALF_BLOCK: char = '\u{2580}';

pub const BACKGROUND: Rgba = Rgba::rgb8(12, 12, 16);

/// Terminal size in (columns, rows).
pub fn size() -> io::Result<(u16, u16)> {
    match termsize::get() {
        Some(size) => Ok((size.cols, size.rows)),
        None => terminal::size(),
    }
}

/// Premultiplied `pixel` over an opaque background.
pub fn blend_over(pixel: Rgba, background: Rgba) -> Rgba {
    let inv = 255 - pixel.a as u16;
    let mix = |p: u8, b: u8| (p as u16 + b as u16 * inv / 255).min(255) as u8;
    Rgba::rgb8(
        mix(pixel.r, background.r),
        mix(pixel.g, background.g),
        mix(pixel.b, background.b),
    )
}

fn to_color(c: Rgba) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Owns the terminal for the lifetime of the value.
pub struct TerminalSurface {
    stdout: Stdout,
}

impl TerminalSurface {
    /// Enters raw mode and the alternate screen.
    pub fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        debug!("terminal surface entered");
        Ok(Self { stdout })
    }

    /// Pixel dimensions that fill the terminal, leaving one row for the status line.
    pub fn frame_size() -> io::Result<(usize, usize)> {
        let (cols, rows) = size()?;
        let rows = rows.saturating_sub(1).max(1);
        Ok((cols.max(1) as usize, rows as usize * 2))
    }

    /// Draw `frame` and then the text `overlay` lines on top, followed by `status`.
    pub fn present(&mut self, frame: &Pixmap, overlay: &[String], status: &str) -> io::Result<()> {
        let rows = frame.height() / 2;
        let mut last: Option<(Rgba, Rgba)> = None;

        for row in 0..rows {
            queue!(self.stdout, MoveTo(0, row as u16))?;
            for x in 0..frame.width() {
                let top = blend_over(frame.pixel(x, row * 2), BACKGROUND);
                let bottom = blend_over(frame.pixel(x, row * 2 + 1), BACKGROUND);
                if last != Some((top, bottom)) {
                    queue!(
                        self.stdout,
                        SetForegroundColor(to_color(top)),
                        SetBackgroundColor(to_color(bottom))
                    )?;
                    last = Some((top, bottom));
                }
                queue!(self.stdout, Print(HALF_BLOCK))?;
            }
        }

        queue!(
            self.stdout,
            SetForegroundColor(Color::White),
            SetBackgroundColor(to_color(BACKGROUND))
        )?;
        for (row, line) in overlay.iter().enumerate().take(rows) {
            queue!(self.stdout, MoveTo(1, row as u16), Print(line))?;
        }
        queue!(
            self.stdout,
            MoveTo(0, rows as u16),
            ResetColor,
            terminal::Clear(terminal::ClearType::CurrentLine),
            Print(status)
        )?;
        self.stdout.flush()
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, ResetColor, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_shows_background() {
        assert_eq!(blend_over(Rgba::TRANSPARENT, BACKGROUND), BACKGROUND);
    }

    #[test]
    fn opaque_hides_background() {
        let px = Rgba::rgb8(200, 10, 90);
        assert_eq!(blend_over(px, BACKGROUND), px);
    }

    #[test]
    fn half_alpha_mixes() {
        let px = Rgba::rgba8(100, 0, 0, 128);
        let out = blend_over(px, Rgba::rgb8(0, 200, 0));
        assert_eq!(out.r, 100);
        assert_eq!(out.g, 99);
        assert_eq!(out.a, 255);
    }
}
