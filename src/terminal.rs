//! # Terminal Display
//!
//! Development stand-in for the OLED panel. Each frame is printed as text using
//! half-block characters, so two pixel rows fit in one terminal line and a
//! 128x64 frame takes 32 lines. Inversion is applied when printing; contrast is
//! only shown in the frame header.

use crate::device::{DeviceError, DisplayDevice};
use crate::framebuffer::FrameBuffer;
use embedded_graphics::{prelude::*, primitives::Rectangle};
use std::io::{self, Write};

/// Renders frames as text to any writer
pub struct TerminalDisplay<W: Write> {
    out: W,
    contrast: u8,
    inverted: bool,
    clear_between_frames: bool,
}

impl TerminalDisplay<io::Stdout> {
    /// Print to stdout, redrawing in place with ANSI clear-screen codes
    pub fn stdout() -> Self {
        Self {
            out: io::stdout(),
            contrast: u8::MAX,
            inverted: false,
            clear_between_frames: true,
        }
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// Append frames to `out` one after another
    pub fn new(out: W) -> Self {
        Self {
            out,
            contrast: u8::MAX,
            inverted: false,
            clear_between_frames: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn glyph(&self, top: bool, bottom: bool) -> char {
        match (top != self.inverted, bottom != self.inverted) {
            (true, true) => '█',
            (true, false) => '▀',
            (false, true) => '▄',
            (false, false) => ' ',
        }
    }
}

impl<W: Write> DisplayDevice for TerminalDisplay<W> {
    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError> {
        self.contrast = level;
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), DeviceError> {
        self.inverted = inverted;
        Ok(())
    }

    fn draw_frame(
        &mut self,
        bounds: Rectangle,
        frame: &FrameBuffer,
        origin: Point,
    ) -> Result<(), DeviceError> {
        let width = bounds.size.width as usize;
        let height = bounds.size.height as i32;
        let source_pixel = |panel_x: i32, panel_y: i32| -> bool {
            let x = panel_x - bounds.top_left.x + origin.x;
            let y = panel_y - bounds.top_left.y + origin.y;
            x >= 0 && y >= 0 && frame.pixel(x as u32, y as u32)
        };

        let mut text = String::new();
        if self.clear_between_frames {
            text.push_str("\x1b[H\x1b[2J");
        }
        let inverted = if self.inverted { " inv" } else { "" };
        let header = format!(" contrast {:3}{} ", self.contrast, inverted);
        text.push('┌');
        text.push_str(&header);
        text.push_str(&"─".repeat(width.saturating_sub(header.chars().count())));
        text.push_str("┐\n");

        for row in (0..height).step_by(2) {
            let y = bounds.top_left.y + row;
            text.push('│');
            for column in 0..width as i32 {
                let x = bounds.top_left.x + column;
                let top = source_pixel(x, y);
                let bottom = row + 1 < height && source_pixel(x, y + 1);
                text.push(self.glyph(top, bottom));
            }
            text.push_str("│\n");
        }

        text.push('└');
        text.push_str(&"─".repeat(width.max(header.chars().count())));
        text.push_str("┘\n");

        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DeviceError> {
        self.out.flush()?;
        Ok(())
    }
}
