//! Output device boundary
//!
//! The core never addresses individual pixels of the physical panel. It submits
//! whole frames and a couple of mode commands through [`DisplayDevice`].

use crate::framebuffer::FrameBuffer;
use embedded_graphics::{prelude::Point, primitives::Rectangle};
use std::io;
use thiserror::Error;

/// Errors reported by an output device.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Writing to the terminal or device node failed
    #[error("device IO: {0}")]
    Io(#[from] io::Error),

    /// The bus rejected a command or data transfer
    #[error("display bus error: {0}")]
    Bus(String),

    /// The device could not be opened or initialised
    #[error("display initialization failed: {0}")]
    Init(String),
}

/// A monochrome display that accepts whole frames.
pub trait DisplayDevice {
    /// Set panel contrast; 255 is brightest
    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError>;

    /// Swap lit and unlit pixels in hardware
    fn set_inverted(&mut self, inverted: bool) -> Result<(), DeviceError>;

    /// Show the `bounds` region of `frame`, placing `origin` of the frame at the panel's top-left
    fn draw_frame(
        &mut self,
        bounds: Rectangle,
        frame: &FrameBuffer,
        origin: Point,
    ) -> Result<(), DeviceError>;

    /// Blank the panel and release it
    fn shutdown(&mut self) -> Result<(), DeviceError>;
}

impl<D: DisplayDevice + ?Sized> DisplayDevice for Box<D> {
    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError> {
        (**self).set_contrast(level)
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), DeviceError> {
        (**self).set_inverted(inverted)
    }

    fn draw_frame(
        &mut self,
        bounds: Rectangle,
        frame: &FrameBuffer,
        origin: Point,
    ) -> Result<(), DeviceError> {
        (**self).draw_frame(bounds, frame, origin)
    }

    fn shutdown(&mut self) -> Result<(), DeviceError> {
        (**self).shutdown()
    }
}
