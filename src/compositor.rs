//! # Screen Compositor
//!
//! Builds one complete frame for a screen and pushes it to the device. Every
//! cycle is a full repaint: the frame is cleared, each component is drawn in
//! configuration order, and the result is flushed once. A component that fails
//! aborts the frame before anything reaches the device, so the panel keeps
//! showing the previous frame.

use crate::config::Screen;
use crate::device::DisplayDevice;
use crate::display_manager::ManagerError;
use crate::framebuffer::FrameBuffer;
use crate::providers::Providers;
use crate::renderer::render_component;
use embedded_graphics::prelude::*;
use log::trace;

/// Clear `frame`, draw every component of `screen` and flush it to `device`.
pub fn render_screen<D>(
    frame: &mut FrameBuffer,
    screen: &Screen,
    network_interface: &str,
    providers: &mut Providers,
    device: &mut D,
) -> Result<(), ManagerError>
where
    D: DisplayDevice + ?Sized,
{
    frame.clear();
    for component in &screen.components {
        render_component(frame, component, network_interface, providers)?;
    }

    trace!(
        "flushing screen {:?}: {} lit pixels",
        screen.name,
        frame.lit_pixels()
    );
    device
        .draw_frame(frame.bounding_box(), frame, Point::zero())
        .map_err(|source| ManagerError::Device {
            action: "draw frame",
            source,
        })
}
