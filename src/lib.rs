//! # OLED Status Core Library
//!
//! This library drives a small monochrome status display (an SSD1306 128x64 OLED
//! on a Raspberry Pi) with a rotating set of screens. Each screen is a list of
//! components: a clock, the IP address of a network interface, and CPU, memory,
//! disk and temperature gauges.
//!
//! ## Design Philosophy
//!
//! ### One Frame Buffer, One Loop
//! - **Single bitmap**: A packed 1-bit [`framebuffer::FrameBuffer`] is allocated
//!   once and cleared and repainted on every cycle
//! - **Full repaint**: No diffing; every frame is drawn from scratch, so stale
//!   pixels cannot survive a screen switch
//! - **Serialized device access**: The [`display_manager::DisplayManager`] handles
//!   exactly one stimulus at a time, so a flush never overlaps a redraw and
//!   contrast/invert commands never interleave with frames
//!
//! ### Injected Capabilities
//! Everything the core reads from the outside world goes through a narrow trait
//! in [`providers`]: network address lookup, system metrics and the clock. The
//! output device is the [`device::DisplayDevice`] trait. The `fakes` module
//! (tests, or the `testing` feature) provides deterministic stand-ins for all
//! of them.
//!
//! ### Data Flow
//! 1. **Config**: TOML file → validated [`config::Config`]
//! 2. **Tick**: timer fires → manager picks the active screen
//! 3. **Compose**: clear buffer → render each component via providers
//! 4. **Flush**: whole buffer sent to the device as one frame

pub mod compositor;
pub mod config;
pub mod device;
pub mod display_manager;
pub mod drawing;
#[cfg(any(test, feature = "testing"))]
pub mod fakes;
pub mod framebuffer;
pub mod metrics;
pub mod network;
pub mod providers;
pub mod renderer;
#[cfg(all(target_os = "linux", feature = "hardware"))]
pub mod ssd1306_i2c;
pub mod terminal;

#[cfg(test)]
mod tests;

/// Display width in pixels (SSD1306 128x64 panel)
pub const DISPLAY_WIDTH: u32 = 128;

/// Display height in pixels (SSD1306 128x64 panel)
pub const DISPLAY_HEIGHT: u32 = 64;

/// Height of every gauge progress bar, in pixels
pub const BAR_HEIGHT: i32 = 7;

/// Vertical distance from a gauge label's baseline to the top of its bar
pub const BAR_OFFSET_Y: i32 = 5;

/// Contrast used between `day_start_hour` and `night_start_hour`
pub const BRIGHT_CONTRAST: u8 = 255;

/// Contrast used outside the daytime window
pub const DIM_CONTRAST: u8 = 1;

pub use config::{Component, ComponentKind, Config, ConfigError, Screen};
pub use device::{DeviceError, DisplayDevice};
pub use display_manager::{DisplayManager, ManagerError, Tick};
pub use framebuffer::FrameBuffer;
pub use providers::{Clock, NetworkChecker, ProviderError, Providers, SystemMetrics};
pub use renderer::RenderError;
