//! # Display Manager
//!
//! Owns the frame buffer, the output device and the rotation state, and turns
//! timer stimuli into device commands.
//!
//! ## Stimuli
//! | [`Tick`]        | Period              | Effect                                  |
//! |-----------------|---------------------|-----------------------------------------|
//! | `Update`        | 1 s                 | repaint the current screen              |
//! | `ScreenSwitch`  | `screen_duration`   | advance to the next screen and repaint  |
//! | `Invert`        | `invert_duration`   | toggle hardware inversion (0 disables)  |
//! | `Brightness`    | 60 s                | set contrast from the current hour      |
//!
//! Each stimulus is handled to completion before the next one is taken, so
//! device commands never interleave. The first handler error ends [`DisplayManager::run`].

use crate::compositor::render_screen;
use crate::config::{Config, ConfigError};
use crate::device::{DeviceError, DisplayDevice};
use crate::framebuffer::FrameBuffer;
use crate::providers::Providers;
use crate::renderer::RenderError;
use crate::{BRIGHT_CONTRAST, DIM_CONTRAST, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chrono::Timelike;
use log::{debug, info, trace};
use thiserror::Error;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

const UPDATE_PERIOD: Duration = Duration::from_secs(1);
const BRIGHTNESS_PERIOD: Duration = Duration::from_secs(60);

/// Errors that stop the display loop.
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The output device rejected a command
    #[error("failed to {action}: {source}")]
    Device {
        action: &'static str,
        #[source]
        source: DeviceError,
    },
}

/// One scheduler stimulus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Update,
    ScreenSwitch,
    Invert,
    Brightness,
}

/// Contrast for `hour`: bright from `day_start_hour` (inclusive) until
/// `night_start_hour` (exclusive), dim otherwise. The window does not wrap
/// midnight; a day start at or after the night start is always dim.
pub fn contrast_for_hour(hour: u32, day_start_hour: u32, night_start_hour: u32) -> u8 {
    if hour >= day_start_hour && hour < night_start_hour {
        BRIGHT_CONTRAST
    } else {
        DIM_CONTRAST
    }
}

/// Screen rotation scheduler over one output device
pub struct DisplayManager<D: DisplayDevice> {
    config: Config,
    providers: Providers,
    device: D,
    frame: FrameBuffer,
    current_screen: usize,
    is_inverted: bool,
}

impl<D: DisplayDevice> DisplayManager<D> {
    /// Start on the first screen, not inverted. `config` is validated first,
    /// so the screen list is never empty.
    pub fn new(config: Config, providers: Providers, device: D) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            providers,
            device,
            frame: FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT),
            current_screen: 0,
            is_inverted: false,
        })
    }

    pub fn current_screen(&self) -> usize {
        self.current_screen
    }

    pub fn is_inverted(&self) -> bool {
        self.is_inverted
    }

    /// The most recently composed frame
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Process one stimulus to completion
    pub fn handle(&mut self, tick: Tick) -> Result<(), ManagerError> {
        trace!("tick {:?}", tick);
        match tick {
            Tick::Update => self.render_current_screen(),
            Tick::ScreenSwitch => {
                self.next_screen();
                self.render_current_screen()
            }
            Tick::Invert => self.toggle_inversion(),
            Tick::Brightness => self.update_brightness(),
        }
    }

    /// Compose the active screen and flush it to the device
    pub fn render_current_screen(&mut self) -> Result<(), ManagerError> {
        render_screen(
            &mut self.frame,
            &self.config.screens[self.current_screen],
            &self.config.network_interface,
            &mut self.providers,
            &mut self.device,
        )
    }

    /// Set contrast for the current local hour
    pub fn update_brightness(&mut self) -> Result<(), ManagerError> {
        let hour = self.providers.clock.now().hour();
        let contrast = contrast_for_hour(
            hour,
            self.config.day_start_hour,
            self.config.night_start_hour,
        );
        debug!("hour {}: contrast {}", hour, contrast);
        self.device
            .set_contrast(contrast)
            .map_err(|source| ManagerError::Device {
                action: "set contrast",
                source,
            })
    }

    fn next_screen(&mut self) {
        self.current_screen = (self.current_screen + 1) % self.config.screens.len();
        debug!(
            "switched to screen {} ({:?})",
            self.current_screen, self.config.screens[self.current_screen].name
        );
    }

    fn toggle_inversion(&mut self) -> Result<(), ManagerError> {
        self.is_inverted = !self.is_inverted;
        debug!("inverted: {}", self.is_inverted);
        self.device
            .set_inverted(self.is_inverted)
            .map_err(|source| ManagerError::Device {
                action: "toggle invert",
                source,
            })
    }

    /// Apply the initial contrast, draw the first screen, then serve timers until an error.
    ///
    /// Ticks that fire together are taken in random order.
    pub async fn run(&mut self) -> Result<(), ManagerError> {
        self.update_brightness()?;
        self.render_current_screen()?;

        let start = Instant::now();
        let invert_enabled = self.config.invert_duration > 0;
        let mut update = ticker(start, UPDATE_PERIOD);
        let mut switch = ticker(start, Duration::from_secs(self.config.screen_duration));
        let mut invert = ticker(start, Duration::from_secs(self.config.invert_duration.max(1)));
        let mut brightness = ticker(start, BRIGHTNESS_PERIOD);

        info!(
            "display loop started: {} screens, switch every {}s, invert {}",
            self.config.screens.len(),
            self.config.screen_duration,
            if invert_enabled {
                format!("every {}s", self.config.invert_duration)
            } else {
                "disabled".to_string()
            }
        );

        loop {
            let tick = tokio::select! {
                _ = update.tick() => Tick::Update,
                _ = switch.tick() => Tick::ScreenSwitch,
                _ = invert.tick(), if invert_enabled => Tick::Invert,
                _ = brightness.tick() => Tick::Brightness,
            };
            self.handle(tick)?;
        }
    }

    /// Blank and release the device
    pub fn shutdown(&mut self) -> Result<(), ManagerError> {
        info!("shutting down display");
        self.device
            .shutdown()
            .map_err(|source| ManagerError::Device {
                action: "shut down display",
                source,
            })
    }
}

/// Interval whose first tick is one `period` after `start`
fn ticker(start: Instant, period: Duration) -> Interval {
    let mut interval = interval_at(start + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
