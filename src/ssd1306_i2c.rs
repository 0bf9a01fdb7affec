//! SSD1306 128x64 OLED over Linux I2C (`/dev/i2c-*`).
//!
//! Frames are copied into the driver's own buffer and sent with a single
//! `flush`. Contrast and inversion map directly to controller commands.

use crate::config::DisplayConfig;
use crate::device::{DeviceError, DisplayDevice};
use crate::framebuffer::FrameBuffer;
use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use embedded_graphics::{prelude::*, primitives::Rectangle};
use linux_embedded_hal::I2cdev;
use log::info;
use ssd1306::mode::DisplayConfig as _;
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

type Driver =
    Ssd1306<I2CInterface<I2cdev>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Physical SSD1306 panel
pub struct Ssd1306Display {
    driver: Driver,
}

impl Ssd1306Display {
    /// Open the I2C bus, initialise the controller and blank the panel
    pub fn open(config: &DisplayConfig) -> Result<Self, DeviceError> {
        info!(
            "opening SSD1306 on {} at address {:#04x}",
            config.i2c_bus, config.i2c_address
        );
        let i2c = I2cdev::new(&config.i2c_bus)
            .map_err(|e| DeviceError::Init(format!("{}: {}", config.i2c_bus, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, config.i2c_address);
        let mut driver = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        driver.init().map_err(|e| DeviceError::Init(format!("{:?}", e)))?;
        driver.clear_buffer();
        driver.flush().map_err(bus_error)?;

        info!("display initialized");
        Ok(Self { driver })
    }
}

fn bus_error<E: std::fmt::Debug>(error: E) -> DeviceError {
    DeviceError::Bus(format!("{:?}", error))
}

impl DisplayDevice for Ssd1306Display {
    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError> {
        self.driver
            .set_brightness(Brightness::custom(1, level))
            .map_err(bus_error)
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), DeviceError> {
        self.driver.set_invert(inverted).map_err(bus_error)
    }

    fn draw_frame(
        &mut self,
        bounds: Rectangle,
        frame: &FrameBuffer,
        origin: Point,
    ) -> Result<(), DeviceError> {
        let panel = Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT));
        for point in bounds.intersection(&panel).points() {
            let x = point.x - bounds.top_left.x + origin.x;
            let y = point.y - bounds.top_left.y + origin.y;
            let on = x >= 0 && y >= 0 && frame.pixel(x as u32, y as u32);
            self.driver.set_pixel(point.x as u32, point.y as u32, on);
        }
        self.driver.flush().map_err(bus_error)
    }

    fn shutdown(&mut self) -> Result<(), DeviceError> {
        self.driver.clear_buffer();
        self.driver.flush().map_err(bus_error)?;
        self.driver.set_display_on(false).map_err(bus_error)
    }
}
