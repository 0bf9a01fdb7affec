//! Packed 1-bit frame buffer
//!
//! The buffer is organised as rows of bytes, each byte holding 8 horizontal
//! pixels with the most significant bit leftmost. A set bit is a lit pixel.
//! It implements the embedded-graphics [`DrawTarget`] so primitives and mono
//! fonts draw straight into it; pixels outside the buffer are dropped.

use core::convert::Infallible;
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PointsIter, Rectangle},
};

/// In-memory monochrome bitmap shared by the compositor and the output device
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        // Each row has (width+7)/8 bytes
        let bytes_per_row = width.div_ceil(8);
        Self {
            width,
            height,
            pixels: vec![0x00; (bytes_per_row * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Zero every pixel
    pub fn clear(&mut self) {
        self.pixels.fill(0x00);
    }

    /// Raw packed rows, MSB first
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bytes_per_row = self.width.div_ceil(8);
        let byte_index = (y * bytes_per_row + x / 8) as usize;
        Some((byte_index, 0x80 >> (x % 8)))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if let Some((byte_index, bit_mask)) = self.locate(x, y) {
            if on {
                self.pixels[byte_index] |= bit_mask;
            } else {
                self.pixels[byte_index] &= !bit_mask;
            }
        }
    }

    /// Whether the pixel is lit; out-of-bounds pixels read as unlit
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        self.locate(x, y)
            .map(|(byte_index, bit_mask)| self.pixels[byte_index] & bit_mask != 0)
            .unwrap_or(false)
    }

    /// Number of lit pixels in the whole buffer
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Number of lit pixels inside `area`
    pub fn lit_pixels_in(&self, area: &Rectangle) -> usize {
        area.points()
            .filter(|p| p.x >= 0 && p.y >= 0 && self.pixel(p.x as u32, p.y as u32))
            .count()
    }

    /// Smallest rectangle containing every lit pixel, `None` for a blank frame
    pub fn lit_region(&self) -> Option<Rectangle> {
        let mut min = Point::new(i32::MAX, i32::MAX);
        let mut max = Point::new(i32::MIN, i32::MIN);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) {
                    let p = Point::new(x as i32, y as i32);
                    min = min.component_min(p);
                    max = max.component_max(p);
                }
            }
        }
        if min.x > max.x {
            None
        } else {
            Some(Rectangle::with_corners(min, max))
        }
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            self.set_pixel(point.x as u32, point.y as u32, color.is_on());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // Area corners may lie beyond i32, so clip in i64
        let left = i64::from(area.top_left.x).max(0);
        let top = i64::from(area.top_left.y).max(0);
        let right = (i64::from(area.top_left.x) + i64::from(area.size.width))
            .min(i64::from(self.width));
        let bottom = (i64::from(area.top_left.y) + i64::from(area.size.height))
            .min(i64::from(self.height));

        for y in top..bottom {
            for x in left..right {
                self.set_pixel(x as u32, y as u32, color.is_on());
            }
        }
        Ok(())
    }
}
