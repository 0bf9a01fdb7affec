//! # Drawing Primitives
//!
//! The two primitives every component is built from: a bordered horizontal
//! progress bar and a text label. Both are generic over any embedded-graphics
//! target with [`BinaryColor`] pixels, so they work on the [`FrameBuffer`]
//! as well as on `MockDisplay` in tests.
//!
//! All pixels use the single foreground tone [`BinaryColor::On`].
//!
//! [`FrameBuffer`]: crate::framebuffer::FrameBuffer

use embedded_graphics::{
    mono_font::{ascii::FONT_7X13, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text},
};

/// Draw a horizontal progress bar.
///
/// The 1-pixel border covers the closed box `[x, x+width] × [y, y+height]`.
/// The fill starts at `(x+1, y+1)`, is `floor((width-2) * fraction)` columns
/// wide and runs down to row `y+height-1`.
///
/// `fraction` is not clamped: a negative value leaves the bar empty and a value
/// above 1.0 fills past the right border. Geometry is computed in `i64` and
/// clipped to the target, so any `i32` inputs are accepted and off-target parts
/// cost nothing.
pub fn draw_bar<D>(
    target: &mut D,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    fraction: f64,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if width < 0 || height < 0 {
        return Ok(());
    }
    let (left, top) = (i64::from(x), i64::from(y));
    let (right, bottom) = (left + i64::from(width), top + i64::from(height));

    // Border edges, each pixel drawn once
    fill_clipped(target, left, top, right, top)?;
    if height > 0 {
        fill_clipped(target, left, bottom, right, bottom)?;
    }
    fill_clipped(target, left, top + 1, left, bottom - 1)?;
    if width > 0 {
        fill_clipped(target, right, top + 1, right, bottom - 1)?;
    }

    let fill_width = ((f64::from(width) - 2.0) * fraction).floor() as i64;
    if fill_width > 0 {
        fill_clipped(target, left + 1, top + 1, left + fill_width, bottom - 1)?;
    }

    Ok(())
}

/// Fill the closed box `[left, right] × [top, bottom]`, clipped to the target
fn fill_clipped<D>(
    target: &mut D,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let area = target.bounding_box();
    let Some(max) = area.bottom_right() else {
        return Ok(());
    };
    let left = left.max(i64::from(area.top_left.x));
    let top = top.max(i64::from(area.top_left.y));
    let right = right.min(i64::from(max.x));
    let bottom = bottom.min(i64::from(max.y));
    if left > right || top > bottom {
        return Ok(());
    }

    // Clipped corners lie inside the target, so they fit in i32
    let clipped = Rectangle::with_corners(
        Point::new(left as i32, top as i32),
        Point::new(right as i32, bottom as i32),
    );
    target.fill_solid(&clipped, BinaryColor::On)
}

/// Stamp `text` in the fixed 7x13 font with its baseline at `(x, y)`.
///
/// Empty text is a no-op. Nothing wraps; pixels past the target edge are clipped
/// by the target.
pub fn add_label<D>(target: &mut D, x: i32, y: i32, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if text.is_empty() {
        return Ok(());
    }

    let style = MonoTextStyle::new(&FONT_7X13, BinaryColor::On);
    Text::with_baseline(text, Point::new(x, y), style, Baseline::Alphabetic).draw(target)?;
    Ok(())
}
