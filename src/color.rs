//! Pixel values and the two accepted input representations.
//!
//! Every pixel is stored as three 16-bit grayscale values ([`Rgb16`]). Writes
//! go through [`ColorInput`], which keeps the normalized floating-point form
//! and the raw integer form apart so a value is never silently coerced from
//! one domain into the other:
//!
//! - [`ColorInput::Normalized`] accepts `0.0..=1.0`. Values are scaled to
//!   `0..=65535` and rounded half up; anything outside the range saturates.
//! - [`ColorInput::Raw`] accepts `0..=65535` and rejects everything else.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::error::PixelError;

/// Largest grayscale value of a single channel.
pub const MAX_VALUE: u16 = u16::MAX;

/// One pixel: 16-bit grayscale value for each of the red, green and blue
/// outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb16 {
    /// Red channel
    pub r: u16,
    /// Green channel
    pub g: u16,
    /// Blue channel
    pub b: u16,
}

impl Rgb16 {
    /// All channels off.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// All channels at full scale.
    pub const WHITE: Self = Self::new(MAX_VALUE, MAX_VALUE, MAX_VALUE);

    /// Create a pixel value from raw channel values.
    #[must_use]
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    /// Channels in `[r, g, b]` order.
    #[must_use]
    pub const fn channels(self) -> [u16; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb888> for Rgb16 {
    /// Expands 8-bit channels so that `0xff` maps to `0xffff`.
    fn from(color: Rgb888) -> Self {
        Self::new(
            u16::from(color.r()) * 257,
            u16::from(color.g()) * 257,
            u16::from(color.b()) * 257,
        )
    }
}

/// A pixel write, tagged with the domain its channel values are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorInput {
    /// Channel intensities in `0.0..=1.0`.
    Normalized(f32, f32, f32),
    /// Channel grayscale values in `0..=65535`.
    Raw(i32, i32, i32),
}

impl ColorInput {
    /// Resolve the input into the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::OutOfRange`] if a raw channel is outside
    /// `0..=65535` or a normalized channel is NaN.
    pub fn to_rgb16(self) -> Result<Rgb16, PixelError> {
        match self {
            Self::Normalized(r, g, b) => Ok(Rgb16::new(
                normalized_to_u16(r)?,
                normalized_to_u16(g)?,
                normalized_to_u16(b)?,
            )),
            Self::Raw(r, g, b) => Ok(Rgb16::new(
                raw_to_u16(r)?,
                raw_to_u16(g)?,
                raw_to_u16(b)?,
            )),
        }
    }
}

/// Scale a normalized value to 16 bits, rounding half up and saturating.
fn normalized_to_u16(value: f32) -> Result<u16, PixelError> {
    if value.is_nan() {
        return Err(PixelError::OutOfRange);
    }
    let value = f64::from(value.clamp(0.0, 1.0));
    Ok((value * f64::from(MAX_VALUE) + 0.5) as u16)
}

fn raw_to_u16(value: i32) -> Result<u16, PixelError> {
    u16::try_from(value).map_err(|_| PixelError::OutOfRange)
}

impl From<(f32, f32, f32)> for ColorInput {
    fn from((r, g, b): (f32, f32, f32)) -> Self {
        Self::Normalized(r, g, b)
    }
}

impl From<(i32, i32, i32)> for ColorInput {
    fn from((r, g, b): (i32, i32, i32)) -> Self {
        Self::Raw(r, g, b)
    }
}

impl From<(u16, u16, u16)> for ColorInput {
    fn from((r, g, b): (u16, u16, u16)) -> Self {
        Self::Raw(i32::from(r), i32::from(g), i32::from(b))
    }
}

impl From<Rgb16> for ColorInput {
    fn from(color: Rgb16) -> Self {
        Self::from((color.r, color.g, color.b))
    }
}

impl From<Rgb888> for ColorInput {
    fn from(color: Rgb888) -> Self {
        Self::from(Rgb16::from(color))
    }
}

/// Which logical channel is wired to the chip's OUTR, OUTG and OUTB pins,
/// in that order.
///
/// Boards with swapped LED footprints use this to keep `r`, `g` and `b`
/// meaning red, green and blue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    /// OUTR = r, OUTG = g, OUTB = b
    #[default]
    Rgb,
    /// OUTR = r, OUTG = b, OUTB = g
    Rbg,
    /// OUTR = g, OUTG = r, OUTB = b
    Grb,
    /// OUTR = g, OUTG = b, OUTB = r
    Gbr,
    /// OUTR = b, OUTG = r, OUTB = g
    Brg,
    /// OUTR = b, OUTG = g, OUTB = r
    Bgr,
}

impl ColorOrder {
    /// Values for the `[OUTR, OUTG, OUTB]` pins of one pixel.
    #[must_use]
    pub const fn to_outputs(self, color: Rgb16) -> [u16; 3] {
        let Rgb16 { r, g, b } = color;
        match self {
            Self::Rgb => [r, g, b],
            Self::Rbg => [r, b, g],
            Self::Grb => [g, r, b],
            Self::Gbr => [g, b, r],
            Self::Brg => [b, r, g],
            Self::Bgr => [b, g, r],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_endpoints() {
        let color = ColorInput::Normalized(0.0, 1.0, 0.0).to_rgb16().unwrap();
        assert_eq!(color, Rgb16::new(0, 65535, 0));
    }

    #[test]
    fn test_normalized_rounds_half_up() {
        // 0.5 * 65535 = 32767.5
        let color = ColorInput::from((1.0, 0.5, 0.0)).to_rgb16().unwrap();
        assert_eq!(color, Rgb16::new(65535, 32768, 0));

        // 0.00002 * 65535 = 1.31
        let color = ColorInput::from((0.0, 0.0, 0.00002)).to_rgb16().unwrap();
        assert_eq!(color, Rgb16::new(0, 0, 1));
    }

    #[test]
    fn test_normalized_rounds_to_nearest_near_half() {
        // 7.629511e-6 * 65535 = 0.49999999988, just below one half
        let color = ColorInput::from((7.629_511e-6, 0.0, 0.0)).to_rgb16().unwrap();
        assert_eq!(color, Rgb16::new(0, 0, 0));

        // 7.6295e-5 * 65535 is close to 5.0000
        let color = ColorInput::from((7.6295e-5, 0.0, 0.0)).to_rgb16().unwrap();
        assert_eq!(color.r, 5);
    }

    #[test]
    fn test_normalized_saturates() {
        let color = ColorInput::from((-0.5, 1.5, f32::INFINITY))
            .to_rgb16()
            .unwrap();
        assert_eq!(color, Rgb16::new(0, 65535, 65535));
    }

    #[test]
    fn test_normalized_nan_rejected() {
        assert_eq!(
            ColorInput::from((0.0, f32::NAN, 0.0)).to_rgb16(),
            Err(PixelError::OutOfRange)
        );
    }

    #[test]
    fn test_raw_domain() {
        assert_eq!(
            ColorInput::from((0, 32000, 65535)).to_rgb16(),
            Ok(Rgb16::new(0, 32000, 65535))
        );
        assert_eq!(
            ColorInput::from((65536, 0, 0)).to_rgb16(),
            Err(PixelError::OutOfRange)
        );
        assert_eq!(
            ColorInput::from((0, -1, 0)).to_rgb16(),
            Err(PixelError::OutOfRange)
        );
    }

    #[test]
    fn test_from_rgb888() {
        assert_eq!(Rgb16::from(Rgb888::WHITE), Rgb16::WHITE);
        assert_eq!(Rgb16::from(Rgb888::BLACK), Rgb16::BLACK);
        assert_eq!(Rgb16::from(Rgb888::new(1, 128, 0)), Rgb16::new(257, 32896, 0));
        assert_eq!(
            ColorInput::from(Rgb888::RED).to_rgb16(),
            Ok(Rgb16::new(65535, 0, 0))
        );
    }

    #[test]
    fn test_color_order() {
        let color = Rgb16::new(1, 2, 3);
        assert_eq!(ColorOrder::default(), ColorOrder::Rgb);
        assert_eq!(ColorOrder::Rgb.to_outputs(color), [1, 2, 3]);
        assert_eq!(ColorOrder::Rbg.to_outputs(color), [1, 3, 2]);
        assert_eq!(ColorOrder::Grb.to_outputs(color), [2, 1, 3]);
        assert_eq!(ColorOrder::Gbr.to_outputs(color), [2, 3, 1]);
        assert_eq!(ColorOrder::Brg.to_outputs(color), [3, 1, 2]);
        assert_eq!(ColorOrder::Bgr.to_outputs(color), [3, 2, 1]);
    }
}
