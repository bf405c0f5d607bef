//! In-memory grayscale state for a chain of TLC5957 chips.
//!
//! The buffer holds one [`Rgb16`] per pixel and a dirty flag that is raised
//! by every successful write and lowered once the contents have been
//! transmitted. Pixel `i` lives on chip `i / 16`, output group `i % 16`.
//!
//! The buffer is also an `embedded-graphics` [`DrawTarget`] of `PIXELS × 1`
//! so existing drawing code can paint into a strip of LEDs:
//!
//! ```rust
//! use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{Line, PrimitiveStyle};
//! use tlc5957::{PixelBuffer, Rgb16};
//!
//! let mut buffer = PixelBuffer::<16>::new();
//! Line::new(Point::new(2, 0), Point::new(5, 0))
//!     .into_styled(PrimitiveStyle::with_stroke(Rgb888::BLUE, 1))
//!     .draw(&mut buffer)
//!     .unwrap();
//! assert_eq!(buffer.get(3), Ok(Rgb16::new(0, 0, 65535)));
//! ```

use core::convert::Infallible;
use core::ops::Index;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{OriginDimensions, Size};
use embedded_graphics::Pixel;

use crate::color::{ColorInput, Rgb16};
use crate::error::PixelError;

/// Fixed-length pixel store with change tracking.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer<const PIXELS: usize> {
    pixels: [Rgb16; PIXELS],
    dirty: bool,
}

impl<const PIXELS: usize> PixelBuffer<PIXELS> {
    /// Create a buffer with every pixel off.
    ///
    /// A fresh buffer counts as dirty so the first flush always transmits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pixels: [Rgb16::BLACK; PIXELS],
            dirty: true,
        }
    }

    /// Number of pixels.
    #[must_use]
    pub const fn len(&self) -> usize {
        PIXELS
    }

    /// Returns `true` if the buffer holds no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        PIXELS == 0
    }

    /// Store a pixel value.
    ///
    /// On error the buffer is left untouched.
    ///
    /// # Errors
    ///
    /// [`PixelError::IndexOutOfBounds`] if `index >= len()`,
    /// [`PixelError::OutOfRange`] if a channel is outside its domain.
    pub fn set(&mut self, index: usize, value: impl Into<ColorInput>) -> Result<(), PixelError> {
        let slot = self
            .pixels
            .get_mut(index)
            .ok_or(PixelError::IndexOutOfBounds { index, len: PIXELS })?;
        *slot = value.into().to_rgb16()?;
        self.dirty = true;
        Ok(())
    }

    /// Read back the stored value of a pixel.
    ///
    /// # Errors
    ///
    /// [`PixelError::IndexOutOfBounds`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<Rgb16, PixelError> {
        self.pixels
            .get(index)
            .copied()
            .ok_or(PixelError::IndexOutOfBounds { index, len: PIXELS })
    }

    /// Store the same value in every pixel.
    ///
    /// # Errors
    ///
    /// [`PixelError::OutOfRange`] if a channel is outside its domain; no
    /// pixel is changed in that case.
    pub fn set_all(&mut self, value: impl Into<ColorInput>) -> Result<(), PixelError> {
        let color = value.into().to_rgb16()?;
        self.fill(color);
        Ok(())
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.fill(Rgb16::BLACK);
    }

    /// Iterate over the stored values in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, Rgb16> {
        self.pixels.iter()
    }

    /// All pixels as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[Rgb16] {
        &self.pixels
    }

    /// Returns `true` if the buffer changed since it was last marked clean.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the current contents as transmitted.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn fill(&mut self, color: Rgb16) {
        self.pixels.fill(color);
        self.dirty = true;
    }
}

impl<const PIXELS: usize> Default for PixelBuffer<PIXELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PIXELS: usize> Index<usize> for PixelBuffer<PIXELS> {
    type Output = Rgb16;

    /// # Panics
    ///
    /// Panics if `index >= len()`; use [`PixelBuffer::get`] for a checked read.
    fn index(&self, index: usize) -> &Self::Output {
        &self.pixels[index]
    }
}

impl<'a, const PIXELS: usize> IntoIterator for &'a PixelBuffer<PIXELS> {
    type Item = &'a Rgb16;
    type IntoIter = core::slice::Iter<'a, Rgb16>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const PIXELS: usize> OriginDimensions for PixelBuffer<PIXELS> {
    fn size(&self) -> Size {
        Size::new(PIXELS as u32, 1)
    }
}

impl<const PIXELS: usize> DrawTarget for PixelBuffer<PIXELS> {
    type Color = Rgb888;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.y != 0 || point.x < 0 {
                continue;
            }
            if let Some(slot) = self.pixels.get_mut(point.x as usize) {
                *slot = color.into();
                self.dirty = true;
            }
        }
        Ok(())
    }
}

impl<const PIXELS: usize> core::fmt::Debug for PixelBuffer<PIXELS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("len", &PIXELS)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<const PIXELS: usize> defmt::Format for PixelBuffer<PIXELS> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PixelBuffer<{}> dirty: {}", PIXELS, self.dirty);
    }
}
