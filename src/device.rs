//! Device façade: a chain of TLC5957 chips addressed as one pixel array.
//!
//! # Example
//! ```rust
//! use core::convert::Infallible;
//! use tlc5957::{Config, Rgb16, SerialLines, Tlc5957};
//!
//! // Any `SerialLines` works; `GpioLines` wraps embedded-hal output pins.
//! struct Lines;
//!
//! impl SerialLines for Lines {
//!     type Error = Infallible;
//!     fn set_data(&mut self, _high: bool) -> Result<(), Infallible> { Ok(()) }
//!     fn pulse_clock(&mut self) -> Result<(), Infallible> { Ok(()) }
//!     fn set_latch(&mut self, _high: bool) -> Result<(), Infallible> { Ok(()) }
//! }
//!
//! // One chip, 16 RGB pixels.
//! let mut pixels = Tlc5957::<_, 16, 1>::new(Lines, Config::default()).unwrap();
//! pixels.initialize().unwrap();
//!
//! // orange, using normalized values
//! pixels.set(0, (1.0, 0.5, 0.0)).unwrap();
//! // sky blue, using raw 16-bit values
//! pixels.set(1, (0, 32000, 65535)).unwrap();
//! pixels.show().unwrap();
//!
//! assert_eq!(pixels.get(0).unwrap(), Rgb16::new(65535, 32768, 0));
//! ```

use crate::buffer::PixelBuffer;
use crate::color::{ColorInput, ColorOrder, Rgb16};
use crate::error::Error;
use crate::frame::{Command, FunctionControlFrame, GrayscaleFrame, Segment};
use crate::function_control::FunctionControl;
use crate::transport::{SerialLines, Transport};
use crate::{chain_fits, PIXELS_PER_CHIP};

/// When [`Tlc5957::show`] transmits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShowMode {
    /// Every call sends a full grayscale frame.
    #[default]
    Always,
    /// Calls are skipped while the buffer is unchanged since the last frame.
    OnChange,
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Register contents written to every chip by [`Tlc5957::initialize`].
    pub function_control: FunctionControl,
    /// Wiring of the logical channels to the output pins.
    pub color_order: ColorOrder,
    /// Flush behavior.
    pub show_mode: ShowMode,
}

impl Config {
    /// Use `function_control` for every chip.
    #[must_use]
    pub const fn with_function_control(mut self, function_control: FunctionControl) -> Self {
        self.function_control = function_control;
        self
    }

    /// Set the output wiring.
    #[must_use]
    pub const fn with_color_order(mut self, color_order: ColorOrder) -> Self {
        self.color_order = color_order;
        self
    }

    /// Set the flush behavior.
    #[must_use]
    pub const fn with_show_mode(mut self, show_mode: ShowMode) -> Self {
        self.show_mode = show_mode;
        self
    }
}

/// `CHIPS` daisy-chained TLC5957 drivers exposed as `PIXELS` RGB pixels.
///
/// `PIXELS` must equal `CHIPS * 16`; use [`compute_pixel_count`] or
/// [`compute_chip_count`] to derive one from the other.
///
/// The driver owns the lines and the buffer. It does no locking: callers that
/// share it between tasks must serialize access themselves.
///
/// [`compute_pixel_count`]: crate::compute_pixel_count
/// [`compute_chip_count`]: crate::compute_chip_count
pub struct Tlc5957<L, const PIXELS: usize, const CHIPS: usize> {
    transport: Transport<L>,
    buffer: PixelBuffer<PIXELS>,
    function_control: [FunctionControl; CHIPS],
    color_order: ColorOrder,
    show_mode: ShowMode,
    initialized: bool,
}

impl<L, const PIXELS: usize, const CHIPS: usize> Tlc5957<L, PIXELS, CHIPS>
where
    L: SerialLines,
{
    /// Create the driver. No bus traffic happens until [`initialize`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidChipCount`] unless `CHIPS > 0` and
    /// `PIXELS == CHIPS * 16`.
    ///
    /// [`initialize`]: Self::initialize
    pub fn new(lines: L, config: Config) -> Result<Self, Error<L::Error>> {
        if !chain_fits(PIXELS, CHIPS) {
            warn!("{} pixels do not fit {} chips", PIXELS, CHIPS);
            return Err(Error::InvalidChipCount {
                pixels: PIXELS,
                chips: CHIPS,
            });
        }
        Ok(Self {
            transport: Transport::new(lines),
            buffer: PixelBuffer::new(),
            function_control: [config.function_control; CHIPS],
            color_order: config.color_order,
            show_mode: config.show_mode,
            initialized: false,
        })
    }

    /// Write the function control register of every chip.
    ///
    /// Must succeed once before [`show`](Self::show) is allowed. Calling it
    /// again rewrites the registers.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] if the lines fail; the device then stays
    /// uninitialized.
    pub fn initialize(&mut self) -> Result<(), Error<L::Error>> {
        debug!("initializing {} chips", CHIPS);
        self.write_function_control()?;
        self.initialized = true;
        Ok(())
    }

    /// Rewrite the function control registers after editing them.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before [`initialize`](Self::initialize),
    /// [`Error::Transport`] if the lines fail.
    pub fn update_function_control(&mut self) -> Result<(), Error<L::Error>> {
        self.ensure_initialized()?;
        self.write_function_control()
    }

    /// Transmit the buffer and latch it to the outputs.
    ///
    /// With [`ShowMode::OnChange`] nothing is sent while the buffer is
    /// unchanged since the last successful frame.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before [`initialize`](Self::initialize),
    /// without any bus traffic. [`Error::Transport`] if the lines fail;
    /// the outputs keep their previous values unless the failure happened
    /// after the final latch.
    pub fn show(&mut self) -> Result<(), Error<L::Error>> {
        self.ensure_initialized()?;
        if self.show_mode == ShowMode::OnChange && !self.buffer.is_dirty() {
            return Ok(());
        }
        let frame = GrayscaleFrame::<PIXELS, CHIPS>::new(&self.buffer, self.color_order).ok_or(
            Error::InvalidChipCount {
                pixels: PIXELS,
                chips: CHIPS,
            },
        )?;
        let pulses = self.transport.send(frame).map_err(|err| {
            warn!("grayscale frame failed");
            Error::Transport(err)
        })?;
        trace!("grayscale frame sent, {} clocks", pulses);
        self.buffer.mark_clean();
        Ok(())
    }

    /// Reset the chips' internal line and grayscale counters (`TMGRST`).
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] before [`initialize`](Self::initialize),
    /// [`Error::Transport`] if the lines fail.
    pub fn reset_timing(&mut self) -> Result<(), Error<L::Error>> {
        self.ensure_initialized()?;
        debug!("timing reset");
        self.transport
            .send_segment(&Segment::<CHIPS>::command_only(Command::TimingReset))
            .map_err(Error::Transport)
    }

    /// Store a pixel value; see [`PixelBuffer::set`].
    ///
    /// # Errors
    ///
    /// [`Error::Pixel`] for an index or range error. The buffer is unchanged.
    pub fn set(&mut self, index: usize, value: impl Into<ColorInput>) -> Result<(), Error<L::Error>> {
        Ok(self.buffer.set(index, value)?)
    }

    /// Read back a stored pixel value.
    ///
    /// # Errors
    ///
    /// [`Error::Pixel`] if `index` is out of bounds.
    pub fn get(&self, index: usize) -> Result<Rgb16, Error<L::Error>> {
        Ok(self.buffer.get(index)?)
    }

    /// Store the same value in every pixel.
    ///
    /// # Errors
    ///
    /// [`Error::Pixel`] for a range error. The buffer is unchanged.
    pub fn set_all(&mut self, value: impl Into<ColorInput>) -> Result<(), Error<L::Error>> {
        Ok(self.buffer.set_all(value)?)
    }

    /// Turn every pixel off. Takes effect on the next [`show`](Self::show).
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Function control register of chip `chip` (0 = first in the chain).
    #[must_use]
    pub fn function_control(&self, chip: usize) -> Option<FunctionControl> {
        self.function_control.get(chip).copied()
    }

    /// Replace the register of one chip. Sent by the next
    /// [`update_function_control`](Self::update_function_control).
    ///
    /// # Errors
    ///
    /// [`Error::ChipOutOfBounds`] if `chip >= CHIPS`.
    pub fn set_function_control(
        &mut self,
        chip: usize,
        function_control: FunctionControl,
    ) -> Result<(), Error<L::Error>> {
        let slot = self
            .function_control
            .get_mut(chip)
            .ok_or(Error::ChipOutOfBounds { chip, chips: CHIPS })?;
        *slot = function_control;
        Ok(())
    }

    /// Replace the register of every chip.
    pub fn set_function_control_all(&mut self, function_control: FunctionControl) {
        self.function_control = [function_control; CHIPS];
    }

    /// Set the red, green and blue color control of every chip.
    ///
    /// # Errors
    ///
    /// [`Error::FunctionControlOutOfRange`] if a value exceeds
    /// [`COLOR_CONTROL_MAX`](crate::COLOR_CONTROL_MAX); nothing is changed.
    pub fn set_color_control_all(
        &mut self,
        red: u16,
        green: u16,
        blue: u16,
    ) -> Result<(), Error<L::Error>> {
        let mut updated = self.function_control;
        for fc in &mut updated {
            *fc = fc
                .checked_color_control(red, green, blue)
                .ok_or(Error::FunctionControlOutOfRange)?;
        }
        self.function_control = updated;
        Ok(())
    }

    /// Set the global brightness control of every chip.
    ///
    /// # Errors
    ///
    /// [`Error::FunctionControlOutOfRange`] if `value` exceeds
    /// [`BRIGHTNESS_CONTROL_MAX`](crate::BRIGHTNESS_CONTROL_MAX).
    pub fn set_brightness_control_all(&mut self, value: u8) -> Result<(), Error<L::Error>> {
        let mut updated = self.function_control;
        for fc in &mut updated {
            *fc = fc
                .checked_brightness_control(value)
                .ok_or(Error::FunctionControlOutOfRange)?;
        }
        self.function_control = updated;
        Ok(())
    }

    fn write_function_control(&mut self) -> Result<(), Error<L::Error>> {
        let frame = FunctionControlFrame::new(&self.function_control);
        self.transport.send(frame).map_err(|err| {
            warn!("function control write failed");
            Error::Transport(err)
        })?;
        debug!("function control written");
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), Error<L::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}

impl<L, const PIXELS: usize, const CHIPS: usize> Tlc5957<L, PIXELS, CHIPS> {
    /// Number of pixels.
    #[must_use]
    pub const fn len(&self) -> usize {
        PIXELS
    }

    /// Returns `true` if the chain has no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        PIXELS == 0
    }

    /// Number of chips in the chain.
    #[must_use]
    pub const fn chip_count(&self) -> usize {
        CHIPS
    }

    /// Number of pixels per chip.
    #[must_use]
    pub const fn pixels_per_chip(&self) -> usize {
        PIXELS_PER_CHIP
    }

    /// Returns `true` once the function control registers were written.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Read-only view of the pixel buffer.
    #[must_use]
    pub const fn pixels(&self) -> &PixelBuffer<PIXELS> {
        &self.buffer
    }

    /// Give the lines back.
    pub fn release(self) -> L {
        self.transport.release()
    }
}

impl<L, const PIXELS: usize, const CHIPS: usize> core::fmt::Debug for Tlc5957<L, PIXELS, CHIPS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tlc5957")
            .field("pixels", &PIXELS)
            .field("chips", &CHIPS)
            .field("color_order", &self.color_order)
            .field("show_mode", &self.show_mode)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<L, const PIXELS: usize, const CHIPS: usize> defmt::Format for Tlc5957<L, PIXELS, CHIPS> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Tlc5957<{}, {}> initialized: {}",
            PIXELS,
            CHIPS,
            self.initialized
        );
    }
}
