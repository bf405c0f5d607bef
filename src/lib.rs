//! Driver for daisy-chained TI TLC5957 48-channel, 16-bit PWM LED drivers.
//!
//! ## How the TLC5957 Works
//!
//! The TLC5957 drives 48 constant-current outputs (16 RGB pixels) with 16-bit
//! PWM. Data is clocked in serially and committed to one of two register
//! spaces depending on how long the latch line is held.
//!
//! ### Signal names
//! - **SIN** – Serial data input, sampled on the rising edge of SCLK
//! - **SCLK** – Shift clock; every rising edge moves the 48-bit common shift register by one bit
//! - **LAT** – Latch; the number of SCLK edges seen while LAT is high selects the command executed on its falling edge
//! - **GSCLK** – Free-running grayscale reference clock for the PWM counters
//! - **SOUT** – Serial output, wired to SIN of the next chip in a chain
//!
//! ### Writing a frame
//! 1. For each of the 16 output groups, the controller shifts 48 bits per chip
//!    (OUTB, OUTG, OUTR of one pixel, MSB first). Chips in a chain behave like
//!    one long shift register, so the last chip's bits go first.
//! 2. LAT is raised for the final clock (`WRTGS`) to store the group in GS
//!    data latch 1. The chip advances to the next group on its own.
//! 3. The last group uses three latched clocks (`LATGS`), which also copies
//!    GS data latch 1 into GS data latch 2: all outputs change at once.
//!
//! ### Operating mode
//! The function control register (current ranges, PWM mode, low grayscale
//! enhancement …) lives in a separate space. It is unlocked by holding LAT for
//! 15 clocks (`FCWRTEN`) and written by a 48-bit-per-chip transfer latched for
//! 5 clocks (`WRTFC`). [`Tlc5957::initialize`] does this once before the first
//! grayscale frame.
//!
//! ## Crate layout
//!
//! - [`color`] – [`Rgb16`] pixel values and the [`ColorInput`] write domains
//! - [`buffer`] – [`PixelBuffer`], the in-memory grayscale state
//! - [`function_control`] – the [`FunctionControl`] register layout
//! - [`frame`] – bit-exact frame construction
//! - [`transport`] – [`SerialLines`] and the [`Transport`] that drives them
//! - [`device`] – the [`Tlc5957`] façade tying everything together
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public types and routes the driver's
//! log output through `defmt`.
//!
//! ### `log` Feature
//! Routes the driver's log output through the `log` crate. Ignored when
//! `defmt` is enabled as well.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
mod fmt;

pub mod buffer;
pub mod color;
pub mod device;
pub mod error;
pub mod frame;
pub mod function_control;
pub mod transport;

pub use buffer::PixelBuffer;
pub use color::{ColorInput, ColorOrder, Rgb16};
pub use device::{Config, ShowMode, Tlc5957};
pub use error::{Error, PixelError};
pub use frame::{Command, FunctionControlFrame, GrayscaleFrame, Segment};
pub use function_control::{FunctionControl, BRIGHTNESS_CONTROL_MAX, COLOR_CONTROL_MAX};
pub use transport::{start_grayscale_clock, GpioLines, SerialLines, Transport};

/// RGB pixels driven by one chip.
pub const PIXELS_PER_CHIP: usize = 16;

/// Color channels per pixel.
pub const CHANNELS_PER_PIXEL: usize = 3;

/// Output channels of one chip.
pub const CHANNELS_PER_CHIP: usize = PIXELS_PER_CHIP * CHANNELS_PER_PIXEL;

/// Grayscale resolution of one channel.
pub const BITS_PER_CHANNEL: usize = 16;

/// Computes the number of pixels of a chain of chips.
///
/// # Arguments
///
/// * `chips` - Number of daisy-chained chips
///
/// # Returns
///
/// Value to use for the `PIXELS` parameter of [`Tlc5957`]
#[must_use]
pub const fn compute_pixel_count(chips: usize) -> usize {
    chips * PIXELS_PER_CHIP
}

/// Computes the number of chips needed for a pixel count.
///
/// The result is rounded up; [`Tlc5957::new`] still rejects pixel counts that
/// do not fill the last chip.
///
/// # Arguments
///
/// * `pixels` - Number of RGB pixels
///
/// # Returns
///
/// Value to use for the `CHIPS` parameter of [`Tlc5957`]
#[must_use]
pub const fn compute_chip_count(pixels: usize) -> usize {
    pixels.div_ceil(PIXELS_PER_CHIP)
}

/// Computes the number of bits in one grayscale frame.
///
/// # Arguments
///
/// * `chips` - Number of daisy-chained chips
#[must_use]
pub const fn compute_frame_bits(chips: usize) -> usize {
    chips * CHANNELS_PER_CHIP * BITS_PER_CHANNEL
}

/// Returns `true` if `pixels` exactly fills a non-empty chain of `chips`.
#[must_use]
pub const fn chain_fits(pixels: usize, chips: usize) -> bool {
    chips > 0 && pixels == compute_pixel_count(chips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_pixel_count() {
        assert_eq!(compute_pixel_count(1), 16);
        assert_eq!(compute_pixel_count(2), 32);
        assert_eq!(compute_pixel_count(0), 0);

        for chips in 1..=8 {
            assert_eq!(compute_pixel_count(chips), chips * 16);
        }
    }

    #[test]
    fn test_compute_chip_count() {
        assert_eq!(compute_chip_count(16), 1);
        assert_eq!(compute_chip_count(32), 2);
        assert_eq!(compute_chip_count(17), 2);
        assert_eq!(compute_chip_count(1), 1);
        assert_eq!(compute_chip_count(0), 0);
    }

    #[test]
    fn test_compute_frame_bits() {
        assert_eq!(compute_frame_bits(1), 768);
        assert_eq!(compute_frame_bits(3), 3 * 48 * 16);
    }

    #[test]
    fn test_chain_fits() {
        assert!(chain_fits(16, 1));
        assert!(chain_fits(48, 3));
        assert!(!chain_fits(20, 1));
        assert!(!chain_fits(16, 2));
        assert!(!chain_fits(0, 0));
    }

    #[test]
    fn test_channel_constants() {
        assert_eq!(CHANNELS_PER_CHIP, 48);
        assert_eq!(CHANNELS_PER_CHIP, frame::SHIFT_REGISTER_BITS / BITS_PER_CHANNEL * PIXELS_PER_CHIP);
    }

    #[test]
    fn test_helper_functions_const() {
        const CHIPS: usize = 2;
        const PIXELS: usize = compute_pixel_count(CHIPS);
        const FRAME_BITS: usize = compute_frame_bits(CHIPS);

        assert_eq!(PIXELS, 32);
        assert_eq!(compute_chip_count(PIXELS), CHIPS);
        assert_eq!(FRAME_BITS, 1536);
    }
}
