//! Error types.

use core::fmt;

/// Errors raised by pixel buffer writes and reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelError {
    /// The pixel index is not inside `0..len`.
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of pixels in the buffer
        len: usize,
    },
    /// A channel value is outside the accepted domain for its representation.
    OutOfRange,
}

impl fmt::Display for PixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "pixel index {index} out of bounds for {len} pixels")
            }
            Self::OutOfRange => f.write_str("channel value out of range"),
        }
    }
}

/// Errors raised by the [`Tlc5957`](crate::Tlc5957) driver.
///
/// `E` is the error type of the underlying [`SerialLines`](crate::SerialLines).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The pixel count does not fill the configured chain of chips exactly.
    InvalidChipCount {
        /// Pixels in the buffer
        pixels: usize,
        /// Chips in the chain
        chips: usize,
    },
    /// A pixel write or read failed.
    Pixel(PixelError),
    /// A chip index is not inside the chain.
    ChipOutOfBounds {
        /// Requested chip
        chip: usize,
        /// Chips in the chain
        chips: usize,
    },
    /// A function control value does not fit its register field.
    FunctionControlOutOfRange,
    /// A grayscale frame was requested before the function control register
    /// was written.
    NotInitialized,
    /// The serial lines reported a failure.
    Transport(E),
}

impl<E> From<PixelError> for Error<E> {
    fn from(err: PixelError) -> Self {
        Self::Pixel(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChipCount { pixels, chips } => write!(
                f,
                "{pixels} pixels cannot be spread over {chips} chips of {} pixels",
                crate::PIXELS_PER_CHIP
            ),
            Self::Pixel(err) => err.fmt(f),
            Self::ChipOutOfBounds { chip, chips } => {
                write!(f, "chip index {chip} out of bounds for {chips} chips")
            }
            Self::FunctionControlOutOfRange => {
                f.write_str("function control value does not fit its field")
            }
            Self::NotInitialized => f.write_str("device not initialized"),
            Self::Transport(err) => write!(f, "transport error: {err:?}"),
        }
    }
}
