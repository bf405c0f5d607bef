//! Frame builder: turns pixel data and function control words into the exact
//! bit sequences the TLC5957 expects.
//!
//! # Protocol
//!
//! The chip has a 48-bit common shift register (`SIN` → `SOUT`). Chained
//! chips form one long shift register, so the data for the chip furthest
//! from the controller has to be shifted first. What happens to the shifted
//! data is selected by how many `SCLK` rising edges occur while `LAT` is
//! high at the end of the transfer ([`Command::latch_pulses`]):
//!
//! | Command     | Pulses | Effect                                          |
//! |-------------|--------|-------------------------------------------------|
//! | `WRTGS`     | 1      | shift register → GS data latch 1 (next group)   |
//! | `LATGS`     | 3      | as `WRTGS`, then GS latch 1 → GS latch 2 (LEDs) |
//! | `WRTFC`     | 5      | shift register → FC data latch                  |
//! | `TMGRST`    | 13     | reset internal timing counters                  |
//! | `FCWRTEN`   | 15     | unlock the next `WRTFC`                         |
//!
//! Each 48-bit word carries one pixel: bits 47-32 drive `OUTB`, 31-16
//! `OUTG` and 15-0 `OUTR`, shifted MSB first.
//!
//! # Frames
//!
//! A frame is an iterator of [`Segment`]s. One segment is one latch
//! command: the words of every chip in the chain (last chip first) with
//! `LAT` high for exactly the final `latch_pulses` bits.
//!
//! - [`GrayscaleFrame`]: 16 segments, one per output group. Groups 0-14
//!   use `WRTGS`, group 15 uses `LATGS` so all outputs update at once.
//! - [`FunctionControlFrame`]: an `FCWRTEN` segment followed by one
//!   `WRTFC` segment.
//!
//! The two frame kinds are distinct types and are never mixed.

use bitfield::bitfield;

use crate::buffer::PixelBuffer;
use crate::color::ColorOrder;
use crate::function_control::FunctionControl;
use crate::{chain_fits, PIXELS_PER_CHIP};

/// Width of the common shift register of one chip.
pub const SHIFT_REGISTER_BITS: usize = 48;

bitfield! {
    /// Contents of one chip's 48-bit common shift register.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct ShiftWord(u64);
    impl Debug;
    /// `OUTBn` grayscale value
    pub u16, blue, set_blue: 47, 32;
    /// `OUTGn` grayscale value
    pub u16, green, set_green: 31, 16;
    /// `OUTRn` grayscale value
    pub u16, red, set_red: 15, 0;
}

impl ShiftWord {
    /// All bits clear.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Word for one pixel from its `[OUTR, OUTG, OUTB]` values.
    #[must_use]
    pub const fn from_outputs(outputs: [u16; 3]) -> Self {
        let [r, g, b] = outputs;
        Self(((b as u64) << 32) | ((g as u64) << 16) | r as u64)
    }

    /// Word carrying a function control register.
    #[must_use]
    pub const fn from_function_control(fc: FunctionControl) -> Self {
        Self(fc.bits())
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// The `n`th bit in shift order: `0` is bit 47, `47` is bit 0.
    #[must_use]
    pub const fn shifted_bit(self, n: usize) -> bool {
        (self.0 >> (SHIFT_REGISTER_BITS - 1 - n)) & 1 == 1
    }
}

/// Latch command, encoded as the number of `SCLK` edges seen while `LAT` is
/// high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `WRTGS`: store the shift register in GS data latch 1.
    WriteGrayscale,
    /// `LATGS`: store the shift register and copy GS latch 1 to the outputs.
    LatchGrayscale,
    /// `WRTFC`: store the shift register in the FC data latch.
    WriteFunctionControl,
    /// `TMGRST`: reset the internal line and GSCLK counters.
    TimingReset,
    /// `FCWRTEN`: enable the next `WRTFC`.
    FunctionControlWriteEnable,
}

impl Command {
    /// Number of trailing `SCLK` pulses during which `LAT` is held high.
    #[must_use]
    pub const fn latch_pulses(self) -> usize {
        match self {
            Self::WriteGrayscale => 1,
            Self::LatchGrayscale => 3,
            Self::WriteFunctionControl => 5,
            Self::TimingReset => 13,
            Self::FunctionControlWriteEnable => 15,
        }
    }
}

/// Line levels for one `SCLK` pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bit {
    /// `SIN` level
    pub level: bool,
    /// `LAT` level
    pub latch: bool,
}

/// One latch command and the data shifted in ahead of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<const CHIPS: usize> {
    command: Command,
    words: [ShiftWord; CHIPS],
    len: usize,
}

impl<const CHIPS: usize> Segment<CHIPS> {
    /// Segment shifting one word per chip. `words[0]` is shifted first and
    /// ends up in the last chip of the chain.
    #[must_use]
    pub const fn with_words(command: Command, words: [ShiftWord; CHIPS]) -> Self {
        Self {
            command,
            words,
            len: CHIPS * SHIFT_REGISTER_BITS,
        }
    }

    /// Segment carrying no data: only the latch pulses, with `SIN` low.
    #[must_use]
    pub const fn command_only(command: Command) -> Self {
        Self {
            command,
            words: [ShiftWord::new(); CHIPS],
            len: command.latch_pulses(),
        }
    }

    /// The latch command that ends this segment.
    #[must_use]
    pub const fn command(&self) -> Command {
        self.command
    }

    /// Words in shift order.
    #[must_use]
    pub const fn words(&self) -> &[ShiftWord; CHIPS] {
        &self.words
    }

    /// Number of `SCLK` pulses in the segment.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the segment has no pulses.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Line levels for pulse `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn bit(&self, index: usize) -> Bit {
        assert!(index < self.len, "bit index out of range");
        let level = if index < CHIPS * SHIFT_REGISTER_BITS {
            self.words[index / SHIFT_REGISTER_BITS].shifted_bit(index % SHIFT_REGISTER_BITS)
        } else {
            false
        };
        let latch = index >= self.len.saturating_sub(self.command.latch_pulses());
        Bit { level, latch }
    }

    /// Iterate over the line levels of every pulse.
    #[must_use]
    pub fn bits(&self) -> Bits<'_, CHIPS> {
        Bits {
            segment: self,
            index: 0,
        }
    }
}

/// Iterator over the pulses of a [`Segment`].
#[derive(Debug, Clone)]
pub struct Bits<'a, const CHIPS: usize> {
    segment: &'a Segment<CHIPS>,
    index: usize,
}

impl<const CHIPS: usize> Iterator for Bits<'_, CHIPS> {
    type Item = Bit;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.segment.len() {
            return None;
        }
        let bit = self.segment.bit(self.index);
        self.index += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.segment.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<const CHIPS: usize> ExactSizeIterator for Bits<'_, CHIPS> {}

/// Grayscale frame for a chain of `CHIPS` chips driving `PIXELS` pixels.
///
/// Segment `g` carries output group `g` of every chip: pixel
/// `chip * 16 + g`, last chip first.
#[derive(Debug, Clone)]
pub struct GrayscaleFrame<'a, const PIXELS: usize, const CHIPS: usize> {
    buffer: &'a PixelBuffer<PIXELS>,
    order: ColorOrder,
    group: usize,
}

impl<'a, const PIXELS: usize, const CHIPS: usize> GrayscaleFrame<'a, PIXELS, CHIPS> {
    /// Build the frame for the current buffer contents.
    ///
    /// Returns `None` unless `PIXELS == CHIPS * 16` and `CHIPS > 0`.
    #[must_use]
    pub fn new(buffer: &'a PixelBuffer<PIXELS>, order: ColorOrder) -> Option<Self> {
        if !chain_fits(PIXELS, CHIPS) {
            return None;
        }
        Some(Self {
            buffer,
            order,
            group: 0,
        })
    }

    fn segment(&self, group: usize) -> Segment<CHIPS> {
        let words = core::array::from_fn(|position| {
            let chip = CHIPS - 1 - position;
            let pixel = self.buffer[chip * PIXELS_PER_CHIP + group];
            ShiftWord::from_outputs(self.order.to_outputs(pixel))
        });
        let command = if group == PIXELS_PER_CHIP - 1 {
            Command::LatchGrayscale
        } else {
            Command::WriteGrayscale
        };
        Segment::with_words(command, words)
    }
}

impl<const PIXELS: usize, const CHIPS: usize> Iterator for GrayscaleFrame<'_, PIXELS, CHIPS> {
    type Item = Segment<CHIPS>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.group >= PIXELS_PER_CHIP {
            return None;
        }
        let segment = self.segment(self.group);
        self.group += 1;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = PIXELS_PER_CHIP - self.group;
        (remaining, Some(remaining))
    }
}

impl<const PIXELS: usize, const CHIPS: usize> ExactSizeIterator
    for GrayscaleFrame<'_, PIXELS, CHIPS>
{
}

/// Function control frame: `FCWRTEN` followed by `WRTFC`.
#[derive(Debug, Clone)]
pub struct FunctionControlFrame<const CHIPS: usize> {
    words: [ShiftWord; CHIPS],
    stage: u8,
}

impl<const CHIPS: usize> FunctionControlFrame<CHIPS> {
    /// Build the frame. `registers[0]` belongs to the first chip of the
    /// chain, the one wired to the controller.
    #[must_use]
    pub fn new(registers: &[FunctionControl; CHIPS]) -> Self {
        Self {
            words: core::array::from_fn(|position| {
                ShiftWord::from_function_control(registers[CHIPS - 1 - position])
            }),
            stage: 0,
        }
    }
}

impl<const CHIPS: usize> Iterator for FunctionControlFrame<CHIPS> {
    type Item = Segment<CHIPS>;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = match self.stage {
            0 => Segment::command_only(Command::FunctionControlWriteEnable),
            1 => Segment::with_words(Command::WriteFunctionControl, self.words),
            _ => return None,
        };
        self.stage += 1;
        Some(segment)
    }
}
