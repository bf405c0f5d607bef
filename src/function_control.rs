//! Function control (FC) register of the TLC5957.
//!
//! Each chip holds one 48-bit FC register that selects its operating mode:
//! output current ranges, PWM mode, low grayscale enhancement and a handful of
//! timing options. The register lives in a separate address space from the
//! grayscale data and is only written when the latch is held for the `WRTFC`
//! pulse count after an `FCWRTEN` unlock (see [`crate::frame`]).
//!
//! # Bit layout
//!
//! | Bits  | Field            | Default |
//! |-------|------------------|---------|
//! | 1-0   | `LODVTH`         | `01`    |
//! | 3-2   | `SEL_TD0`        | `01`    |
//! | 4     | `SEL_GDLY`       | `1`     |
//! | 5     | `XREFRESH`       | `0`     |
//! | 6     | `SEL_GCK_EDGE`   | `0`     |
//! | 7     | `SEL_PCHG`       | `0`     |
//! | 8     | `ESPWM`          | `0`     |
//! | 9     | `LGSE3`          | `0`     |
//! | 10    | `SEL_SCK_EDGE`   | `0`     |
//! | 13-11 | `LGSE1`          | `000`   |
//! | 22-14 | `CCB`            | `0x100` |
//! | 31-23 | `CCG`            | `0x100` |
//! | 40-32 | `CCR`            | `0x100` |
//! | 43-41 | `BC`             | `100`   |
//! | 44    | `PokerTransMode` | `0`     |
//! | 47-45 | `LGSE2`          | `000`   |

use bitfield::bitfield;

/// Width of the FC register in bits.
pub const FC_BITS: usize = 48;

/// Largest color control (`CCR`/`CCG`/`CCB`) value.
pub const COLOR_CONTROL_MAX: u16 = 0x1ff;

/// Largest global brightness control (`BC`) value.
pub const BRIGHTNESS_CONTROL_MAX: u8 = 0b111;

bitfield! {
    /// 48-bit function control word for one chip, stored in the low bits of a
    /// `u64`.
    ///
    /// Setters mask their argument to the field width; use the `checked_*`
    /// builders to reject values that do not fit.
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct FunctionControl(u64);
    impl Debug;
    /// LED open detection voltage threshold.
    pub u8, lod_threshold, set_lod_threshold: 1, 0;
    /// TD0 select: SOUT delay and turn-on time of the outputs.
    pub u8, turn_on_delay, set_turn_on_delay: 3, 2;
    /// Group delay select.
    pub group_delay, set_group_delay: 4;
    /// Auto data refresh disable. When set, GS data latch 2 is only updated by
    /// `LATGS`.
    pub auto_refresh_disable, set_auto_refresh_disable: 5;
    /// Count GSCLK on both edges.
    pub gsclk_both_edges, set_gsclk_both_edges: 6;
    /// Pre-charge working mode select.
    pub precharge_mode, set_precharge_mode: 7;
    /// Enhanced spectrum PWM mode.
    pub enhanced_spectrum_pwm, set_enhanced_spectrum_pwm: 8;
    /// Low grayscale enhancement for red/green/blue color shift.
    pub lgse3, set_lgse3: 9;
    /// Sample SIN on both SCLK edges.
    pub sclk_both_edges, set_sclk_both_edges: 10;
    /// Low grayscale enhancement, first-line performance.
    pub u8, lgse1, set_lgse1: 13, 11;
    /// Blue color control (constant current ratio).
    pub u16, color_control_blue, set_color_control_blue: 22, 14;
    /// Green color control (constant current ratio).
    pub u16, color_control_green, set_color_control_green: 31, 23;
    /// Red color control (constant current ratio).
    pub u16, color_control_red, set_color_control_red: 40, 32;
    /// Global brightness control for all outputs.
    pub u8, brightness_control, set_brightness_control: 43, 41;
    /// Poker transmission mode (9-bit grayscale shifting).
    pub poker_mode, set_poker_mode: 44;
    /// Low grayscale enhancement, coupling compensation.
    pub u8, lgse2, set_lgse2: 47, 45;
}

impl FunctionControl {
    /// Power-on register contents.
    pub const DEFAULT: Self = Self(
        0b01
            | (0b01 << 2)
            | (1 << 4)
            | (0x100 << 14)
            | (0x100 << 23)
            | (0x100 << 32)
            | (0b100 << 41),
    );

    const MASK: u64 = (1 << FC_BITS) - 1;

    /// Build a word from raw register bits. Bits above 47 are dropped.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits & Self::MASK)
    }

    /// Raw register bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` if bit `index` (0 = LSB) is set.
    #[must_use]
    pub const fn bit_at(self, index: usize) -> bool {
        (self.0 >> index) & 1 == 1
    }

    /// Copy with the three color control values replaced, or `None` if any
    /// exceeds [`COLOR_CONTROL_MAX`].
    #[must_use]
    pub fn checked_color_control(mut self, red: u16, green: u16, blue: u16) -> Option<Self> {
        if red > COLOR_CONTROL_MAX || green > COLOR_CONTROL_MAX || blue > COLOR_CONTROL_MAX {
            return None;
        }
        self.set_color_control_red(red);
        self.set_color_control_green(green);
        self.set_color_control_blue(blue);
        Some(self)
    }

    /// Copy with the global brightness control replaced, or `None` if it
    /// exceeds [`BRIGHTNESS_CONTROL_MAX`].
    #[must_use]
    pub fn checked_brightness_control(mut self, value: u8) -> Option<Self> {
        if value > BRIGHTNESS_CONTROL_MAX {
            return None;
        }
        self.set_brightness_control(value);
        Some(self)
    }

    /// Copy with enhanced spectrum PWM switched on or off.
    #[must_use]
    pub fn with_enhanced_spectrum_pwm(mut self, enabled: bool) -> Self {
        self.set_enhanced_spectrum_pwm(enabled);
        self
    }
}

impl Default for FunctionControl {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FunctionControl {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "FunctionControl cc: ({=u16:#x}, {=u16:#x}, {=u16:#x}) bc: {=u8} espwm: {=bool} raw: {=u64:#x}",
            self.color_control_red(),
            self.color_control_green(),
            self.color_control_blue(),
            self.brightness_control(),
            self.enhanced_spectrum_pwm(),
            self.0
        );
    }
}
