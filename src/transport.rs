//! Bus transport: clocks frames out over `SCLK`/`SIN` and drives `LAT`.
//!
//! The hardware is reached through the small [`SerialLines`] capability,
//! implemented for `embedded-hal` output pins by [`GpioLines`]. [`Transport`]
//! turns [`Segment`]s into line activity:
//!
//! 1. `LAT` is raised before the clock edge of the first latched bit and
//!    stays high for exactly [`Command::latch_pulses`](crate::Command::latch_pulses)
//!    edges.
//! 2. `SIN` is set before every rising edge of `SCLK`.
//! 3. After the final bit `LAT` falls, which executes the command, and
//!    `SIN` returns low.
//!
//! Line failures are returned as-is. Nothing is retried and `LAT` is not
//! touched after a failure. If `LAT` was left high, the next segment lowers
//! it before shifting, so every segment's latch window counts only its own
//! pulses. That falling edge executes whatever partial pulse count the failed
//! segment had shifted.
//!
//! `GSCLK` is not driven here. It only has to be running while grayscale
//! data is displayed; [`start_grayscale_clock`] configures a PWM channel for
//! it.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;

use crate::frame::Segment;

/// The three serial lines of a TLC5957 chain.
pub trait SerialLines {
    /// Error reported by the lines.
    type Error;

    /// Set the level of `SIN`.
    fn set_data(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Produce one rising and falling edge on `SCLK`.
    fn pulse_clock(&mut self) -> Result<(), Self::Error>;

    /// Set the level of `LAT`.
    fn set_latch(&mut self, high: bool) -> Result<(), Self::Error>;
}

impl<T: SerialLines + ?Sized> SerialLines for &mut T {
    type Error = T::Error;

    fn set_data(&mut self, high: bool) -> Result<(), Self::Error> {
        T::set_data(self, high)
    }

    fn pulse_clock(&mut self) -> Result<(), Self::Error> {
        T::pulse_clock(self)
    }

    fn set_latch(&mut self, high: bool) -> Result<(), Self::Error> {
        T::set_latch(self, high)
    }
}

/// [`SerialLines`] over three GPIO outputs.
#[derive(Debug)]
pub struct GpioLines<SCLK, SIN, LAT> {
    sclk: SCLK,
    sin: SIN,
    lat: LAT,
}

impl<SCLK, SIN, LAT, E> GpioLines<SCLK, SIN, LAT>
where
    SCLK: OutputPin<Error = E>,
    SIN: OutputPin<Error = E>,
    LAT: OutputPin<Error = E>,
{
    /// Take the pins and drive all of them low.
    ///
    /// # Errors
    ///
    /// Returns the pin error if a line cannot be driven.
    pub fn new(mut sclk: SCLK, mut sin: SIN, mut lat: LAT) -> Result<Self, E> {
        sclk.set_low()?;
        sin.set_low()?;
        lat.set_low()?;
        Ok(Self { sclk, sin, lat })
    }
}

impl<SCLK, SIN, LAT> GpioLines<SCLK, SIN, LAT> {
    /// Give the pins back as `(sclk, sin, lat)`.
    pub fn release(self) -> (SCLK, SIN, LAT) {
        (self.sclk, self.sin, self.lat)
    }
}

impl<SCLK, SIN, LAT, E> SerialLines for GpioLines<SCLK, SIN, LAT>
where
    SCLK: OutputPin<Error = E>,
    SIN: OutputPin<Error = E>,
    LAT: OutputPin<Error = E>,
{
    type Error = E;

    fn set_data(&mut self, high: bool) -> Result<(), E> {
        self.sin.set_state(PinState::from(high))
    }

    fn pulse_clock(&mut self) -> Result<(), E> {
        self.sclk.set_high()?;
        self.sclk.set_low()
    }

    fn set_latch(&mut self, high: bool) -> Result<(), E> {
        self.lat.set_state(PinState::from(high))
    }
}

/// Sends frames over a set of [`SerialLines`].
#[derive(Debug)]
pub struct Transport<L> {
    lines: L,
    latch: bool,
}

impl<L: SerialLines> Transport<L> {
    /// Wrap lines that are currently idle (`LAT` low).
    pub const fn new(lines: L) -> Self {
        Self {
            lines,
            latch: false,
        }
    }

    /// Send every segment of a frame, returning the number of clock pulses.
    ///
    /// # Errors
    ///
    /// Returns the first line error; the remaining segments are not sent.
    pub fn send<const CHIPS: usize>(
        &mut self,
        frame: impl IntoIterator<Item = Segment<CHIPS>>,
    ) -> Result<usize, L::Error> {
        let mut pulses = 0;
        for segment in frame {
            self.send_segment(&segment)?;
            pulses += segment.len();
        }
        Ok(pulses)
    }

    /// Send a single segment and return the lines to idle.
    ///
    /// # Errors
    ///
    /// Returns the first line error.
    pub fn send_segment<const CHIPS: usize>(
        &mut self,
        segment: &Segment<CHIPS>,
    ) -> Result<(), L::Error> {
        if self.latch {
            self.lines.set_latch(false)?;
            self.latch = false;
        }
        for bit in segment.bits() {
            if bit.latch != self.latch {
                self.lines.set_latch(bit.latch)?;
                self.latch = bit.latch;
            }
            self.lines.set_data(bit.level)?;
            self.lines.pulse_clock()?;
        }
        self.idle()
    }

    fn idle(&mut self) -> Result<(), L::Error> {
        if self.latch {
            self.lines.set_latch(false)?;
            self.latch = false;
        }
        self.lines.set_data(false)
    }
}

impl<L> Transport<L> {
    /// Borrow the lines.
    pub const fn lines(&self) -> &L {
        &self.lines
    }

    /// Give the lines back.
    pub fn release(self) -> L {
        self.lines
    }
}

/// Run a PWM channel as `GSCLK` with 50 % duty cycle.
///
/// The frequency is a property of the PWM peripheral and has to be set
/// when it is configured; the chip accepts up to 33 MHz.
///
/// # Errors
///
/// Returns the PWM error.
pub fn start_grayscale_clock<P: SetDutyCycle>(gsclk: &mut P) -> Result<(), P::Error> {
    gsclk.set_duty_cycle_percent(50)
}


#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec;
    use std::vec::Vec;

    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    use super::testing::{Event, LineFault, RecordingLines};
    use super::*;
    use crate::frame::{Command, FunctionControlFrame, ShiftWord};
    use crate::function_control::FunctionControl;

    #[test]
    fn test_gpio_lines_drive_pins() {
        let sclk = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]);
        let sin = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let lat = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]);

        let mut lines = GpioLines::new(sclk, sin, lat).unwrap();
        lines.set_latch(true).unwrap();
        lines.set_data(true).unwrap();
        lines.pulse_clock().unwrap();
        lines.set_latch(false).unwrap();

        let (mut sclk, mut sin, mut lat) = lines.release();
        sclk.done();
        sin.done();
        lat.done();
    }

    #[test]
    fn test_segment_line_sequence() {
        let mut transport = Transport::new(RecordingLines::default());
        let segment = Segment::<1>::command_only(Command::LatchGrayscale);
        transport.send_segment(&segment).unwrap();

        let lines = transport.release();
        assert_eq!(
            lines.events,
            vec![
                Event::Latch(true),
                Event::Data(false),
                Event::Clock,
                Event::Data(false),
                Event::Clock,
                Event::Data(false),
                Event::Clock,
                Event::Latch(false),
                Event::Data(false),
            ]
        );
    }

    #[test]
    fn test_latch_covers_trailing_pulses_only() {
        let word = ShiftWord::from_outputs([0xffff, 0, 0x8001]);
        let mut transport = Transport::new(RecordingLines::default());
        for command in [
            Command::WriteGrayscale,
            Command::LatchGrayscale,
            Command::WriteFunctionControl,
        ] {
            transport
                .send_segment(&Segment::<2>::with_words(command, [word, word]))
                .unwrap();
        }

        let decoded = transport.lines().decode();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].latch_pulses, 1);
        assert_eq!(decoded[1].latch_pulses, 3);
        assert_eq!(decoded[2].latch_pulses, 5);
        for segment in &decoded {
            assert_eq!(segment.bits.len(), 96);
            // First bit is blue MSB, last bit is red LSB.
            assert!(segment.bits[0]);
            assert!(segment.bits[47]);
            assert!(!segment.bits[1]);
        }
    }

    #[test]
    fn test_send_counts_pulses() {
        let mut transport = Transport::new(RecordingLines::default());
        let frame = [
            Segment::<1>::command_only(Command::FunctionControlWriteEnable),
            Segment::<1>::with_words(Command::WriteFunctionControl, [ShiftWord::new()]),
        ];
        assert_eq!(transport.send(frame), Ok(15 + 48));
        assert_eq!(transport.lines().clock_count(), 63);
    }

    #[test]
    fn test_error_propagates_without_touching_latch() {
        // Fails on the fourth line operation: after LAT went high.
        let mut transport = Transport::new(RecordingLines::failing_after(3));
        let segment = Segment::<1>::command_only(Command::TimingReset);
        assert_eq!(transport.send_segment(&segment), Err(LineFault));

        let lines = transport.release();
        assert_eq!(
            lines.events,
            vec![Event::Latch(true), Event::Data(false), Event::Clock]
        );
    }

    #[test]
    fn test_retry_after_fault_with_latch_high() {
        // The fault hits after three latched pulses of FCWRTEN.
        let mut transport = Transport::new(RecordingLines::failing_after(7));
        let registers = [FunctionControl::DEFAULT];
        assert_eq!(
            transport.send(FunctionControlFrame::new(&registers)),
            Err(LineFault)
        );
        assert_eq!(
            transport.send(FunctionControlFrame::new(&registers)),
            Ok(15 + 48)
        );

        let latch_pulses: Vec<usize> = transport
            .lines()
            .decode()
            .iter()
            .map(|segment| segment.latch_pulses)
            .collect();
        assert_eq!(latch_pulses, [3, 15, 5]);
    }

    #[test]
    fn test_send_stops_at_first_error() {
        let mut transport = Transport::new(RecordingLines::failing_after(0));
        let frame = [
            Segment::<1>::command_only(Command::WriteGrayscale),
            Segment::<1>::command_only(Command::LatchGrayscale),
        ];
        assert_eq!(transport.send(frame), Err(LineFault));
        assert!(transport.lines().events.is_empty());
    }

    struct FakePwm {
        duty: u16,
    }

    impl embedded_hal::pwm::ErrorType for FakePwm {
        type Error = core::convert::Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_start_grayscale_clock_half_duty() {
        let mut pwm = FakePwm { duty: 0 };
        start_grayscale_clock(&mut pwm).unwrap();
        assert_eq!(pwm.duty, 500);
    }
}
