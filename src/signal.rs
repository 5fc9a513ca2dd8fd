//! Edge detection on the board's output lines.
//!
//! The MS430 signals new data by pulling its READY line low, and signals light and
//! sound interrupts by pulling LIT and SIT low. The driver needs to see each falling
//! edge exactly once, whether or not it was polling when the edge happened.

use embedded_hal::digital::InputPin;

/// A digital line on which falling edges are latched until consumed.
///
/// An implementation must report every falling edge, including one that begins and
/// ends between two calls. Platforms with edge-detecting GPIO or a latching
/// interrupt flag satisfy that directly. [`FallingEdge`] over a plain input pin does
/// not; see its limits before using it.
pub trait EdgeSignal {
    /// Error returned when the line cannot be read.
    type Error: core::fmt::Debug;

    /// Current level of the line.
    fn is_high(&mut self) -> Result<bool, Self::Error>;

    /// Returns true, once, if a falling edge has occurred since the last call.
    fn take_falling_edge(&mut self) -> Result<bool, Self::Error>;

    /// Forget any latched edge.
    fn clear_edges(&mut self) -> Result<(), Self::Error>;
}

/// Falling edge detection for a pin that can only report its level.
///
/// Every sample of the pin (including those taken through [`EdgeSignal::is_high`])
/// is compared with the previous one, and a high-to-low change latches an edge until
/// it is taken.
///
/// A low pulse that starts and ends between two samples is not seen. The MS430
/// holds READY low until the next measurement starts, and a latch-type interrupt
/// line low until it is cleared, so those are safe when sampled often enough. A
/// comparator-type interrupt line follows the measured level and can pulse for less
/// than any sampling interval, so prefer a hardware edge latch for it.
#[derive(Debug)]
pub struct FallingEdge<P> {
    pin: P,
    last_high: Option<bool>,
    latched: bool,
}

impl<P: InputPin> FallingEdge<P> {
    /// Wrap `pin`. The first sample sets the reference level and never latches.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            last_high: None,
            latched: false,
        }
    }

    /// Return the wrapped pin.
    pub fn release(self) -> P {
        self.pin
    }

    fn sample(&mut self) -> Result<bool, P::Error> {
        let high = self.pin.is_high()?;
        if self.last_high == Some(true) && !high {
            self.latched = true;
        }
        self.last_high = Some(high);
        Ok(high)
    }
}

impl<P: InputPin> EdgeSignal for FallingEdge<P> {
    type Error = P::Error;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.sample()
    }

    fn take_falling_edge(&mut self) -> Result<bool, Self::Error> {
        self.sample()?;
        Ok(std::mem::take(&mut self.latched))
    }

    fn clear_edges(&mut self) -> Result<(), Self::Error> {
        self.sample()?;
        self.latched = false;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use embedded_hal_mock::eh1::digital::{Mock, State, Transaction};

    use super::*;

    #[test]
    fn falling_edge_is_taken_once() {
        let expectations = [
            Transaction::get(State::High),
            Transaction::get(State::Low),
            Transaction::get(State::Low),
        ];
        let mut line = FallingEdge::new(Mock::new(&expectations));
        assert!(!line.take_falling_edge().unwrap());
        assert!(line.take_falling_edge().unwrap());
        assert!(!line.take_falling_edge().unwrap());
        line.release().done();
    }

    #[test]
    fn low_at_first_sample_is_not_an_edge() {
        let expectations = [Transaction::get(State::Low), Transaction::get(State::Low)];
        let mut line = FallingEdge::new(Mock::new(&expectations));
        assert!(!line.take_falling_edge().unwrap());
        assert!(!line.take_falling_edge().unwrap());
        line.release().done();
    }

    #[test]
    fn edge_seen_by_level_read_is_kept() {
        let expectations = [
            Transaction::get(State::High),
            Transaction::get(State::Low),
            Transaction::get(State::Low),
        ];
        let mut line = FallingEdge::new(Mock::new(&expectations));
        assert!(line.is_high().unwrap());
        assert!(!line.is_high().unwrap());
        assert!(line.take_falling_edge().unwrap());
        line.release().done();
    }

    #[test]
    fn rising_edge_is_ignored() {
        let expectations = [Transaction::get(State::Low), Transaction::get(State::High)];
        let mut line = FallingEdge::new(Mock::new(&expectations));
        assert!(!line.is_high().unwrap());
        assert!(!line.take_falling_edge().unwrap());
        line.release().done();
    }

    #[test]
    fn pulse_between_samples_is_not_seen() {
        // The line went low and back high between these two samples.
        let expectations = [Transaction::get(State::High), Transaction::get(State::High)];
        let mut line = FallingEdge::new(Mock::new(&expectations));
        assert!(!line.take_falling_edge().unwrap());
        assert!(!line.take_falling_edge().unwrap());
        line.release().done();
    }

    #[test]
    fn cleared_edge_is_forgotten() {
        let expectations = [
            Transaction::get(State::High),
            Transaction::get(State::Low),
            Transaction::get(State::Low),
        ];
        let mut line = FallingEdge::new(Mock::new(&expectations));
        line.is_high().unwrap();
        line.clear_edges().unwrap();
        assert!(!line.take_falling_edge().unwrap());
        line.release().done();
    }
}
