/*!
 # Indicator LEDs

 Two status LEDs addressed through a bitmask, with the short flash
 patterns the controller uses to signal state changes without a display
 attached.
*/

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use tracing::trace;

use crate::{Error, Result};

/// Mask bit for the first indicator LED
pub const LED_A: u8 = 0x01;
/// Mask bit for the second indicator LED
pub const LED_B: u8 = 0x02;
/// Both indicator LEDs
pub const LED_BOTH: u8 = LED_A | LED_B;

const FLASH_ON_MS: u32 = 50;
const FLASH_GAP_MS: u32 = 250;

/// A pair of indicator LEDs driven through output pins
pub struct IndicatorLeds<P1, P2, D> {
    led_a: P1,
    led_b: P2,
    delay: D,
}

impl<P1: OutputPin, P2: OutputPin, D: DelayNs> IndicatorLeds<P1, P2, D> {
    /// Creates the indicator pair from its two pins and a delay provider
    pub fn new(led_a: P1, led_b: P2, delay: D) -> Self {
        Self { led_a, led_b, delay }
    }

    /// Switches the LEDs selected by `mask` on or off
    pub fn set(&mut self, mask: u8, on: bool) -> Result<()> {
        trace!(mask, on, "setting indicator LEDs");
        if mask & LED_A != 0 {
            set_pin(&mut self.led_a, on)?;
        }
        if mask & LED_B != 0 {
            set_pin(&mut self.led_b, on)?;
        }
        Ok(())
    }

    /// Flashes the LEDs selected by `mask` the given number of times
    pub fn flash(&mut self, mask: u8, count: u8) -> Result<()> {
        let mut remaining = count;
        while remaining > 0 {
            remaining -= 1;
            self.set(mask, true)?;
            self.delay.delay_ms(FLASH_ON_MS);
            self.set(mask, false)?;
            if remaining == 0 {
                break;
            }
            self.delay.delay_ms(FLASH_GAP_MS);
        }
        Ok(())
    }
}

fn set_pin<P: OutputPin>(pin: &mut P, on: bool) -> Result<()> {
    let result = if on { pin.set_high() } else { pin.set_low() };
    result.map_err(|e| Error::Gpio(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakePin {
        states: Rc<RefCell<Vec<bool>>>,
    }

    impl embedded_hal::digital::ErrorType for FakePin {
        type Error = ErrorKind;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> std::result::Result<(), Self::Error> {
            self.states.borrow_mut().push(false);
            Ok(())
        }

        fn set_high(&mut self) -> std::result::Result<(), Self::Error> {
            self.states.borrow_mut().push(true);
            Ok(())
        }
    }

    struct CountingDelay {
        total_ms: Rc<RefCell<u32>>,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            *self.total_ms.borrow_mut() += ns / 1_000_000;
        }
    }

    fn leds() -> (
        IndicatorLeds<FakePin, FakePin, CountingDelay>,
        Rc<RefCell<Vec<bool>>>,
        Rc<RefCell<Vec<bool>>>,
        Rc<RefCell<u32>>,
    ) {
        let a_states = Rc::new(RefCell::new(Vec::new()));
        let b_states = Rc::new(RefCell::new(Vec::new()));
        let total_ms = Rc::new(RefCell::new(0));
        let leds = IndicatorLeds::new(
            FakePin {
                states: a_states.clone(),
            },
            FakePin {
                states: b_states.clone(),
            },
            CountingDelay {
                total_ms: total_ms.clone(),
            },
        );
        (leds, a_states, b_states, total_ms)
    }

    #[test]
    fn set_honors_the_mask() {
        let (mut leds, a_states, b_states, _) = leds();

        leds.set(LED_A, true).unwrap();
        assert_eq!(*a_states.borrow(), vec![true]);
        assert!(b_states.borrow().is_empty());

        leds.set(LED_BOTH, false).unwrap();
        assert_eq!(*a_states.borrow(), vec![true, false]);
        assert_eq!(*b_states.borrow(), vec![false]);
    }

    #[test]
    fn flash_pulses_with_a_gap_between_flashes() {
        let (mut leds, a_states, b_states, total_ms) = leds();

        leds.flash(LED_BOTH, 2).unwrap();

        assert_eq!(*a_states.borrow(), vec![true, false, true, false]);
        assert_eq!(*b_states.borrow(), vec![true, false, true, false]);
        // Two on-pulses plus a single gap; no trailing gap
        assert_eq!(*total_ms.borrow(), 2 * FLASH_ON_MS + FLASH_GAP_MS);
    }

    #[test]
    fn zero_count_flash_does_nothing() {
        let (mut leds, a_states, b_states, total_ms) = leds();

        leds.flash(LED_BOTH, 0).unwrap();

        assert!(a_states.borrow().is_empty());
        assert!(b_states.borrow().is_empty());
        assert_eq!(*total_ms.borrow(), 0);
    }
}
