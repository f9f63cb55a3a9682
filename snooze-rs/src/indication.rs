// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Indication of sleep state

#[cfg(any(feature = "async", feature = "blocking"))]
use log::warn;

#[cfg(any(feature = "async", feature = "blocking"))]
use embedded_hal::digital::OutputPin;

/// A change of sleep state
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Indication {
    /// The node is about to sleep
    Sleep,

    /// The node just woke up
    Wakeup,
}

/// Something that signals sleep state to the outside, e.g. a LED
pub trait Indicator {
    /// Signal a change of sleep state
    fn indicate(&mut self, indication: Indication);
}

/// An indicator that does nothing
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn indicate(&mut self, _indication: Indication) {}
}

/// A LED that is lit while awake
#[cfg(any(feature = "async", feature = "blocking"))]
#[derive(Debug)]
pub struct Led<P> {
    /// Output pin driving the LED
    pin: P,
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl<P> Led<P>
where
    P: OutputPin,
{
    /// Create a new LED indicator
    #[must_use]
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the inner pin
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl<P> Indicator for Led<P>
where
    P: OutputPin,
{
    fn indicate(&mut self, indication: Indication) {
        let result = match indication {
            Indication::Sleep => self.pin.set_low(),
            Indication::Wakeup => self.pin.set_high(),
        };
        if let Err(error) = result {
            warn!("Cannot indicate {indication:?}: {error:?}");
        }
    }
}
