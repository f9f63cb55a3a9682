// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Reasons for waking up

use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::num::NonZeroI8;
use core::num::NonZeroU8;

/// Legacy code for a sleep that ran to completion
const TIMER_EXPIRED_CODE: i16 = -1;

/// Legacy code for a sleep that could not start
const SLEEP_NOT_POSSIBLE_CODE: i16 = -2;

/// The reason a sleep request ended
///
/// Exactly one reason is produced for each request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WakeReason {
    /// All quanta were slept without interruption
    TimerExpired,

    /// An interrupt handler raised the wake flag with this code
    InterruptFlag(NonZeroU8),

    /// The periodic tick asked to wake up with this code
    CallbackRequested(NonZeroI8),

    /// The transport did not become ready in time
    SleepNotPossible,
}

impl WakeReason {
    /// Return the numeric code used by MySensors nodes
    ///
    /// Timer expiration is `-1`, impossible sleep is `-2`, while interrupt
    /// and tick codes are returned as they are.
    #[must_use]
    pub fn code(&self) -> i16 {
        match *self {
            Self::TimerExpired => TIMER_EXPIRED_CODE,
            Self::InterruptFlag(code) => i16::from(code.get()),
            Self::CallbackRequested(code) => i16::from(code.get()),
            Self::SleepNotPossible => SLEEP_NOT_POSSIBLE_CODE,
        }
    }

    /// Check whether the sleep was cut short by an interrupt or a tick
    #[must_use]
    pub fn is_early(&self) -> bool {
        matches!(
            *self,
            Self::InterruptFlag(_) | Self::CallbackRequested(_)
        )
    }
}

impl Display for WakeReason {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match *self {
            Self::TimerExpired => write!(f, "timer expired"),
            Self::InterruptFlag(code) => write!(f, "interrupt {code}"),
            Self::CallbackRequested(code) => write!(f, "tick {code}"),
            Self::SleepNotPossible => write!(f, "sleep not possible"),
        }
    }
}
