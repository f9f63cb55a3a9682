// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Flag for waking up from an interrupt handler

use core::num::NonZeroU8;
use core::sync::atomic::AtomicU8;
use core::sync::atomic::Ordering;

/// Value of a flag that was not raised
const NO_INTERRUPT: u8 = 0;

/// The process-wide wake flag
///
/// Interrupt handlers raise it to end the current sleep request early.
pub static WAKE_FLAG: WakeFlag = WakeFlag::new();

/// A flag raised by interrupt handlers to request an early wakeup
///
/// The flag has a single writer and a single reader. Interrupt handlers only
/// ever [raise](WakeFlag::raise) it, while the scheduler reads it after each
/// quantum and clears it before and after each sleep request.
///
/// Only loads and stores are used, so the flag works on targets without
/// atomic read-modify-write instructions. Sequences that read and then clear
/// the flag run inside a critical section.
#[derive(Debug)]
pub struct WakeFlag {
    /// The flag value, zero when not raised
    value: AtomicU8,
}

impl WakeFlag {
    /// Create a new flag that is not raised
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU8::new(NO_INTERRUPT),
        }
    }

    /// Raise the flag with an application-defined code
    ///
    /// This is meant to be called from interrupt context. A later call
    /// overwrites the code of an earlier one.
    pub fn raise(&self, code: NonZeroU8) {
        self.value.store(code.get(), Ordering::Release);
    }

    /// Return the code of the flag if it is raised, without clearing it
    #[must_use]
    pub fn pending(&self) -> Option<NonZeroU8> {
        NonZeroU8::new(self.value.load(Ordering::Acquire))
    }

    /// Check whether the flag is raised
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.pending().is_some()
    }

    /// Reset the flag
    pub fn clear(&self) {
        critical_section::with(|_cs| {
            self.value.store(NO_INTERRUPT, Ordering::Release);
        });
    }

    /// Return the code of the flag if it is raised, and reset it
    ///
    /// An interrupt cannot sneak in between reading and clearing.
    #[must_use]
    pub fn take(&self) -> Option<NonZeroU8> {
        critical_section::with(|_cs| {
            let code = self.pending();
            self.value.store(NO_INTERRUPT, Ordering::Release);
            code
        })
    }
}

impl Default for WakeFlag {
    fn default() -> Self {
        Self::new()
    }
}
