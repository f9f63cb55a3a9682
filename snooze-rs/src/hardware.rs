// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Interfaces to hardware and application

use crate::Quantum;
use crate::QuantumTable;

/// A processor that can enter a low-power state
pub trait PowerDown {
    /// Return the sleep durations supported by the hardware
    fn quanta(&self) -> QuantumTable;

    /// Turn off peripherals that are useless while halted
    ///
    /// Called once before a batch of quanta.
    fn suspend_peripherals(&mut self);

    /// Restore peripherals turned off by
    /// [`suspend_peripherals()`](Self::suspend_peripherals)
    ///
    /// Called once after a batch of quanta.
    fn resume_peripherals(&mut self);

    /// Perform a single hardware sleep cycle
    ///
    /// Return when the quantum elapses or when an interrupt occurs.
    ///
    /// Implementations must disable interrupts before arming the deadline,
    /// and let the sleep instruction itself re-enable them, so that an
    /// interrupt arriving right before sleeping still wakes the processor.
    /// Interrupt and timer configuration must be restored after waking up.
    fn power_down(&mut self, quantum: Quantum);
}

/// A software clock counting milliseconds
///
/// The clock usually stops while the processor sleeps, so the scheduler
/// advances it after every quantum.
pub trait Clock {
    /// Return the current time in milliseconds
    ///
    /// The value is allowed to wrap around.
    fn now_millis(&self) -> u32;

    /// Move the clock forward
    fn advance_by(&mut self, ms: u32);
}

/// A function called periodically during long sleeps
///
/// The scheduler calls it at least every [`QuantumTable::largest()`]
/// milliseconds of sleep. Returning a non-zero value ends the sleep and is
/// reported as [`WakeReason::CallbackRequested`](crate::WakeReason).
///
/// Peripherals turned off by [`PowerDown::suspend_peripherals()`] are not
/// available while ticking.
pub trait Tick {
    /// Perform periodic work, and return non-zero to wake up
    fn tick(&mut self) -> i8;
}

impl<F> Tick for F
where
    F: FnMut() -> i8,
{
    fn tick(&mut self) -> i8 {
        self()
    }
}

/// A tick that never asks to wake up
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NoTick;

impl Tick for NoTick {
    fn tick(&mut self) -> i8 {
        0
    }
}

impl<P> PowerDown for &mut P
where
    P: PowerDown,
{
    fn quanta(&self) -> QuantumTable {
        P::quanta(self)
    }

    fn suspend_peripherals(&mut self) {
        P::suspend_peripherals(self);
    }

    fn resume_peripherals(&mut self) {
        P::resume_peripherals(self);
    }

    fn power_down(&mut self, quantum: Quantum) {
        P::power_down(self, quantum);
    }
}

impl<C> Clock for &mut C
where
    C: Clock,
{
    fn now_millis(&self) -> u32 {
        C::now_millis(self)
    }

    fn advance_by(&mut self, ms: u32) {
        C::advance_by(self, ms);
    }
}
