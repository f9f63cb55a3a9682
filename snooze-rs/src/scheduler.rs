// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Scheduler for sleeping arbitrarily long

use core::num::NonZeroI8;
use core::num::NonZeroU8;

use log::debug;
use log::trace;

use crate::Clock;
use crate::NoTick;
use crate::PowerDown;
use crate::Quantum;
use crate::Tick;
use crate::WakeFlag;
use crate::WakeReason;
use crate::WAKE_FLAG;

/// A scheduler splitting long sleeps into hardware quanta
///
/// The scheduler sleeps one quantum at a time, advances the software clock
/// after each one, calls the tick at least every
/// [`largest()`](crate::QuantumTable::largest) milliseconds, and stops as
/// soon as the wake flag is raised.
#[derive(Debug)]
pub struct Scheduler<P, C, T = NoTick> {
    /// Low-power hardware
    hardware: P,

    /// Software clock
    clock: C,

    /// Periodic tick
    tick: T,

    /// Flag raised by interrupt handlers
    flag: &'static WakeFlag,

    /// Milliseconds slept during the last request
    slept: u32,
}

impl<P, C> Scheduler<P, C>
where
    P: PowerDown,
    C: Clock,
{
    /// Create a new scheduler without a tick, watching [`WAKE_FLAG`]
    #[must_use]
    pub fn new(hardware: P, clock: C) -> Self {
        Self {
            hardware,
            clock,
            tick: NoTick,
            flag: &WAKE_FLAG,
            slept: 0,
        }
    }
}

impl<P, C, T> Scheduler<P, C, T>
where
    P: PowerDown,
    C: Clock,
    T: Tick,
{
    /// Replace the tick called between quanta
    #[must_use]
    pub fn with_tick<U>(self, tick: U) -> Scheduler<P, C, U>
    where
        U: Tick,
    {
        Scheduler {
            hardware: self.hardware,
            clock: self.clock,
            tick,
            flag: self.flag,
            slept: self.slept,
        }
    }

    /// Watch a different wake flag
    #[must_use]
    pub fn with_flag(mut self, flag: &'static WakeFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Return the software clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Return the milliseconds slept during the last request
    ///
    /// Interrupted quanta are not counted.
    #[must_use]
    pub fn slept(&self) -> u32 {
        self.slept
    }

    /// Release the scheduler and return its parts
    pub fn release(self) -> (P, C, T) {
        (self.hardware, self.clock, self.tick)
    }

    /// Sleep for `ms` milliseconds, or until an interrupt if `ms` is zero
    ///
    /// The wake flag is cleared before the first quantum and taken again
    /// after the outcome is known, so a stale flag never affects a later
    /// request.
    pub fn sleep_for(&mut self, ms: u32) -> WakeReason {
        debug!("Sleep for {ms}ms");

        self.flag.clear();
        self.slept = 0;
        self.hardware.suspend_peripherals();

        let reason = if ms == 0 {
            self.sleep_indefinitely()
        } else {
            self.sleep_timed(ms)
        };

        // A flag raised by the last tick still ends the sleep as an interrupt
        let reason = match (reason, self.flag.take()) {
            (WakeReason::TimerExpired, Some(code)) => WakeReason::InterruptFlag(code),
            (reason, _) => reason,
        };
        self.hardware.resume_peripherals();

        debug!("Sleep for {ms}ms / Done after {}ms: {reason}", self.slept);
        reason
    }

    /// Sleep until an interrupt
    ///
    /// A wakeup without a raised flag counts as an expired timer.
    fn sleep_indefinitely(&mut self) -> WakeReason {
        self.nap(Quantum::Indefinite)
            .map_or(WakeReason::TimerExpired, WakeReason::InterruptFlag)
    }

    /// Sleep through all quanta covering `ms`
    fn sleep_timed(&mut self, ms: u32) -> WakeReason {
        let table = self.hardware.quanta();
        let mut remaining = ms;

        for quantum in table.decompose(ms) {
            trace!("Nap for {quantum}ms, {remaining}ms left");
            if let Some(code) = self.nap(Quantum::Timed(quantum)) {
                debug!("Interrupted by flag {code}");
                return WakeReason::InterruptFlag(code);
            }

            self.clock.advance_by(quantum);
            self.slept = self.slept.saturating_add(quantum);
            remaining -= quantum;

            // A tick window ends after each longest quantum, and after the
            // shorter quanta covering the final remainder
            let is_last = remaining < table.smallest();
            if quantum == table.largest() || is_last {
                if let Some(code) = NonZeroI8::new(self.tick.tick()) {
                    debug!("Tick requested wakeup {code}");
                    return WakeReason::CallbackRequested(code);
                }
            }
        }

        if remaining > 0 {
            trace!("Drop {remaining}ms shorter than any quantum");
        }

        WakeReason::TimerExpired
    }

    /// Sleep a single quantum
    ///
    /// Return the wake flag code if it was raised, without clearing it. A flag
    /// raised before the quantum starts skips it.
    fn nap(&mut self, quantum: Quantum) -> Option<NonZeroU8> {
        if let Some(code) = self.flag.pending() {
            trace!("Skip nap, flag {code} already raised");
            return Some(code);
        }
        self.hardware.power_down(quantum);
        self.flag.pending()
    }
}
