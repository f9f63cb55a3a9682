// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Mock hardware for tests

use core::num::NonZeroU8;

use std::boxed::Box;
use std::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use crate::Clock;
use crate::PowerDown;
use crate::Quantum;
use crate::QuantumTable;
use crate::WakeFlag;

/// Create a flag private to a single test
///
/// Tests run in parallel, so they cannot share [`crate::WAKE_FLAG`].
pub fn leak_flag() -> &'static WakeFlag {
    Box::leak(Box::new(WakeFlag::new()))
}

/// A call to the low-power hardware
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    /// Peripherals were suspended
    Suspend,

    /// A quantum was slept
    PowerDown(Quantum),

    /// Peripherals were resumed
    Resume,
}

/// Low-power hardware recording every call
#[derive(Debug)]
pub struct MockPowerDown {
    /// Supported quanta
    pub table: QuantumTable,

    /// Flag raised by the simulated interrupt
    pub flag: &'static WakeFlag,

    /// All calls, in order
    pub events: Vec<Event>,

    /// All quanta slept, in order
    pub naps: Vec<Quantum>,

    /// Whether the flag was raised when each nap started
    pub flag_seen: Vec<bool>,

    /// Nap during which to raise the flag, and its code
    pub interrupt: Option<(usize, NonZeroU8)>,
}

impl MockPowerDown {
    /// Create new mock hardware with the watchdog table
    pub fn new(flag: &'static WakeFlag) -> Self {
        Self {
            table: QuantumTable::WATCHDOG,
            flag,
            events: Vec::new(),
            naps: Vec::new(),
            flag_seen: Vec::new(),
            interrupt: None,
        }
    }

    /// Use a different table
    pub fn with_table(mut self, table: QuantumTable) -> Self {
        self.table = table;
        self
    }

    /// Raise the flag during the nap with the given index
    pub fn interrupt_during(mut self, index: usize, code: NonZeroU8) -> Self {
        self.interrupt = Some((index, code));
        self
    }

    /// Return the durations of timed naps
    pub fn timed_naps(&self) -> Vec<u32> {
        self.naps
            .iter()
            .filter_map(|quantum| match *quantum {
                Quantum::Timed(ms) => Some(ms),
                Quantum::Indefinite => None,
            })
            .collect()
    }
}

impl PowerDown for MockPowerDown {
    fn quanta(&self) -> QuantumTable {
        self.table
    }

    fn suspend_peripherals(&mut self) {
        self.events.push(Event::Suspend);
    }

    fn resume_peripherals(&mut self) {
        self.events.push(Event::Resume);
    }

    fn power_down(&mut self, quantum: Quantum) {
        self.flag_seen.push(self.flag.is_raised());
        self.events.push(Event::PowerDown(quantum));
        self.naps.push(quantum);

        if let Some((index, code)) = self.interrupt {
            if index + 1 == self.naps.len() {
                self.flag.raise(code);
            }
        }
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct MockClock {
    /// Current time, shared with delays
    pub now: Rc<Cell<u32>>,

    /// All corrections applied by the scheduler
    pub advanced: Vec<u32>,
}

impl MockClock {
    /// Create a clock sharing time with a delay
    pub fn shared(now: &Rc<Cell<u32>>) -> Self {
        Self {
            now: Rc::clone(now),
            advanced: Vec::new(),
        }
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u32 {
        self.now.get()
    }

    fn advance_by(&mut self, ms: u32) {
        self.advanced.push(ms);
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

/// A delay that moves a shared clock instead of waiting
#[cfg(any(feature = "async", feature = "blocking"))]
#[derive(Debug)]
pub struct MockDelay {
    /// Time shared with the clock
    pub now: Rc<Cell<u32>>,

    /// Total milliseconds waited
    pub waited: u32,
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl MockDelay {
    /// Create a delay moving a clock
    pub fn shared(now: &Rc<Cell<u32>>) -> Self {
        Self {
            now: Rc::clone(now),
            waited: 0,
        }
    }

    /// Move time forward
    fn wait_ms(&mut self, ms: u32) {
        self.waited += ms;
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

#[cfg(feature = "blocking")]
impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.wait_ms(ns / 1_000_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.wait_ms(us / 1000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.wait_ms(ms);
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.wait_ms(ns / 1_000_000);
    }

    async fn delay_us(&mut self, us: u32) {
        self.wait_ms(us / 1000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.wait_ms(ms);
    }
}

/// A transport that becomes ready at a given time
#[cfg(any(feature = "async", feature = "blocking"))]
#[derive(Debug)]
pub struct MockTransport {
    /// Time shared with the clock
    pub now: Rc<Cell<u32>>,

    /// Time at which the transport becomes ready, never if `None`
    pub ready_at: Option<u32>,

    /// Number of readiness checks
    pub checks: usize,

    /// Number of calls to `process()`
    pub processed: usize,

    /// Number of heartbeats sent
    pub heartbeats: usize,

    /// Time at which the transport was disabled
    pub disabled_at: Option<u32>,
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl MockTransport {
    /// Create a transport becoming ready at `ready_at`
    pub fn new(now: &Rc<Cell<u32>>, ready_at: Option<u32>) -> Self {
        Self {
            now: Rc::clone(now),
            ready_at,
            checks: 0,
            processed: 0,
            heartbeats: 0,
            disabled_at: None,
        }
    }

    /// Check readiness at the current time
    fn check(&mut self) -> bool {
        self.checks += 1;
        self.ready_at.is_some_and(|ready_at| self.now.get() >= ready_at)
    }
}

#[cfg(feature = "blocking")]
impl crate::Transport for MockTransport {
    fn is_ready(&mut self) -> bool {
        self.check()
    }

    fn process(&mut self) {
        self.processed += 1;
    }

    fn send_heartbeat(&mut self) {
        self.heartbeats += 1;
    }

    fn disable(&mut self) {
        self.disabled_at = Some(self.now.get());
    }
}

#[cfg(feature = "async")]
impl crate::AsyncTransport for MockTransport {
    async fn is_ready(&mut self) -> bool {
        self.check()
    }

    async fn send_heartbeat(&mut self) {
        self.heartbeats += 1;
    }

    async fn disable(&mut self) {
        self.disabled_at = Some(self.now.get());
    }
}

/// An error from a broken pin
#[cfg(any(feature = "async", feature = "blocking"))]
#[derive(Debug)]
pub struct MockPinError;

#[cfg(any(feature = "async", feature = "blocking"))]
impl embedded_hal::digital::Error for MockPinError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// An output pin remembering its level
#[cfg(any(feature = "async", feature = "blocking"))]
#[derive(Debug, Default)]
pub struct MockPin {
    /// Current level, `None` if never set
    pub high: Option<bool>,

    /// Whether every operation fails
    pub broken: bool,
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl MockPin {
    /// Create a pin that fails every operation
    pub fn broken() -> Self {
        Self {
            high: None,
            broken: true,
        }
    }

    /// Set the level unless broken
    fn set(&mut self, high: bool) -> Result<(), MockPinError> {
        if self.broken {
            Err(MockPinError)
        } else {
            self.high = Some(high);
            Ok(())
        }
    }
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl embedded_hal::digital::ErrorType for MockPin {
    type Error = MockPinError;
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
}

/// An indicator recording every indication
#[derive(Debug, Default)]
pub struct MockIndicator {
    /// All indications, in order
    pub indications: Vec<crate::Indication>,
}

impl crate::Indicator for MockIndicator {
    fn indicate(&mut self, indication: crate::Indication) {
        self.indications.push(indication);
    }
}
