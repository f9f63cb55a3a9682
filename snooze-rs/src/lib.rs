// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Sleep for arbitrarily long intervals in hardware-supported quanta
//!
//! Hardware usually supports only a handful of sleep durations, e.g. the
//! watchdog timeouts of an AVR. A [`Scheduler`] splits a requested duration
//! into a sequence of such quanta, calls a periodic [`Tick`] between them,
//! keeps a software [`Clock`] corrected, and stops early when an interrupt
//! handler raises the [`WAKE_FLAG`].
//!
//! [`Snooze`] and [`AsyncSnooze`] wrap a scheduler with the steps a network
//! node takes before sleeping: waiting for the transport to be ready,
//! optionally notifying the gateway, and turning the transport off.

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

#[cfg(feature = "async")]
mod r#async;
#[cfg(feature = "async")]
pub use self::r#async::Snooze as AsyncSnooze;
#[cfg(feature = "async")]
pub use self::r#async::Transport as AsyncTransport;

#[cfg(feature = "blocking")]
mod blocking;
#[cfg(feature = "blocking")]
pub use self::blocking::Snooze;
#[cfg(feature = "blocking")]
pub use self::blocking::Transport;

#[cfg(any(feature = "async", feature = "blocking"))]
mod config;
#[cfg(any(feature = "async", feature = "blocking"))]
pub use self::config::Config;

mod error;
pub use self::error::Error;

mod flag;
pub use self::flag::WakeFlag;
pub use self::flag::WAKE_FLAG;

mod hardware;
pub use self::hardware::Clock;
pub use self::hardware::NoTick;
pub use self::hardware::PowerDown;
pub use self::hardware::Tick;

mod indication;
#[cfg(any(feature = "async", feature = "blocking"))]
pub use self::indication::Led;
pub use self::indication::Indication;
pub use self::indication::Indicator;
pub use self::indication::NoIndicator;

mod quantum;
pub use self::quantum::Decomposition;
pub use self::quantum::Quantum;
pub use self::quantum::QuantumTable;

mod reason;
pub use self::reason::WakeReason;

mod scheduler;
pub use self::scheduler::Scheduler;

#[cfg(test)]
mod mock;
