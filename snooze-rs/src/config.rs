// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Configuration of the steps preceding sleep

/// Default upper bound on waiting for the transport, in milliseconds
const DEFAULT_RECONNECT_TIMEOUT_MS: u32 = 10_000;

/// Default time to listen for messages after a heartbeat, in milliseconds
const DEFAULT_SMART_SLEEP_WAIT_MS: u32 = 500;

/// Default interval between transport readiness checks, in milliseconds
const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Configuration of a snooze
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Maximal time to wait for the transport to become ready
    pub reconnect_timeout_ms: u32,

    /// Time to listen for incoming messages after notifying the gateway
    pub smart_sleep_wait_ms: u32,

    /// Interval between transport readiness checks
    pub poll_interval_ms: u32,
}

impl Config {
    /// Create a configuration with default values
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reconnect_timeout_ms: DEFAULT_RECONNECT_TIMEOUT_MS,
            smart_sleep_wait_ms: DEFAULT_SMART_SLEEP_WAIT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set the maximal time to wait for the transport
    #[must_use]
    pub const fn with_reconnect_timeout_ms(mut self, reconnect_timeout_ms: u32) -> Self {
        self.reconnect_timeout_ms = reconnect_timeout_ms;
        self
    }

    /// Set the time to listen after notifying the gateway
    #[must_use]
    pub const fn with_smart_sleep_wait_ms(mut self, smart_sleep_wait_ms: u32) -> Self {
        self.smart_sleep_wait_ms = smart_sleep_wait_ms;
        self
    }

    /// Set the interval between transport readiness checks
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u32) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Compute how long to wait for the transport before a sleep of `ms`
    ///
    /// Waiting never exceeds the sleep itself, except for indefinite sleeps
    /// (`ms == 0`) where only the reconnect timeout applies.
    pub(crate) fn readiness_deadline(&self, ms: u32) -> u32 {
        if ms == 0 {
            self.reconnect_timeout_ms
        } else {
            ms.min(self.reconnect_timeout_ms)
        }
    }
}

/// Compute how long to sleep after waiting `waited` ms for the transport
///
/// Return `None` if waiting used up the whole sleep. Indefinite sleeps stay
/// indefinite.
pub(crate) fn remaining_after_wait(ms: u32, waited: u32) -> Option<u32> {
    if ms == 0 {
        Some(0)
    } else {
        ms.checked_sub(waited).filter(|&remaining| remaining > 0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
