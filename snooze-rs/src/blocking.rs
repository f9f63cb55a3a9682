// Copyright Claudio Mattera 2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Blocking snooze

use log::debug;
use log::trace;
use log::warn;

use embedded_hal::delay::DelayNs;

use crate::config::remaining_after_wait;
use crate::Clock;
use crate::Config;
use crate::Indication;
use crate::Indicator;
use crate::PowerDown;
use crate::Scheduler;
use crate::Tick;
use crate::WakeReason;

/// A network transport that must be turned off while sleeping
pub trait Transport {
    /// Check whether the transport is initialized and connected
    fn is_ready(&mut self) -> bool;

    /// Process pending transport work, e.g. incoming messages
    ///
    /// Called repeatedly while waiting for the transport.
    fn process(&mut self);

    /// Notify the gateway that the node is about to sleep
    fn send_heartbeat(&mut self);

    /// Turn off the transport
    fn disable(&mut self);
}

/// A node that sleeps once its transport is ready
#[derive(Debug)]
pub struct Snooze<P, C, T, X, I, D> {
    /// Sleep scheduler
    scheduler: Scheduler<P, C, T>,

    /// Network transport
    transport: X,

    /// Sleep state indicator
    indicator: I,

    /// Delay for polling the transport
    delay: D,

    /// Configuration
    config: Config,
}

impl<P, C, T, X, I, D> Snooze<P, C, T, X, I, D>
where
    P: PowerDown,
    C: Clock,
    T: Tick,
    X: Transport,
    I: Indicator,
    D: DelayNs,
{
    /// Create a new snooze
    #[must_use]
    pub fn new(
        scheduler: Scheduler<P, C, T>,
        transport: X,
        indicator: I,
        delay: D,
        config: Config,
    ) -> Self {
        Self {
            scheduler,
            transport,
            indicator,
            delay,
            config,
        }
    }

    /// Return the sleep scheduler
    pub fn scheduler(&self) -> &Scheduler<P, C, T> {
        &self.scheduler
    }

    /// Release the snooze and return its parts
    pub fn release(self) -> (Scheduler<P, C, T>, X, I, D) {
        (self.scheduler, self.transport, self.indicator, self.delay)
    }

    /// Sleep for `ms` milliseconds, or until an interrupt if `ms` is zero
    ///
    /// Wait for the transport to be ready first, and give up with
    /// [`WakeReason::SleepNotPossible`] if it does not become ready in time.
    /// Time spent waiting is subtracted from the sleep.
    ///
    /// If `smart` is set, notify the gateway and listen for incoming
    /// messages before turning the transport off.
    pub fn snooze(&mut self, ms: u32, smart: bool) -> WakeReason {
        debug!("Snooze for {ms}ms");

        let Some(ms) = self.wait_for_transport(ms) else {
            warn!("Cannot sleep, transport is not ready");
            return WakeReason::SleepNotPossible;
        };

        if smart {
            debug!("Notify gateway before sleeping");
            self.transport.send_heartbeat();
            self.listen(self.config.smart_sleep_wait_ms);
        }

        debug!("Disable transport");
        self.transport.disable();

        self.indicator.indicate(Indication::Sleep);
        let reason = self.scheduler.sleep_for(ms);
        self.indicator.indicate(Indication::Wakeup);

        debug!("Snooze / Done: {reason}");
        reason
    }

    /// Wait for the transport to be ready
    ///
    /// Return the remaining sleep duration, or `None` if there is none left.
    fn wait_for_transport(&mut self, ms: u32) -> Option<u32> {
        let deadline = self.config.readiness_deadline(ms);
        let start = self.scheduler.clock().now_millis();
        let mut waited = 0;

        while !self.transport.is_ready() {
            if waited >= deadline {
                debug!("Transport still not ready after {waited}ms");
                return None;
            }
            self.transport.process();
            self.delay.delay_ms(self.config.poll_interval_ms);
            waited = self.scheduler.clock().now_millis().wrapping_sub(start);
        }

        if waited > 0 {
            debug!("Transport ready after {waited}ms");
        }
        remaining_after_wait(ms, waited)
    }

    /// Keep processing the transport for `ms` milliseconds
    fn listen(&mut self, ms: u32) {
        trace!("Listen for {ms}ms");
        let start = self.scheduler.clock().now_millis();
        loop {
            let elapsed = self.scheduler.clock().now_millis().wrapping_sub(start);
            let Some(left) = ms.checked_sub(elapsed).filter(|&left| left > 0) else {
                break;
            };
            self.transport.process();
            self.delay.delay_ms(self.config.poll_interval_ms.clamp(1, left));
        }
    }
}
