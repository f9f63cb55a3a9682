// Copyright Claudio Mattera 2025.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Software clock kept correct across light sleep

use embassy_time::Instant;

use snooze_rs::Clock;

/// A millisecond clock built on the Embassy time driver
///
/// The time driver does not advance while the processor is in light sleep,
/// so the scheduler adds every slept quantum to a correction.
#[derive(Clone, Debug, Default)]
pub struct SoftwareClock {
    /// Milliseconds slept so far
    correction: u32,
}

impl SoftwareClock {
    /// Create a new clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Return milliseconds spent in light sleep since boot
    pub fn slept_since_boot(&self) -> u32 {
        self.correction
    }
}

impl Clock for SoftwareClock {
    fn now_millis(&self) -> u32 {
        // Wraps after about 49 days, callers only use differences
        #[expect(
            clippy::cast_possible_truncation,
            reason = "Milliseconds are meant to wrap around"
        )]
        let awake = Instant::now().as_millis() as u32;
        awake.wrapping_add(self.correction)
    }

    fn advance_by(&mut self, ms: u32) {
        self.correction = self.correction.wrapping_add(ms);
    }
}
