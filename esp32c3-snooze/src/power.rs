// Copyright Claudio Mattera 2025.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Light sleep on ESP32-C3

use core::time::Duration;

use log::trace;

use esp_hal::gpio::Level;
use esp_hal::gpio::Output;
use esp_hal::rtc_cntl::sleep::GpioWakeupSource;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use esp_hal::rtc_cntl::Rtc;

use snooze_rs::PowerDown;
use snooze_rs::Quantum;
use snooze_rs::QuantumTable;
use snooze_rs::WAKE_FLAG;

/// Low-power hardware of an ESP32-C3
///
/// Timed quanta use the RTC timer, and every quantum can be cut short by a
/// GPIO armed with [`crate::button::arm()`].
///
/// **NOTE**: WiFi must be turned off before powering down.
pub struct EspPowerDown {
    /// Real-time clock controlling sleep
    rtc: Rtc<'static>,

    /// Pin powering external sensors
    supply: Output<'static>,

    /// Supply level before suspending, restored on resume
    supply_level: Option<Level>,
}

impl EspPowerDown {
    /// Create new low-power hardware
    pub fn new(rtc: Rtc<'static>, supply: Output<'static>) -> Self {
        Self {
            rtc,
            supply,
            supply_level: None,
        }
    }
}

impl PowerDown for EspPowerDown {
    fn quanta(&self) -> QuantumTable {
        QuantumTable::WATCHDOG
    }

    fn suspend_peripherals(&mut self) {
        let level = self.supply.output_level();
        trace!("Switch off sensor supply, was {level:?}");
        self.supply_level = Some(level);
        self.supply.set_low();
    }

    fn resume_peripherals(&mut self) {
        if let Some(level) = self.supply_level.take() {
            trace!("Restore sensor supply to {level:?}");
            self.supply.set_level(level);
        }
    }

    fn power_down(&mut self, quantum: Quantum) {
        let gpio = GpioWakeupSource::new();
        // Interrupts stay masked until after waking up, a press between the
        // check and sleep entry still wakes the processor through the GPIO
        critical_section::with(|_cs| {
            if let Some(code) = WAKE_FLAG.pending() {
                trace!("Skip {quantum}, flag {code} already raised");
                return;
            }
            match quantum {
                Quantum::Timed(ms) => {
                    let timer = TimerWakeupSource::new(Duration::from_millis(ms.into()));
                    self.rtc.sleep_light(&[&timer, &gpio]);
                }
                Quantum::Indefinite => {
                    self.rtc.sleep_light(&[&gpio]);
                }
            }
        });
    }
}
