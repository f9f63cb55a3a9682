// Copyright Claudio Mattera 2025.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Main crate

#![no_std]
#![no_main]

use log::error;
use log::info;

use embassy_executor::Spawner;

use embassy_time::Delay;
use embassy_time::Duration;
use embassy_time::Timer;

use esp_alloc::heap_allocator;

use esp_hal::clock::CpuClock;
use esp_hal::gpio::Input;
use esp_hal::gpio::Io;
use esp_hal::gpio::Level;
use esp_hal::gpio::Output;
use esp_hal::gpio::Pull;
use esp_hal::init as initialize_esp_hal;
use esp_hal::prelude::*; // main
use esp_hal::rng::Rng;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::timer::systimer::SystemTimer;
use esp_hal::timer::systimer::Target;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::Config as EspConfig;

use esp_hal_embassy::init as initialize_embassy;

use heapless::String;

use esp_backtrace as _;

use snooze_rs::AsyncSnooze;
use snooze_rs::Config as SnoozeConfig;
use snooze_rs::Led;
use snooze_rs::Scheduler;
use snooze_rs::WakeReason;

mod button;
use self::button::arm as arm_button;

mod clock;
use self::clock::SoftwareClock;

mod logging;
use self::logging::setup as setup_logging;

mod power;
use self::power::EspPowerDown;

mod wifi;
use self::wifi::start as start_wifi;
use self::wifi::Error as WifiError;

/// Duration of each sleep, in milliseconds
const SLEEP_PERIOD_MS: u32 = 300_000;

/// Whether to notify the gateway before sleeping
const SMART_SLEEP: bool = true;

/// Number of ticks after which the tick requests an early wakeup
const REPORT_EVERY_TICKS: u32 = 8;

/// Code returned by the tick to request an early wakeup
const REPORT_CODE: i8 = 1;

/// Period to stay awake between sleeps
const AWAKE_PERIOD: Duration = Duration::from_secs(5);

/// Period to stay awake after a button press or a report request
const EARLY_AWAKE_PERIOD: Duration = Duration::from_secs(30);

/// SSID for WiFi network
const WIFI_SSID: &str = env!("WIFI_SSID");

/// Password for WiFi network
const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");

/// Size of heap for dynamically-allocated memory
const HEAP_MEMORY_SIZE: usize = 72 * 1024;

/// Main task
#[main]
async fn main(spawner: Spawner) {
    setup_logging();

    if let Err(error) = main_fallible(&spawner).await {
        error!("Error while running firmware: {error:?}");
    }
}

/// Main task that can return an error
async fn main_fallible(spawner: &Spawner) -> Result<(), Error> {
    let peripherals = initialize_esp_hal({
        let mut config = EspConfig::default();
        config.cpu_clock = CpuClock::max();
        config
    });

    heap_allocator!(HEAP_MEMORY_SIZE);

    let systimer = SystemTimer::new(peripherals.SYSTIMER).split::<Target>();
    initialize_embassy(systimer.alarm0);

    let rng = Rng::new(peripherals.RNG);

    let ssid = String::<32>::try_from(WIFI_SSID).map_err(|()| Error::ParseCredentials)?;
    let password = String::<64>::try_from(WIFI_PASSWORD).map_err(|()| Error::ParseCredentials)?;

    info!("Start WiFi");
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let transport = start_wifi(
        *spawner,
        timg0,
        rng,
        peripherals.WIFI,
        peripherals.RADIO_CLK,
        (ssid, password),
    )?;

    info!("Arm wakeup button");
    let mut io = Io::new(peripherals.IO_MUX);
    let button = Input::new(peripherals.GPIO9, Pull::Up);
    arm_button(&mut io, button);

    info!("Create status LED and sensor supply");
    let led = Led::new(Output::new(peripherals.GPIO18, Level::High));
    let supply = Output::new(peripherals.GPIO10, Level::High);

    let power = EspPowerDown::new(Rtc::new(peripherals.LPWR), supply);

    let mut ticks: u32 = 0;
    let tick = move || -> i8 {
        ticks = ticks.wrapping_add(1);
        if ticks % REPORT_EVERY_TICKS == 0 {
            REPORT_CODE
        } else {
            0
        }
    };

    let scheduler = Scheduler::new(power, SoftwareClock::new()).with_tick(tick);
    let mut snooze = AsyncSnooze::new(scheduler, transport, led, Delay, SnoozeConfig::default());

    loop {
        let reason = snooze.snooze(SLEEP_PERIOD_MS, SMART_SLEEP).await;
        match reason {
            WakeReason::TimerExpired => info!("Slept for {}ms", snooze.scheduler().slept()),
            WakeReason::InterruptFlag(code) => {
                info!("Woken up by button {code} after {}ms", snooze.scheduler().slept());
            }
            WakeReason::CallbackRequested(code) => {
                info!("Woken up for report {code} after {}ms", snooze.scheduler().slept());
            }
            WakeReason::SleepNotPossible => info!("Could not sleep, stay awake"),
        }
        info!(
            "Wake reason code {}, {}ms spent sleeping since boot",
            reason.code(),
            snooze.scheduler().clock().slept_since_boot()
        );

        let awake = if reason.is_early() {
            EARLY_AWAKE_PERIOD
        } else {
            AWAKE_PERIOD
        };
        Timer::after(awake).await;
    }
}

/// An error
#[derive(Debug)]
enum Error {
    /// Error while parsing SSID or password
    ParseCredentials,

    /// An error within WiFi operations
    #[expect(unused, reason = "Never read directly")]
    Wifi(WifiError),
}

impl From<WifiError> for Error {
    fn from(error: WifiError) -> Self {
        Self::Wifi(error)
    }
}
