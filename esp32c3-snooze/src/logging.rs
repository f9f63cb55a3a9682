// Copyright Claudio Mattera 2025.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Functions for setting up the logging system

use core::str::FromStr;

use log::max_level;
use log::set_logger_racy;
use log::set_max_level_racy;
use log::trace;
use log::Level;
use log::LevelFilter;
use log::Log;
use log::Metadata;
use log::Record;

use esp_println::println;

/// Targets that are too chatty below level info
const NOISY_TARGETS: [&str; 3] = ["esp_wifi", "embassy_net", "smoltcp"];

/// Setup logging
///
/// The log level is read from the environment variable `SNOOZE_LOGLEVEL` at
/// build time, and defaults to `info`.
///
/// This requires a clean rebuild because of
/// <https://github.com/rust-lang/cargo/issues/10358>
pub fn setup() {
    /// Log level
    const LEVEL: Option<&'static str> = option_env!("SNOOZE_LOGLEVEL");

    // SAFETY:
    // This is called once at startup, before any other task is spawned
    if unsafe { set_logger_racy(&EspPrintlnLogger) }.is_err() {
        println!("Logger was already set");
        return;
    }

    let level = LEVEL.map_or(LevelFilter::Info, |level| {
        LevelFilter::from_str(level).unwrap_or(LevelFilter::Off)
    });

    // SAFETY:
    // This is called once at startup, before any other task is spawned
    unsafe { set_max_level_racy(level) };

    trace!("Logger is ready");
}

/// Return the ANSI colour modifier for a level
fn colour(level: Level) -> &'static str {
    match level {
        Level::Error => "\u{001B}[31m",
        Level::Warn => "\u{001B}[33m",
        Level::Info => "\u{001B}[32m",
        Level::Debug => "\u{001B}[34m",
        Level::Trace => "\u{001B}[35m",
    }
}

/// Logger that prints messages to console
struct EspPrintlnLogger;

impl Log for EspPrintlnLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let noisy = NOISY_TARGETS
            .iter()
            .any(|target| metadata.target().starts_with(target));
        if noisy {
            metadata.level() <= Level::Info
        } else {
            metadata.level() <= max_level()
        }
    }

    fn log(&self, record: &Record) {
        /// Modifier for restoring normal text style
        const RESET: &str = "\u{001B}[0m";
        /// Modifier for setting gray text
        const GRAY: &str = "\u{001B}[2m";

        if self.enabled(record.metadata()) {
            println!(
                "{}{:>5}{} {}{}]{} {}",
                colour(record.level()),
                record.level(),
                RESET,
                GRAY,
                record.target(),
                RESET,
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
