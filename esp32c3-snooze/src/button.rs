// Copyright Claudio Mattera 2025.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wakeup button

use core::cell::RefCell;
use core::num::NonZeroU8;

use log::warn;

use critical_section::Mutex;

use esp_hal::gpio::Event;
use esp_hal::gpio::Input;
use esp_hal::gpio::Io;
use esp_hal::gpio::WakeEvent;
use esp_hal::macros::handler;
use esp_hal::macros::ram;

use snooze_rs::WAKE_FLAG;

/// Code reported when the button wakes the node
pub const BUTTON_CODE: NonZeroU8 = NonZeroU8::MIN;

/// The button, shared with the interrupt handler
static BUTTON: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));

/// Arm the button as an interrupt and as a light sleep wakeup source
///
/// The button must be active low.
pub fn arm(io: &mut Io, mut button: Input<'static>) {
    io.set_interrupt_handler(interrupt_handler);

    if let Err(error) = button.wakeup_enable(true, WakeEvent::LowLevel) {
        warn!("Cannot use button for wakeup: {error:?}");
    }

    critical_section::with(|cs| {
        button.listen(Event::FallingEdge);
        BUTTON.borrow_ref_mut(cs).replace(button);
    });
}

/// Raise the wake flag when the button is pressed
#[handler]
#[ram]
fn interrupt_handler() {
    critical_section::with(|cs| {
        if let Some(button) = BUTTON.borrow_ref_mut(cs).as_mut() {
            if button.is_interrupt_set() {
                button.clear_interrupt();
                WAKE_FLAG.raise(BUTTON_CODE);
            }
        }
    });
}
