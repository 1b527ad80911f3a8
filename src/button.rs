//! GPIO button input.
//!
//! The task only reports raw press instants (the moral equivalent of an
//! ISR setting a flag); the control loop owns the debounce decision so
//! the policy stays host-testable. Active-low with internal pull-up;
//! the same pin wakes the chip from System OFF.

use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::Timer;

use crate::now_ms;

#[embassy_executor::task]
pub async fn button_task(pin: AnyPin) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        btn.wait_for_falling_edge().await;
        // Queue full means the loop already has an unprocessed press;
        // this one carries no extra information.
        let _ = crate::BUTTON_PRESSES.try_send(now_ms());

        // Wait for release plus a short settle so contact chatter does
        // not re-trigger the edge wait.
        btn.wait_for_rising_edge().await;
        Timer::after_millis(10).await;
    }
}
