//! RGB battery indicator task.
//!
//! Applies the pure feedback policy to the latest battery reading:
//! steady band color normally, blinking while charging. The session
//! blanks it through the `LED_OFF` signal on sleep entry, after which
//! the task parks dark.

use embassy_futures::select::{select, Either};
use embassy_nrf::peripherals::PWM1;
use embassy_nrf::pwm::SimplePwm;
use embassy_time::Timer;

use quizcone::battery_logic::BatteryReading;
use quizcone::config::LED_REFRESH_MS;
use quizcone::feedback::{led_output, Rgb};

use crate::now_ms;

#[embassy_executor::task]
pub async fn led_task(mut pwm: SimplePwm<'static, PWM1>) -> ! {
    pwm.set_max_duty(255);

    let mut battery = crate::BATTERY.receiver().unwrap();
    let mut reading: Option<BatteryReading> = None;

    loop {
        match select(crate::LED_OFF.wait(), Timer::after_millis(LED_REFRESH_MS)).await {
            Either::First(()) => {
                set_rgb(&mut pwm, (0, 0, 0));
                // Sleep entry: stay dark until System OFF cuts power.
                core::future::pending::<()>().await;
            }
            Either::Second(()) => {
                if let Some(latest) = battery.try_changed() {
                    reading = Some(latest);
                }
                if let Some(r) = reading {
                    match led_output(r.percent, r.charging, now_ms()) {
                        Some(color) => set_rgb(&mut pwm, color),
                        None => set_rgb(&mut pwm, (0, 0, 0)),
                    }
                }
            }
        }
    }
}

fn set_rgb(pwm: &mut SimplePwm<'static, PWM1>, (r, g, b): Rgb) {
    pwm.set_duty(0, r as u16);
    pwm.set_duty(1, g as u16);
    pwm.set_duty(2, b as u16);
}
