//! Battery and charger sampling task.
//!
//! Three SAADC channels: two redundant battery sense inputs and the
//! VBUS divider. Charger presence is sampled every pass because it
//! drives the LED blink; the battery percentage is recomputed on a
//! slower cadence to bound sampling cost.

use embassy_nrf::saadc::Saadc;
use embassy_time::Timer;

use quizcone::battery_logic::{percent_from_counts, vbus_present, BatteryReading, CombinePolicy};
use quizcone::config::{BATTERY_SAMPLE_INTERVAL_MS, CHARGE_SAMPLE_INTERVAL_MS};

use crate::now_ms;

/// Channel combine policy for this board revision (both dividers feed
/// the same rail, so averaging rejects sampling noise).
const COMBINE: CombinePolicy = CombinePolicy::Average;

#[embassy_executor::task]
pub async fn battery_task(mut adc: Saadc<'static, 3>) -> ! {
    let readings = crate::BATTERY.sender();

    let mut percent = 0u8;
    let mut last_percent_at: Option<u64> = None;

    loop {
        let mut buf = [0i16; 3];
        adc.sample(&mut buf).await;

        let now = now_ms();
        let due = match last_percent_at {
            Some(at) => now.saturating_sub(at) >= BATTERY_SAMPLE_INTERVAL_MS,
            None => true,
        };
        if due {
            percent = percent_from_counts(buf[0], buf[1], COMBINE);
            last_percent_at = Some(now);
        }

        readings.send(BatteryReading {
            percent,
            charging: vbus_present(buf[2]),
            sampled_at: now,
        });

        Timer::after_millis(CHARGE_SAMPLE_INTERVAL_MS).await;
    }
}
