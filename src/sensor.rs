//! VL53L0X time-of-flight polling task.
//!
//! Runs only while the session gates it on (Polling state). Readings go
//! through the pure [`DetectionFilter`]; fired events land in the
//! detection channel for the control loop. The filter lives here so its
//! presence hysteresis survives polling stops - a disconnect mid-presence
//! must not re-arm the trigger.
//!
//! Every failure is soft: an absent or timed-out sensor produces the
//! out-of-range sentinel, which can never report a detection.

use defmt::{info, warn};
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::Twim;
use embassy_time::Timer;
use vl53l0x::VL53L0x;

use quizcone::config::{SENSOR_INVALID_MM, TOF_POLL_INTERVAL_MS, TOF_TIMING_BUDGET_US};
use quizcone::detect::DetectionFilter;
use quizcone::error::Error;

use crate::now_ms;

type Tof = VL53L0x<Twim<'static, TWISPI0>>;

fn init_tof(twi: Twim<'static, TWISPI0>) -> Result<Tof, Error> {
    let mut tof = VL53L0x::new(twi).map_err(|_| Error::SensorInit)?;
    tof.set_measurement_timing_budget(TOF_TIMING_BUDGET_US)
        .map_err(|_| Error::SensorInit)?;
    Ok(tof)
}

fn read_distance(tof: &mut Tof) -> Result<u16, Error> {
    tof.read_range_continuous_millimeters_blocking()
        .map_err(|_| Error::SensorRead)
}

#[embassy_executor::task]
pub async fn sensor_task(twi: Twim<'static, TWISPI0>) -> ! {
    let mut gate = crate::SENSOR_GATE.receiver().unwrap();
    let mut filter = DetectionFilter::new();

    let mut tof = match init_tof(twi) {
        Ok(t) => Some(t),
        Err(e) => {
            warn!("ToF init failed ({:?}), detections disabled", e);
            None
        }
    };

    let mut active = false;
    // One read-failure warning per polling run, not one per 33 ms.
    let mut read_fault_logged = false;

    loop {
        if !active {
            active = gate.changed().await;
            if active {
                info!("sensor sampling on");
                read_fault_logged = false;
                if let Some(t) = tof.as_mut() {
                    if t.start_continuous(TOF_POLL_INTERVAL_MS as u32).is_err() {
                        warn!("ToF continuous mode failed");
                    }
                }
            }
            continue;
        }

        if let Some(gate_on) = gate.try_changed() {
            if !gate_on {
                info!("sensor sampling off");
                if let Some(t) = tof.as_mut() {
                    let _ = t.stop_continuous();
                }
                active = false;
                continue;
            }
        }

        let distance_mm = match tof.as_mut() {
            Some(t) => match read_distance(t) {
                Ok(d) => d,
                Err(e) => {
                    if !read_fault_logged {
                        warn!("ToF read failed ({:?})", e);
                        read_fault_logged = true;
                    }
                    SENSOR_INVALID_MM
                }
            },
            None => SENSOR_INVALID_MM,
        };

        if let Some(event) = filter.evaluate(distance_mm, now_ms()) {
            info!("detection at {} mm", event.distance_mm);
            if crate::DETECTIONS.try_send(event).is_err() {
                warn!("detection queue full, event dropped");
            }
        }

        Timer::after_millis(TOF_POLL_INTERVAL_MS).await;
    }
}
