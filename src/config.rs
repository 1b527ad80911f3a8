//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// Device identity

/// Index into [`DEVICE_NAMES`]; baked in per unit at build time.
pub const DEVICE_ID: u8 = 0;

/// Advertised names, one per cone color.
pub const DEVICE_NAMES: [&str; 4] = ["Cone-Blue", "Cone-Red", "Cone-Yellow", "Cone-Green"];

/// Name this unit advertises under.
pub const DEVICE_NAME: &str = DEVICE_NAMES[DEVICE_ID as usize];

// BLE
//
// Service and characteristic UUIDs are fixed in `src/ble/server.rs`
// (the gatt_service macro needs them as literals):
//
//   service:  beb5483e-36e1-4688-b7f5-ea07361b26a7
//   events:   beb5483e-36e1-4688-b7f5-ea07361b26a8  (read / notify, 8-byte frames)
//   control:  beb5483e-36e1-4688-b7f5-ea07361b26a9  (write, 1-2 bytes)

/// Advertising interval (in 0.625 ms units). 400 = 250 ms.
pub const BLE_ADV_INTERVAL: u32 = 400;

// Session timing

/// Control-loop tick interval (ms).
pub const TICK_INTERVAL_MS: u64 = 10;

/// How long to advertise without a connection before giving up and
/// sleeping (ms).
pub const ADVERTISING_TIMEOUT_MS: u64 = 5 * 60 * 1000;

/// Global inactivity timeout (ms). No activity from any source for this
/// long forces deep sleep regardless of session state.
pub const IDLE_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Settle delay between quiescing peripherals and System OFF (ms).
pub const SLEEP_SETTLE_MS: u64 = 100;

// Detection (VL53L0X time-of-flight)

/// Sensor poll cadence while the session is in Polling (ms). Bounded
/// below by the sensor's measurement timing budget.
pub const TOF_POLL_INTERVAL_MS: u64 = 33;

/// Sensor measurement timing budget (us).
pub const TOF_TIMING_BUDGET_US: u32 = 33_000;

/// Target window: a reading strictly inside (min, max) is a detection.
pub const DETECT_MIN_MM: u16 = 50;
pub const DETECT_MAX_MM: u16 = 1000;

/// Absolute sensor range; readings at or beyond this are invalid.
pub const SENSOR_ABS_MAX_MM: u16 = 2000;

/// Distance reported when the sensor times out or is absent. Treated as
/// out-of-range everywhere.
pub const SENSOR_INVALID_MM: u16 = 9999;

/// Minimum spacing between two reported detections (ms).
pub const DETECT_COOLDOWN_MS: u64 = 500;

// Battery measurement

/// Interval between battery percentage samples (ms). Charger presence is
/// sampled every [`CHARGE_SAMPLE_INTERVAL_MS`] since it drives the LED
/// blink.
pub const BATTERY_SAMPLE_INTERVAL_MS: u64 = 5000;
pub const CHARGE_SAMPLE_INTERVAL_MS: u64 = 100;

/// SAADC full scale: 12-bit, gain 1/6, internal 0.6 V reference = 3.6 V.
pub const ADC_RANGE: f32 = 4096.0;
pub const ADC_FULL_SCALE_VOLTS: f32 = 3.6;

/// External divider between the battery rail and both sense inputs.
pub const BATTERY_DIVIDER: f32 = 2.0;

/// Linear percentage map endpoints (single Li-Ion cell).
pub const BATTERY_EMPTY_VOLTS: f32 = 3.0;
pub const BATTERY_FULL_VOLTS: f32 = 4.2;

/// Raw SAADC threshold on the VBUS sense divider (10k/10k) above which a
/// charger is considered present.
pub const VBUS_THRESHOLD_COUNTS: i16 = 2000;

// Feedback

/// Battery color bands: below low = red, below mid = amber, else green.
pub const BATTERY_LOW_PERCENT: u8 = 20;
pub const BATTERY_MID_PERCENT: u8 = 50;

/// LED refresh cadence (ms) and charge-blink half-period (ms).
pub const LED_REFRESH_MS: u64 = 50;
pub const CHARGE_BLINK_INTERVAL_MS: u64 = 500;

// Button

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 150;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button (wake-capable)  → P0.11
//   Battery sense A        → AIN0 (P0.02)
//   Battery sense B        → AIN1 (P0.03)
//   VBUS sense             → AIN2 (P0.04)
//   Buzzer                 → P0.08
//   LED R / G / B          → P0.13 / P0.14 / P0.15
//   I²C SDA / SCL          → P0.26 / P0.27

/// Button pin number on port 0, needed for the System OFF wake sense.
pub const BUTTON_PIN: usize = 11;
