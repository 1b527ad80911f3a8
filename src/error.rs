//! Unified error type for quizcone.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! Every path that can fail here is handled fail-soft at the call site:
//! a dead sensor degrades to out-of-range readings, a failed notify is
//! dropped. The only unrecoverable step in the firmware is the terminal
//! System OFF, which is not an error.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Sensor
    /// The VL53L0X did not respond during initialization.
    SensorInit,

    /// A ranging measurement timed out or the bus transaction failed.
    SensorRead,

    // BLE
    /// A GATT notification could not be delivered (CCCD off, buffers
    /// full, or the peer is gone).
    Notify,
}
