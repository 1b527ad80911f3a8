//! Proximity detection filter.
//!
//! Turns the raw distance stream from the time-of-flight sensor into
//! discrete "object entered the field" events. Three mechanisms ensure a
//! single physical presence yields exactly one event:
//!
//! - validity: readings outside the sensor's absolute range (including
//!   the timeout sentinel) are never detections;
//! - presence hysteresis: once an object is in the target window, repeat
//!   readings are suppressed until a reading clears the loose upper
//!   bound;
//! - cooldown: at most one reported detection per
//!   [`DETECT_COOLDOWN_MS`](crate::config::DETECT_COOLDOWN_MS), measured
//!   from the previous report.
//!
//! Filter state deliberately survives polling stops: a disconnect in the
//! middle of a presence must not re-arm the trigger.

use crate::config::{DETECT_COOLDOWN_MS, DETECT_MAX_MM, DETECT_MIN_MM, SENSOR_ABS_MAX_MM};

/// A reported detection, consumed once by the session while Polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectionEvent {
    pub distance_mm: u16,
    pub observed_at: u64,
}

#[derive(Debug, Default)]
pub struct DetectionFilter {
    object_present: bool,
    last_reported_at: Option<u64>,
}

impl DetectionFilter {
    pub const fn new() -> Self {
        Self {
            object_present: false,
            last_reported_at: None,
        }
    }

    /// Whether the presence hysteresis flag is currently held.
    pub fn object_present(&self) -> bool {
        self.object_present
    }

    /// Feed one reading; returns a detection event if one fires.
    pub fn evaluate(&mut self, distance_mm: u16, now_ms: u64) -> Option<DetectionEvent> {
        let valid = distance_mm > 0 && distance_mm < SENSOR_ABS_MAX_MM;
        let in_window =
            valid && distance_mm > DETECT_MIN_MM && distance_mm < DETECT_MAX_MM;

        if !in_window {
            // Presence clears only past the loose upper bound; a reading
            // below the window (object touching the lens) keeps it held.
            if distance_mm > DETECT_MAX_MM {
                self.object_present = false;
            }
            return None;
        }

        if self.object_present || !self.cooldown_elapsed(now_ms) {
            return None;
        }

        self.object_present = true;
        self.last_reported_at = Some(now_ms);

        Some(DetectionEvent {
            distance_mm,
            observed_at: now_ms,
        })
    }

    fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        match self.last_reported_at {
            Some(at) => now_ms.saturating_sub(at) >= DETECT_COOLDOWN_MS,
            None => true,
        }
    }
}
