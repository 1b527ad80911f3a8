//! User feedback policy: battery LED color and buzzer tone tables.
//!
//! Both outputs are pure functions of their inputs so the policy is
//! host-testable; the PWM tasks in `led.rs` and `buzzer.rs` just apply
//! what these return.

use crate::config::{BATTERY_LOW_PERCENT, BATTERY_MID_PERCENT, CHARGE_BLINK_INTERVAL_MS};

/// 8-bit-per-channel RGB duty triple.
pub type Rgb = (u8, u8, u8);

const RED: Rgb = (255, 0, 0);
const AMBER: Rgb = (255, 128, 0);
const GREEN: Rgb = (0, 255, 0);

/// Three-band battery color table.
pub fn color_for_battery(percent: u8) -> Rgb {
    if percent < BATTERY_LOW_PERCENT {
        RED
    } else if percent < BATTERY_MID_PERCENT {
        AMBER
    } else {
        GREEN
    }
}

/// What the LED should show right now. `None` means dark (the off phase
/// of the charge blink). The blink phase is derived from the clock
/// rather than a retained toggle, so the output is reproducible.
pub fn led_output(percent: u8, charging: bool, now_ms: u64) -> Option<Rgb> {
    let color = color_for_battery(percent);

    if !charging {
        return Some(color);
    }

    if (now_ms / CHARGE_BLINK_INTERVAL_MS) % 2 == 0 {
        Some(color)
    } else {
        None
    }
}

/// Semantic events the buzzer can voice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoundCue {
    Correct,
    Incorrect,
    Connected,
    Disconnected,
    Woke,
}

/// One tone in a sequence: play `freq_hz` for `duration_ms`, then stay
/// silent for `pause_after_ms` before the next segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToneSegment {
    pub freq_hz: u16,
    pub duration_ms: u16,
    pub pause_after_ms: u16,
}

const fn seg(freq_hz: u16, duration_ms: u16, pause_after_ms: u16) -> ToneSegment {
    ToneSegment {
        freq_hz,
        duration_ms,
        pause_after_ms,
    }
}

/// Rising triad.
const CORRECT: [ToneSegment; 3] = [seg(1000, 100, 50), seg(1500, 100, 50), seg(2000, 150, 0)];

/// Falling growl.
const INCORRECT: [ToneSegment; 3] = [seg(400, 150, 50), seg(300, 150, 50), seg(200, 200, 0)];

const CONNECTED: [ToneSegment; 2] = [seg(800, 100, 50), seg(1200, 150, 0)];

const DISCONNECTED: [ToneSegment; 2] = [seg(600, 150, 50), seg(400, 200, 0)];

const WOKE: [ToneSegment; 3] = [seg(500, 100, 30), seg(800, 100, 30), seg(1200, 120, 0)];

/// Tone sequence for a cue. Playback is synchronous to completion and
/// must end muted.
pub fn tone_sequence(cue: SoundCue) -> &'static [ToneSegment] {
    match cue {
        SoundCue::Correct => &CORRECT,
        SoundCue::Incorrect => &INCORRECT,
        SoundCue::Connected => &CONNECTED,
        SoundCue::Disconnected => &DISCONNECTED,
        SoundCue::Woke => &WOKE,
    }
}
