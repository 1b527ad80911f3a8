//! Battery math: SAADC counts to volts to percentage, plus charger
//! presence.
//!
//! Two redundant sense channels measure the same rail; a combine policy
//! folds them into one voltage so a single drifting channel cannot skew
//! the estimate badly. Charger presence is an independent threshold
//! compare on a third channel and never affects the percentage.

use crate::config::{
    ADC_FULL_SCALE_VOLTS, ADC_RANGE, BATTERY_DIVIDER, BATTERY_EMPTY_VOLTS, BATTERY_FULL_VOLTS,
    VBUS_THRESHOLD_COUNTS,
};

/// How the two battery sense channels are folded into one voltage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CombinePolicy {
    /// Mean of both channels (default; rejects symmetric noise).
    Average,
    /// Lower of the two (pessimistic; rejects a stuck-high channel).
    MinOfTwo,
}

/// One battery sample as published to the rest of the firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryReading {
    pub percent: u8,
    pub charging: bool,
    pub sampled_at: u64,
}

/// Convert one raw SAADC sample to the voltage at the battery rail.
/// Negative counts (ADC noise around ground) clamp to zero.
pub fn volts_from_counts(counts: i16) -> f32 {
    let counts = counts.max(0) as f32;
    counts / ADC_RANGE * ADC_FULL_SCALE_VOLTS * BATTERY_DIVIDER
}

/// Fold the two sense-channel voltages per the configured policy.
pub fn combine_volts(v1: f32, v2: f32, policy: CombinePolicy) -> f32 {
    match policy {
        CombinePolicy::Average => (v1 + v2) / 2.0,
        CombinePolicy::MinOfTwo => {
            if v1 < v2 {
                v1
            } else {
                v2
            }
        }
    }
}

/// Linear map from the empty/full voltage window to 0..=100.
pub fn percent_from_volts(volts: f32) -> u8 {
    let span = BATTERY_FULL_VOLTS - BATTERY_EMPTY_VOLTS;
    let fraction = (volts - BATTERY_EMPTY_VOLTS) / span * 100.0;
    fraction.clamp(0.0, 100.0) as u8
}

/// Percentage from a raw two-channel sample.
pub fn percent_from_counts(c1: i16, c2: i16, policy: CombinePolicy) -> u8 {
    let volts = combine_volts(volts_from_counts(c1), volts_from_counts(c2), policy);
    percent_from_volts(volts)
}

/// Charger presence from the VBUS sense channel.
pub fn vbus_present(counts: i16) -> bool {
    counts > VBUS_THRESHOLD_COUNTS
}
