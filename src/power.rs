//! Wake cause and deep sleep (System OFF).
//!
//! nRF52840 power modes:
//! - System ON: normal operation (~3.5 mA with BLE active)
//! - System ON Idle: CPU sleeping between Embassy wakeups (~1.5 mA)
//! - System OFF: deep sleep, wake on GPIO sense (~0.3 µA)
//!
//! System OFF ends the current execution: wake is a reset, and the only
//! state that survives is the RESETREAS register, consulted once at boot
//! to decide whether to play the wake cue.

use defmt::info;
use embassy_nrf::pac;

use quizcone::config::BUTTON_PIN;

/// Why this boot happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeCause {
    /// Cold power-on (or any non-sleep reset).
    PowerOn,
    /// GPIO sense wake from System OFF - the button was pressed.
    ButtonWake,
}

/// Read the wake cause. Call once at boot, before the SoftDevice takes
/// over the POWER peripheral, then [`clear_wake_cause`].
pub fn wake_cause() -> WakeCause {
    if pac::POWER.resetreas().read().off() {
        WakeCause::ButtonWake
    } else {
        WakeCause::PowerOn
    }
}

/// RESETREAS bits are write-one-to-clear; a stale OFF bit would fake a
/// button wake on the next cold boot.
pub fn clear_wake_cause() {
    pac::POWER.resetreas().write(|w| w.set_off(true));
}

/// Terminal power-down. The caller must have quiesced the radio, the
/// sensor, the buzzer and the LED first - this function only arms the
/// wake source and halts.
pub fn enter_deep_sleep() -> ! {
    info!("entering System OFF");

    // Wake on button low (active-low with pull-up, held by the input
    // configuration the button task already applied).
    pac::P0
        .pin_cnf(BUTTON_PIN)
        .modify(|w| w.set_sense(pac::gpio::vals::Sense::LOW));

    // The SoftDevice owns the POWER peripheral while enabled; System OFF
    // goes through its API.
    unsafe {
        nrf_softdevice::raw::sd_power_system_off();
    }

    // System OFF does not return; this satisfies the signature (and an
    // emulator that ignores the request).
    loop {
        cortex_m::asm::wfe();
    }
}
