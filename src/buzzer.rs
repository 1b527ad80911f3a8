//! Buzzer tone playback.
//!
//! Owned by the control loop: playback is synchronous and intentionally
//! occupies the loop for its fixed duration (no time-critical input
//! exists during feedback). Every sequence ends muted.

use embassy_nrf::peripherals::PWM0;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_time::Timer;

use quizcone::feedback::{tone_sequence, SoundCue};

pub struct Buzzer {
    pwm: SimplePwm<'static, PWM0>,
}

impl Buzzer {
    pub fn new(mut pwm: SimplePwm<'static, PWM0>) -> Self {
        pwm.set_prescaler(Prescaler::Div16);
        let mut buzzer = Self { pwm };
        buzzer.mute();
        buzzer
    }

    /// Play a cue's tone sequence to completion.
    pub async fn play(&mut self, cue: SoundCue) {
        for segment in tone_sequence(cue) {
            self.pwm.set_period(segment.freq_hz as u32);
            let half = self.pwm.max_duty() / 2;
            self.pwm.set_duty(0, half);
            Timer::after_millis(segment.duration_ms as u64).await;
            self.mute();
            if segment.pause_after_ms > 0 {
                Timer::after_millis(segment.pause_after_ms as u64).await;
            }
        }
        self.mute();
    }

    pub fn mute(&mut self) {
        self.pwm.set_duty(0, 0);
    }
}
