//! Host-testable library interface for quizcone.
//!
//! Everything here is pure logic: the session state machine, the
//! detection filter, battery math, feedback policy, the wire codec and
//! the button debouncer. No embedded hardware is required, so the whole
//! core runs under `cargo test` on the host.
//!
//! The embedded binary (`src/main.rs`, behind the `embedded` feature)
//! layers the Embassy tasks and the SoftDevice gateway on top of these
//! modules.

#![cfg_attr(not(test), no_std)]

pub mod battery_logic;
pub mod config;
pub mod debounce;
pub mod detect;
pub mod error;
pub mod feedback;
pub mod protocol;
pub mod session;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::battery_logic::{
        combine_volts, percent_from_counts, percent_from_volts, vbus_present, volts_from_counts,
        CombinePolicy,
    };
    use crate::config;
    use crate::debounce::Debouncer;
    use crate::detect::DetectionFilter;
    use crate::feedback::{color_for_battery, led_output, tone_sequence, SoundCue};
    use crate::protocol::{Command, CommandKind, OutboundMessage, StatusCode, AUX_NONE, GUARD_BYTE};
    use crate::session::{CommandMailbox, Effect, EffectQueue, Session, SessionEvent, SessionState};

    // ════════════════════════════════════════════════════════════════════════
    // Protocol Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn status_frame_layout() {
        let frame = OutboundMessage::Status(StatusCode::Sleeping).encode(2);
        assert_eq!(frame, [0x01, 0x02, GUARD_BYTE, 0x00, 0x03, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn detection_frame_distance_is_little_endian() {
        let frame = OutboundMessage::Detection { distance_mm: 0x0221 }.encode(0);
        assert_eq!(frame[0], 0x02);
        assert_eq!(frame[4], 0x21);
        assert_eq!(frame[5], 0x02);
        assert_eq!(frame[6], 0x00);
    }

    #[test]
    fn battery_frame_layout() {
        let frame = OutboundMessage::Battery { percent: 87 }.encode(1);
        assert_eq!(frame, [0x03, 0x01, GUARD_BYTE, 0x00, 87, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn every_frame_carries_guard_and_reserved() {
        for msg in [
            OutboundMessage::Status(StatusCode::Connected),
            OutboundMessage::Detection { distance_mm: 300 },
            OutboundMessage::Battery { percent: 0 },
        ] {
            let frame = msg.encode(3);
            assert_eq!(frame[1], 3);
            assert_eq!(frame[2], GUARD_BYTE);
            assert_eq!(frame[3], 0x00);
        }
    }

    #[test]
    fn parse_all_known_commands() {
        let cases = [
            (0x01u8, CommandKind::Start),
            (0x02, CommandKind::Stop),
            (0x03, CommandKind::Sleep),
            (0x05, CommandKind::KeepAlive),
            (0x10, CommandKind::SoundCorrect),
            (0x11, CommandKind::SoundIncorrect),
        ];
        for (code, kind) in cases {
            let cmd = Command::parse(&[code]).unwrap();
            assert_eq!(cmd.kind, kind);
            assert_eq!(cmd.aux, AUX_NONE);
            assert!(!cmd.has_aux());
        }
    }

    #[test]
    fn parse_command_with_aux_byte() {
        let cmd = Command::parse(&[0x01, 1]).unwrap();
        assert_eq!(cmd.kind, CommandKind::Start);
        assert_eq!(cmd.aux, 1);
        assert!(cmd.has_aux());
    }

    #[test]
    fn parse_ignores_trailing_bytes() {
        let cmd = Command::parse(&[0x02, 0, 0xAA, 0xBB]).unwrap();
        assert_eq!(cmd.kind, CommandKind::Stop);
        assert_eq!(cmd.aux, 0);
    }

    #[test]
    fn parse_rejects_empty_and_unknown() {
        assert!(Command::parse(&[]).is_none());
        assert!(Command::parse(&[0x00]).is_none());
        assert!(Command::parse(&[0x04]).is_none());
        assert!(Command::parse(&[0xFE, 1]).is_none());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Command Mailbox Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn mailbox_take_consumes() {
        let mut mb = CommandMailbox::new();
        assert!(!mb.post(Command::new(CommandKind::Stop)));
        assert_eq!(mb.take().unwrap().kind, CommandKind::Stop);
        assert!(mb.take().is_none());
        assert_eq!(mb.dropped(), 0);
    }

    #[test]
    fn mailbox_overwrite_is_last_write_wins_and_counted() {
        let mut mb = CommandMailbox::new();
        mb.post(Command::new(CommandKind::Start));
        assert!(mb.post(Command::new(CommandKind::Sleep)));
        assert_eq!(mb.take().unwrap().kind, CommandKind::Sleep);
        assert_eq!(mb.dropped(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Session State Machine Tests
    // ════════════════════════════════════════════════════════════════════════

    fn effects(session: &mut Session, now: u64) -> EffectQueue {
        let mut fx = EffectQueue::new();
        session.tick(now, &mut fx);
        fx
    }

    fn apply(session: &mut Session, ev: SessionEvent, now: u64) -> EffectQueue {
        let mut fx = EffectQueue::new();
        session.handle_event(ev, now, &mut fx);
        fx
    }

    /// Boot the machine and bring the link up: Init → Advertising →
    /// Connected.
    fn connected_session(now: u64) -> Session {
        let mut s = Session::new(now);
        let fx = effects(&mut s, now);
        assert_eq!(fx.as_slice(), [Effect::StartAdvertising]);
        apply(&mut s, SessionEvent::PeerConnected, now);
        let fx = effects(&mut s, now);
        assert_eq!(s.state(), SessionState::Connected);
        assert_eq!(
            fx.as_slice(),
            [Effect::Send(OutboundMessage::Status(StatusCode::Connected))]
        );
        s
    }

    fn polling_session(now: u64, aux: u8) -> Session {
        let mut s = connected_session(now);
        apply(
            &mut s,
            SessionEvent::Command(Command::with_aux(CommandKind::Start, aux)),
            now,
        );
        let fx = effects(&mut s, now);
        assert_eq!(s.state(), SessionState::Polling);
        assert!(fx.contains(&Effect::SensorActive(true)));
        s
    }

    #[test]
    fn init_advertises_immediately() {
        let mut s = Session::new(0);
        assert_eq!(s.state(), SessionState::Init);
        let fx = effects(&mut s, 0);
        assert_eq!(s.state(), SessionState::Advertising);
        assert_eq!(fx.as_slice(), [Effect::StartAdvertising]);
    }

    #[test]
    fn advertising_start_is_emitted_only_on_entry() {
        let mut s = Session::new(0);
        effects(&mut s, 0);
        // Re-polling the state must not restart advertising.
        assert!(effects(&mut s, 10).is_empty());
        assert!(effects(&mut s, 20).is_empty());
    }

    #[test]
    fn advertising_timeout_forces_sleep() {
        let mut s = Session::new(0);
        effects(&mut s, 0);
        let fx = effects(&mut s, config::ADVERTISING_TIMEOUT_MS + 1);
        assert_eq!(s.state(), SessionState::EnteringSleep);
        // Not connected: no farewell status, no force-disconnect.
        assert_eq!(
            fx.as_slice(),
            [
                Effect::StopAdvertising,
                Effect::SilenceBuzzer,
                Effect::BlankLed,
                Effect::SensorActive(false),
                Effect::Shutdown,
            ]
        );
    }

    #[test]
    fn connect_plays_cue_and_acknowledges() {
        let mut s = Session::new(0);
        effects(&mut s, 0);
        let fx = apply(&mut s, SessionEvent::PeerConnected, 5);
        assert_eq!(fx.as_slice(), [Effect::Play(SoundCue::Connected)]);
        let fx = effects(&mut s, 6);
        assert_eq!(s.state(), SessionState::Connected);
        assert_eq!(
            fx.as_slice(),
            [Effect::Send(OutboundMessage::Status(StatusCode::Connected))]
        );
    }

    #[test]
    fn second_link_of_power_cycle_is_reconnected() {
        let mut s = connected_session(0);
        apply(&mut s, SessionEvent::PeerDisconnected, 10);
        let fx = effects(&mut s, 11);
        assert_eq!(s.state(), SessionState::Advertising);
        assert_eq!(fx.as_slice(), [Effect::StartAdvertising]);

        apply(&mut s, SessionEvent::PeerConnected, 20);
        let fx = effects(&mut s, 21);
        assert_eq!(
            fx.as_slice(),
            [Effect::Send(OutboundMessage::Status(StatusCode::Reconnected))]
        );
    }

    #[test]
    fn start_command_enters_polling() {
        let s = polling_session(0, 1);
        assert_eq!(s.state(), SessionState::Polling);
        assert_eq!(s.previous_state(), SessionState::Connected);
    }

    #[test]
    fn stop_command_ends_polling() {
        let mut s = polling_session(0, AUX_NONE);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::Stop)), 10);
        let fx = effects(&mut s, 10);
        assert_eq!(s.state(), SessionState::Connected);
        assert!(fx.contains(&Effect::SensorActive(false)));
    }

    #[test]
    fn sleep_command_shutdown_order_is_the_quiesce_invariant() {
        let mut s = connected_session(0);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::Sleep)), 10);
        let fx = effects(&mut s, 10);
        assert_eq!(s.state(), SessionState::EnteringSleep);
        assert_eq!(
            fx.as_slice(),
            [
                Effect::Send(OutboundMessage::Status(StatusCode::Sleeping)),
                Effect::StopAdvertising,
                Effect::ForceDisconnect,
                Effect::SilenceBuzzer,
                Effect::BlankLed,
                Effect::SensorActive(false),
                Effect::Shutdown,
            ]
        );
    }

    #[test]
    fn entering_sleep_is_terminal() {
        let mut s = connected_session(0);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::Sleep)), 10);
        effects(&mut s, 10);
        // Later ticks and events must not emit anything further.
        assert!(effects(&mut s, 1000).is_empty());
        let fx = apply(&mut s, SessionEvent::PeerDisconnected, 1001);
        assert!(fx.is_empty());
        assert!(effects(&mut s, 1002).is_empty());
    }

    #[test]
    fn keepalive_answers_with_battery_frame() {
        let mut s = connected_session(0);
        s.set_battery_percent(73);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::KeepAlive)), 10);
        let fx = effects(&mut s, 10);
        assert_eq!(
            fx.as_slice(),
            [Effect::Send(OutboundMessage::Battery { percent: 73 })]
        );
        assert_eq!(s.state(), SessionState::Connected);
    }

    #[test]
    fn sound_commands_do_not_change_state() {
        for (kind, cue) in [
            (CommandKind::SoundCorrect, SoundCue::Correct),
            (CommandKind::SoundIncorrect, SoundCue::Incorrect),
        ] {
            let mut s = polling_session(0, AUX_NONE);
            apply(&mut s, SessionEvent::Command(Command::new(kind)), 10);
            let fx = effects(&mut s, 10);
            assert_eq!(fx.as_slice(), [Effect::Play(cue)]);
            assert_eq!(s.state(), SessionState::Polling);
        }
    }

    #[test]
    fn consumed_command_refreshes_activity() {
        let mut s = connected_session(0);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::Stop)), 500);
        effects(&mut s, 600);
        assert_eq!(s.last_activity_at(), 600);
    }

    #[test]
    fn button_press_refreshes_activity() {
        let mut s = connected_session(0);
        apply(&mut s, SessionEvent::ButtonPressed, 4242);
        assert_eq!(s.last_activity_at(), 4242);
    }

    #[test]
    fn detection_in_polling_is_one_shot() {
        let mut s = polling_session(0, 1);
        apply(
            &mut s,
            SessionEvent::Detection(crate::detect::DetectionEvent {
                distance_mm: 300,
                observed_at: 50,
            }),
            50,
        );
        let fx = effects(&mut s, 50);
        assert_eq!(s.state(), SessionState::Connected);
        assert_eq!(
            fx.as_slice(),
            [
                Effect::Play(SoundCue::Correct),
                Effect::Send(OutboundMessage::Detection { distance_mm: 300 }),
                Effect::SensorActive(false),
            ]
        );
        assert_eq!(s.last_activity_at(), 50);
    }

    #[test]
    fn decoy_cone_plays_incorrect_on_detection() {
        let mut s = polling_session(0, 0);
        apply(
            &mut s,
            SessionEvent::Detection(crate::detect::DetectionEvent {
                distance_mm: 300,
                observed_at: 50,
            }),
            50,
        );
        let fx = effects(&mut s, 50);
        assert_eq!(fx[0], Effect::Play(SoundCue::Incorrect));
    }

    #[test]
    fn detection_outside_polling_is_dropped() {
        let mut s = connected_session(0);
        apply(
            &mut s,
            SessionEvent::Detection(crate::detect::DetectionEvent {
                distance_mm: 300,
                observed_at: 10,
            }),
            10,
        );
        // Connected never consumes detections, and entering Polling
        // later must not replay a stale one.
        let fx = effects(&mut s, 11);
        assert!(fx.is_empty());
        assert_eq!(s.state(), SessionState::Connected);
    }

    #[test]
    fn state_changing_command_skips_detection_that_tick() {
        let mut s = polling_session(0, 1);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::Stop)), 10);
        apply(
            &mut s,
            SessionEvent::Detection(crate::detect::DetectionEvent {
                distance_mm: 300,
                observed_at: 10,
            }),
            10,
        );
        let fx = effects(&mut s, 10);
        assert_eq!(s.state(), SessionState::Connected);
        assert!(!fx
            .iter()
            .any(|e| matches!(e, Effect::Send(OutboundMessage::Detection { .. }))));
    }

    #[test]
    fn disconnect_in_polling_returns_to_advertising_and_clears_pending() {
        let mut s = polling_session(0, 1);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::Sleep)), 10);
        apply(&mut s, SessionEvent::PeerDisconnected, 11);
        let fx = effects(&mut s, 12);
        assert_eq!(s.state(), SessionState::Advertising);
        assert!(fx.contains(&Effect::StartAdvertising));

        // The cleared Sleep command must not fire after reconnecting.
        apply(&mut s, SessionEvent::PeerConnected, 20);
        effects(&mut s, 21);
        let fx = effects(&mut s, 22);
        assert_eq!(s.state(), SessionState::Connected);
        assert!(fx.is_empty());
    }

    #[test]
    fn two_commands_in_one_tick_keep_only_the_second() {
        let mut s = connected_session(0);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::SoundCorrect)), 10);
        apply(&mut s, SessionEvent::Command(Command::new(CommandKind::SoundIncorrect)), 11);
        let fx = effects(&mut s, 12);
        assert_eq!(fx.as_slice(), [Effect::Play(SoundCue::Incorrect)]);
        assert_eq!(s.commands_dropped(), 1);
    }

    #[test]
    fn idle_timeout_forces_sleep_from_connected() {
        let mut s = connected_session(0);
        let fx = effects(&mut s, config::IDLE_TIMEOUT_MS + 1);
        assert_eq!(s.state(), SessionState::EnteringSleep);
        assert_eq!(fx.last(), Some(&Effect::Shutdown));
    }

    #[test]
    fn idle_timeout_wins_mid_polling() {
        let mut s = polling_session(0, 1);
        // A detection is pending, but the idle override runs first.
        apply(
            &mut s,
            SessionEvent::Detection(crate::detect::DetectionEvent {
                distance_mm: 300,
                observed_at: config::IDLE_TIMEOUT_MS,
            }),
            config::IDLE_TIMEOUT_MS + 1,
        );
        let fx = effects(&mut s, config::IDLE_TIMEOUT_MS + 1);
        assert_eq!(s.state(), SessionState::EnteringSleep);
        assert!(!fx
            .iter()
            .any(|e| matches!(e, Effect::Send(OutboundMessage::Detection { .. }))));
        assert_eq!(fx.last(), Some(&Effect::Shutdown));
    }

    #[test]
    fn self_transition_preserves_entry_time_and_previous_state() {
        let mut s = polling_session(0, 1);
        let entered = s.state_entered_at();
        let previous = s.previous_state();
        let mut fx = EffectQueue::new();
        s.transition(SessionState::Polling, 9999, &mut fx);
        assert!(fx.is_empty());
        assert_eq!(s.state_entered_at(), entered);
        assert_eq!(s.previous_state(), previous);
        assert_eq!(s.state(), SessionState::Polling);
    }

    #[test]
    fn aux_payload_of_latest_command_steers_detection_cue() {
        // Start as the correct cone, then a later command demotes it.
        let mut s = polling_session(0, 1);
        apply(
            &mut s,
            SessionEvent::Command(Command::with_aux(CommandKind::KeepAlive, 0)),
            10,
        );
        effects(&mut s, 10);
        apply(
            &mut s,
            SessionEvent::Detection(crate::detect::DetectionEvent {
                distance_mm: 400,
                observed_at: 20,
            }),
            20,
        );
        let fx = effects(&mut s, 20);
        assert_eq!(fx[0], Effect::Play(SoundCue::Incorrect));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Detection Filter Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn sustained_presence_yields_exactly_one_event() {
        let mut f = DetectionFilter::new();
        let ev = f.evaluate(300, 1000).unwrap();
        assert_eq!(ev.distance_mm, 300);
        assert_eq!(ev.observed_at, 1000);
        for t in (1033..2000).step_by(33) {
            assert!(f.evaluate(310, t).is_none());
        }
        assert!(f.object_present());
    }

    #[test]
    fn presence_clears_only_past_loose_bound() {
        let mut f = DetectionFilter::new();
        f.evaluate(300, 0).unwrap();
        // Below the window: suppressed but presence held.
        assert!(f.evaluate(30, 33).is_none());
        assert!(f.object_present());
        // Past the loose bound: presence clears.
        assert!(f.evaluate(1500, 66).is_none());
        assert!(!f.object_present());
    }

    #[test]
    fn cooldown_suppresses_reentry() {
        let mut f = DetectionFilter::new();
        f.evaluate(300, 1000).unwrap();
        f.evaluate(1500, 1100); // leaves the field
        // Re-enters before the cooldown elapses.
        assert!(f.evaluate(300, 1300).is_none());
        assert!(!f.object_present());
        // After the cooldown (measured from the report at t=1000).
        let ev = f.evaluate(300, 1500).unwrap();
        assert_eq!(ev.observed_at, 1500);
    }

    #[test]
    fn invalid_sentinel_clears_presence_and_never_fires() {
        let mut f = DetectionFilter::new();
        f.evaluate(300, 0).unwrap();
        assert!(f.evaluate(config::SENSOR_INVALID_MM, 33).is_none());
        assert!(!f.object_present());
    }

    #[test]
    fn zero_reading_is_ignored_without_clearing() {
        let mut f = DetectionFilter::new();
        f.evaluate(300, 0).unwrap();
        assert!(f.evaluate(0, 33).is_none());
        assert!(f.object_present());
    }

    #[test]
    fn window_bounds_are_exclusive() {
        let mut f = DetectionFilter::new();
        assert!(f.evaluate(config::DETECT_MIN_MM, 1000).is_none());
        assert!(f.evaluate(config::DETECT_MAX_MM, 2000).is_none());
        assert!(f.evaluate(config::DETECT_MIN_MM + 1, 3000).is_some());
    }

    #[test]
    fn first_detection_needs_no_cooldown_history() {
        let mut f = DetectionFilter::new();
        assert!(f.evaluate(500, 0).is_some());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Battery Math Tests
    // ════════════════════════════════════════════════════════════════════════

    /// Raw counts that measure as `volts` at the battery rail.
    fn counts_for(volts: f32) -> i16 {
        (volts / config::BATTERY_DIVIDER / config::ADC_FULL_SCALE_VOLTS * config::ADC_RANGE) as i16
    }

    #[test]
    fn midpoint_voltage_is_fifty_percent() {
        // 3.6 V on both channels, divider 2.0, window 3.0-4.2 V.
        let c = counts_for(3.6);
        assert_eq!(percent_from_counts(c, c, CombinePolicy::Average), 50);
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(percent_from_volts(4.8), 100);
        assert_eq!(percent_from_volts(2.0), 0);
        assert_eq!(percent_from_volts(0.0), 0);
    }

    #[test]
    fn percentage_is_monotonic_in_voltage() {
        let mut last = 0;
        for decivolts in 0..=60 {
            let pct = percent_from_volts(decivolts as f32 / 10.0);
            assert!(pct >= last);
            last = pct;
        }
    }

    #[test]
    fn negative_counts_clamp_to_zero_percent() {
        assert_eq!(volts_from_counts(-100), 0.0);
        assert_eq!(percent_from_counts(-100, -100, CombinePolicy::Average), 0);
    }

    #[test]
    fn combine_policies() {
        assert_eq!(combine_volts(3.0, 4.0, CombinePolicy::Average), 3.5);
        assert_eq!(combine_volts(3.0, 4.0, CombinePolicy::MinOfTwo), 3.0);
        assert_eq!(combine_volts(4.0, 3.0, CombinePolicy::MinOfTwo), 3.0);
    }

    #[test]
    fn min_of_two_rejects_one_stuck_high_channel() {
        let good = counts_for(3.3);
        let stuck = i16::MAX;
        let pct = percent_from_counts(good, stuck, CombinePolicy::MinOfTwo);
        assert_eq!(pct, percent_from_counts(good, good, CombinePolicy::MinOfTwo));
    }

    #[test]
    fn vbus_threshold() {
        assert!(!vbus_present(config::VBUS_THRESHOLD_COUNTS));
        assert!(vbus_present(config::VBUS_THRESHOLD_COUNTS + 1));
        assert!(!vbus_present(0));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Feedback Policy Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn battery_color_bands() {
        assert_eq!(color_for_battery(0), (255, 0, 0));
        assert_eq!(color_for_battery(19), (255, 0, 0));
        assert_eq!(color_for_battery(20), (255, 128, 0));
        assert_eq!(color_for_battery(49), (255, 128, 0));
        assert_eq!(color_for_battery(50), (0, 255, 0));
        assert_eq!(color_for_battery(100), (0, 255, 0));
    }

    #[test]
    fn steady_when_not_charging() {
        for now in [0, 250, 500, 12345] {
            assert_eq!(led_output(80, false, now), Some((0, 255, 0)));
        }
    }

    #[test]
    fn charging_blinks_with_fixed_period() {
        let period = config::CHARGE_BLINK_INTERVAL_MS;
        assert!(led_output(80, true, 0).is_some());
        assert!(led_output(80, true, period - 1).is_some());
        assert!(led_output(80, true, period).is_none());
        assert!(led_output(80, true, 2 * period - 1).is_none());
        assert!(led_output(80, true, 2 * period).is_some());
    }

    #[test]
    fn tone_sequences_are_nonempty_and_shaped() {
        for cue in [
            SoundCue::Correct,
            SoundCue::Incorrect,
            SoundCue::Connected,
            SoundCue::Disconnected,
            SoundCue::Woke,
        ] {
            let seq = tone_sequence(cue);
            assert!(!seq.is_empty());
            assert!(seq.iter().all(|s| s.freq_hz > 0 && s.duration_ms > 0));
        }
        // Correct rises, incorrect falls.
        let correct = tone_sequence(SoundCue::Correct);
        assert!(correct.windows(2).all(|w| w[0].freq_hz < w[1].freq_hz));
        let incorrect = tone_sequence(SoundCue::Incorrect);
        assert!(incorrect.windows(2).all(|w| w[0].freq_hz > w[1].freq_hz));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Debouncer Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn first_press_is_accepted() {
        let mut d = Debouncer::new();
        assert!(d.try_accept(0));
    }

    #[test]
    fn press_inside_window_is_discarded() {
        let mut d = Debouncer::new();
        assert!(d.try_accept(1000));
        assert!(!d.try_accept(1000 + config::BUTTON_DEBOUNCE_MS - 1));
        // The discarded press must not extend the window.
        assert!(d.try_accept(1000 + config::BUTTON_DEBOUNCE_MS));
    }
}
