//! Session/power state machine - the heart of the firmware.
//!
//! The [`Session`] reconciles four asynchronous input sources (link
//! lifecycle, inbound commands, the button, proximity detections) into
//! one deterministic control flow. It is a pure type: inputs arrive as
//! [`SessionEvent`]s, time arrives as a millisecond parameter, and side
//! effects leave as an ordered [`Effect`] list for the surrounding
//! runtime to execute. Nothing in here touches hardware, which is what
//! keeps the whole state machine host-testable - including sleep entry,
//! which ends in a distinguished [`Effect::Shutdown`] instead of halting
//! the processor itself.
//!
//! ```text
//! Init ──► Advertising ──► Connected ◄──► Polling
//!              ▲   │            │            │
//!              │   │ (timeout)  │ (Sleep)    │ (detection, one-shot)
//!              └───┴────────► EnteringSleep ◄┘
//! ```
//!
//! A global idle timeout overrides everything: it is checked before any
//! per-state dispatch on every tick, so state logic can never starve it.

use heapless::Vec;

use crate::config::{ADVERTISING_TIMEOUT_MS, IDLE_TIMEOUT_MS};
use crate::detect::DetectionEvent;
use crate::feedback::SoundCue;
use crate::protocol::{Command, CommandKind, OutboundMessage, StatusCode};

/// Top-level session state. Exactly one is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    Init,
    Advertising,
    Connected,
    Polling,
    /// Terminal: the shutdown effect sequence has been emitted.
    EnteringSleep,
}

/// One input applied to the session between ticks. Producers (BLE task,
/// sensor task, button task) only enqueue these; they never touch the
/// session directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    PeerConnected,
    PeerDisconnected,
    Command(Command),
    /// A debounced, accepted button press.
    ButtonPressed,
    Detection(DetectionEvent),
}

/// Side effect requested from the runtime, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    StartAdvertising,
    StopAdvertising,
    /// Best-effort notify; silently dropped by the gateway when no peer
    /// is attached.
    Send(OutboundMessage),
    Play(SoundCue),
    /// Gate the proximity sensor on or off.
    SensorActive(bool),
    ForceDisconnect,
    SilenceBuzzer,
    BlankLed,
    /// Terminal power-down request; the runtime performs System OFF
    /// after a settle delay. Always the last effect ever emitted.
    Shutdown,
}

/// Bounded effect list returned by one event application or tick. Sized
/// so one loop pass (drained events plus the sleep-entry sequence) can
/// never overflow it.
pub type EffectQueue = Vec<Effect, 16>;

/// At-most-one-pending command slot, last-write-wins. A newly posted
/// command replaces an unconsumed one; the replacement is counted so
/// host bursts that outrun the tick rate are observable in logs.
#[derive(Debug, Default)]
pub struct CommandMailbox {
    pending: Option<Command>,
    dropped: u32,
}

impl CommandMailbox {
    pub const fn new() -> Self {
        Self {
            pending: None,
            dropped: 0,
        }
    }

    /// Post a command; returns `true` if an unconsumed command was
    /// overwritten.
    pub fn post(&mut self, cmd: Command) -> bool {
        let replaced = self.pending.is_some();
        if replaced {
            self.dropped += 1;
        }
        self.pending = Some(cmd);
        replaced
    }

    pub fn take(&mut self) -> Option<Command> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Total commands lost to overwrite since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

pub struct Session {
    state: SessionState,
    previous_state: SessionState,
    state_entered_at: u64,
    last_activity_at: u64,
    link_up: bool,
    commands: CommandMailbox,
    /// Pending detection, consumed by the next Polling tick.
    detection: Option<DetectionEvent>,
    /// Aux payload of the most recent command that carried one; 1 means
    /// this cone is the correct target of the current round.
    correct_flag: u8,
    /// Latest battery sample, echoed in KeepAlive replies.
    battery_percent: u8,
    /// Selects Connected vs Reconnected status on link-up.
    was_connected: bool,
}

impl Session {
    pub fn new(now_ms: u64) -> Self {
        Self {
            state: SessionState::Init,
            previous_state: SessionState::Init,
            state_entered_at: now_ms,
            last_activity_at: now_ms,
            link_up: false,
            commands: CommandMailbox::new(),
            detection: None,
            correct_flag: crate::protocol::AUX_NONE,
            battery_percent: 0,
            was_connected: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn previous_state(&self) -> SessionState {
        self.previous_state
    }

    pub fn state_entered_at(&self) -> u64 {
        self.state_entered_at
    }

    pub fn last_activity_at(&self) -> u64 {
        self.last_activity_at
    }

    pub fn commands_dropped(&self) -> u32 {
        self.commands.dropped()
    }

    /// Latest battery percentage, refreshed by the runtime each tick.
    pub fn set_battery_percent(&mut self, percent: u8) {
        self.battery_percent = percent;
    }

    /// Apply one input event. Events update fields and the mailbox and
    /// emit state-independent feedback; state transitions themselves
    /// happen in [`tick`](Self::tick) so the idle-timeout ordering
    /// guarantee holds.
    pub fn handle_event(&mut self, event: SessionEvent, now_ms: u64, fx: &mut EffectQueue) {
        match event {
            SessionEvent::PeerConnected => {
                self.link_up = true;
                self.last_activity_at = now_ms;
                push(fx, Effect::Play(SoundCue::Connected));
            }
            SessionEvent::PeerDisconnected => {
                self.link_up = false;
                if self.state != SessionState::EnteringSleep {
                    push(fx, Effect::Play(SoundCue::Disconnected));
                }
            }
            SessionEvent::Command(cmd) => {
                self.commands.post(cmd);
            }
            SessionEvent::ButtonPressed => {
                self.last_activity_at = now_ms;
            }
            SessionEvent::Detection(ev) => {
                // Detections are only meaningful while Polling; anything
                // else is a race with a state change and is dropped.
                if self.state == SessionState::Polling {
                    self.detection = Some(ev);
                }
            }
        }
    }

    /// Run one control-loop tick: global idle-timeout check first, then
    /// per-state dispatch.
    pub fn tick(&mut self, now_ms: u64, fx: &mut EffectQueue) {
        if self.state == SessionState::EnteringSleep {
            return;
        }

        if now_ms.saturating_sub(self.last_activity_at) > IDLE_TIMEOUT_MS {
            self.transition(SessionState::EnteringSleep, now_ms, fx);
            return;
        }

        match self.state {
            SessionState::Init => {
                self.transition(SessionState::Advertising, now_ms, fx);
            }
            SessionState::Advertising => self.tick_advertising(now_ms, fx),
            SessionState::Connected => self.tick_connected(now_ms, fx),
            SessionState::Polling => self.tick_polling(now_ms, fx),
            SessionState::EnteringSleep => {}
        }
    }

    fn tick_advertising(&mut self, now_ms: u64, fx: &mut EffectQueue) {
        if now_ms.saturating_sub(self.state_entered_at) > ADVERTISING_TIMEOUT_MS {
            self.transition(SessionState::EnteringSleep, now_ms, fx);
            return;
        }

        if self.link_up {
            let code = if self.was_connected {
                StatusCode::Reconnected
            } else {
                StatusCode::Connected
            };
            self.was_connected = true;
            self.transition(SessionState::Connected, now_ms, fx);
            push(fx, Effect::Send(OutboundMessage::Status(code)));
        }
    }

    fn tick_connected(&mut self, now_ms: u64, fx: &mut EffectQueue) {
        if !self.link_up {
            self.transition(SessionState::Advertising, now_ms, fx);
            return;
        }

        if let Some(cmd) = self.commands.take() {
            self.last_activity_at = now_ms;
            if cmd.has_aux() {
                self.correct_flag = cmd.aux;
            }

            match cmd.kind {
                CommandKind::Start => {
                    self.transition(SessionState::Polling, now_ms, fx);
                }
                CommandKind::Stop => {}
                CommandKind::Sleep => {
                    self.transition(SessionState::EnteringSleep, now_ms, fx);
                }
                CommandKind::KeepAlive => {
                    push(
                        fx,
                        Effect::Send(OutboundMessage::Battery {
                            percent: self.battery_percent,
                        }),
                    );
                }
                CommandKind::SoundCorrect => push(fx, Effect::Play(SoundCue::Correct)),
                CommandKind::SoundIncorrect => push(fx, Effect::Play(SoundCue::Incorrect)),
            }
        }
    }

    fn tick_polling(&mut self, now_ms: u64, fx: &mut EffectQueue) {
        if !self.link_up {
            // Pending work is tied to the lost session; presence
            // hysteresis in the sensor task deliberately survives.
            self.commands.clear();
            self.detection = None;
            self.transition(SessionState::Advertising, now_ms, fx);
            return;
        }

        if let Some(cmd) = self.commands.take() {
            self.last_activity_at = now_ms;
            if cmd.has_aux() {
                self.correct_flag = cmd.aux;
            }

            match cmd.kind {
                CommandKind::Stop => {
                    self.transition(SessionState::Connected, now_ms, fx);
                    return;
                }
                CommandKind::Sleep => {
                    self.transition(SessionState::EnteringSleep, now_ms, fx);
                    return;
                }
                CommandKind::KeepAlive => {
                    push(
                        fx,
                        Effect::Send(OutboundMessage::Battery {
                            percent: self.battery_percent,
                        }),
                    );
                }
                CommandKind::SoundCorrect => push(fx, Effect::Play(SoundCue::Correct)),
                CommandKind::SoundIncorrect => push(fx, Effect::Play(SoundCue::Incorrect)),
                // Polling is already running; the aux update above is
                // all a repeated Start means here.
                CommandKind::Start => {}
            }
        }

        if let Some(ev) = self.detection.take() {
            let cue = if self.correct_flag == 1 {
                SoundCue::Correct
            } else {
                SoundCue::Incorrect
            };
            push(fx, Effect::Play(cue));
            push(
                fx,
                Effect::Send(OutboundMessage::Detection {
                    distance_mm: ev.distance_mm,
                }),
            );
            self.last_activity_at = now_ms;

            // One-shot: a single detection ends polling.
            self.transition(SessionState::Connected, now_ms, fx);
        }
    }

    /// Record a transition and emit its entry effects. A self-transition
    /// is a no-op: it neither resets `state_entered_at` nor clears
    /// `previous_state`.
    pub(crate) fn transition(&mut self, next: SessionState, now_ms: u64, fx: &mut EffectQueue) {
        if self.state == next {
            return;
        }

        let leaving_polling = self.state == SessionState::Polling;
        self.previous_state = self.state;
        self.state = next;
        self.state_entered_at = now_ms;

        if leaving_polling {
            self.detection = None;
            if next != SessionState::EnteringSleep {
                push(fx, Effect::SensorActive(false));
            }
        }

        match next {
            SessionState::Advertising => push(fx, Effect::StartAdvertising),
            SessionState::Polling => push(fx, Effect::SensorActive(true)),
            SessionState::EnteringSleep => self.emit_shutdown_sequence(fx),
            SessionState::Init | SessionState::Connected => {}
        }
    }

    /// Quiesce order is an invariant (not best-effort): status message
    /// while the link is still up, then radio, then the local
    /// peripherals, then the terminal power-down request.
    fn emit_shutdown_sequence(&mut self, fx: &mut EffectQueue) {
        if self.link_up {
            push(fx, Effect::Send(OutboundMessage::Status(StatusCode::Sleeping)));
        }
        push(fx, Effect::StopAdvertising);
        if self.link_up {
            push(fx, Effect::ForceDisconnect);
        }
        push(fx, Effect::SilenceBuzzer);
        push(fx, Effect::BlankLed);
        push(fx, Effect::SensorActive(false));
        push(fx, Effect::Shutdown);
    }
}

/// The queue is sized for the longest sequence the machine can emit; an
/// overflow would mean that sizing assumption was broken in a refactor.
fn push(fx: &mut EffectQueue, effect: Effect) {
    let overflow = fx.push(effect).is_err();
    debug_assert!(!overflow);
}
