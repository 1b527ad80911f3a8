//! Wire protocol between a cone and the coordinating host.
//!
//! Outbound frames are a fixed 8 bytes, little-endian multi-byte fields:
//! ```text
//! Byte 0:    message type (1=Status, 2=Detection, 3=Battery)
//! Byte 1:    device identity
//! Byte 2:    guard byte (0x42, framing sanity)
//! Byte 3:    reserved (0x00)
//! Byte 4..7: payload
//!            Status:    event code (1 byte)
//!            Detection: distance in mm (2 bytes, LE)
//!            Battery:   percentage (1 byte)
//! ```
//!
//! Inbound commands are 1-2 bytes: a command code plus an optional
//! auxiliary payload byte. Unknown codes are rejected at this boundary
//! and never reach the session core.

/// Outbound frame size in bytes.
pub const FRAME_SIZE: usize = 8;

/// Framing sanity marker at byte 2 of every outbound frame.
pub const GUARD_BYTE: u8 = 0x42;

/// Sentinel for "no auxiliary payload byte was sent".
pub const AUX_NONE: u8 = 0xFF;

/// Status event codes carried by [`OutboundMessage::Status`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    /// First link of this power cycle established.
    Connected = 0x01,
    /// A later link of this power cycle established.
    Reconnected = 0x02,
    /// Final message before deep sleep.
    Sleeping = 0x03,
}

/// Message sent to the connected host. Never queued; if no peer is
/// attached the send is a silent no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutboundMessage {
    Status(StatusCode),
    Detection { distance_mm: u16 },
    Battery { percent: u8 },
}

impl OutboundMessage {
    /// Encode into the fixed 8-byte frame.
    pub fn encode(&self, device_id: u8) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];
        frame[1] = device_id;
        frame[2] = GUARD_BYTE;

        match *self {
            OutboundMessage::Status(code) => {
                frame[0] = 0x01;
                frame[4] = code as u8;
            }
            OutboundMessage::Detection { distance_mm } => {
                frame[0] = 0x02;
                frame[4..6].copy_from_slice(&distance_mm.to_le_bytes());
            }
            OutboundMessage::Battery { percent } => {
                frame[0] = 0x03;
                frame[4] = percent;
            }
        }

        frame
    }
}

/// Command codes accepted on the control characteristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Begin proximity polling.
    Start = 0x01,
    /// End proximity polling, stay connected.
    Stop = 0x02,
    /// Shut down into deep sleep.
    Sleep = 0x03,
    /// Liveness probe; answered with a battery frame.
    KeepAlive = 0x05,
    /// Play the "correct" tone sequence.
    SoundCorrect = 0x10,
    /// Play the "incorrect" tone sequence.
    SoundIncorrect = 0x11,
}

/// One inbound unit of work: a validated command code plus its optional
/// auxiliary byte ([`AUX_NONE`] when the write was a single byte).
///
/// For `Start` the auxiliary byte tells the cone whether it is the
/// correct target of the current round (1) or a decoy (0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub kind: CommandKind,
    pub aux: u8,
}

impl Command {
    pub const fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            aux: AUX_NONE,
        }
    }

    pub const fn with_aux(kind: CommandKind, aux: u8) -> Self {
        Self { kind, aux }
    }

    /// Parse a raw characteristic write. Returns `None` for empty writes
    /// and unrecognized command codes; extra trailing bytes are ignored.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let kind = match *data.first()? {
            0x01 => CommandKind::Start,
            0x02 => CommandKind::Stop,
            0x03 => CommandKind::Sleep,
            0x05 => CommandKind::KeepAlive,
            0x10 => CommandKind::SoundCorrect,
            0x11 => CommandKind::SoundIncorrect,
            _ => return None,
        };

        Some(Self {
            kind,
            aux: data.get(1).copied().unwrap_or(AUX_NONE),
        })
    }

    /// Whether the write carried an auxiliary payload byte.
    pub fn has_aux(&self) -> bool {
        self.aux != AUX_NONE
    }
}
