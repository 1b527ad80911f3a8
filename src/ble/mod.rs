//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertising** - the cone advertises its fixed identity until the
//!    coordinating host connects (or the session gives up and sleeps).
//! 2. **GATT server** - one custom service with an outbound event
//!    characteristic (read/notify, fixed 8-byte frames) and an inbound
//!    control characteristic (write, 1-2 byte commands).
//! 3. **Link task** - owns the advertising window and the single
//!    connection, translating both into [`LinkEvent`]s for the control
//!    loop.
//!
//! Communication with other tasks is done via Embassy channels defined
//! in the crate root. The control loop never touches the SoftDevice
//! directly; it only sends [`GatewayCommand`]s.

pub mod server;

use quizcone::protocol::{Command, OutboundMessage};

/// Events the link task publishes for the control loop. Connect and
/// disconnect are delivered once per physical event.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// A central connected and the GATT server is live.
    Connected,
    /// Connection lost or intentionally closed.
    Disconnected,
    /// A validated command write arrived.
    Command(Command),
}

/// Commands the control loop sends to the link task. Every variant is
/// an idempotent no-op when it does not apply to the current link state
/// (notify with no peer, stop while not advertising, and so on).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GatewayCommand {
    StartAdvertising,
    StopAdvertising,
    /// Best-effort notification to the connected host.
    Notify(OutboundMessage),
    /// Drop the current connection (sleep entry).
    Disconnect,
}
