//! GATT server and link lifecycle.
//!
//! The cone exposes a single custom service:
//!
//! ```text
//! beb5483e-36e1-4688-b7f5-ea07361b26a7  cone service
//! ├── …26a8  events   [Read, Notify]  8-byte outbound frames
//! └── …26a9  control  [Write]         1-2 byte commands
//! ```
//!
//! Pairing is just-works bonding (no IO capabilities); bond keys are
//! held in RAM only - the cone keeps no state across power cycles, so a
//! host re-pairs after deep sleep.

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList,
};
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::ble::peripheral;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

use quizcone::config;
use quizcone::error::Error;
use quizcone::protocol::{Command, OutboundMessage};

use crate::ble::{GatewayCommand, LinkEvent};

/// Cone service UUID in little-endian byte order, for the scan response.
const SERVICE_UUID_LE: [u8; 16] = [
    0xa7, 0x26, 0x1b, 0x36, 0x07, 0xea, 0xf5, 0xb7, 0x88, 0x46, 0xe1, 0x36, 0x3e, 0x48, 0xb5, 0xbe,
];

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .full_name(config::DEVICE_NAME)
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_128(ServiceList::Complete, &[SERVICE_UUID_LE])
    .build();

#[nrf_softdevice::gatt_service(uuid = "beb5483e-36e1-4688-b7f5-ea07361b26a7")]
pub struct ConeService {
    /// Outbound 8-byte event frames (status, detection, battery).
    #[characteristic(uuid = "beb5483e-36e1-4688-b7f5-ea07361b26a8", read, notify)]
    events: [u8; 8],

    /// Inbound command writes from the host.
    #[characteristic(uuid = "beb5483e-36e1-4688-b7f5-ea07361b26a9", write)]
    control: heapless::Vec<u8, 2>,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub cone: ConeService,
}

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

/// Single-peer bond storage, RAM only.
struct Bonder {
    peer: RefCell<Option<PeerBond>>,
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        info!("BLE peer bonded");
        *self.peer.borrow_mut() = Some(PeerBond {
            master_id,
            key,
            peer_id,
        });
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peer
            .borrow()
            .as_ref()
            .and_then(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn get_peripheral_key(&self, conn: &Connection) -> Option<(MasterId, EncryptionInfo)> {
        self.peer.borrow().as_ref().and_then(|p| {
            p.peer_id
                .is_match(conn.peer_address())
                .then_some((p.master_id, p.key))
        })
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

fn bonder() -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder {
        peer: RefCell::new(None),
    })
}

type Commands = Receiver<'static, CriticalSectionRawMutex, GatewayCommand, 4>;

/// Own the advertising window and the (single) connection for the whole
/// process lifetime.
#[embassy_executor::task]
pub async fn link_task(sd: &'static Softdevice, server: Server) -> ! {
    let cmds = crate::GATEWAY_CMDS.receiver();
    let bonder = bonder();

    loop {
        match cmds.receive().await {
            GatewayCommand::StartAdvertising => {}
            // No peer and not advertising: notifies drop silently,
            // stop/disconnect are already satisfied.
            _ => continue,
        }

        let adv_config = peripheral::Config {
            interval: config::BLE_ADV_INTERVAL,
            ..Default::default()
        };
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };

        info!("advertising as {}", config::DEVICE_NAME);
        let advertise = peripheral::advertise_pairable(sd, adv, &adv_config, bonder);
        let conn = match select(advertise, wait_for_abort(&cmds)).await {
            Either::First(Ok(conn)) => conn,
            Either::First(Err(e)) => {
                warn!("advertise failed: {:?}", e);
                continue;
            }
            // The session stopped advertising (sleep entry).
            Either::Second(()) => continue,
        };

        info!("peer connected");
        crate::LINK_EVENTS.send(LinkEvent::Connected).await;

        serve(&server, &conn, &cmds).await;

        info!("peer disconnected");
        crate::LINK_EVENTS.send(LinkEvent::Disconnected).await;
    }
}

/// Run the GATT server until the link drops, draining outbound gateway
/// commands concurrently.
async fn serve(server: &Server, conn: &Connection, cmds: &Commands) {
    let gatt = gatt_server::run(conn, server, |e| match e {
        ServerEvent::Cone(ConeServiceEvent::ControlWrite(data)) => {
            match Command::parse(&data) {
                Some(cmd) => {
                    if crate::LINK_EVENTS
                        .try_send(LinkEvent::Command(cmd))
                        .is_err()
                    {
                        warn!("link event queue full, command dropped");
                    }
                }
                // Unrecognized codes are ignored at this boundary.
                None => warn!("unrecognized command write"),
            }
        }
        ServerEvent::Cone(ConeServiceEvent::EventsCccdWrite { notifications }) => {
            info!("event notifications enabled: {}", notifications);
        }
    });

    let outbound = async {
        loop {
            match cmds.receive().await {
                GatewayCommand::Notify(msg) => {
                    if let Err(e) = notify_frame(server, conn, &msg) {
                        // Best-effort by contract; the frame stays
                        // readable either way.
                        warn!("notify dropped: {:?}", e);
                    }
                }
                GatewayCommand::Disconnect => {
                    let _ = conn.disconnect();
                }
                // Idempotent while a link is up.
                GatewayCommand::StartAdvertising | GatewayCommand::StopAdvertising => {}
            }
        }
    };

    // `outbound` never completes; `run` returns on disconnect.
    let _ = select(gatt, outbound).await;
}

/// Push one frame to the peer, keeping the characteristic value current
/// so a host that polls instead of subscribing still sees it.
fn notify_frame(server: &Server, conn: &Connection, msg: &OutboundMessage) -> Result<(), Error> {
    let frame = msg.encode(config::DEVICE_ID);
    let _ = server.cone.events_set(&frame);
    server
        .cone
        .events_notify(conn, &frame)
        .map_err(|_| Error::Notify)
}

/// Consume gateway commands during an advertising window; returns when
/// the window must be aborted.
async fn wait_for_abort(cmds: &Commands) {
    loop {
        match cmds.receive().await {
            GatewayCommand::StopAdvertising | GatewayCommand::Disconnect => return,
            // Already advertising / no peer to notify.
            GatewayCommand::StartAdvertising | GatewayCommand::Notify(_) => {}
        }
    }
}
