//! Cone firmware entry point.
//!
//! Initializes the hardware and the SoftDevice, spawns the peripheral
//! tasks, and runs the control loop that owns the session state machine.
//!
//! Task layout:
//! - `link_task`      - BLE advertising + connection + GATT server
//! - `sensor_task`    - gated ToF polling, feeds detections
//! - `battery_task`   - SAADC sampling, publishes battery readings
//! - `led_task`       - battery indicator
//! - `button_task`    - raw press edges
//! - control loop     - drains events, ticks the session, executes effects
//!
//! Everything the collaborator contexts produce arrives through bounded
//! channels; the session struct itself is owned here and never shared.

#![no_std]
#![no_main]

mod battery;
mod ble;
mod button;
mod buzzer;
mod led;
mod power;
mod sensor;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin;
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::{bind_interrupts, peripherals, saadc, twim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_sync::watch::{Sender as WatchSender, Watch};
use embassy_time::{Instant, Timer};
use nrf_softdevice::{raw, Softdevice};
use {defmt_rtt as _, panic_probe as _};

use quizcone::battery_logic::BatteryReading;
use quizcone::config;
use quizcone::debounce::Debouncer;
use quizcone::detect::DetectionEvent;
use quizcone::feedback::SoundCue;
use quizcone::session::{Effect, EffectQueue, Session, SessionEvent};

use crate::ble::{GatewayCommand, LinkEvent};
use crate::buzzer::Buzzer;
use crate::power::WakeCause;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

// Per-source bounded queues: producers (SoftDevice callbacks, sensor,
// button) only enqueue; the control loop is the single consumer.

/// BLE link lifecycle and validated inbound commands.
pub static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, 8> = Channel::new();

/// Control loop → link task.
pub static GATEWAY_CMDS: Channel<CriticalSectionRawMutex, GatewayCommand, 4> = Channel::new();

/// Fired detection events.
pub static DETECTIONS: Channel<CriticalSectionRawMutex, DetectionEvent, 2> = Channel::new();

/// Raw button press instants (ms); debounced by the control loop.
pub static BUTTON_PRESSES: Channel<CriticalSectionRawMutex, u64, 2> = Channel::new();

/// Latest battery reading (LED task + control loop).
pub static BATTERY: Watch<CriticalSectionRawMutex, BatteryReading, 2> = Watch::new();

/// Sensor sampling gate, driven by the session.
pub static SENSOR_GATE: Watch<CriticalSectionRawMutex, bool, 1> = Watch::new();

/// One-way LED blanking for sleep entry.
pub static LED_OFF: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Milliseconds since boot, the timebase every module shares.
pub fn now_ms() -> u64 {
    Instant::now().as_millis()
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::DEVICE_NAME.as_ptr() as _,
            current_len: config::DEVICE_NAME.len() as u16,
            max_len: config::DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // The SoftDevice reserves interrupt priorities 0, 1 and 4; move
    // everything the app uses below them.
    let mut hw_config = embassy_nrf::config::Config::default();
    hw_config.gpiote_interrupt_priority = Priority::P2;
    hw_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(hw_config);

    interrupt::SAADC.set_priority(Priority::P3);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(Priority::P3);

    info!("{} booting", config::DEVICE_NAME);

    let wake = power::wake_cause();
    power::clear_wake_cause();

    // Battery pair + VBUS sense on one SAADC.
    let saadc_config = saadc::Config::default();
    let battery_a = saadc::ChannelConfig::single_ended(p.P0_02);
    let battery_b = saadc::ChannelConfig::single_ended(p.P0_03);
    let vbus = saadc::ChannelConfig::single_ended(p.P0_04);
    let adc = saadc::Saadc::new(p.SAADC, Irqs, saadc_config, [battery_a, battery_b, vbus]);

    // ToF sensor bus.
    let twi = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());

    // Feedback outputs.
    let rgb = SimplePwm::new_3ch(p.PWM1, p.P0_13, p.P0_14, p.P0_15);
    let buzzer = Buzzer::new(SimplePwm::new_1ch(p.PWM0, p.P0_08));

    let sd = Softdevice::enable(&softdevice_config());
    let server = unwrap!(ble::server::Server::new(sd));
    unwrap!(spawner.spawn(softdevice_task(sd)));

    unwrap!(spawner.spawn(ble::server::link_task(sd, server)));
    unwrap!(spawner.spawn(sensor::sensor_task(twi)));
    unwrap!(spawner.spawn(battery::battery_task(adc)));
    unwrap!(spawner.spawn(led::led_task(rgb)));
    unwrap!(spawner.spawn(button::button_task(p.P0_11.degrade())));

    control_loop(buzzer, wake).await
}

/// The cooperative control loop: drain the per-source queues, tick the
/// session, execute the effects it asks for, sleep one tick.
async fn control_loop(mut buzzer: Buzzer, wake: WakeCause) -> ! {
    if wake == WakeCause::ButtonWake {
        buzzer.play(SoundCue::Woke).await;
    }

    let mut session = Session::new(now_ms());
    let mut debouncer = Debouncer::new();
    let mut battery = BATTERY.receiver().unwrap();
    let sensor_gate = SENSOR_GATE.sender();
    let mut drops_reported = 0u32;

    loop {
        let now = now_ms();
        let mut fx = EffectQueue::new();

        while let Ok(event) = LINK_EVENTS.try_receive() {
            let event = match event {
                LinkEvent::Connected => SessionEvent::PeerConnected,
                LinkEvent::Disconnected => SessionEvent::PeerDisconnected,
                LinkEvent::Command(cmd) => SessionEvent::Command(cmd),
            };
            session.handle_event(event, now, &mut fx);
        }

        while let Ok(pressed_at) = BUTTON_PRESSES.try_receive() {
            if debouncer.try_accept(pressed_at) {
                session.handle_event(SessionEvent::ButtonPressed, now, &mut fx);
            }
        }

        while let Ok(detection) = DETECTIONS.try_receive() {
            session.handle_event(SessionEvent::Detection(detection), now, &mut fx);
        }

        if let Some(reading) = battery.try_changed() {
            session.set_battery_percent(reading.percent);
        }

        let dropped = session.commands_dropped();
        if dropped > drops_reported {
            warn!("{} command(s) lost to mailbox overwrite", dropped - drops_reported);
            drops_reported = dropped;
        }

        session.tick(now, &mut fx);

        for effect in &fx {
            execute(*effect, &mut buzzer, &sensor_gate).await;
        }

        Timer::after_millis(config::TICK_INTERVAL_MS).await;
    }
}

async fn execute(
    effect: Effect,
    buzzer: &mut Buzzer,
    sensor_gate: &WatchSender<'static, CriticalSectionRawMutex, bool, 1>,
) {
    match effect {
        Effect::StartAdvertising => GATEWAY_CMDS.send(GatewayCommand::StartAdvertising).await,
        Effect::StopAdvertising => GATEWAY_CMDS.send(GatewayCommand::StopAdvertising).await,
        Effect::Send(msg) => GATEWAY_CMDS.send(GatewayCommand::Notify(msg)).await,
        Effect::Play(cue) => buzzer.play(cue).await,
        Effect::SensorActive(on) => sensor_gate.send(on),
        Effect::ForceDisconnect => GATEWAY_CMDS.send(GatewayCommand::Disconnect).await,
        Effect::SilenceBuzzer => buzzer.mute(),
        Effect::BlankLed => LED_OFF.signal(()),
        Effect::Shutdown => {
            // Give the link and peripheral tasks one settle window to
            // act on the quiesce commands above.
            Timer::after_millis(config::SLEEP_SETTLE_MS).await;
            power::enter_deep_sleep();
        }
    }
}
