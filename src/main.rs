//! Embedded entry point: nRF52840 + SoftDevice S140 as a BLE HID
//! keyboard.
//!
//! Wires the report engine to the GATT server and maps the four
//! nRF52840-DK buttons to demo key commands (a text macro and three
//! media keys). Real applications replace the button tasks with their
//! own input source feeding [`HidCommand`]s into the channel.

#![no_std]
#![no_main]

use core::mem;

use defmt::{info, unwrap};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Input, Pin, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_time::{Duration, Timer};
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

use blekbd::ble::server::{self, BleTransport, Server};
use blekbd::ble::{HidCommand, HidCommandChannel};
use blekbd::config::{BUTTON_DEBOUNCE_MS, DEFAULT_DEVICE_NAME};
use blekbd::engine::{DeviceInfo, HidEngine};
use blekbd::keycodes::{KEY_MEDIA_PLAY_PAUSE, KEY_MEDIA_VOLUME_DOWN, KEY_MEDIA_VOLUME_UP};

static COMMANDS: HidCommandChannel = HidCommandChannel::new();
static SERVER: StaticCell<Server> = StaticCell::new();
static ENGINE: StaticCell<HidEngine<BleTransport>> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Debounced active-low button: sends its command on every press.
#[embassy_executor::task(pool_size = 4)]
async fn button_task(pin: AnyPin, command: HidCommand) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            COMMANDS.send(command.clone()).await;

            // Wait for release to avoid repeat triggers.
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}

fn text_command(s: &str) -> HidCommand {
    let mut text = heapless::String::new();
    let _ = text.push_str(s);
    HidCommand::Type(text)
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_cfg_conn_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 256 }),
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
            p_value: DEFAULT_DEVICE_NAME.as_ptr() as _,
            current_len: DEFAULT_DEVICE_NAME.len() as u16,
            max_len: DEFAULT_DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("blekbd starting");

    // The SoftDevice reserves the highest interrupt priorities; keep
    // Embassy's interrupts below them.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    let sd = Softdevice::enable(&softdevice_config());

    let identity = DeviceInfo::default();
    let server = SERVER.init(unwrap!(server::init(sd, &identity)));

    unwrap!(spawner.spawn(softdevice_task(sd)));

    // nRF52840-DK buttons 1-4.
    unwrap!(spawner.spawn(button_task(
        p.P0_11.degrade(),
        text_command("Hello from blekbd\n"),
    )));
    unwrap!(spawner.spawn(button_task(
        p.P0_12.degrade(),
        HidCommand::TapMedia(KEY_MEDIA_VOLUME_DOWN),
    )));
    unwrap!(spawner.spawn(button_task(
        p.P0_24.degrade(),
        HidCommand::TapMedia(KEY_MEDIA_VOLUME_UP),
    )));
    unwrap!(spawner.spawn(button_task(
        p.P0_25.degrade(),
        HidCommand::TapMedia(KEY_MEDIA_PLAY_PAUSE),
    )));

    let engine = ENGINE.init(HidEngine::new(BleTransport::new(server)));

    server::run(sd, server, engine, COMMANDS.receiver()).await
}
