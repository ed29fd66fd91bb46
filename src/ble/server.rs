//! HID-over-GATT server - advertising, GATT services, and the session
//! loop that connects the SoftDevice to the report engine.
//!
//! The `#[nrf_softdevice::gatt_service]` macro generates registration
//! and read/write/notify helpers for the listed characteristics. Three
//! services are exposed:
//!
//! - HID (0x1812): report map, protocol mode, HID information, control
//!   point, keyboard input report, keyboard output report (host LEDs),
//!   media input report.
//! - Battery (0x180F): battery level.
//! - Device Information (0x180A): manufacturer name and PnP ID.

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_time::{block_for, Duration, Timer};
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::Softdevice;

use crate::ble::HidCommand;
use crate::config::{APPEARANCE_HID_KEYBOARD, BLE_ADV_INTERVAL, HID_COMMAND_CHANNEL_DEPTH};
use crate::engine::{DeviceInfo, HidEngine, Transport};
use crate::error::Error;
use crate::hid::consumer::MEDIA_REPORT_SIZE;
use crate::hid::keyboard::KEYBOARD_REPORT_SIZE;
use crate::hid::{REPORT_DESCRIPTOR, REPORT_MAP_LEN};

/// HID information characteristic value: bcdHID 1.11, no country code,
/// normally connectable.
const HID_INFORMATION: [u8; 4] = [0x11, 0x01, 0x00, 0x01];

/// Host LED writes are funneled out of the GATT event closure through
/// this channel so the session loop can hand them to the engine.
static LED_EVENTS: Channel<CriticalSectionRawMutex, u8, 4> = Channel::new();

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    battery_level: u8,
}

#[nrf_softdevice::gatt_service(uuid = "180a")]
pub struct DeviceInformationService {
    /// Manufacturer name, NUL-padded to the transport string ceiling.
    #[characteristic(uuid = "2a29", read)]
    manufacturer_name: [u8; 15],

    /// PnP ID: vendor ID source (0x02 = USB-IF) + VID + PID + version.
    #[characteristic(uuid = "2a50", read)]
    pnp_id: [u8; 7],
}

// TODO: attach Report Reference descriptors (report ID + type) to the
// three report characteristics once raw descriptor registration is
// wired up; macOS distinguishes the keyboard and media reports by them.
#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    /// Protocol Mode - 0 = Boot Protocol, 1 = Report Protocol.
    #[characteristic(uuid = "2a4e", read, write_without_response)]
    protocol_mode: u8,

    /// HID Report Map - the report descriptor.
    #[characteristic(uuid = "2a4b", read)]
    report_map: [u8; REPORT_MAP_LEN],

    /// HID Information (bcdHID, country code, flags).
    #[characteristic(uuid = "2a4a", read)]
    hid_information: [u8; 4],

    /// HID Control Point (suspend / exit suspend).
    #[characteristic(uuid = "2a4c", write_without_response)]
    hid_control_point: u8,

    /// Keyboard input report (report ID 1) - notifications carry keystrokes.
    #[characteristic(uuid = "2a4d", read, notify)]
    keyboard_report: [u8; KEYBOARD_REPORT_SIZE],

    /// Keyboard output report (report ID 1) - host writes LED state here.
    #[characteristic(uuid = "2a4d", read, write, write_without_response)]
    keyboard_output: u8,

    /// Media input report (report ID 2) - notifications carry the media mask.
    #[characteristic(uuid = "2a4d", read, notify)]
    media_report: [u8; MEDIA_REPORT_SIZE],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bas: BatteryService,
    pub dis: DeviceInformationService,
    pub hid: HidService,
}

/// Register the GATT services and seed the static characteristic values
/// from the engine's identity.
pub fn init(sd: &mut Softdevice, info: &DeviceInfo) -> Result<Server, Error> {
    let server = Server::new(sd).map_err(|_| Error::GattRegister)?;

    let _ = server.hid.report_map_set(&REPORT_DESCRIPTOR);
    let _ = server.hid.hid_information_set(&HID_INFORMATION);
    let _ = server.hid.protocol_mode_set(&1u8); // report protocol

    let _ = server.bas.battery_level_set(&info.battery_level);

    let mut manufacturer = [0u8; 15];
    let bytes = info.manufacturer.as_bytes();
    manufacturer[..bytes.len()].copy_from_slice(bytes);
    let _ = server.dis.manufacturer_name_set(&manufacturer);
    let _ = server.dis.pnp_id_set(&pnp_id(info));

    Ok(server)
}

/// PnP ID characteristic value from the configured identity.
fn pnp_id(info: &DeviceInfo) -> [u8; 7] {
    let vid = info.vendor_id.to_le_bytes();
    let pid = info.product_id.to_le_bytes();
    let ver = info.version.to_le_bytes();
    [0x02, vid[0], vid[1], pid[0], pid[1], ver[0], ver[1]]
}

/// Report delivery over the active GATT connection.
///
/// Holds the connection handle for the current session; while no peer is
/// bound, notifications are dropped on the floor (the engine already
/// gates on its own connection flag, this is belt and braces for the
/// teardown window).
pub struct BleTransport {
    server: &'static Server,
    conn: Option<Connection>,
}

impl BleTransport {
    pub fn new(server: &'static Server) -> Self {
        Self { server, conn: None }
    }

    fn bind(&mut self, conn: Connection) {
        self.conn = Some(conn);
    }

    fn unbind(&mut self) {
        self.conn = None;
    }
}

impl Transport for BleTransport {
    fn notify_keyboard(&mut self, payload: &[u8]) {
        let Some(conn) = &self.conn else { return };
        let mut value = [0u8; KEYBOARD_REPORT_SIZE];
        value.copy_from_slice(payload);
        if self.server.hid.keyboard_report_notify(conn, &value).is_err() {
            // Peer gone or queue full - defined as a silent drop.
            warn!("keyboard report notify failed");
        }
    }

    fn notify_media(&mut self, payload: &[u8]) {
        let Some(conn) = &self.conn else { return };
        let mut value = [0u8; MEDIA_REPORT_SIZE];
        value.copy_from_slice(payload);
        if self.server.hid.media_report_notify(conn, &value).is_err() {
            warn!("media report notify failed");
        }
    }

    fn pace(&mut self, ms: u32) {
        // Blocking by contract: the engine is synchronous and must not
        // emit faster than one report per interval.
        block_for(Duration::from_millis(ms as u64));
    }

    fn set_battery_level(&mut self, percent: u8) {
        match &self.conn {
            Some(conn) => {
                let _ = self.server.bas.battery_level_notify(conn, &percent);
            }
            None => {
                let _ = self.server.bas.battery_level_set(&percent);
            }
        }
    }

    fn restart_advertising(&mut self) {
        // The session loop falls back into advertising as soon as the
        // GATT future resolves; dropping the handle is all that's left.
        self.conn = None;
    }
}

/// Advertise, serve one connection, repeat. Never returns.
///
/// Key commands are consumed in both phases so engine state stays
/// consistent while disconnected (mutations apply, transmission is
/// gated); callers that care about a clean held-key image should send
/// [`HidCommand::ReleaseAll`] around reconnects.
pub async fn run(
    sd: &'static Softdevice,
    server: &'static Server,
    engine: &mut HidEngine<BleTransport>,
    commands: Receiver<'static, CriticalSectionRawMutex, HidCommand, HID_COMMAND_CHANNEL_DEPTH>,
) -> ! {
    loop {
        let mut adv_data = [0u8; 31];
        let adv_len = build_adv_data(engine.device_info().name.as_str(), &mut adv_data);

        let config = peripheral::Config {
            interval: BLE_ADV_INTERVAL,
            ..Default::default()
        };
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data[..adv_len],
            scan_data: &[],
        };

        info!(
            "advertising as {} ({} bytes of AD)",
            engine.device_info().name.as_str(),
            adv_len
        );

        let advertise_fut = peripheral::advertise_connectable(sd, adv, &config);
        let idle_fut = async {
            // Apply commands while no peer is connected; the engine
            // mutates state and skips transmission on its own.
            loop {
                let cmd = commands.receive().await;
                handle_command(engine, cmd);
            }
        };

        let conn = match select(advertise_fut, idle_fut).await {
            Either::First(Ok(conn)) => conn,
            Either::First(Err(_)) => {
                warn!("advertising failed, retrying");
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
            Either::Second(()) => unreachable!(),
        };

        engine.transport_mut().bind(conn.clone());
        engine.on_connect();
        info!("peer connected");

        let gatt_fut = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Hid(HidServiceEvent::KeyboardOutputWrite(leds)) => {
                // Can't touch the engine from here - hand the LED state
                // to the session loop.
                let _ = LED_EVENTS.try_send(leds);
            }
            ServerEvent::Hid(HidServiceEvent::ProtocolModeWrite(mode)) => {
                info!("host set protocol mode {}", mode);
            }
            ServerEvent::Hid(HidServiceEvent::HidControlPointWrite(cmd)) => {
                info!("HID control point write {}", cmd);
            }
            ServerEvent::Hid(HidServiceEvent::KeyboardReportCccdWrite { notifications }) => {
                info!("keyboard report notifications: {}", notifications);
            }
            ServerEvent::Hid(HidServiceEvent::MediaReportCccdWrite { notifications }) => {
                info!("media report notifications: {}", notifications);
            }
            // Battery CCCD writes and the (event-less) device
            // information service.
            _ => {}
        });

        let session_fut = async {
            loop {
                match select(commands.receive(), LED_EVENTS.receive()).await {
                    Either::First(cmd) => handle_command(engine, cmd),
                    Either::Second(leds) => engine.on_output_report(&[leds]),
                }
            }
        };

        match select(gatt_fut, session_fut).await {
            Either::First(reason) => info!("peer disconnected: {}", reason),
            Either::Second(()) => unreachable!(),
        }

        engine.transport_mut().unbind();
        engine.on_disconnect();
    }
}

/// Apply one key command to the engine.
fn handle_command(engine: &mut HidEngine<BleTransport>, cmd: HidCommand) {
    match cmd {
        HidCommand::Press(id) => {
            if let Err(e) = engine.press_key(id) {
                warn!("press {} failed: {}", id, e);
            }
        }
        HidCommand::Release(id) => {
            let _ = engine.release_key(id);
        }
        HidCommand::Tap(id) => {
            if engine.write_byte(id) == 0 {
                warn!("tap {} dropped", id);
            }
        }
        HidCommand::TapMedia(key) => {
            engine.write_media(key);
        }
        HidCommand::Type(text) => {
            let typed = engine.write(text.as_bytes());
            info!("typed {}/{} bytes", typed, text.len());
        }
        HidCommand::ReleaseAll => engine.release_all(),
    }
}

/// Assemble the advertising payload: flags, appearance (HID keyboard),
/// the HID service UUID, and the complete local name.
///
/// Each AD structure is `[len, type, data...]` - the mirror image of
/// what a scanner parses out of an advertisement.
fn build_adv_data(name: &str, buf: &mut [u8; 31]) -> usize {
    let mut n = 0;

    // Flags: LE General Discoverable, BR/EDR not supported.
    buf[n..n + 3].copy_from_slice(&[0x02, 0x01, 0x06]);
    n += 3;

    // Appearance: HID keyboard.
    let appearance = APPEARANCE_HID_KEYBOARD.to_le_bytes();
    buf[n..n + 4].copy_from_slice(&[0x03, 0x19, appearance[0], appearance[1]]);
    n += 4;

    // Complete list of 16-bit service UUIDs: HID (0x1812).
    buf[n..n + 4].copy_from_slice(&[0x03, 0x03, 0x12, 0x18]);
    n += 4;

    // Complete local name (the identity cap keeps this within 31 bytes).
    let name_bytes = name.as_bytes();
    buf[n] = name_bytes.len() as u8 + 1;
    buf[n + 1] = 0x09;
    buf[n + 2..n + 2 + name_bytes.len()].copy_from_slice(name_bytes);
    n += 2 + name_bytes.len();

    n
}
