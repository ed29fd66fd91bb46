//! HID state and report engine.
//!
//! [`HidEngine`] owns the keyboard and media reports, tracks the peer
//! connection state, and pushes a freshly serialised report to the
//! transport on every state change. It is synchronous and
//! single-threaded: each press/release/write call runs to completion
//! (including the inter-report pacing) before returning, and the engine
//! performs no internal locking.
//!
//! The engine never talks to the SoftDevice directly - it drives a
//! [`Transport`] capability, so the same logic runs against the real
//! GATT server on target and against a recording mock on the host.

use heapless::String;

use crate::config::{
    DEFAULT_BATTERY_LEVEL, DEFAULT_DEVICE_NAME, DEFAULT_MANUFACTURER, DEFAULT_PRODUCT_ID,
    DEFAULT_REPORT_DELAY_MS, DEFAULT_VENDOR_ID, DEFAULT_VERSION, DEVICE_NAME_MAX_LEN,
};
use crate::error::KeyError;
use crate::hid::consumer::MEDIA_REPORT_SIZE;
use crate::hid::keyboard::{modifier, KEYBOARD_REPORT_SIZE};
use crate::hid::{KeyReport, MediaKeyReport};
use crate::keycodes::{self, MediaKey, MODIFIER_OFFSET, RAW_USAGE_OFFSET};

/// Report delivery capability the engine drives.
///
/// Implementations deliver pre-serialised report payloads to the peer's
/// input characteristics. Delivery is fire-and-forget: a report that
/// cannot reach the host (peer busy, notification dropped) is not an
/// error the engine can act on.
pub trait Transport {
    /// Push a standard keyboard report payload (8 bytes).
    fn notify_keyboard(&mut self, payload: &[u8]);

    /// Push a consumer-control report payload (2 bytes).
    fn notify_media(&mut self, payload: &[u8]);

    /// Observe the inter-report pacing interval.
    ///
    /// Called after each transmitted report. Implementations must
    /// guarantee at least `ms` milliseconds pass before the next
    /// notification is pushed; a blocking delay satisfies this, and an
    /// async transport may instead record a deadline and suspend before
    /// its next notify.
    fn pace(&mut self, ms: u32);

    /// Forward a battery level (percent) to the battery service.
    fn set_battery_level(&mut self, percent: u8);

    /// The peer disconnected; make the device discoverable again.
    ///
    /// Transports whose run loop re-enters advertising after the
    /// connection closes may treat this as a hint.
    fn restart_advertising(&mut self);
}

/// Write-once-then-push identity and pacing configuration.
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    /// GAP device name (≤15 bytes, transport string ceiling).
    pub name: String<DEVICE_NAME_MAX_LEN>,
    /// Manufacturer string (≤15 bytes).
    pub manufacturer: String<DEVICE_NAME_MAX_LEN>,
    /// Battery level percentage (0-100).
    pub battery_level: u8,
    /// Pause between consecutive reports (ms); 0 disables pacing.
    pub delay_ms: u32,
    /// PnP vendor ID.
    pub vendor_id: u16,
    /// PnP product ID.
    pub product_id: u16,
    /// PnP firmware version.
    pub version: u16,
}

impl DeviceInfo {
    fn new() -> Self {
        Self {
            name: truncated(DEFAULT_DEVICE_NAME),
            manufacturer: truncated(DEFAULT_MANUFACTURER),
            battery_level: DEFAULT_BATTERY_LEVEL,
            delay_ms: DEFAULT_REPORT_DELAY_MS,
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            version: DEFAULT_VERSION,
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy a string into the capped identity buffer, dropping the excess.
fn truncated(s: &str) -> String<DEVICE_NAME_MAX_LEN> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// HID keyboard + media-key engine.
///
/// Key identifiers follow the byte convention described in
/// [`crate::keycodes`]; media keys are [`MediaKey`] masks. State
/// mutation always happens, connected or not - only the wire
/// transmission is gated, so callers should [`HidEngine::release_all`]
/// around a reconnect to avoid presenting a stale held-key image.
pub struct HidEngine<T: Transport> {
    transport: T,
    info: DeviceInfo,
    key_report: KeyReport,
    media_report: MediaKeyReport,
    connected: bool,
    leds: u8,
}

impl<T: Transport> HidEngine<T> {
    /// Create an engine with default identity, disconnected.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            info: DeviceInfo::new(),
            key_report: KeyReport::new(),
            media_report: MediaKeyReport::new(),
            connected: false,
            leds: 0,
        }
    }

    // Keyboard

    /// Press a key by identifier.
    ///
    /// Modifier identifiers set their bit without taking a key slot;
    /// ASCII identifiers that need shift force the Left-Shift bit on.
    /// Pressing a key that is already held is a no-op for slot state but
    /// still retransmits the report. Fails with [`KeyError::Overflow`]
    /// when a seventh concurrent key is pressed (nothing is sent and the
    /// held keys stay as they were).
    pub fn press_key(&mut self, id: u8) -> Result<(), KeyError> {
        let usage = if id >= RAW_USAGE_OFFSET {
            id - RAW_USAGE_OFFSET
        } else if id >= MODIFIER_OFFSET {
            self.key_report.set_modifiers(1 << (id - MODIFIER_OFFSET));
            0
        } else {
            let (usage, shift) = keycodes::translate(id)?;
            if shift {
                self.key_report.set_modifiers(modifier::LEFT_SHIFT);
            }
            usage
        };

        if usage != 0 {
            self.key_report.hold(usage)?;
        }
        self.send_key_report();
        Ok(())
    }

    /// Release a key by identifier.
    ///
    /// Mirrors [`press_key`](Self::press_key) resolution; releasing a
    /// key that is not held is a safe no-op, and there is no overflow
    /// condition when clearing. The report is retransmitted even for a
    /// no-op release. Only ASCII resolution can fail.
    pub fn release_key(&mut self, id: u8) -> Result<(), KeyError> {
        let usage = if id >= RAW_USAGE_OFFSET {
            id - RAW_USAGE_OFFSET
        } else if id >= MODIFIER_OFFSET {
            self.key_report.clear_modifiers(1 << (id - MODIFIER_OFFSET));
            0
        } else {
            let (usage, shift) = keycodes::translate(id)?;
            if shift {
                self.key_report.clear_modifiers(modifier::LEFT_SHIFT);
            }
            usage
        };

        if usage != 0 {
            self.key_report.clear(usage);
        }
        self.send_key_report();
        Ok(())
    }

    /// Release everything: modifiers, key slots, and media keys.
    ///
    /// Callable at any time; transmits both reports. Use this to recover
    /// from an ambiguous state, e.g. before or after a reconnect.
    pub fn release_all(&mut self) {
        self.key_report.reset();
        self.media_report.reset();
        self.send_key_report();
        self.send_media_report();
    }

    // Media keys

    /// Hold a media key; returns the number of keys affected (1).
    pub fn press_media(&mut self, key: MediaKey) -> usize {
        self.media_report.press(key);
        self.send_media_report();
        1
    }

    /// Release a media key; returns the number of keys affected (1).
    pub fn release_media(&mut self, key: MediaKey) -> usize {
        self.media_report.release(key);
        self.send_media_report();
        1
    }

    /// Tap a media key: press, then release.
    ///
    /// The host observes the press through the intervening notification.
    pub fn write_media(&mut self, key: MediaKey) -> usize {
        let n = self.press_media(key);
        self.release_media(key);
        n
    }

    // Typing

    /// Tap a single key: press, then release.
    ///
    /// Returns 1 on success, 0 if the press failed (unmapped character
    /// or rollover overflow). The release is attempted either way.
    pub fn write_byte(&mut self, id: u8) -> usize {
        let pressed = self.press_key(id).is_ok();
        let _ = self.release_key(id);
        pressed as usize
    }

    /// Type a byte stream, stopping at the first failing byte.
    ///
    /// Carriage returns are skipped without being typed (newline
    /// normalisation for text streams) and do not count toward the
    /// returned total.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let mut written = 0;
        for &b in bytes {
            if b == b'\r' {
                continue;
            }
            if self.write_byte(b) == 0 {
                break;
            }
            written += 1;
        }
        written
    }

    // Connection lifecycle (invoked by the transport glue)

    /// Peer connected; reports flow from now on.
    pub fn on_connect(&mut self) {
        self.connected = true;
    }

    /// Peer disconnected; reports are dropped and the transport is asked
    /// to start advertising again so a new peer can connect.
    pub fn on_disconnect(&mut self) {
        self.connected = false;
        self.transport.restart_advertising();
    }

    /// Host wrote an output report (keyboard LED state).
    ///
    /// Accepts any payload; an empty write is ignored.
    pub fn on_output_report(&mut self, payload: &[u8]) {
        if let Some(&leds) = payload.first() {
            self.leds = leds;
        }
    }

    /// Is a peer currently connected?
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Last LED state byte written by the host.
    pub fn led_state(&self) -> u8 {
        self.leds
    }

    // Identity / configuration

    /// Set the device name (truncated to 15 bytes).
    pub fn set_name(&mut self, name: &str) {
        self.info.name = truncated(name);
    }

    /// Set the manufacturer string (truncated to 15 bytes).
    pub fn set_manufacturer(&mut self, manufacturer: &str) {
        self.info.manufacturer = truncated(manufacturer);
    }

    /// Set the battery level (clamped to 100) and push it to the
    /// transport's battery service.
    pub fn set_battery_level(&mut self, percent: u8) {
        self.info.battery_level = percent.min(100);
        self.transport.set_battery_level(self.info.battery_level);
    }

    /// Set the inter-report pacing delay; 0 disables pacing.
    pub fn set_delay_ms(&mut self, ms: u32) {
        self.info.delay_ms = ms;
    }

    pub fn set_vendor_id(&mut self, vid: u16) {
        self.info.vendor_id = vid;
    }

    pub fn set_product_id(&mut self, pid: u16) {
        self.info.product_id = pid;
    }

    pub fn set_version(&mut self, version: u16) {
        self.info.version = version;
    }

    /// Identity and pacing configuration.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Current keyboard report state (held modifiers and slots).
    pub fn key_report(&self) -> &KeyReport {
        &self.key_report
    }

    /// Current media report state (held media key mask).
    pub fn media_report(&self) -> &MediaKeyReport {
        &self.media_report
    }

    /// Access the transport, e.g. to bind a new connection handle.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // Transmission

    fn send_key_report(&mut self) {
        if !self.connected {
            return;
        }
        let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
        let n = self.key_report.serialize(&mut buf);
        self.transport.notify_keyboard(&buf[..n]);
        self.pace();
    }

    fn send_media_report(&mut self) {
        if !self.connected {
            return;
        }
        let mut buf = [0u8; MEDIA_REPORT_SIZE];
        let n = self.media_report.serialize(&mut buf);
        self.transport.notify_media(&buf[..n]);
        self.pace();
    }

    fn pace(&mut self) {
        if self.info.delay_ms > 0 {
            self.transport.pace(self.info.delay_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycodes::{
        KEY_LEFT_CTRL, KEY_LEFT_SHIFT, KEY_MEDIA_MUTE, KEY_MEDIA_VOLUME_UP, KEY_RETURN,
        KEY_RIGHT_GUI, KEY_UP_ARROW,
    };

    /// Recording transport: captures every call the engine makes.
    #[derive(Default)]
    struct MockTransport {
        keyboard: Vec<Vec<u8>>,
        media: Vec<Vec<u8>>,
        paces: Vec<u32>,
        battery: Vec<u8>,
        advertising_restarts: usize,
    }

    impl Transport for MockTransport {
        fn notify_keyboard(&mut self, payload: &[u8]) {
            self.keyboard.push(payload.to_vec());
        }

        fn notify_media(&mut self, payload: &[u8]) {
            self.media.push(payload.to_vec());
        }

        fn pace(&mut self, ms: u32) {
            self.paces.push(ms);
        }

        fn set_battery_level(&mut self, percent: u8) {
            self.battery.push(percent);
        }

        fn restart_advertising(&mut self) {
            self.advertising_restarts += 1;
        }
    }

    fn connected_engine() -> HidEngine<MockTransport> {
        let mut engine = HidEngine::new(MockTransport::default());
        engine.on_connect();
        engine
    }

    #[test]
    fn press_ascii_sends_report_with_usage_in_slot_0() {
        let mut engine = connected_engine();
        engine.press_key(b'a').unwrap();
        assert_eq!(
            engine.transport_mut().keyboard.as_slice(),
            &[vec![0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]]
        );
    }

    #[test]
    fn shifted_character_forces_left_shift_bit() {
        let mut engine = connected_engine();
        engine.press_key(b'A').unwrap();
        let report = &engine.transport_mut().keyboard[0];
        assert_eq!(report[0], modifier::LEFT_SHIFT);
        assert_eq!(report[2], 0x04);
    }

    #[test]
    fn modifier_press_sets_bit_without_slot() {
        let mut engine = connected_engine();
        engine.press_key(KEY_LEFT_CTRL).unwrap();
        engine.press_key(KEY_RIGHT_GUI).unwrap();
        let report = engine.transport_mut().keyboard.last().unwrap().clone();
        assert_eq!(report[0], 0x81);
        assert_eq!(&report[2..], &[0; 6]);
    }

    #[test]
    fn special_key_resolves_by_offset() {
        let mut engine = connected_engine();
        engine.press_key(KEY_UP_ARROW).unwrap();
        assert_eq!(engine.transport_mut().keyboard[0][2], 0x52);
        engine.release_key(KEY_UP_ARROW).unwrap();
        assert_eq!(engine.transport_mut().keyboard[1][2], 0x00);
    }

    #[test]
    fn unmapped_press_fails_without_transmitting() {
        let mut engine = connected_engine();
        assert_eq!(engine.press_key(0x07), Err(KeyError::Unmapped)); // BEL
        assert!(engine.transport_mut().keyboard.is_empty());
    }

    #[test]
    fn unmapped_release_fails_without_transmitting() {
        let mut engine = connected_engine();
        assert_eq!(engine.release_key(0x1B), Err(KeyError::Unmapped)); // ESC byte
        assert!(engine.transport_mut().keyboard.is_empty());
    }

    #[test]
    fn repress_is_idempotent_but_retransmits() {
        let mut engine = connected_engine();
        engine.press_key(b'a').unwrap();
        engine.press_key(b'a').unwrap();
        let sent = &engine.transport_mut().keyboard;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
        assert_eq!(&sent[1][2..], &[0x04, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn six_keys_roll_over_seventh_overflows() {
        let mut engine = connected_engine();
        for c in b"abcdef" {
            engine.press_key(*c).unwrap();
        }
        let before = *engine.key_report();
        let sent_before = engine.transport_mut().keyboard.len();

        assert_eq!(engine.press_key(b'g'), Err(KeyError::Overflow));
        assert_eq!(*engine.key_report(), before);
        // The failing call transmits nothing.
        assert_eq!(engine.transport_mut().keyboard.len(), sent_before);
    }

    #[test]
    fn release_after_overflow_frees_a_slot() {
        let mut engine = connected_engine();
        for c in b"abcdef" {
            engine.press_key(*c).unwrap();
        }
        assert_eq!(engine.press_key(b'g'), Err(KeyError::Overflow));
        engine.release_key(b'a').unwrap();
        engine.press_key(b'g').unwrap();
        assert!(engine.key_report().holds(0x0A)); // 'g'
    }

    #[test]
    fn press_release_round_trips_to_empty() {
        let mut engine = connected_engine();
        let before = *engine.key_report();
        engine.press_key(b'Q').unwrap();
        engine.release_key(b'Q').unwrap();
        assert_eq!(*engine.key_report(), before);
    }

    #[test]
    fn release_clears_shift_for_shifted_character() {
        let mut engine = connected_engine();
        engine.press_key(b'A').unwrap();
        engine.release_key(b'A').unwrap();
        let last = engine.transport_mut().keyboard.last().unwrap();
        assert_eq!(last.as_slice(), &[0u8; 8]);
    }

    #[test]
    fn releasing_unheld_key_is_noop_but_transmits() {
        let mut engine = connected_engine();
        engine.release_key(b'z').unwrap();
        assert_eq!(
            engine.transport_mut().keyboard.as_slice(),
            &[vec![0u8; 8]]
        );
    }

    #[test]
    fn media_press_accumulates_and_release_clears_one_bit() {
        let mut engine = connected_engine();
        assert_eq!(engine.press_media(KEY_MEDIA_VOLUME_UP), 1);
        assert_eq!(engine.press_media(KEY_MEDIA_MUTE), 1);
        assert_eq!(
            engine.media_report().mask(),
            KEY_MEDIA_VOLUME_UP.mask() | KEY_MEDIA_MUTE.mask()
        );

        assert_eq!(engine.release_media(KEY_MEDIA_VOLUME_UP), 1);
        assert_eq!(engine.media_report().mask(), KEY_MEDIA_MUTE.mask());

        let sent = &engine.transport_mut().media;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], vec![0x20, 0x00]);
        assert_eq!(sent[1], vec![0x30, 0x00]);
        assert_eq!(sent[2], vec![0x10, 0x00]);
    }

    #[test]
    fn media_tap_sends_press_then_release() {
        let mut engine = connected_engine();
        assert_eq!(engine.write_media(KEY_MEDIA_VOLUME_UP), 1);
        let sent = &engine.transport_mut().media;
        assert_eq!(sent.as_slice(), &[vec![0x20, 0x00], vec![0x00, 0x00]]);
    }

    #[test]
    fn write_byte_taps_press_and_release() {
        let mut engine = connected_engine();
        assert_eq!(engine.write_byte(b'h'), 1);
        let sent = &engine.transport_mut().keyboard;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0][2], 0x0B);
        assert_eq!(sent[1][2], 0x00);
    }

    #[test]
    fn write_byte_returns_zero_for_unmapped() {
        let mut engine = connected_engine();
        assert_eq!(engine.write_byte(0x1B), 0);
        assert!(engine.transport_mut().keyboard.is_empty());
    }

    #[test]
    fn write_skips_carriage_returns() {
        let mut engine = connected_engine();
        assert_eq!(engine.write(b"Hi\r\n"), 3);
        // 3 taps = 6 reports; '\r' never produces one.
        assert_eq!(engine.transport_mut().keyboard.len(), 6);
    }

    #[test]
    fn write_stops_at_first_failing_byte() {
        let mut engine = connected_engine();
        // BEL (0x07) is unmapped; "de" must not be typed.
        assert_eq!(engine.write(b"abc\x07de"), 3);
        assert_eq!(engine.transport_mut().keyboard.len(), 6);
    }

    #[test]
    fn release_all_zeroes_state_and_sends_both_reports() {
        let mut engine = connected_engine();
        engine.press_key(b'A').unwrap();
        engine.press_key(KEY_LEFT_CTRL).unwrap();
        engine.press_media(KEY_MEDIA_MUTE);

        engine.release_all();
        assert_eq!(*engine.key_report(), KeyReport::new());
        assert_eq!(engine.media_report().mask(), 0);

        let transport = engine.transport_mut();
        assert_eq!(transport.keyboard.last().unwrap().as_slice(), &[0u8; 8]);
        assert_eq!(transport.media.last().unwrap().as_slice(), &[0u8, 0u8]);
    }

    #[test]
    fn disconnected_press_mutates_state_but_sends_nothing() {
        let mut engine = HidEngine::new(MockTransport::default());
        engine.press_key(b'a').unwrap();
        assert!(engine.key_report().holds(0x04));
        assert!(engine.transport_mut().keyboard.is_empty());
        assert!(engine.transport_mut().paces.is_empty());

        // Reconnect and recover: release_all clears the stale image.
        engine.on_connect();
        engine.release_all();
        assert_eq!(*engine.key_report(), KeyReport::new());
        assert_eq!(engine.transport_mut().keyboard.len(), 1);
    }

    #[test]
    fn disconnect_restarts_advertising_and_gates_transmission() {
        let mut engine = connected_engine();
        engine.on_disconnect();
        assert!(!engine.is_connected());
        assert_eq!(engine.transport_mut().advertising_restarts, 1);

        engine.press_key(b'a').unwrap();
        assert!(engine.transport_mut().keyboard.is_empty());
    }

    #[test]
    fn pacing_follows_configured_delay() {
        let mut engine = connected_engine();
        engine.press_key(b'a').unwrap();
        assert_eq!(engine.transport_mut().paces.as_slice(), &[8]);

        engine.set_delay_ms(20);
        engine.release_key(b'a').unwrap();
        assert_eq!(engine.transport_mut().paces.as_slice(), &[8, 20]);
    }

    #[test]
    fn zero_delay_skips_pacing() {
        let mut engine = connected_engine();
        engine.set_delay_ms(0);
        engine.press_key(b'a').unwrap();
        assert_eq!(engine.transport_mut().keyboard.len(), 1);
        assert!(engine.transport_mut().paces.is_empty());
    }

    #[test]
    fn modifier_press_works_with_full_rollover() {
        let mut engine = connected_engine();
        for c in b"abcdef" {
            engine.press_key(*c).unwrap();
        }
        // Modifiers never take a slot, so they still succeed.
        engine.press_key(KEY_LEFT_SHIFT).unwrap();
        assert_eq!(engine.key_report().modifiers, modifier::LEFT_SHIFT);
    }

    #[test]
    fn battery_level_is_clamped_and_pushed() {
        let mut engine = connected_engine();
        engine.set_battery_level(42);
        engine.set_battery_level(180);
        assert_eq!(engine.transport_mut().battery.as_slice(), &[42, 100]);
        assert_eq!(engine.device_info().battery_level, 100);
    }

    #[test]
    fn name_and_manufacturer_truncate_to_fifteen_bytes() {
        let mut engine = connected_engine();
        engine.set_name("A very long keyboard name");
        engine.set_manufacturer("Some Manufacturer Inc.");
        assert_eq!(engine.device_info().name.as_str(), "A very long key");
        assert_eq!(engine.device_info().manufacturer.as_str(), "Some Manufactur");
    }

    #[test]
    fn output_report_updates_led_state() {
        let mut engine = connected_engine();
        assert_eq!(engine.led_state(), 0);
        engine.on_output_report(&[0b0000_0010]); // caps lock
        assert_eq!(engine.led_state(), 0b0000_0010);

        // An empty write must be accepted and change nothing.
        engine.on_output_report(&[]);
        assert_eq!(engine.led_state(), 0b0000_0010);
    }

    #[test]
    fn tap_enter_via_named_key() {
        let mut engine = connected_engine();
        assert_eq!(engine.write_byte(KEY_RETURN), 1);
        assert_eq!(engine.transport_mut().keyboard[0][2], 0x28);
    }
}
