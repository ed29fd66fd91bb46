//! HID report types and the report map shared with the host.
//!
//! Two reports are declared, distinguished by report ID:
//!
//! - ID 1: standard keyboard (modifiers + 6 key slots, LED output)
//! - ID 2: consumer control (16-bit media key bitmask)
//!
//! The wire payloads are exactly [`keyboard::KEYBOARD_REPORT_SIZE`] and
//! [`consumer::MEDIA_REPORT_SIZE`] bytes; the report ID itself travels in
//! the GATT Report Reference descriptor, not the payload.

pub mod consumer;
pub mod keyboard;

pub use consumer::MediaKeyReport;
pub use keyboard::KeyReport;

/// Report ID of the standard keyboard report.
pub const KEYBOARD_REPORT_ID: u8 = 0x01;

/// Report ID of the consumer-control report.
pub const MEDIA_KEYS_REPORT_ID: u8 = 0x02;

/// Total length of [`REPORT_DESCRIPTOR`].
pub const REPORT_MAP_LEN: usize = 127;

/// HID report map: keyboard (ID 1) + consumer control (ID 2).
///
/// The keyboard collection declares 8 modifier bits, a reserved byte,
/// 5 LED output bits (plus 3 bits padding) and 6 key code bytes with
/// logical range 0..0x65. The consumer collection declares 16 input
/// bits, one per named media usage, in the order the media bitmask uses.
pub const REPORT_DESCRIPTOR: [u8; REPORT_MAP_LEN] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, KEYBOARD_REPORT_ID, // Report ID (1)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant) - padding
    //
    //   - LED output (5 bits + 3 padding) -
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant) - padding
    //
    //   - Key codes (6 bytes) -
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (0x65)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (0x65)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
    //
    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x85, MEDIA_KEYS_REPORT_ID, // Report ID (2)
    //
    //   - 16 media key bits, declared usage order = bitmask order -
    0x05, 0x0C, //   Usage Page (Consumer)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x09, 0xB5, //   Usage (Scan Next Track)
    0x09, 0xB6, //   Usage (Scan Previous Track)
    0x09, 0xB7, //   Usage (Stop)
    0x09, 0xCD, //   Usage (Play/Pause)
    0x09, 0xE2, //   Usage (Mute)
    0x09, 0xE9, //   Usage (Volume Increment)
    0x09, 0xEA, //   Usage (Volume Decrement)
    0x0A, 0x23, 0x02, //   Usage (AC Home)
    0x0A, 0x94, 0x01, //   Usage (AL Local Machine Browser)
    0x0A, 0x92, 0x01, //   Usage (AL Calculator)
    0x0A, 0x2A, 0x02, //   Usage (AC Bookmarks)
    0x0A, 0x21, 0x02, //   Usage (AC Search)
    0x0A, 0x26, 0x02, //   Usage (AC Stop)
    0x0A, 0x24, 0x02, //   Usage (AC Back)
    0x0A, 0x83, 0x01, //   Usage (AL Consumer Control Configuration)
    0x0A, 0x8A, 0x01, //   Usage (AL Email Reader)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0xC0, // End Collection
];
