//! Application-wide constants and compile-time configuration.
//!
//! Identity defaults, timing parameters, and protocol constants live
//! here so they can be tuned in one place.

// Identity

/// Default GAP device name.
pub const DEFAULT_DEVICE_NAME: &str = "blekbd";

/// Default manufacturer string (Device Information service).
pub const DEFAULT_MANUFACTURER: &str = "blekbd";

/// Transport-imposed ceiling on device name / manufacturer strings.
pub const DEVICE_NAME_MAX_LEN: usize = 15;

/// Default reported battery level (percent).
pub const DEFAULT_BATTERY_LEVEL: u8 = 100;

/// Default PnP identity pushed to the Device Information service.
pub const DEFAULT_VENDOR_ID: u16 = 0x05AC;
pub const DEFAULT_PRODUCT_ID: u16 = 0x0220;
pub const DEFAULT_VERSION: u16 = 0x0110;

// Report pacing

/// Default pause between consecutive HID notifications (ms).
///
/// Keeps a fast caller from overrunning the peer's notification
/// throughput. Zero disables pacing entirely.
pub const DEFAULT_REPORT_DELAY_MS: u32 = 8;

// BLE

/// GAP appearance: HID keyboard.
pub const APPEARANCE_HID_KEYBOARD: u16 = 0x03C1;

/// Advertising interval (in 0.625 ms units). 244 ≈ 152.5 ms.
pub const BLE_ADV_INTERVAL: u32 = 244;

// GPIO pin assignments (nRF52840-DK defaults)
//
//   Button 1 (type demo text)  → P0.11
//   Button 2 (volume down)     → P0.12
//   Button 3 (volume up)       → P0.24
//   Button 4 (play/pause)      → P0.25

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// Channels

/// Depth of the key-command channel feeding the HID session task.
pub const HID_COMMAND_CHANNEL_DEPTH: usize = 8;
