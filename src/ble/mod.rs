//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertising** - presents the device as a HID keyboard
//!    (appearance 0x03C1, HID service UUID) until a central connects.
//! 2. **GATT server** - HID-over-GATT service (report map, input/output
//!    reports, protocol mode) plus battery and device-information
//!    services.
//! 3. **Session loop** - feeds connect/disconnect/output-report events
//!    into the engine and applies key commands from other tasks.
//!
//! Communication with other tasks is done via Embassy channels defined
//! in the crate root.

pub mod server;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use crate::config::HID_COMMAND_CHANNEL_DEPTH;
use crate::keycodes::MediaKey;

/// Commands other tasks (buttons, UI, serial console) send to the HID
/// session task.
#[derive(Clone)]
pub enum HidCommand {
    /// Press and hold a key identifier.
    Press(u8),
    /// Release a held key identifier.
    Release(u8),
    /// Tap a key (press + release).
    Tap(u8),
    /// Tap a media key.
    TapMedia(MediaKey),
    /// Type a short text snippet.
    Type(String<32>),
    /// Release everything (recovery).
    ReleaseAll,
}

/// Channel feeding [`HidCommand`]s into the session loop.
pub type HidCommandChannel =
    Channel<CriticalSectionRawMutex, HidCommand, HID_COMMAND_CHANNEL_DEPTH>;
