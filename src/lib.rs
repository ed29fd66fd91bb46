//! blekbd - BLE HID keyboard emulator.
//!
//! The library holds everything that can run and be tested on the host:
//! the ASCII→usage translation table, the keyboard/media report types,
//! and the [`engine::HidEngine`] that turns press/release intents into
//! paced HID notifications.
//!
//! The embedded binary (`main.rs`, behind the `embedded` feature) wires
//! the engine to the Nordic SoftDevice S140 as a HID-over-GATT
//! peripheral; the [`ble`] module carries that glue.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod engine;
pub mod error;
pub mod hid;
pub mod keycodes;

#[cfg(feature = "embedded")]
pub mod ble;
