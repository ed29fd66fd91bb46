//! Standard keyboard HID report (report ID 1).
//!
//! Layout (8 bytes on the wire):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```
//!
//! The six key slots are a fixed arena: 0x00 marks an empty slot,
//! insertion takes the first empty slot, and a usage code never occupies
//! two slots at once.

use crate::error::KeyError;

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Modifier bit values for the first report byte.
pub mod modifier {
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_GUI: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_GUI: u8 = 0x80;
}

/// Standard keyboard report with 6-key rollover.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyReport {
    /// Modifier key bitfield.
    pub modifiers: u8,
    /// Reserved byte (always 0x00 per HID spec).
    pub reserved: u8,
    /// Up to 6 simultaneously held key codes; 0x00 = empty slot.
    pub keys: [u8; 6],
}

impl KeyReport {
    /// Create an empty (all-keys-released) report.
    pub const fn new() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; 6],
        }
    }

    /// Set modifier bit(s).
    pub fn set_modifiers(&mut self, bits: u8) {
        self.modifiers |= bits;
    }

    /// Clear modifier bit(s).
    pub fn clear_modifiers(&mut self, bits: u8) {
        self.modifiers &= !bits;
    }

    /// Insert a usage code into the first empty slot.
    ///
    /// Holding a code that is already present is a no-op (a key cannot
    /// occupy two slots). Fails with [`KeyError::Overflow`] when all six
    /// slots are taken; the held keys are left unchanged.
    pub fn hold(&mut self, usage: u8) -> Result<(), KeyError> {
        if self.keys.contains(&usage) {
            return Ok(());
        }
        match self.keys.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => {
                *slot = usage;
                Ok(())
            }
            None => Err(KeyError::Overflow),
        }
    }

    /// Clear every slot holding the given usage code.
    ///
    /// Releasing a code that is not held is a safe no-op.
    pub fn clear(&mut self, usage: u8) {
        for slot in self.keys.iter_mut() {
            if *slot == usage {
                *slot = 0;
            }
        }
    }

    /// Returns `true` if the given usage code occupies a slot.
    pub fn holds(&self, usage: u8) -> bool {
        usage != 0 && self.keys.contains(&usage)
    }

    /// Zero the modifiers and all slots.
    pub fn reset(&mut self) {
        self.modifiers = 0;
        self.keys = [0; 6];
    }

    /// Serialise into a byte slice for transmission.
    /// Returns the number of bytes written (always 8).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifiers;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keys);
        KEYBOARD_REPORT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_is_all_zero() {
        let report = KeyReport::new();
        assert_eq!(report.modifiers, 0);
        assert_eq!(report.reserved, 0);
        assert_eq!(report.keys, [0; 6]);
    }

    #[test]
    fn hold_fills_first_empty_slot() {
        let mut report = KeyReport::new();
        report.hold(0x04).unwrap();
        report.hold(0x05).unwrap();
        assert_eq!(report.keys, [0x04, 0x05, 0, 0, 0, 0]);

        // A released slot is reused before later empty slots.
        report.clear(0x04);
        report.hold(0x06).unwrap();
        assert_eq!(report.keys, [0x06, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn hold_is_idempotent() {
        let mut report = KeyReport::new();
        report.hold(0x04).unwrap();
        report.hold(0x04).unwrap();
        assert_eq!(report.keys, [0x04, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn seventh_key_overflows_and_leaves_slots_unchanged() {
        let mut report = KeyReport::new();
        for usage in 0x04..0x0A {
            report.hold(usage).unwrap();
        }
        let before = report.keys;
        assert_eq!(report.hold(0x0B), Err(KeyError::Overflow));
        assert_eq!(report.keys, before);
    }

    #[test]
    fn clear_removes_only_matching_slot() {
        let mut report = KeyReport::new();
        report.hold(0x04).unwrap();
        report.hold(0x05).unwrap();
        report.clear(0x04);
        assert_eq!(report.keys, [0, 0x05, 0, 0, 0, 0]);

        // Clearing a key that is not held changes nothing.
        report.clear(0x30);
        assert_eq!(report.keys, [0, 0x05, 0, 0, 0, 0]);
    }

    #[test]
    fn modifier_bits_are_independent_of_slots() {
        let mut report = KeyReport::new();
        report.set_modifiers(modifier::LEFT_SHIFT | modifier::RIGHT_ALT);
        report.hold(0x04).unwrap();
        assert_eq!(report.modifiers, 0x42);
        assert_eq!(report.keys[0], 0x04);

        report.clear_modifiers(modifier::LEFT_SHIFT);
        assert_eq!(report.modifiers, 0x40);
        assert_eq!(report.keys[0], 0x04);
    }

    #[test]
    fn serialize_layout_is_byte_exact() {
        let mut report = KeyReport::new();
        report.set_modifiers(modifier::LEFT_CTRL | modifier::LEFT_ALT);
        report.hold(0x04).unwrap();
        report.hold(0x2C).unwrap();

        let mut buf = [0u8; 8];
        let written = report.serialize(&mut buf);
        assert_eq!(written, 8);
        assert_eq!(buf, [0x05, 0x00, 0x04, 0x2C, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn serialize_buffer_too_small() {
        let report = KeyReport::new();
        let mut buf = [0u8; 4];
        assert_eq!(report.serialize(&mut buf), 0);
    }
}
